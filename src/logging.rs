// Logger bootstrap for hosts that do not install their own `log` backend.
use simplelog::{ColorChoice, Config as LogConfig, SimpleLogger, TermLogger, TerminalMode};

/// Install a terminal logger at the given level.
///
/// Falls back to the plain logger when no terminal is attached. Safe to call
/// when another logger is already installed; the call is then a no-op.
pub fn init(level: log::LevelFilter) {
    if TermLogger::init(
        level,
        LogConfig::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .is_err()
    {
        let _ = SimpleLogger::init(level, LogConfig::default());
    }
}
