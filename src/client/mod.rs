// File: ./src/client/mod.rs
pub mod cert;
pub mod core;
pub mod interceptor;
pub mod json_headers;
pub mod printer;
pub mod registry;
pub mod secret_headers;
pub mod transport;

pub use crate::client::core::{ClientConfig, HttpClient};
pub use crate::client::interceptor::Interceptor;
pub use crate::client::printer::Verbosity;
pub use crate::client::registry::ClientRegistry;
