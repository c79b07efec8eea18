// Read-only interceptor logging request/response exchanges.
use crate::client::interceptor::Interceptor;
use crate::error::ClientError;
use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response};
use serde::{Deserialize, Serialize};

const LOG_TARGET: &str = "uplink::http";

/// Which exchanges get logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// Nothing at all.
    #[default]
    None,
    /// Every exchange.
    All,
    /// Only responses with status < 400.
    Ok,
    /// Only responses with status >= 400.
    NotOk,
}

/// Logs URL, method, request headers and the response body. Never mutates
/// the exchange; a body that fails to parse as JSON is logged as raw text
/// rather than treated as an error.
pub struct ResponsePrinter {
    level: Verbosity,
}

impl ResponsePrinter {
    pub fn new(level: Verbosity) -> Self {
        Self { level }
    }

    fn log_exchange(&self, req: &Request<Bytes>, res: &Response<Bytes>) {
        log::info!(target: LOG_TARGET, "---------- request headers ----------");
        for (name, value) in req.headers() {
            log::info!(
                target: LOG_TARGET,
                "{}: {}",
                name,
                value.to_str().unwrap_or("<binary>")
            );
        }
        log::info!(target: LOG_TARGET, "---------- end ----------");

        match serde_json::from_slice::<serde_json::Value>(res.body()) {
            Ok(json) => {
                let pretty =
                    serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string());
                log::info!(target: LOG_TARGET, "---------- json start ----------");
                log::info!(target: LOG_TARGET, "{}", pretty);
                log::info!(target: LOG_TARGET, "---------- end ----------");
            }
            Err(e) => {
                log::info!(target: LOG_TARGET, "body is not json ({}), raw follows", e);
                log::info!(target: LOG_TARGET, "---------- raw body ----------");
                log::info!(target: LOG_TARGET, "{}", String::from_utf8_lossy(res.body()));
                log::info!(target: LOG_TARGET, "---------- end ----------");
            }
        }
    }
}

#[async_trait]
impl Interceptor for ResponsePrinter {
    async fn on_response(
        &self,
        req: &Request<Bytes>,
        res: &mut Response<Bytes>,
    ) -> Result<(), ClientError> {
        if self.level == Verbosity::None {
            return Ok(());
        }

        let status = res.status().as_u16();
        log::info!(target: LOG_TARGET, "URL    : {}", req.uri());
        log::info!(target: LOG_TARGET, "METHOD : {}", req.method());

        let dump = match self.level {
            Verbosity::All => true,
            Verbosity::Ok => status < 400,
            Verbosity::NotOk => status >= 400,
            Verbosity::None => false,
        };
        if dump {
            self.log_exchange(req, res);
        }

        Ok(())
    }
}
