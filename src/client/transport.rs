// Shared HTTPS transport construction.
//
// Both the HTTP client and the image fetcher speak through the same
// rustls-backed hyper client; this is the one place the TLS configuration is
// assembled.
use crate::client::cert::NoVerifier;
use crate::error::ClientError;
use bytes::Bytes;
use http_body_util::Full;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use std::sync::Arc;

pub type HttpsTransport = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// Build the hyper client used for all outgoing requests.
///
/// With `allow_insecure_certs`, certificate verification is disabled
/// entirely; otherwise the system root store is required to be non-empty.
pub fn build_transport(allow_insecure_certs: bool) -> Result<HttpsTransport, ClientError> {
    let tls_config_builder = rustls::ClientConfig::builder();

    let tls_config = if allow_insecure_certs {
        tls_config_builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(NoVerifier))
            .with_no_client_auth()
    } else {
        let mut root_store = rustls::RootCertStore::empty();
        let result = rustls_native_certs::load_native_certs();
        root_store.add_parsable_certificates(result.certs);
        if root_store.is_empty() {
            return Err(ClientError::Tls(
                "no valid system certificates found".to_string(),
            ));
        }
        tls_config_builder
            .with_root_certificates(root_store)
            .with_no_client_auth()
    };

    let https_connector = HttpsConnectorBuilder::new()
        .with_tls_config(tls_config)
        .https_or_http()
        .enable_http1()
        .build();

    Ok(Client::builder(TokioExecutor::new()).build(https_connector))
}
