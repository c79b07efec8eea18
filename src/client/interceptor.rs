// Request/response transformer protocol.
//
// Interceptors form an ordered chain owned by the client. The chain runs in
// registration order for outgoing requests, each stage seeing the previous
// stage's output, and in the SAME order for responses: a later interceptor
// observes everything earlier stages accumulated. This is deliberately not a
// tower layer stack; tower unwinds responses in reverse registration order,
// which is not the contract here.
use crate::error::ClientError;
use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response};

#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Transform the outgoing request in place. May attach headers or
    /// replace the body.
    async fn on_request(&self, req: &mut Request<Bytes>) -> Result<(), ClientError> {
        let _ = req;
        Ok(())
    }

    /// Transform the incoming response in place. `req` is the request as it
    /// left the request chain.
    async fn on_response(
        &self,
        req: &Request<Bytes>,
        res: &mut Response<Bytes>,
    ) -> Result<(), ClientError> {
        let _ = (req, res);
        Ok(())
    }
}
