// src/middleware/trace.rs
//
// Cada requisição ganha um id (UUID v4) que vai no span de log e volta no
// header `x-request-id`.

use std::time::Instant;

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(pub Uuid);

impl RequestId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    fn header_value(&self) -> HeaderValue {
        // Um UUID hifenizado é sempre ASCII válido
        HeaderValue::from_str(&self.0.to_string()).unwrap_or_else(|_| HeaderValue::from_static("invalid"))
    }
}

pub async fn request_span(mut request: Request, next: Next) -> Response {
    let request_id = RequestId::generate();
    request.extensions_mut().insert(request_id);

    let span = tracing::info_span!(
        "request",
        id = %request_id.0,
        method = %request.method(),
        path = %request.uri().path(),
    );

    async move {
        let started = Instant::now();
        let mut response = next.run(request).await;
        tracing::info!(
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "requisição concluída"
        );
        response
            .headers_mut()
            .insert(REQUEST_ID_HEADER.clone(), request_id.header_value());
        response
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_fit_in_a_header() {
        let a = RequestId::generate();
        let b = RequestId::generate();
        assert_ne!(a, b);
        assert_eq!(a.header_value().to_str().unwrap(), a.0.to_string());
    }
}
