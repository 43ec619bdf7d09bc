//! HTTP adapter: turns plain HTTP requests into platform events and back.

use axum::body::{Body, Bytes};
use axum::extract::{RawQuery, State};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::dispatcher::Dispatcher;
use crate::event::InboundEvent;
use crate::response::ResponseEnvelope;
use crate::Result;

pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/", any(handle_event))
        .with_state(dispatcher)
}

/// Serves `router` on `listener` until `shutdown` is cancelled.
pub async fn serve(
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    shutdown: CancellationToken,
) -> Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "listening");
    axum::serve(listener, router(dispatcher))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    info!("server stopped");
    Ok(())
}

async fn handle_event(
    State(dispatcher): State<Arc<Dispatcher>>,
    method: Method,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    let event = event_from_http(&method, query.as_deref(), &body);
    envelope_to_response(dispatcher.handle(&event).await)
}

/// Query parameters are form-decoded the way API gateways decode them; a non-UTF-8
/// body is passed on base64-encoded.
pub fn event_from_http(method: &Method, query: Option<&str>, body: &[u8]) -> InboundEvent {
    let params: HashMap<String, String> = query
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();
    let mut event = InboundEvent::http(method.as_str(), params, None);
    if !body.is_empty() {
        match std::str::from_utf8(body) {
            Ok(text) => event.body = Some(text.to_string()),
            Err(_) => {
                event.body = Some(BASE64.encode(body));
                event.is_base64_encoded = true;
            }
        }
    }
    event
}

pub fn envelope_to_response(envelope: ResponseEnvelope) -> Response {
    let status =
        StatusCode::from_u16(envelope.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = match envelope.body_bytes() {
        Ok(bytes) => bytes,
        Err(err) => {
            error!(error = %err, "response body is not valid base64");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    for (name, value) in &envelope.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                response.headers_mut().insert(name, value);
            }
            _ => warn!(header = %name, "dropping header that is not valid HTTP"),
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::ResponseBuilder;

    #[test]
    fn query_is_form_decoded_into_event() {
        let event = event_from_http(&Method::GET, Some("pdf=%7B%22url%22%3A1%7D&x=a+b"), b"");
        let params = event.query_string_parameters.unwrap();
        assert_eq!(params["pdf"], r#"{"url":1}"#);
        assert_eq!(params["x"], "a b");
        assert!(event.body.is_none());
    }

    #[test]
    fn binary_body_is_flagged_base64() {
        let event = event_from_http(&Method::POST, None, &[0xff, 0xfe]);
        assert!(event.is_base64_encoded);
        assert_eq!(event.body.as_deref(), Some("//4="));
        assert_eq!(event.method(), Some("POST"));
    }

    #[test]
    fn pdf_envelope_becomes_binary_response() {
        let response = envelope_to_response(ResponseBuilder::pdf(b"%PDF-1.4", Some("a.pdf")));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "application/pdf");
        assert_eq!(
            response.headers()["content-disposition"],
            "inline; filename=\"a.pdf\""
        );
    }

    #[test]
    fn invalid_header_values_are_dropped() {
        let response =
            envelope_to_response(ResponseBuilder::pdf(b"%PDF-", Some("bad\nname.pdf")));
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("content-disposition").is_none());
        assert!(response.headers().get("content-type").is_some());
    }
}
