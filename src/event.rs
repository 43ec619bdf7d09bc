//! Inbound platform events and their classification into render triggers.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::{PdfGenError, Result};

/// Query parameter carrying the GET payload.
pub const PDF_QUERY_PARAM: &str = "pdf";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_context: Option<RequestContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_string_parameters: Option<HashMap<String, String>>,
    /// Set when the event carried a body that is not a string; a POST then fails.
    #[serde(skip)]
    pub body_error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpContext>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl InboundEvent {
    pub fn http(
        method: impl Into<String>,
        query: HashMap<String, String>,
        body: Option<String>,
    ) -> Self {
        Self {
            request_context: Some(RequestContext {
                http: Some(HttpContext {
                    method: Some(method.into()),
                }),
            }),
            body,
            is_base64_encoded: false,
            query_string_parameters: if query.is_empty() { None } else { Some(query) },
            body_error: None,
        }
    }

    /// Reads an event from arbitrary JSON, field by field.
    ///
    /// A non-object event or a malformed `requestContext` gives an empty event,
    /// which classifies as the default trigger. Scalar bodies and query values are
    /// taken as their JSON text. An object or array body is kept as `body_error`
    /// so a POST fails with 500 instead of silently rendering the default document.
    pub fn from_value_lenient(value: Value) -> Self {
        let Value::Object(mut fields) = value else {
            return Self::default();
        };
        let request_context = match fields.remove("requestContext") {
            None | Some(Value::Null) => None,
            Some(raw) => match serde_json::from_value::<RequestContext>(raw) {
                Ok(ctx) => Some(ctx),
                Err(_) => return Self::default(),
            },
        };

        let mut event = Self {
            request_context,
            is_base64_encoded: fields
                .get("isBase64Encoded")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            ..Self::default()
        };
        match fields.remove("body") {
            None | Some(Value::Null) => {}
            Some(Value::String(text)) => event.body = Some(text),
            Some(raw @ (Value::Number(_) | Value::Bool(_))) => {
                event.body = Some(raw.to_string());
            }
            Some(_) => {
                event.body_error = Some("Request body must be a JSON string".to_string());
            }
        }
        if let Some(Value::Object(params)) = fields.remove("queryStringParameters") {
            let params: HashMap<String, String> = params
                .into_iter()
                .filter_map(|(name, value)| match value {
                    Value::String(text) => Some((name, text)),
                    Value::Number(_) | Value::Bool(_) => Some((name, value.to_string())),
                    _ => None,
                })
                .collect();
            event.query_string_parameters = Some(params);
        }
        event
    }

    pub fn method(&self) -> Option<&str> {
        self.request_context
            .as_ref()
            .and_then(|ctx| ctx.http.as_ref())
            .and_then(|http| http.method.as_deref())
    }

    fn query_param(&self, name: &str) -> Option<&str> {
        self.query_string_parameters
            .as_ref()
            .and_then(|params| params.get(name))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderTrigger {
    /// POST with its body parsed as JSON.
    Post { body: Value },
    /// GET with the decoded `pdf` query parameter.
    Get { payload: Value },
    Default,
}

impl RenderTrigger {
    pub fn classify(event: &InboundEvent) -> Result<Self> {
        match event.method() {
            Some("POST") => Ok(RenderTrigger::Post {
                body: parse_post_body(event)?,
            }),
            Some("GET") => match event.query_param(PDF_QUERY_PARAM) {
                Some(raw) if !raw.is_empty() => {
                    let decoded = decode_uri(raw)?;
                    Ok(RenderTrigger::Get {
                        payload: parse_payload(&decoded)?,
                    })
                }
                _ => Ok(RenderTrigger::Default),
            },
            _ => Ok(RenderTrigger::Default),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RenderTrigger::Post { .. } => "post",
            RenderTrigger::Get { .. } => "get",
            RenderTrigger::Default => "default",
        }
    }
}

fn parse_post_body(event: &InboundEvent) -> Result<Value> {
    if let Some(message) = &event.body_error {
        return Err(PdfGenError::InvalidEvent(message.clone()));
    }
    let raw = match event.body.as_deref() {
        None | Some("") => return Ok(Value::Object(Map::new())),
        Some(raw) => raw,
    };
    if event.is_base64_encoded {
        let bytes = BASE64
            .decode(raw.trim())
            .map_err(|e| PdfGenError::InvalidEvent(format!("Invalid base64 body: {e}")))?;
        let text = String::from_utf8(bytes)
            .map_err(|_| PdfGenError::InvalidEvent("Request body is not UTF-8".to_string()))?;
        parse_payload(&text)
    } else {
        parse_payload(raw)
    }
}

fn parse_payload(raw: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(raw)?;
    if value.is_null() {
        return Err(PdfGenError::InvalidEvent(
            "Request payload must not be null".to_string(),
        ));
    }
    Ok(value)
}

/// Percent-decodes like `decodeURI`: escapes of reserved URI characters are kept
/// verbatim and malformed escapes or invalid UTF-8 are an error.
pub fn decode_uri(input: &str) -> Result<String> {
    const RESERVED: &[u8] = b";/?:@&=+$,#";

    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        let decoded = bytes
            .get(i + 1..i + 3)
            .filter(|hex| hex.iter().all(u8::is_ascii_hexdigit))
            .and_then(|hex| std::str::from_utf8(hex).ok())
            .and_then(|hex| u8::from_str_radix(hex, 16).ok())
            .ok_or_else(|| PdfGenError::InvalidEvent("URI malformed".to_string()))?;
        if RESERVED.contains(&decoded) {
            out.extend_from_slice(&bytes[i..i + 3]);
        } else {
            out.push(decoded);
        }
        i += 3;
    }
    String::from_utf8(out).map_err(|_| PdfGenError::InvalidEvent("URI malformed".to_string()))
}
