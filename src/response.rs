//! Transport-level response envelopes.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::ser::Formatter;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::io;

use crate::request::DEFAULT_FILE_NAME;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_DISPOSITION: &str = "Content-Disposition";

/// Envelope handed back to the invoking platform.
///
/// `is_base64_encoded` is serialized under the platform's `isBase64Encoded`
/// key and only when set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    pub body: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_base64_encoded: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl ResponseEnvelope {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Raw body bytes, undoing base64 when the envelope carries a binary body.
    pub fn body_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        if self.is_base64_encoded {
            BASE64.decode(&self.body)
        } else {
            Ok(self.body.clone().into_bytes())
        }
    }
}

pub struct ResponseBuilder;

impl ResponseBuilder {
    /// 200 with the PDF inline under `file_name` (default `output.pdf`).
    pub fn pdf(bytes: &[u8], file_name: Option<&str>) -> ResponseEnvelope {
        let name = file_name.unwrap_or(DEFAULT_FILE_NAME);
        let mut headers = BTreeMap::new();
        headers.insert(CONTENT_TYPE.to_string(), "application/pdf".to_string());
        headers.insert(
            CONTENT_DISPOSITION.to_string(),
            format!("inline; filename=\"{name}\""),
        );
        ResponseEnvelope {
            status_code: 200,
            headers,
            body: BASE64.encode(bytes),
            is_base64_encoded: true,
        }
    }

    /// 200 echoing a POST body that had nothing to render.
    ///
    /// Numbers are written the way JavaScript's `JSON.stringify` writes them,
    /// so `1.0` echoes as `1` and `1e21` as `1e+21`.
    pub fn echo(body: &Value) -> ResponseEnvelope {
        let mut envelope = Self::json(200, body);
        envelope.body = to_js_json(body);
        envelope
    }

    pub fn invalid_parameters() -> ResponseEnvelope {
        ResponseEnvelope {
            status_code: 400,
            headers: BTreeMap::new(),
            body: json!({"error": "Invalid query parameters"}).to_string(),
            is_base64_encoded: false,
        }
    }

    pub fn error(message: &str) -> ResponseEnvelope {
        Self::json(500, &json!({ "error": message }))
    }

    fn json(status_code: u16, body: &Value) -> ResponseEnvelope {
        let mut headers = BTreeMap::new();
        headers.insert(CONTENT_TYPE.to_string(), "application/json".to_string());
        ResponseEnvelope {
            status_code,
            headers,
            body: body.to_string(),
            is_base64_encoded: false,
        }
    }
}

fn to_js_json(value: &Value) -> String {
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, JsNumberFormatter);
    match value.serialize(&mut serializer) {
        Ok(()) => String::from_utf8(out).unwrap_or_else(|_| value.to_string()),
        Err(_) => value.to_string(),
    }
}

struct JsNumberFormatter;

impl Formatter for JsNumberFormatter {
    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(js_number(value).as_bytes())
    }
}

/// ECMAScript `Number::toString` for finite values.
fn js_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    // shortest round-trip digits, e.g. "1.2345e-7"
    let sci = format!("{:e}", value.abs());
    let Some((mantissa, exponent)) = sci.split_once('e') else {
        return value.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return value.to_string();
    };
    let digits = mantissa.replace('.', "");
    let k = digits.len() as i32;
    let n = exponent + 1;

    let magnitude = if k <= n && n <= 21 {
        format!("{digits}{}", "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        format!("{int}.{frac}")
    } else if -6 < n && n <= 0 {
        format!("0.{}{digits}", "0".repeat((-n) as usize))
    } else {
        let e = n - 1;
        let sign = if e >= 0 { "+" } else { "-" };
        let (lead, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{lead}e{sign}{}", e.abs())
        } else {
            format!("{lead}.{rest}e{sign}{}", e.abs())
        }
    };
    if value < 0.0 {
        format!("-{magnitude}")
    } else {
        magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_envelope_is_base64_with_inline_disposition() {
        let env = ResponseBuilder::pdf(b"%PDF-1.4 test", Some("report.pdf"));
        assert_eq!(env.status_code, 200);
        assert!(env.is_base64_encoded);
        assert_eq!(env.header("content-type"), Some("application/pdf"));
        assert_eq!(
            env.header(CONTENT_DISPOSITION),
            Some("inline; filename=\"report.pdf\"")
        );
        assert_eq!(env.body_bytes().unwrap(), b"%PDF-1.4 test".to_vec());
    }

    #[test]
    fn pdf_envelope_defaults_file_name() {
        let env = ResponseBuilder::pdf(b"%PDF-", None);
        assert_eq!(
            env.header(CONTENT_DISPOSITION),
            Some("inline; filename=\"output.pdf\"")
        );
    }

    #[test]
    fn invalid_parameters_has_exact_body_and_no_headers() {
        let env = ResponseBuilder::invalid_parameters();
        assert_eq!(env.status_code, 400);
        assert_eq!(env.body, r#"{"error":"Invalid query parameters"}"#);
        assert!(env.headers.is_empty());
        assert!(!env.is_base64_encoded);
    }

    #[test]
    fn error_envelope_carries_message() {
        let env = ResponseBuilder::error("boom \"quoted\"");
        assert_eq!(env.status_code, 500);
        assert_eq!(env.header(CONTENT_TYPE), Some("application/json"));
        assert_eq!(env.body, r#"{"error":"boom \"quoted\""}"#);
    }

    #[test]
    fn echo_writes_numbers_like_json_stringify() {
        let body: Value = serde_json::from_str(
            r#"{"pdfConfig":{"scale":1.0,"x":1e2,"y":-0.0,"z":1.5e-7,"w":1e21,"v":0.000001,"n":-2.50,"i":7}}"#,
        )
        .unwrap();
        let env = ResponseBuilder::echo(&body);
        assert_eq!(
            env.body,
            r#"{"pdfConfig":{"scale":1,"x":100,"y":0,"z":1.5e-7,"w":1e+21,"v":0.000001,"n":-2.5,"i":7}}"#
        );
        assert_eq!(env.header(CONTENT_TYPE), Some("application/json"));
    }

    #[test]
    fn js_number_switches_to_exponent_form_at_js_thresholds() {
        assert_eq!(js_number(123456.789), "123456.789");
        assert_eq!(js_number(1e20), "100000000000000000000");
        assert_eq!(js_number(1.5e21), "1.5e+21");
        assert_eq!(js_number(0.0000015), "0.0000015");
        assert_eq!(js_number(1e-7), "1e-7");
        assert_eq!(js_number(-0.1), "-0.1");
    }

    #[test]
    fn echo_preserves_key_order() {
        let body: Value = serde_json::from_str(r#"{"z":1,"a":{"y":true,"b":null}}"#).unwrap();
        let env = ResponseBuilder::echo(&body);
        assert_eq!(env.body, r#"{"z":1,"a":{"y":true,"b":null}}"#);
    }

    #[test]
    fn serializes_platform_field_names() {
        let value = serde_json::to_value(ResponseBuilder::pdf(b"x", None)).unwrap();
        assert_eq!(value["statusCode"], 200);
        assert_eq!(value["isBase64Encoded"], true);

        let value = serde_json::to_value(ResponseBuilder::invalid_parameters()).unwrap();
        assert!(value.get("isBase64Encoded").is_none());
        assert!(value.get("headers").is_none());
    }
}
