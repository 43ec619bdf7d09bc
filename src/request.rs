use serde_json::{Map, Value};

use crate::pdf_options::PdfOptions;

/// Rendered when an event matches no trigger.
pub const DEFAULT_HTML: &str = "<h1>Hello, PDF World!</h1>";

/// File name used in `Content-Disposition` when the caller gives none.
pub const DEFAULT_FILE_NAME: &str = "output.pdf";

/// Payload key names; POST bodies and GET payloads spell them differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadKeys {
    pub content: &'static str,
    pub url: &'static str,
    pub config: &'static str,
    pub file_name: &'static str,
}

pub const POST_KEYS: PayloadKeys = PayloadKeys {
    content: "pdfContent",
    url: "pdfUrl",
    config: "pdfConfig",
    file_name: "fileName",
};

pub const GET_KEYS: PayloadKeys = PayloadKeys {
    content: "content",
    url: "url",
    config: "config",
    file_name: "fileName",
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderTarget {
    Html(String),
    Url(String),
}

impl RenderTarget {
    pub fn kind(&self) -> &'static str {
        match self {
            RenderTarget::Html(_) => "html",
            RenderTarget::Url(_) => "url",
        }
    }
}

/// A decoded render request. `target` is `None` when the payload had neither content nor url.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub target: Option<RenderTarget>,
    pub pdf_options: Map<String, Value>,
    pub file_name: Option<String>,
}

impl RenderRequest {
    /// Picks the render target out of `payload`; non-empty content wins over url.
    ///
    /// Only non-empty JSON strings count for content, url and file name, and a
    /// non-object config is treated as absent.
    pub fn resolve(payload: &Value, keys: &PayloadKeys) -> Self {
        let target = non_empty_str(payload, keys.content)
            .map(|html| RenderTarget::Html(html.to_string()))
            .or_else(|| {
                non_empty_str(payload, keys.url).map(|url| RenderTarget::Url(url.to_string()))
            });

        let pdf_options = match payload.get(keys.config) {
            Some(Value::Object(config)) => config.clone(),
            _ => Map::new(),
        };

        Self {
            target,
            pdf_options,
            file_name: non_empty_str(payload, keys.file_name).map(str::to_string),
        }
    }

    pub fn default_document() -> Self {
        Self {
            target: Some(RenderTarget::Html(DEFAULT_HTML.to_string())),
            pdf_options: Map::new(),
            file_name: None,
        }
    }

    pub fn html(html: impl Into<String>) -> Self {
        Self {
            target: Some(RenderTarget::Html(html.into())),
            pdf_options: Map::new(),
            file_name: None,
        }
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self {
            target: Some(RenderTarget::Url(url.into())),
            pdf_options: Map::new(),
            file_name: None,
        }
    }

    pub fn options(&self) -> PdfOptions {
        PdfOptions::merged(&self.pdf_options)
    }

    pub fn file_name_or_default(&self) -> &str {
        self.file_name.as_deref().unwrap_or(DEFAULT_FILE_NAME)
    }
}

fn non_empty_str<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}
