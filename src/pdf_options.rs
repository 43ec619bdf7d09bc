//! PDF export options: a fixed baseline, shallow caller overrides, and
//! conversion into engine print parameters.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{PdfGenError, Result};

const CSS_PX_PER_INCH: f64 = 96.0;

/// Paper formats in inches (width, height).
const PAPER_FORMATS: &[(&str, f64, f64)] = &[
    ("letter", 8.5, 11.0),
    ("legal", 8.5, 14.0),
    ("tabloid", 11.0, 17.0),
    ("ledger", 17.0, 11.0),
    ("a0", 33.1, 46.8),
    ("a1", 23.4, 33.1),
    ("a2", 16.54, 23.4),
    ("a3", 11.7, 16.54),
    ("a4", 8.27, 11.7),
    ("a5", 5.83, 8.27),
    ("a6", 4.13, 5.83),
];

/// Top-level option map; caller keys replace baseline keys wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfOptions(Map<String, Value>);

impl Default for PdfOptions {
    fn default() -> Self {
        Self::baseline()
    }
}

impl PdfOptions {
    /// `format = "A4"`, `printBackground = true`.
    pub fn baseline() -> Self {
        let mut map = Map::new();
        map.insert("format".to_string(), Value::from("A4"));
        map.insert("printBackground".to_string(), Value::Bool(true));
        Self(map)
    }

    /// Baseline with every caller key laid over it. Nested values are not merged.
    pub fn merged(overrides: &Map<String, Value>) -> Self {
        let mut options = Self::baseline();
        for (key, value) in overrides {
            options.0.insert(key.clone(), value.clone());
        }
        options
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn to_print_params(&self) -> Result<PrintParams> {
        let (mut paper_width, mut paper_height) = match self.0.get("format") {
            Some(Value::String(name)) => paper_format(name)?,
            Some(Value::Null) | None => paper_format("a4")?,
            Some(other) => {
                return Err(PdfGenError::render(format!(
                    "Invalid value for format: {other}"
                )))
            }
        };
        if let Some(width) = self.length("width")? {
            paper_width = width;
        }
        if let Some(height) = self.length("height")? {
            paper_height = height;
        }

        let margin = match self.0.get("margin") {
            Some(Value::Object(margin)) => Margins {
                top: length_field(margin, "top")?.unwrap_or(0.0),
                right: length_field(margin, "right")?.unwrap_or(0.0),
                bottom: length_field(margin, "bottom")?.unwrap_or(0.0),
                left: length_field(margin, "left")?.unwrap_or(0.0),
            },
            Some(Value::Null) | None => Margins::default(),
            Some(other) => {
                return Err(PdfGenError::render(format!(
                    "Invalid value for margin: {other}"
                )))
            }
        };

        Ok(PrintParams {
            landscape: self.flag("landscape")?.unwrap_or(false),
            display_header_footer: self.flag("displayHeaderFooter")?.unwrap_or(false),
            print_background: self.flag("printBackground")?.unwrap_or(false),
            scale: self.number("scale")?.unwrap_or(1.0),
            paper_width,
            paper_height,
            margin,
            page_ranges: self.text("pageRanges")?,
            header_template: self.text("headerTemplate")?,
            footer_template: self.text("footerTemplate")?,
            prefer_css_page_size: self.flag("preferCSSPageSize")?.unwrap_or(false),
        })
    }

    fn flag(&self, key: &str) -> Result<Option<bool>> {
        match self.0.get(key) {
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::Null) | None => Ok(None),
            Some(other) => Err(invalid(key, other)),
        }
    }

    fn number(&self, key: &str) -> Result<Option<f64>> {
        match self.0.get(key) {
            Some(Value::Number(n)) => Ok(n.as_f64()),
            Some(Value::Null) | None => Ok(None),
            Some(other) => Err(invalid(key, other)),
        }
    }

    fn text(&self, key: &str) -> Result<Option<String>> {
        match self.0.get(key) {
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Null) | None => Ok(None),
            Some(other) => Err(invalid(key, other)),
        }
    }

    fn length(&self, key: &str) -> Result<Option<f64>> {
        length_field(&self.0, key)
    }
}

/// Engine-neutral print parameters; all lengths in inches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintParams {
    pub landscape: bool,
    pub display_header_footer: bool,
    pub print_background: bool,
    pub scale: f64,
    pub paper_width: f64,
    pub paper_height: f64,
    pub margin: Margins,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_ranges: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer_template: Option<String>,
    pub prefer_css_page_size: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

fn paper_format(name: &str) -> Result<(f64, f64)> {
    let lower = name.to_ascii_lowercase();
    PAPER_FORMATS
        .iter()
        .find(|(format, _, _)| *format == lower)
        .map(|(_, width, height)| (*width, *height))
        .ok_or_else(|| PdfGenError::render(format!("Unknown paper format: {name}")))
}

fn length_field(map: &Map<String, Value>, key: &str) -> Result<Option<f64>> {
    match map.get(key) {
        Some(Value::Number(n)) => Ok(n.as_f64().map(|px| px / CSS_PX_PER_INCH)),
        Some(Value::String(s)) => parse_length(s).map(Some),
        Some(Value::Null) | None => Ok(None),
        Some(other) => Err(invalid(key, other)),
    }
}

/// Parses `"10px"`, `"1in"`, `"2.5cm"`, `"20mm"` or a bare pixel count into inches.
pub fn parse_length(raw: &str) -> Result<f64> {
    let text = raw.trim();
    let lower = text.to_ascii_lowercase();
    let (number, per_unit) = match lower.get(lower.len().saturating_sub(2)..) {
        Some("px") => (&text[..text.len() - 2], 1.0),
        Some("in") => (&text[..text.len() - 2], CSS_PX_PER_INCH),
        Some("cm") => (&text[..text.len() - 2], 37.8),
        Some("mm") => (&text[..text.len() - 2], 3.78),
        _ => (text, 1.0),
    };
    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| PdfGenError::render(format!("Failed to parse parameter value: '{raw}'")))?;
    Ok(value * per_unit / CSS_PX_PER_INCH)
}

fn invalid(key: &str, value: &Value) -> PdfGenError {
    PdfGenError::render(format!("Invalid value for {key}: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn baseline_is_a4_with_background() {
        let params = PdfOptions::baseline().to_print_params().unwrap();
        assert!(close(params.paper_width, 8.27));
        assert!(close(params.paper_height, 11.7));
        assert!(params.print_background);
        assert!(!params.landscape);
        assert_eq!(params.margin, Margins::default());
        assert!(close(params.scale, 1.0));
    }

    #[test]
    fn caller_margin_keeps_baseline_keys() {
        let options = PdfOptions::merged(&map(json!({"margin": {"top": "1in"}})));
        assert_eq!(options.get("format"), Some(&json!("A4")));
        assert_eq!(options.get("printBackground"), Some(&json!(true)));

        let params = options.to_print_params().unwrap();
        assert!(close(params.margin.top, 1.0));
        assert!(close(params.margin.left, 0.0));
        assert!(params.print_background);
        assert!(close(params.paper_width, 8.27));
    }

    #[test]
    fn caller_wins_on_conflicting_keys() {
        let options = PdfOptions::merged(&map(json!({
            "format": "letter",
            "printBackground": false,
            "landscape": true
        })));
        let params = options.to_print_params().unwrap();
        assert!(close(params.paper_width, 8.5));
        assert!(close(params.paper_height, 11.0));
        assert!(!params.print_background);
        assert!(params.landscape);
    }

    #[test]
    fn merge_is_shallow() {
        let base = PdfOptions::merged(&map(json!({"margin": {"top": "1in", "left": "1in"}})));
        let layered = PdfOptions::merged(&map(json!({"margin": {"top": "2in"}})));
        assert_ne!(base.get("margin"), layered.get("margin"));
        assert_eq!(layered.get("margin"), Some(&json!({"top": "2in"})));
    }

    #[test]
    fn explicit_size_overrides_format() {
        let options = PdfOptions::merged(&map(json!({"width": "210mm", "height": 480})));
        let params = options.to_print_params().unwrap();
        assert!((params.paper_width - 8.2687).abs() < 1e-3);
        assert!(close(params.paper_height, 5.0));
    }

    #[test]
    fn parse_length_handles_units() {
        assert!(close(parse_length("96px").unwrap(), 1.0));
        assert!(close(parse_length("96").unwrap(), 1.0));
        assert!(close(parse_length("2in").unwrap(), 2.0));
        assert!((parse_length("2.54cm").unwrap() - 1.0).abs() < 1e-3);
        assert!((parse_length("25.4MM").unwrap() - 1.0).abs() < 1e-3);
        assert!(parse_length("wide").is_err());
    }

    #[test]
    fn unknown_format_is_a_render_error() {
        let options = PdfOptions::merged(&map(json!({"format": "B9"})));
        let err = options.to_print_params().unwrap_err();
        assert!(matches!(err, PdfGenError::Render(ref msg) if msg.contains("B9")));
    }

    #[test]
    fn wrongly_typed_values_are_rejected() {
        let options = PdfOptions::merged(&map(json!({"landscape": "yes"})));
        assert!(options.to_print_params().is_err());
    }

    #[test]
    fn templates_and_ranges_pass_through() {
        let options = PdfOptions::merged(&map(json!({
            "displayHeaderFooter": true,
            "headerTemplate": "<span class=title></span>",
            "pageRanges": "1-2",
            "scale": 0.8
        })));
        let params = options.to_print_params().unwrap();
        assert!(params.display_header_footer);
        assert_eq!(params.page_ranges.as_deref(), Some("1-2"));
        assert_eq!(
            params.header_template.as_deref(),
            Some("<span class=title></span>")
        );
        assert!(params.footer_template.is_none());
        assert!(close(params.scale, 0.8));
    }
}
