//! Extraction prompt construction (spec §4.3, step 1).

use handlebars::Handlebars;

use crate::{document::DocumentKind, prelude::*};

/// Markers that, if already present at the start of the OCR markdown,
/// mean the caller has pre-wrapped the input with its own extraction
/// preamble. When present we pass the markdown through unchanged
/// instead of wrapping it again (spec §4.3, step 1; spec §8,
/// invariant 7 — passthrough must be byte-identical).
const PASSTHROUGH_MARKERS: &[&str] = &["<!-- extraction-ready -->", "<!-- doc-scan:raw -->"];

const WRAPPER_TEMPLATE: &str = "\
# Extract {{schema_title}}

You are extracting structured data from a document that has already \
been OCR'd to Markdown below. Follow these rules strictly:

- Never invent values that are not visibly present in the text.
- Prefer omitting a field over guessing its value.
- If the input is empty, unintelligible, or plainly not a {{schema_title}}, \
set `isValidInput` to `false` and omit every other optional field.
- Respond with a single JSON object matching exactly this schema:

```json
{{{schema_json}}}
```

## OCR output

{{{markdown}}}
";

/// Returns `true` if `markdown` already carries one of our passthrough
/// markers.
pub fn is_passthrough(markdown: &str) -> bool {
    PASSTHROUGH_MARKERS
        .iter()
        .any(|marker| markdown.trim_start().starts_with(marker))
}

/// Build the extraction user prompt for a given document kind, OCR
/// markdown, and target JSON Schema.
pub fn build_extraction_prompt(kind: DocumentKind, markdown: &str, schema: &Value) -> Result<String> {
    if is_passthrough(markdown) {
        return Ok(markdown.to_string());
    }
    let handlebars = Handlebars::new();
    let schema_json = serde_json::to_string_pretty(schema)
        .map_err(|e| ScanError::Config(format!("failed to serialize schema: {e}")))?;
    handlebars
        .render_template(
            WRAPPER_TEMPLATE,
            &json!({
                "schema_title": kind.as_str(),
                "schema_json": schema_json,
                "markdown": markdown,
            }),
        )
        .map_err(|e| ScanError::Config(format!("failed to render extraction prompt: {e}")))
}

/// The system prompt shared by every extractor variant (spec §4.3:
/// "forbids invention ... instructs to set isValidInput=false ...
/// names the schema").
pub const EXTRACTION_SYSTEM_PROMPT: &str = "You are a meticulous document data extractor. \
Extract only what is visibly present; never invent field values. Respond with exactly one \
JSON object and nothing else.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_detection() {
        let markdown = "<!-- extraction-ready -->\nalready wrapped";
        assert!(is_passthrough(markdown));
        let prompt = build_extraction_prompt(DocumentKind::Check, markdown, &json!({})).unwrap();
        assert_eq!(prompt, markdown);
    }

    #[test]
    fn test_wraps_plain_markdown() {
        let markdown = "Check #1234\nPay to John Doe";
        let schema = json!({"type": "object"});
        let prompt = build_extraction_prompt(DocumentKind::Check, markdown, &schema).unwrap();
        assert!(prompt.contains("Check #1234"));
        assert!(prompt.contains("isValidInput"));
        assert!(prompt.contains("\"type\": \"object\""));
    }
}
