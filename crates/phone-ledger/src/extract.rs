//! Phone number extraction from uploaded images.
//!
//! The image is written to a scratch file, uploaded to Gemini, and the model
//! is asked for a JSON array of numbers. Its reply is untrusted: fences are
//! stripped, the array is parsed, and every entry goes through the validator.

use crate::error::LedgerError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use gemini_client::{Content, GeminiClient, Part};
use phone_store::normalize_phone_number;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

const DEFAULT_FILE_NAME: &str = "uploaded_image.jpeg";

const EXTRACTION_PROMPT: &str = "\
You are a software component that reads phone numbers out of images for an internal database. \
Find every valid US phone number visible in the attached image.

A valid US phone number has exactly 10 digits. Format each one as XXX-XXX-XXXX.

Reply with a single JSON array of the formatted numbers and nothing else: \
no explanations, no comments, no code fences, no stray words mixed in with the numbers. \
Example reply: [\"555-123-4567\", \"800-555-0199\"]

If the image holds no phone numbers, reply with nothing.";

const EXTRACTION_REQUEST: &str = "Extract phone numbers";

/// Decode a base64 image payload, tolerating a `data:` URL prefix and
/// embedded whitespace.
pub fn decode_image(payload: &str) -> Result<Vec<u8>, LedgerError> {
    let encoded = match payload.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => payload,
    };

    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| LedgerError::InvalidImageEncoding(e.to_string()))?;

    if bytes.is_empty() {
        return Err(LedgerError::InvalidImageEncoding("image is empty".into()));
    }

    Ok(bytes)
}

/// MIME type to announce for an uploaded file, from its extension.
pub fn mime_type_for(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}

/// Parse the model's reply into raw candidate strings.
///
/// An empty reply means no numbers were found.
pub fn parse_model_reply(reply: &str) -> Result<Vec<String>, LedgerError> {
    let text = reply.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let json = strip_code_fence(text);

    let values: Vec<Value> = serde_json::from_str(json).map_err(|e| {
        warn!(error = %e, "Model reply is not a JSON array");
        LedgerError::ExtractionResponseUnparseable(e.to_string())
    })?;

    Ok(values
        .into_iter()
        .filter_map(|value| match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            other => {
                warn!(entry = %other, "Ignoring non-string entry in model reply");
                None
            }
        })
        .collect())
}

/// Strip a surrounding ``` fence (with optional language tag).
fn strip_code_fence(text: &str) -> &str {
    if !text.starts_with("```") {
        return text;
    }

    let body = match text.find('\n') {
        Some(newline) => &text[newline + 1..],
        None => text.trim_start_matches('`'),
    };

    match body.rfind("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

/// Keep only the entries that normalize to a valid number.
pub fn validate_candidates(candidates: Vec<String>) -> Vec<String> {
    candidates
        .into_iter()
        .filter_map(|candidate| match normalize_phone_number(&candidate) {
            Ok(number) => {
                debug!(phone_number = %number, "Validated phone number");
                Some(number)
            }
            Err(e) => {
                warn!(candidate = %candidate, error = %e, "Dropping invalid number from model reply");
                None
            }
        })
        .collect()
}

/// Runs the image exchange with Gemini.
pub struct PhoneExtractor {
    gemini: GeminiClient,
    scratch_dir: PathBuf,
}

impl PhoneExtractor {
    pub fn new(gemini: GeminiClient, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            gemini,
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Extract validated phone numbers from an image.
    ///
    /// The scratch file is removed whether or not the exchange succeeds.
    #[instrument(skip(self, image), fields(bytes = image.len()))]
    pub async fn extract(
        &self,
        image: &[u8],
        file_name: Option<&str>,
    ) -> Result<Vec<String>, LedgerError> {
        let file_name = sanitize_file_name(file_name);
        let scratch = self.write_scratch(image, &file_name).await?;

        let reply = self.ask_model(scratch.path(), mime_type_for(&file_name)).await;

        let path = scratch.path().to_path_buf();
        match scratch.close() {
            Ok(()) => debug!(path = %path.display(), "Scratch image removed"),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove scratch image"),
        }

        let reply = reply?;
        info!(reply = %reply, "Raw reply from Gemini");

        let numbers = validate_candidates(parse_model_reply(&reply)?);
        info!(count = numbers.len(), "Phone numbers extracted");
        Ok(numbers)
    }

    async fn write_scratch(&self, image: &[u8], file_name: &str) -> Result<NamedTempFile, LedgerError> {
        let scratch = tempfile::Builder::new()
            .prefix(&format!("{}_", Uuid::new_v4()))
            .suffix(file_name)
            .rand_bytes(0)
            .tempfile_in(&self.scratch_dir)?;

        tokio::fs::write(scratch.path(), image).await?;
        debug!(path = %scratch.path().display(), "Image saved to scratch file");

        Ok(scratch)
    }

    async fn ask_model(&self, path: &Path, mime_type: &str) -> Result<String, LedgerError> {
        let uploaded = self.gemini.upload_file(path, mime_type).await?;

        let contents = vec![Content::user(vec![
            Part::file(&uploaded),
            Part::text(EXTRACTION_PROMPT),
            Part::text(EXTRACTION_REQUEST),
        ])];

        match self.gemini.generate_content(contents).await {
            Ok(reply) => Ok(reply),
            Err(gemini_client::GeminiError::EmptyResponse) => {
                info!("Gemini returned no candidates; treating as no numbers");
                Ok(String::new())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Keep only the final path component of a client-supplied name.
fn sanitize_file_name(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| Path::new(name).file_name())
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_FILE_NAME)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_image() {
        assert_eq!(decode_image("aGVsbG8=").unwrap(), b"hello");
        assert_eq!(decode_image("data:image/png;base64,aGVs\nbG8=").unwrap(), b"hello");
        assert!(matches!(
            decode_image("not base64!!"),
            Err(LedgerError::InvalidImageEncoding(_))
        ));
        assert!(matches!(decode_image(""), Err(LedgerError::InvalidImageEncoding(_))));
    }

    #[test]
    fn test_mime_type_for() {
        assert_eq!(mime_type_for("receipt.PNG"), "image/png");
        assert_eq!(mime_type_for("scan.webp"), "image/webp");
        assert_eq!(mime_type_for("photo.jpg"), "image/jpeg");
        assert_eq!(mime_type_for("noextension"), "image/jpeg");
    }

    #[test]
    fn test_parse_plain_array() {
        let parsed = parse_model_reply(r#"["555-123-4567", "800-555-0199"]"#).unwrap();
        assert_eq!(parsed, vec!["555-123-4567", "800-555-0199"]);
    }

    #[test]
    fn test_parse_fenced_array() {
        let reply = "```json\n[\"555-123-4567\"]\n```";
        assert_eq!(parse_model_reply(reply).unwrap(), vec!["555-123-4567"]);

        let bare_fence = "```\n[]\n```\n";
        assert!(parse_model_reply(bare_fence).unwrap().is_empty());
    }

    #[test]
    fn test_parse_empty_reply() {
        assert!(parse_model_reply("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_prose() {
        let result = parse_model_reply("I found these numbers: 555-123-4567");
        assert!(matches!(result, Err(LedgerError::ExtractionResponseUnparseable(_))));

        let result = parse_model_reply(r#"{"numbers": ["555-123-4567"]}"#);
        assert!(matches!(result, Err(LedgerError::ExtractionResponseUnparseable(_))));
    }

    #[test]
    fn test_parse_keeps_numeric_entries() {
        let parsed = parse_model_reply(r#"["555-123-4567", 8005550199, null]"#).unwrap();
        assert_eq!(parsed, vec!["555-123-4567", "8005550199"]);
    }

    #[test]
    fn test_validate_candidates_drops_invalid() {
        let validated = validate_candidates(vec![
            "555-123-4567".into(),
            "Invalid USA phone number.".into(),
            "1 (800) 555-0199".into(),
            "12345".into(),
        ]);
        assert_eq!(validated, vec!["555-123-4567", "800-555-0199"]);
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name(None), DEFAULT_FILE_NAME);
        assert_eq!(sanitize_file_name(Some("../../etc/passwd")), "passwd");
        assert_eq!(sanitize_file_name(Some("receipt.png")), "receipt.png");
        assert_eq!(sanitize_file_name(Some("")), DEFAULT_FILE_NAME);
    }
}
