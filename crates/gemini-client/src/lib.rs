//! Google Gemini client: file upload plus `generateContent`.

mod client;
mod error;
mod types;

pub use client::GeminiClient;
pub use error::GeminiError;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_client(mock_server: &MockServer) -> GeminiClient {
        GeminiClient::new(
            "test-api-key",
            mock_server.uri(),
            "test-model",
            Duration::from_secs(30),
        )
        .unwrap()
    }

    fn uploaded_file() -> UploadedFile {
        UploadedFile {
            name: "files/abc-123".into(),
            uri: "https://example.test/v1beta/files/abc-123".into(),
            mime_type: "image/jpeg".into(),
            display_name: None,
            size_bytes: None,
        }
    }

    #[tokio::test]
    async fn test_upload_file_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/upload/v1beta/files"))
            .and(query_param("uploadType", "media"))
            .and(header("x-goog-api-key", "test-api-key"))
            .and(header("Content-Type", "image/png"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "file": {
                    "name": "files/abc-123",
                    "uri": "https://example.test/v1beta/files/abc-123",
                    "mimeType": "image/png",
                    "sizeBytes": "4"
                }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("receipt.png");
        std::fs::write(&image, [0x89, b'P', b'N', b'G']).unwrap();

        let client = create_test_client(&mock_server);
        let uploaded = client.upload_file(&image, "image/png").await.unwrap();

        assert_eq!(uploaded.name, "files/abc-123");
        assert_eq!(uploaded.mime_type, "image/png");
    }

    #[tokio::test]
    async fn test_upload_missing_file() {
        let mock_server = MockServer::start().await;
        let client = create_test_client(&mock_server);

        let result = client
            .upload_file(std::path::Path::new("/nonexistent/receipt.jpeg"), "image/jpeg")
            .await;
        assert!(matches!(result, Err(GeminiError::Io(_))));
    }

    #[tokio::test]
    async fn test_generate_content_success() {
        let mock_server = MockServer::start().await;

        let response_body = serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "[\"555-123-4567\", "}, {"text": "\"800-555-0199\"]"}]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": {
                "promptTokenCount": 300,
                "candidatesTokenCount": 20,
                "totalTokenCount": 320
            }
        });

        Mock::given(method("POST"))
            .and(path("/v1beta/models/test-model:generateContent"))
            .and(header("x-goog-api-key", "test-api-key"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        {"fileData": {"mimeType": "image/jpeg", "fileUri": "https://example.test/v1beta/files/abc-123"}},
                        {"text": "Extract phone numbers"}
                    ]
                }],
                "generationConfig": {"topK": 40, "maxOutputTokens": 8192, "responseMimeType": "text/plain"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let contents = vec![Content::user(vec![
            Part::file(&uploaded_file()),
            Part::text("Extract phone numbers"),
        ])];

        let text = client.generate_content(contents).await.unwrap();
        assert_eq!(text, "[\"555-123-4567\", \"800-555-0199\"]");
    }

    #[tokio::test]
    async fn test_generate_content_no_candidates() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/test-model:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client
            .generate_content(vec![Content::user(vec![Part::text("hi")])])
            .await;
        assert!(matches!(result, Err(GeminiError::EmptyResponse)));
    }

    #[tokio::test]
    async fn test_generate_content_rate_limit() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/test-model:generateContent"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client
            .generate_content(vec![Content::user(vec![Part::text("hi")])])
            .await;
        assert!(matches!(result, Err(GeminiError::RateLimit)));
    }

    #[tokio::test]
    async fn test_generate_content_forbidden() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/test-model:generateContent"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client
            .generate_content(vec![Content::user(vec![Part::text("hi")])])
            .await;
        assert!(matches!(result, Err(GeminiError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_generate_content_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/test-model:generateContent"))
            .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client
            .generate_content(vec![Content::user(vec![Part::text("hi")])])
            .await;

        match result {
            Err(GeminiError::Api { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "backend exploded");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/test-model:generateContent"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"candidates": []}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        let client = GeminiClient::new(
            "test-api-key",
            mock_server.uri(),
            "test-model",
            Duration::from_millis(200),
        )
        .unwrap();

        let result = client
            .generate_content(vec![Content::user(vec![Part::text("hi")])])
            .await;
        assert!(matches!(result, Err(GeminiError::Http(e)) if e.is_timeout()));
    }

    #[test]
    fn test_part_serialization() {
        let json = serde_json::to_value(Part::file(&uploaded_file())).unwrap();
        assert_eq!(json["fileData"]["mimeType"], "image/jpeg");
        assert_eq!(json["fileData"]["fileUri"], "https://example.test/v1beta/files/abc-123");

        let json = serde_json::to_value(Part::text("hello")).unwrap();
        assert_eq!(json, serde_json::json!({"text": "hello"}));
    }

    #[test]
    fn test_candidate_text_skips_other_parts() {
        let candidate: Candidate = serde_json::from_value(serde_json::json!({
            "content": {
                "parts": [
                    {"inlineData": {"mimeType": "image/png", "data": "AAAA"}},
                    {"text": "[]"}
                ]
            }
        }))
        .unwrap();
        assert_eq!(candidate.text(), "[]");
    }

    #[test]
    fn test_model_getter() {
        let client = GeminiClient::new("k", "http://localhost:1/", "gemini-1.5-flash-8b", Duration::from_secs(1)).unwrap();
        assert_eq!(client.model(), "gemini-1.5-flash-8b");
    }
}
