use std::sync::Arc;
use std::time::Duration;

use httpmock::prelude::*;
use romanize::{
    ArtifactStore, LlmProvider, LlmTransliterator, NamePipeline, PipelineError,
    TransliterationError, Transliterator,
};
use serde_json::json;
use tempfile::TempDir;

const GEMINI_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn gemini_reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

fn gemini(server: &MockServer) -> LlmTransliterator {
    LlmTransliterator::new(LlmProvider::Gemini, "test-key")
        .with_base_url(&server.base_url())
        .with_retry_delay(Duration::ZERO)
}

#[tokio::test]
async fn test_gemini_batch_request_and_response() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(GEMINI_PATH)
                .header("x-goog-api-key", "test-key")
                .body_contains("Return exactly 2 names")
                .body_contains("responseSchema");
            then.status(200)
                .json_body(gemini_reply(r#"["Amitabh Bachchan", "Shahrukh Khan"]"#));
        })
        .await;

    let result = gemini(&server)
        .transliterate_batch(&names(&["अमिताभ बच्चन", "शाहरुख़ ख़ान"]))
        .await
        .unwrap();

    assert_eq!(result, vec!["Amitabh Bachchan", "Shahrukh Khan"]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_anthropic_list_literal_response() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/messages")
                .header("x-api-key", "test-key")
                .header("anthropic-version", "2023-06-01");
            then.status(200).json_body(json!({
                "id": "msg_01",
                "type": "message",
                "role": "assistant",
                "content": [{ "type": "text", "text": "['Ram', 'Sita']" }]
            }));
        })
        .await;

    let client = LlmTransliterator::new(LlmProvider::Anthropic, "test-key")
        .with_base_url(&server.base_url());
    let result = client.transliterate_batch(&names(&["राम", "सीता"])).await.unwrap();

    assert_eq!(result, vec!["Ram", "Sita"]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_api_error_message_is_surfaced_without_retry() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path(GEMINI_PATH);
            then.status(400).json_body(json!({
                "error": { "code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT" }
            }));
        })
        .await;

    let err = gemini(&server)
        .transliterate_batch(&names(&["राम"]))
        .await
        .unwrap_err();

    match err {
        TransliterationError::ApiError(message) => assert_eq!(message, "API key not valid"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(mock.hits_async().await, 1);
}

#[tokio::test]
async fn test_configured_retries() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path(GEMINI_PATH);
            then.status(503).body("overloaded");
        })
        .await;

    let err = gemini(&server)
        .with_max_attempts(3)
        .transliterate_batch(&names(&["राम"]))
        .await
        .unwrap_err();

    assert!(matches!(err, TransliterationError::ApiError(_)));
    assert_eq!(mock.hits_async().await, 3);
}

#[tokio::test]
async fn test_empty_completion_is_upstream_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(GEMINI_PATH);
            then.status(200).json_body(json!({ "candidates": [] }));
        })
        .await;

    let err = gemini(&server)
        .transliterate_batch(&names(&["राम"]))
        .await
        .unwrap_err();
    assert!(matches!(err, TransliterationError::EmptyResponse));
}

#[tokio::test]
async fn test_empty_batch_sends_no_request() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path(GEMINI_PATH);
            then.status(200).json_body(gemini_reply("[]"));
        })
        .await;

    let result = gemini(&server).transliterate_batch(&[]).await.unwrap();

    assert!(result.is_empty());
    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn test_short_answer_fails_alignment_and_keeps_artifact() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(GEMINI_PATH);
            then.status(200).json_body(gemini_reply(r#"["Ram"]"#));
        })
        .await;

    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::new(dir.path());
    store.write(b"Name,Names_Pronounced\nx,X\n").unwrap();

    let pipeline = NamePipeline::new(Arc::new(gemini(&server)), store);
    let err = pipeline
        .run_bytes("Name\nराम\nसीता\n".as_bytes(), "Name")
        .await
        .unwrap_err();

    match err {
        PipelineError::Alignment(e) => {
            assert_eq!(e.expected, 2);
            assert_eq!(e.actual, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        pipeline.store().read_latest().unwrap(),
        b"Name,Names_Pronounced\nx,X\n"
    );
}

#[tokio::test]
async fn test_llm_pipeline_writes_artifact() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(GEMINI_PATH);
            then.status(200)
                .json_body(gemini_reply("```json\n[\"Ram\", \"Sita\"]\n```"));
        })
        .await;

    let dir = TempDir::new().unwrap();
    let pipeline = NamePipeline::new(Arc::new(gemini(&server)), ArtifactStore::new(dir.path()));
    let outcome = pipeline
        .run_bytes("Name\nराम\nसीता\n".as_bytes(), "Name")
        .await
        .unwrap();

    assert_eq!(outcome.strategy, "llm");
    assert_eq!(
        pipeline.store().read_latest().unwrap(),
        "Name,Names_Pronounced\nराम,Ram\nसीता,Sita\n".as_bytes()
    );
}
