//! Sandbox + HTTP evaluator: enrichment on success, graceful degradation

use std::sync::Arc;

use proctor_common::Submission;
use proctor_eval::{sandbox_evaluator, EvaluatorConfig, HttpEvaluator};
use proctor_sandbox::SandboxService;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{setup_test_logging, test_config};

const CSS: &str = ".grid { display: grid; gap: 1rem; }\n@media (max-width: 40em) { .grid { display: block; } }";

fn service_with(server: &MockServer, root: &std::path::Path) -> SandboxService {
    let config = EvaluatorConfig {
        enabled: true,
        endpoint: format!("{}/v1/chat/completions", server.uri()),
        ..Default::default()
    };
    let client = HttpEvaluator::with_api_key(config, "test-key").unwrap();
    SandboxService::new(&test_config(root)).with_evaluator(Arc::new(client))
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
    })
}

#[tokio::test]
async fn test_successful_run_is_enriched() {
    setup_test_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"response_format": {"type": "json_object"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "```json\n{\"score\": 71, \"feedback\": \"Uses grid well\", \"suggestions\": [\"Name breakpoints\"], \"codeQuality\": {\"readability\": 80, \"efficiency\": 60, \"correctness\": 75}}\n```",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let root = tempfile::tempdir().unwrap();
    let result = service_with(&server, root.path())
        .execute(Submission::new("css", CSS))
        .await
        .unwrap();

    assert!(result.success);
    let evaluation = result.ai_evaluation.unwrap();
    assert_eq!(evaluation.score, 71.0);
    assert_eq!(evaluation.suggestions, vec!["Name breakpoints"]);

    let json = serde_json::to_value(
        &service_with(&server, root.path())
            .execute(Submission::new("html", "<p/>"))
            .await
            .unwrap(),
    )
    .unwrap();
    assert!(json.get("aiEvaluation").is_none());
}

#[tokio::test]
async fn test_evaluator_outage_does_not_fail_the_run() {
    setup_test_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(1)
        .mount(&server)
        .await;

    let root = tempfile::tempdir().unwrap();
    let result = service_with(&server, root.path())
        .execute(Submission::new("css", CSS))
        .await
        .unwrap();

    assert!(result.success);
    assert!(result.error.is_none());
    assert!(result.output.is_some());
    assert!(result.ai_evaluation.is_none());
}

#[tokio::test]
async fn test_out_of_range_scores_are_discarded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            r#"{"score": 140, "feedback": "great", "codeQuality": {"readability": 1, "efficiency": 1, "correctness": 1}}"#,
        )))
        .mount(&server)
        .await;

    let root = tempfile::tempdir().unwrap();
    let result = service_with(&server, root.path())
        .execute(Submission::new("css", CSS))
        .await
        .unwrap();
    assert!(result.success);
    assert!(result.ai_evaluation.is_none());
}

#[tokio::test]
async fn test_failed_runs_never_reach_the_evaluator() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("{}")))
        .expect(0)
        .mount(&server)
        .await;

    let root = tempfile::tempdir().unwrap();
    let result = service_with(&server, root.path())
        .execute(Submission::new("css", "a { color: red"))
        .await
        .unwrap();
    assert!(!result.success);
    assert!(result.ai_evaluation.is_none());
}

#[tokio::test]
async fn test_unusable_evaluator_config_still_runs_submissions() {
    setup_test_logging();
    let config = EvaluatorConfig {
        enabled: true,
        api_key_env: "PROCTOR_IT_KEY_NEVER_SET".to_string(),
        ..Default::default()
    };

    let root = tempfile::tempdir().unwrap();
    let result = SandboxService::new(&test_config(root.path()))
        .with_evaluator(sandbox_evaluator(&config))
        .execute(Submission::new("css", CSS))
        .await
        .unwrap();
    assert!(result.success);
    assert!(result.output.is_some());
    assert!(result.ai_evaluation.is_none());
}
