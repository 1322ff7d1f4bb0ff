use lcm_gateway::{GatewayError, ModelGateway, RetryPolicy};
use lcm_pipeline::{MigrationError, MigrationRequest, Migrator};
use lcm_test_utils::ScriptedBackend;
use std::sync::Arc;
use std::time::Duration;

const MODERNIZED: &str = "```python\ndef main() -> None:\n    print(\"Hello World\")\n```";
const EXPLANATION: &str = "- Replaced the print statement with a print() call.\n- Added type annotations.";

fn migrator_for(backend: Arc<ScriptedBackend>) -> Migrator {
    let policy = RetryPolicy::new()
        .with_default_wait(Duration::from_millis(5))
        .with_pacing(Duration::ZERO);
    Migrator::new(ModelGateway::new(backend).with_policy(policy))
}

#[tokio::test]
async fn full_pipeline_produces_all_three_artifacts() {
    let backend = Arc::new(ScriptedBackend::new(&[MODERNIZED, EXPLANATION, "[]"]));
    let migrator = migrator_for(backend.clone());

    let request = MigrationRequest::new("print \"Hello World\"", "hello.py");
    let result = migrator.migrate(request).await.unwrap();

    // Modernized code is sanitized: no fences, call-style print
    assert!(result.modernized_code.contains("print(\"Hello World\")"));
    assert!(!result.modernized_code.contains("```"));
    assert!(!result.explanation.is_empty());
    assert!(result.issues.is_empty());

    // Transformer ran before the modernization prompt was built
    let calls = backend.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls[0].user_prompt.contains("print(\"Hello World\")"));
    assert!(!calls[0].user_prompt.contains("print \"Hello World\""));

    // Explanation prompt carries both versions
    assert!(calls[1].user_prompt.contains("Before:"));
    assert!(calls[1].user_prompt.contains("After:"));
}

#[tokio::test]
async fn temperatures_follow_the_exchange_kind() {
    let backend = Arc::new(ScriptedBackend::new(&["x: int = 1", "- nothing", "[]"]));
    let migrator = migrator_for(backend.clone());

    migrator
        .migrate(MigrationRequest::new("x = 1", "x.py"))
        .await
        .unwrap();

    let calls = backend.calls();
    assert_eq!(calls[0].temperature, 0.0); // modernization: deterministic
    assert_eq!(calls[1].temperature, 0.2); // explanation: prose tolerance
    assert_eq!(calls[2].temperature, 0.0); // audit: deterministic
}

#[tokio::test]
async fn reasoning_tier_override_locks_temperature() {
    let backend = Arc::new(ScriptedBackend::new(&["x: int = 1", "- nothing", "[]"]));
    let migrator = migrator_for(backend.clone());

    let request = MigrationRequest::new("x = 1", "x.py").with_model("o4-mini");
    migrator.migrate(request).await.unwrap();

    let calls = backend.calls();
    assert_eq!(calls[0].model, "o4-mini");
    assert_eq!(calls[0].temperature, 1.0);
    assert_eq!(calls[1].temperature, 1.0);
    // The audit stays on the pipeline default model
    assert_eq!(calls[2].model, "gpt-4.1");
    assert_eq!(calls[2].temperature, 0.0);
}

#[tokio::test]
async fn empty_input_fails_before_any_external_call() {
    let backend = Arc::new(ScriptedBackend::new(&[]));
    let migrator = migrator_for(backend.clone());

    let err = migrator
        .migrate(MigrationRequest::new("", "empty.py"))
        .await
        .unwrap_err();

    assert!(matches!(err, MigrationError::Validation(_)));
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn unparsable_legacy_source_aborts_without_model_calls() {
    let backend = Arc::new(ScriptedBackend::new(&[]));
    let migrator = migrator_for(backend.clone());

    let err = migrator
        .migrate(MigrationRequest::new("def broken(:", "bad.py"))
        .await
        .unwrap_err();

    assert!(matches!(err, MigrationError::Transform(_)));
    assert!(err.is_user_error());
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn model_failure_aborts_with_no_partial_result() {
    let backend = Arc::new(ScriptedBackend::from_results(vec![Err(
        GatewayError::Request("503: unavailable".to_string()),
    )]));
    let migrator = migrator_for(backend.clone());

    let err = migrator
        .migrate(MigrationRequest::new("x = 1", "x.py"))
        .await
        .unwrap_err();

    assert!(matches!(err, MigrationError::Model(_)));
    assert!(!err.is_user_error());
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn throttled_modernization_recovers_through_retry() {
    let backend = Arc::new(ScriptedBackend::from_results(vec![
        Err(GatewayError::Throttled(
            "Please try again in 0.01s".to_string(),
        )),
        Ok("x: int = 1".to_string()),
        Ok("- annotated x".to_string()),
        Ok("[]".to_string()),
    ]));
    let migrator = migrator_for(backend.clone());

    let result = migrator
        .migrate(MigrationRequest::new("x = 1", "x.py"))
        .await
        .unwrap();

    assert_eq!(result.modernized_code, "x: int = 1");
    assert_eq!(backend.call_count(), 4);
}

#[tokio::test]
async fn audit_issues_are_normalized_and_attributed() {
    let audit_reply = r#"[
        {
            "risk_level": "HIGH",
            "issue_title": "Hardcoded Password",
            "description": "A password is embedded in source.",
            "flagged_code": "password: str = 'hunter2'",
            "recommended_code": "password: str = os.environ['PASSWORD']",
            "suggested_fix": "Read the password from the environment.",
            "compliance_category": "ISO 27001"
        }
    ]"#;
    let modern = "import os\npassword: str = 'hunter2'\n";
    let backend = Arc::new(ScriptedBackend::new(&[modern, "- kept as-is", audit_reply]));
    let migrator = migrator_for(backend);

    let result = migrator
        .migrate(MigrationRequest::new("password = 'hunter2'", "secrets.py"))
        .await
        .unwrap();

    assert_eq!(result.issues.len(), 1);
    let issue = &result.issues[0];
    assert_eq!(issue.file, "secrets.py");
    assert_eq!(issue.line, 2);
    assert_eq!(
        serde_json::to_value(issue.severity).unwrap(),
        serde_json::json!("high")
    );
    assert_eq!(
        serde_json::to_value(issue.standard).unwrap(),
        serde_json::json!("ISO27001")
    );
}

#[tokio::test]
async fn broken_audit_degrades_to_no_issues() {
    let backend = Arc::new(ScriptedBackend::new(&[
        "x: int = 1",
        "- annotated x",
        "I could not produce JSON today.",
    ]));
    let migrator = migrator_for(backend);

    let result = migrator
        .migrate(MigrationRequest::new("x = 1", "x.py"))
        .await
        .unwrap();

    assert!(result.issues.is_empty());
    assert_eq!(result.modernized_code, "x: int = 1");
}
