//! Statement executor integration tests.
//!
//! Drives the submit/poll/normalize protocol through `MockTransport`.

use dbx_bridge::client::{Method, MockTransport};
use dbx_bridge::credentials::Credentials;
use dbx_bridge::statement::{
    ExecutorConfig, SampleQuery, StatementExecutor, StatementState, STATEMENTS_PATH,
};
use dbx_bridge::BridgeError;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;

const POLL_PATH: &str = "/api/2.0/sql/statements/01ef-stmt";

fn executor(mock: MockTransport) -> StatementExecutor<MockTransport> {
    StatementExecutor::with_config(
        mock,
        ExecutorConfig::default().with_poll_interval(Duration::ZERO),
    )
}

fn creds() -> Credentials {
    Credentials::new("https://adb-1.azuredatabricks.net", "dapi-test")
}

fn query(limit: i64) -> SampleQuery {
    SampleQuery::new("main", "sales", "orders", limit)
}

fn submitted_statement(mock: &MockTransport) -> String {
    mock.calls()[0].body.as_ref().unwrap()["statement"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_limit_is_clamped_in_statement() {
    for (limit, expected) in [(-5, 1), (9999, 200), (20, 20)] {
        let exec = executor(
            MockTransport::new().on_post(STATEMENTS_PATH, json!({"status": {"state": "SUCCEEDED"}})),
        );
        let result = exec.execute(&query(limit), "wh-1", &creds()).await.unwrap();

        let expected_sql = format!("SELECT * FROM main.sales.orders LIMIT {}", expected);
        assert_eq!(result.statement, expected_sql);
        assert_eq!(submitted_statement(exec.transport()), expected_sql);
    }
}

#[tokio::test]
async fn test_succeeded_without_statement_id_issues_no_poll() {
    let exec = executor(MockTransport::new().on_post(
        STATEMENTS_PATH,
        json!({
            "status": {"state": "SUCCEEDED"},
            "manifest": {"schema": {"columns": [{"name": "id"}]}},
            "result": {"data_array": [["1"], ["2"]]}
        }),
    ));

    let result = exec.execute(&query(20), "wh-1", &creds()).await.unwrap();

    assert_eq!(result.status, StatementState::Succeeded);
    assert_eq!(result.row_count(), 2);
    assert_eq!(exec.transport().count(Method::Get), 0);
    assert_eq!(exec.transport().call_count(), 1);
}

#[tokio::test]
async fn test_failed_after_three_polls() {
    let mock = MockTransport::new()
        .on_post(
            STATEMENTS_PATH,
            json!({"statement_id": "01ef-stmt", "status": {"state": "RUNNING"}}),
        )
        .on_get(POLL_PATH, json!({"statement_id": "01ef-stmt", "status": {"state": "PENDING"}}))
        .on_get(POLL_PATH, json!({"statement_id": "01ef-stmt", "status": {"state": "RUNNING"}}))
        .on_get(
            POLL_PATH,
            json!({
                "statement_id": "01ef-stmt",
                "status": {
                    "state": "FAILED",
                    "error": {"error_code": "BAD_REQUEST", "message": "[TABLE_OR_VIEW_NOT_FOUND]"}
                }
            }),
        );
    let exec = executor(mock);

    let result = exec.execute(&query(20), "wh-1", &creds()).await.unwrap();

    assert_eq!(exec.transport().count(Method::Get), 3);
    assert_eq!(result.status, StatementState::Failed);
    assert_eq!(
        result.error(),
        Some(&json!({"error_code": "BAD_REQUEST", "message": "[TABLE_OR_VIEW_NOT_FOUND]"}))
    );
    assert!(result.rows().is_empty());
}

#[tokio::test]
async fn test_poll_budget_exhaustion_is_not_an_error() {
    let mock = MockTransport::new()
        .on_post(
            STATEMENTS_PATH,
            json!({"statement_id": "01ef-stmt", "status": {"state": "PENDING"}}),
        )
        .on_get(POLL_PATH, json!({"statement_id": "01ef-stmt", "status": {"state": "RUNNING"}}));
    let exec = executor(mock);

    let result = exec.execute(&query(20), "wh-1", &creds()).await.unwrap();

    assert_eq!(exec.transport().count(Method::Get), 20);
    assert_eq!(result.status, StatementState::Running);
    assert!(result.columns().is_empty());
    assert!(result.rows().is_empty());
    assert_eq!(
        result.error(),
        Some(&json!({"statement_id": "01ef-stmt", "status": {"state": "RUNNING"}}))
    );
}

#[tokio::test]
async fn test_succeeded_result_shape() {
    let mock = MockTransport::new()
        .on_post(
            STATEMENTS_PATH,
            json!({"statement_id": "01ef-stmt", "status": {"state": "PENDING"}}),
        )
        .on_get(
            POLL_PATH,
            json!({
                "statement_id": "01ef-stmt",
                "status": {"state": "SUCCEEDED"},
                "manifest": {"schema": {"columns": [{"name": "a"}, {"name": "b"}]}},
                "result": {"data_array": [["1", "x"]]}
            }),
        );
    let exec = executor(mock);

    let result = exec.execute(&query(20), "wh-1", &creds()).await.unwrap();

    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({
            "status": "SUCCEEDED",
            "statement": "SELECT * FROM main.sales.orders LIMIT 20",
            "columns": ["a", "b"],
            "rows": [["1", "x"]],
            "row_count": 1
        })
    );
}

#[tokio::test]
async fn test_missing_warehouse_id_makes_no_call() {
    let exec = executor(MockTransport::new());

    let err = exec.execute(&query(20), "", &creds()).await.unwrap_err();

    assert!(matches!(err, BridgeError::Configuration(_)));
    assert_eq!(exec.transport().call_count(), 0);
}

#[tokio::test]
async fn test_missing_credentials_make_no_call() {
    let exec = executor(MockTransport::new());

    for creds in [
        Credentials::new("", "dapi-test"),
        Credentials::new("https://adb-1.azuredatabricks.net", ""),
    ] {
        let err = exec.execute(&query(20), "wh-1", &creds).await.unwrap_err();
        assert!(matches!(err, BridgeError::Configuration(_)));
    }
    assert_eq!(exec.transport().call_count(), 0);
}

#[tokio::test]
async fn test_empty_identifier_makes_no_call() {
    let exec = executor(MockTransport::new());

    let err = exec
        .execute(&SampleQuery::new("main", "sales", " ", 20), "wh-1", &creds())
        .await
        .unwrap_err();

    assert!(matches!(err, BridgeError::Configuration(_)));
    assert_eq!(exec.transport().call_count(), 0);
}

#[tokio::test]
async fn test_path_like_statement_id_is_never_polled() {
    let exec = executor(MockTransport::new().on_post(
        STATEMENTS_PATH,
        json!({
            "statement_id": "../../2.1/unity-catalog/catalogs",
            "status": {"state": "PENDING"}
        }),
    ));

    let result = exec.execute(&query(5), "wh-1", &creds()).await.unwrap();

    assert_eq!(result.status, StatementState::Pending);
    assert_eq!(exec.transport().count(Method::Get), 0);
    assert_eq!(exec.transport().call_count(), 1);
}
