//! End-to-end command dispatch tests.
//!
//! Parses real argument vectors and runs them against `MockTransport`.

use clap::Parser;
use dbx_bridge::app::run_with;
use dbx_bridge::cli::Cli;
use dbx_bridge::client::MockTransport;
use dbx_bridge::config::Config;
use dbx_bridge::output::error_document;
use dbx_bridge::statement::STATEMENTS_PATH;
use dbx_bridge::BridgeError;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::Write;

const CONFIG: &str = r#"
[profiles.DEFAULT]
host = "https://default.example.com/"
token = "dapi-default"
warehouse_id = "wh-default"

[profiles.nowarehouse]
host = "https://other.example.com"
token = "dapi-other"

[executor]
poll_interval_ms = 0
"#;

fn config() -> Config {
    toml::from_str(CONFIG).unwrap()
}

fn cli(args: &[&str]) -> Cli {
    let mut argv = vec!["dbx-bridge"];
    argv.extend_from_slice(args);
    Cli::parse_from(argv)
}

#[tokio::test]
async fn test_sample_uses_profile_warehouse() {
    let mock = MockTransport::new().on_post(
        STATEMENTS_PATH,
        json!({
            "status": {"state": "SUCCEEDED"},
            "manifest": {"schema": {"columns": [{"name": "a"}]}},
            "result": {"data_array": [["1"]]}
        }),
    );
    let cli = cli(&[
        "--host",
        "https://explicit.example.com",
        "--token",
        "dapi-explicit",
        "--profile",
        "DEFAULT",
        "sample",
        "--catalog",
        "main",
        "--schema",
        "default",
        "--table",
        "t",
        "--limit",
        "5",
    ]);

    let doc = run_with(&cli, &config(), mock).await.unwrap();

    assert_eq!(
        doc,
        json!({
            "status": "SUCCEEDED",
            "statement": "SELECT * FROM main.default.t LIMIT 5",
            "columns": ["a"],
            "rows": [["1"]],
            "row_count": 1
        })
    );
}

#[tokio::test]
async fn test_sample_without_warehouse_is_config_error() {
    let cli = cli(&[
        "--host",
        "https://explicit.example.com",
        "--token",
        "dapi-explicit",
        "--profile",
        "nowarehouse",
        "sample",
        "--catalog",
        "main",
        "--schema",
        "default",
        "--table",
        "t",
        "--warehouse-id",
        "",
    ]);

    let err = run_with(&cli, &config(), MockTransport::new())
        .await
        .unwrap_err();

    assert!(matches!(err, BridgeError::Configuration(_)));
    assert_eq!(error_document(&err)["category"], "configuration");
}

#[tokio::test]
async fn test_unknown_profile_is_config_error() {
    let cli = cli(&["--profile", "nope", "catalogs"]);

    let err = run_with(&cli, &config(), MockTransport::new())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Profile 'nope' not found"));
}

#[tokio::test]
async fn test_catalogs_listing_document() {
    let mock = MockTransport::new().on_get(
        "/api/2.1/unity-catalog/catalogs",
        json!({"catalogs": [{"name": "system", "catalog_type": "SYSTEM_CATALOG"}, {"name": "main"}]}),
    );
    let cli = cli(&[
        "--host",
        "https://explicit.example.com",
        "--token",
        "dapi-explicit",
        "catalogs",
    ]);

    let doc = run_with(&cli, &config(), mock).await.unwrap();

    assert_eq!(
        doc,
        json!([
            {"name": "main", "comment": null, "owner": null, "catalog_type": null},
            {"name": "system", "comment": null, "owner": null, "catalog_type": "SYSTEM_CATALOG"}
        ])
    );
}

#[test]
fn test_config_file_round_trip_through_loader() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(CONFIG.as_bytes()).unwrap();

    let loaded = Config::load_from_file(&path).unwrap();
    let profile = loaded.profile(None).unwrap().unwrap();
    assert_eq!(profile.warehouse_id(), Some("wh-default"));
    assert_eq!(loaded.executor.poll_interval_ms, 0);
    assert_eq!(loaded.executor.max_polls, 20);
}

#[tokio::test]
async fn test_sample_with_databrickscfg_profile() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".databrickscfg");
    std::fs::write(
        &path,
        "[dev]\nhost = https://dev.cloud.databricks.com\ntoken = dapi-dev\nwarehouse_id = wh-dev\n",
    )
    .unwrap();
    let config = config().with_databrickscfg(&path).unwrap();

    let mock = MockTransport::new().on_post(
        STATEMENTS_PATH,
        json!({"status": {"state": "SUCCEEDED"}, "result": {"data_array": []}}),
    );
    let cli = cli(&[
        "--profile",
        "dev",
        "sample",
        "--catalog",
        "main",
        "--schema",
        "default",
        "--table",
        "t",
        "--warehouse-id",
        "",
    ]);

    let doc = run_with(&cli, &config, mock).await.unwrap();

    assert_eq!(doc["status"], "SUCCEEDED");
    assert_eq!(doc["row_count"], 0);
}
