use anyhow::Result;
use dev_toolbox::config::{ConvertConfig, FetchConfig, FetchMethod, PrettyConfig};
use dev_toolbox::domain::model::InputSource;
use dev_toolbox::{HeaderPolicy, Task, Toolbox, ToolboxError};
use httpmock::prelude::*;
use tempfile::TempDir;

#[tokio::test]
async fn test_toolbox_json2csv_task() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("rows.json");
    let output = temp_dir.path().join("rows.tsv");
    std::fs::write(
        &input,
        r#"[{"sku": "A-1", "qty": 3}, {"sku": "B-2", "qty": 5, "note": "late"}]"#,
    )?;

    let message = Toolbox::local()
        .run(Task::JsonToCsv {
            input,
            output: output.clone(),
            options: ConvertConfig {
                header_policy: HeaderPolicy::First,
                delimiter: '\t',
                ..ConvertConfig::default()
            },
        })
        .await?;

    assert!(message.starts_with("Wrote 2 records (2 columns) to "));
    assert_eq!(
        std::fs::read_to_string(&output)?,
        "sku\tqty\nA-1\t3\nB-2\t5\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_toolbox_csv2json_task_with_inference() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("rows.csv");
    let output = temp_dir.path().join("rows.json");
    std::fs::write(&input, "sku,qty,active\nA-1,3,true\nB-2,,false\n")?;

    Toolbox::local()
        .run(Task::CsvToJson {
            input,
            output: output.clone(),
            options: ConvertConfig {
                infer_types: true,
                ..ConvertConfig::default()
            },
        })
        .await?;

    let written: serde_json::Value = serde_json::from_slice(&std::fs::read(&output)?)?;
    assert_eq!(
        written,
        serde_json::json!([
            {"sku": "A-1", "qty": 3, "active": true},
            {"sku": "B-2", "qty": null, "active": false}
        ])
    );
    Ok(())
}

#[tokio::test]
async fn test_toolbox_pretty_task() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("doc.json");
    std::fs::write(&input, r#"{"b":[1,2],"a":"x"}"#)?;

    let output = Toolbox::local()
        .run(Task::Pretty {
            input: InputSource::File(input),
            options: PrettyConfig {
                indent: 2,
                sort_keys: true,
            },
        })
        .await?;

    assert_eq!(output, "{\n  \"a\": \"x\",\n  \"b\": [\n    1,\n    2\n  ]\n}");
    Ok(())
}

#[tokio::test]
async fn test_toolbox_fetch_task_reports_json() -> Result<()> {
    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/health");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"status": "ok"}));
        })
        .await;

    let output = Toolbox::local()
        .run(Task::Fetch {
            url: server.url("/health"),
            options: FetchConfig {
                method: FetchMethod::Get,
                timeout_seconds: 5,
                ..FetchConfig::default()
            },
            as_json: true,
        })
        .await?;

    api_mock.assert_async().await;
    let report: serde_json::Value = serde_json::from_str(&output)?;
    assert_eq!(report["status"], 200);
    assert_eq!(report["method"], "GET");
    assert_eq!(report["bytes"], 15);
    assert!(report["elapsed_ms"].as_f64().unwrap() >= 0.0);
    assert!(report["started_at"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_toolbox_fetch_task_human_output() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/missing");
            then.status(404);
        })
        .await;

    let url = server.url("/missing");
    let output = Toolbox::local()
        .run(Task::Fetch {
            url: url.clone(),
            options: FetchConfig::default(),
            as_json: false,
        })
        .await?;

    assert!(output.starts_with(&format!("GET {} -> 404 Not Found, 0 bytes in ", url)));
    assert!(output.ends_with(" ms"));
    Ok(())
}

#[tokio::test]
async fn test_toolbox_propagates_input_errors() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("bad.json");
    let output = temp_dir.path().join("bad.csv");
    std::fs::write(&input, r#"[{"nested": {"a": 1}}]"#)?;

    let err = Toolbox::local()
        .run(Task::JsonToCsv {
            input,
            output: output.clone(),
            options: ConvertConfig::default(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ToolboxError::InputFormatError { .. }));
    assert_eq!(err.exit_code(), 2);
    assert!(!output.exists());
    Ok(())
}

#[tokio::test]
async fn test_toolbox_rejects_empty_output_path_before_reading() -> Result<()> {
    let err = Toolbox::local()
        .run(Task::CsvToJson {
            input: "does-not-matter.csv".into(),
            output: std::path::PathBuf::new(),
            options: ConvertConfig::default(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ToolboxError::InvalidConfigValueError { ref field, .. } if field == "output"));
    Ok(())
}
