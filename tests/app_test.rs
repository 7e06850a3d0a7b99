mod common;

use common::{row, test_config, FakeFactory, Script};
use obs_schedule_scrape::{App, Config, SelectOption, SinkOutcome};
use std::path::PathBuf;
use std::sync::Arc;

fn temp_output(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("obs-schedule-scrape-test-{}", std::process::id()))
        .join(name)
}

fn config_with_output(path: &PathBuf) -> Config {
    let mut config = test_config();
    config.worker_count = 2;
    config.output_path = path.display().to_string();
    config
}

#[tokio::test]
async fn test_app_writes_sorted_csv() {
    let output = temp_output("program.csv");
    let _ = std::fs::remove_file(&output);

    let script = Script::with_tables(vec![
        ("BLG102", vec![row("5", "BLG102")]),
        ("AKM101", vec![row("11", "AKM101"), row("10", "AKM101")]),
    ]);
    let factory = FakeFactory::new(script);
    let probe = Arc::clone(&factory.probe);
    let app = App::with_factory(config_with_output(&output), factory);

    let outcome = app.run().await.unwrap();

    assert_eq!(probe.shutdowns(), 1);
    assert_eq!(probe.opened(), probe.closed());
    assert_eq!(
        outcome,
        SinkOutcome::Written {
            path: output.clone(),
            rows: 3
        }
    );

    let content = std::fs::read_to_string(&output).unwrap();
    assert!(content.starts_with('\u{feff}'));

    let lines: Vec<&str> = content.trim_start_matches('\u{feff}').lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("Kod,Ders,"));
    assert!(lines[0].ends_with(",CRN"));
    assert!(lines[1].starts_with("AKM101,") && lines[1].ends_with(",10"));
    assert!(lines[2].starts_with("AKM101,") && lines[2].ends_with(",11"));
    assert!(lines[3].starts_with("BLG102,") && lines[3].ends_with(",5"));
    // 含逗号的字段需要加引号
    assert!(lines[1].contains("\"BLG, BLGE\""));

    let _ = std::fs::remove_file(&output);
}

#[tokio::test]
async fn test_app_without_records_writes_nothing() {
    let output = temp_output("empty.csv");
    let _ = std::fs::remove_file(&output);

    let script = Script::with_tables(vec![("AKM101", Vec::new())]);
    let app = App::with_factory(config_with_output(&output), FakeFactory::new(script));

    let outcome = app.run().await.unwrap();

    assert_eq!(outcome, SinkOutcome::NoData);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_app_fails_when_discovery_fails() {
    let output = temp_output("unreachable.csv");

    let mut script = Script::default();
    script.fail_navigate = true;
    let factory = FakeFactory::new(script);
    let probe = Arc::clone(&factory.probe);
    let app = App::with_factory(config_with_output(&output), factory);

    assert!(app.run().await.is_err());
    assert!(!output.exists());
    assert_eq!(probe.opened(), 1);
    assert_eq!(probe.closed(), 1);
    assert_eq!(probe.shutdowns(), 1);
}

#[tokio::test]
async fn test_app_with_only_placeholder_option_finishes_without_data() {
    let output = temp_output("no-codes.csv");
    let _ = std::fs::remove_file(&output);

    let mut script = Script::default();
    script.options = vec![SelectOption::new("", "Seçiniz")];
    let factory = FakeFactory::new(script);
    let probe = Arc::clone(&factory.probe);
    let app = App::with_factory(config_with_output(&output), factory);

    let outcome = app.run().await.unwrap();

    assert_eq!(outcome, SinkOutcome::NoData);
    assert!(!output.exists());
    // 只打开了发现会话，没有启动工作者
    assert_eq!(probe.opened(), 1);
    assert_eq!(probe.select_calls(), 0);
    assert_eq!(probe.shutdowns(), 1);
}
