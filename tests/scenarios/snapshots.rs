use std::fs;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::TempDir;

use goodvibes::Registry;

use crate::{failure_messages, options, run};

fn pink_moon() -> Value {
    json!({
        "a": 1,
        "b": "string",
        "c": [1, 2, 3, 4],
        "d": {"a": 1, "c": [1, 2, 3, 4]},
    })
}

fn snapshot_registry(data: Value, rebase: bool) -> Registry {
    let mut registry = Registry::new();
    registry.test("Pink Moon", move |ctx| {
        let data = data.clone();
        async move { ctx.snapshot("Blackbird", data, rebase).await.done() }
    });
    registry
}

#[tokio::test]
async fn rebase_then_verify() {
    let root = TempDir::new().unwrap();
    let baseline = root
        .path()
        .join("__snapshots__")
        .join("Default")
        .join("Pink Moon_Blackbird.json");

    let (report, _) = run(&snapshot_registry(pink_moon(), true), options(root.path())).await;
    assert_eq!(report.exit_code, 1);
    assert!(failure_messages(&report)[0].starts_with("Rebased snapshot Blackbird"));
    let stored: Value = serde_json::from_str(&fs::read_to_string(&baseline).unwrap()).unwrap();
    assert_eq!(stored, pink_moon());

    let (report, summary) = run(&snapshot_registry(pink_moon(), false), options(root.path())).await;
    assert!(report.success());
    assert!(summary.contains("test result: ok. 1 passed; 0 failed; 1 total"));

    let mut changed = pink_moon();
    changed["d"]["a"] = json!(2);
    let (report, _) = run(&snapshot_registry(changed, false), options(root.path())).await;
    assert_eq!(
        failure_messages(&report),
        ["Snapshot Blackbird differs from its baseline"]
    );
}

#[tokio::test]
async fn missing_baseline_fails() {
    let root = TempDir::new().unwrap();
    let (report, _) = run(&snapshot_registry(pink_moon(), false), options(root.path())).await;

    let messages = failure_messages(&report);
    assert!(messages[0].starts_with("could not find snapshot file at path"));
    assert!(messages[0].contains("Pink Moon_Blackbird.json"));
}

#[tokio::test]
async fn empty_and_falsy_baselines_fail() {
    let root = TempDir::new().unwrap();
    let directory = root.path().join("__snapshots__").join("Default");
    fs::create_dir_all(&directory).unwrap();

    for contents in ["", "null", "false", "0", "\"\""] {
        fs::write(directory.join("Pink Moon_Blackbird.json"), contents).unwrap();
        let (report, _) = run(&snapshot_registry(pink_moon(), false), options(root.path())).await;
        let messages = failure_messages(&report);
        assert_eq!(messages.len(), 1, "baseline {contents:?}");
        assert!(messages[0].contains("empty baseline"), "baseline {contents:?}");
    }
}

#[tokio::test]
async fn falsy_baseline_matching_actual_passes() {
    let root = TempDir::new().unwrap();
    let directory = root.path().join("__snapshots__").join("Default");
    fs::create_dir_all(&directory).unwrap();
    fs::write(directory.join("Pink Moon_Blackbird.json"), "0").unwrap();

    let (report, _) = run(&snapshot_registry(json!(0), false), options(root.path())).await;
    assert!(report.success());
}

#[tokio::test]
async fn baselines_live_in_group_directories() {
    let root = TempDir::new().unwrap();
    let mut registry = Registry::new();
    registry.group("Tash Sultana").test("Jungle", |ctx| async move {
        ctx.snapshot("numbers", [1, 2, 3, 4, 5], true).await.done()
    });

    run(&registry, options(root.path())).await;
    assert!(
        root.path()
            .join("__snapshots__")
            .join("Tash Sultana")
            .join("Jungle_numbers.json")
            .is_file()
    );
}

#[tokio::test]
async fn snapshot_failure_sticks_after_passing_checks() {
    let root = TempDir::new().unwrap();
    let mut registry = Registry::new();
    registry.test("Kun Faya Kun", |ctx| async move {
        ctx.check(1, 1)
            .snapshot("Rockstar", json!({"enum": "json"}), false)
            .await
            .check(2, 2)
            .done()
    });

    let (report, _) = run(&registry, options(root.path())).await;
    assert_eq!(report.results.failed_count(), 1);
    assert!(failure_messages(&report)[0].starts_with("could not find snapshot file"));
}
