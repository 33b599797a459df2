use std::{cell::RefCell, fs, rc::Rc, time::Duration};

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tokio::time;

use goodvibes::{
    DEBUG_GROUP, Registry, RunMode, RunOptions, Runner,
    formatter::PlainFormatter,
};

use crate::{Buffer, failure_messages, options, run};

fn good_vibes(registry: &mut Registry) {
    let strings: Rc<RefCell<Vec<&'static str>>> = Rc::default();

    registry.test("Fallin", |ctx| async move { ctx.check(true, true).done() });

    registry
        .group("Tash Sultana")
        .test("Jungle", |ctx| async move { ctx.check(5, 5).done() })
        .test("Notion", |ctx| async move { ctx.check(7, 6).done() });

    let mut underdog = registry.group("Underdog");
    let s = Rc::clone(&strings);
    underdog.sync().before(move |ctx| {
        *s.borrow_mut() = vec!["good"];
        async move { ctx.done() }
    });
    let s = Rc::clone(&strings);
    underdog.test("good vibes all", move |ctx| {
        let s = Rc::clone(&s);
        async move {
            time::sleep(Duration::from_millis(20)).await;
            s.borrow_mut().push("vibes");
            ctx.done()
        }
    });
    underdog.test("good vibes all around", move |ctx| {
        let joined = strings.borrow().join(" ");
        async move { ctx.check("good vibes", joined.as_str()).done() }
    });
}

#[tokio::test]
async fn summary_lists_failures_in_group_order() {
    let root = TempDir::new().unwrap();
    let mut registry = Registry::new();
    good_vibes(&mut registry);

    let (report, summary) = run(&registry, options(root.path())).await;
    assert_eq!(report.mode, RunMode::Normal);
    assert_eq!(report.exit_code, 1);
    assert_eq!(failure_messages(&report), ["Expected 7 to match 6"]);
    assert!(summary.contains("    0. [Tash Sultana] Notion (Expected 7 to match 6)"));
    assert!(summary.contains("test result: FAILED. 4 passed; 1 failed; 5 total"));
}

#[tokio::test]
async fn tap_reports_per_group() {
    let root = TempDir::new().unwrap();
    let mut registry = Registry::new();
    good_vibes(&mut registry);

    let options = options(root.path()).with_report_test_results(true);
    let results = options.test_results_directory.clone();
    let report = Runner::new(options)
        .with_formatter(PlainFormatter::default().with_target(Buffer::default()))
        .run(&registry)
        .await;
    assert_eq!(report.exit_code, 1);

    let read = |file: &str| fs::read_to_string(results.join(file)).unwrap();
    assert_eq!(read("default.tap"), "TAP version 13\n1..1\nok 1 Fallin");
    assert_eq!(
        read("tash-sultana.tap"),
        "TAP version 13\n1..2\nok 1 Jungle\nnot ok 2 Notion"
    );
    assert_eq!(
        read("underdog.tap"),
        "TAP version 13\n1..2\nok 1 good vibes all\nok 2 good vibes all around"
    );
}

#[tokio::test]
async fn options_from_json_drive_the_run() {
    let root = TempDir::new().unwrap();
    let mut registry = Registry::new();
    registry.test("fails", |ctx| async move { ctx.check("a", "b").done() });

    let options = RunOptions::from_json(r#"{"timeout": 5000, "returnCodeOnFailure": 3}"#)
        .unwrap()
        .with_snapshots_directory(root.path());
    assert_eq!(options.timeout, Duration::from_secs(5));

    let (report, _) = run(&registry, options).await;
    assert_eq!(report.exit_code, 3);
}

#[tokio::test]
async fn timeout_skips_summary_and_report() {
    let root = TempDir::new().unwrap();
    let mut registry = Registry::new();
    registry
        .test("quick", |ctx| async move { ctx.done() })
        .test("stuck", |ctx| async move {
            time::sleep(Duration::from_secs(60)).await;
            ctx.done()
        });

    let options = options(root.path())
        .with_timeout(Duration::from_millis(100))
        .with_report_test_results(true);
    let results = options.test_results_directory.clone();
    let buffer = Buffer::default();
    let report = Runner::new(options)
        .with_formatter(PlainFormatter::default().with_target(buffer.clone()))
        .run(&registry)
        .await;

    assert!(report.timed_out());
    assert_eq!(report.exit_code, 1);
    assert!(buffer.contents().contains("[TIMEOUT] global test timeout of 0.1 seconds exceeded"));
    assert!(!buffer.contents().contains("test result"));
    assert!(!results.exists());
}

#[tokio::test]
async fn debug_group_runs_alone_and_skips_reporting() {
    let root = TempDir::new().unwrap();
    let mut registry = Registry::new();
    good_vibes(&mut registry);
    registry
        .group(DEBUG_GROUP)
        .test("Johnny Cash", |ctx| async move { ctx.check(1, 1).done() });

    let options = options(root.path()).with_report_test_results(true);
    let results = options.test_results_directory.clone();
    let buffer = Buffer::default();
    let report = Runner::new(options)
        .with_formatter(PlainFormatter::default().with_target(buffer.clone()))
        .run(&registry)
        .await;

    assert_eq!(report.mode, RunMode::Debug);
    assert_eq!(report.results.total_count(), 1);
    assert_eq!(report.exit_code, 1);
    assert!(buffer.contents().contains("debug mode"));
    assert!(!results.exists());
}

#[test]
fn blocking_entry_point() {
    let root = TempDir::new().unwrap();
    let mut registry = Registry::new();
    registry.test("Gramercy Park", |ctx| async move {
        time::sleep(Duration::from_millis(10)).await;
        ctx.log("Just good vibes");
        ctx.check(vec![1, 2, 3, 4], (1..=4).collect()).done()
    });

    let report = goodvibes::run(&registry, options(root.path())).unwrap();
    assert!(report.success());
    assert_eq!(report.results.total_count(), 1);
}
