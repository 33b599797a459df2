//! A tour through groups, hooks, sync mode and snapshots.
//!
//! Run with `cargo run --example good_vibes`. Set `REBASE=1` once to write the
//! snapshot baselines into `test/__snapshots__`, the run fails while rebasing.

use std::{cell::RefCell, rc::Rc, time::Duration};

use goodvibes::{Registry, RunOptions, RunReport};
use serde_json::json;
use tokio::time;

const TASH_SULTANA: &str = "Tash Sultana";
const UNDERDOG: &str = "Underdog";

type Shared<T> = Rc<RefCell<Option<T>>>;

fn main() -> Result<RunReport, goodvibes::Error> {
    let mut registry = Registry::new();

    simple(&mut registry);
    groups(&mut registry);
    synchronous(&mut registry);
    snapshots(&mut registry, std::env::var_os("REBASE").is_some());

    goodvibes::run(&registry, RunOptions::from_file("goodvibes.json").unwrap_or_default())
}

fn simple(registry: &mut Registry) {
    registry
        .test("Gramercy Park", |ctx| async move {
            time::sleep(Duration::from_millis(200)).await;
            ctx.log("Just good vibes");
            ctx.check(
                json!({"a": {"b": 2, "c": [1, 2, 3, 4]}}),
                json!({"a": {"b": 2, "c": [1, 2, 3, 4]}}),
            )
            .done();
        })
        .test("Fallin", |ctx| async move {
            time::sleep(Duration::ZERO).await;
            ctx.check(true, true).done();
        });
}

fn groups(registry: &mut Registry) {
    let numbers: Shared<Vec<u32>> = Rc::default();
    let strings: Shared<Vec<&'static str>> = Rc::default();
    let mut group = registry.group(TASH_SULTANA);

    let (n, s) = (Rc::clone(&numbers), Rc::clone(&strings));
    group.before(move |ctx| {
        let (n, s) = (Rc::clone(&n), Rc::clone(&s));
        async move {
            ctx.log("Here is an example where we set a value synchronously");
            *n.borrow_mut() = Some(vec![1, 2, 3, 4, 5]);
            ctx.log("And here we have an asynchronous example");
            time::sleep(Duration::from_millis(500)).await;
            ctx.log("This log prints after half a second");
            *s.borrow_mut() = Some(vec!["this", "value", "is", "set", "after", "a", "while"]);
            ctx.done();
        }
    });

    let n = Rc::clone(&numbers);
    group.test("Jungle", move |ctx| {
        let numbers = n.borrow().clone().unwrap_or_default();
        async move {
            let joined: Vec<_> = numbers.iter().map(u32::to_string).collect();
            ctx.check(5, numbers.len())
                .check("1,2,3,4,5", joined.join(",").as_str())
                .done();
        }
    });

    let s = Rc::clone(&strings);
    group.test("Notion", move |ctx| {
        let strings = s.borrow().clone().unwrap_or_default();
        async move {
            ctx.check(7, strings.len())
                .check("this value is set after a while", strings.join(" ").as_str())
                .done();
        }
    });

    group.after(move |ctx| {
        ctx.log("In the after hook you may perform any cleanup you like");
        numbers.borrow_mut().take();
        strings.borrow_mut().take();
        async move { ctx.done() }
    });
}

fn synchronous(registry: &mut Registry) {
    let strings: Shared<Vec<&'static str>> = Rc::default();
    let mut group = registry.group(UNDERDOG);

    let s = Rc::clone(&strings);
    group.sync().before(move |ctx| {
        *s.borrow_mut() = Some(vec!["good"]);
        async move { ctx.done() }
    });

    let push = |word: &'static str| {
        let s = Rc::clone(&strings);
        move || {
            if let Some(strings) = s.borrow_mut().as_mut() {
                strings.push(word);
            }
        }
    };
    let joined = |s: &Shared<Vec<&'static str>>| s.borrow().as_ref().map(|s| s.join(" "));

    let vibes = push("vibes");
    group.test("good vibes passthrough", move |ctx| {
        vibes();
        async move { ctx.done() }
    });

    let s = Rc::clone(&strings);
    group.test("good vibes", move |ctx| {
        let current = joined(&s);
        async move { ctx.check(Some("good vibes"), current.as_deref()).done() }
    });

    let (all, s) = (push("all"), Rc::clone(&strings));
    group.test("good vibes all", move |ctx| {
        let (all, s) = (all.clone(), Rc::clone(&s));
        async move {
            time::sleep(Duration::from_millis(500)).await;
            all();
            ctx.check(Some("good vibes all"), joined(&s).as_deref()).done();
        }
    });

    let (around, s) = (push("around"), Rc::clone(&strings));
    group.test("good vibes all around", move |ctx| {
        around();
        let current = joined(&s);
        async move { ctx.check(Some("good vibes all around"), current.as_deref()).done() }
    });

    group.after(move |ctx| {
        strings.borrow_mut().take();
        async move { ctx.done() }
    });
}

fn snapshots(registry: &mut Registry, rebase: bool) {
    registry
        .test("Pink Moon", move |ctx| async move {
            let data = json!({
                "a": 1,
                "b": "string",
                "c": [1, 2, 3, 4],
                "d": {"a": 1, "c": [1, 2, 3, 4]},
            });
            ctx.snapshot("Blackbird", data, rebase).await.done();
        })
        .test("Kun Faya Kun", move |ctx| async move {
            let data = json!({
                "random": 5,
                "random float": 69.767,
                "bool": false,
                "date": "1990-07-18",
                "regEx": "helloooooooooooooooo world",
                "enum": "json",
            });
            ctx.snapshot("Rockstar", data, rebase).await.done();
        });
}
