//! Tests for interceptor chain resolution: precedence ordering, kind-rank
//! tie-breaking, exclusion of unmatched advisors, and idempotence.

use std::sync::{Arc, Mutex};

use weft::{
    adapters::{StaticAdvisorSource, TypeCatalog},
    advice::Advice,
    advisor::Advisor,
    app::App,
    descriptor::{MethodDescriptor, TypeDescriptor},
    pointcut::Pointcut,
    proxy::TargetObject,
    invocation::{ArgValue, CallOutcome},
};

/// Shared event log advice bodies append to.
type Events = Arc<Mutex<Vec<String>>>;

struct Repo {
    events: Events,
}

impl TargetObject for Repo {
    fn invoke(&self, method: &MethodDescriptor, _args: &[ArgValue]) -> CallOutcome {
        self.events
            .lock()
            .unwrap()
            .push(format!("target:{}", method.name));
        Ok(Box::new(()))
    }
}

fn catalog() -> TypeCatalog {
    TypeCatalog::new()
        .with_type(
            TypeDescriptor::new("Repo")
                .method(MethodDescriptor::new("save"))
                .method(MethodDescriptor::new("load")),
        )
        .unwrap()
}

fn before(name: &str, scope: &str, pattern: &str, events: &Events) -> Advisor {
    let events = Arc::clone(events);
    let label = name.to_string();
    Advisor::new(
        name,
        scope,
        Pointcut::method_glob(pattern).unwrap(),
        Advice::before(move |_| {
            events.lock().unwrap().push(label.clone());
            Ok(())
        }),
    )
}

fn after(name: &str, scope: &str, pattern: &str, events: &Events) -> Advisor {
    let events = Arc::clone(events);
    let label = name.to_string();
    Advisor::new(
        name,
        scope,
        Pointcut::method_glob(pattern).unwrap(),
        Advice::after(move |_| {
            events.lock().unwrap().push(label.clone());
            Ok(())
        }),
    )
}

fn app_with(advisors: Vec<Advisor>) -> App {
    App::builder()
        .with_source(StaticAdvisorSource::new(advisors))
        .with_introspector(catalog())
        .build()
        .unwrap()
}

fn call_save(app: &App, events: &Events) {
    let proxy = app
        .proxy(
            "Repo",
            Arc::new(Repo {
                events: Arc::clone(events),
            }),
        )
        .unwrap();
    proxy.call("save", &[]).unwrap();
}

#[test]
fn test_lower_order_value_runs_first() {
    let events: Events = Arc::default();
    // Registered in reverse order on purpose: precedence must decide.
    let app = app_with(vec![
        before("second", "s", "save", &events).with_order(2),
        before("first", "s", "save", &events).with_order(1),
    ]);

    call_save(&app, &events);
    assert_eq!(
        *events.lock().unwrap(),
        vec!["first", "second", "target:save"]
    );
}

#[test]
fn test_after_family_is_first_in_last_out() {
    let events: Events = Arc::default();
    let app = app_with(vec![
        before("before_p1", "s", "save", &events).with_order(1),
        after("after_p1", "s", "save", &events).with_order(1),
        before("before_p2", "s", "save", &events).with_order(2),
        after("after_p2", "s", "save", &events).with_order(2),
    ]);

    call_save(&app, &events);
    // Higher precedence wraps outside: its before runs first, its after
    // runs last.
    assert_eq!(
        *events.lock().unwrap(),
        vec![
            "before_p1",
            "before_p2",
            "target:save",
            "after_p2",
            "after_p1"
        ]
    );
}

#[test]
fn test_unmatched_advisors_play_no_role() {
    let events: Events = Arc::default();
    let app = app_with(vec![
        before("on_save", "s", "save", &events).with_order(1),
        before("on_load", "s", "load", &events).with_order(1),
    ]);

    let chain = app.chain_for("Repo", "save").unwrap();
    assert_eq!(chain.advisor_names(), vec!["on_save"]);

    call_save(&app, &events);
    let recorded = events.lock().unwrap();
    assert!(
        !recorded.iter().any(|e| e == "on_load"),
        "advice of a non-matching advisor must never be invoked"
    );
}

#[test]
fn test_empty_chain_means_no_proxy_needed() {
    let events: Events = Arc::default();
    let app = app_with(vec![before("on_load", "s", "load", &events)]);

    assert!(app.chain_for("Repo", "save").unwrap().is_empty());
    // The type as a whole still needs a proxy because of "load".
    assert!(app.requires_proxy("Repo").unwrap());

    let unadvised = app_with(vec![]);
    assert!(!unadvised.requires_proxy("Repo").unwrap());
}

#[test]
fn test_kind_rank_orders_within_one_scope() {
    let events: Events = Arc::default();
    let around = Advisor::new(
        "wrap",
        "s",
        Pointcut::method_glob("save").unwrap(),
        Advice::around(|_, proceed| proceed.invoke()),
    )
    .with_order(0);

    let app = app_with(vec![
        after("finish", "s", "save", &events).with_order(0),
        before("check", "s", "save", &events).with_order(0),
        around,
    ]);

    let chain = app.chain_for("Repo", "save").unwrap();
    assert_eq!(chain.advisor_names(), vec!["wrap", "check", "finish"]);
}

#[test]
fn test_resolution_is_idempotent() {
    let events: Events = Arc::default();
    let app = app_with(vec![
        before("a", "s1", "save", &events).with_order(3),
        before("b", "s2", "save", &events).with_order(1),
        before("c", "s1", "save", &events).with_order(1),
    ]);

    let first = app.chain_for("Repo", "save").unwrap();
    let second = app.chain_for("Repo", "save").unwrap();
    // Cached: literally the same chain.
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.advisor_names(), second.advisor_names());
}

#[test]
fn test_cross_scope_tie_is_one_valid_permutation() {
    // Same kind, same precedence, different declaring scopes: the relative
    // order is unspecified. Assert membership and stability, never one
    // specific order.
    let events: Events = Arc::default();
    let app = app_with(vec![
        before("from_scope_a", "a", "save", &events).with_order(5),
        before("from_scope_b", "b", "save", &events).with_order(5),
    ]);

    let names: Vec<String> = app
        .chain_for("Repo", "save")
        .unwrap()
        .advisor_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(sorted, vec!["from_scope_a", "from_scope_b"]);

    // Whatever permutation was chosen, repeated resolution repeats it.
    for _ in 0..5 {
        let again: Vec<String> = app
            .chain_for("Repo", "save")
            .unwrap()
            .advisor_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(again, names);
    }
}

#[test]
fn test_unordered_sorts_after_every_ordered_value() {
    let events: Events = Arc::default();
    let app = app_with(vec![
        before("unordered", "s", "save", &events),
        before("late", "s", "save", &events).with_order(i32::MAX),
    ]);

    let chain = app.chain_for("Repo", "save").unwrap();
    assert_eq!(chain.advisor_names(), vec!["late", "unordered"]);
}
