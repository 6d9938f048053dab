//! Integration tests for [`tgram_router::Dispatcher`] routing rules.
//!
//! Covers: first-matching command group only, unconditional command fallback, no
//! short-circuit for messages and callbacks, raw subject delivery, error propagation.

mod common;

use common::*;
use serde_json::json;
use tgram_core::{TgramError, Update};
use tgram_router::{Dispatcher, Registry, Route};

fn dispatcher(registry: Registry) -> Dispatcher {
    Dispatcher::new(registry, RecordingApi::new(json!(true)))
}

/// **Test: `/greet Alice` runs only the `greet (\w+)` group and the handler gets the raw text.**
#[tokio::test]
async fn test_command_group_beats_catch_all_and_gets_raw_subject() {
    let journal = journal();
    let registry = Registry::builder()
        .command(Some(r"greet (\w+)"), recorder(&journal, "greet"))
        .unwrap()
        .command(None, recorder(&journal, "any"))
        .unwrap()
        .build();

    let report = dispatcher(registry)
        .dispatch(message_update(1, "/greet Alice"))
        .await
        .unwrap();

    assert_eq!(
        report.route,
        Route::Command {
            pattern: r"greet (\w+)".to_string()
        }
    );
    assert_eq!(report.invoked, 1);
    assert_eq!(entries(&journal), vec!["greet:/greet Alice"]);
}

/// **Test: Only the first matching group (insertion order) runs, with all of its handlers.**
#[tokio::test]
async fn test_first_matching_group_only() {
    let journal = journal();
    let registry = Registry::builder()
        .command(Some("start"), recorder(&journal, "start-1"))
        .unwrap()
        .command(Some("st"), recorder(&journal, "st"))
        .unwrap()
        .command(Some("start"), recorder(&journal, "start-2"))
        .unwrap()
        .command(None, recorder(&journal, "any"))
        .unwrap()
        .build();

    let report = dispatcher(registry)
        .dispatch(message_update(1, "/START"))
        .await
        .unwrap();

    assert_eq!(report.invoked, 2);
    assert_eq!(entries(&journal), vec!["start-1:/START", "start-2:/START"]);
}

/// **Test: A command no group matches runs every unconditional command handler in order.**
#[tokio::test]
async fn test_unmatched_command_runs_catch_all_list() {
    let journal = journal();
    let registry = Registry::builder()
        .command(Some("help"), recorder(&journal, "help"))
        .unwrap()
        .command(None, recorder(&journal, "any-1"))
        .unwrap()
        .command(None, recorder(&journal, "any-2"))
        .unwrap()
        .on_message(None, recorder(&journal, "text"))
        .unwrap()
        .build();

    let report = dispatcher(registry)
        .dispatch(message_update(1, "/unknown"))
        .await
        .unwrap();

    assert_eq!(report.route, Route::UnmatchedCommand);
    assert_eq!(entries(&journal), vec!["any-1:/unknown", "any-2:/unknown"]);
}

/// **Test: Across several registrations, a command runs exactly one group or the catch-all list, never both.**
#[tokio::test]
async fn test_command_exclusivity_over_subjects() {
    let journal = journal();
    let registry = Registry::builder()
        .command(Some("^/a"), recorder(&journal, "a"))
        .unwrap()
        .command(Some("b$"), recorder(&journal, "b"))
        .unwrap()
        .command(Some("ab"), recorder(&journal, "ab"))
        .unwrap()
        .command(None, recorder(&journal, "any"))
        .unwrap()
        .build();
    let dispatcher = dispatcher(registry);

    let cases = [
        ("/ab", "a"),
        ("/xb", "b"),
        ("/xab", "b"),
        ("/xaby", "ab"),
        ("/zzz", "any"),
    ];
    for (subject, expected) in cases {
        journal.lock().unwrap().clear();
        dispatcher.dispatch(message_update(1, subject)).await.unwrap();
        assert_eq!(
            entries(&journal),
            vec![format!("{}:{}", expected, subject)],
            "subject {}",
            subject
        );
    }
}

/// **Test: Without groups or catch-all handlers a command runs nothing (and never falls through to message handlers).**
#[tokio::test]
async fn test_command_with_no_handlers() {
    let journal = journal();
    let registry = Registry::builder()
        .on_message(None, recorder(&journal, "text"))
        .unwrap()
        .build();

    let report = dispatcher(registry)
        .dispatch(message_update(1, "/start"))
        .await
        .unwrap();

    assert_eq!(report.route, Route::UnmatchedCommand);
    assert_eq!(report.invoked, 0);
    assert!(entries(&journal).is_empty());
}

/// **Test: `ping` runs both the catch-all and the `ping` message handler, in registration order.**
#[tokio::test]
async fn test_message_handlers_do_not_short_circuit() {
    let journal = journal();
    let registry = Registry::builder()
        .on_message(None, recorder(&journal, "all"))
        .unwrap()
        .on_message(Some("ping"), recorder(&journal, "ping"))
        .unwrap()
        .on_message(Some("pong"), recorder(&journal, "pong"))
        .unwrap()
        .build();

    let report = dispatcher(registry)
        .dispatch(message_update(1, "ping"))
        .await
        .unwrap();

    assert_eq!(report.route, Route::Message);
    assert_eq!(report.invoked, 2);
    assert_eq!(entries(&journal), vec!["all:ping", "ping:ping"]);
}

/// **Test: Matching is unanchored and case-insensitive: `hi` fires on `Historically`.**
#[tokio::test]
async fn test_unanchored_case_insensitive_message_match() {
    let journal = journal();
    let registry = Registry::builder()
        .on_message(Some("hi"), recorder(&journal, "hi"))
        .unwrap()
        .build();

    dispatcher(registry)
        .dispatch(message_update(1, "Historically"))
        .await
        .unwrap();

    assert_eq!(entries(&journal), vec!["hi:Historically"]);
}

/// **Test: Message without text is matched as `""`: only catch-all entries fire.**
#[tokio::test]
async fn test_message_without_text() {
    let journal = journal();
    let registry = Registry::builder()
        .on_message(Some("."), recorder(&journal, "dot"))
        .unwrap()
        .on_message(None, recorder(&journal, "all"))
        .unwrap()
        .build();
    let mut update = message_update(1, "unused");
    update.message.as_mut().unwrap().text = None;

    let report = dispatcher(registry).dispatch(update).await.unwrap();

    assert_eq!(report.invoked, 1);
    assert_eq!(entries(&journal), vec!["all:"]);
}

/// **Test: Callbacks run every matching entry against callback data, never message handlers.**
#[tokio::test]
async fn test_callback_routing() {
    let journal = journal();
    let registry = Registry::builder()
        .on_message(None, recorder(&journal, "text"))
        .unwrap()
        .on_callback(Some("^page:"), recorder(&journal, "page"))
        .unwrap()
        .on_callback(Some("vote"), recorder(&journal, "vote"))
        .unwrap()
        .on_callback(None, recorder(&journal, "all"))
        .unwrap()
        .build();

    let report = dispatcher(registry)
        .dispatch(callback_update(3, "PAGE:2"))
        .await
        .unwrap();

    assert_eq!(report.route, Route::Callback);
    assert_eq!(entries(&journal), vec!["page:PAGE:2", "all:PAGE:2"]);
}

/// **Test: Updates other than message / callback query are dropped without running anything.**
#[tokio::test]
async fn test_unroutable_update() {
    let journal = journal();
    let registry = Registry::builder()
        .on_message(None, recorder(&journal, "text"))
        .unwrap()
        .build();
    let mut update = Update::empty(9);
    update.edited_message = message_update(9, "edited").message;

    let report = dispatcher(registry).dispatch(update).await.unwrap();

    assert_eq!(report.route, Route::Unroutable);
    assert_eq!(report.invoked, 0);
    assert!(entries(&journal).is_empty());
}

/// **Test: A failing handler stops the remaining handlers and its error is returned unchanged.**
#[tokio::test]
async fn test_handler_error_propagates_and_stops_remaining() {
    let journal = journal();
    let registry = Registry::builder()
        .on_message(None, recorder(&journal, "first"))
        .unwrap()
        .on_message(None, failing(&journal, "boom"))
        .unwrap()
        .on_message(None, recorder(&journal, "never"))
        .unwrap()
        .build();

    let err = dispatcher(registry)
        .dispatch(message_update(1, "hello"))
        .await
        .unwrap_err();

    assert!(matches!(err, TgramError::Handler(_)));
    assert_eq!(entries(&journal), vec!["first:hello", "boom"]);
}
