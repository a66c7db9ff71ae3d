use std::{
	sync::{Arc, atomic::Ordering},
	time::Duration,
};

use tokio::{task::JoinHandle, time};

use super::{FakeApi, subject};
use sta_client::{Autocomplete, MAX_SUGGESTIONS, Result, Suggestion};

const DEBOUNCE: Duration = Duration::from_millis(200);

fn engine(api: FakeApi) -> (Arc<FakeApi>, Arc<Autocomplete<FakeApi>>) {
	let api = Arc::new(api);

	(api.clone(), Arc::new(Autocomplete::new(api, DEBOUNCE)))
}

fn algebra_and_data() -> FakeApi {
	FakeApi::new(vec![subject(1, "AB100", "Abstract Algebra"), subject(2, "CS201", "Data Structures")])
}

/// Types `text` after `at_ms` of virtual time.
fn keystroke(
	engine: &Arc<Autocomplete<FakeApi>>,
	at_ms: u64,
	text: &'static str,
) -> JoinHandle<Result<Suggestion>> {
	let engine = engine.clone();

	tokio::spawn(async move {
		time::sleep(Duration::from_millis(at_ms)).await;

		engine.suggest(text).await
	})
}

fn codes(suggestion: &Suggestion) -> Vec<&str> {
	match suggestion {
		Suggestion::Ready(subjects) => subjects.iter().map(|s| s.code.as_str()).collect(),
		_ => Vec::new(),
	}
}

#[tokio::test(start_paused = true)]
async fn latest_query_wins_when_responses_arrive_out_of_order() {
	let (api, engine) = engine(algebra_and_data());

	// "a" answers at 600ms, "ab" at 500ms, the second "a" at 690ms.
	api.script_search(&[400, 50, 10]);

	let first = keystroke(&engine, 0, "a");
	let second = keystroke(&engine, 250, "ab");
	let third = keystroke(&engine, 480, "a");
	let first = first.await.expect("join").expect("first");
	let second = second.await.expect("join").expect("second");
	let third = third.await.expect("join").expect("third");

	assert_eq!(first, Suggestion::Superseded);
	assert_eq!(second, Suggestion::Superseded);
	assert_eq!(codes(&third), vec!["AB100", "CS201"]);
	assert_eq!(api.search_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn rapid_keystrokes_collapse_into_one_query() {
	let (api, engine) = engine(algebra_and_data());
	let handles =
		[keystroke(&engine, 0, "a"), keystroke(&engine, 50, "ab"), keystroke(&engine, 100, "abs")];
	let mut results = Vec::new();

	for handle in handles {
		results.push(handle.await.expect("join").expect("suggest"));
	}

	assert_eq!(results[0], Suggestion::Superseded);
	assert_eq!(results[1], Suggestion::Superseded);
	assert_eq!(codes(&results[2]), vec!["AB100"]);
	assert_eq!(*api.searches.lock().expect("search lock"), vec!["abs".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn clearing_suppresses_a_late_response() {
	let (api, engine) = engine(algebra_and_data());

	api.script_search(&[300]);

	let typed = keystroke(&engine, 0, "ab");
	let cleared = keystroke(&engine, 250, "   ");

	assert_eq!(cleared.await.expect("join").expect("clear"), Suggestion::Cleared);
	assert_eq!(typed.await.expect("join").expect("typed"), Suggestion::Superseded);
	assert_eq!(api.search_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn blank_input_is_answered_without_a_query() {
	let (api, engine) = engine(algebra_and_data());

	assert_eq!(engine.suggest("").await.expect("suggest"), Suggestion::Cleared);
	assert_eq!(api.search_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn suggestions_are_capped() {
	let subjects =
		(1..=12).map(|id| subject(id, &format!("MA{id:03}"), "Mathematics")).collect();
	let (_, engine) = engine(FakeApi::new(subjects));
	let suggestion = engine.suggest("math").await.expect("suggest");

	assert_eq!(codes(&suggestion).len(), MAX_SUGGESTIONS);
}

#[tokio::test(start_paused = true)]
async fn failures_surface_only_while_current() {
	let (api, engine) = engine(algebra_and_data());

	api.fail_search.store(true, Ordering::SeqCst);

	assert!(engine.suggest("ab").await.is_err());

	api.script_search(&[300]);

	let stale = keystroke(&engine, 0, "ab");
	let fresh = keystroke(&engine, 250, "");

	assert_eq!(fresh.await.expect("join").expect("clear"), Suggestion::Cleared);
	assert_eq!(stale.await.expect("join").expect("stale"), Suggestion::Superseded);
}
