use std::{
	sync::{Arc, atomic::Ordering},
	time::Duration,
};

use tokio::{sync::mpsc::UnboundedReceiver, time};

use super::{CS101, EMPTY_SUBJECT, FakeApi, subject};
use sta_client::{Error, Phase, Session, SessionEvent};
use sta_domain::{FacetLevel, FacetValue, Year};

type Harness = (Arc<FakeApi>, Arc<Session<FakeApi>>, UnboundedReceiver<SessionEvent>);

fn harness() -> Harness {
	let api = Arc::new(FakeApi::archive());
	let (session, events) = Session::new(api.clone(), Duration::from_millis(200));

	(api, Arc::new(session), events)
}

fn drain(events: &mut UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
	let mut drained = Vec::new();

	while let Ok(event) = events.try_recv() {
		drained.push(event);
	}

	drained
}

fn text(value: &str) -> FacetValue {
	FacetValue::text(value)
}

fn options(level: FacetLevel, values: Vec<FacetValue>) -> SessionEvent {
	SessionEvent::Options { level, values }
}

#[tokio::test(start_paused = true)]
async fn narrowing_resolves_one_record_and_counts_one_view() {
	let (api, session, mut events) = harness();

	session.select_subject(subject(CS101, "CS101", "Intro to Programming")).await;
	session.choose(FacetLevel::University, text("mit")).await.expect("university");
	session.choose(FacetLevel::Year, Year::Known(2023).into()).await.expect("year");
	session.choose(FacetLevel::Semester, text("FALL")).await.expect("semester");
	session.choose(FacetLevel::Type, text("final")).await.expect("type");

	let seen = drain(&mut events);

	assert_eq!(seen[0], options(FacetLevel::University, vec![text("MIT"), text("Stanford")]));
	assert_eq!(
		seen[1],
		options(
			FacetLevel::Year,
			vec![Year::Known(2023).into(), Year::Known(2021).into()]
		)
	);
	assert_eq!(seen[2], options(FacetLevel::Semester, vec![text("Fall")]));
	assert_eq!(seen[3], options(FacetLevel::Type, vec![text("Final"), text("Midterm")]));

	let SessionEvent::Resolved { record, rating } = &seen[4] else {
		panic!("Expected a resolved record, got {:?}.", seen[4]);
	};

	assert_eq!(record.id, 10);
	assert_eq!(rating.total_reviews, 3);
	assert_eq!(session.with_selection(|s| s.phase()).await, Phase::Resolved);

	session.choose(FacetLevel::Type, text("Final")).await.expect("again");
	time::sleep(Duration::from_millis(1)).await;

	assert_eq!(api.views.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn ancestor_change_discards_in_flight_lower_level_options() {
	let (api, session, mut events) = harness();

	session.select_subject(subject(CS101, "CS101", "Intro to Programming")).await;
	session.choose(FacetLevel::University, text("MIT")).await.expect("university");
	drain(&mut events);

	// Semester options for MIT take 300ms; the Stanford year list takes 10ms.
	api.script_facets(&[300, 10]);

	let slow = {
		let session = session.clone();

		tokio::spawn(async move { session.choose(FacetLevel::Year, Year::Known(2023).into()).await })
	};

	time::sleep(Duration::from_millis(100)).await;
	session.choose(FacetLevel::University, text("Stanford")).await.expect("university");
	slow.await.expect("join").expect("year");

	let seen = drain(&mut events);

	assert_eq!(seen, vec![options(FacetLevel::Year, vec![Year::Unknown.into()])]);
	session
		.with_selection(|s| {
			assert_eq!(s.chosen(FacetLevel::Year), None);
			assert!(s.options(FacetLevel::Semester).is_none());
			assert_eq!(s.enabled_levels(), vec![FacetLevel::University, FacetLevel::Year]);
		})
		.await;
}

#[tokio::test(start_paused = true)]
async fn clearing_during_resolution_shows_nothing_and_records_no_view() {
	let (api, session, mut events) = harness();

	session.select_subject(subject(CS101, "CS101", "Intro to Programming")).await;
	session.choose(FacetLevel::University, text("MIT")).await.expect("university");
	session.choose(FacetLevel::Year, Year::Known(2023).into()).await.expect("year");
	session.choose(FacetLevel::Semester, text("Fall")).await.expect("semester");
	drain(&mut events);
	api.script_lookups(&[300]);

	let pending = {
		let session = session.clone();

		tokio::spawn(async move { session.choose(FacetLevel::Type, text("Final")).await })
	};

	time::sleep(Duration::from_millis(100)).await;
	session.clear().await;
	pending.await.expect("join").expect("type");
	time::sleep(Duration::from_millis(1)).await;

	assert_eq!(drain(&mut events), vec![SessionEvent::Reset]);
	assert_eq!(api.views.load(Ordering::SeqCst), 0);
	session
		.with_selection(|s| {
			assert_eq!(s.phase(), Phase::Idle);
			assert_eq!(s.resolved(), None);
		})
		.await;
}

#[tokio::test(start_paused = true)]
async fn subject_without_tests_keeps_descendants_disabled() {
	let (_, session, mut events) = harness();

	session.select_subject(subject(EMPTY_SUBJECT, "CS900", "Seminar")).await;

	assert_eq!(drain(&mut events), vec![options(FacetLevel::University, Vec::new())]);
	assert!(matches!(
		session.choose(FacetLevel::University, text("MIT")).await,
		Err(Error::UnknownOption { .. })
	));
	assert!(matches!(
		session.choose(FacetLevel::Year, Year::Unknown.into()).await,
		Err(Error::LevelDisabled { level: FacetLevel::Year })
	));
	assert_eq!(
		session.with_selection(|s| s.enabled_levels()).await,
		vec![FacetLevel::University]
	);
}

#[tokio::test(start_paused = true)]
async fn ambiguous_tuple_is_reported_as_no_match() {
	let (api, session, mut events) = harness();

	session.select_subject(subject(CS101, "CS101", "Intro to Programming")).await;
	session.choose(FacetLevel::University, text("Stanford")).await.expect("university");
	session.choose(FacetLevel::Year, Year::Unknown.into()).await.expect("year");
	session.choose(FacetLevel::Semester, text("Spring")).await.expect("semester");
	session.choose(FacetLevel::Type, text("Final")).await.expect("type");

	assert_eq!(drain(&mut events).last(), Some(&SessionEvent::NoMatch));
	assert_eq!(session.with_selection(|s| s.phase()).await, Phase::NarrowingFacets);

	time::sleep(Duration::from_millis(1)).await;

	assert_eq!(api.views.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn failed_facet_request_is_transient_and_retryable() {
	let (api, session, mut events) = harness();

	session.select_subject(subject(CS101, "CS101", "Intro to Programming")).await;
	drain(&mut events);
	api.fail_facets.store(true, Ordering::SeqCst);
	session.choose(FacetLevel::University, text("MIT")).await.expect("university");

	let seen = drain(&mut events);

	assert!(matches!(
		seen.as_slice(),
		[SessionEvent::TransientError { level: Some(FacetLevel::University), .. }]
	));
	assert_eq!(
		session.with_selection(|s| s.enabled_levels()).await,
		vec![FacetLevel::University]
	);

	api.fail_facets.store(false, Ordering::SeqCst);
	session.choose(FacetLevel::University, text("MIT")).await.expect("retry");

	assert_eq!(drain(&mut events).len(), 1);
	assert_eq!(api.facet_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn clearing_search_text_resets_only_before_narrowing() {
	let (_, session, mut events) = harness();

	session.select_subject(subject(CS101, "CS101", "Intro to Programming")).await;
	session.input("").await;

	assert_eq!(session.with_selection(|s| s.phase()).await, Phase::Idle);
	assert!(drain(&mut events).ends_with(&[SessionEvent::SuggestionsCleared, SessionEvent::Reset]));

	session.select_subject(subject(CS101, "CS101", "Intro to Programming")).await;
	session.choose(FacetLevel::University, text("MIT")).await.expect("university");
	session.input("").await;

	assert_eq!(session.with_selection(|s| s.phase()).await, Phase::NarrowingFacets);

	session.clear().await;

	assert_eq!(session.with_selection(|s| s.phase()).await, Phase::Idle);
}

#[tokio::test(start_paused = true)]
async fn typing_emits_suggestions() {
	let (_, session, mut events) = harness();

	session.input("cs1").await;

	let seen = drain(&mut events);
	let [SessionEvent::Suggestions(subjects)] = seen.as_slice() else {
		panic!("Expected one suggestion event, got {seen:?}.");
	};

	assert_eq!(subjects.iter().map(|s| s.code.as_str()).collect::<Vec<_>>(), vec!["CS101"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn last_event_matches_the_final_selection_state() {
	for _ in 0..200 {
		let (_, session, mut events) = harness();
		let picking = {
			let session = session.clone();

			tokio::spawn(async move {
				session.select_subject(subject(CS101, "CS101", "Intro to Programming")).await
			})
		};
		let clearing = {
			let session = session.clone();

			tokio::spawn(async move { session.clear().await })
		};

		picking.await.expect("join");
		clearing.await.expect("join");

		let phase = session.with_selection(|s| s.phase()).await;
		let last = drain(&mut events).pop();

		match phase {
			Phase::Idle => assert_eq!(last, Some(SessionEvent::Reset)),
			_ => assert!(
				matches!(last, Some(SessionEvent::Options { level: FacetLevel::University, .. })),
				"Expected university options last, got {last:?}."
			),
		}
	}
}
