//! Session store publication
//!
//! Every discrete mutation publishes exactly one snapshot; ignored commands
//! publish nothing.

mod helpers;

use helpers::{drain, episode, Harness};
use podplay_ap::media::MediaEvent;
use podplay_common::events::{PlayerEvent, TransportState};

fn session_changes(events: &[PlayerEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, PlayerEvent::SessionChanged { .. }))
        .count()
}

#[tokio::test]
async fn test_each_mutation_publishes_once() {
    let h = Harness::auto_start();
    h.store.load_and_toggle(&episode("e1", 300.0)).await;
    h.metadata(300.0).await;
    let mut events = h.store.events();

    h.store.set_volume(0.4).await;
    assert_eq!(session_changes(&drain(&mut events)), 1);

    h.store.seek(30.0).await;
    assert_eq!(session_changes(&drain(&mut events)), 1);

    h.media(|binding| MediaEvent::PositionAdvanced { binding, position: 31.0 })
        .await;
    assert_eq!(session_changes(&drain(&mut events)), 1);

    h.store.toggle_play().await;
    let paused = drain(&mut events);
    assert_eq!(session_changes(&paused), 1);
    assert!(paused.iter().any(|e| matches!(
        e,
        PlayerEvent::TransportChanged {
            old_state: TransportState::Playing,
            new_state: TransportState::Paused,
            ..
        }
    )));
}

#[tokio::test]
async fn test_load_publishes_bind_then_start() {
    let h = Harness::auto_start();
    let mut events = h.store.events();

    h.store.load_and_toggle(&episode("e1", 300.0)).await;

    let names: Vec<_> = drain(&mut events).iter().map(|e| e.event_type()).collect();
    assert_eq!(
        names,
        vec![
            "EpisodeLoaded",
            "TransportChanged",
            "SessionChanged",
            "TransportChanged",
            "SessionChanged",
        ]
    );
}

#[tokio::test]
async fn test_ignored_commands_publish_nothing() {
    let h = Harness::auto_start();
    let mut events = h.store.events();

    h.store.toggle_play().await;
    h.store.seek(12.0).await;
    h.store.set_volume(f64::NAN).await;
    h.store.set_rate(0.0).await;
    assert!(drain(&mut events).is_empty());

    h.store.load_and_toggle(&episode("e1", 300.0)).await;
    h.metadata(300.0).await;
    h.media(|binding| MediaEvent::PositionAdvanced { binding, position: 5.0 })
        .await;
    drain(&mut events);

    // Same position again, and a buffering end that never started
    h.media(|binding| MediaEvent::PositionAdvanced { binding, position: 5.0 })
        .await;
    h.media(|binding| MediaEvent::BufferingEnded { binding }).await;
    assert!(drain(&mut events).is_empty());
}

#[tokio::test]
async fn test_watch_subscribers_see_latest_snapshot() {
    let h = Harness::auto_start();
    let mut first = h.store.subscribe();
    let mut second = h.store.clone().subscribe();
    first.borrow_and_update();
    second.borrow_and_update();

    h.store.load_and_toggle(&episode("e1", 300.0)).await;

    assert!(first.has_changed().unwrap());
    assert!(second.has_changed().unwrap());
    let seen = first.borrow_and_update().clone();
    assert_eq!(seen.transport, TransportState::Playing);
    assert_eq!(seen, h.store.snapshot());
}

#[tokio::test]
async fn test_clones_share_one_session() {
    let h = Harness::auto_start();
    let other = h.store.clone();

    other.load_and_toggle(&episode("e1", 300.0)).await;
    assert_eq!(
        h.store.snapshot().active_id().map(|id| id.as_str()),
        Some("e1")
    );

    h.store.close().await;
    assert_eq!(other.snapshot().active_episode, None);
}
