//! Transcript panel driven by published session snapshots

mod helpers;

use approx::assert_relative_eq;
use helpers::{episode, Harness};
use podplay_ap::media::MediaEvent;
use podplay_ap::transcript::{
    segment, Block, ScrollMetrics, ScrollOrigin, SyncSettings, TranscriptPanel, TranscriptSync,
};
use podplay_common::Language;
use std::time::Duration;
use tokio::time::timeout;

#[tokio::test]
async fn test_auto_scroll_follows_playback_until_user_scrolls() {
    let h = Harness::auto_start();
    let mut sync = TranscriptSync::new(SyncSettings::default());
    sync.open();
    let mut snapshots = h.store.subscribe();

    h.store.load_and_toggle(&episode("e1", 200.0)).await;
    h.metadata(200.0).await;
    h.media(|binding| MediaEvent::PositionAdvanced { binding, position: 50.0 })
        .await;

    // 2000 tall, 800 visible => 1200 scrollable
    let mut panel = ScrollMetrics::new(2000.0, 800.0, 0.0);
    assert!(snapshots.has_changed().unwrap());
    let session = snapshots.borrow_and_update().clone();
    let cmd = sync
        .on_position(session.position, session.duration, &panel)
        .expect("scroll command");
    assert_relative_eq!(cmd.offset, 300.0);

    panel.scroll_offset = cmd.offset;
    assert_eq!(sync.on_scroll_notification(), ScrollOrigin::System);

    // The listener drags the transcript
    panel.scroll_offset = 900.0;
    assert_eq!(sync.on_scroll_notification(), ScrollOrigin::User);
    assert!(!sync.auto_scroll_enabled());

    h.media(|binding| MediaEvent::PositionAdvanced { binding, position: 100.0 })
        .await;
    let session = snapshots.borrow_and_update().clone();
    assert_eq!(sync.on_position(session.position, session.duration, &panel), None);

    // Resume catches up at once
    let cmd = sync
        .resume_auto_scroll(session.position, session.duration, &panel)
        .expect("catch-up jump");
    assert_relative_eq!(cmd.offset, 600.0);
}

#[tokio::test]
async fn test_loading_another_episode_resets_panel() {
    let h = Harness::auto_start();
    h.store.load_and_toggle(&episode("e1", 200.0)).await;

    let (panel, _task) = TranscriptPanel::spawn(SyncSettings::default(), &h.store);
    let mut view = panel.subscribe();
    panel.open();
    panel.select_language(Language::Fr);
    panel.disable_auto_scroll();
    assert!(!panel.state().auto_scroll_enabled);

    // Only the store is touched; the panel notices on its own
    h.store.load_and_toggle(&episode("e2", 200.0)).await;

    let state = timeout(
        Duration::from_secs(1),
        view.wait_for(|state| state.auto_scroll_enabled),
    )
    .await
    .expect("panel never reset")
    .expect("panel dropped");
    let state = *state;
    assert!(!state.open);
    assert_eq!(state.language, Language::Fr);
}

#[tokio::test]
async fn test_panel_scrolls_with_published_positions() {
    let h = Harness::auto_start();
    h.store.load_and_toggle(&episode("e1", 200.0)).await;
    h.metadata(200.0).await;

    let (panel, _task) = TranscriptPanel::spawn(SyncSettings::default(), &h.store);
    let mut commands = panel.scroll_commands();
    panel.set_metrics(ScrollMetrics::new(2000.0, 800.0, 0.0));
    panel.open();

    h.media(|binding| MediaEvent::PositionAdvanced { binding, position: 100.0 })
        .await;

    let cmd = timeout(Duration::from_secs(1), commands.recv())
        .await
        .expect("no scroll command")
        .expect("scroll channel closed");
    assert_relative_eq!(cmd.offset, 600.0);
    assert_eq!(
        panel.on_scroll(ScrollMetrics::new(2000.0, 800.0, 600.0)),
        ScrollOrigin::System
    );
    assert!(panel.state().auto_scroll_enabled);
}

#[test]
fn test_episode_transcript_segments() {
    let mut e = episode("e1", 200.0);
    e.transcript_en = Some(
        "Host: Welcome to the show\nThis is plain narration without a colon early on that happens to mention: timing"
            .into(),
    );

    let blocks: Vec<_> = segment(e.transcript(Language::En).unwrap()).collect();
    assert_eq!(blocks.len(), 2);
    assert_eq!(
        blocks[0],
        Block::Spoken {
            speaker: "Host",
            content: "Welcome to the show"
        }
    );
    assert!(matches!(blocks[1], Block::Plain { .. }));
    assert_eq!(e.transcript(Language::Fr), None);
}
