//! HTTP request handlers
//!
//! Playback commands always answer 200 with the outcome and the resulting
//! session; playback failures are session state, not HTTP errors. Only
//! unknown episodes and malformed paths map to 4xx.

use crate::api::server::AppContext;
use crate::catalog::TranscriptDownloads;
use crate::playback::{LoadOutcome, ToggleOutcome};
use crate::transcript::{
    segment, Block, ScrollCommand, ScrollMetrics, ScrollOrigin, TranscriptViewState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use podplay_common::events::{PlaybackSession, RATE_PRESETS};
use podplay_common::human_time::{format_clock, progress_percent};
use podplay_common::{Episode, EpisodeId, Language};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
    port: u16,
    episodes: usize,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    status: String,
}

type ApiError = (StatusCode, Json<StatusResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(StatusResponse {
            status: message.into(),
        }),
    )
}

/// Episode as listed on the episodes page
#[derive(Debug, Serialize)]
pub struct EpisodeSummary {
    id: EpisodeId,
    title: String,
    description: String,
    published_date: Option<String>,
    duration: f64,
    duration_label: String,
    cover_image_url: Option<String>,
    numbering: Option<String>,
    hosts: Vec<String>,
    guests: Vec<String>,
    tags: Vec<String>,
    has_audio: bool,
    transcripts: TranscriptDownloads,
    /// This is the episode currently held by the session
    active: bool,
    playing: bool,
}

#[derive(Debug, Serialize)]
pub struct EpisodeDetail {
    #[serde(flatten)]
    episode: Episode,
    transcript_downloads: TranscriptDownloads,
}

/// Session snapshot plus display strings for the player bar
#[derive(Debug, Serialize)]
pub struct PlaybackStateResponse {
    #[serde(flatten)]
    session: PlaybackSession,
    position_label: String,
    duration_label: String,
    progress_percent: f64,
    rate_presets: [f64; 3],
}

impl From<PlaybackSession> for PlaybackStateResponse {
    fn from(session: PlaybackSession) -> Self {
        Self {
            position_label: format_clock(session.position),
            duration_label: format_clock(session.duration),
            progress_percent: progress_percent(session.position, session.duration),
            rate_presets: RATE_PRESETS,
            session,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoadRequest {
    episode_id: EpisodeId,
}

#[derive(Debug, Serialize)]
pub struct LoadResponse {
    outcome: LoadOutcome,
    state: PlaybackStateResponse,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    outcome: ToggleOutcome,
    state: PlaybackStateResponse,
}

#[derive(Debug, Deserialize)]
pub struct SeekRequest {
    seconds: f64,
}

#[derive(Debug, Deserialize)]
pub struct SkipRequest {
    delta_seconds: f64,
}

#[derive(Debug, Deserialize)]
pub struct VolumeRequest {
    volume: f64,
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    rate: f64,
}

/// Result of a value command (seek, skip, volume, rate)
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// Value actually applied; None when the command was ignored
    applied: Option<f64>,
    state: PlaybackStateResponse,
}

#[derive(Debug, Deserialize)]
pub struct LanguageRequest {
    language: Language,
}

/// Panel geometry reported by the transcript view
#[derive(Debug, Deserialize)]
pub struct ScrollRequest {
    content_height: f64,
    viewport_height: f64,
    scroll_offset: f64,
}

impl From<ScrollRequest> for ScrollMetrics {
    fn from(req: ScrollRequest) -> Self {
        ScrollMetrics::new(req.content_height, req.viewport_height, req.scroll_offset)
    }
}

/// Panel state plus the scroll the view should perform, if any
#[derive(Debug, Serialize)]
pub struct PanelResponse {
    command: Option<ScrollCommand>,
    state: TranscriptViewState,
}

#[derive(Debug, Serialize)]
pub struct ScrollResponse {
    origin: ScrollOrigin,
    state: TranscriptViewState,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse<'a> {
    episode_id: &'a EpisodeId,
    language: Language,
    blocks: Vec<Block<'a>>,
}

// ============================================================================
// Health
// ============================================================================

/// GET /health
pub async fn health(State(ctx): State<AppContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "podplay-ap".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        port: ctx.port,
        episodes: ctx.catalog.len(),
    })
}

// ============================================================================
// Episodes
// ============================================================================

/// GET /episodes - newest first
pub async fn list_episodes(State(ctx): State<AppContext>) -> Json<Vec<EpisodeSummary>> {
    let session = ctx.store.snapshot();
    let episodes = ctx
        .catalog
        .episodes()
        .iter()
        .map(|episode| {
            let active = session.is_active(&episode.id);
            EpisodeSummary {
                id: episode.id.clone(),
                title: episode.title.clone(),
                description: episode.description.clone(),
                published_date: episode.published_date.clone(),
                duration: episode.duration,
                duration_label: format_clock(episode.duration),
                cover_image_url: episode.cover_image_url.clone(),
                numbering: episode.numbering_label(),
                hosts: episode.hosts.clone(),
                guests: episode.guests.clone(),
                tags: episode.tags.clone(),
                has_audio: episode.audio_source().is_some(),
                transcripts: ctx.links.downloads(episode),
                active,
                playing: active && session.is_playing(),
            }
        })
        .collect();
    Json(episodes)
}

/// GET /episodes/:id
pub async fn get_episode(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<EpisodeDetail>, ApiError> {
    let episode = ctx
        .catalog
        .get(&EpisodeId::new(id.clone()))
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("Episode not found: {}", id)))?;

    Ok(Json(EpisodeDetail {
        transcript_downloads: ctx.links.downloads(episode),
        episode: episode.clone(),
    }))
}

/// GET /episodes/:id/transcript/:lang - segmented transcript blocks
pub async fn get_transcript(
    State(ctx): State<AppContext>,
    Path((id, lang)): Path<(String, String)>,
) -> Response {
    let language: Language = match lang.parse() {
        Ok(language) => language,
        Err(e) => return api_error(StatusCode::BAD_REQUEST, format!("{}", e)).into_response(),
    };

    let Some(episode) = ctx.catalog.get(&EpisodeId::new(id.clone())) else {
        return api_error(StatusCode::NOT_FOUND, format!("Episode not found: {}", id))
            .into_response();
    };

    let Some(text) = episode.transcript(language) else {
        return api_error(
            StatusCode::NOT_FOUND,
            "No transcription available for this language.",
        )
        .into_response();
    };

    Json(TranscriptResponse {
        episode_id: &episode.id,
        language,
        blocks: segment(text).collect(),
    })
    .into_response()
}

// ============================================================================
// Playback
// ============================================================================

/// GET /playback/state
pub async fn get_playback_state(State(ctx): State<AppContext>) -> Json<PlaybackStateResponse> {
    Json(ctx.store.snapshot().into())
}

/// POST /playback/load - load an episode, or toggle it if already active
pub async fn load(
    State(ctx): State<AppContext>,
    Json(req): Json<LoadRequest>,
) -> Result<Json<LoadResponse>, ApiError> {
    let Some(episode) = ctx.catalog.get(&req.episode_id) else {
        warn!("Load requested for unknown episode {}", req.episode_id);
        return Err(api_error(
            StatusCode::NOT_FOUND,
            format!("Episode not found: {}", req.episode_id),
        ));
    };

    info!("Load request: {}", episode.title);
    let outcome = ctx.store.load_and_toggle(episode).await;
    Ok(Json(LoadResponse {
        outcome,
        state: ctx.store.snapshot().into(),
    }))
}

/// POST /playback/toggle
pub async fn toggle(State(ctx): State<AppContext>) -> Json<ToggleResponse> {
    let outcome = ctx.store.toggle_play().await;
    Json(ToggleResponse {
        outcome,
        state: ctx.store.snapshot().into(),
    })
}

/// POST /playback/seek
pub async fn seek(
    State(ctx): State<AppContext>,
    Json(req): Json<SeekRequest>,
) -> Json<CommandResponse> {
    let applied = ctx.store.seek(req.seconds).await;
    command_response(&ctx, applied)
}

/// POST /playback/skip - relative seek (player's back/forward buttons)
pub async fn skip(
    State(ctx): State<AppContext>,
    Json(req): Json<SkipRequest>,
) -> Json<CommandResponse> {
    let applied = ctx.store.skip(req.delta_seconds).await;
    command_response(&ctx, applied)
}

/// POST /playback/volume
pub async fn set_volume(
    State(ctx): State<AppContext>,
    Json(req): Json<VolumeRequest>,
) -> Json<CommandResponse> {
    let applied = ctx.store.set_volume(req.volume).await;
    command_response(&ctx, applied)
}

/// POST /playback/rate
pub async fn set_rate(
    State(ctx): State<AppContext>,
    Json(req): Json<RateRequest>,
) -> Json<CommandResponse> {
    let applied = ctx.store.set_rate(req.rate).await;
    command_response(&ctx, applied)
}

/// POST /playback/close
pub async fn close(State(ctx): State<AppContext>) -> Json<PlaybackStateResponse> {
    ctx.store.close().await;
    Json(ctx.store.snapshot().into())
}

fn command_response(ctx: &AppContext, applied: Option<f64>) -> Json<CommandResponse> {
    Json(CommandResponse {
        applied,
        state: ctx.store.snapshot().into(),
    })
}

// ============================================================================
// Transcript panel
// ============================================================================

/// GET /transcript/state
pub async fn get_panel_state(State(ctx): State<AppContext>) -> Json<TranscriptViewState> {
    Json(ctx.transcript.state())
}

/// POST /transcript/open
pub async fn open_panel(State(ctx): State<AppContext>) -> Json<PanelResponse> {
    let command = ctx.transcript.open();
    panel_response(&ctx, command)
}

/// POST /transcript/close
pub async fn close_panel(State(ctx): State<AppContext>) -> Json<TranscriptViewState> {
    ctx.transcript.close();
    Json(ctx.transcript.state())
}

/// POST /transcript/language
pub async fn select_language(
    State(ctx): State<AppContext>,
    Json(req): Json<LanguageRequest>,
) -> Json<PanelResponse> {
    let command = ctx.transcript.select_language(req.language);
    panel_response(&ctx, command)
}

/// POST /transcript/scroll - the view scrolled (or resized)
pub async fn report_scroll(
    State(ctx): State<AppContext>,
    Json(req): Json<ScrollRequest>,
) -> Json<ScrollResponse> {
    let origin = ctx.transcript.on_scroll(req.into());
    Json(ScrollResponse {
        origin,
        state: ctx.transcript.state(),
    })
}

/// POST /transcript/metrics - geometry changed without a scroll
pub async fn set_panel_metrics(
    State(ctx): State<AppContext>,
    Json(req): Json<ScrollRequest>,
) -> Json<TranscriptViewState> {
    ctx.transcript.set_metrics(req.into());
    Json(ctx.transcript.state())
}

/// POST /transcript/auto_scroll - flip automatic scrolling
pub async fn toggle_auto_scroll(State(ctx): State<AppContext>) -> Json<PanelResponse> {
    let command = ctx.transcript.toggle_auto_scroll();
    panel_response(&ctx, command)
}

fn panel_response(ctx: &AppContext, command: Option<ScrollCommand>) -> Json<PanelResponse> {
    Json(PanelResponse {
        command,
        state: ctx.transcript.state(),
    })
}
