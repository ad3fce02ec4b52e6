//! Scripted media handle
//!
//! Records every call the engine makes and parks each start on a oneshot
//! channel until the test resolves it (or resolves immediately in auto mode).

use futures::FutureExt;
use parking_lot::Mutex;
use podplay_ap::media::{BindingId, BoundSource, MediaHandle, StartFuture, StartRejection};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::oneshot;

#[derive(Default)]
struct ScriptState {
    binds: Vec<(BindingId, String)>,
    unbinds: usize,
    bound: Option<(BindingId, String)>,
    pending: VecDeque<oneshot::Sender<Result<(), StartRejection>>>,
    auto_start: bool,
    plays: usize,
    pauses: usize,
    position: f64,
    volume: f64,
    rate: f64,
    error_latched: bool,
}

/// Test-side view of a ScriptedHandle
#[derive(Clone, Default)]
pub struct HandleScript {
    state: Arc<Mutex<ScriptState>>,
}

impl HandleScript {
    /// Resolve starts immediately with success from now on
    pub fn set_auto_start(&self, auto: bool) {
        self.state.lock().auto_start = auto;
    }

    /// Make `has_error()` report a latched error
    pub fn latch_error(&self, latched: bool) {
        self.state.lock().error_latched = latched;
    }

    /// Resolve the oldest pending start
    pub fn resolve_next(&self, result: Result<(), StartRejection>) {
        let tx = self
            .state
            .lock()
            .pending
            .pop_front()
            .expect("no pending start to resolve");
        let _ = tx.send(result);
    }

    pub fn pending_starts(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Yield until at least `n` starts are parked
    pub async fn wait_for_starts(&self, n: usize) {
        for _ in 0..1000 {
            if self.pending_starts() >= n {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("expected {} pending starts, have {}", n, self.pending_starts());
    }

    pub fn binds(&self) -> Vec<(BindingId, String)> {
        self.state.lock().binds.clone()
    }

    pub fn unbinds(&self) -> usize {
        self.state.lock().unbinds
    }

    /// Currently bound source URI
    pub fn bound_uri(&self) -> Option<String> {
        self.state.lock().bound.as_ref().map(|(_, uri)| uri.clone())
    }

    pub fn binding(&self) -> Option<BindingId> {
        self.state.lock().bound.as_ref().map(|(binding, _)| *binding)
    }

    pub fn plays(&self) -> usize {
        self.state.lock().plays
    }

    pub fn pauses(&self) -> usize {
        self.state.lock().pauses
    }

    pub fn position(&self) -> f64 {
        self.state.lock().position
    }

    pub fn volume(&self) -> f64 {
        self.state.lock().volume
    }

    pub fn rate(&self) -> f64 {
        self.state.lock().rate
    }
}

pub struct ScriptedHandle {
    script: HandleScript,
}

impl ScriptedHandle {
    pub fn new() -> (Self, HandleScript) {
        let script = HandleScript::default();
        (
            Self {
                script: script.clone(),
            },
            script,
        )
    }
}

impl MediaHandle for ScriptedHandle {
    fn bind(&mut self, binding: BindingId, source: &BoundSource) {
        let mut s = self.script.state.lock();
        s.binds.push((binding, source.uri.clone()));
        s.bound = Some((binding, source.uri.clone()));
        s.position = 0.0;
    }

    fn unbind(&mut self) {
        let mut s = self.script.state.lock();
        s.unbinds += 1;
        s.bound = None;
        s.position = 0.0;
    }

    fn play(&mut self) -> StartFuture {
        let mut s = self.script.state.lock();
        s.plays += 1;
        if s.auto_start {
            return futures::future::ready(Ok(())).boxed();
        }
        let (tx, rx) = oneshot::channel();
        s.pending.push_back(tx);
        async move { rx.await.unwrap_or(Err(StartRejection::Aborted)) }.boxed()
    }

    fn pause(&mut self) {
        self.script.state.lock().pauses += 1;
    }

    fn set_position(&mut self, seconds: f64) {
        self.script.state.lock().position = seconds;
    }

    fn set_volume(&mut self, volume: f64) {
        self.script.state.lock().volume = volume;
    }

    fn set_rate(&mut self, rate: f64) {
        self.script.state.lock().rate = rate;
    }

    fn has_error(&self) -> bool {
        self.script.state.lock().error_latched
    }
}
