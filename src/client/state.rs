//! UI gating state: an immutable record changed only by applying events through [`reduce`].
//!
//! The loading phase is advisory. Overlapping dispatches are not prevented; whichever
//! dispatch completes last owns `last_result`, and the first completion returns the phase
//! to `Idle` even if another call is still in flight.

use tokio::sync::watch;

use super::role::Role;
use crate::envelope::Envelope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UiState {
    pub phase: Phase,
    pub last_result: Option<Envelope>,
    /// `None` until the first session verification has finished.
    pub role: Option<Role>,
}

impl UiState {
    pub fn is_loading(&self) -> bool { self.phase == Phase::Loading }

    /// Whether user-triggered actions (list, download) should be enabled.
    pub fn actions_enabled(&self) -> bool { self.phase == Phase::Idle }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    DispatchStarted,
    /// `result` is `None` when the completed call does not own the shared result (role lookup).
    DispatchCompleted { result: Option<Envelope> },
    RoleResolved(Role),
}

pub fn reduce(state: &UiState, event: UiEvent) -> UiState {
    match event {
        UiEvent::DispatchStarted => UiState { phase: Phase::Loading, ..state.clone() },
        UiEvent::DispatchCompleted { result: Some(env) } => UiState {
            phase: Phase::Idle,
            last_result: Some(env),
            role: state.role.clone(),
        },
        UiEvent::DispatchCompleted { result: None } => UiState { phase: Phase::Idle, ..state.clone() },
        UiEvent::RoleResolved(role) => UiState { role: Some(role), ..state.clone() },
    }
}

/// Holder of the current [`UiState`]. Each event is one reducer transition under the
/// channel's lock, so no mutation spans a suspension point. Observers subscribe to changes.
#[derive(Debug)]
pub struct UiStore {
    tx: watch::Sender<UiState>,
}

impl Default for UiStore {
    fn default() -> Self { Self::new(UiState::default()) }
}

impl UiStore {
    pub fn new(initial: UiState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Returns the state this event produced, not whatever is current afterwards.
    pub fn apply(&self, event: UiEvent) -> UiState {
        let mut produced = UiState::default();
        self.tx.send_modify(|s| {
            *s = reduce(s, event);
            produced = s.clone();
        });
        produced
    }

    pub fn snapshot(&self) -> UiState { self.tx.borrow().clone() }

    pub fn subscribe(&self) -> watch::Receiver<UiState> { self.tx.subscribe() }
}
