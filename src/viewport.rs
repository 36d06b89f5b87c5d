//! Viewport synchronization between the map widget and the persisted `bounds` option.
//!
//! Two writers compete for the viewport: the user dragging/zooming the map, and the host
//! changing `options.bounds`. The state machine keeps them from fighting:
//!
//! ```text
//!            move_start (focused)            move_end(b)
//!   Idle ─────────────────────────▶ UserMoving ─────────────▶ Committing(b)
//!    ▲                          ▲      move_start (focused)       │
//!    │                          └─────────────────────────────────┤
//!    └──────────────────── observe_bounds(..) ────────────────────┘
//! ```
//!
//! While a gesture is in progress or its result has not yet been observed downstream,
//! externally supplied bounds are not applied. Once `Idle`, a bounds change produces a
//! [`SyncAction::FitBounds`] for the map.

use crate::models::ViewportBounds;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportState {
    Idle,
    UserMoving,
    /// Bounds were written back to the options; waiting for the write to be observed.
    Committing(ViewportBounds),
}

/// What the caller must do in response to an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncAction {
    None,
    /// Move the map to these bounds.
    FitBounds(ViewportBounds),
    /// Persist these bounds into the options and notify the options-changed callback.
    Persist(ViewportBounds),
}

#[derive(Debug, Clone)]
pub struct ViewportSync {
    state: ViewportState,
    focused: bool,
}

impl Default for ViewportSync {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewportSync {
    pub fn new() -> Self {
        Self {
            state: ViewportState::Idle,
            focused: false,
        }
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        !matches!(self.state, ViewportState::Idle)
    }

    /// The map gained focus: subsequent move events are user-driven.
    pub fn focus(&mut self) {
        self.focused = true;
    }

    /// The map lost focus. A gesture already in progress still completes on its move-end.
    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn move_start(&mut self) {
        if !self.focused {
            return;
        }
        match self.state {
            ViewportState::Idle => {
                log::debug!("viewport: user move started");
                self.state = ViewportState::UserMoving;
            }
            // A new gesture supersedes the commit still waiting to be observed.
            ViewportState::Committing(pending) => {
                log::debug!("viewport: user move started before {:?} was observed", pending);
                self.state = ViewportState::UserMoving;
            }
            ViewportState::UserMoving => {}
        }
    }

    /// The gesture ended with the map showing `current`.
    pub fn move_end(&mut self, current: ViewportBounds) -> SyncAction {
        match self.state {
            ViewportState::UserMoving => {
                log::debug!("viewport: user move ended, committing {:?}", current);
                self.state = ViewportState::Committing(current);
                SyncAction::Persist(current)
            }
            _ => SyncAction::None,
        }
    }

    /// Bounds from the options were (re)observed: either our own committed write coming back,
    /// or an external change. `None` means the options carry no bounds and the map should fit
    /// `fallback` (the data extent).
    pub fn observe_bounds(
        &mut self,
        bounds: Option<ViewportBounds>,
        fallback: Option<ViewportBounds>,
    ) -> SyncAction {
        match self.state {
            ViewportState::UserMoving => SyncAction::None,
            ViewportState::Committing(committed) => {
                self.state = ViewportState::Idle;
                if bounds == Some(committed) {
                    log::debug!("viewport: commit observed, unlocked");
                    SyncAction::None
                } else {
                    self.fit(bounds.or(fallback))
                }
            }
            ViewportState::Idle => self.fit(bounds.or(fallback)),
        }
    }

    /// Re-apply the current target regardless of whether it changed (render, resize).
    /// Still suppressed while locked.
    pub fn refit(
        &self,
        bounds: Option<ViewportBounds>,
        fallback: Option<ViewportBounds>,
    ) -> SyncAction {
        if self.is_locked() {
            return SyncAction::None;
        }
        self.fit(bounds.or(fallback))
    }

    fn fit(&self, target: Option<ViewportBounds>) -> SyncAction {
        target.map_or(SyncAction::None, SyncAction::FitBounds)
    }
}
