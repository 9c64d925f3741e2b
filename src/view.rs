//! Presentation-side state for a snapshot lookup.
//!
//! The aggregator itself is stateless; whoever drives it owns one of these
//! and feeds it results. Each `begin` hands out a ticket, and a result that
//! arrives with an outdated ticket is dropped instead of overwriting the
//! newer request's state.

use tracing::debug;

use crate::error::FetchError;
use crate::stats::ProfileSnapshot;

#[derive(Debug, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Loading {
        username: String,
    },
    Success(ProfileSnapshot),
    Failed(FetchError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
pub struct Session {
    generation: u64,
    state: ViewState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Start a lookup. Any previously shown snapshot or error is cleared.
    pub fn begin(&mut self, username: &str) -> Ticket {
        self.generation += 1;
        self.state = ViewState::Loading {
            username: username.trim().to_string(),
        };
        Ticket(self.generation)
    }

    /// Apply a finished lookup. Returns `false` and leaves the state alone
    /// when `ticket` belongs to a lookup that has since been superseded.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        result: Result<ProfileSnapshot, FetchError>,
    ) -> bool {
        if ticket.0 != self.generation {
            debug!(
                stale = ticket.0,
                current = self.generation,
                "discarding stale snapshot result"
            );
            return false;
        }

        self.state = match result {
            Ok(snapshot) => ViewState::Success(snapshot),
            Err(err) => ViewState::Failed(err),
        };
        true
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ViewState::Loading { .. })
    }
}
