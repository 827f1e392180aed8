//! The per-session wizard context.
//!
//! One explicit object owns everything mutable about a planning session:
//! the selection model, the wizard cursor, the registration gate, and the
//! cached enhancement text from the last successful generation -- the one
//! piece of state that cannot be re-derived. Created at session start,
//! reset on explicit restart, torn down at session end; there is no
//! ambient or static session state.

use crate::selection::SelectionModel;
use crate::wizard::WizardCursor;

/// Ticket identifying one generation request, for latest-response-wins
/// resolution of overlapping requests.
pub type GenerationTicket = u64;

/// The wizard session context.
#[derive(Debug, Default)]
pub struct PlanSession {
    pub selection: SelectionModel,
    pub cursor: WizardCursor,
    enhancement: Option<String>,
    registered: bool,
    latest_ticket: GenerationTicket,
}

impl PlanSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached enhancement text from the most recent accepted
    /// generation, if any.
    pub fn enhancement(&self) -> Option<&str> {
        self.enhancement.as_deref()
    }

    /// Issue a ticket for a new generation request. Requests may overlap;
    /// only the response carrying the most recently issued ticket will be
    /// accepted.
    pub fn begin_generation(&mut self) -> GenerationTicket {
        self.latest_ticket += 1;
        self.latest_ticket
    }

    /// Store the enhancement for a completed generation request.
    ///
    /// Returns `false` and leaves the cache untouched when the ticket has
    /// been superseded by a later request -- a stale response never
    /// clobbers a fresher one.
    pub fn complete_generation(&mut self, ticket: GenerationTicket, text: String) -> bool {
        if ticket != self.latest_ticket {
            tracing::debug!(ticket, latest = self.latest_ticket, "dropping stale generation response");
            return false;
        }
        self.enhancement = Some(text);
        true
    }

    /// Whether the session has passed the registration gate.
    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Latch the registration gate. Once set it holds for the whole
    /// session: downloads and generation requests never re-prompt.
    pub fn register(&mut self) {
        self.registered = true;
    }

    /// Wholesale reset to a fresh session. Selections are never partially
    /// destroyed -- this is the only way to discard them.
    pub fn reset(&mut self) {
        *self = PlanSession::new();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
