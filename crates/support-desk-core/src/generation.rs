//! Request tokens for AI response generation.
//!
//! Generating a response takes seconds, and the detail view may move to a
//! different ticket in the meantime. Each generation request takes a token
//! from a monotonically increasing counter; replacing the current ticket
//! advances the counter too. A result is applied only if its token is still
//! the latest and its ticket is still the one on screen.

/// Issued when a generation request starts; presented again on completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingGeneration {
    ticket_id: i64,
    token: u64,
}

impl PendingGeneration {
    pub fn ticket_id(&self) -> i64 {
        self.ticket_id
    }

    pub fn token(&self) -> u64 {
        self.token
    }
}

#[derive(Debug, Default)]
pub struct GenerationGuard {
    latest: u64,
}

impl GenerationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request for `ticket_id`, superseding any earlier one.
    pub fn begin(&mut self, ticket_id: i64) -> PendingGeneration {
        self.latest += 1;
        PendingGeneration {
            ticket_id,
            token: self.latest,
        }
    }

    /// Supersede every outstanding request without starting a new one.
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }

    /// Whether `pending` may still be applied while `current_ticket` is shown.
    pub fn accepts(&self, pending: &PendingGeneration, current_ticket: Option<i64>) -> bool {
        pending.token == self.latest && current_ticket == Some(pending.ticket_id)
    }
}
