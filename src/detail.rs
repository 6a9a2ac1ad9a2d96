//! Ticket detail controller.
//!
//! Holds at most one "current" ticket plus the AI response drafted for it.
//! Opening another ticket replaces both; nothing is stacked.

use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::notify::Notifier;
use support_desk_core::generation::{GenerationGuard, PendingGeneration};
use support_desk_core::models::{AiResponse, ReplyReceipt, SimilarTicket, Ticket};
use support_desk_core::notification::{self, Notification};
use support_desk_core::view::{AiResponseView, TicketDetailView};
use support_desk_core::{DeskError, Result, Session};

#[derive(Debug, Default)]
pub struct TicketDetail {
    current: Option<Ticket>,
    response: Option<AiResponse>,
    guard: GenerationGuard,
}

impl TicketDetail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the full ticket and make it current. On failure the previous
    /// ticket (if any) stays on screen.
    pub async fn open(
        &mut self,
        api: &ApiClient,
        session: &Session,
        ticket_id: i64,
        notifier: &dyn Notifier,
    ) -> Result<&Ticket> {
        match api.get_ticket(session, ticket_id).await {
            Ok(ticket) => {
                debug!(id = ticket.id, "ticket opened");
                Ok(self.replace(ticket))
            }
            Err(e) => {
                warn!(id = ticket_id, error = %e, "failed to load ticket");
                notifier.notify(Notification::failure(
                    notification::LOAD_TICKET_FAILED,
                    &e.message(),
                ));
                Err(e)
            }
        }
    }

    /// Make `ticket` current, discarding the previous ticket, its drafted
    /// response and any generation still in flight for it.
    pub fn replace(&mut self, ticket: Ticket) -> &Ticket {
        self.response = None;
        self.guard.invalidate();
        self.current.insert(ticket)
    }

    pub fn close(&mut self) {
        self.current = None;
        self.response = None;
        self.guard.invalidate();
    }

    pub fn current(&self) -> Option<&Ticket> {
        self.current.as_ref()
    }

    pub fn current_id(&self) -> Option<i64> {
        self.current.as_ref().map(|t| t.id)
    }

    pub fn response(&self) -> Option<&AiResponse> {
        self.response.as_ref()
    }

    pub fn view(&self, session: &Session) -> Option<TicketDetailView> {
        self.current
            .as_ref()
            .map(|t| TicketDetailView::new(t, session.role()))
    }

    pub fn response_view(&self) -> Option<AiResponseView> {
        self.response.as_ref().map(AiResponseView::from_response)
    }

    /// Start a generation request for the current ticket.
    pub fn begin_generation(&mut self) -> Result<PendingGeneration> {
        let id = self.current_id().ok_or(DeskError::NoCurrentTicket)?;
        Ok(self.guard.begin(id))
    }

    /// Whether a result for `pending` would still be applied.
    pub fn is_current(&self, pending: &PendingGeneration) -> bool {
        self.guard.accepts(pending, self.current_id())
    }

    /// Apply a finished generation. Returns `false` (and drops `response`)
    /// when the request was superseded.
    pub fn accept_response(&mut self, pending: &PendingGeneration, response: AiResponse) -> bool {
        if !self.is_current(pending) {
            return false;
        }
        self.response = Some(response);
        true
    }

    /// Tickets the server considers similar to the current one.
    pub async fn similar(
        &self,
        api: &ApiClient,
        session: &Session,
        limit: u32,
        notifier: &dyn Notifier,
    ) -> Result<Vec<SimilarTicket>> {
        let id = self.current_id().ok_or(DeskError::NoCurrentTicket)?;
        api.similar_tickets(session, id, limit).await.map_err(|e| {
            notifier.notify(Notification::failure("Failed to find similar tickets", &e.message()));
            e
        })
    }

    /// Post a manual agent response on the current ticket.
    pub async fn reply(
        &self,
        api: &ApiClient,
        session: &Session,
        content: &str,
        notifier: &dyn Notifier,
    ) -> Result<ReplyReceipt> {
        let id = self.current_id().ok_or(DeskError::NoCurrentTicket)?;
        if content.trim().is_empty() {
            let err = DeskError::Validation("response must not be empty".into());
            notifier.notify(Notification::error(err.message()));
            return Err(err);
        }
        match api.add_response(session, id, content).await {
            Ok(receipt) => {
                notifier.notify(Notification::success(
                    receipt
                        .message
                        .clone()
                        .unwrap_or_else(|| "Response added successfully".to_string()),
                ));
                Ok(receipt)
            }
            Err(e) => {
                notifier.notify(Notification::failure("Failed to add response", &e.message()));
                Err(e)
            }
        }
    }
}
