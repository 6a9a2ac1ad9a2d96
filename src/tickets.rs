//! Ticket list and ticket submission controllers.

use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::notify::Notifier;
use support_desk_core::form::TicketForm;
use support_desk_core::models::{Ticket, TicketQuery};
use support_desk_core::notification::{self, Notification};
use support_desk_core::view::TicketListView;
use support_desk_core::{Result, Session};

/// The caller's tickets, in the order the server returned them.
///
/// A failed reload keeps whatever was loaded last.
#[derive(Debug, Default)]
pub struct TicketList {
    tickets: Vec<Ticket>,
    query: TicketQuery,
}

impl TicketList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_query(&mut self, query: TicketQuery) {
        self.query = query;
    }

    /// Fetch the list. Failures are reported through `notifier` and leave
    /// the previous list in place.
    pub async fn load(
        &mut self,
        api: &ApiClient,
        session: &Session,
        notifier: &dyn Notifier,
    ) -> Result<&[Ticket]> {
        match api.list_tickets(session, &self.query).await {
            Ok(tickets) => {
                debug!(count = tickets.len(), "tickets loaded");
                self.tickets = tickets;
                Ok(&self.tickets)
            }
            Err(e) => {
                warn!(error = %e, "failed to load tickets");
                notifier.notify(Notification::failure(
                    notification::LOAD_TICKETS_FAILED,
                    &e.message(),
                ));
                Err(e)
            }
        }
    }

    /// Forget the loaded tickets; the query is kept.
    pub fn clear(&mut self) {
        self.tickets.clear();
    }

    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    pub fn view(&self) -> TicketListView {
        TicketListView::from_tickets(&self.tickets)
    }
}

/// The "new ticket" form and its submission.
#[derive(Debug, Default)]
pub struct TicketSubmission {
    form: TicketForm,
}

impl TicketSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form(&self) -> &TicketForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut TicketForm {
        &mut self.form
    }

    /// Send the form. On success the form is cleared and hidden and `list`
    /// is reloaded from the server so the new ticket's server-assigned
    /// fields (id, category, confidence) are authoritative.
    pub async fn submit(
        &mut self,
        api: &ApiClient,
        session: &Session,
        list: &mut TicketList,
        notifier: &dyn Notifier,
    ) -> Result<Ticket> {
        let request = match self.form.to_request() {
            Ok(r) => r,
            Err(e) => {
                notifier.notify(Notification::error(e.message()));
                return Err(e);
            }
        };

        let created = match api.create_ticket(session, &request).await {
            Ok(t) => t,
            Err(e) => {
                warn!(error = %e, "failed to create ticket");
                notifier.notify(Notification::failure("Failed to create ticket", &e.message()));
                return Err(e);
            }
        };

        debug!(id = created.id, auto = request.auto_categorize, "ticket created");
        self.form.clear_and_hide();
        notifier.notify(Notification::success(notification::TICKET_CREATED));

        // A failed reload is already reported by the list itself.
        let _ = list.load(api, session, notifier).await;
        Ok(created)
    }
}
