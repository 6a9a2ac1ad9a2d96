//! AI response controller.
//!
//! Asks the server to draft a response for the ticket currently open in a
//! [`TicketDetail`], and reports the outcome:
//!
//! | Outcome | Notification |
//! |---------|--------------|
//! | drafted, `should_escalate = false` | success |
//! | drafted, `should_escalate = true` | escalation warning (no success) |
//! | request failed | fixed failure message |
//! | superseded by another ticket/request | none; result dropped |
//! | triggered while another request is in flight | none; nothing sent |

use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::detail::TicketDetail;
use crate::notify::Notifier;
use support_desk_core::generation::PendingGeneration;
use support_desk_core::models::AiResponse;
use support_desk_core::notification::{self, Notification};
use support_desk_core::{Result, Session};

/// The "generate AI response" trigger.
#[derive(Debug, Default)]
pub struct ResponseController {
    busy: AtomicBool,
}

/// Holds the trigger disabled; re-enables it when dropped, including when
/// the request future is cancelled.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ResponseController {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a request is in flight; the trigger is disabled meanwhile.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn acquire(&self) -> Option<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(&self.busy))
    }

    /// Draft a response for the current ticket.
    ///
    /// Returns `Ok(None)` when the result arrived for a ticket that is no
    /// longer current, or when another request is still in flight (nothing
    /// is sent then). Fails with `NoCurrentTicket` without sending anything
    /// if no ticket is open.
    pub async fn generate(
        &self,
        api: &ApiClient,
        session: &Session,
        detail: &mut TicketDetail,
        notifier: &dyn Notifier,
    ) -> Result<Option<AiResponse>> {
        let Some(_busy) = self.acquire() else {
            debug!("generation already in flight; ignoring trigger");
            return Ok(None);
        };
        let pending = detail.begin_generation()?;
        let outcome = api.generate_response(session, pending.ticket_id()).await;
        self.finish(detail, &pending, outcome, notifier)
    }

    /// Apply the outcome of a request started with
    /// [`TicketDetail::begin_generation`].
    pub fn finish(
        &self,
        detail: &mut TicketDetail,
        pending: &PendingGeneration,
        outcome: Result<AiResponse>,
        notifier: &dyn Notifier,
    ) -> Result<Option<AiResponse>> {
        if !detail.is_current(pending) {
            debug!(
                ticket = pending.ticket_id(),
                token = pending.token(),
                "discarding superseded AI response"
            );
            return Ok(None);
        }

        let response = match outcome {
            Ok(r) => r,
            Err(e) => {
                warn!(ticket = pending.ticket_id(), error = %e, "AI response generation failed");
                notifier.notify(Notification::error(notification::GENERATE_FAILED));
                return Err(e);
            }
        };

        if response.should_escalate {
            notifier.notify(Notification::warning(notification::ESCALATION_WARNING));
        } else {
            notifier.notify(Notification::success(notification::GENERATE_SUCCESS));
        }

        detail.accept_response(pending, response.clone());
        Ok(Some(response))
    }
}
