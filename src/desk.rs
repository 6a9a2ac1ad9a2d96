//! The client as a whole.
//!
//! [`Desk`] owns one of each controller plus the shared gateway, token store
//! and notification sink, and wires the cross-controller effects: a login
//! loads the dashboard, a logout empties it.

use anyhow::Result as AnyResult;
use tracing::debug;

use crate::api::ApiClient;
use crate::config::Config;
use crate::detail::TicketDetail;
use crate::notify::{Notifier, NotifyMode};
use crate::respond::ResponseController;
use crate::session::SessionManager;
use crate::store::{FileTokenStore, TokenStore};
use crate::tickets::{TicketList, TicketSubmission};
use support_desk_core::models::{
    AdminReceipt, AiResponse, KnowledgeReceipt, NewKnowledgeItem, Registration, ReplyReceipt,
    SimilarTicket, SystemStats, Ticket, User,
};
use support_desk_core::{DeskError, Result, Screen, Session};

pub struct Desk {
    api: ApiClient,
    sessions: SessionManager,
    notifier: Box<dyn Notifier>,
    tickets: TicketList,
    submission: TicketSubmission,
    detail: TicketDetail,
    responder: ResponseController,
}

impl Desk {
    /// Build a client from configuration: file-backed token store and the
    /// configured notification mode.
    pub fn from_config(config: &Config) -> AnyResult<Self> {
        let api = ApiClient::from_config(config)?;
        let store = FileTokenStore::new(config.session.resolved_token_path()?);
        let notifier = NotifyMode::from_setting(&config.ui.notifications).notifier();
        Ok(Self::with_parts(api, Box::new(store), notifier))
    }

    pub fn with_parts(
        api: ApiClient,
        store: Box<dyn TokenStore>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            api,
            sessions: SessionManager::new(store),
            notifier,
            tickets: TicketList::new(),
            submission: TicketSubmission::new(),
            detail: TicketDetail::new(),
            responder: ResponseController::new(),
        }
    }

    /// Startup: try the stored token and, if it is still valid, load the
    /// dashboard. Returns the screen to show.
    pub async fn start(&mut self) -> Screen {
        if self.restore().await == Screen::Dashboard {
            let _ = self.load_tickets().await;
        }
        self.sessions.screen()
    }

    /// Validate the stored token without loading anything else.
    pub async fn restore(&mut self) -> Screen {
        self.sessions.restore(&self.api).await;
        self.sessions.screen()
    }

    /// Log in and load the dashboard.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<Screen> {
        self.sessions
            .login(&self.api, username, password, self.notifier.as_ref())
            .await?;
        let _ = self.load_tickets().await;
        Ok(self.sessions.screen())
    }

    /// Create an account only; the caller stays on the auth screen.
    pub async fn register(&mut self, registration: &Registration) -> Result<()> {
        self.sessions
            .register(&self.api, registration, self.notifier.as_ref())
            .await
    }

    /// Create an account and log straight in.
    pub async fn register_and_login(&mut self, registration: &Registration) -> Result<Screen> {
        self.sessions
            .register_and_login(&self.api, registration, self.notifier.as_ref())
            .await?;
        let _ = self.load_tickets().await;
        Ok(self.sessions.screen())
    }

    pub fn logout(&mut self) {
        self.sessions.logout(self.notifier.as_ref());
        self.tickets.clear();
        self.detail.close();
        self.submission.form_mut().clear_and_hide();
        debug!("dashboard cleared");
    }

    pub async fn load_tickets(&mut self) -> Result<&[Ticket]> {
        self.tickets
            .load(&self.api, self.sessions.session(), self.notifier.as_ref())
            .await
    }

    /// Submit whatever is in the ticket form.
    pub async fn submit_ticket(&mut self) -> Result<Ticket> {
        self.submission
            .submit(
                &self.api,
                self.sessions.session(),
                &mut self.tickets,
                self.notifier.as_ref(),
            )
            .await
    }

    pub async fn open_ticket(&mut self, ticket_id: i64) -> Result<&Ticket> {
        self.detail
            .open(
                &self.api,
                self.sessions.session(),
                ticket_id,
                self.notifier.as_ref(),
            )
            .await
    }

    pub async fn generate_response(&mut self) -> Result<Option<AiResponse>> {
        self.responder
            .generate(
                &self.api,
                self.sessions.session(),
                &mut self.detail,
                self.notifier.as_ref(),
            )
            .await
    }

    pub async fn similar_tickets(&self, limit: u32) -> Result<Vec<SimilarTicket>> {
        self.detail
            .similar(&self.api, self.sessions.session(), limit, self.notifier.as_ref())
            .await
    }

    pub async fn reply(&self, content: &str) -> Result<ReplyReceipt> {
        self.detail
            .reply(&self.api, self.sessions.session(), content, self.notifier.as_ref())
            .await
    }

    // Admin operations are refused locally for other roles and are not
    // notified; callers print the error.

    /// System statistics; admin accounts only.
    pub async fn stats(&self) -> Result<SystemStats> {
        let session = self.require_admin()?;
        self.api.admin_stats(session).await
    }

    pub async fn users(&self, skip: u32, limit: u32) -> Result<Vec<User>> {
        let session = self.require_admin()?;
        self.api.admin_users(session, skip, limit).await
    }

    pub async fn add_knowledge(&self, item: &NewKnowledgeItem) -> Result<KnowledgeReceipt> {
        let session = self.require_admin()?;
        let receipt = self.api.add_knowledge(session, item).await?;
        debug!(id = receipt.id, "knowledge base item added");
        Ok(receipt)
    }

    pub async fn delete_knowledge(&self, kb_id: i64) -> Result<AdminReceipt> {
        let session = self.require_admin()?;
        self.api.delete_knowledge(session, kb_id).await
    }

    pub async fn assign_ticket(&self, ticket_id: i64, agent_id: i64) -> Result<AdminReceipt> {
        let session = self.require_admin()?;
        let receipt = self.api.assign_ticket(session, ticket_id, agent_id).await?;
        debug!(ticket_id, agent_id, "ticket assigned");
        Ok(receipt)
    }

    fn require_admin(&self) -> Result<&Session> {
        let session = self.sessions.session();
        if !session.is_admin() {
            return Err(DeskError::Auth("admin access required".into()));
        }
        Ok(session)
    }

    pub async fn health(&self) -> Result<String> {
        self.api.health().await
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &Session {
        self.sessions.session()
    }

    pub fn screen(&self) -> Screen {
        self.sessions.screen()
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    pub fn tickets(&self) -> &TicketList {
        &self.tickets
    }

    pub fn tickets_mut(&mut self) -> &mut TicketList {
        &mut self.tickets
    }

    pub fn submission_mut(&mut self) -> &mut TicketSubmission {
        &mut self.submission
    }

    pub fn detail(&self) -> &TicketDetail {
        &self.detail
    }

    pub fn detail_mut(&mut self) -> &mut TicketDetail {
        &mut self.detail
    }

    pub fn responder(&self) -> &ResponseController {
        &self.responder
    }
}
