//! HTTP gateway to the support-desk API.
//!
//! Every request goes through [`ApiClient::call`] (or its query-string
//! variant), which attaches the session's bearer token, encodes the payload
//! and normalizes failures into [`DeskError::Api`].
//!
//! # Encoding
//!
//! The login endpoint is the only form-encoded route; everything else sends
//! JSON. Keep that asymmetry: the server's OAuth2 password flow rejects a
//! JSON login body.
//!
//! # Errors
//!
//! Non-2xx responses carry a JSON body with an optional `detail`. A string
//! `detail` becomes the error message verbatim; a list of validation
//! entries is flattened; anything else yields
//! [`GENERIC_ERROR_MESSAGE`]. Nothing is retried.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use support_desk_core::error::GENERIC_ERROR_MESSAGE;
use support_desk_core::models::{
    AdminReceipt, AiResponse, KnowledgeReceipt, NewKnowledgeItem, NewTicket, Registration,
    ReplyReceipt, SimilarTicket, SimilarTickets, SystemStats, Ticket, TicketQuery,
    TokenResponse, User,
};
use support_desk_core::{DeskError, Result, Session};

/// Prefix of every versioned endpoint.
pub const API_PREFIX: &str = "/api/v1";

/// Request body encoding.
#[derive(Debug, Clone)]
pub enum Payload {
    Json(Value),
    Form(Vec<(String, String)>),
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeskError::api(None, format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.base_url(), Duration::from_secs(config.api.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue one request to `endpoint` (relative to [`API_PREFIX`]).
    ///
    /// Returns the decoded JSON body, or `Value::Null` for an empty body.
    pub async fn call(
        &self,
        session: &Session,
        method: Method,
        endpoint: &str,
        payload: Option<Payload>,
    ) -> Result<Value> {
        self.call_with_query(session, method, endpoint, &[], payload).await
    }

    pub async fn call_with_query(
        &self,
        session: &Session,
        method: Method,
        endpoint: &str,
        query: &[(&str, String)],
        payload: Option<Payload>,
    ) -> Result<Value> {
        let url = format!("{}{}{}", self.base_url, API_PREFIX, endpoint);
        self.send(session.token(), method, &url, query, payload).await
    }

    async fn send(
        &self,
        token: Option<&str>,
        method: Method,
        url: &str,
        query: &[(&str, String)],
        payload: Option<Payload>,
    ) -> Result<Value> {
        debug!(%method, url, "sending request");

        let mut request = self.http.request(method.clone(), url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request = match payload {
            Some(Payload::Json(body)) => request.json(&body),
            Some(Payload::Form(fields)) => request.form(&fields),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| DeskError::api(None, format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| DeskError::api(Some(status.as_u16()), e.to_string()))?;

        debug!(%method, url, status = status.as_u16(), "received response");

        if !status.is_success() {
            return Err(DeskError::api(Some(status.as_u16()), error_message(&bytes)));
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| {
            DeskError::api(Some(status.as_u16()), format!("invalid JSON from {}: {}", url, e))
        })
    }

    // ============ Auth ============

    /// `POST /auth/login`, form-encoded.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse> {
        let form = vec![
            ("username".to_string(), username.to_string()),
            ("password".to_string(), password.to_string()),
        ];
        let value = self
            .call(&Session::anonymous(), Method::POST, "/auth/login", Some(Payload::Form(form)))
            .await?;
        decode("/auth/login", value)
    }

    pub async fn register(&self, registration: &Registration) -> Result<()> {
        let body = to_json(registration)?;
        self.call(
            &Session::anonymous(),
            Method::POST,
            "/auth/register",
            Some(Payload::Json(body)),
        )
        .await?;
        Ok(())
    }

    /// `GET /auth/me` with an explicit token (the session may not exist yet).
    pub async fn me(&self, token: &str) -> Result<User> {
        let url = format!("{}{}/auth/me", self.base_url, API_PREFIX);
        let value = self.send(Some(token), Method::GET, &url, &[], None).await?;
        decode("/auth/me", value)
    }

    // ============ Tickets ============

    pub async fn list_tickets(&self, session: &Session, query: &TicketQuery) -> Result<Vec<Ticket>> {
        let value = self
            .call_with_query(session, Method::GET, "/tickets/", &query.to_pairs(), None)
            .await?;
        decode("/tickets/", value)
    }

    pub async fn create_ticket(&self, session: &Session, ticket: &NewTicket) -> Result<Ticket> {
        let body = to_json(ticket)?;
        let value = self
            .call(session, Method::POST, "/tickets/", Some(Payload::Json(body)))
            .await?;
        decode("/tickets/", value)
    }

    pub async fn get_ticket(&self, session: &Session, id: i64) -> Result<Ticket> {
        let endpoint = format!("/tickets/{}", id);
        let value = self.call(session, Method::GET, &endpoint, None).await?;
        decode(&endpoint, value)
    }

    pub async fn generate_response(&self, session: &Session, id: i64) -> Result<AiResponse> {
        let endpoint = format!("/tickets/{}/generate-response", id);
        let value = self.call(session, Method::POST, &endpoint, None).await?;
        decode(&endpoint, value)
    }

    pub async fn similar_tickets(
        &self,
        session: &Session,
        id: i64,
        limit: u32,
    ) -> Result<Vec<SimilarTicket>> {
        let endpoint = format!("/tickets/{}/similar", id);
        let value = self
            .call_with_query(session, Method::GET, &endpoint, &[("limit", limit.to_string())], None)
            .await?;
        let similar: SimilarTickets = decode(&endpoint, value)?;
        Ok(similar.similar_tickets)
    }

    /// `POST /tickets/{id}/responses`; the server reads the content from
    /// the query string.
    pub async fn add_response(
        &self,
        session: &Session,
        id: i64,
        content: &str,
    ) -> Result<ReplyReceipt> {
        let endpoint = format!("/tickets/{}/responses", id);
        let value = self
            .call_with_query(
                session,
                Method::POST,
                &endpoint,
                &[("response_content", content.to_string())],
                None,
            )
            .await?;
        decode(&endpoint, value)
    }

    // ============ Admin / health ============

    pub async fn admin_stats(&self, session: &Session) -> Result<SystemStats> {
        let value = self.call(session, Method::GET, "/admin/stats", None).await?;
        decode("/admin/stats", value)
    }

    pub async fn admin_users(&self, session: &Session, skip: u32, limit: u32) -> Result<Vec<User>> {
        let query = [("skip", skip.to_string()), ("limit", limit.to_string())];
        let value = self
            .call_with_query(session, Method::GET, "/admin/users", &query, None)
            .await?;
        decode("/admin/users", value)
    }

    /// `POST /admin/knowledge-base`; every field travels in the query string.
    pub async fn add_knowledge(
        &self,
        session: &Session,
        item: &NewKnowledgeItem,
    ) -> Result<KnowledgeReceipt> {
        let pairs = item.to_pairs()?;
        let value = self
            .call_with_query(session, Method::POST, "/admin/knowledge-base", &pairs, None)
            .await?;
        decode("/admin/knowledge-base", value)
    }

    pub async fn delete_knowledge(&self, session: &Session, kb_id: i64) -> Result<AdminReceipt> {
        let endpoint = format!("/admin/knowledge-base/{}", kb_id);
        let value = self.call(session, Method::DELETE, &endpoint, None).await?;
        decode(&endpoint, value)
    }

    pub async fn assign_ticket(
        &self,
        session: &Session,
        ticket_id: i64,
        agent_id: i64,
    ) -> Result<AdminReceipt> {
        let query = [
            ("ticket_id", ticket_id.to_string()),
            ("agent_id", agent_id.to_string()),
        ];
        let value = self
            .call_with_query(session, Method::POST, "/admin/assign-ticket", &query, None)
            .await?;
        decode("/admin/assign-ticket", value)
    }

    /// `GET /health` (unversioned). Returns the reported status string.
    pub async fn health(&self) -> Result<String> {
        let url = format!("{}/health", self.base_url);
        let value = self.send(None, Method::GET, &url, &[], None).await?;
        Ok(value
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string())
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| DeskError::api(None, e.to_string()))
}

fn decode<T: DeserializeOwned>(endpoint: &str, value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| DeskError::api(None, format!("unexpected response from {}: {}", endpoint, e)))
}

/// Extract a human-readable message from an error body.
pub fn error_message(body: &[u8]) -> String {
    let value: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(_) => return GENERIC_ERROR_MESSAGE.to_string(),
    };

    match value.get("detail") {
        Some(Value::String(detail)) if !detail.trim().is_empty() => detail.clone(),
        Some(Value::Array(entries)) => {
            let messages: Vec<&str> = entries
                .iter()
                .filter_map(|e| e.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                GENERIC_ERROR_MESSAGE.to_string()
            } else {
                messages.join("; ")
            }
        }
        _ => GENERIC_ERROR_MESSAGE.to_string(),
    }
}
