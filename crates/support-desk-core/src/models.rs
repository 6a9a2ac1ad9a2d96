//! Data models exchanged with the support-desk API.
//!
//! These mirror the JSON shapes the server returns. Enumerations are
//! string-backed: unknown values decode into an `Other` variant instead of
//! failing the whole payload, so a new server-side status never breaks
//! the ticket list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares a string-backed enum with a catch-all `Other` variant.
///
/// Each known variant maps to one canonical wire string plus optional
/// aliases accepted on input.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $wire:literal $(| $alias:literal)*),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl $name {
            /// Canonical wire representation.
            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $wire,)+
                    $name::Other(s) => s.as_str(),
                }
            }

            fn known(s: &str) -> Option<Self> {
                match s {
                    $($wire $(| $alias)* => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name::known(&s).unwrap_or_else(|| $name::Other(s))
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                value.as_str().to_string()
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok($name::from(s.trim().to_ascii_lowercase()))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum! {
    /// Role of an authenticated user. The server calls requesters `customer`.
    pub enum Role {
        Requester => "requester" | "customer",
        Agent => "agent",
        Admin => "admin",
    }
}

impl Role {
    /// Agents and admins may ask the server to draft responses.
    pub fn can_generate_responses(&self) -> bool {
        matches!(self, Role::Agent | Role::Admin)
    }
}

wire_enum! {
    pub enum TicketStatus {
        Open => "open",
        InProgress => "in_progress",
        Resolved => "resolved",
        Closed => "closed",
        Escalated => "escalated",
    }
}

wire_enum! {
    pub enum TicketPriority {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

impl Default for TicketPriority {
    fn default() -> Self {
        TicketPriority::Medium
    }
}

wire_enum! {
    pub enum TicketCategory {
        Technical => "technical",
        Billing => "billing",
        Account => "account",
        Product => "product",
        General => "general",
    }
}

wire_enum! {
    /// Where a retrieved RAG source came from.
    pub enum SourceKind {
        Ticket => "ticket",
        Knowledge => "knowledge",
    }
}

/// Authenticated user profile from `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: Role,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// A support ticket as returned by the server.
///
/// `category_confidence` is only meaningful when `auto_categorized` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    #[serde(default)]
    pub priority: TicketPriority,
    #[serde(default)]
    pub category: Option<TicketCategory>,
    #[serde(default)]
    pub predicted_category: Option<TicketCategory>,
    #[serde(default)]
    pub category_confidence: Option<f64>,
    #[serde(default)]
    pub auto_categorized: bool,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub assigned_agent_id: Option<i64>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Body of `POST /tickets/`.
///
/// `category` and `auto_categorize` are mutually exclusive: build it with
/// [`NewTicket::new`] so the two never disagree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub priority: TicketPriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<TicketCategory>,
    pub auto_categorize: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl NewTicket {
    /// An empty or whitespace-only `category` requests server-side
    /// auto-categorization and omits the field.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        priority: TicketPriority,
        category: Option<&str>,
    ) -> Self {
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(|c| TicketCategory::from(c.to_ascii_lowercase()));
        Self {
            title: title.into(),
            description: description.into(),
            priority,
            auto_categorize: category.is_none(),
            category,
            tags: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Registration {
    pub email: String,
    pub username: String,
    pub password: String,
    pub full_name: String,
}

/// Response of `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// A retrieved ticket or knowledge article the server used for a draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSource {
    #[serde(rename = "type")]
    pub kind: SourceKind,
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub similarity: f64,
}

/// AI-drafted response from `POST /tickets/{id}/generate-response`.
///
/// Transient: it lives only as long as the detail view of its ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiResponse {
    pub response: String,
    pub confidence: f64,
    pub should_escalate: bool,
    #[serde(default)]
    pub sources: Vec<ResponseSource>,
    #[serde(default)]
    pub response_id: Option<i64>,
}

/// One entry of `GET /tickets/{id}/similar`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarTicket {
    pub ticket_id: i64,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub similarity: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimilarTickets {
    #[serde(default)]
    pub similar_tickets: Vec<SimilarTicket>,
}

/// Result of `POST /tickets/{id}/responses`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplyReceipt {
    #[serde(default)]
    pub message: Option<String>,
    pub response_id: i64,
}

/// Admin dashboard counters from `GET /admin/stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStats {
    pub total_tickets: u64,
    pub open_tickets: u64,
    pub resolved_tickets: u64,
    pub total_users: u64,
    pub total_knowledge_items: u64,
}

/// Server-side filters for the ticket list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketQuery {
    pub status: Option<TicketStatus>,
    pub category: Option<TicketCategory>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl TicketQuery {
    /// Query-string pairs, omitting unset filters.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(ref status) = self.status {
            pairs.push(("status_filter", status.to_string()));
        }
        if let Some(ref category) = self.category {
            pairs.push(("category_filter", category.to_string()));
        }
        if let Some(skip) = self.skip {
            pairs.push(("skip", skip.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

/// A knowledge-base article to add through `POST /admin/knowledge-base`.
///
/// The server reads every field from the query string; `tags` repeats.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewKnowledgeItem {
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
}

impl NewKnowledgeItem {
    /// Validated query-string pairs.
    pub fn to_pairs(&self) -> crate::Result<Vec<(&'static str, String)>> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(crate::DeskError::Validation("title must not be empty".into()));
        }
        if self.content.trim().is_empty() {
            return Err(crate::DeskError::Validation("content must not be empty".into()));
        }

        let mut pairs = vec![("title", title.to_string()), ("content", self.content.clone())];
        if let Some(category) = self.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            pairs.push(("category", category.to_ascii_lowercase()));
        }
        pairs.extend(self.tags.iter().map(|t| ("tags", t.clone())));
        Ok(pairs)
    }
}

/// Result of `POST /admin/knowledge-base`.
#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeReceipt {
    #[serde(default)]
    pub message: Option<String>,
    pub id: i64,
}

/// Bare `{message}` acknowledgement returned by admin mutations.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminReceipt {
    #[serde(default)]
    pub message: Option<String>,
}

/// Timestamps arrive either as RFC 3339 or as naive ISO 8601 (no offset),
/// which is read as UTC.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(s: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", s)))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            dt: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match dt {
                Some(dt) => super::serialize(dt, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(s) => super::parse(&s)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", s))),
                None => Ok(None),
            }
        }
    }
}
