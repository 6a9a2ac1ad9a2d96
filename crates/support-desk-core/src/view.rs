//! Ticket → view-model transforms.
//!
//! Every rendering rule lives here as a pure function so it can be checked
//! without a terminal: description truncation, confidence percentages and
//! tiers, and role-based visibility of the AI action. The application
//! crate's renderer only lays these values out as text.

use std::borrow::Cow;

use crate::models::{AiResponse, Role, SimilarTicket, SourceKind, Ticket};

/// Maximum number of characters of a description shown in list summaries.
pub const SUMMARY_CHARS: usize = 100;

/// Appended to a summary only when the description was cut.
pub const ELLIPSIS: &str = "...";

/// Shown instead of the list when the caller has no tickets.
pub const EMPTY_TICKETS_PLACEHOLDER: &str = "No tickets found. Create your first ticket to get started.";

const HIGH_CONFIDENCE: f64 = 0.8;
const MEDIUM_CONFIDENCE: f64 = 0.5;

/// Confidence classification shared by category and AI-response rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    /// `c >= 0.8` is high, `0.5 <= c < 0.8` is medium, anything else
    /// (including NaN) is low.
    pub fn from_confidence(c: f64) -> Self {
        if c >= HIGH_CONFIDENCE {
            ConfidenceTier::High
        } else if c >= MEDIUM_CONFIDENCE {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "high",
            ConfidenceTier::Medium => "medium",
            ConfidenceTier::Low => "low",
        }
    }
}

/// Confidence as a whole percentage, rounded to the nearest integer and
/// clamped to `0..=100`.
pub fn confidence_percent(c: f64) -> u8 {
    if c.is_nan() {
        return 0;
    }
    (c.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Cut `description` to [`SUMMARY_CHARS`] characters, appending
/// [`ELLIPSIS`] only if something was removed. Counts `char`s, so a
/// multi-byte character is never split.
pub fn truncate_description(description: &str) -> Cow<'_, str> {
    match description.char_indices().nth(SUMMARY_CHARS) {
        Some((cut, _)) => Cow::Owned(format!("{}{}", &description[..cut], ELLIPSIS)),
        None => Cow::Borrowed(description),
    }
}

fn format_created(ticket: &Ticket) -> String {
    ticket.created_at.format("%Y-%m-%d %H:%M").to_string()
}

/// One row of the ticket list.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketSummaryView {
    pub id: i64,
    pub title: String,
    pub excerpt: String,
    pub status: String,
    pub priority: String,
    pub category: Option<String>,
    pub created_at: String,
}

impl TicketSummaryView {
    pub fn from_ticket(ticket: &Ticket) -> Self {
        Self {
            id: ticket.id,
            title: ticket.title.clone(),
            excerpt: truncate_description(&ticket.description).into_owned(),
            status: ticket.status.to_string(),
            priority: ticket.priority.to_string(),
            category: ticket.category.as_ref().map(|c| c.to_string()),
            created_at: format_created(ticket),
        }
    }
}

/// The ticket list section: either the placeholder or rows in server order.
#[derive(Debug, Clone, PartialEq)]
pub enum TicketListView {
    Empty,
    Rows(Vec<TicketSummaryView>),
}

impl TicketListView {
    pub fn from_tickets(tickets: &[Ticket]) -> Self {
        if tickets.is_empty() {
            TicketListView::Empty
        } else {
            TicketListView::Rows(tickets.iter().map(TicketSummaryView::from_ticket).collect())
        }
    }
}

/// Auto-categorization details, present only for auto-categorized tickets.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryConfidenceView {
    pub percent: u8,
    pub tier: ConfidenceTier,
    pub explanation: String,
}

impl CategoryConfidenceView {
    fn for_ticket(ticket: &Ticket) -> Option<Self> {
        if !ticket.auto_categorized {
            return None;
        }
        let confidence = ticket.category_confidence?;
        let percent = confidence_percent(confidence);
        Some(Self {
            percent,
            tier: ConfidenceTier::from_confidence(confidence),
            explanation: format!(
                "This ticket was automatically categorized by AI with {}% confidence.",
                percent
            ),
        })
    }
}

/// Full detail of the current ticket.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketDetailView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub category: Option<String>,
    pub created_at: String,
    pub auto_category: Option<CategoryConfidenceView>,
    /// Whether the "generate AI response" action is offered.
    pub can_generate: bool,
}

impl TicketDetailView {
    pub fn new(ticket: &Ticket, viewer: Option<&Role>) -> Self {
        Self {
            id: ticket.id,
            title: ticket.title.clone(),
            description: ticket.description.clone(),
            status: ticket.status.to_string(),
            priority: ticket.priority.to_string(),
            category: ticket.category.as_ref().map(|c| c.to_string()),
            created_at: format_created(ticket),
            auto_category: CategoryConfidenceView::for_ticket(ticket),
            can_generate: viewer.is_some_and(Role::can_generate_responses),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceView {
    pub label: &'static str,
    pub id: i64,
    pub title: String,
    pub similarity_percent: u8,
}

/// A drafted AI response ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct AiResponseView {
    pub text: String,
    pub percent: u8,
    pub tier: ConfidenceTier,
    pub should_escalate: bool,
    pub sources: Vec<SourceView>,
}

impl AiResponseView {
    pub fn from_response(response: &AiResponse) -> Self {
        Self {
            text: response.response.clone(),
            percent: confidence_percent(response.confidence),
            tier: ConfidenceTier::from_confidence(response.confidence),
            should_escalate: response.should_escalate,
            sources: response
                .sources
                .iter()
                .map(|s| SourceView {
                    label: match s.kind {
                        SourceKind::Ticket => "ticket",
                        SourceKind::Knowledge => "article",
                        SourceKind::Other(_) => "source",
                    },
                    id: s.id,
                    title: s.title.clone(),
                    similarity_percent: confidence_percent(s.similarity),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimilarTicketView {
    pub id: i64,
    pub title: String,
    pub excerpt: String,
    pub status: String,
    pub similarity_percent: u8,
}

impl SimilarTicketView {
    pub fn from_similar(similar: &SimilarTicket) -> Self {
        Self {
            id: similar.ticket_id,
            title: similar.title.clone(),
            excerpt: truncate_description(&similar.description).into_owned(),
            status: similar.status.to_string(),
            similarity_percent: confidence_percent(similar.similarity),
        }
    }
}
