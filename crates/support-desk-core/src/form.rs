//! Ticket submission form state.
//!
//! The form is either hidden or visible with draft fields. A successful
//! submission clears and hides it; a failed one leaves the draft intact.

use crate::error::{DeskError, Result};
use crate::models::{NewTicket, TicketPriority};

/// Longest title the server accepts.
pub const MAX_TITLE_CHARS: usize = 500;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketForm {
    visible: bool,
    pub title: String,
    pub description: String,
    pub priority: TicketPriority,
    /// Empty means "let the server categorize".
    pub category: String,
    pub tags: Vec<String>,
}

impl TicketForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Open the form with every field filled in.
    pub fn fill(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
        priority: TicketPriority,
        category: Option<&str>,
    ) {
        self.visible = true;
        self.title = title.into();
        self.description = description.into();
        self.priority = priority;
        self.category = category.unwrap_or_default().to_string();
    }

    /// Validate the draft and build the creation request.
    pub fn to_request(&self) -> Result<NewTicket> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(DeskError::Validation("title must not be empty".into()));
        }
        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(DeskError::Validation(format!(
                "title must be at most {} characters",
                MAX_TITLE_CHARS
            )));
        }
        if self.description.trim().is_empty() {
            return Err(DeskError::Validation("description must not be empty".into()));
        }

        Ok(NewTicket::new(
            title,
            self.description.clone(),
            self.priority.clone(),
            Some(self.category.as_str()),
        )
        .with_tags(self.tags.clone()))
    }

    /// Reset every field and hide the form.
    pub fn clear_and_hide(&mut self) {
        *self = Self::default();
    }
}
