//! Text rendering of view-models.
//!
//! The rules (truncation, tiers, visibility) are decided in
//! `support_desk_core::view`; this module only lays the results out for a
//! terminal. Every function returns a `String` so the CLI decides where it
//! goes.

use std::fmt::Write;

use support_desk_core::models::{SimilarTicket, SystemStats, User};
use support_desk_core::view::{
    AiResponseView, SimilarTicketView, TicketDetailView, TicketListView,
    EMPTY_TICKETS_PLACEHOLDER,
};

pub fn ticket_list(view: &TicketListView) -> String {
    let rows = match view {
        TicketListView::Empty => return format!("{}\n", EMPTY_TICKETS_PLACEHOLDER),
        TicketListView::Rows(rows) => rows,
    };

    let mut out = String::new();
    for row in rows {
        let _ = writeln!(out, "#{:<6} {}", row.id, row.title);
        let _ = writeln!(
            out,
            "        status: {:<12} priority: {:<9} category: {}",
            row.status,
            row.priority,
            row.category.as_deref().unwrap_or("-")
        );
        let _ = writeln!(out, "        created: {}", row.created_at);
        let _ = writeln!(out, "        {}", row.excerpt);
        out.push('\n');
    }
    out
}

pub fn ticket_detail(view: &TicketDetailView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "--- Ticket #{} ---", view.id);
    let _ = writeln!(out, "title:        {}", view.title);
    let _ = writeln!(out, "status:       {}", view.status);
    let _ = writeln!(out, "priority:     {}", view.priority);
    let _ = writeln!(
        out,
        "category:     {}",
        view.category.as_deref().unwrap_or("(uncategorized)")
    );
    let _ = writeln!(out, "created_at:   {}", view.created_at);
    if let Some(ref auto) = view.auto_category {
        let _ = writeln!(out, "confidence:   {}% ({})", auto.percent, auto.tier.as_str());
        let _ = writeln!(out, "              {}", auto.explanation);
    }
    out.push('\n');
    let _ = writeln!(out, "--- Description ---");
    let _ = writeln!(out, "{}", view.description);
    if view.can_generate {
        out.push('\n');
        let _ = writeln!(
            out,
            "Run `desk generate {}` to draft an AI response.",
            view.id
        );
    }
    out
}

pub fn ai_response(view: &AiResponseView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "--- AI Response ---");
    let _ = writeln!(out, "{}", view.text);
    out.push('\n');
    let _ = writeln!(
        out,
        "confidence:   {}% ({})",
        view.percent,
        view.tier.as_str()
    );
    let _ = writeln!(
        out,
        "escalate:     {}",
        if view.should_escalate { "yes" } else { "no" }
    );
    if !view.sources.is_empty() {
        let _ = writeln!(out, "sources:");
        for s in &view.sources {
            let _ = writeln!(
                out,
                "  [{} #{}] {} ({}% similar)",
                s.label, s.id, s.title, s.similarity_percent
            );
        }
    }
    out
}

pub fn similar_tickets(items: &[SimilarTicket]) -> String {
    if items.is_empty() {
        return "No similar tickets found.\n".to_string();
    }
    let mut out = String::new();
    for item in items.iter().map(SimilarTicketView::from_similar) {
        let _ = writeln!(
            out,
            "#{:<6} {:>3}%  [{}] {}",
            item.id, item.similarity_percent, item.status, item.title
        );
        let _ = writeln!(out, "              {}", item.excerpt);
    }
    out
}

pub fn stats(stats: &SystemStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<18} {}", "total tickets", stats.total_tickets);
    let _ = writeln!(out, "{:<18} {}", "open tickets", stats.open_tickets);
    let _ = writeln!(out, "{:<18} {}", "resolved tickets", stats.resolved_tickets);
    let _ = writeln!(out, "{:<18} {}", "users", stats.total_users);
    let _ = writeln!(out, "{:<18} {}", "knowledge items", stats.total_knowledge_items);
    out
}

/// One line per account, for the admin user listing.
pub fn users(users: &[User]) -> String {
    if users.is_empty() {
        return "No users found.\n".to_string();
    }
    let mut out = String::new();
    for user in users {
        let _ = writeln!(
            out,
            "#{:<6} {:<16} {:<10} {}{}",
            user.id,
            user.username,
            user.role,
            user.email.as_deref().unwrap_or("-"),
            if user.is_active { "" } else { "  (inactive)" }
        );
    }
    out
}

pub fn user(user: &User) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "username:     {}", user.username);
    let _ = writeln!(out, "role:         {}", user.role);
    if let Some(ref name) = user.full_name {
        let _ = writeln!(out, "full name:    {}", name);
    }
    if let Some(ref email) = user.email {
        let _ = writeln!(out, "email:        {}", email);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use support_desk_core::models::{AiResponse, Role, Ticket, TicketPriority, TicketStatus};

    fn ticket(auto: bool) -> Ticket {
        Ticket {
            id: 12,
            title: "Payment deducted twice".into(),
            description: "My card was charged twice for order 5531.".into(),
            status: TicketStatus::Open,
            priority: TicketPriority::High,
            category: None,
            predicted_category: None,
            category_confidence: Some(0.64),
            auto_categorized: auto,
            user_id: None,
            assigned_agent_id: None,
            tags: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 3, 8, 0, 0).unwrap(),
            updated_at: None,
            resolved_at: None,
        }
    }

    #[test]
    fn empty_list_renders_placeholder() {
        let out = ticket_list(&TicketListView::Empty);
        assert!(out.contains(EMPTY_TICKETS_PLACEHOLDER));
    }

    #[test]
    fn detail_hides_confidence_for_manual_category() {
        let out = ticket_detail(&TicketDetailView::new(&ticket(false), Some(&Role::Agent)));
        assert!(!out.contains("confidence"));
        assert!(out.contains("desk generate 12"));
    }

    #[test]
    fn detail_shows_confidence_for_auto_category() {
        let out = ticket_detail(&TicketDetailView::new(&ticket(true), Some(&Role::Requester)));
        assert!(out.contains("confidence:   64% (medium)"));
        assert!(!out.contains("desk generate"));
    }

    #[test]
    fn ai_response_shows_tier_and_escalation() {
        let view = AiResponseView::from_response(&AiResponse {
            response: "We have refunded the duplicate charge.".into(),
            confidence: 0.42,
            should_escalate: true,
            sources: Vec::new(),
            response_id: None,
        });
        let out = ai_response(&view);
        assert!(out.contains("42% (low)"));
        assert!(out.contains("escalate:     yes"));
        assert!(!out.contains("sources:"));
    }

    #[test]
    fn users_mark_inactive_accounts() {
        let accounts = vec![
            User {
                id: 1,
                username: "alice".into(),
                role: Role::Requester,
                email: Some("alice@example.com".into()),
                full_name: None,
                is_active: true,
            },
            User {
                id: 2,
                username: "bob".into(),
                role: Role::Agent,
                email: None,
                full_name: None,
                is_active: false,
            },
        ];
        let out = users(&accounts);
        assert_eq!(out.lines().count(), 2);
        assert!(out.contains("alice@example.com"));
        assert!(out.lines().nth(1).unwrap().ends_with("(inactive)"));
        assert_eq!(users(&[]), "No users found.\n");
    }
}
