//! # Support Desk
//!
//! A terminal client for a RAG-assisted customer support ticketing service.
//!
//! Requesters file tickets (optionally letting the server categorize them);
//! agents and admins open tickets and ask the server to draft a response
//! from the knowledge base, complete with a confidence score and an
//! escalation recommendation.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────────────┐   ┌────────────┐
//! │  CLI (desk)  │──▶│ Desk                     │──▶│ ApiClient  │──▶ HTTP API
//! └──────────────┘   │  SessionManager          │   └────────────┘
//!                    │  TicketList / Submission │   ┌────────────┐
//!                    │  TicketDetail            │──▶│ TokenStore │
//!                    │  ResponseController      │   └────────────┘
//!                    └────────────┬─────────────┘
//!                                 ▼
//!                            Notifier (stderr / JSON / off)
//! ```
//!
//! Pure state (models, session, form, view-models, the stale-response
//! guard) lives in the `support-desk-core` crate and is re-exported here.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`api`] | HTTP gateway and error normalization |
//! | [`config`] | TOML configuration parsing |
//! | [`desk`] | The whole client, wiring controllers together |
//! | [`detail`] | Current ticket and its drafted response |
//! | [`notify`] | Notification sinks |
//! | [`render`] | Terminal rendering of view-models |
//! | [`respond`] | AI response generation |
//! | [`session`] | Login, registration, restore, logout |
//! | [`store`] | Token persistence |
//! | [`tickets`] | Ticket list and submission |

pub mod api;
pub mod config;
pub mod desk;
pub mod detail;
pub mod notify;
pub mod render;
pub mod respond;
pub mod session;
pub mod store;
pub mod tickets;

pub use support_desk_core::{
    AiResponse, DeskError, Result, Role, Screen, Session, Ticket, TicketCategory,
    TicketPriority, TicketStatus, User,
};
