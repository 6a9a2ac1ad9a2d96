//! # Support Desk Core
//!
//! Shared, I/O-free logic for Support Desk: the ticket and user data model,
//! the session/screen state machine, the ticket submission form, the AI
//! generation request guard, and every ticket → view-model transform.
//!
//! This crate contains no tokio, reqwest, filesystem I/O, or other
//! native-only dependencies. Everything here is a plain value or a pure
//! function, so rendering rules can be tested without a network or a UI.

pub mod error;
pub mod form;
pub mod generation;
pub mod models;
pub mod notification;
pub mod session;
pub mod view;

pub use error::{DeskError, Result};
pub use models::{AiResponse, Role, Ticket, TicketCategory, TicketPriority, TicketStatus, User};
pub use session::{Screen, Session};
