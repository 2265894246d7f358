//! # Tradedesk Store
//!
//! The application state container. State changes only through [`Action`]s
//! applied by the pure [`reduce`] function; the [`Store`] handle wraps that in
//! workflows that call the backend through an [`api_client::ApiClient`] and
//! commit what comes back.

pub mod action;
pub mod error;
pub mod reducer;
pub mod state;
pub mod store;
pub mod validation;

// Re-export the core types to provide a clean public API.
pub use action::Action;
pub use error::StoreError;
pub use reducer::reduce;
pub use state::{
    AppState, LoadingFlags, ModalKind, ModalPayload, ModalState, Modals, Notification,
    OrderStats, Resource, Severity,
};
pub use store::{ApiStatus, RefreshOutcome, Store};
pub use validation::{CashOperation, Estimate, OrderTicket, SizeInput};
