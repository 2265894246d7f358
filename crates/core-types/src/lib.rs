//! # Tradedesk Core Types
//!
//! The domain model shared by every other crate: portfolio snapshots, orders,
//! instruments and market data as the trading backend reports them, plus the
//! request bodies the client sends back. Layer 0; no workspace dependencies.

pub mod enums;
pub mod error;
pub mod format;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{OrderSide, OrderStatus, OrderType, StatusFilter};
pub use error::CoreError;
pub use format::{format_currency, format_percentage};
pub use structs::{
    CashBalance, CashRequest, CashTransaction, HealthStatus, Instrument, InstrumentRef,
    MarketDataPoint, Order, OrderRequest, Portfolio, Position, PositionQuantity,
};
