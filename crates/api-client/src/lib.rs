use crate::error::ApiError;
use async_trait::async_trait;
use core_types::{
    CashBalance, CashTransaction, HealthStatus, Instrument, MarketDataPoint, Order, OrderRequest,
    Portfolio, StatusFilter,
};
use rust_decimal::Decimal;

pub mod client;
pub mod error;
pub mod responses;
// --- Public API ---
pub use client::HttpApiClient;
pub use error::FALLBACK_MESSAGE;
pub use responses::{ApiErrorResponse, OrdersPayload};

/// Filters for `GET /orders/user/{userId}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrdersQuery {
    pub status: StatusFilter,
    pub limit: u32,
}

impl OrdersQuery {
    pub fn new(status: StatusFilter, limit: u32) -> Self {
        Self { status, limit }
    }

    /// An unfiltered listing capped at `limit`.
    pub fn all(limit: u32) -> Self {
        Self::new(StatusFilter::All, limit)
    }
}

/// The generic, abstract interface for the trading backend.
/// This trait is the contract the application store uses, allowing the
/// underlying implementation (HTTP or in-memory) to be swapped out.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Fetches the full portfolio snapshot for a user.
    async fn get_portfolio(&self, user_id: u64) -> Result<Portfolio, ApiError>;

    async fn deposit(&self, user_id: u64, amount: Decimal) -> Result<CashTransaction, ApiError>;

    async fn withdraw(&self, user_id: u64, amount: Decimal) -> Result<CashTransaction, ApiError>;

    async fn get_cash_balance(&self, user_id: u64) -> Result<CashBalance, ApiError>;

    async fn search_instruments(&self, query: &str, limit: u32)
    -> Result<Vec<Instrument>, ApiError>;

    async fn get_instrument(&self, instrument_id: u64) -> Result<Instrument, ApiError>;

    /// Price history for an instrument; callers pick the most recent row.
    async fn get_market_data(
        &self,
        instrument_id: u64,
        kind: &str,
    ) -> Result<Vec<MarketDataPoint>, ApiError>;

    async fn create_order(&self, order: &OrderRequest) -> Result<Order, ApiError>;

    /// Lists a user's orders, filtered server-side.
    async fn get_user_orders(&self, user_id: u64, query: OrdersQuery)
    -> Result<Vec<Order>, ApiError>;

    async fn get_order(&self, order_id: u64) -> Result<Order, ApiError>;

    async fn cancel_order(&self, order_id: u64, user_id: u64) -> Result<Order, ApiError>;

    /// Asks the simulator to fill a pending LIMIT order now.
    async fn process_order(&self, order_id: u64) -> Result<Order, ApiError>;

    async fn get_pending_orders(&self, limit: u32) -> Result<Vec<Order>, ApiError>;

    async fn health(&self) -> Result<HealthStatus, ApiError>;
}
