use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The side of an order as reported by the backend. Cash movements are
/// recorded as orders too, so the list view sees all four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSide {
    Buy,
    Sell,
    CashIn,
    CashOut,
}

impl OrderSide {
    /// Returns `true` for sides that trade an instrument rather than move cash.
    pub fn is_trade(&self) -> bool {
        matches!(self, OrderSide::Buy | OrderSide::Sell)
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
            OrderSide::CashIn => "CASH_IN",
            OrderSide::CashOut => "CASH_OUT",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Market,
    Limit,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Market => f.write_str("MARKET"),
            OrderType::Limit => f.write_str("LIMIT"),
        }
    }
}

/// Lifecycle status of an order. Statuses the client does not know about are
/// kept as `Unknown` instead of failing the whole list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    New,
    Filled,
    Cancelled,
    Rejected,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::New => "NEW",
            OrderStatus::Filled => "FILLED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Rejected => "REJECTED",
            OrderStatus::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// The server-side predicate used when listing orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusFilter {
    #[default]
    All,
    New,
    Filled,
    Cancelled,
    Rejected,
}

impl StatusFilter {
    /// The `status` query value for this filter. `All` sends no status at all.
    pub fn as_query(&self) -> Option<&'static str> {
        match self {
            StatusFilter::All => None,
            StatusFilter::New => Some("NEW"),
            StatusFilter::Filled => Some("FILLED"),
            StatusFilter::Cancelled => Some("CANCELLED"),
            StatusFilter::Rejected => Some("REJECTED"),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, StatusFilter::All)
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query().unwrap_or("ALL"))
    }
}

impl FromStr for StatusFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ALL" => Ok(StatusFilter::All),
            "NEW" | "PENDING" => Ok(StatusFilter::New),
            "FILLED" => Ok(StatusFilter::Filled),
            "CANCELLED" | "CANCELED" => Ok(StatusFilter::Cancelled),
            "REJECTED" => Ok(StatusFilter::Rejected),
            other => Err(CoreError::InvalidInput(
                "status filter".to_string(),
                other.to_string(),
            )),
        }
    }
}
