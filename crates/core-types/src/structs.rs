use crate::enums::{OrderSide, OrderStatus, OrderType};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// The backend speaks camelCase JSON and omits fields freely, so most structs
// default every field rather than failing on a partial payload.

/// Cash held by an account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CashBalance {
    /// Cash that can be spent or withdrawn right now.
    pub available: Decimal,
    /// Cash locked by open buy orders.
    pub reserved: Decimal,
    pub total: Decimal,
}

/// Units held in a position, split by whether open sell orders reserve them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PositionQuantity {
    pub total: Decimal,
    pub reserved: Decimal,
    pub available: Option<Decimal>,
}

impl PositionQuantity {
    /// Units that may be sold: the backend's `available` figure when present,
    /// otherwise everything that is not reserved.
    pub fn available(&self) -> Decimal {
        self.available
            .unwrap_or(self.total - self.reserved)
            .max(Decimal::ZERO)
    }
}

/// A single holding inside a portfolio snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Position {
    pub instrument_id: u64,
    pub ticker: String,
    pub name: String,
    pub quantity: PositionQuantity,
    pub current_price: Decimal,
    pub market_value: Decimal,
    pub total_return: Option<Decimal>,
    pub total_return_percent: Option<Decimal>,
}

/// The full account view returned by `GET /portfolio/{userId}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Portfolio {
    pub user_id: Option<u64>,
    pub total_value: Decimal,
    pub cash_balance: CashBalance,
    pub total_return: Decimal,
    pub total_return_percent: Decimal,
    pub positions: Vec<Position>,
}

impl Portfolio {
    pub fn available_cash(&self) -> Decimal {
        self.cash_balance.available
    }

    /// Finds the position held in the given instrument, if any.
    pub fn position_for(&self, instrument_id: u64) -> Option<&Position> {
        self.positions
            .iter()
            .find(|p| p.instrument_id == instrument_id)
    }
}

/// The instrument summary embedded in an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstrumentRef {
    pub id: Option<u64>,
    pub ticker: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: u64,
    #[serde(default)]
    pub instrument_id: Option<u64>,
    #[serde(default)]
    pub instrument: Option<InstrumentRef>,
    pub side: OrderSide,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    #[serde(default)]
    pub size: Decimal,
    #[serde(default)]
    pub price: Option<Decimal>,
    pub status: OrderStatus,
    /// Raw timestamp as sent by the backend; see [`Order::timestamp`].
    #[serde(default)]
    pub datetime: Option<String>,
}

impl Order {
    pub fn ticker(&self) -> Option<&str> {
        self.instrument.as_ref().map(|i| i.ticker.as_str())
    }

    /// Parses the order timestamp. Accepts RFC 3339 and naive
    /// `YYYY-MM-DDTHH:MM:SS` forms (read as UTC).
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.datetime.as_deref().and_then(parse_timestamp)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub id: u64,
    pub ticker: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// One row of `GET /instruments/{id}/market-data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketDataPoint {
    pub date: String,
    #[serde(default)]
    pub open: Option<Decimal>,
    #[serde(default)]
    pub high: Option<Decimal>,
    #[serde(default)]
    pub low: Option<Decimal>,
    pub close: Decimal,
    #[serde(default)]
    pub previous_close: Option<Decimal>,
}

impl MarketDataPoint {
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.date)
    }

    /// Picks the most recent row by date. Rows with unparseable dates sort
    /// before everything else.
    pub fn latest(points: &[MarketDataPoint]) -> Option<&MarketDataPoint> {
        points.iter().max_by_key(|p| p.timestamp())
    }

    /// The price the client trades against: the row's close.
    pub fn current_price(&self) -> Decimal {
        self.close
    }
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub user_id: u64,
    pub instrument_id: u64,
    pub side: OrderSide,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    /// Units when sizing by quantity, currency when sizing by amount; the
    /// backend works out the units in the second case.
    #[serde(with = "rust_decimal::serde::float")]
    pub size: Decimal,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<Decimal>,
}

/// Body of `POST /cash/deposit` and `POST /cash/withdraw`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashRequest {
    pub user_id: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// Result of a deposit or withdrawal. The backend records cash movements as
/// orders, so only the fields shared with [`Order`] are read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CashTransaction {
    pub id: Option<u64>,
    pub side: Option<OrderSide>,
    pub size: Option<Decimal>,
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: Option<String>,
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
