//! In-memory backend shared by the store scenarios.
//!
//! Answers every `ApiClient` call from canned data, records each call the way
//! the HTTP client would issue it, and can be told to fail an operation or to
//! hold a portfolio response or a write until the test releases it.

#![allow(dead_code)]

use api_client::error::ApiError;
use api_client::{ApiClient, OrdersQuery};
use async_trait::async_trait;
use configuration::Config;
use core_types::{
    CashBalance, CashTransaction, HealthStatus, Instrument, InstrumentRef, MarketDataPoint,
    Order, OrderRequest, OrderSide, OrderStatus, OrderType, Portfolio, Position,
    PositionQuantity,
};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use store::Store;
use tokio::sync::Notify;

#[derive(Default)]
struct Data {
    portfolios: HashMap<u64, Portfolio>,
    orders: HashMap<u64, Vec<Order>>,
    instruments: Vec<Instrument>,
    market_data: HashMap<u64, Vec<MarketDataPoint>>,
    failing: HashSet<&'static str>,
    next_order_id: u64,
}

#[derive(Default)]
pub struct FakeBackend {
    data: Mutex<Data>,
    calls: Mutex<Vec<String>>,
    gates: Mutex<HashMap<u64, Arc<Notify>>>,
    held: Mutex<HashMap<&'static str, Arc<Notify>>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_portfolio(&self, user_id: u64, portfolio: Portfolio) -> &Self {
        self.data.lock().unwrap().portfolios.insert(user_id, portfolio);
        self
    }

    pub fn with_orders(&self, user_id: u64, orders: Vec<Order>) -> &Self {
        self.data.lock().unwrap().orders.insert(user_id, orders);
        self
    }

    pub fn with_instruments(&self, instruments: Vec<Instrument>) -> &Self {
        self.data.lock().unwrap().instruments = instruments;
        self
    }

    pub fn with_market_data(&self, instrument_id: u64, points: Vec<MarketDataPoint>) -> &Self {
        self.data.lock().unwrap().market_data.insert(instrument_id, points);
        self
    }

    /// Makes every call of `operation` fail with a 500 until [`Self::recover`].
    pub fn fail(&self, operation: &'static str) -> &Self {
        self.data.lock().unwrap().failing.insert(operation);
        self
    }

    pub fn recover(&self, operation: &'static str) -> &Self {
        self.data.lock().unwrap().failing.remove(operation);
        self
    }

    /// Holds `get_portfolio` for `user_id` until the returned handle is notified.
    pub fn hold_portfolio(&self, user_id: u64) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(user_id, Arc::clone(&gate));
        gate
    }

    /// Holds the next call of `operation` until the returned handle is notified.
    pub fn hold(&self, operation: &'static str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.held.lock().unwrap().insert(operation, Arc::clone(&gate));
        gate
    }

    async fn pass(&self, operation: &'static str) {
        let gate = self.held.lock().unwrap().remove(operation);
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, operation: &'static str, call: String) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        if self.data.lock().unwrap().failing.contains(operation) {
            return Err(ApiError::backend(Some(500), format!("{operation} unavailable")));
        }
        Ok(())
    }

    fn adjust_cash(&self, user_id: u64, delta: Decimal) {
        let mut data = self.data.lock().unwrap();
        let portfolio = data.portfolios.entry(user_id).or_default();
        portfolio.cash_balance.available += delta;
        portfolio.cash_balance.total += delta;
    }
}

#[async_trait]
impl ApiClient for FakeBackend {
    async fn get_portfolio(&self, user_id: u64) -> Result<Portfolio, ApiError> {
        let gate = self.gates.lock().unwrap().remove(&user_id);
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.record("portfolio", format!("GET /portfolio/{user_id}"))?;
        self.data
            .lock()
            .unwrap()
            .portfolios
            .get(&user_id)
            .cloned()
            .ok_or_else(|| ApiError::backend(Some(404), "User not found"))
    }

    async fn deposit(&self, user_id: u64, amount: Decimal) -> Result<CashTransaction, ApiError> {
        self.pass("deposit").await;
        self.record("deposit", format!("POST /cash/deposit {user_id} {amount}"))?;
        self.adjust_cash(user_id, amount);
        Ok(CashTransaction {
            side: Some(OrderSide::CashIn),
            size: Some(amount),
            status: Some(OrderStatus::Filled),
            ..CashTransaction::default()
        })
    }

    async fn withdraw(&self, user_id: u64, amount: Decimal) -> Result<CashTransaction, ApiError> {
        self.record("withdraw", format!("POST /cash/withdraw {user_id} {amount}"))?;
        self.adjust_cash(user_id, -amount);
        Ok(CashTransaction {
            side: Some(OrderSide::CashOut),
            size: Some(amount),
            status: Some(OrderStatus::Filled),
            ..CashTransaction::default()
        })
    }

    async fn get_cash_balance(&self, user_id: u64) -> Result<CashBalance, ApiError> {
        self.record("balance", format!("GET /cash/balance/{user_id}"))?;
        let data = self.data.lock().unwrap();
        Ok(data
            .portfolios
            .get(&user_id)
            .map(|p| p.cash_balance.clone())
            .unwrap_or_default())
    }

    async fn search_instruments(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Instrument>, ApiError> {
        self.record(
            "instruments",
            format!("GET /instruments/search?q={query}&limit={limit}"),
        )?;
        Ok(self.data.lock().unwrap().instruments.clone())
    }

    async fn get_instrument(&self, instrument_id: u64) -> Result<Instrument, ApiError> {
        self.record("instrument", format!("GET /instruments/{instrument_id}"))?;
        self.data
            .lock()
            .unwrap()
            .instruments
            .iter()
            .find(|i| i.id == instrument_id)
            .cloned()
            .ok_or_else(|| ApiError::backend(Some(404), "Instrument not found"))
    }

    async fn get_market_data(
        &self,
        instrument_id: u64,
        kind: &str,
    ) -> Result<Vec<MarketDataPoint>, ApiError> {
        self.record(
            "market_data",
            format!("GET /instruments/{instrument_id}/market-data?type={kind}"),
        )?;
        Ok(self
            .data
            .lock()
            .unwrap()
            .market_data
            .get(&instrument_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_order(&self, request: &OrderRequest) -> Result<Order, ApiError> {
        self.record(
            "create_order",
            format!(
                "POST /orders {} {} {} {}",
                request.user_id, request.instrument_id, request.side, request.size
            ),
        )?;
        let mut data = self.data.lock().unwrap();
        data.next_order_id += 1;
        let order = Order {
            id: 1000 + data.next_order_id,
            instrument_id: Some(request.instrument_id),
            instrument: None,
            side: request.side,
            order_type: request.order_type,
            size: request.size,
            price: request.price,
            status: OrderStatus::New,
            datetime: None,
        };
        data.orders
            .entry(request.user_id)
            .or_default()
            .push(order.clone());
        Ok(order)
    }

    async fn get_user_orders(
        &self,
        user_id: u64,
        query: OrdersQuery,
    ) -> Result<Vec<Order>, ApiError> {
        let call = match query.status.as_query() {
            Some(status) => format!("GET /orders/user/{user_id}?status={status}&limit={}", query.limit),
            None => format!("GET /orders/user/{user_id}?limit={}", query.limit),
        };
        self.record("orders", call)?;
        let wanted = query.status.as_query();
        Ok(self
            .data
            .lock()
            .unwrap()
            .orders
            .get(&user_id)
            .into_iter()
            .flatten()
            .filter(|o| wanted.is_none_or(|s| o.status.to_string() == s))
            .take(query.limit as usize)
            .cloned()
            .collect())
    }

    async fn get_order(&self, order_id: u64) -> Result<Order, ApiError> {
        self.record("order", format!("GET /orders/{order_id}"))?;
        self.data
            .lock()
            .unwrap()
            .orders
            .values()
            .flatten()
            .find(|o| o.id == order_id)
            .cloned()
            .ok_or_else(|| ApiError::backend(Some(404), "Order not found"))
    }

    async fn cancel_order(&self, order_id: u64, user_id: u64) -> Result<Order, ApiError> {
        self.pass("cancel").await;
        self.record("cancel", format!("PUT /orders/{order_id}/cancel {user_id}"))?;
        let mut data = self.data.lock().unwrap();
        let order = data
            .orders
            .get_mut(&user_id)
            .and_then(|orders| orders.iter_mut().find(|o| o.id == order_id))
            .ok_or_else(|| ApiError::backend(Some(404), "Order not found"))?;
        if order.status != OrderStatus::New {
            return Err(ApiError::backend(
                Some(400),
                "Only NEW orders can be cancelled",
            ));
        }
        order.status = OrderStatus::Cancelled;
        Ok(order.clone())
    }

    async fn process_order(&self, order_id: u64) -> Result<Order, ApiError> {
        self.record("process", format!("POST /order-processing/process/{order_id}"))?;
        let mut data = self.data.lock().unwrap();
        let order = data
            .orders
            .values_mut()
            .flatten()
            .find(|o| o.id == order_id)
            .ok_or_else(|| ApiError::backend(Some(404), "Order not found"))?;
        order.status = OrderStatus::Filled;
        Ok(order.clone())
    }

    async fn get_pending_orders(&self, limit: u32) -> Result<Vec<Order>, ApiError> {
        self.record("pending", format!("GET /order-processing/pending?limit={limit}"))?;
        Ok(self
            .data
            .lock()
            .unwrap()
            .orders
            .values()
            .flatten()
            .filter(|o| o.status == OrderStatus::New)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.record("health", "GET /health".to_string())?;
        Ok(HealthStatus {
            status: "OK".to_string(),
            timestamp: None,
        })
    }
}

// --- Fixtures ---

pub fn config() -> Config {
    let mut config = Config::default();
    config.notifications.auto_hide_ms = 50;
    config
}

pub fn store_for(backend: &Arc<FakeBackend>) -> Store {
    let api: Arc<dyn ApiClient> = backend.clone();
    Store::new(api, &config())
}

pub fn instrument(id: u64, ticker: &str) -> Instrument {
    Instrument {
        id,
        ticker: ticker.to_string(),
        name: format!("{ticker} S.A."),
        kind: Some("ACCIONES".to_string()),
    }
}

pub fn order(id: u64, status: OrderStatus) -> Order {
    Order {
        id,
        instrument_id: Some(7),
        instrument: Some(InstrumentRef {
            id: Some(7),
            ticker: "GGAL".to_string(),
            name: "Grupo Galicia".to_string(),
        }),
        side: OrderSide::Buy,
        order_type: OrderType::Limit,
        size: Decimal::from(10),
        price: Some(Decimal::from(100)),
        status,
        datetime: Some("2024-06-10T14:30:00".to_string()),
    }
}

/// Seven orders: three filled, two new, one cancelled, one rejected.
pub fn mixed_orders() -> Vec<Order> {
    use OrderStatus::*;
    [Filled, New, Filled, Cancelled, New, Rejected, Filled]
        .into_iter()
        .enumerate()
        .map(|(i, status)| order(i as u64 + 1, status))
        .collect()
}

pub fn portfolio(cash: Decimal, positions: Vec<Position>) -> Portfolio {
    Portfolio {
        cash_balance: CashBalance {
            available: cash,
            reserved: Decimal::ZERO,
            total: cash,
        },
        total_value: cash,
        positions,
        ..Portfolio::default()
    }
}

pub fn position(instrument_id: u64, ticker: &str, total: Decimal, reserved: Decimal) -> Position {
    Position {
        instrument_id,
        ticker: ticker.to_string(),
        name: format!("{ticker} S.A."),
        quantity: PositionQuantity {
            total,
            reserved,
            available: None,
        },
        ..Position::default()
    }
}
