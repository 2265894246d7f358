use core_types::{Instrument, Order, OrderSide, OrderStatus, Portfolio, StatusFilter};
use uuid::Uuid;

/// Resource classes that carry their own loading flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Portfolio,
    Orders,
    Cash,
    Trading,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadingFlags {
    pub global: bool,
    pub portfolio: bool,
    pub orders: bool,
    pub cash: bool,
    pub trading: bool,
}

impl LoadingFlags {
    pub fn get(&self, resource: Resource) -> bool {
        match resource {
            Resource::Portfolio => self.portfolio,
            Resource::Orders => self.orders,
            Resource::Cash => self.cash,
            Resource::Trading => self.trading,
        }
    }

    pub(crate) fn set(&mut self, resource: Resource, value: bool) {
        match resource {
            Resource::Portfolio => self.portfolio = value,
            Resource::Orders => self.orders = value,
            Resource::Cash => self.cash = value,
            Resource::Trading => self.trading = value,
        }
    }

    pub fn any(&self) -> bool {
        self.global || self.portfolio || self.orders || self.cash || self.trading
    }
}

/// Order counts per status, always computed from an unfiltered listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderStats {
    pub total: usize,
    pub filled: usize,
    /// Orders still `NEW`.
    pub pending: usize,
    pub cancelled: usize,
    pub rejected: usize,
}

impl OrderStats {
    pub fn from_orders(orders: &[Order]) -> Self {
        let count = |status: OrderStatus| orders.iter().filter(|o| o.status == status).count();
        Self {
            total: orders.len(),
            filled: count(OrderStatus::Filled),
            pending: count(OrderStatus::New),
            cancelled: count(OrderStatus::Cancelled),
            rejected: count(OrderStatus::Rejected),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Warning,
    #[default]
    Info,
}

/// The single transient message shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notification {
    /// Identifies the showing so a late auto-dismiss cannot close a newer message.
    pub id: Option<Uuid>,
    pub message: String,
    pub severity: Severity,
    pub open: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalKind {
    Deposit,
    Withdraw,
    Trading,
}

/// Data handed to a modal when it opens, e.g. the side preselected by a
/// "Sell" button on a position row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalPayload {
    pub side: Option<OrderSide>,
    pub instrument_id: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalState {
    pub open: bool,
    pub payload: ModalPayload,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modals {
    pub deposit: ModalState,
    pub withdraw: ModalState,
    pub trading: ModalState,
}

impl Modals {
    pub fn get(&self, kind: ModalKind) -> &ModalState {
        match kind {
            ModalKind::Deposit => &self.deposit,
            ModalKind::Withdraw => &self.withdraw,
            ModalKind::Trading => &self.trading,
        }
    }

    pub(crate) fn get_mut(&mut self, kind: ModalKind) -> &mut ModalState {
        match kind {
            ModalKind::Deposit => &mut self.deposit,
            ModalKind::Withdraw => &mut self.withdraw,
            ModalKind::Trading => &mut self.trading,
        }
    }
}

/// Everything the presentation layer renders. Only the reducer produces new
/// values of this type.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    /// The account currently displayed.
    pub user_id: u64,
    /// Bumped on every session selection; results fetched under an older
    /// generation are discarded.
    pub session_generation: u64,
    pub loading: LoadingFlags,
    pub portfolio: Option<Portfolio>,
    pub orders: Vec<Order>,
    pub order_stats: OrderStats,
    /// Instrument catalogue, fetched once and kept across session switches.
    pub instruments: Vec<Instrument>,
    pub orders_filter: StatusFilter,
    pub error: Option<String>,
    pub notification: Notification,
    pub modals: Modals,
}

impl AppState {
    pub fn new(user_id: u64) -> Self {
        Self {
            user_id,
            session_generation: 0,
            loading: LoadingFlags::default(),
            portfolio: None,
            orders: Vec::new(),
            order_stats: OrderStats::default(),
            instruments: Vec::new(),
            orders_filter: StatusFilter::All,
            error: None,
            notification: Notification::default(),
            modals: Modals::default(),
        }
    }

    pub fn available_cash(&self) -> rust_decimal::Decimal {
        self.portfolio
            .as_ref()
            .map(Portfolio::available_cash)
            .unwrap_or_default()
    }
}
