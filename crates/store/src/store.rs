use crate::action::Action;
use crate::error::StoreError;
use crate::reducer::reduce;
use crate::state::{AppState, ModalKind, ModalPayload, OrderStats, Resource, Severity};
use crate::validation::{self, CashOperation, OrderTicket};
use api_client::{ApiClient, OrdersQuery};
use configuration::{ApiSettings, Config, InstrumentSettings};
use core_types::{
    CashTransaction, HealthStatus, Instrument, MarketDataPoint, Order, OrderRequest, OrderSide,
    OrderType, StatusFilter, format_currency,
};
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Result of the health probe.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiStatus {
    Online(HealthStatus),
    Offline(String),
}

impl ApiStatus {
    pub fn is_online(&self) -> bool {
        matches!(self, ApiStatus::Online(_))
    }
}

/// Per-fetch results of a session refresh. Either half may fail on its own.
#[derive(Debug)]
pub struct RefreshOutcome {
    pub portfolio: Result<(), StoreError>,
    pub orders: Result<(), StoreError>,
}

impl RefreshOutcome {
    pub fn is_ok(&self) -> bool {
        self.portfolio.is_ok() && self.orders.is_ok()
    }
}

#[derive(Debug, Clone, Copy)]
enum Flag {
    Global,
    Resource(Resource),
}

impl Flag {
    fn action(self, value: bool) -> Action {
        match self {
            Flag::Global => Action::SetGlobalLoading(value),
            Flag::Resource(resource) => Action::SetLoading(resource, value),
        }
    }
}

/// Raises a loading flag for its lifetime. Dropping it lowers the flag on
/// every exit path, including early returns through `?`.
///
/// The global flag is shared by overlapping fetches, so it is counted and
/// only lowered by the last guard to drop.
struct LoadingGuard<'a> {
    store: &'a Store,
    flag: Flag,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        match self.flag {
            Flag::Global => self.store.adjust_global(false),
            Flag::Resource(_) => self.store.dispatch(self.flag.action(false)),
        }
    }
}

struct Inner {
    api: Arc<dyn ApiClient>,
    state: watch::Sender<AppState>,
    global_in_flight: Mutex<usize>,
    api_settings: ApiSettings,
    instrument_settings: InstrumentSettings,
    auto_hide: Duration,
}

/// The application state container.
///
/// A cheap, cloneable handle. Every clone drives the same state, and every
/// mutation goes through [`Store::dispatch`], which applies the reducer as a
/// single transition. Readers take a [`Store::snapshot`] or
/// [`Store::subscribe`] to changes.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Inner>,
}

impl Store {
    pub fn new(api: Arc<dyn ApiClient>, config: &Config) -> Self {
        let (state, _) = watch::channel(AppState::new(config.session.default_user_id));
        Self {
            inner: Arc::new(Inner {
                api,
                state,
                global_in_flight: Mutex::new(0),
                api_settings: config.api.clone(),
                instrument_settings: config.instruments.clone(),
                auto_hide: Duration::from_millis(config.notifications.auto_hide_ms),
            }),
        }
    }

    // --- State access ---

    pub fn dispatch(&self, action: Action) {
        debug!(?action, "dispatch");
        self.inner.state.send_modify(|state| *state = reduce(state, action));
    }

    pub fn snapshot(&self) -> AppState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.inner.state.subscribe()
    }

    /// The selected account and the generation it was selected under.
    fn session(&self) -> (u64, u64) {
        let state = self.inner.state.borrow();
        (state.user_id, state.session_generation)
    }

    /// Applies `actions` as one transition, but only if no other account was
    /// selected since `generation` was read.
    fn commit(&self, generation: u64, actions: Vec<Action>) -> Result<(), StoreError> {
        let applied = self.inner.state.send_if_modified(|state| {
            if state.session_generation != generation {
                return false;
            }
            for action in actions {
                *state = reduce(state, action);
            }
            true
        });
        if applied {
            Ok(())
        } else {
            debug!(generation, "Discarding response for a previous session");
            Err(StoreError::Stale)
        }
    }

    fn loading(&self, flag: Flag) -> LoadingGuard<'_> {
        match flag {
            Flag::Global => self.adjust_global(true),
            Flag::Resource(_) => self.dispatch(flag.action(true)),
        }
        LoadingGuard { store: self, flag }
    }

    fn adjust_global(&self, raise: bool) {
        let mut in_flight = self
            .inner
            .global_in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let was_loading = *in_flight > 0;
        let next = if raise {
            *in_flight + 1
        } else {
            in_flight.saturating_sub(1)
        };
        *in_flight = next;
        if was_loading != (next > 0) {
            self.dispatch(Flag::Global.action(!was_loading));
        }
    }

    fn loading_resource(&self, resource: Resource) -> LoadingGuard<'_> {
        self.loading(Flag::Resource(resource))
    }

    // --- Session ---

    /// Switches the displayed account. The previous account's data is cleared
    /// at once; nothing is fetched until [`Store::refresh_session_data`].
    pub fn select_session(&self, user_id: u64) {
        info!(user_id, "Selecting session");
        self.dispatch(Action::SetSession(user_id));
    }

    /// Fetches the portfolio and the orders (under the active filter)
    /// concurrently.
    pub async fn refresh_session_data(&self) -> RefreshOutcome {
        let _global = self.loading(Flag::Global);
        let filter = self.inner.state.borrow().orders_filter;
        let (portfolio, orders) = tokio::join!(self.fetch_portfolio(), self.fetch_orders(filter));
        RefreshOutcome { portfolio, orders }
    }

    pub async fn fetch_portfolio(&self) -> Result<(), StoreError> {
        let (user_id, generation) = self.session();
        let _global = self.loading(Flag::Global);
        let _loading = self.loading_resource(Resource::Portfolio);

        match self.inner.api.get_portfolio(user_id).await {
            Ok(portfolio) => {
                info!(user_id, positions = portfolio.positions.len(), "Portfolio loaded");
                self.commit(generation, vec![Action::SetPortfolio(Some(portfolio))])
            }
            Err(e) => {
                warn!(user_id, error = %e, "Failed to fetch portfolio");
                let message = e.user_message();
                self.commit(
                    generation,
                    vec![
                        Action::SetError(message.clone()),
                        Action::SetPortfolio(None),
                        self.notice(format!("Failed to load portfolio: {message}"), Severity::Error),
                    ],
                )?;
                Err(e.into())
            }
        }
    }

    /// Fetches orders filtered server-side. An unfiltered fetch also
    /// recomputes the aggregate counts.
    pub async fn fetch_orders(&self, filter: StatusFilter) -> Result<(), StoreError> {
        let (user_id, generation) = self.session();
        let _global = self.loading(Flag::Global);
        let _loading = self.loading_resource(Resource::Orders);
        let query = OrdersQuery::new(filter, self.inner.api_settings.orders_limit);

        match self.inner.api.get_user_orders(user_id, query).await {
            Ok(orders) => {
                info!(user_id, %filter, count = orders.len(), "Orders loaded");
                let mut actions = Vec::with_capacity(2);
                if filter.is_all() {
                    actions.push(Action::SetOrderStats(OrderStats::from_orders(&orders)));
                }
                actions.push(Action::SetOrders(orders));
                self.commit(generation, actions)
            }
            Err(e) => {
                warn!(user_id, %filter, error = %e, "Failed to fetch orders");
                let message = e.user_message();
                self.commit(
                    generation,
                    vec![
                        Action::SetError(message.clone()),
                        Action::SetOrders(Vec::new()),
                        self.notice(format!("Failed to load orders: {message}"), Severity::Error),
                    ],
                )?;
                Err(e.into())
            }
        }
    }

    /// Changes the displayed subset of orders without disturbing the counts:
    /// a narrowed filter first refreshes the counts from an unfiltered
    /// listing, then loads the subset.
    pub async fn set_order_filter(&self, filter: StatusFilter) -> Result<(), StoreError> {
        self.dispatch(Action::SetOrdersFilter(filter));

        if !filter.is_all() {
            let (user_id, generation) = self.session();
            let all = {
                let _loading = self.loading_resource(Resource::Orders);
                let query = OrdersQuery::all(self.inner.api_settings.orders_limit);
                self.inner.api.get_user_orders(user_id, query).await
            };
            match all {
                Ok(orders) => {
                    let stats = OrderStats::from_orders(&orders);
                    self.commit(generation, vec![Action::SetOrderStats(stats)])?;
                }
                Err(e) => {
                    warn!(user_id, %filter, error = %e, "Failed to refresh order counts");
                    self.commit(
                        generation,
                        vec![self.notice("Failed to filter orders", Severity::Error)],
                    )?;
                    return Err(e.into());
                }
            }
        }

        self.fetch_orders(filter).await
    }

    // --- Orders ---

    /// Cancels an order, then reloads the portfolio and the orders. The list
    /// is never edited locally.
    ///
    /// The outcome of the write is returned even when another account was
    /// selected meanwhile; only the display update and reload are skipped.
    pub async fn cancel_order(&self, order_id: u64) -> Result<Order, StoreError> {
        let (user_id, generation) = self.session();
        self.show_notification("Cancelling order...", Severity::Info);
        let result = {
            let _loading = self.loading_resource(Resource::Orders);
            self.inner.api.cancel_order(order_id, user_id).await
        };

        match result {
            Ok(order) => {
                info!(user_id, order_id, "Order cancelled");
                let notice = self.notice("Order cancelled successfully", Severity::Success);
                if self.commit(generation, vec![notice]).is_ok() {
                    self.refresh_session_data().await;
                }
                Ok(order)
            }
            Err(e) => {
                warn!(user_id, order_id, error = %e, "Failed to cancel order");
                let notice = self.notice(
                    format!("Failed to cancel order: {}", e.user_message()),
                    Severity::Error,
                );
                let _ = self.commit(generation, vec![notice]);
                Err(e.into())
            }
        }
    }

    /// Validates the ticket against the current portfolio and submits it.
    pub async fn place_order(&self, ticket: OrderTicket) -> Result<Order, StoreError> {
        let (user_id, generation) = self.session();
        let portfolio = self.inner.state.borrow().portfolio.clone().unwrap_or_default();

        if let Err(message) = validation::validate_order(&ticket, &portfolio) {
            return Err(self.reject(message));
        }
        let Some(instrument) = ticket.instrument.as_ref() else {
            return Err(self.reject("Select an instrument".to_string()));
        };

        let request = OrderRequest {
            user_id,
            instrument_id: instrument.id,
            side: ticket.side,
            order_type: ticket.order_type,
            size: ticket.size.value(),
            price: match ticket.order_type {
                OrderType::Limit => ticket.limit_price,
                OrderType::Market => None,
            },
        };

        let result = {
            let _loading = self.loading_resource(Resource::Trading);
            self.inner.api.create_order(&request).await
        };
        match result {
            Ok(order) => {
                info!(user_id, order_id = order.id, ticker = %instrument.ticker, "Order created");
                let notice = self.notice(
                    format!("{} order for {} created", ticket.side, instrument.ticker),
                    Severity::Success,
                );
                if self.commit(generation, vec![notice]).is_ok() {
                    self.refresh_session_data().await;
                    self.close_modal(ModalKind::Trading);
                }
                Ok(order)
            }
            Err(e) => {
                warn!(user_id, ticker = %instrument.ticker, error = %e, "Failed to create order");
                let _ = self.commit(generation, vec![self.notice(e.user_message(), Severity::Error)]);
                Err(e.into())
            }
        }
    }

    /// Asks the simulator to fill a pending order now.
    pub async fn process_order(&self, order_id: u64) -> Result<Order, StoreError> {
        let generation = self.session().1;
        let result = {
            let _loading = self.loading_resource(Resource::Orders);
            self.inner.api.process_order(order_id).await
        };

        match result {
            Ok(order) => {
                info!(order_id, status = %order.status, "Order processed");
                let notice = self.notice(format!("Order {order_id} processed"), Severity::Success);
                if self.commit(generation, vec![notice]).is_ok() {
                    self.refresh_session_data().await;
                }
                Ok(order)
            }
            Err(e) => {
                warn!(order_id, error = %e, "Failed to process order");
                let _ = self.commit(generation, vec![self.notice(e.user_message(), Severity::Error)]);
                Err(e.into())
            }
        }
    }

    /// Orders still waiting to be filled, across all accounts.
    pub async fn pending_orders(&self, limit: Option<u32>) -> Result<Vec<Order>, StoreError> {
        let limit = limit.unwrap_or(self.inner.api_settings.pending_limit);
        self.inner.api.get_pending_orders(limit).await.map_err(|e| {
            warn!(limit, error = %e, "Failed to fetch pending orders");
            self.show_notification(e.user_message(), Severity::Error);
            StoreError::from(e)
        })
    }

    // --- Cash ---

    pub async fn deposit(&self, amount: Decimal) -> Result<CashTransaction, StoreError> {
        self.move_cash(CashOperation::Deposit, amount).await
    }

    pub async fn withdraw(&self, amount: Decimal) -> Result<CashTransaction, StoreError> {
        self.move_cash(CashOperation::Withdraw, amount).await
    }

    async fn move_cash(
        &self,
        operation: CashOperation,
        amount: Decimal,
    ) -> Result<CashTransaction, StoreError> {
        let (user_id, generation) = self.session();
        let available = self.inner.state.borrow().available_cash();
        if let Err(message) = validation::validate_cash(operation, amount, available) {
            return Err(self.reject(message));
        }

        let result = {
            let _loading = self.loading_resource(Resource::Cash);
            match operation {
                CashOperation::Deposit => self.inner.api.deposit(user_id, amount).await,
                CashOperation::Withdraw => self.inner.api.withdraw(user_id, amount).await,
            }
        };

        match result {
            Ok(transaction) => {
                info!(user_id, ?operation, %amount, "Cash movement completed");
                let notice = self.notice(
                    format!("{} of {} completed", operation.label(), format_currency(amount)),
                    Severity::Success,
                );
                // The money moved either way; a newer session only skips the reload.
                if self.commit(generation, vec![notice]).is_ok() {
                    self.refresh_session_data().await;
                    self.close_modal(operation.modal());
                }
                Ok(transaction)
            }
            Err(e) => {
                warn!(user_id, ?operation, %amount, error = %e, "Cash movement failed");
                let _ = self.commit(generation, vec![self.notice(e.user_message(), Severity::Error)]);
                Err(e.into())
            }
        }
    }

    /// Shortcut amounts for the cash modal, given the current balance.
    pub fn quick_amounts(&self, operation: CashOperation) -> Vec<Decimal> {
        let available = self.inner.state.borrow().available_cash();
        validation::quick_amounts(operation, available)
    }

    // --- Instruments ---

    /// Returns the instrument catalogue, fetching it only while the cache is
    /// empty.
    pub async fn fetch_instruments(&self) -> Result<Vec<Instrument>, StoreError> {
        let cached = self.inner.state.borrow().instruments.clone();
        if !cached.is_empty() {
            return Ok(cached);
        }

        let settings = &self.inner.instrument_settings;
        let _loading = self.loading_resource(Resource::Trading);
        match self
            .inner
            .api
            .search_instruments(&settings.search_query, settings.search_limit)
            .await
        {
            Ok(instruments) => {
                info!(count = instruments.len(), "Instrument catalogue loaded");
                self.dispatch(Action::SetInstruments(instruments.clone()));
                Ok(instruments)
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch instruments");
                self.show_notification("Failed to load instruments", Severity::Error);
                Err(e.into())
            }
        }
    }

    /// Instruments the trading form offers for `side`.
    pub fn tradable_instruments(&self, side: OrderSide) -> Vec<Instrument> {
        let state = self.inner.state.borrow();
        validation::tradable_instruments(side, &state.instruments, state.portfolio.as_ref())
            .into_iter()
            .cloned()
            .collect()
    }

    /// The most recent market-data row for an instrument.
    pub async fn quote(&self, instrument_id: u64) -> Result<MarketDataPoint, StoreError> {
        let kind = &self.inner.instrument_settings.market_data_type;
        let result = match self.inner.api.get_market_data(instrument_id, kind).await {
            Ok(points) => MarketDataPoint::latest(&points)
                .cloned()
                .ok_or(StoreError::NoMarketData(instrument_id)),
            Err(e) => Err(e.into()),
        };
        if let Err(e) = &result {
            warn!(instrument_id, error = %e, "Failed to load instrument price");
            self.show_notification("Failed to load instrument price", Severity::Warning);
        }
        result
    }

    // --- Health ---

    pub async fn check_api_status(&self) -> ApiStatus {
        match self.inner.api.health().await {
            Ok(health) => {
                info!(status = %health.status, "API is online");
                ApiStatus::Online(health)
            }
            Err(e) => {
                warn!(error = %e, "API is offline");
                ApiStatus::Offline(e.user_message())
            }
        }
    }

    // --- UI state ---

    pub fn show_notification(&self, message: impl Into<String>, severity: Severity) {
        let action = self.notice(message, severity);
        self.dispatch(action);
    }

    pub fn hide_notification(&self) {
        self.dispatch(Action::HideNotification);
    }

    pub fn toggle_modal(&self, modal: ModalKind, payload: ModalPayload) {
        self.dispatch(Action::ToggleModal { modal, payload });
    }

    pub fn close_modal(&self, modal: ModalKind) {
        self.dispatch(Action::CloseModal(modal));
    }

    pub fn clear_error(&self) {
        self.dispatch(Action::ClearError);
    }

    pub fn reset(&self) {
        self.dispatch(Action::ResetState);
    }

    /// Builds a notification and schedules its auto-dismiss. The dismiss is
    /// keyed by id, so it is harmless if the notification is never shown or
    /// has been replaced.
    fn notice(&self, message: impl Into<String>, severity: Severity) -> Action {
        let id = Uuid::new_v4();
        self.schedule_dismiss(id);
        Action::ShowNotification {
            id,
            message: message.into(),
            severity,
        }
    }

    fn schedule_dismiss(&self, id: Uuid) {
        let Ok(handle) = Handle::try_current() else {
            return;
        };
        let store = self.clone();
        let delay = self.inner.auto_hide;
        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            store.dispatch(Action::ExpireNotification(id));
        });
    }

    /// Reports a local validation failure. No request is sent.
    fn reject(&self, message: String) -> StoreError {
        debug!(%message, "Rejected before submission");
        self.show_notification(message.clone(), Severity::Error);
        StoreError::Validation(message)
    }
}
