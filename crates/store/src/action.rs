use crate::state::{ModalKind, ModalPayload, OrderStats, Resource, Severity};
use core_types::{Instrument, Order, Portfolio, StatusFilter};
use uuid::Uuid;

/// The closed set of state transitions. Workflows never touch `AppState`
/// directly; they dispatch one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Switch accounts. Clears the previous account's portfolio and orders.
    SetSession(u64),
    SetLoading(Resource, bool),
    SetGlobalLoading(bool),
    SetPortfolio(Option<Portfolio>),
    SetOrders(Vec<Order>),
    SetOrderStats(OrderStats),
    SetInstruments(Vec<Instrument>),
    SetOrdersFilter(StatusFilter),
    SetError(String),
    ClearError,
    ShowNotification {
        id: Uuid,
        message: String,
        severity: Severity,
    },
    HideNotification,
    /// Closes the notification only if it is still the one identified by `id`.
    ExpireNotification(Uuid),
    /// Opens a closed modal with `payload`, or closes an open one.
    ToggleModal {
        modal: ModalKind,
        payload: ModalPayload,
    },
    CloseModal(ModalKind),
    /// Back to the initial state, keeping the selected account.
    ResetState,
}
