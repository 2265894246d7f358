use crate::action::Action;
use crate::state::{AppState, ModalPayload, Notification};

/// Applies one action to a state and returns the next state. Pure: the input
/// is never mutated, so every transition is observed whole.
pub fn reduce(state: &AppState, action: Action) -> AppState {
    let mut next = state.clone();

    match action {
        Action::SetSession(user_id) => {
            next.user_id = user_id;
            next.session_generation = state.session_generation.wrapping_add(1);
            next.portfolio = None;
            next.orders = Vec::new();
        }
        Action::SetLoading(resource, value) => next.loading.set(resource, value),
        Action::SetGlobalLoading(value) => next.loading.global = value,
        Action::SetPortfolio(portfolio) => next.portfolio = portfolio,
        Action::SetOrders(orders) => next.orders = orders,
        Action::SetOrderStats(stats) => next.order_stats = stats,
        Action::SetInstruments(instruments) => next.instruments = instruments,
        Action::SetOrdersFilter(filter) => next.orders_filter = filter,
        Action::SetError(message) => next.error = Some(message),
        Action::ClearError => next.error = None,
        Action::ShowNotification {
            id,
            message,
            severity,
        } => {
            next.notification = Notification {
                id: Some(id),
                message,
                severity,
                open: true,
            };
        }
        Action::HideNotification => next.notification.open = false,
        Action::ExpireNotification(id) => {
            if next.notification.id == Some(id) {
                next.notification.open = false;
            }
        }
        Action::ToggleModal { modal, payload } => {
            let slot = next.modals.get_mut(modal);
            let opening = !slot.open;
            slot.open = opening;
            slot.payload = if opening { payload } else { ModalPayload::default() };
        }
        Action::CloseModal(modal) => {
            let slot = next.modals.get_mut(modal);
            slot.open = false;
            slot.payload = ModalPayload::default();
        }
        Action::ResetState => {
            next = AppState::new(state.user_id);
            next.session_generation = state.session_generation;
        }
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ModalKind, OrderStats, Resource, Severity};
    use core_types::{OrderSide, Portfolio, StatusFilter};
    use uuid::Uuid;

    fn loaded_state() -> AppState {
        let mut state = AppState::new(1);
        state.portfolio = Some(Portfolio::default());
        state.order_stats = OrderStats {
            total: 3,
            filled: 1,
            pending: 1,
            cancelled: 1,
            rejected: 0,
        };
        state
    }

    #[test]
    fn session_switch_clears_account_data_and_bumps_generation() {
        let state = loaded_state();
        let next = reduce(&state, Action::SetSession(2));

        assert_eq!(next.user_id, 2);
        assert_eq!(next.session_generation, state.session_generation + 1);
        assert!(next.portfolio.is_none());
        assert!(next.orders.is_empty());
        // Input is untouched.
        assert!(state.portfolio.is_some());
    }

    #[test]
    fn loading_flags_are_independent() {
        let state = AppState::new(1);
        let next = reduce(&state, Action::SetLoading(Resource::Orders, true));
        assert!(next.loading.orders);
        assert!(!next.loading.portfolio);
        assert!(!next.loading.global);

        let next = reduce(&next, Action::SetGlobalLoading(true));
        assert!(next.loading.global && next.loading.orders);
    }

    #[test]
    fn toggle_modal_stores_payload_on_open_and_discards_on_close() {
        let state = AppState::new(1);
        let payload = ModalPayload {
            side: Some(OrderSide::Sell),
            instrument_id: Some(7),
        };

        let opened = reduce(
            &state,
            Action::ToggleModal {
                modal: ModalKind::Trading,
                payload: payload.clone(),
            },
        );
        assert!(opened.modals.trading.open);
        assert_eq!(opened.modals.trading.payload, payload);
        assert!(!opened.modals.deposit.open);

        let closed = reduce(
            &opened,
            Action::ToggleModal {
                modal: ModalKind::Trading,
                payload: ModalPayload::default(),
            },
        );
        assert!(!closed.modals.trading.open);
        assert_eq!(closed.modals.trading.payload, ModalPayload::default());
    }

    #[test]
    fn expiry_only_closes_the_matching_notification() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let state = reduce(
            &AppState::new(1),
            Action::ShowNotification {
                id: first,
                message: "first".into(),
                severity: Severity::Info,
            },
        );
        let state = reduce(
            &state,
            Action::ShowNotification {
                id: second,
                message: "second".into(),
                severity: Severity::Error,
            },
        );

        let state = reduce(&state, Action::ExpireNotification(first));
        assert!(state.notification.open);
        assert_eq!(state.notification.message, "second");

        let state = reduce(&state, Action::ExpireNotification(second));
        assert!(!state.notification.open);
    }

    #[test]
    fn reset_keeps_session() {
        let mut state = reduce(&loaded_state(), Action::SetSession(5));
        state.orders_filter = StatusFilter::Filled;
        state.error = Some("boom".into());

        let next = reduce(&state, Action::ResetState);
        assert_eq!(next.user_id, 5);
        assert_eq!(next.session_generation, state.session_generation);
        assert_eq!(next.orders_filter, StatusFilter::All);
        assert!(next.error.is_none());
    }
}
