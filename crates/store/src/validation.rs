//! Client-side checks that run before any request leaves the store.
//!
//! Each check returns the message shown to the user on failure. The backend
//! repeats these checks; running them here only saves a round trip and gives
//! a friendlier message.

use crate::state::ModalKind;
use core_types::{Instrument, OrderSide, OrderType, Portfolio, format_currency};
use rust_decimal::{Decimal, RoundingStrategy};

const PRESET_AMOUNTS: [u32; 4] = [10_000, 25_000, 50_000, 100_000];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CashOperation {
    Deposit,
    Withdraw,
}

impl CashOperation {
    pub fn modal(&self) -> ModalKind {
        match self {
            CashOperation::Deposit => ModalKind::Deposit,
            CashOperation::Withdraw => ModalKind::Withdraw,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CashOperation::Deposit => "Deposit",
            CashOperation::Withdraw => "Withdrawal",
        }
    }
}

pub fn validate_cash(
    operation: CashOperation,
    amount: Decimal,
    available: Decimal,
) -> Result<(), String> {
    if amount <= Decimal::ZERO {
        return Err("Enter a valid amount greater than 0".to_string());
    }
    if operation == CashOperation::Withdraw && amount > available {
        return Err(format!(
            "Insufficient funds. Available: {}",
            format_currency(available)
        ));
    }
    Ok(())
}

/// Shortcut amounts offered by the cash modal. Withdrawals only offer what
/// can actually be withdrawn, plus the available balance rounded down to the
/// nearest thousand.
pub fn quick_amounts(operation: CashOperation, available: Decimal) -> Vec<Decimal> {
    let presets = PRESET_AMOUNTS.iter().map(|a| Decimal::from(*a));
    match operation {
        CashOperation::Deposit => presets.collect(),
        CashOperation::Withdraw => {
            let mut amounts: Vec<Decimal> = presets.filter(|a| *a <= available).collect();
            if available > Decimal::ZERO && !amounts.contains(&available) {
                let thousand = Decimal::from(1000);
                let rounded = (available / thousand).floor() * thousand;
                if rounded > Decimal::ZERO && !amounts.contains(&rounded) {
                    amounts.push(rounded);
                }
            }
            amounts
        }
    }
}

/// How the user sized the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeInput {
    /// Number of units.
    Quantity(Decimal),
    /// Currency to spend; the backend converts it to whole units.
    Amount(Decimal),
}

impl SizeInput {
    /// The value sent as `size` in the order request.
    pub fn value(&self) -> Decimal {
        match self {
            SizeInput::Quantity(q) => *q,
            SizeInput::Amount(a) => *a,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Estimate {
    /// Notional value of the order.
    pub value: Decimal,
    /// Units the order is expected to trade.
    pub quantity: Decimal,
}

/// The contents of the trading form at submission time.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTicket {
    pub instrument: Option<Instrument>,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub size: SizeInput,
    pub limit_price: Option<Decimal>,
    /// Latest close for the instrument, once market data has loaded.
    pub market_price: Option<Decimal>,
}

impl OrderTicket {
    /// The price the estimate uses: the limit for LIMIT orders, the latest
    /// close otherwise.
    pub fn reference_price(&self) -> Option<Decimal> {
        match self.order_type {
            OrderType::Limit => self.limit_price,
            OrderType::Market => self.market_price,
        }
    }

    /// `None` when the size and price are too large to multiply or divide.
    pub fn estimate(&self) -> Option<Estimate> {
        let price = self.reference_price().unwrap_or_default();
        match self.size {
            SizeInput::Quantity(quantity) => Some(Estimate {
                value: quantity.checked_mul(price)?,
                quantity,
            }),
            SizeInput::Amount(amount) => {
                let quantity = if price > Decimal::ZERO {
                    amount
                        .checked_div(price)?
                        .round_dp_with_strategy(0, RoundingStrategy::ToZero)
                } else {
                    Decimal::ZERO
                };
                Some(Estimate {
                    value: amount,
                    quantity,
                })
            }
        }
    }
}

/// Runs every pre-submission check against the current portfolio and returns
/// the estimate the order was validated with.
pub fn validate_order(ticket: &OrderTicket, portfolio: &Portfolio) -> Result<Estimate, String> {
    let instrument = ticket
        .instrument
        .as_ref()
        .ok_or_else(|| "Select an instrument".to_string())?;

    if !ticket.side.is_trade() {
        return Err("Only BUY and SELL orders can be placed".to_string());
    }

    match ticket.order_type {
        OrderType::Market if ticket.market_price.is_none() => {
            return Err(format!(
                "The current price of {} is not available yet",
                instrument.ticker
            ));
        }
        OrderType::Limit if !ticket.limit_price.is_some_and(|p| p > Decimal::ZERO) => {
            return Err("Enter a valid price for the LIMIT order".to_string());
        }
        _ => {}
    }

    let estimate = ticket
        .estimate()
        .ok_or_else(|| "Order size is too large".to_string())?;
    match ticket.size {
        SizeInput::Quantity(q) if q <= Decimal::ZERO => {
            return Err("Enter a valid quantity".to_string());
        }
        SizeInput::Amount(a) if a <= Decimal::ZERO => {
            return Err("Enter a valid amount".to_string());
        }
        SizeInput::Amount(_) if estimate.quantity <= Decimal::ZERO => {
            return Err("The amount is not enough to buy at least one unit".to_string());
        }
        _ => {}
    }

    match ticket.side {
        OrderSide::Buy => {
            let available = portfolio.available_cash();
            if estimate.value > available {
                return Err(format!(
                    "Insufficient funds. Available: {}",
                    format_currency(available)
                ));
            }
        }
        OrderSide::Sell => {
            let position = portfolio
                .position_for(instrument.id)
                .ok_or_else(|| format!("You hold no position in {}", instrument.ticker))?;
            let available = position.quantity.available();
            if estimate.quantity > available {
                return Err(format!(
                    "Insufficient quantity. Available: {} units",
                    available.normalize()
                ));
            }
        }
        OrderSide::CashIn | OrderSide::CashOut => {}
    }

    Ok(estimate)
}

/// Instruments offered for a side: everything for buys, only instruments with
/// a position for sells.
pub fn tradable_instruments<'a>(
    side: OrderSide,
    instruments: &'a [Instrument],
    portfolio: Option<&Portfolio>,
) -> Vec<&'a Instrument> {
    match side {
        OrderSide::Sell => instruments
            .iter()
            .filter(|i| portfolio.is_some_and(|p| p.position_for(i.id).is_some()))
            .collect(),
        _ => instruments.iter().collect(),
    }
}
