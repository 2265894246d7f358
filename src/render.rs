//! Terminal rendering of store snapshots.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use core_types::{
    HealthStatus, Instrument, MarketDataPoint, Order, OrderStatus, Portfolio, format_currency,
    format_percentage,
};
use rust_decimal::Decimal;
use store::{ApiStatus, AppState, Notification, OrderStats, Severity};

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}

fn signed_cell(text: String, value: Decimal) -> Cell {
    let color = if value.is_sign_negative() && !value.is_zero() {
        Color::Red
    } else {
        Color::Green
    };
    Cell::new(text).fg(color)
}

pub fn print_portfolio(user_id: u64, portfolio: Option<&Portfolio>) {
    let Some(portfolio) = portfolio else {
        println!("No portfolio available for user {user_id}.");
        return;
    };

    let mut summary = table(&["Total value", "Available cash", "Reserved cash", "Return"]);
    summary.add_row(vec![
        Cell::new(format_currency(portfolio.total_value)),
        Cell::new(format_currency(portfolio.cash_balance.available)),
        Cell::new(format_currency(portfolio.cash_balance.reserved)),
        signed_cell(
            format!(
                "{} ({})",
                format_currency(portfolio.total_return),
                format_percentage(portfolio.total_return_percent)
            ),
            portfolio.total_return,
        ),
    ]);
    println!("Portfolio of user {user_id}\n{summary}");

    if portfolio.positions.is_empty() {
        println!("No open positions.");
        return;
    }

    let mut positions = table(&[
        "Ticker",
        "Name",
        "Quantity",
        "Available",
        "Price",
        "Market value",
        "Return",
    ]);
    for p in &portfolio.positions {
        let ret = match (p.total_return, p.total_return_percent) {
            (Some(amount), Some(pct)) => {
                signed_cell(format!("{} ({})", format_currency(amount), format_percentage(pct)), amount)
            }
            (Some(amount), None) => signed_cell(format_currency(amount), amount),
            _ => Cell::new("-"),
        };
        positions.add_row(vec![
            Cell::new(&p.ticker),
            Cell::new(&p.name),
            Cell::new(p.quantity.total.normalize()),
            Cell::new(p.quantity.available().normalize()),
            Cell::new(format_currency(p.current_price)),
            Cell::new(format_currency(p.market_value)),
            ret,
        ]);
    }
    println!("{positions}");
}

pub fn print_order_stats(stats: &OrderStats) {
    println!(
        "Orders: {} total | {} filled | {} pending | {} cancelled | {} rejected",
        stats.total, stats.filled, stats.pending, stats.cancelled, stats.rejected
    );
}

fn status_cell(status: OrderStatus) -> Cell {
    let color = match status {
        OrderStatus::Filled => Color::Green,
        OrderStatus::New => Color::Yellow,
        OrderStatus::Rejected => Color::Red,
        OrderStatus::Cancelled | OrderStatus::Unknown => Color::Grey,
    };
    Cell::new(status).fg(color)
}

pub fn print_orders(orders: &[Order]) {
    if orders.is_empty() {
        println!("No orders to show.");
        return;
    }
    let mut t = table(&["ID", "Date", "Ticker", "Side", "Type", "Size", "Price", "Status"]);
    for order in orders {
        let date = order
            .timestamp()
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        t.add_row(vec![
            Cell::new(order.id),
            Cell::new(date),
            Cell::new(order.ticker().unwrap_or("-")),
            Cell::new(order.side),
            Cell::new(order.order_type),
            Cell::new(order.size.normalize()),
            Cell::new(order.price.map(format_currency).unwrap_or_else(|| "-".to_string())),
            status_cell(order.status),
        ]);
    }
    println!("{t}");
}

pub fn print_instruments(instruments: &[Instrument]) {
    if instruments.is_empty() {
        println!("No instruments available.");
        return;
    }
    let mut t = table(&["ID", "Ticker", "Name"]);
    for i in instruments {
        t.add_row(vec![Cell::new(i.id), Cell::new(&i.ticker), Cell::new(&i.name)]);
    }
    println!("{t}");
}

pub fn print_quote(instrument: &Instrument, quote: &MarketDataPoint) {
    let dash = || "-".to_string();
    let mut t = table(&["Ticker", "Date", "Price", "Open", "High", "Low", "Previous close"]);
    t.add_row(vec![
        Cell::new(&instrument.ticker),
        Cell::new(&quote.date),
        Cell::new(format_currency(quote.current_price())),
        Cell::new(quote.open.map(format_currency).unwrap_or_else(dash)),
        Cell::new(quote.high.map(format_currency).unwrap_or_else(dash)),
        Cell::new(quote.low.map(format_currency).unwrap_or_else(dash)),
        Cell::new(quote.previous_close.map(format_currency).unwrap_or_else(dash)),
    ]);
    println!("{t}");
}

pub fn print_amounts(label: &str, available: Decimal, amounts: &[Decimal]) {
    println!("Available cash: {}", format_currency(available));
    if amounts.is_empty() {
        println!("No quick {label} amounts available.");
        return;
    }
    let list: Vec<String> = amounts.iter().map(|a| format_currency(*a)).collect();
    println!("Quick {label} amounts: {}", list.join(", "));
}

pub fn print_api_status(base_url: &str, status: &ApiStatus) {
    match status {
        ApiStatus::Online(HealthStatus { status, timestamp }) => {
            let at = timestamp.as_deref().unwrap_or("-");
            println!("API online at {base_url} (status {status}, {at})");
        }
        ApiStatus::Offline(reason) => println!("API offline at {base_url}: {reason}"),
    }
}

/// Prints the most recent notification, if any workflow raised one.
pub fn print_notification(state: &AppState) {
    let Notification {
        id,
        message,
        severity,
        ..
    } = &state.notification;
    if id.is_none() || message.is_empty() {
        return;
    }
    let tag = match severity {
        Severity::Success => "ok",
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "info",
    };
    println!("[{tag}] {message}");
}
