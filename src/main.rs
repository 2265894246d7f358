use anyhow::{Context, anyhow};
use api_client::{ApiClient, HttpApiClient};
use clap::{Parser, Subcommand};
use configuration::{Config, ConfigOverrides};
use core_types::{Instrument, OrderSide, OrderType, StatusFilter};
use rust_decimal::Decimal;
use std::process::ExitCode;
use std::sync::Arc;
use store::{
    CashOperation, ModalKind, ModalPayload, OrderTicket, Severity, SizeInput, Store, StoreError,
};

mod render;

/// The main entry point for the Tradedesk terminal client.
#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine; the environment and config.toml still apply.
    let _ = dotenvy::dotenv();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = match configuration::load_config(&cli.overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let _log_guard = match configuration::init_tracing(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialise logging: {e}");
            return ExitCode::FAILURE;
        }
    };
    std::panic::set_hook(Box::new(|info| {
        tracing::error!(%info, "Unhandled failure");
    }));

    // Run the command on its own task so a panic anywhere below surfaces here
    // as a join error instead of tearing down the process.
    match tokio::spawn(run(cli, config)).await {
        Ok(Ok(code)) => code,
        Ok(Err(e)) => {
            tracing::error!(error = ?e, "Command failed");
            recovery_prompt(&e.to_string());
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!(error = %e, "Command aborted");
            recovery_prompt("the command stopped unexpectedly");
            ExitCode::FAILURE
        }
    }
}

fn recovery_prompt(reason: &str) {
    eprintln!("Something went wrong: {reason}");
    eprintln!("Check that the backend is running and run the command again.");
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A terminal client for a simulated brokerage account.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    overrides: ConfigOverrides,

    /// Account to operate on (defaults to `[session] default_user_id`).
    #[arg(long, short, global = true)]
    user: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the portfolio, the order counters and the order list.
    Dashboard(DashboardArgs),
    /// List orders, optionally narrowed to one status.
    Orders(OrdersArgs),
    /// Add cash to the account. Without --amount, lists the quick amounts.
    Deposit(CashArgs),
    /// Take cash out of the account. Without --amount, lists the quick amounts.
    Withdraw(CashArgs),
    /// Place a buy order.
    Buy(TradeArgs),
    /// Place a sell order.
    Sell(TradeArgs),
    /// Cancel a pending order.
    Cancel {
        /// The id of the order to cancel.
        order_id: u64,
    },
    /// List the instruments that can be traded.
    Instruments {
        /// Only instruments that can be sold (those with a position).
        #[arg(long)]
        sellable: bool,
    },
    /// Show the latest price of an instrument.
    Quote {
        /// Ticker (e.g. "GGAL") or numeric id.
        instrument: String,
    },
    /// Ask the simulator to fill a pending LIMIT order now.
    Process {
        order_id: u64,
    },
    /// List orders waiting to be filled, across all accounts.
    Pending {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Check whether the backend is reachable.
    Health,
}

#[derive(Parser)]
struct DashboardArgs {
    /// Order status to display: all, new (pending), filled, cancelled, rejected.
    #[arg(long, default_value = "all")]
    status: StatusFilter,

    /// Print the state as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct OrdersArgs {
    #[arg(long, default_value = "all")]
    status: StatusFilter,
}

#[derive(Parser)]
struct CashArgs {
    /// Amount in account currency.
    #[arg(long)]
    amount: Option<Decimal>,
}

#[derive(Parser)]
struct TradeArgs {
    /// Ticker (e.g. "GGAL") or numeric id.
    #[arg(long)]
    instrument: String,

    /// Number of units.
    #[arg(long, conflicts_with = "amount", required_unless_present = "amount")]
    quantity: Option<Decimal>,

    /// Currency to spend; the backend converts it to whole units.
    #[arg(long)]
    amount: Option<Decimal>,

    /// Limit price. Omit for a MARKET order.
    #[arg(long)]
    limit: Option<Decimal>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn run(cli: Cli, config: Config) -> anyhow::Result<ExitCode> {
    let client = HttpApiClient::new(&config.api).context("Failed to build the HTTP client")?;
    let base_url = client.base_url().to_string();
    let api: Arc<dyn ApiClient> = Arc::new(client);
    let store = Store::new(api, &config);
    if let Some(user_id) = cli.user {
        store.select_session(user_id);
    }

    let result = match cli.command {
        Commands::Dashboard(args) => dashboard(&store, args).await,
        Commands::Orders(args) => orders(&store, args.status).await,
        Commands::Deposit(args) => cash(&store, CashOperation::Deposit, args.amount).await,
        Commands::Withdraw(args) => cash(&store, CashOperation::Withdraw, args.amount).await,
        Commands::Buy(args) => trade(&store, OrderSide::Buy, args).await,
        Commands::Sell(args) => trade(&store, OrderSide::Sell, args).await,
        Commands::Cancel { order_id } => cancel(&store, order_id).await,
        Commands::Instruments { sellable } => instruments(&store, sellable).await,
        Commands::Quote { instrument } => quote(&store, &instrument).await,
        Commands::Process { order_id } => process(&store, order_id).await,
        Commands::Pending { limit } => pending(&store, limit).await,
        Commands::Health => health(&store, &base_url).await,
    };

    render::print_notification(&store.snapshot());
    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        // Workflow failures were already reported through the notification.
        Err(e) if e.downcast_ref::<StoreError>().is_some() => Ok(ExitCode::FAILURE),
        Err(e) => Err(e),
    }
}

async fn dashboard(store: &Store, args: DashboardArgs) -> anyhow::Result<()> {
    let (portfolio, orders) = if args.status.is_all() {
        let outcome = store.refresh_session_data().await;
        (outcome.portfolio, outcome.orders)
    } else {
        tokio::join!(store.fetch_portfolio(), store.set_order_filter(args.status))
    };
    let state = store.snapshot();

    if args.json {
        let view = serde_json::json!({
            "userId": state.user_id,
            "portfolio": state.portfolio,
            "orders": state.orders,
            "filter": state.orders_filter,
        });
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        render::print_portfolio(state.user_id, state.portfolio.as_ref());
        render::print_order_stats(&state.order_stats);
        render::print_orders(&state.orders);
    }

    portfolio?;
    orders?;
    Ok(())
}

async fn orders(store: &Store, status: StatusFilter) -> anyhow::Result<()> {
    if status.is_all() {
        store.fetch_orders(status).await?;
    } else {
        store.set_order_filter(status).await?;
    }
    let state = store.snapshot();
    render::print_order_stats(&state.order_stats);
    render::print_orders(&state.orders);
    Ok(())
}

async fn cash(
    store: &Store,
    operation: CashOperation,
    amount: Option<Decimal>,
) -> anyhow::Result<()> {
    store.fetch_portfolio().await?;
    let available = store.snapshot().available_cash();

    let Some(amount) = amount else {
        let label = operation.label().to_lowercase();
        render::print_amounts(&label, available, &store.quick_amounts(operation));
        return Ok(());
    };

    store.toggle_modal(operation.modal(), ModalPayload::default());
    match operation {
        CashOperation::Deposit => store.deposit(amount).await?,
        CashOperation::Withdraw => store.withdraw(amount).await?,
    };
    let state = store.snapshot();
    render::print_portfolio(state.user_id, state.portfolio.as_ref());
    Ok(())
}

/// Finds an instrument by numeric id or case-insensitive ticker.
fn resolve<'a>(instruments: &'a [Instrument], query: &str) -> Option<&'a Instrument> {
    match query.parse::<u64>() {
        Ok(id) => instruments.iter().find(|i| i.id == id),
        Err(_) => instruments
            .iter()
            .find(|i| i.ticker.eq_ignore_ascii_case(query)),
    }
}

async fn trade(store: &Store, side: OrderSide, args: TradeArgs) -> anyhow::Result<()> {
    store.refresh_session_data().await;
    store.fetch_instruments().await?;

    let tradable = store.tradable_instruments(side);
    let instrument = resolve(&tradable, &args.instrument).cloned();
    if instrument.is_none() {
        let message = match side {
            OrderSide::Sell => format!("You hold no position in {}", args.instrument),
            _ => format!("Unknown instrument {}", args.instrument),
        };
        store.show_notification(message.clone(), Severity::Error);
        return Err(StoreError::Validation(message).into());
    }

    store.toggle_modal(
        ModalKind::Trading,
        ModalPayload {
            side: Some(side),
            instrument_id: instrument.as_ref().map(|i| i.id),
        },
    );

    let order_type = if args.limit.is_some() {
        OrderType::Limit
    } else {
        OrderType::Market
    };
    // A LIMIT order can go ahead without a quote; a MARKET order cannot.
    let market_price = match instrument.as_ref() {
        Some(i) => match store.quote(i.id).await {
            Ok(point) => Some(point.current_price()),
            Err(e) if order_type == OrderType::Market => return Err(e.into()),
            Err(_) => None,
        },
        None => None,
    };

    let size = match (args.quantity, args.amount) {
        (Some(quantity), _) => SizeInput::Quantity(quantity),
        (None, Some(amount)) => SizeInput::Amount(amount),
        (None, None) => return Err(anyhow!("either --quantity or --amount is required")),
    };

    let ticket = OrderTicket {
        instrument,
        side,
        order_type,
        size,
        limit_price: args.limit,
        market_price,
    };
    // An unrepresentable estimate is rejected by the store with its own message.
    if let Some(estimate) = ticket.estimate() {
        println!(
            "Estimated: {} units for {}",
            estimate.quantity.normalize(),
            core_types::format_currency(estimate.value)
        );
    }

    let order = store.place_order(ticket).await?;
    println!("Order {} is {}", order.id, order.status);
    Ok(())
}

async fn cancel(store: &Store, order_id: u64) -> anyhow::Result<()> {
    store.cancel_order(order_id).await?;
    let state = store.snapshot();
    render::print_order_stats(&state.order_stats);
    render::print_orders(&state.orders);
    Ok(())
}

async fn instruments(store: &Store, sellable: bool) -> anyhow::Result<()> {
    store.fetch_instruments().await?;
    let side = if sellable {
        store.fetch_portfolio().await?;
        OrderSide::Sell
    } else {
        OrderSide::Buy
    };
    render::print_instruments(&store.tradable_instruments(side));
    Ok(())
}

async fn quote(store: &Store, query: &str) -> anyhow::Result<()> {
    let instruments = store.fetch_instruments().await?;
    let instrument = resolve(&instruments, query)
        .ok_or_else(|| anyhow!("Unknown instrument {query}"))?;
    let point = store.quote(instrument.id).await?;
    render::print_quote(instrument, &point);
    Ok(())
}

async fn process(store: &Store, order_id: u64) -> anyhow::Result<()> {
    let order = store.process_order(order_id).await?;
    println!("Order {} is now {}", order.id, order.status);
    Ok(())
}

async fn pending(store: &Store, limit: Option<u32>) -> anyhow::Result<()> {
    let orders = store.pending_orders(limit).await?;
    render::print_orders(&orders);
    Ok(())
}

async fn health(store: &Store, base_url: &str) -> anyhow::Result<()> {
    let status = store.check_api_status().await;
    render::print_api_status(base_url, &status);
    if status.is_online() {
        Ok(())
    } else {
        Err(anyhow!("the backend at {base_url} is not reachable"))
    }
}
