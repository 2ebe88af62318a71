use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result, miette};
use plot_checkout::application::checkout::{CheckoutController, PaymentSetup};
use plot_checkout::config::{PaymentConfig, StoreConfig, load_dotenv};
use plot_checkout::domain::delivery::DeliveryForm;
use plot_checkout::domain::ports::{CouponLookupBox, QuantityCacheBox};
use plot_checkout::domain::pricing::ShippingMethod;
use plot_checkout::infrastructure::coupons::StaticCouponTable;
use plot_checkout::infrastructure::http::HttpOrderGateway;
use plot_checkout::infrastructure::in_memory::InMemoryQuantityCache;
#[cfg(feature = "storage-rocksdb")]
use plot_checkout::infrastructure::rocksdb::RocksDbQuantityCache;
use plot_checkout::infrastructure::widget::PresetNonceWidget;
use plot_checkout::interfaces::csv::plot_reader::CertificateNameReader;
use std::fs::File;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Price an order and print the breakdown as JSON
    Quote(OrderOptions),
    /// Run the whole checkout and place the order
    Order {
        /// CSV file with `plot,certificate_name` rows
        #[arg(long)]
        plots: PathBuf,

        /// JSON file with the delivery details
        #[arg(long)]
        delivery: PathBuf,

        /// Card nonce already issued by the payment widget
        #[arg(long)]
        card_nonce: String,

        #[command(flatten)]
        options: OrderOptions,
    },
}

#[derive(Args)]
struct OrderOptions {
    /// Number of plots (1-99). Falls back to the remembered quantity, then 1.
    #[arg(long)]
    quantity: Option<String>,

    /// Coupon code to apply
    #[arg(long)]
    coupon: Option<String>,

    /// Shipping method: standard or express
    #[arg(long, default_value = "standard")]
    shipping: ShippingMethod,

    /// Path to persistent state (optional). If provided, uses RocksDB.
    #[arg(long)]
    state_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    load_dotenv();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "plot_checkout=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let store = StoreConfig::from_env().into_diagnostic()?;

    match cli.command {
        Command::Quote(options) => quote(&store, options).await,
        Command::Order {
            plots,
            delivery,
            card_nonce,
            options,
        } => order(&store, plots, delivery, card_nonce, options).await,
    }
}

async fn quote(store: &StoreConfig, options: OrderOptions) -> Result<()> {
    let controller = start(store, &options).await?;
    controller.persist_quantity().await.into_diagnostic()?;

    let currency = controller.currency();
    let pricing = controller.pricing();
    let amount_minor_units = pricing.amount_minor_units();
    let summary = pricing.render(currency);
    let output = serde_json::json!({
        "currency": currency,
        "amount_minor_units": amount_minor_units,
        "summary": summary,
        "pricing": pricing,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&output).into_diagnostic()?
    );
    Ok(())
}

async fn order(
    store: &StoreConfig,
    plots: PathBuf,
    delivery: PathBuf,
    card_nonce: String,
    options: OrderOptions,
) -> Result<()> {
    let payment = PaymentConfig::from_env().into_diagnostic()?;
    let gateway = HttpOrderGateway::new(&payment.backend_url);
    info!(endpoint = gateway.endpoint(), "order backend");

    let mut controller = start(store, &options).await?.with_payment(PaymentSetup {
        widget: Box::new(PresetNonceWidget::new(card_nonce)),
        gateway: Box::new(gateway),
        app_id: payment.app_id,
        location_id: payment.location_id,
    });

    let result = async {
        for row in CertificateNameReader::from_path(plots)?.rows() {
            let row = row?;
            controller.set_certificate_name(row.plot, &row.certificate_name)?;
        }
        let form: DeliveryForm = serde_json::from_reader(File::open(delivery)?)?;

        controller.continue_to_details()?;
        controller.continue_to_shipping(&form)?;
        let review = controller.continue_to_payment().await?;
        eprintln!("{}", review.render(controller.currency()));
        controller.submit_payment().await
    }
    .await;

    let confirmation = match result {
        Ok(confirmation) => confirmation,
        Err(e) => {
            controller.persist_quantity().await.into_diagnostic()?;
            return Err(e).into_diagnostic();
        }
    };
    let order_id = confirmation
        .order_id
        .ok_or_else(|| miette!("Order placed but the backend returned no order id"))?;
    println!("{order_id}");
    Ok(())
}

/// Builds a controller and applies the options shared by both commands.
async fn start(store: &StoreConfig, options: &OrderOptions) -> Result<CheckoutController> {
    let coupons: CouponLookupBox = Box::new(StaticCouponTable::new(
        store.coupons.clone(),
        store.coupon_delay,
    ));
    let cache = quantity_cache(options.state_path.clone())?;

    let mut controller =
        CheckoutController::start(store, coupons, cache, options.quantity.as_deref())
            .await
            .into_diagnostic()?;
    controller.select_shipping(options.shipping);
    if let Some(code) = &options.coupon {
        controller.apply_coupon(code).await.into_diagnostic()?;
    }
    Ok(controller)
}

fn quantity_cache(state_path: Option<PathBuf>) -> Result<QuantityCacheBox> {
    match state_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => Ok(Box::new(RocksDbQuantityCache::open(path).into_diagnostic()?)),
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            tracing::warn!(
                "Persistent storage requested via --state-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
            );
            Ok(Box::new(InMemoryQuantityCache::new()))
        }
        None => Ok(Box::new(InMemoryQuantityCache::new())),
    }
}
