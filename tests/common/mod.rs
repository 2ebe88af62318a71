#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use plot_checkout::application::checkout::{CheckoutController, PaymentSetup};
use plot_checkout::config::StoreConfig;
use plot_checkout::domain::delivery::DeliveryForm;
use plot_checkout::domain::discount::Discount;
use plot_checkout::domain::money::{CurrencyCode, Money};
use plot_checkout::domain::order::{OrderConfirmation, OrderRequest};
use plot_checkout::domain::ports::{OrderGateway, PaymentWidget, PaymentsHandle};
use plot_checkout::error::{CheckoutError, Result, WidgetError};
use plot_checkout::infrastructure::coupons::StaticCouponTable;
use plot_checkout::infrastructure::in_memory::InMemoryQuantityCache;
use plot_checkout::infrastructure::widget::PresetNonceWidget;
use rust_decimal_macros::dec;
use secrecy::SecretString;
use serde_json::Value;
use std::fs::File;
use std::io::Error;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TEST_NONCE: &str = "cnon:card-nonce-ok";

pub fn store_config() -> StoreConfig {
    StoreConfig {
        unit_price: Money::new(dec!(99.99)),
        currency: CurrencyCode::USD,
        coupons: vec![
            Discount::percentage("RESELLER10", dec!(10)),
            Discount::fixed("HUGE", dec!(100000)),
        ],
        coupon_delay: Duration::ZERO,
    }
}

pub fn delivery_form(email: &str) -> DeliveryForm {
    DeliveryForm {
        first_name: "Aoife".into(),
        last_name: "Byrne".into(),
        email: email.into(),
        phone: "0871234567".into(),
        address1: "12 Main Street".into(),
        address2: "Apt 4".into(),
        city: "Galway".into(),
        state: "Connacht".into(),
        zip: "H91".into(),
        country: "IE".into(),
    }
}

/// Gateway that keeps every order it is handed.
#[derive(Default, Clone)]
pub struct RecordingGateway {
    pub orders: Arc<Mutex<Vec<OrderRequest>>>,
    pub fail_with: Option<String>,
}

impl RecordingGateway {
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn orders(&self) -> Vec<OrderRequest> {
        self.orders.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderGateway for RecordingGateway {
    async fn submit(&self, order: &OrderRequest) -> Result<OrderConfirmation> {
        self.orders.lock().unwrap().push(order.clone());
        match &self.fail_with {
            Some(message) => Err(CheckoutError::Submission(message.clone())),
            None => Ok(OrderConfirmation {
                order_id: Some(format!("order-{}", self.orders.lock().unwrap().len())),
            }),
        }
    }
}

/// Widget whose script never loads.
pub struct UnavailableWidget;

#[async_trait]
impl PaymentWidget for UnavailableWidget {
    async fn initialize(
        &self,
        _app_id: &str,
        _location_id: &str,
    ) -> std::result::Result<Box<dyn PaymentsHandle>, WidgetError> {
        Err(WidgetError("Payment SDK not loaded".to_string()))
    }
}

pub async fn controller_with(
    requested: Option<&str>,
    cache: InMemoryQuantityCache,
    gateway: RecordingGateway,
) -> CheckoutController {
    let store = store_config();
    let coupons = StaticCouponTable::new(store.coupons.clone(), store.coupon_delay);
    CheckoutController::start(&store, Box::new(coupons), Box::new(cache), requested)
        .await
        .unwrap()
        .with_payment(PaymentSetup {
            widget: Box::new(PresetNonceWidget::new(TEST_NONCE)),
            gateway: Box::new(gateway),
            app_id: SecretString::from("sandbox-app"),
            location_id: "LOC1".to_string(),
        })
}

pub fn name_every_plot(controller: &mut CheckoutController) {
    for n in 1..=controller.state().quantity().get() {
        controller
            .set_certificate_name(n, &format!("Owner {n}"))
            .unwrap();
    }
}

pub fn write_plots_csv(path: &Path, names: &[&str]) -> std::result::Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["plot", "certificate_name"])?;
    for (i, name) in names.iter().enumerate() {
        wtr.write_record([(i + 1).to_string().as_str(), *name])?;
    }

    wtr.flush()?;
    Ok(())
}

/// In-process stand-in for the order backend.
pub struct Backend {
    pub url: String,
    pub requests: Arc<Mutex<Vec<Value>>>,
}

struct BackendState {
    requests: Arc<Mutex<Vec<Value>>>,
    status: StatusCode,
    reply: Value,
}

/// Serves `POST /api/process-payment` on an ephemeral port, answering every
/// request with `status` and `reply`.
pub async fn spawn_backend(status: StatusCode, reply: Value) -> Backend {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = Arc::new(BackendState {
        requests: requests.clone(),
        status,
        reply,
    });
    let app = Router::new()
        .route("/api/process-payment", post(process_payment))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Backend {
        url: format!("http://{addr}"),
        requests,
    }
}

async fn process_payment(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.requests.lock().unwrap().push(body);
    (state.status, Json(state.reply.clone()))
}
