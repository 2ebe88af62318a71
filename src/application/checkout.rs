use crate::config::StoreConfig;
use crate::domain::checkout::{CheckoutState, ReviewSummary, Step};
use crate::domain::delivery::DeliveryForm;
use crate::domain::discount::{Discount, normalize_coupon_code};
use crate::domain::money::CurrencyCode;
use crate::domain::order::{OrderConfirmation, OrderRequest};
use crate::domain::payment::CardStyle;
use crate::domain::plot::Quantity;
use crate::domain::ports::{
    CardHandle, CouponLookupBox, OrderGatewayBox, PaymentWidgetBox, QuantityCacheBox,
};
use crate::domain::pricing::{PriceBreakdown, ShippingMethod};
use crate::error::{CheckoutError, CouponError, Result, ValidationError};
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument, warn};

/// Where the card form is mounted.
pub const CARD_MOUNT_POINT: &str = "#card-container";

/// Everything needed to take a payment: the widget, its credentials and the
/// backend that places the order.
pub struct PaymentSetup {
    pub widget: PaymentWidgetBox,
    pub gateway: OrderGatewayBox,
    pub app_id: SecretString,
    pub location_id: String,
}

/// Drives a single checkout.
///
/// `CheckoutController` owns the `CheckoutState` and the boxed ports. Every
/// operation that suspends takes `&mut self`, so a second coupon lookup or
/// submission cannot start while one is pending.
pub struct CheckoutController {
    state: CheckoutState,
    currency: CurrencyCode,
    coupons: CouponLookupBox,
    cache: QuantityCacheBox,
    payment: Option<PaymentSetup>,
    card: Option<Box<dyn CardHandle>>,
    widget_failure: Option<String>,
}

impl CheckoutController {
    /// Creates a controller, seeding the quantity from `requested` when it
    /// parses to a value in range, otherwise from the cache, otherwise 1.
    ///
    /// # Arguments
    ///
    /// * `store` - Unit price and currency.
    /// * `coupons` - Coupon lookup used by `apply_coupon`.
    /// * `cache` - Where the quantity is remembered between sessions.
    /// * `requested` - Raw `quantity` value from the caller, if any.
    pub async fn start(
        store: &StoreConfig,
        coupons: CouponLookupBox,
        cache: QuantityCacheBox,
        requested: Option<&str>,
    ) -> Result<Self> {
        let from_request = requested.and_then(|raw| {
            let parsed = Quantity::parse(raw);
            if parsed.is_none() {
                warn!(requested = raw, "ignoring unusable quantity");
            }
            parsed
        });
        let quantity = match from_request {
            Some(quantity) => quantity,
            None => cache.load().await?.unwrap_or_default(),
        };
        info!(%quantity, "checkout started");

        Ok(Self {
            state: CheckoutState::new(store.unit_price, quantity),
            currency: store.currency,
            coupons,
            cache,
            payment: None,
            card: None,
            widget_failure: None,
        })
    }

    /// Enables the payment step.
    pub fn with_payment(mut self, payment: PaymentSetup) -> Self {
        self.payment = Some(payment);
        self
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    pub fn currency(&self) -> CurrencyCode {
        self.currency
    }

    pub fn pricing(&self) -> PriceBreakdown {
        self.state.pricing()
    }

    pub fn set_quantity(&mut self, requested: i64) -> Result<Quantity> {
        let quantity = self.state.set_quantity(requested)?;
        info!(%quantity, "quantity set");
        Ok(quantity)
    }

    pub fn adjust_quantity(&mut self, delta: i64) -> Result<Quantity> {
        let quantity = self.state.adjust_quantity(delta)?;
        info!(%quantity, delta, "quantity adjusted");
        Ok(quantity)
    }

    pub fn set_certificate_name(&mut self, plot_number: u8, name: &str) -> Result<()> {
        self.state.set_certificate_name(plot_number, name)?;
        Ok(())
    }

    pub fn continue_to_details(&mut self) -> Result<()> {
        self.state
            .continue_to_details()
            .inspect_err(|e| warn!(error = %e, "certificate names incomplete"))?;
        info!(step = %self.state.step(), "advanced");
        Ok(())
    }

    pub fn continue_to_shipping(&mut self, form: &DeliveryForm) -> Result<()> {
        self.state
            .continue_to_shipping(form)
            .inspect_err(|e| warn!(error = %e, "delivery details rejected"))?;
        info!(step = %self.state.step(), "advanced");
        Ok(())
    }

    pub fn select_shipping(&mut self, method: ShippingMethod) {
        self.state.select_shipping(method);
        info!(shipping = %method, "shipping selected");
    }

    pub fn go_back(&mut self, to: Step) -> Result<()> {
        self.state.go_back(to)?;
        info!(step = %to, "went back");
        Ok(())
    }

    /// Validates a coupon code and applies it to the order.
    ///
    /// The code is trimmed and uppercased first; an empty code never reaches
    /// the lookup. Once a coupon is applied, further attempts fail with
    /// `CouponError::AlreadyApplied`.
    #[instrument(skip(self))]
    pub async fn apply_coupon(&mut self, raw: &str) -> Result<Discount> {
        if self.state.coupon().is_some() {
            return Err(CouponError::AlreadyApplied.into());
        }
        let code = normalize_coupon_code(raw)?;
        let discount = self
            .coupons
            .lookup(&code)
            .await
            .inspect_err(|e| warn!(code = %code, error = %e, "coupon rejected"))?;
        self.state.apply_coupon(discount.clone())?;
        info!(
            code = %code,
            savings = %discount.savings_label(self.currency),
            "coupon applied"
        );
        Ok(discount)
    }

    /// Moves to the payment step and makes sure the card form is ready.
    ///
    /// The widget is initialized on the first entry only. If that fails the
    /// step still changes, but the failure is kept and every later payment
    /// call returns it.
    #[instrument(skip(self))]
    pub async fn continue_to_payment(&mut self) -> Result<ReviewSummary> {
        if let Some(message) = &self.widget_failure {
            return Err(CheckoutError::WidgetInit(message.clone()));
        }
        let review = self
            .state
            .continue_to_payment()
            .inspect_err(|e| warn!(error = %e, "cannot enter payment step"))?
            .clone();
        info!(step = %self.state.step(), total = %review.pricing.total, "advanced");

        if self.card.is_none() {
            match self.init_card().await {
                Ok(card) => self.card = Some(card),
                Err(message) => {
                    warn!(error = %message, "payment form failed to load");
                    self.widget_failure = Some(message.clone());
                    return Err(CheckoutError::WidgetInit(message));
                }
            }
        }
        Ok(review)
    }

    async fn init_card(&self) -> std::result::Result<Box<dyn CardHandle>, String> {
        let payment = self
            .payment
            .as_ref()
            .ok_or_else(|| "Payment is not configured".to_string())?;
        let payments = payment
            .widget
            .initialize(payment.app_id.expose_secret(), &payment.location_id)
            .await
            .map_err(|e| e.0)?;
        let mut card = payments
            .card(&CardStyle::default())
            .await
            .map_err(|e| e.0)?;
        card.attach(CARD_MOUNT_POINT).await.map_err(|e| e.0)?;
        info!("payment form ready");
        Ok(card)
    }

    /// Tokenizes the card and submits the order.
    ///
    /// Every attempt carries a new idempotency key. A rejected card or a
    /// failed submission leaves the checkout on the payment step, ready to
    /// try again. On success the remembered quantity is cleared.
    #[instrument(skip(self))]
    pub async fn submit_payment(&mut self) -> Result<OrderConfirmation> {
        if let Some(message) = &self.widget_failure {
            return Err(CheckoutError::WidgetInit(message.clone()));
        }
        if self.state.step() != Step::Payment {
            return Err(ValidationError::InvalidTransition {
                from: self.state.step(),
                to: Step::Payment,
            }
            .into());
        }
        let (Some(payment), Some(card)) = (self.payment.as_ref(), self.card.as_ref()) else {
            return Err(CheckoutError::WidgetInit(
                "Payment form is not ready".to_string(),
            ));
        };

        let token = card
            .tokenize()
            .await
            .map_err(|e| CheckoutError::Tokenization(e.0))?
            .into_token()
            .map_err(CheckoutError::Tokenization)
            .inspect_err(|e| warn!(error = %e, "card tokenization failed"))?;

        let order = OrderRequest::build(&self.state, token, &payment.location_id, self.currency)?;
        info!(
            idempotency_key = %order.idempotency_key,
            amount = order.amount_money.amount,
            "submitting order"
        );
        let confirmation = payment
            .gateway
            .submit(&order)
            .await
            .inspect_err(|e| warn!(error = %e, "order submission failed"))?;

        if let Err(e) = self.cache.clear().await {
            warn!(error = %e, "order placed but cached quantity was not cleared");
        }
        info!(order_id = ?confirmation.order_id, "order placed");
        Ok(confirmation)
    }

    /// Saves the current quantity so the next checkout starts from it.
    pub async fn persist_quantity(&self) -> Result<()> {
        self.cache.save(self.state.quantity()).await
    }
}
