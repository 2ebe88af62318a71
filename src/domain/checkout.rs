use crate::domain::delivery::{DeliveryForm, DeliveryInfo};
use crate::domain::discount::Discount;
use crate::domain::money::{CurrencyCode, Money};
use crate::domain::plot::{PlotLineItem, Quantity, collect_certificate_names, regenerate_plots};
use crate::domain::pricing::{PriceBreakdown, ShippingMethod, price, refresh_volume_discount};
use crate::error::{CouponError, ValidationError};
use serde::Serialize;
use std::fmt;

/// Checkout steps, in the only order they can be completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Quantity = 1,
    Details = 2,
    Shipping = 3,
    Payment = 4,
}

impl Step {
    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Quantity => "quantity",
            Self::Details => "details",
            Self::Shipping => "shipping",
            Self::Payment => "payment",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {} ({})", self.number(), self.name())
    }
}

/// Read-only order review shown on the payment step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewSummary {
    pub plot_count: Quantity,
    pub delivery_name: String,
    pub address: Vec<String>,
    pub shipping: String,
    pub pricing: PriceBreakdown,
}

impl ReviewSummary {
    pub fn render(&self, currency: CurrencyCode) -> String {
        format!(
            "Plots: {}\nDeliver to: {}\n{}\nShipping: {}\n{}",
            self.plot_count,
            self.delivery_name,
            self.address.join("\n"),
            self.shipping,
            self.pricing.render(currency)
        )
    }
}

/// The whole checkout: where the customer is, what they have entered so far,
/// and which discounts apply.
///
/// Every mutation keeps the invariants: the plot list always has exactly
/// `quantity` entries numbered from 1, and a failed transition leaves the
/// state as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutState {
    step: Step,
    quantity: Quantity,
    unit_price: Money,
    plots: Vec<PlotLineItem>,
    delivery: Option<DeliveryInfo>,
    shipping: ShippingMethod,
    coupon: Option<Discount>,
    volume_discount: Option<Discount>,
    review: Option<ReviewSummary>,
}

impl CheckoutState {
    pub fn new(unit_price: Money, quantity: Quantity) -> Self {
        Self {
            step: Step::Quantity,
            quantity,
            unit_price,
            plots: regenerate_plots(&[], quantity),
            delivery: None,
            shipping: ShippingMethod::default(),
            coupon: None,
            volume_discount: refresh_volume_discount(quantity, None, None),
            review: None,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn plots(&self) -> &[PlotLineItem] {
        &self.plots
    }

    pub fn delivery(&self) -> Option<&DeliveryInfo> {
        self.delivery.as_ref()
    }

    pub fn shipping(&self) -> ShippingMethod {
        self.shipping
    }

    pub fn coupon(&self) -> Option<&Discount> {
        self.coupon.as_ref()
    }

    pub fn volume_discount(&self) -> Option<&Discount> {
        self.volume_discount.as_ref()
    }

    pub fn review(&self) -> Option<&ReviewSummary> {
        self.review.as_ref()
    }

    /// The discount that counts towards the total: the coupon if any,
    /// otherwise the volume discount.
    pub fn active_discount(&self) -> Option<&Discount> {
        self.coupon.as_ref().or(self.volume_discount.as_ref())
    }

    pub fn pricing(&self) -> PriceBreakdown {
        price(
            self.quantity,
            self.unit_price,
            self.coupon.as_ref(),
            self.volume_discount.as_ref(),
            self.shipping,
        )
    }

    /// Sets the quantity typed into the quantity field.
    pub fn set_quantity(&mut self, requested: i64) -> Result<Quantity, ValidationError> {
        self.expect_plots_editable()?;
        let quantity = Quantity::new(requested)?;
        self.apply_quantity(quantity);
        Ok(quantity)
    }

    /// The +/- stepper. Steps that would leave the allowed range are ignored.
    pub fn adjust_quantity(&mut self, delta: i64) -> Result<Quantity, ValidationError> {
        self.expect_plots_editable()?;
        if let Some(quantity) = self.quantity.step(delta) {
            self.apply_quantity(quantity);
        }
        Ok(self.quantity)
    }

    fn apply_quantity(&mut self, quantity: Quantity) {
        self.quantity = quantity;
        self.plots = regenerate_plots(&self.plots, quantity);
        self.refresh_discounts();
    }

    pub fn set_certificate_name(
        &mut self,
        plot_number: u8,
        name: impl Into<String>,
    ) -> Result<(), ValidationError> {
        self.expect_plots_editable()?;
        let item = self
            .plots
            .iter_mut()
            .find(|item| item.plot_number == plot_number)
            .ok_or(ValidationError::UnknownPlot(plot_number))?;
        item.certificate_name = name.into();
        Ok(())
    }

    /// Step 1 -> 2. Every plot needs a certificate name.
    pub fn continue_to_details(&mut self) -> Result<(), ValidationError> {
        self.expect_step(Step::Quantity, Step::Details)?;
        self.plots = collect_certificate_names(&self.plots)?;
        self.step = Step::Details;
        Ok(())
    }

    /// Step 2 -> 3. All required delivery fields and a well-formed email.
    pub fn continue_to_shipping(&mut self, form: &DeliveryForm) -> Result<(), ValidationError> {
        self.expect_step(Step::Details, Step::Shipping)?;
        self.delivery = Some(form.validate()?);
        self.step = Step::Shipping;
        Ok(())
    }

    /// Step 3 -> 4. Builds the review summary from the collected details.
    pub fn continue_to_payment(&mut self) -> Result<&ReviewSummary, ValidationError> {
        self.expect_step(Step::Shipping, Step::Payment)?;
        let delivery = self
            .delivery
            .as_ref()
            .ok_or(ValidationError::InvalidTransition {
                from: self.step,
                to: Step::Payment,
            })?;

        let review = ReviewSummary {
            plot_count: self.quantity,
            delivery_name: delivery.full_name(),
            address: delivery.postal_address(),
            shipping: self.shipping.description().to_owned(),
            pricing: self.pricing(),
        };
        self.step = Step::Payment;
        Ok(self.review.insert(review))
    }

    /// Back navigation to any earlier step. Nothing already entered is lost.
    pub fn go_back(&mut self, to: Step) -> Result<(), ValidationError> {
        if to >= self.step {
            return Err(ValidationError::InvalidTransition {
                from: self.step,
                to,
            });
        }
        self.step = to;
        Ok(())
    }

    pub fn select_shipping(&mut self, method: ShippingMethod) {
        self.shipping = method;
        self.refresh_review();
    }

    /// Applies a validated coupon. Only one coupon per order.
    pub fn apply_coupon(&mut self, discount: Discount) -> Result<(), CouponError> {
        if self.coupon.is_some() {
            return Err(CouponError::AlreadyApplied);
        }
        self.coupon = Some(discount);
        self.refresh_discounts();
        Ok(())
    }

    fn refresh_discounts(&mut self) {
        self.volume_discount = refresh_volume_discount(
            self.quantity,
            self.coupon.as_ref(),
            self.volume_discount.take(),
        );
        self.refresh_review();
    }

    fn refresh_review(&mut self) {
        let pricing = self.pricing();
        let shipping = self.shipping.description();
        if let Some(review) = self.review.as_mut() {
            review.plot_count = self.quantity;
            review.shipping = shipping.to_owned();
            review.pricing = pricing;
        }
    }

    /// Quantity and certificate names are validated on leaving step 1, so
    /// they only change there. Going back to step 1 unlocks them again.
    fn expect_plots_editable(&self) -> Result<(), ValidationError> {
        match self.step {
            Step::Quantity => Ok(()),
            step => Err(ValidationError::PlotsLocked(step)),
        }
    }

    fn expect_step(&self, expected: Step, to: Step) -> Result<(), ValidationError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(ValidationError::InvalidTransition {
                from: self.step,
                to,
            })
        }
    }
}
