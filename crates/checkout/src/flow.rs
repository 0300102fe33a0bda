//! The checkout orchestrator.
//!
//! Drives the fixed step sequence, persisting each step's selection to
//! the backend before advancing, and finalizes placement with its
//! post-placement side effects.

use cart::{CartStore, RemoteCartService, WishlistService};
use common::{CustomerEmail, Money};
use domain::{Address, DeliveryOption, GeoPoint, PaymentMethod, PaymentSelection};
use storage::KeyValueStore;

use crate::error::{CheckoutError, Result};
use crate::pricing::{PricingConfig, Totals};
use crate::services::{
    CheckoutService, NotificationService, PlacedOrder, ReviewSnapshot, SelectionUpdate,
};
use crate::step::CheckoutStep;

/// The accumulating state of an in-progress checkout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckoutSelection {
    /// Selected or newly created shipping address.
    pub address: Option<Address>,

    /// Chosen delivery option.
    pub delivery: Option<DeliveryOption>,

    /// Chosen payment method and method data.
    pub payment: Option<PaymentSelection>,
}

/// Orchestrates the checkout step sequence for one session.
///
/// Created at checkout entry and discarded on navigation away or
/// after successful placement. Cart state is borrowed per call; the
/// flow never outlives the store it reads.
pub struct CheckoutFlow<K, N> {
    identity: Option<CustomerEmail>,
    step: CheckoutStep,
    selection: CheckoutSelection,
    review: Option<ReviewSnapshot>,
    applied_coupon: Option<String>,
    coupon_dismissed: bool,
    location: Option<GeoPoint>,
    cart_cleared: bool,
    pricing: PricingConfig,
    checkout_api: K,
    notifier: N,
}

impl<K, N> CheckoutFlow<K, N>
where
    K: CheckoutService,
    N: NotificationService,
{
    /// Creates a flow for the given identity.
    pub fn new(
        checkout_api: K,
        notifier: N,
        pricing: PricingConfig,
        identity: Option<CustomerEmail>,
    ) -> Self {
        Self {
            identity,
            step: CheckoutStep::default(),
            selection: CheckoutSelection::default(),
            review: None,
            applied_coupon: None,
            coupon_dismissed: false,
            location: None,
            cart_cleared: false,
            pricing,
            checkout_api,
            notifier,
        }
    }

    /// Attaches the customer's shared location for order
    /// notifications.
    pub fn set_location(&mut self, location: GeoPoint) {
        self.location = Some(location);
    }

    /// Entry guard for the step sequence.
    ///
    /// Checkout requires an authenticated identity, and an empty cart
    /// is refused up front so no step runs against nothing. This is a
    /// precondition check, not a step.
    pub fn begin<C, W, S>(&mut self, cart: &CartStore<C, W, S>) -> Result<()>
    where
        C: RemoteCartService,
        W: WishlistService,
        S: KeyValueStore,
    {
        if self.identity.is_none() {
            return Err(CheckoutError::NotAuthenticated);
        }
        if cart.cart_lines().is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        self.step = CheckoutStep::AddressSelection;
        Ok(())
    }

    /// Step 1 → 2: records the chosen address.
    ///
    /// A persisted address is reported to the backend first; a
    /// persistence failure blocks advancement.
    #[tracing::instrument(skip(self, address), fields(step = %self.step))]
    pub async fn select_address(&mut self, address: Address) -> Result<()> {
        self.expect_step(CheckoutStep::AddressSelection)?;

        if let (Some(identity), Some(address_id)) = (self.identity.clone(), address.id) {
            self.checkout_api
                .save_selection(
                    &identity,
                    &SelectionUpdate {
                        address_id: Some(address_id),
                        ..Default::default()
                    },
                )
                .await
                .map_err(|e| CheckoutError::StepFailed {
                    step: CheckoutStep::AddressSelection,
                    reason: e.to_string(),
                })?;
        }

        self.selection.address = Some(address);
        self.advance(CheckoutStep::DeliveryAndPayment);
        Ok(())
    }

    /// Step 2 → 3: records the delivery option, persisting the
    /// combined delivery/payment selection before advancing.
    #[tracing::instrument(skip(self, delivery), fields(step = %self.step))]
    pub async fn select_delivery(
        &mut self,
        delivery: DeliveryOption,
        payment_method: Option<PaymentMethod>,
    ) -> Result<()> {
        self.expect_step(CheckoutStep::DeliveryAndPayment)?;

        if let Some(identity) = self.identity.clone() {
            self.checkout_api
                .save_selection(
                    &identity,
                    &SelectionUpdate {
                        delivery_option: Some(delivery.id.clone()),
                        payment_method,
                        ..Default::default()
                    },
                )
                .await
                .map_err(|e| CheckoutError::StepFailed {
                    step: CheckoutStep::DeliveryAndPayment,
                    reason: e.to_string(),
                })?;
        }

        self.selection.delivery = Some(delivery);
        self.advance(CheckoutStep::PaymentMethod);
        Ok(())
    }

    /// Step 3 → 4 (or directly to Completion): records the payment
    /// selection.
    ///
    /// When the payment flow signals `skip_review`, the order already
    /// exists server-side: the review step is bypassed, the cart
    /// clears once, and the session lands on Completion. Otherwise the
    /// server review snapshot is fetched (its failure blocks) before
    /// advancing to OrderReview.
    #[tracing::instrument(skip(self, selection, cart), fields(step = %self.step, method = %selection.method))]
    pub async fn submit_payment<C, W, S>(
        &mut self,
        selection: PaymentSelection,
        cart: &mut CartStore<C, W, S>,
    ) -> Result<()>
    where
        C: RemoteCartService,
        W: WishlistService,
        S: KeyValueStore,
    {
        self.expect_step(CheckoutStep::PaymentMethod)?;

        let skip_review = selection.skip_review;
        self.selection.payment = Some(selection);

        if skip_review {
            // The payment-verification callback already created the
            // order and the backend cleared its cart copy.
            tracing::info!("review bypassed, order created during payment verification");
            self.clear_cart_once(cart)?;
            self.advance(CheckoutStep::Completion);
            return Ok(());
        }

        if let Some(identity) = self.identity.clone() {
            let snapshot = self
                .checkout_api
                .review(&identity)
                .await
                .map_err(|e| CheckoutError::StepFailed {
                    step: CheckoutStep::PaymentMethod,
                    reason: e.to_string(),
                })?;
            self.review = Some(snapshot);
        }

        self.advance(CheckoutStep::OrderReview);
        Ok(())
    }

    /// Moves backward to an earlier step to re-edit it.
    pub fn go_back(&mut self, target: CheckoutStep) -> Result<()> {
        if !self.step.can_go_back_to(target) {
            return Err(CheckoutError::InvalidTransition(format!(
                "cannot go back from {} to {}",
                self.step, target
            )));
        }
        self.step = target;
        Ok(())
    }

    /// Places the order from the review step.
    ///
    /// Authentication and a non-empty cart are hard preconditions
    /// checked before any network call. Placement failure leaves the
    /// flow on OrderReview so the caller can retry or go back; no
    /// partial order is assumed created. Notification dispatch and the
    /// review re-fetch are best-effort once the order is committed.
    #[tracing::instrument(skip(self, cart), fields(step = %self.step))]
    pub async fn place_order<C, W, S>(
        &mut self,
        cart: &mut CartStore<C, W, S>,
    ) -> Result<PlacedOrder>
    where
        C: RemoteCartService,
        W: WishlistService,
        S: KeyValueStore,
    {
        let Some(identity) = self.identity.clone() else {
            return Err(CheckoutError::NotAuthenticated);
        };
        if cart.cart_lines().is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        self.expect_step(CheckoutStep::OrderReview)?;

        let placed = match self.checkout_api.place_order(&identity).await {
            Ok(placed) => placed,
            Err(error) => {
                metrics::counter!("order_placement_failures_total").increment(1);
                return Err(CheckoutError::PlacementFailed(error.to_string()));
            }
        };

        // The snapshot only feeds notification content from here on.
        if self.review.is_none() {
            match self.checkout_api.review(&identity).await {
                Ok(snapshot) => self.review = Some(snapshot),
                Err(error) => {
                    tracing::warn!(%error, "review snapshot unavailable after placement");
                }
            }
        }

        let method = self
            .selection
            .payment
            .as_ref()
            .map(|p| p.method)
            .unwrap_or_default();
        let dispatch = if method.is_cod() {
            self.notifier
                .send_order_email(&identity, &placed, self.review.as_ref())
                .await
        } else {
            self.notifier
                .send_order_whatsapp(&identity, &placed, self.review.as_ref(), self.location.as_ref())
                .await
        };
        if let Err(error) = dispatch {
            tracing::warn!(order_id = %placed.order_id, %error, "order notification dispatch failed");
        }

        self.clear_cart_once(cart)?;
        self.advance(CheckoutStep::Completion);
        metrics::counter!("orders_placed_total").increment(1);
        tracing::info!(order_id = %placed.order_id, "order placed");

        Ok(placed)
    }

    /// Computes display totals, auto-applying the threshold coupon.
    ///
    /// The coupon silently activates once the subtotal crosses its
    /// minimum while no coupon is applied, but never re-activates
    /// after the customer explicitly cleared it.
    pub fn totals<C, W, S>(&mut self, cart: &CartStore<C, W, S>) -> Totals
    where
        C: RemoteCartService,
        W: WishlistService,
        S: KeyValueStore,
    {
        let subtotal = cart.cart_total();
        self.auto_apply_coupon(subtotal);
        self.pricing
            .totals(subtotal, self.selection.delivery.as_ref(), self.applied_coupon.as_deref())
    }

    /// Applies a coupon code on the customer's behalf.
    pub fn apply_coupon(&mut self, code: impl Into<String>) {
        self.applied_coupon = Some(code.into());
        self.coupon_dismissed = false;
    }

    /// Clears the applied coupon; it will not auto-apply again this
    /// session.
    pub fn clear_coupon(&mut self) {
        self.applied_coupon = None;
        self.coupon_dismissed = true;
    }

    /// The current step.
    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    /// The accumulated checkout selection.
    pub fn selection(&self) -> &CheckoutSelection {
        &self.selection
    }

    /// The held review snapshot, if fetched.
    pub fn review_snapshot(&self) -> Option<&ReviewSnapshot> {
        self.review.as_ref()
    }

    /// The applied coupon code, if any.
    pub fn applied_coupon(&self) -> Option<&str> {
        self.applied_coupon.as_deref()
    }

    fn auto_apply_coupon(&mut self, subtotal: Money) {
        if self.applied_coupon.is_none()
            && !self.coupon_dismissed
            && self.pricing.auto_coupon.applies_at(subtotal)
        {
            self.applied_coupon = Some(self.pricing.auto_coupon.code.clone());
            tracing::info!(code = %self.pricing.auto_coupon.code, "coupon auto-applied");
        }
    }

    fn expect_step(&self, expected: CheckoutStep) -> Result<()> {
        if self.step != expected {
            return Err(CheckoutError::InvalidTransition(format!(
                "expected step {expected}, currently on {}",
                self.step
            )));
        }
        Ok(())
    }

    fn advance(&mut self, next: CheckoutStep) {
        tracing::info!(from = %self.step, to = %next, "checkout step advanced");
        self.step = next;
    }

    /// Clears the cart at most once per session, whichever transition
    /// reaches Completion first.
    fn clear_cart_once<C, W, S>(&mut self, cart: &mut CartStore<C, W, S>) -> Result<()>
    where
        C: RemoteCartService,
        W: WishlistService,
        S: KeyValueStore,
    {
        if !self.cart_cleared {
            cart.clear_cart()?;
            self.cart_cleared = true;
        }
        Ok(())
    }
}
