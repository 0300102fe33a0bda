//! Integration tests for the checkout step sequence.

use cart::{CartStore, InMemoryCartService, InMemoryWishlistService};
use checkout::{
    CheckoutError, CheckoutFlow, CheckoutStep, InMemoryCheckoutService,
    InMemoryNotificationService, PricingConfig, ReviewSnapshot, Totals,
};
use common::{CustomerEmail, Money};
use domain::{Address, DeliveryOption, GeoPoint, PaymentMethod, PaymentSelection, ProductRef};
use storage::InMemoryStore;

type TestCart = CartStore<InMemoryCartService, InMemoryWishlistService, InMemoryStore>;
type TestFlow = CheckoutFlow<InMemoryCheckoutService, InMemoryNotificationService>;

fn identity() -> CustomerEmail {
    CustomerEmail::new("asha@example.com")
}

fn setup() -> (TestFlow, TestCart, InMemoryCheckoutService, InMemoryNotificationService) {
    let checkout_api = InMemoryCheckoutService::new();
    let notifier = InMemoryNotificationService::new();
    let flow = CheckoutFlow::new(
        checkout_api.clone(),
        notifier.clone(),
        PricingConfig::default(),
        Some(identity()),
    );
    let cart = CartStore::new(
        InMemoryCartService::new(),
        InMemoryWishlistService::new(),
        InMemoryStore::new(),
    );
    (flow, cart, checkout_api, notifier)
}

async fn fill_cart(cart: &mut TestCart, rupees: i64, quantity: u32) {
    let product = ProductRef::new("42", "Silk Saree", Money::from_rupees(rupees));
    cart.add_to_cart(&product, quantity).await.unwrap();
}

fn address() -> Address {
    Address::inline("Asha", "12 MG Road", "Udupi", "Karnataka", "576101").with_id(7)
}

fn standard_delivery() -> DeliveryOption {
    DeliveryOption::new("standard", "Standard (4-6 days)", Money::zero())
}

/// Walks the flow up to the review step.
async fn advance_to_review(flow: &mut TestFlow, cart: &mut TestCart, method: PaymentMethod) {
    flow.begin(cart).unwrap();
    flow.select_address(address()).await.unwrap();
    flow.select_delivery(standard_delivery(), Some(method))
        .await
        .unwrap();
    flow.submit_payment(PaymentSelection::new(method), cart)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_cod_happy_path_places_order_and_emails() {
    let (mut flow, mut cart, checkout_api, notifier) = setup();
    fill_cart(&mut cart, 999, 1).await;

    advance_to_review(&mut flow, &mut cart, PaymentMethod::Cod).await;
    assert_eq!(flow.step(), CheckoutStep::OrderReview);

    let placed = flow.place_order(&mut cart).await.unwrap();

    assert_eq!(placed.order_id.as_str(), "ORD-0001");
    assert_eq!(flow.step(), CheckoutStep::Completion);
    assert!(cart.cart_lines().is_empty());
    assert_eq!(notifier.email_count(), 1);
    assert_eq!(notifier.whatsapp_count(), 0);

    // Selections were persisted in step order.
    let saved = checkout_api.saved_selections();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].address_id, Some(7));
    assert_eq!(saved[1].delivery_option.as_deref(), Some("standard"));
    assert_eq!(saved[1].payment_method, Some(PaymentMethod::Cod));
}

#[tokio::test]
async fn test_online_payment_sends_whatsapp_with_location() {
    let (mut flow, mut cart, _, notifier) = setup();
    fill_cart(&mut cart, 999, 1).await;
    let point = GeoPoint {
        latitude: 13.34,
        longitude: 74.74,
    };
    flow.set_location(point);

    advance_to_review(&mut flow, &mut cart, PaymentMethod::Upi).await;
    flow.place_order(&mut cart).await.unwrap();

    assert_eq!(notifier.email_count(), 0);
    assert_eq!(notifier.whatsapp_count(), 1);
    assert_eq!(notifier.last_whatsapp_location(), Some(point));
}

#[tokio::test]
async fn test_begin_requires_authentication() {
    let (_, mut cart, checkout_api, notifier) = setup();
    fill_cart(&mut cart, 999, 1).await;

    let mut flow = CheckoutFlow::new(checkout_api, notifier, PricingConfig::default(), None);
    assert!(matches!(
        flow.begin(&cart),
        Err(CheckoutError::NotAuthenticated)
    ));
}

#[tokio::test]
async fn test_begin_refuses_empty_cart() {
    let (mut flow, cart, _, _) = setup();
    assert!(matches!(flow.begin(&cart), Err(CheckoutError::EmptyCart)));
}

#[tokio::test]
async fn test_persisted_address_save_failure_blocks_advancement() {
    let (mut flow, mut cart, checkout_api, _) = setup();
    fill_cart(&mut cart, 999, 1).await;
    flow.begin(&cart).unwrap();
    checkout_api.set_fail_on_save(true);

    let result = flow.select_address(address()).await;

    assert!(matches!(result, Err(CheckoutError::StepFailed { .. })));
    assert_eq!(flow.step(), CheckoutStep::AddressSelection);
    assert!(flow.selection().address.is_none());
}

#[tokio::test]
async fn test_inline_address_advances_without_backend_call() {
    let (mut flow, mut cart, checkout_api, _) = setup();
    fill_cart(&mut cart, 999, 1).await;
    flow.begin(&cart).unwrap();
    checkout_api.set_fail_on_save(true);

    // No persisted id, so no selection call is made and the failing
    // backend is never consulted.
    let inline = Address::inline("Asha", "12 MG Road", "Udupi", "Karnataka", "576101");
    flow.select_address(inline).await.unwrap();

    assert_eq!(flow.step(), CheckoutStep::DeliveryAndPayment);
    assert!(checkout_api.saved_selections().is_empty());
}

#[tokio::test]
async fn test_delivery_save_failure_blocks_advancement() {
    let (mut flow, mut cart, checkout_api, _) = setup();
    fill_cart(&mut cart, 999, 1).await;
    flow.begin(&cart).unwrap();
    flow.select_address(address()).await.unwrap();
    checkout_api.set_fail_on_save(true);

    let result = flow
        .select_delivery(standard_delivery(), Some(PaymentMethod::Cod))
        .await;

    assert!(matches!(result, Err(CheckoutError::StepFailed { .. })));
    assert_eq!(flow.step(), CheckoutStep::DeliveryAndPayment);
}

#[tokio::test]
async fn test_review_fetch_failure_blocks_payment_step() {
    let (mut flow, mut cart, checkout_api, _) = setup();
    fill_cart(&mut cart, 999, 1).await;
    flow.begin(&cart).unwrap();
    flow.select_address(address()).await.unwrap();
    flow.select_delivery(standard_delivery(), Some(PaymentMethod::Cod))
        .await
        .unwrap();
    checkout_api.set_fail_on_review(true);

    let result = flow
        .submit_payment(PaymentSelection::new(PaymentMethod::Cod), &mut cart)
        .await;

    assert!(matches!(result, Err(CheckoutError::StepFailed { .. })));
    assert_eq!(flow.step(), CheckoutStep::PaymentMethod);
    assert!(!cart.cart_lines().is_empty());
}

#[tokio::test]
async fn test_skip_review_goes_straight_to_completion() {
    let (mut flow, mut cart, checkout_api, _) = setup();
    fill_cart(&mut cart, 999, 1).await;
    flow.begin(&cart).unwrap();
    flow.select_address(address()).await.unwrap();
    flow.select_delivery(standard_delivery(), Some(PaymentMethod::Card))
        .await
        .unwrap();

    let confirmed = PaymentSelection::new(PaymentMethod::Card).with_confirmed_payment("pay_9xK2");
    flow.submit_payment(confirmed, &mut cart).await.unwrap();

    assert_eq!(flow.step(), CheckoutStep::Completion);
    // The review snapshot is never fetched or displayed.
    assert_eq!(checkout_api.review_call_count(), 0);
    assert!(flow.review_snapshot().is_none());
    // The cart cleared on the skip transition.
    assert!(cart.cart_lines().is_empty());

    // Items added afterwards stay; nothing clears the cart a second
    // time on the completion step.
    fill_cart(&mut cart, 100, 1).await;
    assert_eq!(cart.cart_lines().len(), 1);
}

#[tokio::test]
async fn test_placement_failure_keeps_flow_on_review_for_retry() {
    let (mut flow, mut cart, checkout_api, notifier) = setup();
    fill_cart(&mut cart, 999, 1).await;
    advance_to_review(&mut flow, &mut cart, PaymentMethod::Cod).await;
    checkout_api.set_fail_on_place(true);

    let result = flow.place_order(&mut cart).await;

    assert!(matches!(result, Err(CheckoutError::PlacementFailed(_))));
    assert_eq!(flow.step(), CheckoutStep::OrderReview);
    assert!(!cart.cart_lines().is_empty());
    assert_eq!(notifier.email_count(), 0);

    // Retry succeeds once the backend recovers.
    checkout_api.set_fail_on_place(false);
    let placed = flow.place_order(&mut cart).await.unwrap();
    assert_eq!(placed.order_id.as_str(), "ORD-0001");
    assert_eq!(flow.step(), CheckoutStep::Completion);
}

#[tokio::test]
async fn test_placement_with_empty_cart_fails_before_any_network_call() {
    let (mut flow, mut cart, checkout_api, _) = setup();
    fill_cart(&mut cart, 999, 1).await;
    advance_to_review(&mut flow, &mut cart, PaymentMethod::Cod).await;
    cart.clear_cart().unwrap();

    let result = flow.place_order(&mut cart).await;

    assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    assert_eq!(checkout_api.place_call_count(), 0);
}

#[tokio::test]
async fn test_placement_without_identity_fails_before_any_network_call() {
    let checkout_api = InMemoryCheckoutService::new();
    let mut flow = CheckoutFlow::new(
        checkout_api.clone(),
        InMemoryNotificationService::new(),
        PricingConfig::default(),
        None,
    );
    let mut cart = CartStore::new(
        InMemoryCartService::new(),
        InMemoryWishlistService::new(),
        InMemoryStore::new(),
    );
    fill_cart(&mut cart, 999, 1).await;

    let result = flow.place_order(&mut cart).await;

    assert!(matches!(result, Err(CheckoutError::NotAuthenticated)));
    assert_eq!(checkout_api.place_call_count(), 0);
}

#[tokio::test]
async fn test_notification_failure_does_not_fail_placement() {
    let (mut flow, mut cart, _, notifier) = setup();
    fill_cart(&mut cart, 999, 1).await;
    advance_to_review(&mut flow, &mut cart, PaymentMethod::Cod).await;
    notifier.set_fail_on_email(true);

    let placed = flow.place_order(&mut cart).await.unwrap();

    assert_eq!(placed.order_id.as_str(), "ORD-0001");
    assert_eq!(flow.step(), CheckoutStep::Completion);
    assert!(cart.cart_lines().is_empty());
}

#[tokio::test]
async fn test_held_review_snapshot_is_not_refetched_at_placement() {
    let (mut flow, mut cart, checkout_api, _) = setup();
    fill_cart(&mut cart, 999, 1).await;
    checkout_api.seed_review(
        &identity(),
        ReviewSnapshot {
            address: Some(address()),
            totals: Totals::zero(),
        },
    );
    advance_to_review(&mut flow, &mut cart, PaymentMethod::Cod).await;
    assert_eq!(checkout_api.review_call_count(), 1);

    // A review outage after the snapshot is held must not matter.
    checkout_api.set_fail_on_review(true);
    flow.place_order(&mut cart).await.unwrap();

    assert_eq!(checkout_api.review_call_count(), 1);
}

#[tokio::test]
async fn test_go_back_is_free_then_forward_replays_the_step() {
    let (mut flow, mut cart, _, _) = setup();
    fill_cart(&mut cart, 999, 1).await;
    flow.begin(&cart).unwrap();
    flow.select_address(address()).await.unwrap();
    flow.select_delivery(standard_delivery(), Some(PaymentMethod::Cod))
        .await
        .unwrap();

    flow.go_back(CheckoutStep::AddressSelection).unwrap();
    assert_eq!(flow.step(), CheckoutStep::AddressSelection);

    // Forward again through the same steps.
    flow.select_address(address()).await.unwrap();
    assert_eq!(flow.step(), CheckoutStep::DeliveryAndPayment);

    // Forward jumps through go_back are rejected.
    assert!(matches!(
        flow.go_back(CheckoutStep::OrderReview),
        Err(CheckoutError::InvalidTransition(_))
    ));
}

#[tokio::test]
async fn test_coupon_auto_applies_at_threshold_only() {
    let (mut flow, mut cart, _, _) = setup();
    fill_cart(&mut cart, 1498, 1).await;

    let below = flow.totals(&cart);
    assert_eq!(flow.applied_coupon(), None);
    assert_eq!(below.discount, Money::zero());

    // Push the subtotal to exactly 1499.
    let blouse = ProductRef::new("43", "Blouse Piece", Money::from_rupees(1));
    cart.add_to_cart(&blouse, 1).await.unwrap();
    let at = flow.totals(&cart);
    assert_eq!(flow.applied_coupon(), Some("FLAT10"));
    assert_eq!(at.discount, Money::from_paise(14990));
}

#[tokio::test]
async fn test_cleared_coupon_does_not_reapply() {
    let (mut flow, mut cart, _, _) = setup();
    fill_cart(&mut cart, 1499, 1).await;

    flow.totals(&cart);
    assert_eq!(flow.applied_coupon(), Some("FLAT10"));

    flow.clear_coupon();
    let totals = flow.totals(&cart);

    assert_eq!(flow.applied_coupon(), None);
    assert_eq!(totals.discount, Money::zero());
}

#[tokio::test]
async fn test_totals_use_selected_delivery_price() {
    let (mut flow, mut cart, _, _) = setup();
    fill_cart(&mut cart, 300, 1).await;
    flow.begin(&cart).unwrap();
    flow.select_address(address()).await.unwrap();
    flow.select_delivery(
        DeliveryOption::new("express", "Express (1-2 days)", Money::from_rupees(99)),
        Some(PaymentMethod::Cod),
    )
    .await
    .unwrap();

    let totals = flow.totals(&cart);
    assert_eq!(totals.shipping, Money::from_rupees(99));
    assert_eq!(totals.total, Money::from_rupees(399));
}

#[tokio::test]
async fn test_totals_fall_back_to_threshold_rule_without_delivery() {
    let (mut flow, mut cart, _, _) = setup();
    fill_cart(&mut cart, 300, 1).await;

    let totals = flow.totals(&cart);
    assert_eq!(totals.shipping, Money::from_rupees(49));
    assert_eq!(totals.total, Money::from_rupees(349));
}
