//! Remote checkout and notification service clients.

pub mod checkout;
pub mod notify;

pub use cart::ApiConfig;
pub use checkout::{
    CheckoutService, HttpCheckoutService, InMemoryCheckoutService, PlacedOrder, ReviewSnapshot,
    SelectionUpdate,
};
pub use notify::{HttpNotificationService, InMemoryNotificationService, NotificationService};
