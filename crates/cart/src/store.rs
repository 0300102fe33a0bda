//! The cart store.
//!
//! Holds the three line collections (cart, saved-for-later, wishlist)
//! and keeps them consistent between an anonymous local-only mode and
//! an authenticated server-synced mode. All mutations run on the UI
//! event loop, so the store is a plain `&mut self` object; suspension
//! points are network calls only.

use chrono::Utc;
use common::{CustomerEmail, LineId, Money, ProductId};
use domain::{CartLine, ProductRef, SavedLine, WishlistLine};
use storage::{KeyValueStore, KeyValueStoreExt, keys};

use crate::error::Result;
use crate::notice::Notice;
use crate::services::{AddItemRequest, RemoteCartService, WishlistService};

/// Outcome of a mutation whose remote reconciliation is best-effort.
///
/// Local state is already mutated when this is returned; `Desynced`
/// means the remote call failed and the server copy now lags until the
/// next cart load replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Local and remote state agree.
    Synced,

    /// Anonymous session; there is no remote state.
    LocalOnly,

    /// The remote call failed; local state was kept.
    Desynced,
}

impl SyncOutcome {
    /// Returns true if the remote copy may lag the local one.
    pub fn is_desynced(&self) -> bool {
        matches!(self, SyncOutcome::Desynced)
    }
}

/// Process-wide client cart state for one session.
///
/// Owns the cart, saved-for-later and wishlist collections; every
/// mutation re-serializes the affected collection to the local store
/// so state survives a reload even for anonymous sessions.
pub struct CartStore<C, W, S> {
    identity: Option<CustomerEmail>,
    cart: Vec<CartLine>,
    saved: Vec<SavedLine>,
    wishlist: Vec<WishlistLine>,
    notices: Vec<Notice>,
    cart_api: C,
    wishlist_api: W,
    storage: S,
}

impl<C, W, S> CartStore<C, W, S>
where
    C: RemoteCartService,
    W: WishlistService,
    S: KeyValueStore,
{
    /// Creates an empty, anonymous store.
    ///
    /// Call [`reset`](Self::reset) to run the initialization protocol.
    pub fn new(cart_api: C, wishlist_api: W, storage: S) -> Self {
        Self {
            identity: None,
            cart: Vec::new(),
            saved: Vec::new(),
            wishlist: Vec::new(),
            notices: Vec::new(),
            cart_api,
            wishlist_api,
            storage,
        }
    }

    /// Re-initializes the store for an identity.
    ///
    /// Runs once per identity change, including transitions to and
    /// from anonymous. Saved-for-later and wishlist load from local
    /// storage unconditionally; the cart loads from the remote service
    /// when authenticated (falling back to stale local state on
    /// failure) or from local storage when anonymous. An authenticated
    /// wishlist refresh replaces the local copy on success and is
    /// silent on failure.
    #[tracing::instrument(skip(self), fields(identity = ?identity))]
    pub async fn reset(&mut self, identity: Option<CustomerEmail>) -> Result<()> {
        self.identity = identity;

        self.saved = self.storage.load_json(keys::SAVED_ITEMS)?.unwrap_or_default();
        self.wishlist = self.storage.load_json(keys::WISHLIST)?.unwrap_or_default();

        match &self.identity {
            Some(identity) => match self.cart_api.fetch(identity).await {
                Ok(lines) => {
                    self.cart = lines
                        .into_iter()
                        .map(|line| CartLine {
                            line_id: LineId::from(line.product_id.as_str()),
                            product_id: line.product_id,
                            variant_id: None,
                            variant_name: None,
                            name: line.name,
                            unit_price: line.price,
                            original_unit_price: line.original_price.unwrap_or(line.price),
                            quantity: line.quantity,
                            image: line.image_url,
                            category: None,
                            brand: None,
                        })
                        .collect();
                    self.persist_cart()?;
                }
                Err(error) => {
                    tracing::warn!(%error, "remote cart unavailable, falling back to local state");
                    self.cart = self.storage.load_json(keys::CART)?.unwrap_or_default();
                }
            },
            None => {
                self.cart = self.storage.load_json(keys::CART)?.unwrap_or_default();
            }
        }

        if let Some(identity) = self.identity.clone() {
            match self.wishlist_api.fetch(&identity).await {
                Ok(entries) => {
                    self.wishlist = entries
                        .into_iter()
                        .map(|entry| WishlistLine {
                            product_id: entry.product_id,
                            name: entry.product_name,
                            image: entry.product_image,
                            price: entry.product_price,
                            original_price: entry.product_price,
                            in_stock: entry.in_stock,
                            stock_quantity: entry.stock_quantity,
                            category: entry.category,
                            brand: entry.brand,
                            added_at: entry.created_at.unwrap_or_else(Utc::now),
                        })
                        .collect();
                    self.persist_wishlist()?;
                }
                Err(error) => {
                    tracing::debug!(%error, "wishlist refresh failed, keeping local entries");
                }
            }
        }

        Ok(())
    }

    /// Adds a product (or product variant) to the cart.
    ///
    /// Repeated adds of the same product+variant sum into one line.
    /// When the product carries a stock figure, the resulting quantity
    /// is clamped to it; a clamp or an out-of-stock product surfaces
    /// as a notice, not an error. On the authenticated path the remote
    /// add runs first and a failure leaves local state untouched.
    #[tracing::instrument(skip(self, product), fields(product_id = %product.product_id))]
    pub async fn add_to_cart(&mut self, product: &ProductRef, quantity: u32) -> Result<()> {
        let requested = quantity.max(1);
        let line_id = LineId::for_product(&product.product_id, product.variant_id.as_ref());

        if let Some(stock) = product.stock
            && stock == 0
        {
            self.notices.push(Notice::OutOfStock);
            return Ok(());
        }

        let existing = self
            .cart
            .iter()
            .find(|line| line.line_id == line_id)
            .map(|line| line.quantity)
            .unwrap_or(0);

        // Clamp existing + requested to the available stock.
        let effective = match product.stock {
            Some(stock) => {
                let allowed = stock.saturating_sub(existing);
                if allowed == 0 {
                    self.notices.push(Notice::StockLimitExceeded);
                    return Ok(());
                }
                if requested > allowed {
                    self.notices.push(Notice::StockLimitExceeded);
                }
                requested.min(allowed)
            }
            None => requested,
        };

        if let Some(identity) = self.identity.clone() {
            let response = match self
                .cart_api
                .add(
                    &identity,
                    AddItemRequest {
                        line_id: line_id.clone(),
                        quantity: effective,
                    },
                )
                .await
            {
                Ok(response) => response,
                Err(error) => {
                    metrics::counter!("cart_add_failures_total").increment(1);
                    self.notices.push(Notice::CartAddFailed {
                        reason: error.to_string(),
                    });
                    return Err(error);
                }
            };

            match self.cart.iter_mut().find(|line| line.line_id == line_id) {
                Some(line) => {
                    // The server-accumulated quantity is authoritative.
                    line.quantity = response.quantity;
                    line.unit_price = product.price;
                    line.original_unit_price = product
                        .original_price
                        .or(response.original_price)
                        .unwrap_or(response.price);
                    if product.image.is_some() {
                        line.image = product.image.clone();
                    } else if response.image_url.is_some() {
                        line.image = response.image_url;
                    }
                    self.notices.push(Notice::CartQuantityUpdated {
                        name: product.name.clone(),
                    });
                }
                None => {
                    let mut line = CartLine::from_product(product, effective);
                    if line.image.is_none() {
                        line.image = response.image_url;
                    }
                    if product.original_price.is_none()
                        && let Some(original) = response.original_price
                    {
                        line.original_unit_price = original;
                    }
                    self.cart.push(line);
                    self.notices.push(Notice::AddedToCart {
                        name: product.name.clone(),
                    });
                }
            }
        } else {
            match self.cart.iter_mut().find(|line| line.line_id == line_id) {
                Some(line) => {
                    line.quantity = existing + effective;
                    self.notices.push(Notice::CartQuantityUpdated {
                        name: product.name.clone(),
                    });
                }
                None => {
                    self.cart.push(CartLine::from_product(product, effective));
                    self.notices.push(Notice::AddedToCart {
                        name: product.name.clone(),
                    });
                }
            }
        }

        metrics::counter!("cart_adds_total").increment(1);
        self.persist_cart()
    }

    /// Sets a cart line's quantity.
    ///
    /// A quantity of zero or less removes the line. The local state
    /// mutates immediately; for authenticated users the remote update
    /// is best-effort and a failure is reported as
    /// [`SyncOutcome::Desynced`] without rolling back.
    pub async fn update_quantity(
        &mut self,
        line_id: &LineId,
        new_quantity: i64,
    ) -> Result<SyncOutcome> {
        if new_quantity <= 0 {
            return self.remove_from_cart(line_id).await;
        }
        let quantity = u32::try_from(new_quantity).unwrap_or(u32::MAX);

        if let Some(line) = self.cart.iter_mut().find(|line| &line.line_id == line_id) {
            line.quantity = quantity;
        }
        self.persist_cart()?;

        match &self.identity {
            Some(identity) => match self.cart_api.update(identity, line_id, quantity).await {
                Ok(()) => Ok(SyncOutcome::Synced),
                Err(error) => {
                    tracing::warn!(%line_id, %error, "remote quantity update failed");
                    Ok(SyncOutcome::Desynced)
                }
            },
            None => Ok(SyncOutcome::LocalOnly),
        }
    }

    /// Removes a cart line.
    ///
    /// Local removal is immediate; the authenticated remote removal is
    /// best-effort, as with [`update_quantity`](Self::update_quantity).
    pub async fn remove_from_cart(&mut self, line_id: &LineId) -> Result<SyncOutcome> {
        self.cart.retain(|line| &line.line_id != line_id);
        self.persist_cart()?;

        match &self.identity {
            Some(identity) => match self.cart_api.remove(identity, line_id).await {
                Ok(()) => Ok(SyncOutcome::Synced),
                Err(error) => {
                    tracing::warn!(%line_id, %error, "remote removal failed");
                    Ok(SyncOutcome::Desynced)
                }
            },
            None => Ok(SyncOutcome::LocalOnly),
        }
    }

    /// Moves a cart line to the saved-for-later collection.
    ///
    /// Saved-for-later is a client-only concept; the transfer touches
    /// no remote endpoint and fixes the saved quantity at 1.
    pub fn save_for_later(&mut self, line_id: &LineId) -> Result<()> {
        let Some(index) = self.cart.iter().position(|line| &line.line_id == line_id) else {
            return Ok(());
        };
        let line = self.cart.remove(index);
        self.saved.push(SavedLine::from(line));
        self.persist_cart()?;
        self.persist_saved()
    }

    /// Moves a saved line back into the cart with quantity 1, merging
    /// into an existing line for the same product+variant.
    pub fn move_to_cart(&mut self, line_id: &LineId) -> Result<()> {
        let Some(index) = self.saved.iter().position(|s| s.line_id() == line_id) else {
            return Ok(());
        };
        let line = self.saved.remove(index).into_cart_line();

        match self.cart.iter_mut().find(|l| &l.line_id == line_id) {
            Some(existing) => existing.quantity += 1,
            None => self.cart.push(line),
        }
        self.persist_cart()?;
        self.persist_saved()
    }

    /// Deletes a saved-for-later line.
    pub fn remove_from_saved(&mut self, line_id: &LineId) -> Result<()> {
        self.saved.retain(|s| s.line_id() != line_id);
        self.persist_saved()
    }

    /// Adds a product to the wishlist.
    ///
    /// Toggled, not duplicated: a product already present surfaces an
    /// "already in wishlist" notice and changes nothing. On the
    /// authenticated path the remote add runs first and a failure
    /// aborts the local mutation.
    pub async fn add_to_wishlist(&mut self, product: &ProductRef) -> Result<()> {
        if self.is_in_wishlist(&product.product_id) {
            self.notices.push(Notice::AlreadyInWishlist {
                name: product.name.clone(),
            });
            return Ok(());
        }

        if let Some(identity) = self.identity.clone()
            && let Err(error) = self.wishlist_api.add(&identity, &product.product_id).await
        {
            self.notices.push(Notice::WishlistAddFailed {
                reason: error.to_string(),
            });
            return Err(error);
        }

        self.wishlist
            .push(WishlistLine::from_product(product, Utc::now()));
        self.notices.push(Notice::AddedToWishlist {
            name: product.name.clone(),
        });
        self.persist_wishlist()
    }

    /// Removes a product from the wishlist.
    ///
    /// The remote removal is best-effort and its failure is surfaced
    /// as a notice, but the local entry is removed regardless.
    pub async fn remove_from_wishlist(&mut self, product_id: &ProductId) -> Result<SyncOutcome> {
        let outcome = match self.identity.clone() {
            Some(identity) => match self.wishlist_api.remove(&identity, product_id).await {
                Ok(()) => SyncOutcome::Synced,
                Err(error) => {
                    self.notices.push(Notice::WishlistRemoveFailed {
                        reason: error.to_string(),
                    });
                    SyncOutcome::Desynced
                }
            },
            None => SyncOutcome::LocalOnly,
        };

        if let Some(entry) = self
            .wishlist
            .iter()
            .find(|entry| &entry.product_id == product_id)
        {
            self.notices.push(Notice::RemovedFromWishlist {
                name: entry.name.clone(),
            });
        }
        self.wishlist.retain(|entry| &entry.product_id != product_id);
        self.persist_wishlist()?;
        Ok(outcome)
    }

    /// Returns true if the product is on the wishlist.
    pub fn is_in_wishlist(&self, product_id: &ProductId) -> bool {
        self.wishlist
            .iter()
            .any(|entry| &entry.product_id == product_id)
    }

    /// Empties the cart. Local-only; the server cart is cleared by the
    /// backend during order placement.
    pub fn clear_cart(&mut self) -> Result<()> {
        self.cart.clear();
        self.persist_cart()
    }

    /// Sum of unit price × quantity over all cart lines.
    pub fn cart_total(&self) -> Money {
        self.cart.iter().map(CartLine::line_total).sum()
    }

    /// Total quantity across all cart lines.
    pub fn cart_item_count(&self) -> u32 {
        self.cart.iter().map(|line| line.quantity).sum()
    }

    /// The cart lines.
    pub fn cart_lines(&self) -> &[CartLine] {
        &self.cart
    }

    /// The saved-for-later lines.
    pub fn saved_lines(&self) -> &[SavedLine] {
        &self.saved
    }

    /// The wishlist entries.
    pub fn wishlist_lines(&self) -> &[WishlistLine] {
        &self.wishlist
    }

    /// The current identity, if authenticated.
    pub fn identity(&self) -> Option<&CustomerEmail> {
        self.identity.as_ref()
    }

    /// Returns true when an identity is present.
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Drains the queued user notifications.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn persist_cart(&self) -> Result<()> {
        self.storage.store_json(keys::CART, &self.cart)?;
        Ok(())
    }

    fn persist_saved(&self) -> Result<()> {
        self.storage.store_json(keys::SAVED_ITEMS, &self.saved)?;
        Ok(())
    }

    fn persist_wishlist(&self) -> Result<()> {
        self.storage.store_json(keys::WISHLIST, &self.wishlist)?;
        Ok(())
    }
}
