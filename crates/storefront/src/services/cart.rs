//! Cart reconciliation.
//!
//! [`CartManager`] keeps one in-memory line collection for the current
//! visitor and mirrors it to the cart row store. Mutations are optimistic:
//! the in-memory lines change first, then the whole collection is upserted.
//! A failed upsert is reported as a notice and never rolled back.
//!
//! Loading is fail-soft. If the row store cannot be read the previous lines
//! are kept and the visitor is not told.
//!
//! When the identity changes, [`CartManager::load`] fetches the row for the
//! new owner and replaces the in-memory lines. Guest lines are not merged
//! into the user's cart.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;
use tracing::instrument;

use fitment_forge_core::{
    CartLine, CartLineError, CartOwner, CurrencyCode, GuestSessionId, Price, ProductId, UserId,
};

use crate::db::CartStore;
use crate::local_cache::LocalCache;
use crate::models::session_keys;
use crate::notice::{Notice, Notifier};

/// Whether the last persist attempt reached the row store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    #[default]
    Idle,
    Syncing,
    SyncFailed,
}

/// Errors from cart mutations that are rejected before touching state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    #[error(transparent)]
    InvalidLine(#[from] CartLineError),

    #[error("quantity {0} is too large")]
    QuantityTooLarge(i64),

    #[error("cart total is too large")]
    TotalOverflow,
}

/// Published view of the cart after each load or mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSnapshot {
    pub owner: Option<CartOwner>,
    pub lines: Vec<CartLine>,
    pub total_quantity: u64,
    pub total_price: Price,
    pub sync_status: SyncStatus,
}

impl Default for CartSnapshot {
    fn default() -> Self {
        Self {
            owner: None,
            lines: Vec::new(),
            total_quantity: 0,
            total_price: Price::zero(),
            sync_status: SyncStatus::Idle,
        }
    }
}

/// Sum of `price × quantity` over `lines`, or `None` if it overflows.
#[must_use]
pub fn checked_total_price(lines: &[CartLine]) -> Option<Price> {
    lines
        .iter()
        .try_fold(Price::zero(), |acc, line| acc.checked_add(line.line_total()?))
}

/// Sum of `price × quantity` over `lines`.
///
/// Mutations refuse carts whose total overflows, so only a row written
/// elsewhere can get here with one. Such a total saturates at
/// [`Decimal::MAX`].
#[must_use]
pub fn total_price(lines: &[CartLine]) -> Price {
    checked_total_price(lines).unwrap_or(Price::new(Decimal::MAX, CurrencyCode::USD))
}

/// Accept `lines` only if their total is representable.
fn within_total(lines: Vec<CartLine>) -> Result<Vec<CartLine>, CartError> {
    checked_total_price(&lines).ok_or(CartError::TotalOverflow)?;
    Ok(lines)
}

/// Sum of quantities over `lines`.
#[must_use]
pub fn total_quantity(lines: &[CartLine]) -> u64 {
    lines.iter().map(|line| u64::from(line.quantity)).sum()
}

/// The visitor's cart, reconciled against the row store.
pub struct CartManager {
    store: Arc<dyn CartStore>,
    cache: Arc<dyn LocalCache>,
    identity: watch::Receiver<Option<UserId>>,
    notifier: Arc<dyn Notifier>,
    owner: Option<CartOwner>,
    lines: Vec<CartLine>,
    sync_status: SyncStatus,
    loading: bool,
    snapshot: watch::Sender<CartSnapshot>,
}

impl CartManager {
    /// Create a manager with no lines. Call [`load`](Self::load) to fetch
    /// the stored cart.
    #[must_use]
    pub fn new(
        store: Arc<dyn CartStore>,
        cache: Arc<dyn LocalCache>,
        identity: watch::Receiver<Option<UserId>>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (snapshot, _rx) = watch::channel(CartSnapshot::default());
        Self {
            store,
            cache,
            identity,
            notifier,
            owner: None,
            lines: Vec::new(),
            sync_status: SyncStatus::Idle,
            loading: false,
            snapshot,
        }
    }

    /// Current lines.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The owner resolved by the last load or persist.
    #[must_use]
    pub const fn owner(&self) -> Option<CartOwner> {
        self.owner
    }

    #[must_use]
    pub const fn sync_status(&self) -> SyncStatus {
        self.sync_status
    }

    /// Whether a load is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn total_price(&self) -> Price {
        total_price(&self.lines)
    }

    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        total_quantity(&self.lines)
    }

    /// Subscribe to snapshots published after every load and mutation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.snapshot.subscribe()
    }

    /// The current state as a snapshot.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            owner: self.owner,
            lines: self.lines.clone(),
            total_quantity: self.total_quantity(),
            total_price: self.total_price(),
            sync_status: self.sync_status,
        }
    }

    fn publish(&self) {
        self.snapshot.send_replace(self.snapshot());
    }

    /// Work out who owns the cart right now.
    ///
    /// A signed-in user owns their own cart. Otherwise the guest token is
    /// read from the local cache, and only generated (and cached) when none
    /// is stored yet.
    pub async fn resolve_identity(&mut self) -> CartOwner {
        let current = *self.identity.borrow_and_update();
        let owner = match current {
            Some(user_id) => CartOwner::User(user_id),
            None => CartOwner::Guest(self.guest_token().await),
        };
        self.owner = Some(owner);
        owner
    }

    async fn guest_token(&self) -> GuestSessionId {
        match self.cache.get(session_keys::CART_SESSION_ID).await {
            Ok(Some(raw)) => match raw.parse::<GuestSessionId>() {
                Ok(token) => return token,
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding unreadable guest cart token");
                }
            },
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read guest cart token");
                // Keep the token we already hold rather than minting another.
                if let Some(CartOwner::Guest(token)) = self.owner {
                    return token;
                }
            }
        }

        let token = GuestSessionId::generate();
        if let Err(e) = self
            .cache
            .set(session_keys::CART_SESSION_ID, token.to_string())
            .await
        {
            tracing::warn!(error = %e, "Failed to cache guest cart token");
        }
        token
    }

    /// Fetch the cart for the current identity, replacing the in-memory
    /// lines.
    ///
    /// A missing row means an empty cart. Store errors are logged and the
    /// previous lines are kept.
    #[instrument(skip(self))]
    pub async fn load(&mut self) {
        self.loading = true;
        let owner = self.resolve_identity().await;

        match self.store.get(&owner).await {
            Ok(Some(cart)) => self.lines = cart.lines,
            Ok(None) => self.lines.clear(),
            Err(e) => {
                tracing::warn!(%owner, error = %e, "Failed to load cart");
            }
        }

        self.loading = false;
        self.publish();
    }

    /// Re-load every time the identity changes. Returns once the identity
    /// sender is gone.
    pub async fn follow_identity(&mut self) {
        while self.identity.changed().await.is_ok() {
            self.load().await;
        }
    }

    /// Add `quantity` of a product, merging into an existing line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is invalid (empty product ID, zero
    /// quantity, negative price), if the merged quantity no longer fits in
    /// a `u32`, or if the cart total would overflow. Nothing is changed in
    /// that case.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_line(
        &mut self,
        product_id: ProductId,
        quantity: u32,
        price: Decimal,
    ) -> Result<(), CartError> {
        let line = CartLine::new(product_id, quantity, price)?;

        let mut lines = self.lines.clone();
        match lines
            .iter_mut()
            .find(|existing| existing.product_id == line.product_id)
        {
            Some(existing) => {
                let current = existing.quantity;
                existing.quantity = current.checked_add(quantity).ok_or(
                    CartError::QuantityTooLarge(i64::from(current) + i64::from(quantity)),
                )?;
            }
            None => lines.push(line),
        }
        self.lines = within_total(lines)?;

        self.persist().await;
        self.notifier.notify(Notice::info(
            "Added to cart",
            "Item has been added to your cart.",
        ));
        Ok(())
    }

    /// Set a line's quantity exactly. Zero or less removes the line.
    ///
    /// A product with no line is left absent; the cart is still persisted.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::QuantityTooLarge`] for quantities beyond `u32`
    /// and [`CartError::TotalOverflow`] if the cart total would overflow.
    /// Nothing is changed in either case.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn update_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<(), CartError> {
        if quantity <= 0 {
            self.remove_line(product_id).await;
            return Ok(());
        }
        let quantity = u32::try_from(quantity).map_err(|_| CartError::QuantityTooLarge(quantity))?;

        let mut lines = self.lines.clone();
        for line in lines
            .iter_mut()
            .filter(|line| &line.product_id == product_id)
        {
            line.quantity = quantity;
        }
        self.lines = within_total(lines)?;

        self.persist().await;
        Ok(())
    }

    /// Drop a product's line, if present.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_line(&mut self, product_id: &ProductId) {
        self.lines.retain(|line| &line.product_id != product_id);
        self.persist().await;
        self.notifier.notify(Notice::info(
            "Removed from cart",
            "Item has been removed from your cart.",
        ));
    }

    /// Empty the cart.
    #[instrument(skip(self))]
    pub async fn clear(&mut self) {
        self.lines.clear();
        self.persist().await;
    }

    /// Upsert the current lines for the current owner.
    ///
    /// On failure the lines are kept, the status becomes
    /// [`SyncStatus::SyncFailed`] and a destructive notice is raised.
    pub async fn persist(&mut self) {
        let owner = match self.owner {
            Some(owner) => owner,
            None => self.resolve_identity().await,
        };

        self.sync_status = SyncStatus::Syncing;
        self.publish();

        match self.store.upsert(&owner, &self.lines, Utc::now()).await {
            Ok(()) => {
                self.sync_status = SyncStatus::Idle;
                tracing::debug!(%owner, lines = self.lines.len(), "Cart saved");
            }
            Err(e) => {
                self.sync_status = SyncStatus::SyncFailed;
                tracing::error!(%owner, error = %e, "Failed to save cart");
                self.notifier.notify(Notice::destructive(
                    "Cart sync failed",
                    "Your cart changes may not be saved.",
                ));
            }
        }

        self.publish();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;
    use crate::db::memory::MemoryCartStore;
    use crate::identity::IdentitySignal;
    use crate::local_cache::MemoryCache;
    use crate::notice::{NoticeBuffer, NoticeVariant};

    struct Harness {
        store: Arc<MemoryCartStore>,
        cache: Arc<MemoryCache>,
        identity: IdentitySignal,
        notices: Arc<NoticeBuffer>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                store: Arc::new(MemoryCartStore::default()),
                cache: Arc::new(MemoryCache::new()),
                identity: IdentitySignal::default(),
                notices: Arc::new(NoticeBuffer::new()),
            }
        }

        fn manager(&self) -> CartManager {
            CartManager::new(
                self.store.clone(),
                self.cache.clone(),
                self.identity.subscribe(),
                self.notices.clone(),
            )
        }
    }

    fn price(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    #[tokio::test]
    async fn test_add_same_product_twice_merges() {
        let h = Harness::new();
        let mut cart = h.manager();
        cart.load().await;

        cart.add_line("p".into(), 2, price(500)).await.unwrap();
        cart.add_line("p".into(), 3, price(500)).await.unwrap();

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines().first().unwrap().quantity, 5);
        assert_eq!(cart.total_quantity(), 5);
        assert_eq!(cart.total_price().amount, price(2500));
    }

    #[tokio::test]
    async fn test_add_line_notifies_success() {
        let h = Harness::new();
        let mut cart = h.manager();
        cart.add_line("p".into(), 1, price(100)).await.unwrap();

        let notices = h.notices.drain();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices.first().unwrap().title, "Added to cart");
    }

    #[tokio::test]
    async fn test_invalid_line_is_rejected_without_change() {
        let h = Harness::new();
        let mut cart = h.manager();
        let err = cart.add_line("p".into(), 0, price(100)).await.unwrap_err();
        assert_eq!(err, CartError::InvalidLine(CartLineError::ZeroQuantity));
        assert!(cart.lines().is_empty());
        assert!(h.store.is_empty().await);
        assert!(h.notices.drain().is_empty());
    }

    #[tokio::test]
    async fn test_update_quantity_sets_exactly() {
        let h = Harness::new();
        let mut cart = h.manager();
        cart.add_line("p".into(), 2, price(100)).await.unwrap();
        cart.update_quantity(&"p".into(), 7).await.unwrap();
        assert_eq!(cart.lines().first().unwrap().quantity, 7);
    }

    #[tokio::test]
    async fn test_update_quantity_zero_removes() {
        let h = Harness::new();
        let mut cart = h.manager();
        cart.add_line("p".into(), 2, price(100)).await.unwrap();
        cart.add_line("q".into(), 1, price(100)).await.unwrap();
        h.notices.drain();

        cart.update_quantity(&"p".into(), 0).await.unwrap();

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines().first().unwrap().product_id.as_str(), "q");
        let notices = h.notices.drain();
        assert_eq!(notices.first().unwrap().title, "Removed from cart");
    }

    #[tokio::test]
    async fn test_update_quantity_negative_removes() {
        let h = Harness::new();
        let mut cart = h.manager();
        cart.add_line("p".into(), 2, price(100)).await.unwrap();
        cart.update_quantity(&"p".into(), -4).await.unwrap();
        assert!(cart.lines().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_product_adds_nothing() {
        let h = Harness::new();
        let mut cart = h.manager();
        cart.add_line("x".into(), 1, price(100)).await.unwrap();
        cart.update_quantity(&"y".into(), 3).await.unwrap();
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines().first().unwrap().product_id.as_str(), "x");
    }

    #[tokio::test]
    async fn test_update_quantity_too_large() {
        let h = Harness::new();
        let mut cart = h.manager();
        let too_big = i64::from(u32::MAX) + 1;
        assert_eq!(
            cart.update_quantity(&"p".into(), too_big).await,
            Err(CartError::QuantityTooLarge(too_big))
        );
    }

    #[tokio::test]
    async fn test_overflowing_total_is_rejected_without_change() {
        let h = Harness::new();
        let mut cart = h.manager();

        let err = cart.add_line("p".into(), 2, Decimal::MAX).await.unwrap_err();
        assert_eq!(err, CartError::TotalOverflow);
        assert!(cart.lines().is_empty());
        assert!(h.store.is_empty().await);
        assert!(h.notices.drain().is_empty());

        cart.add_line("p".into(), 1, Decimal::MAX).await.unwrap();
        h.notices.drain();
        assert_eq!(
            cart.add_line("q".into(), 1, Decimal::ONE).await,
            Err(CartError::TotalOverflow)
        );
        assert_eq!(
            cart.update_quantity(&"p".into(), 3).await,
            Err(CartError::TotalOverflow)
        );
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines().first().unwrap().quantity, 1);
        assert_eq!(cart.total_price().amount, Decimal::MAX);
        assert!(h.notices.drain().is_empty());
    }

    #[tokio::test]
    async fn test_merged_quantity_overflow_is_rejected() {
        let h = Harness::new();
        let mut cart = h.manager();
        cart.add_line("p".into(), u32::MAX, Decimal::ZERO).await.unwrap();

        assert_eq!(
            cart.add_line("p".into(), 1, Decimal::ZERO).await,
            Err(CartError::QuantityTooLarge(i64::from(u32::MAX) + 1))
        );
        assert_eq!(cart.lines().first().unwrap().quantity, u32::MAX);
    }

    #[test]
    fn test_total_price_saturates_for_foreign_rows() {
        let lines = vec![
            CartLine::new("a".into(), 1, Decimal::MAX).unwrap(),
            CartLine::new("b".into(), 1, Decimal::ONE).unwrap(),
        ];
        assert_eq!(checked_total_price(&lines), None);
        assert_eq!(total_price(&lines).amount, Decimal::MAX);
    }

    #[tokio::test]
    async fn test_remove_missing_is_noop_on_lines() {
        let h = Harness::new();
        let mut cart = h.manager();
        cart.add_line("p".into(), 1, price(100)).await.unwrap();
        cart.remove_line(&"nope".into()).await;
        assert_eq!(cart.lines().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_persists_empty_cart() {
        let h = Harness::new();
        let mut cart = h.manager();
        cart.add_line("p".into(), 1, price(100)).await.unwrap();
        cart.clear().await;

        let owner = cart.owner().unwrap();
        let stored = h.store.get(&owner).await.unwrap().unwrap();
        assert!(stored.lines.is_empty());
    }

    #[tokio::test]
    async fn test_guest_token_is_reused() {
        let h = Harness::new();
        let mut first = h.manager();
        first.load().await;
        let mut second = h.manager();
        second.load().await;

        assert!(first.owner().unwrap().is_guest());
        assert_eq!(first.owner(), second.owner());

        let cached = h
            .cache
            .get(session_keys::CART_SESSION_ID)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            first.owner().unwrap().session_id().unwrap().to_string(),
            cached
        );
    }

    #[tokio::test]
    async fn test_garbage_guest_token_is_replaced() {
        let h = Harness::new();
        h.cache
            .set(session_keys::CART_SESSION_ID, "garbage".into())
            .await
            .unwrap();
        let mut cart = h.manager();
        let owner = cart.resolve_identity().await;

        let cached = h
            .cache
            .get(session_keys::CART_SESSION_ID)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(owner.session_id().unwrap().to_string(), cached);
    }

    #[tokio::test]
    async fn test_cart_survives_new_manager() {
        let h = Harness::new();
        let mut cart = h.manager();
        cart.add_line("p".into(), 2, price(1000)).await.unwrap();

        let mut again = h.manager();
        again.load().await;
        assert_eq!(again.lines(), cart.lines());
    }

    #[tokio::test]
    async fn test_load_failure_keeps_lines_silently() {
        let h = Harness::new();
        let mut cart = h.manager();
        cart.add_line("p".into(), 2, price(100)).await.unwrap();
        h.notices.drain();

        h.store.set_fail_reads(true);
        cart.load().await;

        assert_eq!(cart.lines().len(), 1);
        assert!(h.notices.drain().is_empty());
        assert!(!cart.is_loading());
    }

    #[tokio::test]
    async fn test_save_failure_keeps_mutation_and_notifies() {
        let h = Harness::new();
        let mut cart = h.manager();
        h.store.set_fail_writes(true);

        cart.add_line("p".into(), 1, price(100)).await.unwrap();

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.sync_status(), SyncStatus::SyncFailed);
        let failures: Vec<_> = h
            .notices
            .drain()
            .into_iter()
            .filter(|n| n.variant == NoticeVariant::Destructive)
            .collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures.first().unwrap().title, "Cart sync failed");

        h.store.set_fail_writes(false);
        cart.clear().await;
        assert_eq!(cart.sync_status(), SyncStatus::Idle);
    }

    #[tokio::test]
    async fn test_sign_in_replaces_guest_lines() {
        let h = Harness::new();
        let mut cart = h.manager();
        cart.load().await;
        cart.add_line("X".into(), 2, price(1000)).await.unwrap();
        assert_eq!(cart.total_price().amount, price(2000));

        h.identity.set(Some(UserId::generate()));
        cart.load().await;

        assert!(!cart.owner().unwrap().is_guest());
        assert!(cart.lines().is_empty());
        assert_eq!(cart.total_price().amount, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_subscribers_see_mutations() {
        let h = Harness::new();
        let mut cart = h.manager();
        let rx = cart.subscribe();

        cart.add_line("p".into(), 3, price(200)).await.unwrap();

        let snapshot = rx.borrow().clone();
        assert_eq!(snapshot.total_quantity, 3);
        assert_eq!(snapshot.total_price.amount, price(600));
        assert_eq!(snapshot.sync_status, SyncStatus::Idle);
        assert_eq!(snapshot.owner, cart.owner());
    }

    #[tokio::test]
    async fn test_follow_identity_reloads_until_signal_dropped() {
        let h = Harness::new();
        let user = UserId::generate();
        h.store
            .upsert(
                &CartOwner::User(user),
                &[CartLine::new("saved".into(), 1, price(100)).unwrap()],
                Utc::now(),
            )
            .await
            .unwrap();

        let mut cart = h.manager();
        let rx = cart.subscribe();
        let Harness { identity, .. } = h;

        let follower = tokio::spawn(async move {
            cart.follow_identity().await;
            cart
        });
        identity.set(Some(user));
        drop(identity);

        let cart = follower.await.unwrap();
        assert_eq!(cart.owner(), Some(CartOwner::User(user)));
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(rx.borrow().lines.len(), 1);
    }

    // =========================================================================
    // Random mutation sequences
    // =========================================================================

    const PRODUCTS: [&str; 4] = ["brake-pad", "rotor", "oil-filter", "spark-plug"];

    #[derive(Debug, Clone)]
    enum CartOp {
        Add { product: &'static str, quantity: u32, cents: i64 },
        Update { product: &'static str, quantity: i64 },
        Remove { product: &'static str },
    }

    fn product() -> impl Strategy<Value = &'static str> {
        prop::sample::select(PRODUCTS.to_vec())
    }

    fn cart_op() -> impl Strategy<Value = CartOp> {
        prop_oneof![
            (product(), 0u32..6, 0i64..20_000).prop_map(|(product, quantity, cents)| {
                CartOp::Add { product, quantity, cents }
            }),
            (product(), -3i64..500)
                .prop_map(|(product, quantity)| CartOp::Update { product, quantity }),
            product().prop_map(|product| CartOp::Remove { product }),
        ]
    }

    proptest! {
        #[test]
        fn cart_keeps_one_line_per_product_and_consistent_totals(
            ops in prop::collection::vec(cart_op(), 1..40)
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let h = Harness::new();

            let (lines, total_quantity, total_price, stored) = runtime.block_on(async {
                let mut cart = h.manager();
                cart.load().await;
                for op in ops {
                    match op {
                        CartOp::Add { product, quantity, cents } => {
                            // Zero quantities are rejected and leave the cart as is.
                            let _ = cart
                                .add_line(product.into(), quantity, price(cents))
                                .await;
                        }
                        CartOp::Update { product, quantity } => {
                            cart.update_quantity(&product.into(), quantity)
                                .await
                                .unwrap();
                        }
                        CartOp::Remove { product } => {
                            cart.remove_line(&product.into()).await;
                        }
                    }
                }

                let owner = cart.owner().unwrap();
                let stored = h
                    .store
                    .get(&owner)
                    .await
                    .unwrap()
                    .map(|row| row.lines)
                    .unwrap_or_default();
                (
                    cart.lines().to_vec(),
                    cart.total_quantity(),
                    cart.total_price(),
                    stored,
                )
            });

            let ids: HashSet<&str> = lines.iter().map(|line| line.product_id.as_str()).collect();
            prop_assert_eq!(ids.len(), lines.len());
            prop_assert!(lines.iter().all(|line| line.quantity > 0));

            let quantity_sum: u64 = lines.iter().map(|line| u64::from(line.quantity)).sum();
            prop_assert_eq!(total_quantity, quantity_sum);

            let price_sum: Decimal = lines
                .iter()
                .map(|line| line.price * Decimal::from(line.quantity))
                .sum();
            prop_assert_eq!(total_price.amount, price_sum);

            prop_assert_eq!(stored, lines);
        }
    }
}
