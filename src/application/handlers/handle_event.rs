//! HandleEventHandler - Drives one inbound event through the scene machine.
//!
//! 1. Lease the session (per-key lock held until persisted)
//! 2. Resolve catalog ids carried by the event
//! 3. Run the transition on a working copy
//! 4. Execute the transition's effects
//! 5. Persist the working copy
//!
//! Listing loads and feedback are best effort. A failed order aborts the
//! event: nothing is persisted and the stored session still holds the cart.
//! If the order went through but persisting failed, the error carries the
//! receipt and the working session so the caller can save it instead of
//! replaying the event.

use std::sync::Arc;

use crate::application::store::{SessionStore, SessionStoreError};
use crate::domain::conversation::{
    CatalogLookup, CatalogRef, ConversationEvent, RenderDirective, SceneEffect, SceneMachine,
    Transition,
};
use crate::domain::foundation::SessionKey;
use crate::domain::session::Session;
use crate::ports::{CatalogClient, CatalogError, GatewayError, OrderGateway, OrderReceipt};

/// Command carrying one inbound event.
#[derive(Debug, Clone)]
pub struct HandleEventCommand {
    pub key: SessionKey,
    pub event: ConversationEvent,
}

/// Result of a handled event.
#[derive(Debug, Clone)]
pub struct EventOutcome {
    pub transition: Transition,
    /// The session as persisted.
    pub session: Session,
    /// Set when the event placed an order.
    pub receipt: Option<OrderReceipt>,
}

/// Errors from handling an event
#[derive(Debug, thiserror::Error)]
pub enum HandleEventError {
    #[error(transparent)]
    Store(#[from] SessionStoreError),

    #[error("Order was not placed: {0}")]
    OrderFailed(#[from] GatewayError),

    /// The order is placed; only the session write is missing.
    #[error("Order {} placed but session not persisted: {source}", .receipt.order_id)]
    PersistFailedAfterOrder {
        receipt: OrderReceipt,
        session: Box<Session>,
        source: SessionStoreError,
    },
}

/// Handler for conversation events.
pub struct HandleEventHandler {
    store: Arc<SessionStore>,
    catalog: Arc<dyn CatalogClient>,
    gateway: Arc<dyn OrderGateway>,
    machine: SceneMachine,
}

impl HandleEventHandler {
    pub fn new(
        store: Arc<SessionStore>,
        catalog: Arc<dyn CatalogClient>,
        gateway: Arc<dyn OrderGateway>,
        machine: SceneMachine,
    ) -> Self {
        Self {
            store,
            catalog,
            gateway,
            machine,
        }
    }

    pub async fn handle(&self, cmd: HandleEventCommand) -> Result<EventOutcome, HandleEventError> {
        let key = cmd.key;
        let lease = self.store.checkout(key).await?;

        let lookup = self.resolve(&cmd.event).await;
        let mut working = lease.session().clone();
        let transition = self.machine.handle_event(&mut working, &cmd.event, &lookup);
        working.touch();

        tracing::debug!(
            %key,
            from = ?transition.from,
            to = ?transition.to,
            kind = ?transition.kind,
            "Scene transition"
        );

        let mut receipt = None;
        for effect in &transition.effects {
            if let Some(placed) = self.run_effect(key, effect, &mut working).await? {
                receipt = Some(placed);
            }
        }

        let session = match (lease.commit(&working).await, receipt.clone()) {
            (Ok(session), _) => session,
            (Err(source), Some(receipt)) => {
                tracing::error!(
                    %key,
                    order_id = %receipt.order_id,
                    error = %source,
                    "Order placed but session not persisted"
                );
                return Err(HandleEventError::PersistFailedAfterOrder {
                    receipt,
                    session: Box::new(working),
                    source,
                });
            }
            (Err(source), None) => return Err(source.into()),
        };
        Ok(EventOutcome {
            transition,
            session,
            receipt,
        })
    }

    /// Directive for the session's current scene.
    pub async fn render(&self, key: SessionKey) -> RenderDirective {
        let session = self.store.get(key).await;
        self.render_session(&session)
    }

    /// Directive for `session` as it stands.
    pub fn render_session(&self, session: &Session) -> RenderDirective {
        self.machine.render(session, None)
    }

    async fn resolve(&self, event: &ConversationEvent) -> CatalogLookup {
        let Some(reference) = event.catalog_ref() else {
            return CatalogLookup::empty();
        };

        let lookup = CatalogLookup::empty();
        let resolved = match reference {
            CatalogRef::City(id) => self.catalog.city(id).await.map(|found| match found {
                Some(city) => lookup.with_city(city),
                None => lookup,
            }),
            CatalogRef::Branch(id) => self.catalog.branch(id).await.map(|found| match found {
                Some(branch) => lookup.with_branch(branch),
                None => lookup,
            }),
            CatalogRef::Category(id) => self.catalog.category(id).await.map(|found| match found {
                Some(category) => lookup.with_category(category),
                None => lookup,
            }),
            CatalogRef::Product(id) => self.catalog.product(id).await.map(|found| match found {
                Some(product) => lookup.with_product(product),
                None => lookup,
            }),
        };

        resolved.unwrap_or_else(|e| {
            tracing::warn!(reference = ?reference, error = %e, "Catalog lookup failed");
            CatalogLookup::empty()
        })
    }

    async fn run_effect(
        &self,
        key: SessionKey,
        effect: &SceneEffect,
        session: &mut Session,
    ) -> Result<Option<OrderReceipt>, HandleEventError> {
        match effect {
            SceneEffect::LoadBranches { city_id } => {
                let loaded = self.catalog.branches(*city_id).await;
                if let Some(branches) = self.listing(key, effect, loaded) {
                    session.selection.cached_branches = Some(branches);
                    session.selection.touch();
                }
            }
            SceneEffect::LoadCategories { city_id } => {
                let loaded = self.catalog.categories(*city_id).await;
                if let Some(categories) = self.listing(key, effect, loaded) {
                    session.selection.cached_categories = Some(categories);
                    session.selection.touch();
                }
            }
            SceneEffect::LoadProducts { category_id } => {
                let loaded = self.catalog.products(*category_id).await;
                if let Some(products) = self.listing(key, effect, loaded) {
                    session.selection.cached_products = Some(products);
                    session.selection.touch();
                }
            }
            SceneEffect::PlaceOrder { order } => {
                let receipt = self.gateway.place_order(key, order).await.map_err(|e| {
                    tracing::error!(%key, error = %e, "Order placement failed");
                    e
                })?;
                tracing::info!(%key, order_id = %receipt.order_id, total = order.total, "Order placed");
                return Ok(Some(receipt));
            }
            SceneEffect::SendFeedback { text, rating } => {
                if let Err(e) = self.gateway.send_feedback(key, text, *rating).await {
                    tracing::warn!(%key, error = %e, "Failed to send feedback");
                }
            }
        }
        Ok(None)
    }

    fn listing<T>(
        &self,
        key: SessionKey,
        effect: &SceneEffect,
        loaded: Result<Vec<T>, CatalogError>,
    ) -> Option<Vec<T>> {
        match loaded {
            Ok(items) => Some(items),
            Err(e) => {
                tracing::warn!(%key, ?effect, error = %e, "Failed to load catalog listing");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryCatalog, InMemorySessionStorage, RecordingOrderGateway};
    use crate::application::store::SessionStoreConfig;
    use crate::domain::compaction::SessionOptimizer;
    use crate::domain::conversation::{MenuItem, Notice, Scene, TransitionKind};
    use crate::domain::foundation::{BranchId, CategoryId, CityId, Language, ProductId};
    use crate::domain::session::{DeliveryType, OrderTime, PaymentMethod};

    struct Fixture {
        storage: InMemorySessionStorage,
        catalog: Arc<InMemoryCatalog>,
        gateway: RecordingOrderGateway,
        store: Arc<SessionStore>,
        handler: HandleEventHandler,
    }

    fn fixture() -> Fixture {
        let storage = InMemorySessionStorage::new();
        let catalog = Arc::new(InMemoryCatalog::demo());
        let gateway = RecordingOrderGateway::new();
        let store = Arc::new(SessionStore::new(
            Arc::new(storage.clone()),
            SessionOptimizer::default(),
            SessionStoreConfig::default(),
        ));
        let handler = HandleEventHandler::new(
            Arc::clone(&store),
            catalog.clone(),
            Arc::new(gateway.clone()),
            SceneMachine::default(),
        );
        Fixture {
            storage,
            catalog,
            gateway,
            store,
            handler,
        }
    }

    fn key() -> SessionKey {
        SessionKey::new(111, 222)
    }

    async fn send(fx: &Fixture, event: ConversationEvent) -> EventOutcome {
        fx.handler
            .handle(HandleEventCommand { key: key(), event })
            .await
            .unwrap()
    }

    /// Registers, picks Tashkent, pickup from Chilanzar and opens Mains.
    async fn browse_mains(fx: &Fixture) {
        send(fx, ConversationEvent::ChooseLanguage { language: Language::Ru }).await;
        send(
            fx,
            ConversationEvent::Text {
                text: "+998901234567".to_string(),
            },
        )
        .await;
        send(fx, ConversationEvent::Continue).await;
        send(fx, ConversationEvent::OpenMenu { item: MenuItem::Order }).await;
        send(fx, ConversationEvent::ChooseCity { city_id: CityId(1) }).await;
        send(
            fx,
            ConversationEvent::ChooseDeliveryType {
                delivery_type: DeliveryType::Pickup,
            },
        )
        .await;
        send(fx, ConversationEvent::ChooseBranch { branch_id: BranchId(1) }).await;
        send(fx, ConversationEvent::ChooseCategory { category_id: CategoryId(1) }).await;
    }

    async fn fill_cart_and_confirm(fx: &Fixture) {
        send(fx, ConversationEvent::ChooseProduct { product_id: ProductId(1) }).await;
        send(
            fx,
            ConversationEvent::SetProductQuantity {
                product_id: ProductId(1),
                quantity: 2,
            },
        )
        .await;
        send(fx, ConversationEvent::AddToCart).await;
        send(fx, ConversationEvent::OpenCart).await;
        send(fx, ConversationEvent::Checkout).await;
        send(fx, ConversationEvent::ChooseTime { time: OrderTime::Asap }).await;
        send(
            fx,
            ConversationEvent::ChoosePayment {
                method: PaymentMethod::Cash,
            },
        )
        .await;
        send(fx, ConversationEvent::ConfirmPhone).await;
        let outcome = send(fx, ConversationEvent::ChooseCutlery { cutlery: true }).await;
        assert_eq!(outcome.transition.to, Scene::OrderConfirm);
    }

    #[tokio::test]
    async fn purchase_flow_places_order_and_persists() {
        let fx = fixture();
        browse_mains(&fx).await;
        fill_cart_and_confirm(&fx).await;

        let outcome = send(&fx, ConversationEvent::ConfirmOrder).await;

        assert_eq!(outcome.transition.to, Scene::OrderPlaced);
        assert!(outcome.receipt.is_some());
        let orders = fx.gateway.orders().await;
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].order.total, 50_000);
        assert_eq!(orders[0].order.branch_id, Some(BranchId(1)));

        let stored = fx.store.get(key()).await;
        assert_eq!(stored.current_scene(), Scene::OrderPlaced);
        assert!(stored.cart.is_empty());
    }

    #[tokio::test]
    async fn rejected_order_persists_nothing() {
        let fx = fixture();
        browse_mains(&fx).await;
        fill_cart_and_confirm(&fx).await;
        fx.gateway.reject_orders(Some("kitchen closed".to_string())).await;

        let result = fx
            .handler
            .handle(HandleEventCommand {
                key: key(),
                event: ConversationEvent::ConfirmOrder,
            })
            .await;

        assert!(matches!(result, Err(HandleEventError::OrderFailed(_))));
        let stored = fx.store.get(key()).await;
        assert_eq!(stored.current_scene(), Scene::OrderConfirm);
        assert_eq!(stored.cart.total(), 50_000);
    }

    #[tokio::test]
    async fn persist_failure_after_order_hands_back_session() {
        let fx = fixture();
        browse_mains(&fx).await;
        fill_cart_and_confirm(&fx).await;
        fx.storage.fail_writes(true);

        let result = fx
            .handler
            .handle(HandleEventCommand {
                key: key(),
                event: ConversationEvent::ConfirmOrder,
            })
            .await;

        let (receipt, session) = match result {
            Err(HandleEventError::PersistFailedAfterOrder { receipt, session, .. }) => {
                (receipt, session)
            }
            other => panic!("expected PersistFailedAfterOrder, got {:?}", other),
        };
        assert_eq!(session.current_scene(), Scene::OrderPlaced);
        assert!(session.cart.is_empty());
        let orders = fx.gateway.orders().await;
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].order_id, receipt.order_id);

        fx.storage.fail_writes(false);
        fx.store.save(key(), &session).await.unwrap();
        send(&fx, ConversationEvent::ConfirmOrder).await;

        assert_eq!(fx.gateway.orders().await.len(), 1);
        assert_eq!(fx.store.get(key()).await.current_scene(), Scene::OrderPlaced);
    }

    #[tokio::test]
    async fn entering_listing_scenes_caches_catalog() {
        let fx = fixture();
        browse_mains(&fx).await;

        let stored = fx.store.get(key()).await;

        assert_eq!(stored.current_scene(), Scene::Products);
        assert_eq!(stored.selection.cached_branches.as_ref().map(Vec::len), Some(2));
        assert_eq!(stored.selection.cached_categories.as_ref().map(Vec::len), Some(2));
        assert!(stored
            .selection
            .cached_products
            .as_ref()
            .is_some_and(|products| products.iter().all(|p| p.category_id == CategoryId(1))));
    }

    #[tokio::test]
    async fn catalog_outage_does_not_block_navigation() {
        let fx = fixture();
        send(&fx, ConversationEvent::ChooseLanguage { language: Language::En }).await;
        send(
            &fx,
            ConversationEvent::Text {
                text: "+998901234567".to_string(),
            },
        )
        .await;
        send(&fx, ConversationEvent::Continue).await;
        send(&fx, ConversationEvent::OpenMenu { item: MenuItem::Order }).await;

        fx.catalog.set_unavailable(true);
        let outcome = send(&fx, ConversationEvent::ChooseCity { city_id: CityId(1) }).await;

        assert_eq!(outcome.transition.to, Scene::ChangeCity);
        assert_eq!(outcome.transition.directive.notice, Some(Notice::UnknownItem));
        assert_eq!(fx.store.get(key()).await.current_scene(), Scene::ChangeCity);
    }

    #[tokio::test]
    async fn restart_resets_stored_session() {
        let fx = fixture();
        browse_mains(&fx).await;

        let outcome = send(&fx, ConversationEvent::Restart).await;

        assert_eq!(outcome.transition.kind, TransitionKind::Restart);
        let stored = fx.store.get(key()).await;
        assert_eq!(stored.current_scene(), Scene::LanguageSelect);
        assert!(!stored.registered);
        assert!(stored.last_activity().is_some());
    }

    #[tokio::test]
    async fn storage_failure_is_surfaced() {
        let fx = fixture();
        fx.store.get(key()).await;
        fx.storage.fail_writes(true);

        let result = fx
            .handler
            .handle(HandleEventCommand {
                key: key(),
                event: ConversationEvent::ChooseLanguage { language: Language::Uz },
            })
            .await;

        assert!(matches!(result, Err(HandleEventError::Store(_))));
        assert_eq!(fx.store.get(key()).await.language, Language::En);
    }

    #[tokio::test]
    async fn render_shows_current_scene() {
        let fx = fixture();
        send(&fx, ConversationEvent::ChooseLanguage { language: Language::Ru }).await;

        let directive = fx.handler.render(key()).await;

        assert_eq!(directive.scene, Scene::Registration);
        assert!(directive.prompt.is_some());
    }
}
