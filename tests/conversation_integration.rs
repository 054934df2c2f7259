//! Integration tests for the conversation pipeline.
//!
//! These tests verify the end-to-end flow through the public API:
//! 1. Events are handled against a file-backed session store
//! 2. Sessions survive a store restart (new process, same file)
//! 3. Concurrent events on one key are serialized, other keys proceed
//! 4. The sweep bounds what stays on disk

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use orderflow::adapters::{FileSessionStorage, InMemoryCatalog, RecordingOrderGateway};
use orderflow::application::{
    HandleEventCommand, HandleEventHandler, SessionStore, SessionStoreConfig,
};
use orderflow::domain::compaction::SessionOptimizer;
use orderflow::domain::conversation::{ConversationEvent, MenuItem, Scene, SceneMachine};
use orderflow::domain::foundation::{
    BranchId, CategoryId, CityId, Language, ProductId, SessionKey, Timestamp,
};
use orderflow::domain::session::{DeliveryType, OrderTime, PaymentMethod, SessionPatch};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct App {
    store: Arc<SessionStore>,
    gateway: RecordingOrderGateway,
    handler: Arc<HandleEventHandler>,
}

fn start(dir: &TempDir) -> App {
    let storage = FileSessionStorage::new(dir.path().join("sessions.json"));
    let store = Arc::new(SessionStore::new(
        Arc::new(storage),
        SessionOptimizer::default(),
        SessionStoreConfig::default(),
    ));
    let gateway = RecordingOrderGateway::new();
    let handler = Arc::new(HandleEventHandler::new(
        Arc::clone(&store),
        Arc::new(InMemoryCatalog::demo()),
        Arc::new(gateway.clone()),
        SceneMachine::default(),
    ));
    App {
        store,
        gateway,
        handler,
    }
}

async fn send(app: &App, key: SessionKey, event: ConversationEvent) -> Scene {
    app.handler
        .handle(HandleEventCommand { key, event })
        .await
        .expect("event handled")
        .transition
        .to
}

async fn register(app: &App, key: SessionKey) {
    send(app, key, ConversationEvent::ChooseLanguage { language: Language::Uz }).await;
    send(
        app,
        key,
        ConversationEvent::Text {
            text: "+998 90 765 43 21".to_string(),
        },
    )
    .await;
    send(app, key, ConversationEvent::Continue).await;
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn full_purchase_flow_survives_restart() {
    let dir = TempDir::new().unwrap();
    let key = SessionKey::new(111, 222);

    {
        let app = start(&dir);
        register(&app, key).await;
        assert_eq!(
            send(&app, key, ConversationEvent::OpenMenu { item: MenuItem::Order }).await,
            Scene::ChangeCity
        );
        assert_eq!(
            send(&app, key, ConversationEvent::ChooseCity { city_id: CityId(1) }).await,
            Scene::ChooseDeliveryType
        );
        send(
            &app,
            key,
            ConversationEvent::ChooseDeliveryType {
                delivery_type: DeliveryType::Pickup,
            },
        )
        .await;
        send(&app, key, ConversationEvent::ChooseBranch { branch_id: BranchId(1) }).await;
        assert_eq!(
            send(&app, key, ConversationEvent::ChooseCategory { category_id: CategoryId(1) }).await,
            Scene::Products
        );
        send(&app, key, ConversationEvent::ChooseProduct { product_id: ProductId(2) }).await;
        send(&app, key, ConversationEvent::AddToCart).await;
    }

    // A new store over the same file picks up where the old one stopped.
    let app = start(&dir);
    let restored = app.store.get(key).await;
    assert!(restored.is_authenticated());
    assert_eq!(restored.language, Language::Uz);
    assert_eq!(restored.cart.line_count(), 1);
    assert_eq!(restored.cart.total(), 22_000);

    assert_eq!(send(&app, key, ConversationEvent::OpenCart).await, Scene::Cart);
    assert_eq!(send(&app, key, ConversationEvent::Checkout).await, Scene::TimeSelect);
    send(&app, key, ConversationEvent::ChooseTime { time: OrderTime::Asap }).await;
    send(
        &app,
        key,
        ConversationEvent::ChoosePayment {
            method: PaymentMethod::Card,
        },
    )
    .await;
    send(&app, key, ConversationEvent::ConfirmPhone).await;
    send(&app, key, ConversationEvent::ChooseCutlery { cutlery: false }).await;
    assert_eq!(
        send(&app, key, ConversationEvent::ConfirmOrder).await,
        Scene::OrderPlaced
    );

    let orders = app.gateway.orders().await;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].order.phone, "+998907654321");
    assert_eq!(orders[0].order.total, 22_000);
    assert!(app.store.get(key).await.cart.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_events_on_one_key_are_serialized() {
    let dir = TempDir::new().unwrap();
    let app = start(&dir);
    let key = SessionKey::new(1, 1);

    register(&app, key).await;
    send(&app, key, ConversationEvent::OpenMenu { item: MenuItem::Order }).await;
    send(&app, key, ConversationEvent::ChooseCity { city_id: CityId(1) }).await;
    send(
        &app,
        key,
        ConversationEvent::ChooseDeliveryType {
            delivery_type: DeliveryType::Pickup,
        },
    )
    .await;
    send(&app, key, ConversationEvent::ChooseBranch { branch_id: BranchId(1) }).await;
    send(&app, key, ConversationEvent::ChooseCategory { category_id: CategoryId(2) }).await;
    send(&app, key, ConversationEvent::ChooseProduct { product_id: ProductId(5) }).await;

    let tasks = (0..10).map(|_| {
        let handler = Arc::clone(&app.handler);
        tokio::spawn(async move {
            handler
                .handle(HandleEventCommand {
                    key,
                    event: ConversationEvent::AddToCart,
                })
                .await
                .map(|_| ())
        })
    });
    for result in futures::future::join_all(tasks).await {
        result.unwrap().unwrap();
    }

    let session = app.store.get(key).await;
    let quantity = session.cart.items().iter().map(|item| item.quantity).sum::<u32>();
    assert_eq!(quantity, 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_keys_update_concurrently_without_losing_records() {
    let dir = TempDir::new().unwrap();
    let app = start(&dir);

    let tasks = (0..25).map(|user| {
        let store = Arc::clone(&app.store);
        tokio::spawn(async move {
            store
                .update(
                    SessionKey::new(user, user),
                    SessionPatch::new().selected_city(Some(CityId(2))),
                )
                .await
        })
    });
    for result in futures::future::join_all(tasks).await {
        result.unwrap().unwrap();
    }

    let sessions = tokio::time::timeout(Duration::from_secs(5), app.store.list_all())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(sessions.len(), 25);
    assert!(sessions
        .iter()
        .all(|(_, session)| session.selected_city == Some(CityId(2))));
}

#[tokio::test]
async fn sweep_removes_abandoned_sessions_from_disk() {
    let dir = TempDir::new().unwrap();
    let app = start(&dir);
    let active = SessionKey::new(1, 1);
    let abandoned = SessionKey::new(2, 2);

    send(&app, active, ConversationEvent::ChooseLanguage { language: Language::Ru }).await;
    let mut old = app.store.get(abandoned).await;
    old.touch_at(Timestamp::now().minus_secs(3 * 24 * 60 * 60));
    app.store.save(abandoned, &old).await.unwrap();

    let outcome = app.store.sweep(Timestamp::now()).await.unwrap();

    assert_eq!(outcome.removed, 1);
    let restarted = start(&dir);
    let keys: Vec<SessionKey> = restarted
        .store
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .map(|(key, _)| key)
        .collect();
    assert_eq!(keys, vec![active]);
}
