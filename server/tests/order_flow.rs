//! Ordering engine integration tests (in-memory database)
//!
//! Covers the full placement / pricing / status-machine behavior the
//! engine guarantees, including the failure paths that must leave no
//! order behind.

use qrmenu_server::core::{Config, ServerState};
use qrmenu_server::db::models::{
    DiningTableCreate, MenuCategoryCreate, MenuItemCreate, MenuItemUpdate, OrderCreate,
    OrderLineCreate, OrderStatus,
};
use qrmenu_server::db::repository::{
    CategoryRepository, DiningTableRepository, MenuItemRepository, OrderRepository,
};
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn test_config() -> Config {
    let mut config = Config::from_env();
    config.tax_rate = dec("0.10");
    config.max_order_items = 20;
    config.admin_email = "admin@example.com".to_string();
    config.admin_password = "admin123".to_string();
    config
}

async fn setup() -> ServerState {
    ServerState::initialize_in_memory(&test_config()).await
}

struct Fixture {
    table_id: String,
    burger_id: String,
}

/// Seed: category "Mains", item "Burger" (8.00), table "T1"
async fn seed(state: &ServerState) -> Fixture {
    let categories = CategoryRepository::new(state.get_db());
    let category = categories
        .create(MenuCategoryCreate {
            name: "Mains".to_string(),
            display_order: 1,
            description: None,
            image_url: None,
        })
        .await
        .unwrap();

    let items = MenuItemRepository::new(state.get_db());
    let burger = items
        .create(MenuItemCreate {
            name: "Burger".to_string(),
            description: "House burger".to_string(),
            price: dec("8.00"),
            category: category.id.as_ref().unwrap().to_string(),
            image_url: None,
            availability: Some(true),
            tags: vec!["beef".to_string()],
            allergens: vec![],
            preparation_time: Some(15),
            calories: None,
            is_vegetarian: None,
            is_vegan: None,
            is_gluten_free: None,
        })
        .await
        .unwrap();

    let tables = DiningTableRepository::new(state.get_db());
    let table = tables
        .create(DiningTableCreate {
            number: "T1".to_string(),
            capacity: Some(4),
            location: None,
        })
        .await
        .unwrap();

    Fixture {
        table_id: table.id.as_ref().unwrap().to_string(),
        burger_id: burger.id.as_ref().unwrap().to_string(),
    }
}

fn cart(fixture: &Fixture, quantity: u32) -> OrderCreate {
    OrderCreate {
        dining_table: fixture.table_id.clone(),
        items: vec![OrderLineCreate {
            menu_item: fixture.burger_id.clone(),
            quantity,
            note: None,
        }],
        special_instructions: None,
        payment_method: None,
    }
}

#[tokio::test]
async fn test_place_order_end_to_end() {
    let state = setup().await;
    let fixture = seed(&state).await;
    let engine = state.ordering_engine();

    let order = engine.place_order(cart(&fixture, 2), None).await.unwrap();

    assert_eq!(order.order_number, "ORD-000001");
    assert_eq!(order.status, OrderStatus::Placed);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].quantity, 2);
    assert_eq!(order.items[0].price, dec("8.00"));
    assert_eq!(order.subtotal, dec("16.00"));
    assert_eq!(order.tax, dec("1.60"));
    assert_eq!(order.total, dec("17.60"));
    assert_eq!(order.total, order.subtotal + order.tax);
    assert!(order.customer.is_none());
}

#[tokio::test]
async fn test_order_numbers_are_sequential() {
    let state = setup().await;
    let fixture = seed(&state).await;
    let engine = state.ordering_engine();

    let first = engine.place_order(cart(&fixture, 1), None).await.unwrap();
    let second = engine.place_order(cart(&fixture, 1), None).await.unwrap();
    let third = engine.place_order(cart(&fixture, 1), None).await.unwrap();

    assert_eq!(first.order_number, "ORD-000001");
    assert_eq!(second.order_number, "ORD-000002");
    assert_eq!(third.order_number, "ORD-000003");
}

#[tokio::test]
async fn test_concurrent_orders_get_unique_numbers() {
    let state = setup().await;
    let fixture = seed(&state).await;
    let engine = state.ordering_engine();

    let placements = (0..8).map(|_| engine.place_order(cart(&fixture, 1), None));
    let results = futures::future::join_all(placements).await;

    // A placement may fail outright on a store-level write conflict (the
    // caller retries); what may never happen is two orders sharing a number.
    let numbers: Vec<String> = results
        .into_iter()
        .filter_map(|r| r.ok())
        .map(|o| o.order_number)
        .collect();
    assert!(!numbers.is_empty());

    let mut deduped = numbers.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), numbers.len(), "duplicate order numbers were assigned");
}

#[tokio::test]
async fn test_price_captured_at_placement() {
    let state = setup().await;
    let fixture = seed(&state).await;
    let engine = state.ordering_engine();

    let order = engine.place_order(cart(&fixture, 2), None).await.unwrap();

    // Reprice the catalog item after placement
    let items = MenuItemRepository::new(state.get_db());
    items
        .update(
            &fixture.burger_id,
            MenuItemUpdate {
                price: Some(dec("99.00")),
                name: None,
                description: None,
                category: None,
                image_url: None,
                availability: None,
                tags: None,
                allergens: None,
                preparation_time: None,
                calories: None,
                is_vegetarian: None,
                is_vegan: None,
                is_gluten_free: None,
            },
        )
        .await
        .unwrap();

    // The stored order is immune to the live price edit
    let orders = OrderRepository::new(state.get_db());
    let stored = orders
        .find_by_id(&order.id.as_ref().unwrap().to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.items[0].price, dec("8.00"));
    assert_eq!(stored.subtotal, dec("16.00"));
    assert_eq!(stored.total, dec("17.60"));
}

#[tokio::test]
async fn test_unavailable_item_rejected_without_side_effects() {
    let state = setup().await;
    let fixture = seed(&state).await;
    let engine = state.ordering_engine();

    let items = MenuItemRepository::new(state.get_db());
    items.toggle_availability(&fixture.burger_id).await.unwrap();

    let err = engine.place_order(cart(&fixture, 1), None).await.unwrap_err();
    assert!(err.to_string().contains("unavailable"));

    // No order persisted, no popularity bump
    let orders = OrderRepository::new(state.get_db());
    assert_eq!(orders.count_all().await.unwrap(), 0);
    let burger = items.find_by_id(&fixture.burger_id).await.unwrap().unwrap();
    assert_eq!(burger.popularity_score, 0);
}

#[tokio::test]
async fn test_inactive_or_unknown_table_rejected() {
    let state = setup().await;
    let fixture = seed(&state).await;
    let engine = state.ordering_engine();

    // Deactivate the table
    let tables = DiningTableRepository::new(state.get_db());
    tables.toggle_status(&fixture.table_id).await.unwrap();

    let err = engine.place_order(cart(&fixture, 1), None).await.unwrap_err();
    assert!(err.to_string().contains("Invalid or inactive table"));

    // Unknown table id
    let mut request = cart(&fixture, 1);
    request.dining_table = "dining_table:doesnotexist".to_string();
    let err = engine.place_order(request, None).await.unwrap_err();
    assert!(err.to_string().contains("Invalid or inactive table"));

    let orders = OrderRepository::new(state.get_db());
    assert_eq!(orders.count_all().await.unwrap(), 0);
}

#[tokio::test]
async fn test_empty_cart_and_zero_quantity_rejected() {
    let state = setup().await;
    let fixture = seed(&state).await;
    let engine = state.ordering_engine();

    let mut empty = cart(&fixture, 1);
    empty.items.clear();
    assert!(engine.place_order(empty, None).await.is_err());

    assert!(engine.place_order(cart(&fixture, 0), None).await.is_err());
}

#[tokio::test]
async fn test_popularity_increments_by_quantity() {
    let state = setup().await;
    let fixture = seed(&state).await;
    let engine = state.ordering_engine();

    engine.place_order(cart(&fixture, 3), None).await.unwrap();
    engine.place_order(cart(&fixture, 2), None).await.unwrap();

    let items = MenuItemRepository::new(state.get_db());
    let burger = items.find_by_id(&fixture.burger_id).await.unwrap().unwrap();
    assert_eq!(burger.popularity_score, 5);
}

#[tokio::test]
async fn test_full_fulfillment_lifecycle() {
    let state = setup().await;
    let fixture = seed(&state).await;
    let engine = state.ordering_engine();

    let order = engine.place_order(cart(&fixture, 2), None).await.unwrap();
    let id = order.id.as_ref().unwrap().to_string();

    let order = engine
        .transition(&id, OrderStatus::Preparing, None)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Preparing);

    let order = engine.transition(&id, OrderStatus::Ready, None).await.unwrap();
    assert_eq!(order.status, OrderStatus::Ready);

    let order = engine.transition(&id, OrderStatus::Served, None).await.unwrap();
    assert_eq!(order.status, OrderStatus::Served);

    // served is terminal; canceling must fail and leave the status alone
    let err = engine
        .transition(&id, OrderStatus::Canceled, None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("served"));

    let orders = OrderRepository::new(state.get_db());
    let stored = orders.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Served);
}

#[tokio::test]
async fn test_illegal_transitions_rejected() {
    let state = setup().await;
    let fixture = seed(&state).await;
    let engine = state.ordering_engine();

    // placed -> ready / served skips steps
    let order = engine.place_order(cart(&fixture, 1), None).await.unwrap();
    let id = order.id.as_ref().unwrap().to_string();
    assert!(engine.transition(&id, OrderStatus::Ready, None).await.is_err());
    assert!(engine.transition(&id, OrderStatus::Served, None).await.is_err());

    // ready -> canceled is forbidden
    engine.transition(&id, OrderStatus::Preparing, None).await.unwrap();
    engine.transition(&id, OrderStatus::Ready, None).await.unwrap();
    assert!(
        engine
            .transition(&id, OrderStatus::Canceled, None)
            .await
            .is_err()
    );

    // preparing -> canceled is allowed (fresh order)
    let other = engine.place_order(cart(&fixture, 1), None).await.unwrap();
    let other_id = other.id.as_ref().unwrap().to_string();
    engine
        .transition(&other_id, OrderStatus::Preparing, None)
        .await
        .unwrap();
    let canceled = engine
        .transition(&other_id, OrderStatus::Canceled, None)
        .await
        .unwrap();
    assert_eq!(canceled.status, OrderStatus::Canceled);
}

#[tokio::test]
async fn test_transition_stores_estimated_ready_time() {
    let state = setup().await;
    let fixture = seed(&state).await;
    let engine = state.ordering_engine();

    let order = engine.place_order(cart(&fixture, 1), None).await.unwrap();
    let id = order.id.as_ref().unwrap().to_string();

    let eta = order.created_at + 15 * 60 * 1000;
    let order = engine
        .transition(&id, OrderStatus::Preparing, Some(eta))
        .await
        .unwrap();
    assert_eq!(order.estimated_ready_time, Some(eta));
}

#[tokio::test]
async fn test_customer_cancel_rules() {
    let state = setup().await;
    let fixture = seed(&state).await;
    let engine = state.ordering_engine();

    let customer = "user:customer1".to_string();
    let order = engine
        .place_order(cart(&fixture, 1), Some(customer.clone()))
        .await
        .unwrap();
    let id = order.id.as_ref().unwrap().to_string();

    // Someone else cannot cancel; indistinguishable from a missing order
    let err = engine
        .cancel_for_customer(&id, "user:intruder")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not found"));

    // The owner can, while the order is still cancelable
    let canceled = engine.cancel_for_customer(&id, &customer).await.unwrap();
    assert_eq!(canceled.status, OrderStatus::Canceled);

    // A served order cannot be canceled by its customer
    let order = engine
        .place_order(cart(&fixture, 1), Some(customer.clone()))
        .await
        .unwrap();
    let id = order.id.as_ref().unwrap().to_string();
    engine.transition(&id, OrderStatus::Preparing, None).await.unwrap();
    engine.transition(&id, OrderStatus::Ready, None).await.unwrap();
    engine.transition(&id, OrderStatus::Served, None).await.unwrap();

    let err = engine.cancel_for_customer(&id, &customer).await.unwrap_err();
    assert!(err.to_string().contains("cannot be canceled"));
}

#[tokio::test]
async fn test_guest_order_has_no_customer() {
    let state = setup().await;
    let fixture = seed(&state).await;
    let engine = state.ordering_engine();

    let order = engine.place_order(cart(&fixture, 1), None).await.unwrap();
    assert!(order.customer.is_none());

    // Guest orders are not cancelable through the customer path
    let id = order.id.as_ref().unwrap().to_string();
    assert!(engine.cancel_for_customer(&id, "user:anyone").await.is_err());
}

#[tokio::test]
async fn test_slug_resolution() {
    let state = setup().await;
    let fixture = seed(&state).await;

    let tables = DiningTableRepository::new(state.get_db());

    // Deterministic slug, resolvable repeatedly
    let first = tables.find_by_slug("table-t1").await.unwrap().unwrap();
    let second = tables.find_by_slug("table-t1").await.unwrap().unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(first.number, "T1");

    // Deactivated tables resolve exactly like missing ones
    tables.toggle_status(&fixture.table_id).await.unwrap();
    assert!(tables.find_by_slug("table-t1").await.unwrap().is_none());
    assert!(tables.find_by_slug("table-nope").await.unwrap().is_none());
}

#[tokio::test]
async fn test_slug_survives_renumbering() {
    let state = setup().await;
    let fixture = seed(&state).await;

    let tables = DiningTableRepository::new(state.get_db());
    let updated = tables
        .update(
            &fixture.table_id,
            qrmenu_server::db::models::DiningTableUpdate {
                number: Some("T9".to_string()),
                capacity: None,
                location: None,
                is_active: None,
            },
        )
        .await
        .unwrap();

    // Printed QR codes embed the slug; renumbering must not change it
    assert_eq!(updated.number, "T9");
    assert_eq!(updated.qr_slug, "table-t1");
}

#[tokio::test]
async fn test_duplicate_table_number_rejected() {
    let state = setup().await;
    let _fixture = seed(&state).await;

    let tables = DiningTableRepository::new(state.get_db());
    let err = tables
        .create(DiningTableCreate {
            number: "T1".to_string(),
            capacity: None,
            location: None,
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already exists"));
}

#[tokio::test]
async fn test_category_delete_blocked_by_items() {
    let state = setup().await;
    let fixture = seed(&state).await;

    let categories = CategoryRepository::new(state.get_db());
    let all = categories.find_all_active().await.unwrap();
    let mains_id = all[0].id.as_ref().unwrap().to_string();

    let err = categories.delete(&mains_id).await.unwrap_err();
    assert!(err.to_string().contains("Cannot delete category"));

    // After removing the item the category can go
    let items = MenuItemRepository::new(state.get_db());
    items.delete(&fixture.burger_id).await.unwrap();
    assert!(categories.delete(&mains_id).await.unwrap());
}

#[tokio::test]
async fn test_analytics_aggregation() {
    let state = setup().await;
    let fixture = seed(&state).await;
    let engine = state.ordering_engine();

    // Two orders, one canceled afterwards
    let kept = engine.place_order(cart(&fixture, 2), None).await.unwrap();
    let canceled = engine.place_order(cart(&fixture, 1), None).await.unwrap();
    engine
        .transition(
            &canceled.id.as_ref().unwrap().to_string(),
            OrderStatus::Canceled,
            None,
        )
        .await
        .unwrap();

    let analytics = engine.analytics().await.unwrap();

    assert_eq!(analytics.total_orders, 2);
    assert_eq!(analytics.today_orders, 2);
    assert_eq!(analytics.pending_orders, 1);

    // Revenue excludes the canceled order
    let expected: f64 = 17.60;
    assert!((analytics.revenue_total - expected).abs() < 1e-9);
    assert!((analytics.revenue_today - expected).abs() < 1e-9);
    let _ = kept;

    // Ranking counts quantities across all orders, canceled included
    assert_eq!(analytics.top_items.len(), 1);
    assert_eq!(analytics.top_items[0].name, "Burger");
    assert_eq!(analytics.top_items[0].total_quantity, 3);

    let placed = analytics
        .status_distribution
        .iter()
        .find(|c| c.status == OrderStatus::Placed)
        .unwrap();
    assert_eq!(placed.count, 1);
}
