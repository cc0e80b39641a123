//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency and run
//! serially, since each one truncates the products table.

use std::sync::Arc;
use std::time::Duration;

use inventory::{
    InventoryStore, InventoryStoreExt, PostgresInventoryStore, Product, ProductId,
};
use rust_decimal_macros::dec;
use serial_test::serial;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_products_table.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and an empty products table
async fn get_test_store() -> PostgresInventoryStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE products")
        .execute(&pool)
        .await
        .unwrap();

    PostgresInventoryStore::new(pool)
}

fn widget(quantity: u32) -> Product {
    Product::new("SKU-001", "Widget", dec!(19.99), quantity)
}

#[tokio::test]
#[serial]
async fn save_and_find_product() {
    let store = get_test_store().await;
    store.save(widget(5)).await.unwrap();

    let found = store
        .find_by_id(&ProductId::new("SKU-001"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found, widget(5));
    assert_eq!(found.unit_price, dec!(19.99));
}

#[tokio::test]
#[serial]
async fn missing_product_is_none() {
    let store = get_test_store().await;
    let found = store.find_by_id(&ProductId::new("SKU-404")).await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
#[serial]
async fn save_replaces_existing_product() {
    let store = get_test_store().await;
    store.save(widget(5)).await.unwrap();
    store.save(widget(9)).await.unwrap();

    let found = store.find_by_id(&"SKU-001".into()).await.unwrap().unwrap();
    assert_eq!(found.quantity, 9);
}

#[tokio::test]
#[serial]
async fn flushed_transaction_is_durable() {
    let store = get_test_store().await;
    store.save(widget(5)).await.unwrap();

    let mut tx = store.begin().await.unwrap();
    let current = tx.find_by_id(&"SKU-001".into()).await.unwrap().unwrap();
    tx.save_all(vec![current.with_quantity(2)]).await.unwrap();
    tx.flush().await.unwrap();

    let found = store.find_by_id(&"SKU-001".into()).await.unwrap().unwrap();
    assert_eq!(found.quantity, 2);
}

#[tokio::test]
#[serial]
async fn dropped_transaction_rolls_back() {
    let store = get_test_store().await;
    store.save(widget(5)).await.unwrap();

    {
        let mut tx = store.begin().await.unwrap();
        tx.save_all(vec![widget(0)]).await.unwrap();
    }

    let found = store.find_by_id(&"SKU-001".into()).await.unwrap().unwrap();
    assert_eq!(found.quantity, 5);
}

#[tokio::test]
#[serial]
async fn locked_row_blocks_second_transaction() {
    let store = get_test_store().await;
    store.save(widget(1)).await.unwrap();

    let mut first = store.begin().await.unwrap();
    first.find_by_id(&"SKU-001".into()).await.unwrap();

    let other = store.clone();
    let second = tokio::spawn(async move {
        let mut tx = other.begin().await.unwrap();
        let seen = tx.find_by_id(&"SKU-001".into()).await.unwrap().unwrap();
        tx.flush().await.unwrap();
        seen.quantity
    });

    // Let the second transaction reach the row lock.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!second.is_finished());

    first.save_all(vec![widget(0)]).await.unwrap();
    first.flush().await.unwrap();

    assert_eq!(second.await.unwrap(), 0);
}

#[tokio::test]
#[serial]
async fn save_all_writes_batch_atomically() {
    let store = get_test_store().await;
    store
        .save_all(vec![
            widget(3),
            Product::new("SKU-002", "Gadget", dec!(5.00), 7),
        ])
        .await
        .unwrap();

    assert!(store.exists(&"SKU-001".into()).await.unwrap());
    assert!(store.exists(&"SKU-002".into()).await.unwrap());
}
