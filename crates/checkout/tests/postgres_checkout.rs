//! Checkout against PostgreSQL, where concurrent checkouts are kept apart
//! by row locks rather than a process-local mutex.
//!
//! Tests share one container and truncate the products table, so they run
//! serially.

use std::sync::Arc;

use cart::Cart;
use checkout::{CheckoutCoordinator, CheckoutError};
use common::ProductId;
use inventory::{InventoryStore, InventoryStoreExt, PostgresInventoryStore, Product};
use rust_decimal_macros::dec;
use serial_test::serial;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::{Barrier, OnceCell};

struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

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

/// A store over its own pool, standing in for one server process.
async fn connect_store() -> PostgresInventoryStore {
    let info = get_container_info().await;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(2)
        .connect(&info.connection_string)
        .await
        .unwrap();
    PostgresInventoryStore::new(pool)
}

async fn fresh_store(products: Vec<Product>) -> PostgresInventoryStore {
    let store = connect_store().await;
    sqlx::query("TRUNCATE TABLE products")
        .execute(store.pool())
        .await
        .unwrap();
    store.save_all(products).await.unwrap();
    store
}

fn product(id: &str, stock: u32) -> Product {
    Product::new(id, format!("Product {id}"), dec!(10.00), stock)
}

fn cart_of(products: &[&Product]) -> Cart {
    let mut cart = Cart::new();
    for product in products {
        cart.add_product((*product).clone());
    }
    cart
}

async fn stock_of(store: &PostgresInventoryStore, id: &str) -> u32 {
    store
        .find_by_id(&ProductId::new(id))
        .await
        .unwrap()
        .expect("product should exist")
        .quantity
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial]
async fn last_unit_goes_to_exactly_one_of_two_processes() {
    let p = product("P", 1);
    let store = fresh_store(vec![p.clone()]).await;

    // two coordinators over separate pools, like two server instances
    let barrier = Arc::new(Barrier::new(2));
    let mut handles = Vec::new();
    for _ in 0..2 {
        let coordinator = CheckoutCoordinator::new(connect_store().await);
        let barrier = barrier.clone();
        let mut cart = cart_of(&[&p]);
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            let result = coordinator.checkout(&mut cart).await;
            (result, cart.is_empty())
        }));
    }

    let mut successes = 0;
    let mut rejections = Vec::new();
    for handle in handles {
        let (result, cart_emptied) = handle.await.unwrap();
        match result {
            Ok(_) => {
                assert!(cart_emptied);
                successes += 1;
            }
            Err(e) => {
                assert!(!cart_emptied);
                rejections.push(e);
            }
        }
    }

    assert_eq!(successes, 1);
    assert!(matches!(
        rejections.as_slice(),
        [CheckoutError::InsufficientStock { available: 0, .. }]
    ));
    assert_eq!(stock_of(&store, "P").await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
async fn overlapping_carts_across_processes_never_oversell() {
    let p1 = product("P1", 5);
    let p2 = product("P2", 5);
    let store = fresh_store(vec![p1.clone(), p2.clone()]).await;

    let barrier = Arc::new(Barrier::new(10));
    let mut handles = Vec::new();
    for i in 0..10 {
        let coordinator = CheckoutCoordinator::new(connect_store().await);
        let barrier = barrier.clone();
        // add in alternating order; checkout still locks rows in id order
        let mut cart = if i % 2 == 0 {
            cart_of(&[&p1, &p2])
        } else {
            cart_of(&[&p2, &p1])
        };
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            coordinator.checkout(&mut cart).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }

    assert_eq!(successes, 5);
    assert_eq!(stock_of(&store, "P1").await, 0);
    assert_eq!(stock_of(&store, "P2").await, 0);
}

#[tokio::test]
#[serial]
async fn rejected_checkout_rolls_back_earlier_rows() {
    let p1 = product("P1", 5);
    let p2 = product("P2", 1);
    let store = fresh_store(vec![p1.clone(), p2.clone()]).await;
    let coordinator = CheckoutCoordinator::new(store.clone());

    let mut cart = cart_of(&[&p1, &p1, &p2, &p2]);
    let err = coordinator.checkout(&mut cart).await.unwrap_err();

    assert_eq!(err.product_id(), Some(&ProductId::new("P2")));
    assert_eq!(stock_of(&store, "P1").await, 5);
    assert_eq!(stock_of(&store, "P2").await, 1);
    assert_eq!(cart.item_count(), 4);
}
