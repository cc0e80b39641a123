use cart::Cart;
use checkout::CheckoutCoordinator;
use criterion::{Criterion, criterion_group, criterion_main};
use inventory::{InMemoryInventoryStore, Product};
use rust_decimal_macros::dec;

fn catalog(lines: usize) -> Vec<Product> {
    (0..lines)
        .map(|i| Product::new(format!("SKU-{i:04}"), "Benchmark Widget", dec!(9.99), u32::MAX))
        .collect()
}

fn cart_for(products: &[Product], quantity: u32) -> Cart {
    let mut cart = Cart::new();
    for product in products {
        for _ in 0..quantity {
            cart.add_product(product.clone());
        }
    }
    cart
}

fn bench_cart_total(c: &mut Criterion) {
    let cart = cart_for(&catalog(50), 3);

    c.bench_function("cart/total_50_lines", |b| {
        b.iter(|| cart.total());
    });
}

fn bench_checkout_single_line(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let products = catalog(1);
    let coordinator = CheckoutCoordinator::new(InMemoryInventoryStore::with_products(
        products.clone(),
    ));

    c.bench_function("checkout/single_line", |b| {
        b.iter(|| {
            rt.block_on(async {
                let mut cart = cart_for(&products, 1);
                coordinator.checkout(&mut cart).await.unwrap();
            });
        });
    });
}

fn bench_checkout_many_lines(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let products = catalog(25);
    let coordinator = CheckoutCoordinator::new(InMemoryInventoryStore::with_products(
        products.clone(),
    ));

    c.bench_function("checkout/25_lines", |b| {
        b.iter(|| {
            rt.block_on(async {
                let mut cart = cart_for(&products, 2);
                coordinator.checkout(&mut cart).await.unwrap();
            });
        });
    });
}

fn bench_rejected_checkout(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut products = catalog(10);
    if let Some(last) = products.last_mut() {
        last.quantity = 0;
    }
    let coordinator = CheckoutCoordinator::new(InMemoryInventoryStore::with_products(
        products.clone(),
    ));
    let template = cart_for(&products, 1);

    c.bench_function("checkout/rejected_on_last_line", |b| {
        b.iter(|| {
            rt.block_on(async {
                let mut cart = template.clone();
                assert!(coordinator.checkout(&mut cart).await.is_err());
            });
        });
    });
}

criterion_group!(
    benches,
    bench_cart_total,
    bench_checkout_single_line,
    bench_checkout_many_lines,
    bench_rejected_checkout
);
criterion_main!(benches);
