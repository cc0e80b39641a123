use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};

use crate::{
    InventoryError, Product, ProductId, Result,
    store::{InventoryStore, InventoryTransaction, validate_products_for_save},
};

const UPSERT_PRODUCT: &str = r#"
    INSERT INTO products (id, name, unit_price, quantity, updated_at)
    VALUES ($1, $2, $3, $4, NOW())
    ON CONFLICT (id) DO UPDATE SET
        name = EXCLUDED.name,
        unit_price = EXCLUDED.unit_price,
        quantity = EXCLUDED.quantity,
        updated_at = EXCLUDED.updated_at
"#;

/// PostgreSQL-backed inventory store.
///
/// Transactions lock the product rows they read with `SELECT ... FOR UPDATE`,
/// which serializes concurrent checkouts across server processes.
#[derive(Clone)]
pub struct PostgresInventoryStore {
    pool: PgPool,
}

impl PostgresInventoryStore {
    /// Creates a new PostgreSQL inventory store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        let id = ProductId::new(row.try_get::<String, _>("id")?);
        let quantity: i32 = row.try_get("quantity")?;
        let quantity = u32::try_from(quantity).map_err(|_| InventoryError::InvalidStock {
            product_id: id.clone(),
            quantity: i64::from(quantity),
        })?;

        Ok(Product {
            id,
            name: row.try_get("name")?,
            unit_price: row.try_get::<Decimal, _>("unit_price")?,
            quantity,
        })
    }

    fn quantity_column(product: &Product) -> Result<i32> {
        i32::try_from(product.quantity).map_err(|_| InventoryError::InvalidStock {
            product_id: product.id.clone(),
            quantity: i64::from(product.quantity),
        })
    }
}

#[async_trait]
impl InventoryStore for PostgresInventoryStore {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, unit_price, quantity
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_product).transpose()
    }

    async fn save(&self, product: Product) -> Result<()> {
        validate_products_for_save(std::slice::from_ref(&product))?;
        let quantity = Self::quantity_column(&product)?;
        sqlx::query(UPSERT_PRODUCT)
            .bind(product.id.as_str())
            .bind(&product.name)
            .bind(product.unit_price)
            .bind(quantity)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn begin(&self) -> Result<Box<dyn InventoryTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresTransaction { tx }))
    }
}

/// Transaction over [`PostgresInventoryStore`].
///
/// sqlx rolls the transaction back when it is dropped without a commit.
pub struct PostgresTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl InventoryTransaction for PostgresTransaction {
    async fn find_by_id(&mut self, id: &ProductId) -> Result<Option<Product>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, unit_price, quantity
            FROM products
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(PostgresInventoryStore::row_to_product).transpose()
    }

    async fn save_all(&mut self, products: Vec<Product>) -> Result<()> {
        validate_products_for_save(&products)?;

        for product in &products {
            let quantity = PostgresInventoryStore::quantity_column(product)?;
            sqlx::query(UPSERT_PRODUCT)
                .bind(product.id.as_str())
                .bind(&product.name)
                .bind(product.unit_price)
                .bind(quantity)
                .execute(&mut *self.tx)
                .await?;
        }
        Ok(())
    }

    async fn flush(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        tracing::debug!("inventory transaction committed");
        Ok(())
    }
}
