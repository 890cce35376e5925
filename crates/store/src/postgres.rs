use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{ItemId, OrderId};
use domain::{
    ItemChange, ItemDraft, Money, Order, OrderDraft, OrderItem, OrderPatch, OrderStatus,
    order_total, plan_item_changes, validate_draft,
};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, Transaction, postgres::PgRow};

use crate::{
    Result, StoreError,
    store::{OrderFilter, OrderStore},
};

/// Escapes LIKE wildcards so the table filter stays a literal substring
/// match, the same semantics as the in-memory store.
fn escape_like(pattern: &str) -> String {
    pattern
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// PostgreSQL-backed order store implementation.
///
/// Every mutating operation runs in a single transaction, so item
/// reconciliation and total recomputation are atomic per order.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
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

    fn row_to_item(row: &PgRow) -> Result<OrderItem> {
        Ok(OrderItem {
            id: ItemId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            price: Money::from_cents(row.try_get("price_cents")?),
            quantity: row.try_get::<i32, _>("quantity")? as u32,
        })
    }

    fn row_status(row: &PgRow) -> Result<OrderStatus> {
        row.try_get::<String, _>("status")?
            .parse::<OrderStatus>()
            .map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))
    }

    fn row_to_order(row: &PgRow, items: Vec<OrderItem>) -> Result<Order> {
        Ok(Order {
            id: OrderId::new(row.try_get("id")?),
            table_number: row.try_get("table_number")?,
            status: Self::row_status(row)?,
            total_price: Money::from_cents(row.try_get("total_price_cents")?),
            items,
            created_at: row.try_get("created_at")?,
        })
    }

    async fn insert_item(
        tx: &mut Transaction<'_, Postgres>,
        order_id: OrderId,
        draft: &ItemDraft,
    ) -> Result<OrderItem> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO order_items (order_id, name, price_cents, quantity)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(order_id.as_i64())
        .bind(&draft.name)
        .bind(draft.price.cents())
        .bind(draft.quantity as i32)
        .fetch_one(&mut **tx)
        .await?;

        Ok(OrderItem {
            id: ItemId::new(id),
            name: draft.name.clone(),
            price: draft.price,
            quantity: draft.quantity,
        })
    }

    async fn load_items(
        tx: &mut Transaction<'_, Postgres>,
        order_id: OrderId,
    ) -> Result<Vec<OrderItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, price_cents, quantity
            FROM order_items
            WHERE order_id = $1
            ORDER BY id
            "#,
        )
        .bind(order_id.as_i64())
        .fetch_all(&mut **tx)
        .await?;

        rows.iter().map(Self::row_to_item).collect()
    }

    async fn write_order_fields(
        tx: &mut Transaction<'_, Postgres>,
        id: OrderId,
        table_number: i32,
        status: OrderStatus,
        total: Money,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE orders
            SET table_number = $1, status = $2, total_price_cents = $3
            WHERE id = $4
            "#,
        )
        .bind(table_number)
        .bind(status.as_str())
        .bind(total.cents())
        .bind(id.as_i64())
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn create_order(&self, draft: OrderDraft) -> Result<Order> {
        validate_draft(&draft)?;

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            INSERT INTO orders (table_number, status)
            VALUES ($1, $2)
            RETURNING id, created_at
            "#,
        )
        .bind(draft.table_number)
        .bind(draft.status.as_str())
        .fetch_one(&mut *tx)
        .await?;
        let id = OrderId::new(row.try_get("id")?);
        let created_at: DateTime<Utc> = row.try_get("created_at")?;

        let mut items = Vec::with_capacity(draft.items.len());
        for item in &draft.items {
            items.push(Self::insert_item(&mut tx, id, item).await?);
        }

        let total = order_total(&items);
        sqlx::query("UPDATE orders SET total_price_cents = $1 WHERE id = $2")
            .bind(total.cents())
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(%id, total = total.cents(), "order created");

        Ok(Order {
            id,
            table_number: draft.table_number,
            status: draft.status,
            total_price: total,
            items,
            created_at,
        })
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(
            r#"
            SELECT id, table_number, status, total_price_cents, created_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let item_rows = sqlx::query(
            r#"
            SELECT id, name, price_cents, quantity
            FROM order_items
            WHERE order_id = $1
            ORDER BY id
            "#,
        )
        .bind(id.as_i64())
        .fetch_all(&self.pool)
        .await?;
        let items: Result<Vec<OrderItem>> = item_rows.iter().map(Self::row_to_item).collect();

        Ok(Some(Self::row_to_order(&row, items?)?))
    }

    async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>> {
        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT id, table_number, status, total_price_cents, created_at FROM orders",
        );
        let mut prefix = " WHERE ";
        if let Some(table) = &filter.table {
            query.push(prefix).push("table_number::text LIKE ");
            query.push_bind(format!("%{}%", escape_like(table)));
            prefix = " AND ";
        }
        if let Some(status) = filter.status {
            query.push(prefix).push("status = ");
            query.push_bind(status.as_str());
        }
        query.push(" ORDER BY id");

        let rows = query.build().fetch_all(&self.pool).await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<i64> = rows
            .iter()
            .map(|row| row.try_get("id"))
            .collect::<std::result::Result<_, sqlx::Error>>()?;

        let item_rows = sqlx::query(
            r#"
            SELECT id, order_id, name, price_cents, quantity
            FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(&order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut items_by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
        for row in &item_rows {
            let order_id: i64 = row.try_get("order_id")?;
            items_by_order
                .entry(order_id)
                .or_default()
                .push(Self::row_to_item(row)?);
        }

        rows.iter()
            .map(|row| {
                let order_id: i64 = row.try_get("id")?;
                let items = items_by_order.remove(&order_id).unwrap_or_default();
                Self::row_to_order(row, items)
            })
            .collect()
    }

    async fn replace_order(&self, id: OrderId, draft: OrderDraft) -> Result<Order> {
        validate_draft(&draft)?;

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT created_at FROM orders WHERE id = $1 FOR UPDATE")
            .bind(id.as_i64())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::NotFound(id))?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;

        sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;

        let mut items = Vec::with_capacity(draft.items.len());
        for item in &draft.items {
            items.push(Self::insert_item(&mut tx, id, item).await?);
        }

        let total = order_total(&items);
        Self::write_order_fields(&mut tx, id, draft.table_number, draft.status, total).await?;
        tx.commit().await?;

        Ok(Order {
            id,
            table_number: draft.table_number,
            status: draft.status,
            total_price: total,
            items,
            created_at,
        })
    }

    async fn patch_order(&self, id: OrderId, patch: OrderPatch) -> Result<Order> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "SELECT table_number, status, created_at FROM orders WHERE id = $1 FOR UPDATE",
        )
        .bind(id.as_i64())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound(id))?;
        let mut table_number: i32 = row.try_get("table_number")?;
        let mut status = Self::row_status(&row)?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;

        let mut items = Self::load_items(&mut tx, id).await?;

        // Validation happens against the pre-mutation item set; a rejected
        // descriptor rolls the whole transaction back.
        let changes = match &patch.items {
            Some(patches) => Some(plan_item_changes(&items, patches)?),
            None => None,
        };

        if let Some(new_table) = patch.table_number {
            table_number = new_table;
        }
        if let Some(new_status) = patch.status {
            status = new_status;
        }

        if let Some(changes) = changes {
            for change in changes {
                match change {
                    ItemChange::Update {
                        id: item_id,
                        update,
                    } => {
                        let item = items
                            .iter_mut()
                            .find(|item| item.id == item_id)
                            .expect("planned update targets an owned item");
                        update.apply_to(item);
                        let (name, price_cents, quantity) =
                            (item.name.clone(), item.price.cents(), item.quantity as i32);
                        sqlx::query(
                            r#"
                            UPDATE order_items
                            SET name = $1, price_cents = $2, quantity = $3
                            WHERE id = $4
                            "#,
                        )
                        .bind(name)
                        .bind(price_cents)
                        .bind(quantity)
                        .bind(item_id.as_i64())
                        .execute(&mut *tx)
                        .await?;
                    }
                    ItemChange::Create(draft) => {
                        items.push(Self::insert_item(&mut tx, id, &draft).await?);
                    }
                }
            }
        }

        let total = order_total(&items);
        Self::write_order_fields(&mut tx, id, table_number, status, total).await?;
        tx.commit().await?;

        Ok(Order {
            id,
            table_number,
            status,
            total_price: total,
            items,
            created_at,
        })
    }

    async fn delete_order(&self, id: OrderId) -> Result<()> {
        // Items go with the order via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        tracing::debug!(%id, "order deleted");
        Ok(())
    }

    async fn total_revenue(&self) -> Result<Money> {
        let cents: Option<i64> =
            sqlx::query_scalar("SELECT SUM(total_price_cents) FROM orders WHERE status = 'paid'")
                .fetch_one(&self.pool)
                .await?;
        Ok(Money::from_cents(cents.unwrap_or(0)))
    }
}
