use log::{debug, trace};
use sor_common::Money;
use sqlx::{sqlite::SqliteRow, FromRow, QueryBuilder, Row, SqliteConnection};

use crate::{
    db_types::{NewOrder, Order, OrderStatusType, UpdateOrderRequest},
    traits::OrderStoreError,
};

impl FromRow<'_, SqliteRow> for Order {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let customer = decode_json(row, "customer")?;
        let items = decode_json(row, "items")?;
        let status: String = row.try_get("status")?;
        Ok(Order {
            id: row.try_get("id")?,
            order_number: row.try_get::<String, _>("order_number")?.into(),
            request_id: row.try_get("request_id")?,
            payment_id: row.try_get("payment_id")?,
            customer,
            items,
            subtotal: Money::from(row.try_get::<f64, _>("subtotal")?),
            shipping: Money::from(row.try_get::<f64, _>("shipping")?),
            total: Money::from(row.try_get::<f64, _>("total")?),
            status: OrderStatusType::from(status),
            email_sent: row.try_get("email_sent")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

fn decode_json<T: serde::de::DeserializeOwned>(row: &SqliteRow, column: &str) -> Result<T, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    serde_json::from_str(&raw)
        .map_err(|e| sqlx::Error::ColumnDecode { index: column.to_string(), source: Box::new(e) })
}

/// Inserts a candidate order and returns the persisted record with its store-assigned id and
/// timestamps. No duplicate checking happens here; that decision has already been made.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, OrderStoreError> {
    let customer = encode_json(&order.customer)?;
    let items = encode_json(&order.items)?;
    let status = order.status.unwrap_or(OrderStatusType::Pending);
    // RETURNING statements must be stepped to completion or SQLite abandons the write, so
    // the write paths use fetch_all and take the first row.
    let rows: Vec<Order> = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_number,
                request_id,
                payment_id,
                customer,
                items,
                subtotal,
                shipping,
                total,
                status,
                email_sent
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *;
        "#,
    )
    .bind(order.order_number)
    .bind(order.request_id)
    .bind(order.payment_id)
    .bind(customer)
    .bind(items)
    .bind(order.subtotal.value())
    .bind(order.shipping.value())
    .bind(order.total.value())
    .bind(status.to_string())
    .bind(order.email_sent)
    .fetch_all(conn)
    .await?;
    let order = rows
        .into_iter()
        .next()
        .ok_or_else(|| OrderStoreError::DatabaseError("INSERT .. RETURNING produced no row".to_string()))?;
    debug!("🗃️ Order {} inserted with id {}", order.order_number, order.id);
    Ok(order)
}

fn encode_json<T: serde::Serialize>(value: &T) -> Result<String, OrderStoreError> {
    serde_json::to_string(value).map_err(|e| OrderStoreError::MalformedOrder(e.to_string()))
}

/// The full order list, created-at ascending. Ids break ties because `CURRENT_TIMESTAMP`
/// only has one-second resolution.
pub async fn fetch_orders(conn: &mut SqliteConnection) -> Result<Vec<Order>, OrderStoreError> {
    let orders = sqlx::query_as("SELECT * FROM orders ORDER BY created_at ASC, id ASC").fetch_all(conn).await?;
    Ok(orders)
}

pub async fn fetch_order_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, OrderStoreError> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_orders_by_email(email: &str, conn: &mut SqliteConnection) -> Result<Vec<Order>, OrderStoreError> {
    let orders = sqlx::query_as(
        "SELECT * FROM orders WHERE json_extract(customer, '$.email') = $1 ORDER BY created_at ASC, id ASC",
    )
    .bind(email)
    .fetch_all(conn)
    .await?;
    Ok(orders)
}

pub async fn update_order(
    id: i64,
    update: UpdateOrderRequest,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, OrderStoreError> {
    if update.is_empty() {
        debug!("🗃️ No fields to update for order id {id}. Update request skipped.");
        return Err(OrderStoreError::UpdateNoOp);
    }
    let mut builder = QueryBuilder::new("UPDATE orders SET updated_at = CURRENT_TIMESTAMP, ");
    let mut set_clause = builder.separated(", ");
    if let Some(status) = update.new_status {
        set_clause.push("status = ");
        set_clause.push_bind_unseparated(status.to_string());
    }
    if let Some(email_sent) = update.new_email_sent {
        set_clause.push("email_sent = ");
        set_clause.push_bind_unseparated(email_sent);
    }
    if let Some(instructions) = update.new_special_instructions {
        set_clause.push("customer = json_set(customer, '$.specialInstructions', ");
        set_clause.push_bind_unseparated(instructions);
        set_clause.push_unseparated(")");
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" RETURNING *");
    trace!("🗃️ Executing query: {}", builder.sql());
    let rows: Vec<SqliteRow> = builder.build().fetch_all(conn).await?;
    let res = rows.first().map(Order::from_row).transpose()?;
    Ok(res)
}

pub async fn update_order_status(
    id: i64,
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Order, OrderStoreError> {
    let rows: Vec<Order> =
        sqlx::query_as("UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *")
            .bind(status.to_string())
            .bind(id)
            .fetch_all(conn)
            .await?;
    rows.into_iter().next().ok_or(OrderStoreError::OrderNotFound(id))
}

pub async fn delete_order(id: i64, conn: &mut SqliteConnection) -> Result<bool, OrderStoreError> {
    let result = sqlx::query("DELETE FROM orders WHERE id = $1").bind(id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}
