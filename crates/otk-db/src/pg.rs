//! Postgres backend: manual row mapping, `returning *` on writes so the
//! caller always sees the committed row.

use otk_schemas::{Order, OrderDraft, OrderStatus, OrderType};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::StoreError;

fn row_to_order(row: &PgRow) -> Result<Order, StoreError> {
    let status_raw: String = row.try_get("status")?;
    let type_raw: String = row.try_get("order_type")?;

    Ok(Order {
        id: row.try_get("id")?,
        symbol: row.try_get("symbol")?,
        price: row.try_get("price")?,
        quantity: row.try_get("quantity")?,
        order_type: OrderType::parse(&type_raw)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?,
        status: OrderStatus::parse(&status_raw)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?,
    })
}

pub(crate) async fn list(pool: &PgPool) -> Result<Vec<Order>, StoreError> {
    let rows = sqlx::query(
        r#"
        select id, symbol, price, quantity, order_type, status
        from orders
        order by id
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_order).collect()
}

pub(crate) async fn get(pool: &PgPool, id: i64) -> Result<Order, StoreError> {
    let row = sqlx::query(
        r#"
        select id, symbol, price, quantity, order_type, status
        from orders
        where id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => row_to_order(&row),
        None => Err(StoreError::NotFound(id)),
    }
}

pub(crate) async fn insert(pool: &PgPool, draft: &OrderDraft) -> Result<Order, StoreError> {
    let row = sqlx::query(
        r#"
        insert into orders (symbol, price, quantity, order_type, status)
        values ($1, $2, $3, $4, $5)
        returning id, symbol, price, quantity, order_type, status
        "#,
    )
    .bind(&draft.symbol)
    .bind(draft.price)
    .bind(draft.quantity)
    .bind(draft.order_type.as_str())
    .bind(draft.status.as_str())
    .fetch_one(pool)
    .await?;

    row_to_order(&row)
}

pub(crate) async fn update_status(
    pool: &PgPool,
    id: i64,
    expected: OrderStatus,
    status: OrderStatus,
) -> Result<Order, StoreError> {
    // Conditional on the expected prior status: the row-level atomicity of
    // the single UPDATE is what keeps read-check-write callers safe.
    let row = sqlx::query(
        r#"
        update orders
        set status = $2
        where id = $1 and status = $3
        returning id, symbol, price, quantity, order_type, status
        "#,
    )
    .bind(id)
    .bind(status.as_str())
    .bind(expected.as_str())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => row_to_order(&row),
        // Zero rows: either the order is gone or its status moved. Re-read
        // to tell the two apart.
        None => match get(pool, id).await {
            Ok(_) => Err(StoreError::StaleStatus { id, expected }),
            Err(e) => Err(e),
        },
    }
}
