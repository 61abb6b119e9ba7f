use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::db::{DbPool, Sale};
use crate::error::{PortfolioError, PortfolioResult};
use crate::state::AppState;

use super::property::ensure_property_exists;
use super::util::{require_non_negative, require_non_negative_int, resolve_page};

#[derive(Debug, Default, Deserialize)]
pub struct SaleFilter {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub property_id: Option<i32>,
    pub sale_price: Option<f64>,
    pub sale_date: Option<NaiveDate>,
    pub days_on_market: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaleInput {
    pub property_id: i32,
    pub sale_price: f64,
    pub sale_date: NaiveDate,
    pub days_on_market: i32,
    pub buyer_name: String,
    pub buyer_email: String,
    pub buyer_phone: String,
    pub agent_name: String,
    pub agent_email: String,
    pub agent_phone: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SaleUpdate {
    pub property_id: Option<i32>,
    pub sale_price: Option<f64>,
    pub sale_date: Option<NaiveDate>,
    pub days_on_market: Option<i32>,
    pub buyer_name: Option<String>,
    pub buyer_email: Option<String>,
    pub buyer_phone: Option<String>,
    pub agent_name: Option<String>,
    pub agent_email: Option<String>,
    pub agent_phone: Option<String>,
}

fn validate_sale(input: &SaleInput) -> PortfolioResult<()> {
    require_non_negative("sale_price", input.sale_price)?;
    require_non_negative_int("days_on_market", input.days_on_market)?;
    Ok(())
}

pub async fn list_sales_internal(pool: &DbPool, filter: SaleFilter) -> PortfolioResult<Vec<Sale>> {
    let (skip, limit) = resolve_page(filter.skip, filter.limit)?;

    let sql = r#"
        SELECT * FROM sales
        WHERE ($1::INTEGER IS NULL OR property_id = $1)
          AND ($2::DOUBLE PRECISION IS NULL OR sale_price = $2)
          AND ($3::DATE IS NULL OR sale_date = $3)
          AND ($4::INTEGER IS NULL OR days_on_market = $4)
        ORDER BY id ASC
        OFFSET $5 LIMIT $6
    "#;

    Ok(sqlx::query_as::<_, Sale>(sql)
        .bind(filter.property_id)
        .bind(filter.sale_price)
        .bind(filter.sale_date)
        .bind(filter.days_on_market)
        .bind(skip)
        .bind(limit)
        .fetch_all(pool)
        .await?)
}

pub async fn get_sale_internal(pool: &DbPool, id: i32) -> PortfolioResult<Sale> {
    sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| PortfolioError::NotFound("Sale not found".into()))
}

pub async fn create_sale_internal(pool: &DbPool, input: SaleInput) -> PortfolioResult<Sale> {
    validate_sale(&input)?;
    ensure_property_exists(pool, input.property_id).await?;

    Ok(sqlx::query_as::<_, Sale>(
        r#"
        INSERT INTO sales
            (property_id, sale_price, sale_date, days_on_market,
             buyer_name, buyer_email, buyer_phone,
             agent_name, agent_email, agent_phone)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(input.property_id)
    .bind(input.sale_price)
    .bind(input.sale_date)
    .bind(input.days_on_market)
    .bind(input.buyer_name)
    .bind(input.buyer_email)
    .bind(input.buyer_phone)
    .bind(input.agent_name)
    .bind(input.agent_email)
    .bind(input.agent_phone)
    .fetch_one(pool)
    .await?)
}

pub async fn update_sale_internal(
    pool: &DbPool,
    id: i32,
    update: SaleUpdate,
) -> PortfolioResult<Sale> {
    let existing = get_sale_internal(pool, id).await?;

    let merged = SaleInput {
        property_id: update.property_id.unwrap_or(existing.property_id),
        sale_price: update.sale_price.unwrap_or(existing.sale_price),
        sale_date: update.sale_date.unwrap_or(existing.sale_date),
        days_on_market: update.days_on_market.unwrap_or(existing.days_on_market),
        buyer_name: update.buyer_name.unwrap_or(existing.buyer_name),
        buyer_email: update.buyer_email.unwrap_or(existing.buyer_email),
        buyer_phone: update.buyer_phone.unwrap_or(existing.buyer_phone),
        agent_name: update.agent_name.unwrap_or(existing.agent_name),
        agent_email: update.agent_email.unwrap_or(existing.agent_email),
        agent_phone: update.agent_phone.unwrap_or(existing.agent_phone),
    };
    validate_sale(&merged)?;
    if merged.property_id != existing.property_id {
        ensure_property_exists(pool, merged.property_id).await?;
    }

    Ok(sqlx::query_as::<_, Sale>(
        r#"
        UPDATE sales SET
            property_id = $1, sale_price = $2, sale_date = $3, days_on_market = $4,
            buyer_name = $5, buyer_email = $6, buyer_phone = $7,
            agent_name = $8, agent_email = $9, agent_phone = $10,
            updated_at = now()
        WHERE id = $11
        RETURNING *
        "#,
    )
    .bind(merged.property_id)
    .bind(merged.sale_price)
    .bind(merged.sale_date)
    .bind(merged.days_on_market)
    .bind(merged.buyer_name)
    .bind(merged.buyer_email)
    .bind(merged.buyer_phone)
    .bind(merged.agent_name)
    .bind(merged.agent_email)
    .bind(merged.agent_phone)
    .bind(id)
    .fetch_one(pool)
    .await?)
}

pub async fn delete_sale_internal(pool: &DbPool, id: i32) -> PortfolioResult<()> {
    let result = sqlx::query("DELETE FROM sales WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(PortfolioError::NotFound("Sale not found".into()));
    }
    Ok(())
}

// --- Axum Handlers ---

pub async fn list_sales(
    State(state): State<AppState>,
    Query(filter): Query<SaleFilter>,
) -> PortfolioResult<Json<Vec<Sale>>> {
    Ok(Json(list_sales_internal(&state.pool, filter).await?))
}

pub async fn get_sale(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> PortfolioResult<Json<Sale>> {
    Ok(Json(get_sale_internal(&state.pool, id).await?))
}

pub async fn create_sale(
    State(state): State<AppState>,
    Json(input): Json<SaleInput>,
) -> PortfolioResult<Json<Sale>> {
    tracing::info!("Recording sale for property {}", input.property_id);
    Ok(Json(create_sale_internal(&state.pool, input).await?))
}

pub async fn update_sale(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(update): Json<SaleUpdate>,
) -> PortfolioResult<Json<Sale>> {
    Ok(Json(update_sale_internal(&state.pool, id, update).await?))
}

pub async fn delete_sale(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> PortfolioResult<Json<serde_json::Value>> {
    delete_sale_internal(&state.pool, id).await?;
    Ok(Json(
        serde_json::json!({ "message": "Sale deleted successfully" }),
    ))
}
