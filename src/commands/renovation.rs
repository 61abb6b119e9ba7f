use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::db::{DbPool, Renovation};
use crate::error::{PortfolioError, PortfolioResult};
use crate::state::AppState;

use super::property::ensure_property_exists;
use super::util::{derive_duration, require_non_negative, resolve_page};

pub const DEFAULT_STATUS: &str = "Planned";

#[derive(Debug, Default, Deserialize)]
pub struct RenovationFilter {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub property_id: Option<i32>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenovationInput {
    pub property_id: i32,
    pub renovation_type: String,
    pub description: String,
    pub cost: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RenovationUpdate {
    pub property_id: Option<i32>,
    pub renovation_type: Option<String>,
    pub description: Option<String>,
    pub cost: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<String>,
}

fn validate_renovation(input: &RenovationInput) -> PortfolioResult<()> {
    if input.renovation_type.trim().is_empty() {
        return Err(PortfolioError::Validation(
            "renovation_type must not be empty".into(),
        ));
    }
    require_non_negative("cost", input.cost)?;
    Ok(())
}

pub async fn list_renovations_internal(
    pool: &DbPool,
    filter: RenovationFilter,
) -> PortfolioResult<Vec<Renovation>> {
    let (skip, limit) = resolve_page(filter.skip, filter.limit)?;

    let sql = r#"
        SELECT * FROM renovations
        WHERE ($1::INTEGER IS NULL OR property_id = $1)
          AND ($2::TEXT IS NULL OR status = $2)
        ORDER BY id ASC
        OFFSET $3 LIMIT $4
    "#;

    Ok(sqlx::query_as::<_, Renovation>(sql)
        .bind(filter.property_id)
        .bind(filter.status)
        .bind(skip)
        .bind(limit)
        .fetch_all(pool)
        .await?)
}

pub async fn get_renovation_internal(pool: &DbPool, id: i32) -> PortfolioResult<Renovation> {
    sqlx::query_as::<_, Renovation>("SELECT * FROM renovations WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| PortfolioError::NotFound("Renovation not found".into()))
}

pub async fn create_renovation_internal(
    pool: &DbPool,
    input: RenovationInput,
) -> PortfolioResult<Renovation> {
    validate_renovation(&input)?;
    let duration = derive_duration(input.start_date, input.end_date)?;
    ensure_property_exists(pool, input.property_id).await?;

    Ok(sqlx::query_as::<_, Renovation>(
        r#"
        INSERT INTO renovations
            (property_id, renovation_type, description, cost,
             start_date, end_date, duration, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(input.property_id)
    .bind(input.renovation_type)
    .bind(input.description)
    .bind(input.cost)
    .bind(input.start_date)
    .bind(input.end_date)
    .bind(duration)
    .bind(input.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()))
    .fetch_one(pool)
    .await?)
}

pub async fn update_renovation_internal(
    pool: &DbPool,
    id: i32,
    update: RenovationUpdate,
) -> PortfolioResult<Renovation> {
    let existing = get_renovation_internal(pool, id).await?;

    let merged = RenovationInput {
        property_id: update.property_id.unwrap_or(existing.property_id),
        renovation_type: update.renovation_type.unwrap_or(existing.renovation_type),
        description: update.description.unwrap_or(existing.description),
        cost: update.cost.unwrap_or(existing.cost),
        start_date: update.start_date.unwrap_or(existing.start_date),
        end_date: update.end_date.unwrap_or(existing.end_date),
        status: Some(update.status.unwrap_or(existing.status)),
    };
    validate_renovation(&merged)?;
    // Duration always tracks the dates, whatever subset of them changed.
    let duration = derive_duration(merged.start_date, merged.end_date)?;
    if merged.property_id != existing.property_id {
        ensure_property_exists(pool, merged.property_id).await?;
    }

    Ok(sqlx::query_as::<_, Renovation>(
        r#"
        UPDATE renovations SET
            property_id = $1, renovation_type = $2, description = $3, cost = $4,
            start_date = $5, end_date = $6, duration = $7, status = $8,
            updated_at = now()
        WHERE id = $9
        RETURNING *
        "#,
    )
    .bind(merged.property_id)
    .bind(merged.renovation_type)
    .bind(merged.description)
    .bind(merged.cost)
    .bind(merged.start_date)
    .bind(merged.end_date)
    .bind(duration)
    .bind(merged.status)
    .bind(id)
    .fetch_one(pool)
    .await?)
}

pub async fn delete_renovation_internal(pool: &DbPool, id: i32) -> PortfolioResult<()> {
    let result = sqlx::query("DELETE FROM renovations WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(PortfolioError::NotFound("Renovation not found".into()));
    }
    Ok(())
}

// --- Axum Handlers ---

pub async fn list_renovations(
    State(state): State<AppState>,
    Query(filter): Query<RenovationFilter>,
) -> PortfolioResult<Json<Vec<Renovation>>> {
    Ok(Json(list_renovations_internal(&state.pool, filter).await?))
}

pub async fn get_renovation(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> PortfolioResult<Json<Renovation>> {
    Ok(Json(get_renovation_internal(&state.pool, id).await?))
}

pub async fn create_renovation(
    State(state): State<AppState>,
    Json(input): Json<RenovationInput>,
) -> PortfolioResult<Json<Renovation>> {
    tracing::info!(
        "Recording {} renovation for property {}",
        input.renovation_type,
        input.property_id
    );
    Ok(Json(create_renovation_internal(&state.pool, input).await?))
}

pub async fn update_renovation(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(update): Json<RenovationUpdate>,
) -> PortfolioResult<Json<Renovation>> {
    Ok(Json(
        update_renovation_internal(&state.pool, id, update).await?,
    ))
}

pub async fn delete_renovation(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> PortfolioResult<Json<serde_json::Value>> {
    delete_renovation_internal(&state.pool, id).await?;
    Ok(Json(
        serde_json::json!({ "message": "Renovation deleted successfully" }),
    ))
}
