use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::db::{DbPool, Property};
use crate::error::{PortfolioError, PortfolioResult};
use crate::state::AppState;

use super::util::{require_non_negative, require_non_negative_int, resolve_page, PROPERTY_TYPES};

#[derive(Debug, Default, Deserialize)]
pub struct PropertyFilter {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub property_type: Option<String>,
    pub city: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_bedrooms: Option<f64>,
    pub max_bedrooms: Option<f64>,
    pub min_bathrooms: Option<f64>,
    pub max_bathrooms: Option<f64>,
    pub min_sqft: Option<i32>,
    pub max_sqft: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PropertyInput {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub property_type: String,
    pub bedrooms: f64,
    pub bathrooms: f64,
    pub square_feet: i32,
    pub lot_size: Option<f64>,
    pub year_built: Option<i32>,
    pub current_value: Option<f64>,
    pub purchase_price: Option<f64>,
}

/// Partial update: only supplied fields are written, the rest keep their
/// stored values.
#[derive(Debug, Default, Deserialize)]
pub struct PropertyUpdate {
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub property_type: Option<String>,
    pub bedrooms: Option<f64>,
    pub bathrooms: Option<f64>,
    pub square_feet: Option<i32>,
    pub lot_size: Option<f64>,
    pub year_built: Option<i32>,
    pub current_value: Option<f64>,
    pub purchase_price: Option<f64>,
}

fn validate_property(input: &PropertyInput) -> PortfolioResult<()> {
    if input.property_type.trim().is_empty() {
        return Err(PortfolioError::Validation(
            "property_type must not be empty".into(),
        ));
    }
    require_non_negative("bedrooms", input.bedrooms)?;
    require_non_negative("bathrooms", input.bathrooms)?;
    require_non_negative_int("square_feet", input.square_feet)?;
    if let Some(lot_size) = input.lot_size {
        require_non_negative("lot_size", lot_size)?;
    }
    if let Some(current_value) = input.current_value {
        require_non_negative("current_value", current_value)?;
    }
    if let Some(purchase_price) = input.purchase_price {
        require_non_negative("purchase_price", purchase_price)?;
    }
    Ok(())
}

pub async fn list_properties_internal(
    pool: &DbPool,
    filter: PropertyFilter,
) -> PortfolioResult<Vec<Property>> {
    let (skip, limit) = resolve_page(filter.skip, filter.limit)?;

    let sql = r#"
        SELECT * FROM properties
        WHERE ($1::TEXT IS NULL OR property_type = $1)
          AND ($2::TEXT IS NULL OR city ILIKE '%' || $2 || '%')
          AND ($3::DOUBLE PRECISION IS NULL OR current_value >= $3)
          AND ($4::DOUBLE PRECISION IS NULL OR current_value <= $4)
          AND ($5::DOUBLE PRECISION IS NULL OR bedrooms >= $5)
          AND ($6::DOUBLE PRECISION IS NULL OR bedrooms <= $6)
          AND ($7::DOUBLE PRECISION IS NULL OR bathrooms >= $7)
          AND ($8::DOUBLE PRECISION IS NULL OR bathrooms <= $8)
          AND ($9::INTEGER IS NULL OR square_feet >= $9)
          AND ($10::INTEGER IS NULL OR square_feet <= $10)
        ORDER BY id ASC
        OFFSET $11 LIMIT $12
    "#;

    Ok(sqlx::query_as::<_, Property>(sql)
        .bind(filter.property_type)
        .bind(filter.city)
        .bind(filter.min_price)
        .bind(filter.max_price)
        .bind(filter.min_bedrooms)
        .bind(filter.max_bedrooms)
        .bind(filter.min_bathrooms)
        .bind(filter.max_bathrooms)
        .bind(filter.min_sqft)
        .bind(filter.max_sqft)
        .bind(skip)
        .bind(limit)
        .fetch_all(pool)
        .await?)
}

pub async fn get_property_internal(pool: &DbPool, id: i32) -> PortfolioResult<Property> {
    sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| PortfolioError::NotFound("Property not found".into()))
}

/// Foreign-key pre-check shared by sale and renovation writes. The store
/// constraint would also reject a dangling reference, but this surfaces
/// it as a Validation error naming the field.
pub async fn ensure_property_exists(pool: &DbPool, property_id: i32) -> PortfolioResult<()> {
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM properties WHERE id = $1)")
        .bind(property_id)
        .fetch_one(pool)
        .await?;

    if !exists.0 {
        return Err(PortfolioError::Validation(format!(
            "property_id {} does not reference an existing property",
            property_id
        )));
    }
    Ok(())
}

pub async fn create_property_internal(
    pool: &DbPool,
    input: PropertyInput,
) -> PortfolioResult<Property> {
    validate_property(&input)?;

    Ok(sqlx::query_as::<_, Property>(
        r#"
        INSERT INTO properties
            (address, city, state, zip_code, property_type, bedrooms, bathrooms,
             square_feet, lot_size, year_built, current_value, purchase_price)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *
        "#,
    )
    .bind(input.address)
    .bind(input.city)
    .bind(input.state)
    .bind(input.zip_code)
    .bind(input.property_type)
    .bind(input.bedrooms)
    .bind(input.bathrooms)
    .bind(input.square_feet)
    .bind(input.lot_size)
    .bind(input.year_built)
    .bind(input.current_value)
    .bind(input.purchase_price)
    .fetch_one(pool)
    .await?)
}

pub async fn update_property_internal(
    pool: &DbPool,
    id: i32,
    update: PropertyUpdate,
) -> PortfolioResult<Property> {
    let existing = get_property_internal(pool, id).await?;

    let merged = PropertyInput {
        address: update.address.unwrap_or(existing.address),
        city: update.city.unwrap_or(existing.city),
        state: update.state.unwrap_or(existing.state),
        zip_code: update.zip_code.unwrap_or(existing.zip_code),
        property_type: update.property_type.unwrap_or(existing.property_type),
        bedrooms: update.bedrooms.unwrap_or(existing.bedrooms),
        bathrooms: update.bathrooms.unwrap_or(existing.bathrooms),
        square_feet: update.square_feet.unwrap_or(existing.square_feet),
        lot_size: update.lot_size.or(existing.lot_size),
        year_built: update.year_built.or(existing.year_built),
        current_value: update.current_value.or(existing.current_value),
        purchase_price: update.purchase_price.or(existing.purchase_price),
    };
    validate_property(&merged)?;

    Ok(sqlx::query_as::<_, Property>(
        r#"
        UPDATE properties SET
            address = $1, city = $2, state = $3, zip_code = $4, property_type = $5,
            bedrooms = $6, bathrooms = $7, square_feet = $8, lot_size = $9,
            year_built = $10, current_value = $11, purchase_price = $12,
            updated_at = now()
        WHERE id = $13
        RETURNING *
        "#,
    )
    .bind(merged.address)
    .bind(merged.city)
    .bind(merged.state)
    .bind(merged.zip_code)
    .bind(merged.property_type)
    .bind(merged.bedrooms)
    .bind(merged.bathrooms)
    .bind(merged.square_feet)
    .bind(merged.lot_size)
    .bind(merged.year_built)
    .bind(merged.current_value)
    .bind(merged.purchase_price)
    .bind(id)
    .fetch_one(pool)
    .await?)
}

pub async fn delete_property_internal(pool: &DbPool, id: i32) -> PortfolioResult<()> {
    get_property_internal(pool, id).await?;

    // Restrict policy: a property with recorded history cannot be removed.
    let dependents: (i64, i64) = sqlx::query_as(
        r#"
        SELECT
            (SELECT COUNT(*) FROM sales WHERE property_id = $1),
            (SELECT COUNT(*) FROM renovations WHERE property_id = $1)
        "#,
    )
    .bind(id)
    .fetch_one(pool)
    .await?;

    if dependents.0 > 0 || dependents.1 > 0 {
        return Err(PortfolioError::Validation(format!(
            "Cannot delete property {}: {} sale(s) and {} renovation(s) reference it",
            id, dependents.0, dependents.1
        )));
    }

    sqlx::query("DELETE FROM properties WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn list_cities_internal(pool: &DbPool) -> PortfolioResult<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as("SELECT DISTINCT city FROM properties ORDER BY city")
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(|r| r.0).collect())
}

// --- Axum Handlers ---

pub async fn list_properties(
    State(state): State<AppState>,
    Query(filter): Query<PropertyFilter>,
) -> PortfolioResult<Json<Vec<Property>>> {
    Ok(Json(list_properties_internal(&state.pool, filter).await?))
}

pub async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> PortfolioResult<Json<Property>> {
    Ok(Json(get_property_internal(&state.pool, id).await?))
}

pub async fn create_property(
    State(state): State<AppState>,
    Json(input): Json<PropertyInput>,
) -> PortfolioResult<Json<Property>> {
    tracing::info!("Creating property at {}", input.address);
    Ok(Json(create_property_internal(&state.pool, input).await?))
}

pub async fn update_property(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(update): Json<PropertyUpdate>,
) -> PortfolioResult<Json<Property>> {
    Ok(Json(update_property_internal(&state.pool, id, update).await?))
}

pub async fn delete_property(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> PortfolioResult<Json<serde_json::Value>> {
    delete_property_internal(&state.pool, id).await?;
    Ok(Json(
        serde_json::json!({ "message": "Property deleted successfully" }),
    ))
}

pub async fn list_property_types() -> Json<Vec<&'static str>> {
    Json(PROPERTY_TYPES.to_vec())
}

pub async fn list_cities(State(state): State<AppState>) -> PortfolioResult<Json<Vec<String>>> {
    Ok(Json(list_cities_internal(&state.pool).await?))
}
