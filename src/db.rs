use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{FromRow, Pool, Postgres};
use std::str::FromStr;

use crate::error::{PortfolioError, PortfolioResult};

pub type DbPool = Pool<Postgres>;

pub async fn init_pool_with_options(opts: PgConnectOptions) -> PortfolioResult<DbPool> {
    // connect_lazy_with returns the pool immediately. It does not validate connection.
    Ok(PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .idle_timeout(std::time::Duration::from_secs(120))
        .max_lifetime(std::time::Duration::from_secs(300))
        .connect_lazy_with(opts))
}

pub async fn init_pool(database_url: &str) -> PortfolioResult<DbPool> {
    let opts = PgConnectOptions::from_str(database_url)
        .map_err(|e| PortfolioError::Internal(format!("Invalid DB URL: {}", e)))?
        .ssl_mode(PgSslMode::Disable);

    init_pool_with_options(opts).await
}

pub async fn init_database(pool: &DbPool) -> PortfolioResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database ready");
    Ok(())
}

/// A real-estate unit. Sales and renovations hang off it by foreign key.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Property {
    pub id: i32,
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
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A completed transaction for a property. A property may have several
/// sales (resale history).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Sale {
    pub id: i32,
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
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A work item performed on a property. `duration` is stored but always
/// written by the server as `end_date - start_date` in days.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Renovation {
    pub id: i32,
    pub property_id: i32,
    pub renovation_type: String,
    pub description: String,
    pub cost: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration: i32,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

// --- Analytics report rows ---

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct PropertyTypeDistribution {
    pub property_type: String,
    pub count: i64,
    pub total_value: f64,
    pub avg_value: f64,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct LocationDistribution {
    pub city: String,
    pub state: String,
    pub count: i64,
    pub avg_price: f64,
    pub total_value: f64,
}

#[derive(Debug, Default, Serialize, Deserialize, FromRow)]
pub struct PropertyOverview {
    pub avg_bedrooms: f64,
    pub avg_bathrooms: f64,
    pub avg_square_feet: f64,
    pub avg_lot_size: f64,
    pub min_square_feet: f64,
    pub max_square_feet: f64,
    pub total_properties: i64,
    pub total_value: f64,
    pub avg_property_value: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PropertyAnalytics {
    pub property_type_distribution: Vec<PropertyTypeDistribution>,
    pub location_distribution: Vec<LocationDistribution>,
    pub avg_bedrooms: f64,
    pub avg_bathrooms: f64,
    pub avg_square_feet: f64,
    pub avg_lot_size: f64,
    pub min_square_feet: f64,
    pub max_square_feet: f64,
    pub total_properties: i64,
    pub total_value: f64,
    pub avg_property_value: f64,
}

#[derive(Debug, Default, Serialize, Deserialize, FromRow)]
pub struct SaleOverview {
    pub total_sales: i64,
    pub total_revenue: f64,
    pub avg_sale_price: f64,
    pub min_sale_price: f64,
    pub max_sale_price: f64,
    pub avg_days_on_market: f64,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct SalesByPropertyType {
    pub property_type: String,
    pub count: i64,
    pub total: f64,
    pub avg_price: f64,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct PropertyTypeRoi {
    pub property_type: String,
    pub avg_roi: f64,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct MonthlyTrend {
    pub month: String,
    pub avg_price: f64,
    pub count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaleAnalytics {
    pub total_sales: i64,
    pub total_revenue: f64,
    pub avg_sale_price: f64,
    pub min_sale_price: f64,
    pub max_sale_price: f64,
    pub avg_days_on_market: f64,
    pub sales_by_property_type: Vec<SalesByPropertyType>,
    pub roi_by_property_type: Vec<PropertyTypeRoi>,
    pub monthly_trends: Vec<MonthlyTrend>,
}

#[derive(Debug, Default, Serialize, Deserialize, FromRow)]
pub struct RenovationOverview {
    pub total_renovations: i64,
    pub total_cost: f64,
    pub avg_cost: f64,
    pub avg_duration: f64,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct RenovationsByType {
    pub renovation_type: String,
    pub count: i64,
    pub total_cost: f64,
    pub avg_cost: f64,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct RenovationCostByPropertyType {
    pub property_type: String,
    pub total_cost: f64,
    pub avg_cost: f64,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct RenovationTypeRoi {
    pub renovation_type: String,
    pub avg_roi: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RenovationAnalytics {
    pub total_renovations: i64,
    pub total_cost: f64,
    pub avg_cost: f64,
    pub avg_duration: f64,
    pub renovations_by_type: Vec<RenovationsByType>,
    pub cost_by_property_type: Vec<RenovationCostByPropertyType>,
    pub roi_by_renovation_type: Vec<RenovationTypeRoi>,
}
