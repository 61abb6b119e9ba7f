use axum::{extract::State, Json};

use crate::db::{
    DbPool, LocationDistribution, MonthlyTrend, PropertyAnalytics, PropertyOverview,
    PropertyTypeDistribution, PropertyTypeRoi, RenovationAnalytics, RenovationCostByPropertyType,
    RenovationOverview, RenovationTypeRoi, RenovationsByType, SaleAnalytics, SaleOverview,
    SalesByPropertyType,
};
use crate::error::PortfolioResult;
use crate::state::AppState;

/// Distribution, location and overall stats for the property table.
/// Every aggregate reports 0 on an empty table or an all-NULL group.
pub async fn get_property_analytics_internal(pool: &DbPool) -> PortfolioResult<PropertyAnalytics> {
    let property_type_distribution = sqlx::query_as::<_, PropertyTypeDistribution>(
        r#"
        SELECT
            property_type,
            COUNT(*) AS count,
            CAST(COALESCE(SUM(current_value), 0) AS DOUBLE PRECISION) AS total_value,
            CAST(COALESCE(AVG(current_value), 0) AS DOUBLE PRECISION) AS avg_value
        FROM properties
        GROUP BY property_type
        ORDER BY property_type
        "#,
    )
    .fetch_all(pool)
    .await?;

    let location_distribution = sqlx::query_as::<_, LocationDistribution>(
        r#"
        SELECT
            city,
            state,
            COUNT(*) AS count,
            CAST(COALESCE(AVG(current_value), 0) AS DOUBLE PRECISION) AS avg_price,
            CAST(COALESCE(SUM(current_value), 0) AS DOUBLE PRECISION) AS total_value
        FROM properties
        GROUP BY city, state
        ORDER BY city, state
        "#,
    )
    .fetch_all(pool)
    .await?;

    let overview = sqlx::query_as::<_, PropertyOverview>(
        r#"
        SELECT
            CAST(COALESCE(AVG(bedrooms), 0) AS DOUBLE PRECISION) AS avg_bedrooms,
            CAST(COALESCE(AVG(bathrooms), 0) AS DOUBLE PRECISION) AS avg_bathrooms,
            CAST(COALESCE(AVG(square_feet), 0) AS DOUBLE PRECISION) AS avg_square_feet,
            CAST(COALESCE(AVG(lot_size), 0) AS DOUBLE PRECISION) AS avg_lot_size,
            CAST(COALESCE(MIN(square_feet), 0) AS DOUBLE PRECISION) AS min_square_feet,
            CAST(COALESCE(MAX(square_feet), 0) AS DOUBLE PRECISION) AS max_square_feet,
            COUNT(*) AS total_properties,
            CAST(COALESCE(SUM(current_value), 0) AS DOUBLE PRECISION) AS total_value,
            CAST(COALESCE(AVG(current_value), 0) AS DOUBLE PRECISION) AS avg_property_value
        FROM properties
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(PropertyAnalytics {
        property_type_distribution,
        location_distribution,
        avg_bedrooms: overview.avg_bedrooms,
        avg_bathrooms: overview.avg_bathrooms,
        avg_square_feet: overview.avg_square_feet,
        avg_lot_size: overview.avg_lot_size,
        min_square_feet: overview.min_square_feet,
        max_square_feet: overview.max_square_feet,
        total_properties: overview.total_properties,
        total_value: overview.total_value,
        avg_property_value: overview.avg_property_value,
    })
}

/// Sales totals, per-property-type stats, ROI per property type and
/// trailing-year monthly trends.
pub async fn get_sale_analytics_internal(pool: &DbPool) -> PortfolioResult<SaleAnalytics> {
    let overview = sqlx::query_as::<_, SaleOverview>(
        r#"
        SELECT
            COUNT(*) AS total_sales,
            CAST(COALESCE(SUM(sale_price), 0) AS DOUBLE PRECISION) AS total_revenue,
            CAST(COALESCE(AVG(sale_price), 0) AS DOUBLE PRECISION) AS avg_sale_price,
            CAST(COALESCE(MIN(sale_price), 0) AS DOUBLE PRECISION) AS min_sale_price,
            CAST(COALESCE(MAX(sale_price), 0) AS DOUBLE PRECISION) AS max_sale_price,
            CAST(COALESCE(AVG(days_on_market), 0) AS DOUBLE PRECISION) AS avg_days_on_market
        FROM sales
        "#,
    )
    .fetch_one(pool)
    .await?;

    let sales_by_property_type = sqlx::query_as::<_, SalesByPropertyType>(
        r#"
        SELECT
            p.property_type,
            COUNT(*) AS count,
            CAST(COALESCE(SUM(s.sale_price), 0) AS DOUBLE PRECISION) AS total,
            CAST(COALESCE(AVG(s.sale_price), 0) AS DOUBLE PRECISION) AS avg_price
        FROM sales s
        JOIN properties p ON s.property_id = p.id
        GROUP BY p.property_type
        ORDER BY p.property_type
        "#,
    )
    .fetch_all(pool)
    .await?;

    // Rows with a missing or non-positive purchase price (or a non-positive
    // sale price) are excluded rather than risking a division by zero.
    let roi_by_property_type = sqlx::query_as::<_, PropertyTypeRoi>(
        r#"
        SELECT
            p.property_type,
            CAST(AVG((s.sale_price - p.purchase_price) / p.purchase_price * 100) AS DOUBLE PRECISION) AS avg_roi
        FROM sales s
        JOIN properties p ON s.property_id = p.id
        WHERE p.purchase_price > 0 AND s.sale_price > 0
        GROUP BY p.property_type
        ORDER BY p.property_type
        "#,
    )
    .fetch_all(pool)
    .await?;

    let monthly_trends = sqlx::query_as::<_, MonthlyTrend>(
        r#"
        SELECT
            TO_CHAR(date_trunc('month', sale_date), 'YYYY-MM') AS month,
            CAST(COALESCE(AVG(sale_price), 0) AS DOUBLE PRECISION) AS avg_price,
            COUNT(*) AS count
        FROM sales
        WHERE sale_date >= CURRENT_DATE - INTERVAL '365 days'
        GROUP BY date_trunc('month', sale_date)
        ORDER BY date_trunc('month', sale_date)
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(SaleAnalytics {
        total_sales: overview.total_sales,
        total_revenue: overview.total_revenue,
        avg_sale_price: overview.avg_sale_price,
        min_sale_price: overview.min_sale_price,
        max_sale_price: overview.max_sale_price,
        avg_days_on_market: overview.avg_days_on_market,
        sales_by_property_type,
        roi_by_property_type,
        monthly_trends,
    })
}

/// Renovation totals, per-type and per-property-type costs, and ROI per
/// renovation type.
pub async fn get_renovation_analytics_internal(
    pool: &DbPool,
) -> PortfolioResult<RenovationAnalytics> {
    let overview = sqlx::query_as::<_, RenovationOverview>(
        r#"
        SELECT
            COUNT(*) AS total_renovations,
            CAST(COALESCE(SUM(cost), 0) AS DOUBLE PRECISION) AS total_cost,
            CAST(COALESCE(AVG(cost), 0) AS DOUBLE PRECISION) AS avg_cost,
            CAST(COALESCE(AVG(duration), 0) AS DOUBLE PRECISION) AS avg_duration
        FROM renovations
        "#,
    )
    .fetch_one(pool)
    .await?;

    let renovations_by_type = sqlx::query_as::<_, RenovationsByType>(
        r#"
        SELECT
            renovation_type,
            COUNT(*) AS count,
            CAST(COALESCE(SUM(cost), 0) AS DOUBLE PRECISION) AS total_cost,
            CAST(COALESCE(AVG(cost), 0) AS DOUBLE PRECISION) AS avg_cost
        FROM renovations
        GROUP BY renovation_type
        ORDER BY renovation_type
        "#,
    )
    .fetch_all(pool)
    .await?;

    let cost_by_property_type = sqlx::query_as::<_, RenovationCostByPropertyType>(
        r#"
        SELECT
            p.property_type,
            CAST(COALESCE(SUM(r.cost), 0) AS DOUBLE PRECISION) AS total_cost,
            CAST(COALESCE(AVG(r.cost), 0) AS DOUBLE PRECISION) AS avg_cost
        FROM renovations r
        JOIN properties p ON r.property_id = p.id
        GROUP BY p.property_type
        ORDER BY p.property_type
        "#,
    )
    .fetch_all(pool)
    .await?;

    // Same denominator guard as sale ROI: rows that would divide by a
    // missing or non-positive basis are excluded.
    let roi_by_renovation_type = sqlx::query_as::<_, RenovationTypeRoi>(
        r#"
        SELECT
            r.renovation_type,
            CAST(AVG((p.current_value - p.purchase_price - r.cost)
                     / (p.purchase_price + r.cost) * 100) AS DOUBLE PRECISION) AS avg_roi
        FROM renovations r
        JOIN properties p ON r.property_id = p.id
        WHERE p.current_value IS NOT NULL
          AND p.purchase_price > 0
          AND (p.purchase_price + r.cost) > 0
        GROUP BY r.renovation_type
        ORDER BY r.renovation_type
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(RenovationAnalytics {
        total_renovations: overview.total_renovations,
        total_cost: overview.total_cost,
        avg_cost: overview.avg_cost,
        avg_duration: overview.avg_duration,
        renovations_by_type,
        cost_by_property_type,
        roi_by_renovation_type,
    })
}

// --- Axum Handlers ---

pub async fn get_property_analytics(
    State(state): State<AppState>,
) -> PortfolioResult<Json<PropertyAnalytics>> {
    Ok(Json(get_property_analytics_internal(&state.pool).await?))
}

pub async fn get_sale_analytics(
    State(state): State<AppState>,
) -> PortfolioResult<Json<SaleAnalytics>> {
    Ok(Json(get_sale_analytics_internal(&state.pool).await?))
}

pub async fn get_renovation_analytics(
    State(state): State<AppState>,
) -> PortfolioResult<Json<RenovationAnalytics>> {
    Ok(Json(get_renovation_analytics_internal(&state.pool).await?))
}
