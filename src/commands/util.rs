use chrono::NaiveDate;

use crate::error::{PortfolioError, PortfolioResult};

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Property types the portfolio tracks. The column itself is free-form
/// text; this list backs the `/api/properties/types` endpoint.
pub const PROPERTY_TYPES: [&str; 4] = ["Single Family", "Condo", "Townhouse", "Apartment"];

/// Resolves `skip`/`limit` query params to a concrete page window.
/// `limit` outside [1, 100] is rejected rather than clamped.
pub fn resolve_page(skip: Option<i64>, limit: Option<i64>) -> PortfolioResult<(i64, i64)> {
    let skip = skip.unwrap_or(0);
    if skip < 0 {
        return Err(PortfolioError::Validation("skip must be >= 0".into()));
    }

    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(PortfolioError::Validation(format!(
            "limit must be between 1 and {}",
            MAX_LIMIT
        )));
    }

    Ok((skip, limit))
}

/// Whole days from start to end. The stored `duration` column is always
/// written from this, never from the client.
pub fn derive_duration(start_date: NaiveDate, end_date: NaiveDate) -> PortfolioResult<i32> {
    if end_date < start_date {
        return Err(PortfolioError::Validation(
            "end_date must be on or after start_date".into(),
        ));
    }
    Ok((end_date - start_date).num_days() as i32)
}

pub fn require_non_negative(field: &str, value: f64) -> PortfolioResult<()> {
    if value < 0.0 {
        return Err(PortfolioError::Validation(format!(
            "{} must be >= 0",
            field
        )));
    }
    Ok(())
}

pub fn require_non_negative_int(field: &str, value: i32) -> PortfolioResult<()> {
    if value < 0 {
        return Err(PortfolioError::Validation(format!(
            "{} must be >= 0",
            field
        )));
    }
    Ok(())
}
