//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Optional academic-year filter (`?year=`).
#[derive(Debug, Default, Deserialize)]
pub struct YearParams {
    pub year: Option<i32>,
}
