//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Closed timestamp range query, in seconds since the epoch.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RangeParams {
    /// Inclusive start.
    pub from: i64,
    /// Inclusive end.
    pub to: i64,
}

/// Number of items in a list response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListMeta {
    /// Items returned.
    pub count: usize,
}
