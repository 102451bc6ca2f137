use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Shapes mirror the upstream lookup service; only code and name are kept.

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Province {
    pub code: u32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct District {
    pub code: u32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Ward {
    pub code: u32,
    pub name: String,
}
