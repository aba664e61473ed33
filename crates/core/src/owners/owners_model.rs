use serde::{Deserialize, Serialize};

/// A user or organization whose cash flow is tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub id: String,
    pub name: String,
    /// Currency projections fall back to when the owner has no balance snapshot.
    pub base_currency: String,
    pub is_active: bool,
}
