//! Instructions returned to the checkout host.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTransformResult {
    pub operations: Vec<Operation>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "lineExpand")]
    LineExpand(ExpandOperation),
}

/// Replace one cart line with `expanded_cart_items`, in order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandOperation {
    pub cart_line_id: String,
    pub expanded_cart_items: Vec<ExpandedItem>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandedItem {
    pub merchandise_id: String,
    pub quantity: u32,
}

impl CartTransformResult {
    /// The canonical "leave the cart alone" answer.
    pub fn no_changes() -> Self { Self { operations: Vec::new() } }

    pub fn is_empty(&self) -> bool { self.operations.is_empty() }
}
