//! Metafields written to the platform so the cart transform and the
//! storefront can find bundle data without a lookup.

use serde::Serialize;

pub const NAMESPACE: &str = "custom";
pub const COMPONENT_REFERENCE_KEY: &str = "component_reference";
pub const COMPONENT_QUANTITIES_KEY: &str = "component_quantities";
pub const BUNDLE_OFFERS_KEY: &str = "bundle_offers";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OwnerType {
    Product,
    #[serde(rename = "PRODUCTVARIANT")]
    ProductVariant,
}

/// One `metafieldsSet` entry. `value` is always a JSON-encoded string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetafieldInput {
    pub owner_id: String,
    pub namespace: String,
    pub key: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

impl MetafieldInput {
    pub fn new(owner_id: &str, key: &str, kind: &str, value: &impl Serialize) -> serde_json::Result<Self> {
        Ok(Self {
            owner_id: owner_id.to_string(),
            namespace: NAMESPACE.to_string(),
            key: key.to_string(),
            kind: kind.to_string(),
            value: serde_json::to_string(value)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetafieldDefinition {
    pub key: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub namespace: &'static str,
    pub name: &'static str,
    pub owner_type: OwnerType,
}

/// Definitions the shop needs before any bundle metafield can be written.
pub fn definitions() -> Vec<MetafieldDefinition> {
    vec![
        MetafieldDefinition { key: COMPONENT_REFERENCE_KEY, kind: "list.variant_reference", namespace: NAMESPACE, name: "Bundle component reference", owner_type: OwnerType::ProductVariant },
        MetafieldDefinition { key: COMPONENT_QUANTITIES_KEY, kind: "list.number_integer", namespace: NAMESPACE, name: "Bundle component quantities", owner_type: OwnerType::ProductVariant },
        MetafieldDefinition { key: BUNDLE_OFFERS_KEY, kind: "json", namespace: NAMESPACE, name: "Bundle offers", owner_type: OwnerType::Product },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_value_is_json_encoded() {
        let m = MetafieldInput::new("gid://shopify/ProductVariant/9", COMPONENT_QUANTITIES_KEY, "list.number_integer", &vec![2, 1]).unwrap();
        assert_eq!(m.value, "[2,1]");
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["ownerId"], "gid://shopify/ProductVariant/9");
        assert_eq!(json["type"], "list.number_integer");
    }
    #[test]
    fn test_definitions_owner_types() {
        let defs = definitions();
        assert_eq!(defs.len(), 3);
        assert_eq!(serde_json::to_value(defs[0].owner_type).unwrap(), "PRODUCTVARIANT");
        assert_eq!(serde_json::to_value(defs[2].owner_type).unwrap(), "PRODUCT");
    }
}
