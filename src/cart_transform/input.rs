//! Cart snapshot handed to the transform by the checkout host.

use serde::Deserialize;
use serde_json::Value;

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct CartTransformInput {
    pub cart: Cart,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub lines: Vec<CartLine>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CartLine {
    pub id: String,
    #[serde(default)]
    pub quantity: Option<u32>,
    pub merchandise: Merchandise,
}

/// What a cart line is selling. Only variant-backed lines can be bundles.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "__typename")]
pub enum Merchandise {
    ProductVariant(VariantMerchandise),
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct VariantMerchandise {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub component_reference: Option<Metafield>,
    #[serde(default)]
    pub component_quantities: Option<Metafield>,
}

/// A metafield as the host delivers it: `jsonValue` is already decoded,
/// `value` is the stored JSON text.
///
/// Reading one never fails. Whatever arrives is kept and only judged when the
/// line is classified, so a badly shaped field costs that line and nothing else.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct Metafield {
    pub json_value: Option<Value>,
    pub value: Option<Value>,
    /// Set when the field was not an object at all.
    pub unexpected: Option<Value>,
}

/// The field's shape cannot carry a list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnreadableMetafield;

impl From<Value> for Metafield {
    fn from(raw: Value) -> Self {
        match raw {
            Value::Object(mut fields) => Self { json_value: fields.remove("jsonValue"), value: fields.remove("value"), unexpected: None },
            other => Self { unexpected: Some(other), ..Self::default() },
        }
    }
}

impl Metafield {
    pub fn json(value: Value) -> Self { Self { json_value: Some(value), ..Self::default() } }

    pub fn text(raw: impl Into<String>) -> Self { Self { value: Some(Value::String(raw.into())), ..Self::default() } }

    /// Decoded value; `Ok(None)` when the field carries nothing. A `value`
    /// that is not valid JSON decodes to itself as a string, which the
    /// caller rejects as the wrong shape.
    pub fn decoded(&self) -> Result<Option<Value>, UnreadableMetafield> {
        if self.unexpected.is_some() {
            return Err(UnreadableMetafield);
        }
        match (&self.json_value, &self.value) {
            (Some(Value::String(raw)), _) => Ok(Some(decode_text(raw))),
            (Some(v), _) if !v.is_null() => Ok(Some(v.clone())),
            (_, None | Some(Value::Null)) => Ok(None),
            (_, Some(Value::String(raw))) => Ok(Some(decode_text(raw))),
            (_, Some(_)) => Err(UnreadableMetafield),
        }
    }
}

fn decode_text(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

impl CartTransformInput {
    pub fn from_lines(lines: Vec<CartLine>) -> Self { Self { cart: Cart { lines } } }
}
