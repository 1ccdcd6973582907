//! Cart transform: expands bundle lines into their component variants.
//!
//! The host calls [`evaluate`] once per cart calculation with a complete,
//! immutable snapshot of the cart. Every line whose merchandise is a product
//! variant carrying a non-empty `component_reference` list becomes one
//! `lineExpand` operation; every other line is left alone.
//!
//! Evaluation is a single pass over the lines and, for each bundle line, a
//! single pass over its reference list. It holds no state between calls and
//! performs no I/O, so it is safe to run inside the host's sandbox and to run
//! concurrently for unrelated carts.
//!
//! Metadata problems never fail the cart. A line whose references are not a
//! list of ids, or whose quantities are not a list, is skipped and reported
//! through [`evaluate_with_report`] for whoever wants to log it.

mod input;
mod output;

use std::io::{Read, Write};

use serde::Serialize;
use serde_json::Value;

pub use input::{Cart, CartLine, CartTransformInput, Merchandise, Metafield, UnreadableMetafield, VariantMerchandise};
pub use output::{CartTransformResult, ExpandOperation, ExpandedItem, Operation};

/// Quantity used when a reference has no usable quantity at its position.
pub const DEFAULT_COMPONENT_QUANTITY: u32 = 1;

/// Decision plus the lines that were skipped because of bad metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub result: CartTransformResult,
    pub skipped: Vec<SkippedLine>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedLine {
    pub cart_line_id: String,
    pub reason: SkipReason,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MalformedReferences,
    MalformedQuantities,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedReferences => write!(f, "component_reference is not a list of variant ids"),
            Self::MalformedQuantities => write!(f, "component_quantities is not a list"),
        }
    }
}

enum LineClass {
    Expand(ExpandOperation),
    Plain,
    Malformed(SkipReason),
}

pub fn evaluate(input: &CartTransformInput) -> CartTransformResult {
    evaluate_with_report(input).result
}

pub fn evaluate_with_report(input: &CartTransformInput) -> Evaluation {
    let mut operations = Vec::new();
    let mut skipped = Vec::new();

    for line in &input.cart.lines {
        match classify(line) {
            LineClass::Expand(op) => operations.push(Operation::LineExpand(op)),
            LineClass::Plain => {}
            LineClass::Malformed(reason) => skipped.push(SkippedLine { cart_line_id: line.id.clone(), reason }),
        }
    }

    let result = if operations.is_empty() { CartTransformResult::no_changes() } else { CartTransformResult { operations } };
    Evaluation { result, skipped }
}

/// Reads one JSON cart snapshot and writes the JSON decision.
pub fn run<R: Read, W: Write>(reader: R, writer: W) -> serde_json::Result<()> {
    let input: CartTransformInput = serde_json::from_reader(reader)?;
    serde_json::to_writer(writer, &evaluate(&input))
}

fn classify(line: &CartLine) -> LineClass {
    let Merchandise::ProductVariant(variant) = &line.merchandise else {
        return LineClass::Plain;
    };

    let references = match component_references(variant.component_reference.as_ref()) {
        Ok(Some(refs)) => refs,
        Ok(None) => return LineClass::Plain,
        Err(reason) => return LineClass::Malformed(reason),
    };
    let quantities = match component_quantities(variant.component_quantities.as_ref()) {
        Ok(qtys) => qtys,
        Err(reason) => return LineClass::Malformed(reason),
    };

    let expanded_cart_items = references
        .into_iter()
        .enumerate()
        .map(|(idx, merchandise_id)| ExpandedItem {
            merchandise_id,
            quantity: quantities.get(idx).copied().flatten().unwrap_or(DEFAULT_COMPONENT_QUANTITY),
        })
        .collect();

    LineClass::Expand(ExpandOperation { cart_line_id: line.id.clone(), expanded_cart_items })
}

/// `Ok(None)` means "not a bundle line".
fn component_references(field: Option<&Metafield>) -> Result<Option<Vec<String>>, SkipReason> {
    let decoded = field.map(Metafield::decoded).transpose().map_err(|_| SkipReason::MalformedReferences)?.flatten();
    match decoded {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) if items.is_empty() => Ok(None),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(id) if !id.is_empty() => Ok(id),
                _ => Err(SkipReason::MalformedReferences),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(_) => Err(SkipReason::MalformedReferences),
    }
}

/// Positional quantities; `None` entries fall back to the default.
fn component_quantities(field: Option<&Metafield>) -> Result<Vec<Option<u32>>, SkipReason> {
    let decoded = field.map(Metafield::decoded).transpose().map_err(|_| SkipReason::MalformedQuantities)?.flatten();
    match decoded {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.iter().map(positive_quantity).collect()),
        Some(_) => Err(SkipReason::MalformedQuantities),
    }
}

fn positive_quantity(value: &Value) -> Option<u32> {
    let raw = match value {
        Value::Number(n) => match n.as_u64() {
            Some(q) => q,
            // Integral floats such as `2.0` still count.
            None => n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 1.0 && *f <= f64::from(u32::MAX))? as u64,
        },
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    u32::try_from(raw).ok().filter(|q| *q >= 1)
}
