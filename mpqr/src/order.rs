//! Order configuration, wire types and the order builder.
//!
//! [`OrderConfig`] is what a user fills in (camelCase keys, as in the node
//! form). [`OrderRequest`] is what is sent to the API (snake_case keys).
//! [`build_order`] converts one into the other.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::item::{LineItem, UnitMeasure};
use crate::reference::ReferenceGenerator;

#[cfg(feature = "telemetry")]
use tracing::{debug, instrument};

/// Order title used when a configuration document omits it.
pub const DEFAULT_TITLE: &str = "Orden de compra";

/// Order description used when a configuration document omits it.
pub const DEFAULT_DESCRIPTION: &str = "Pago con QR";

/// User-supplied configuration for one QR order.
///
/// # Example
///
/// ```rust
/// use mpqr::OrderConfig;
///
/// let config: OrderConfig = serde_json::from_value(serde_json::json!({
///     "externalReference": "sale-17",
///     "items": [{ "title": "Coffee", "unitPrice": 2.5, "quantity": 2 }]
/// }))
/// .unwrap();
///
/// assert_eq!(config.title, "Orden de compra");
/// assert_eq!(config.items.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfig {
    /// Purchase title.
    #[serde(default = "default_title")]
    pub title: String,

    /// Purchase description.
    #[serde(default = "default_description")]
    pub description: String,

    /// Identifier to reconcile the order with an external sales system.
    /// Generated when absent or blank.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_reference: Option<String>,

    /// Products or services being charged, in order.
    #[serde(default)]
    pub items: Vec<LineItem>,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_owned()
}

fn default_description() -> String {
    DEFAULT_DESCRIPTION.to_owned()
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            description: default_description(),
            external_reference: None,
            items: Vec::new(),
        }
    }
}

impl OrderConfig {
    /// Creates a configuration with the given title and description and no items.
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    /// Sets the external reference.
    #[must_use]
    pub fn with_external_reference(mut self, reference: impl Into<String>) -> Self {
        self.external_reference = Some(reference.into());
        self
    }

    /// Appends a line item.
    #[must_use]
    pub fn with_item(mut self, item: LineItem) -> Self {
        self.items.push(item);
        self
    }
}

/// A line item as transmitted to the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireItem {
    /// Product title.
    pub title: String,
    /// Price of a single unit.
    pub unit_price: f64,
    /// Product description, empty when not provided.
    pub description: String,
    /// Number of units.
    pub quantity: u32,
    /// Unit in which `quantity` is expressed.
    pub unit_measure: UnitMeasure,
    /// `unit_price × quantity`.
    pub total_amount: f64,
}

impl From<&LineItem> for WireItem {
    fn from(item: &LineItem) -> Self {
        Self {
            title: item.title.clone(),
            unit_price: item.unit_price,
            description: item.description.clone(),
            quantity: item.quantity,
            unit_measure: item.unit_measure,
            total_amount: item.line_total(),
        }
    }
}

/// Request body for the QR order endpoint.
///
/// `total_amount` is always the sum of the items' `total_amount` values;
/// there is no way to set it independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Reconciliation identifier.
    pub external_reference: String,
    /// Purchase title.
    pub title: String,
    /// Purchase description.
    pub description: String,
    /// Sum of all line totals.
    pub total_amount: f64,
    /// Line items, in configuration order.
    pub items: Vec<WireItem>,
}

/// Builds the API request body for an order.
///
/// Line totals are summed in item order. A blank or missing external
/// reference is replaced by one from `references`.
///
/// # Errors
///
/// Returns a [`ValidationError`] when `items` is empty, when an item has a
/// blank title, a negative or non-finite unit price or a zero quantity, or
/// when the order total is not finite.
///
/// # Example
///
/// ```rust
/// use mpqr::reference::TimestampReferences;
/// use mpqr::{LineItem, OrderConfig, build_order};
///
/// let config = OrderConfig::new("Orden de compra", "Pago")
///     .with_item(LineItem::new("Coffee", 2.5).with_quantity(2));
/// let order = build_order(&config, &TimestampReferences::new()).unwrap();
///
/// assert!((order.total_amount - 5.0).abs() < f64::EPSILON);
/// assert!(!order.external_reference.is_empty());
/// ```
#[cfg_attr(
    feature = "telemetry",
    instrument(name = "mpqr.build_order", skip_all, err, fields(items = config.items.len()))
)]
pub fn build_order<G>(config: &OrderConfig, references: &G) -> Result<OrderRequest, ValidationError>
where
    G: ReferenceGenerator + ?Sized,
{
    if config.items.is_empty() {
        return Err(ValidationError::EmptyItems);
    }

    let mut items = Vec::with_capacity(config.items.len());
    let mut total_amount = 0.0_f64;
    for (index, item) in config.items.iter().enumerate() {
        validate_item(index, item)?;
        let wire = WireItem::from(item);
        total_amount += wire.total_amount;
        items.push(wire);
    }
    if !total_amount.is_finite() {
        return Err(ValidationError::NonFiniteTotal);
    }

    let external_reference = match config.external_reference.as_deref() {
        Some(reference) if !reference.trim().is_empty() => reference.to_owned(),
        _ => references.generate(),
    };

    let order = OrderRequest {
        external_reference,
        title: config.title.clone(),
        description: config.description.clone(),
        total_amount,
        items,
    };

    #[cfg(feature = "telemetry")]
    debug!(
        external_reference = %order.external_reference,
        total_amount = order.total_amount,
        "Built QR order"
    );

    Ok(order)
}

fn validate_item(index: usize, item: &LineItem) -> Result<(), ValidationError> {
    if item.title.trim().is_empty() {
        return Err(ValidationError::EmptyItemTitle { index });
    }
    if !item.unit_price.is_finite() || item.unit_price < 0.0 {
        return Err(ValidationError::InvalidUnitPrice {
            index,
            unit_price: item.unit_price,
        });
    }
    if item.quantity == 0 {
        return Err(ValidationError::ZeroQuantity { index });
    }
    Ok(())
}
