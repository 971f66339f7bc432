//! Line items and their units of measure.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Unit in which a line item's quantity is expressed.
///
/// Serializes to the lowercase wire value expected by the API
/// (`"unit"`, `"kg"`, `"m²"`, ...). [`UnitMeasure::Unit`] is the default
/// wherever the unit is omitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitMeasure {
    /// Discrete units.
    #[default]
    #[serde(rename = "unit")]
    Unit,
    /// Kilograms.
    #[serde(rename = "kg")]
    Kilogram,
    /// Grams.
    #[serde(rename = "g")]
    Gram,
    /// Liters.
    #[serde(rename = "l")]
    Liter,
    /// Meters.
    #[serde(rename = "m")]
    Meter,
    /// Square meters.
    #[serde(rename = "m²")]
    SquareMeter,
    /// Hours.
    #[serde(rename = "hour")]
    Hour,
    /// Days.
    #[serde(rename = "day")]
    Day,
}

impl UnitMeasure {
    /// All units, in display order.
    pub const ALL: [Self; 8] = [
        Self::Unit,
        Self::Kilogram,
        Self::Gram,
        Self::Liter,
        Self::Meter,
        Self::SquareMeter,
        Self::Hour,
        Self::Day,
    ];

    /// Returns the wire value of this unit.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Kilogram => "kg",
            Self::Gram => "g",
            Self::Liter => "l",
            Self::Meter => "m",
            Self::SquareMeter => "m²",
            Self::Hour => "hour",
            Self::Day => "day",
        }
    }
}

impl Display for UnitMeasure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown unit of measure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown unit of measure: {0}")]
pub struct UnknownUnitMeasure(pub String);

impl FromStr for UnitMeasure {
    type Err = UnknownUnitMeasure;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|unit| unit.as_str() == s)
            .ok_or_else(|| UnknownUnitMeasure(s.to_owned()))
    }
}

/// One product or service entry in an order, as configured by the user.
///
/// # Example
///
/// ```rust
/// use mpqr::item::{LineItem, UnitMeasure};
///
/// let item: LineItem = serde_json::from_value(serde_json::json!({
///     "title": "Coffee",
///     "unitPrice": 2.5,
///     "quantity": 2
/// }))
/// .unwrap();
///
/// assert_eq!(item.unit_measure, UnitMeasure::Unit);
/// assert!((item.line_total() - 5.0).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Product title.
    pub title: String,

    /// Price of a single unit, never negative.
    pub unit_price: f64,

    /// Optional product description.
    #[serde(default)]
    pub description: String,

    /// Number of units, at least 1.
    #[serde(default = "default_quantity")]
    pub quantity: u32,

    /// Unit in which `quantity` is expressed.
    #[serde(default)]
    pub unit_measure: UnitMeasure,
}

const fn default_quantity() -> u32 {
    1
}

impl LineItem {
    /// Creates a single-unit item with an empty description.
    #[must_use]
    pub fn new(title: impl Into<String>, unit_price: f64) -> Self {
        Self {
            title: title.into(),
            unit_price,
            description: String::new(),
            quantity: 1,
            unit_measure: UnitMeasure::default(),
        }
    }

    /// Sets the quantity.
    #[must_use]
    pub const fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the unit of measure.
    #[must_use]
    pub const fn with_unit_measure(mut self, unit_measure: UnitMeasure) -> Self {
        self.unit_measure = unit_measure;
        self
    }

    /// Returns `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unit_measure_wire_values() {
        assert_eq!(
            serde_json::to_value(UnitMeasure::SquareMeter).unwrap(),
            json!("m²")
        );
        assert_eq!(
            serde_json::from_value::<UnitMeasure>(json!("kg")).unwrap(),
            UnitMeasure::Kilogram
        );
        for unit in UnitMeasure::ALL {
            assert_eq!(unit.as_str().parse::<UnitMeasure>().unwrap(), unit);
        }
    }

    #[test]
    fn unknown_unit_measure_is_rejected() {
        assert_eq!(
            "ton".parse::<UnitMeasure>(),
            Err(UnknownUnitMeasure("ton".to_owned()))
        );
        assert!(serde_json::from_value::<UnitMeasure>(json!("ton")).is_err());
    }

    #[test]
    fn line_item_defaults() {
        let item: LineItem =
            serde_json::from_value(json!({ "title": "Tea", "unitPrice": 1.25 })).unwrap();
        assert_eq!(item.description, "");
        assert_eq!(item.quantity, 1);
        assert_eq!(item.unit_measure, UnitMeasure::Unit);
    }

    #[test]
    fn line_total_multiplies_price_by_quantity() {
        let item = LineItem::new("Flour", 1.5)
            .with_quantity(4)
            .with_unit_measure(UnitMeasure::Kilogram);
        assert!((item.line_total() - 6.0).abs() < f64::EPSILON);
    }
}
