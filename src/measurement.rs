//! Units of measure and the unit-price normalizer.
//!
//! Purchases are logged in whatever unit is printed on the packet, so prices
//! are only comparable once every mass unit has been converted to kilograms
//! and every volume unit to litres. The conversion table in this module is
//! the single source of truth; any client-side preview of a unit price is
//! advisory only and must defer to the value computed here at write time.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

/// Kilograms per ounce (avoirdupois).
const KILOGRAMS_PER_OUNCE: f64 = 0.0283495;

/// Kilograms per pound (avoirdupois).
const KILOGRAMS_PER_POUND: f64 = 0.453592;

/// A unit of measure that can be entered when logging a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    /// Grams.
    #[serde(rename = "g")]
    Gram,
    /// Kilograms.
    #[serde(rename = "kg")]
    Kilogram,
    /// Millilitres.
    #[serde(rename = "ml")]
    Millilitre,
    /// Litres.
    #[serde(rename = "L")]
    Litre,
    /// Ounces (avoirdupois mass, not fluid ounces).
    #[serde(rename = "oz")]
    Ounce,
    /// Pounds.
    #[serde(rename = "lb")]
    Pound,
}

impl Unit {
    /// The standard unit that quantities in this unit normalize into.
    ///
    /// All mass units normalize to kilograms and all volume units to litres,
    /// so a purchase entered in ounces is directly comparable with one
    /// entered in grams.
    pub fn standard_unit(self) -> StandardUnit {
        match self {
            Unit::Gram | Unit::Kilogram | Unit::Ounce | Unit::Pound => StandardUnit::Kilogram,
            Unit::Millilitre | Unit::Litre => StandardUnit::Litre,
        }
    }

    /// Convert a quantity in this unit into the equivalent quantity in
    /// [Unit::standard_unit].
    pub fn to_standard(self, quantity: f64) -> f64 {
        match self {
            Unit::Gram | Unit::Millilitre => quantity / 1000.0,
            Unit::Kilogram | Unit::Litre => quantity,
            Unit::Ounce => quantity * KILOGRAMS_PER_OUNCE,
            Unit::Pound => quantity * KILOGRAMS_PER_POUND,
        }
    }

    /// The symbol shown next to quantities, e.g. `"g"`.
    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Gram => "g",
            Unit::Kilogram => "kg",
            Unit::Millilitre => "ml",
            Unit::Litre => "L",
            Unit::Ounce => "oz",
            Unit::Pound => "lb",
        }
    }
}

impl Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Unit {
    type Err = InvalidMeasurement;

    /// Parse a unit symbol or its long form, e.g. `"g"`, `"Grams"`, `"lbs"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "g" | "gram" | "grams" => Ok(Unit::Gram),
            "kg" | "kilogram" | "kilograms" => Ok(Unit::Kilogram),
            "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => {
                Ok(Unit::Millilitre)
            }
            "l" | "liter" | "liters" | "litre" | "litres" => Ok(Unit::Litre),
            "oz" | "ounce" | "ounces" => Ok(Unit::Ounce),
            "lb" | "lbs" | "pound" | "pounds" => Ok(Unit::Pound),
            _ => Err(InvalidMeasurement::UnknownUnit(s.to_string())),
        }
    }
}

/// The canonical unit that all purchases within a comparable family are
/// normalized into before their prices are ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StandardUnit {
    /// The standard unit for mass (g, kg, oz, lb).
    #[serde(rename = "kg")]
    Kilogram,
    /// The standard unit for volume (ml, L).
    #[serde(rename = "L")]
    Litre,
}

impl StandardUnit {
    /// The symbol shown next to unit prices, e.g. `"kg"` in `$4.99/kg`.
    pub fn symbol(self) -> &'static str {
        match self {
            StandardUnit::Kilogram => "kg",
            StandardUnit::Litre => "L",
        }
    }
}

impl Display for StandardUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// The price of a purchase expressed per one standard unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitPrice {
    /// Price per one [UnitPrice::standard_unit]. Positive and finite.
    pub unit_price: f64,
    /// The standard unit the price is expressed per.
    pub standard_unit: StandardUnit,
    /// The purchased quantity converted into the standard unit.
    pub normalized_quantity: f64,
}

/// A measurement that cannot produce a unit price.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidMeasurement {
    /// The price was zero, negative, or not a finite number.
    #[error("price must be a positive amount, got {0}")]
    NonPositivePrice(f64),

    /// The quantity was zero, negative, or not a finite number.
    #[error("quantity must be a positive amount, got {0}")]
    NonPositiveQuantity(f64),

    /// The unit string did not match any supported unit symbol.
    #[error("unrecognized unit \"{0}\"")]
    UnknownUnit(String),
}

/// Compute the price per standard unit for a raw `(price, quantity, unit)`
/// triple.
///
/// This is a pure function and is safe to call both at write time (the
/// authoritative, persisted value) and at read time (a disposable preview of
/// not-yet-submitted form input).
///
/// # Errors
///
/// Returns an [InvalidMeasurement] if `price` or `quantity` is zero,
/// negative, or not finite. Callers logging a purchase should treat the
/// purchase as unpriced rather than rejecting it outright.
pub fn unit_price(price: f64, quantity: f64, unit: Unit) -> Result<UnitPrice, InvalidMeasurement> {
    if !(price.is_finite() && price > 0.0) {
        return Err(InvalidMeasurement::NonPositivePrice(price));
    }

    if !(quantity.is_finite() && quantity > 0.0) {
        return Err(InvalidMeasurement::NonPositiveQuantity(quantity));
    }

    let normalized_quantity = unit.to_standard(quantity);

    // A denormal quantity can underflow to zero during conversion, which
    // would produce an infinite unit price.
    if normalized_quantity <= 0.0 {
        return Err(InvalidMeasurement::NonPositiveQuantity(quantity));
    }

    Ok(UnitPrice {
        unit_price: price / normalized_quantity,
        standard_unit: unit.standard_unit(),
        normalized_quantity,
    })
}
