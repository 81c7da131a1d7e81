//! Core purchase domain types.
//!
//! A purchase owns its derived pricing fields: `unit_price`,
//! `standard_unit`, and `normalized_quantity` are recomputed together from
//! `(price, quantity, unit)` whenever any of the three changes, and are never
//! written by anything other than this module.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    category::CategoryId,
    measurement::{self, StandardUnit, Unit},
};

/// Database identifier for a purchase.
pub type PurchaseId = i64;

/// A logged grocery purchase: one product bought at one store on one date.
///
/// To create a new `Purchase`, use [Purchase::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    /// The ID of the purchase.
    pub id: PurchaseId,
    /// The product name, e.g. "Kikkoman Soy Sauce".
    pub name: String,
    /// The store the product was bought at.
    pub store: String,
    /// When the purchase happened.
    pub date: Date,
    /// The total price paid. Currency-agnostic.
    pub price: f64,
    /// The amount of product bought, in `unit`.
    pub quantity: f64,
    /// The unit `quantity` was entered in.
    pub unit: Unit,
    /// The ID of the category the purchase belongs to.
    pub category_id: Option<CategoryId>,
    /// Path to an externally stored photo of the product, if one was
    /// uploaded.
    pub image_path: Option<String>,
    /// Price per one `standard_unit`. `None` if the purchase is unpriced,
    /// i.e. the raw measurement could not produce a unit price.
    pub unit_price: Option<f64>,
    /// The standard unit that `unit_price` is expressed per.
    pub standard_unit: Option<StandardUnit>,
    /// `quantity` converted into `standard_unit`.
    pub normalized_quantity: Option<f64>,
}

impl Purchase {
    /// Create a new purchase.
    ///
    /// Shortcut for [PurchaseBuilder] for discoverability.
    pub fn build(
        name: &str,
        store: &str,
        date: Date,
        price: f64,
        quantity: f64,
        unit: Unit,
    ) -> PurchaseBuilder {
        PurchaseBuilder {
            name: name.to_owned(),
            store: store.to_owned(),
            date,
            price,
            quantity,
            unit,
            category_id: None,
            image_path: None,
        }
    }

    /// Replace the pricing-relevant fields and recompute the derived pricing
    /// fields from them.
    ///
    /// This is the only way to change `price`, `quantity`, or `unit` so the
    /// derived fields can never go stale relative to the raw fields. A
    /// measurement that fails to normalize leaves the purchase unpriced
    /// rather than rejecting the edit.
    pub fn set_pricing(&mut self, price: f64, quantity: f64, unit: Unit) {
        self.price = price;
        self.quantity = quantity;
        self.unit = unit;

        let (unit_price, standard_unit, normalized_quantity) =
            compute_pricing(price, quantity, unit);
        self.unit_price = unit_price;
        self.standard_unit = standard_unit;
        self.normalized_quantity = normalized_quantity;
    }
}

/// A builder for creating [Purchase] instances.
///
/// Set the optional fields with [PurchaseBuilder::category_id] and
/// [PurchaseBuilder::image_path], then call [PurchaseBuilder::finalize] to
/// validate the purchase and compute its derived pricing fields.
#[derive(Debug, PartialEq, Clone)]
pub struct PurchaseBuilder {
    /// The product name.
    pub name: String,
    /// The store the product was bought at.
    pub store: String,
    /// When the purchase happened.
    pub date: Date,
    /// The total price paid.
    pub price: f64,
    /// The amount of product bought, in `unit`.
    pub quantity: f64,
    /// The unit `quantity` was entered in.
    pub unit: Unit,
    /// The category of the purchase, e.g. "Dairy", "Condiments".
    pub category_id: Option<CategoryId>,
    /// Path to an externally stored photo of the product.
    pub image_path: Option<String>,
}

impl PurchaseBuilder {
    /// Set the category id for the purchase.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }

    /// Set the image path for the purchase.
    pub fn image_path(mut self, image_path: Option<String>) -> Self {
        self.image_path = image_path;
        self
    }

    /// Validate the builder and produce a [Purchase] with its derived
    /// pricing fields computed.
    ///
    /// A measurement that fails to normalize (e.g. a zero quantity) does not
    /// reject the purchase: logging the purchase takes priority over price
    /// comparison, so the purchase is stored unpriced and skipped when
    /// ranking.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyProductName] or
    /// [Error::EmptyStoreName] if `name` or `store` is empty or
    /// whitespace-only.
    pub fn finalize(self, id: PurchaseId) -> Result<Purchase, Error> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::EmptyProductName);
        }

        let store = self.store.trim();
        if store.is_empty() {
            return Err(Error::EmptyStoreName);
        }

        let (unit_price, standard_unit, normalized_quantity) =
            compute_pricing(self.price, self.quantity, self.unit);

        Ok(Purchase {
            id,
            name: name.to_owned(),
            store: store.to_owned(),
            date: self.date,
            price: self.price,
            quantity: self.quantity,
            unit: self.unit,
            category_id: self.category_id,
            image_path: self.image_path,
            unit_price,
            standard_unit,
            normalized_quantity,
        })
    }
}

/// Run the normalizer and unpack its result into the derived field triple,
/// treating a failed measurement as unpriced.
fn compute_pricing(
    price: f64,
    quantity: f64,
    unit: Unit,
) -> (Option<f64>, Option<StandardUnit>, Option<f64>) {
    match measurement::unit_price(price, quantity, unit) {
        Ok(computed) => (
            Some(computed.unit_price),
            Some(computed.standard_unit),
            Some(computed.normalized_quantity),
        ),
        Err(error) => {
            tracing::debug!("storing purchase without a unit price: {error}");
            (None, None, None)
        }
    }
}
