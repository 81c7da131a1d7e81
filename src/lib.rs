//! Shelfwise is the pricing core of a grocery purchase tracker.
//!
//! Users log what they bought, where, for how much, and in what quantity and
//! unit. This library converts those heterogeneous `(price, quantity, unit)`
//! triples into a single comparable price per standard unit (kg or L),
//! groups purchases by category, ranks each group cheapest-first, and flags
//! the best price with a computed delta for the rest.
//!
//! The hosting application supplies raw records and persists or renders the
//! computed ones; storage, HTTP, and UI concerns live entirely outside this
//! crate. Both entry points are pure functions over in-memory collections:
//!
//! - [measurement::unit_price] computes the authoritative unit price when a
//!   purchase is created or edited (and may be re-run on unsubmitted form
//!   input for an advisory preview).
//! - [ranking::rank_purchases] produces the grouped, ranked, annotated view
//!   at display time.

#![warn(missing_docs)]

pub mod category;
pub mod measurement;
pub mod purchase;
pub mod ranking;

pub use category::{Category, CategoryId, CategoryName};
pub use measurement::{InvalidMeasurement, StandardUnit, Unit, UnitPrice, unit_price};
pub use purchase::{Purchase, PurchaseBuilder, PurchaseId};
pub use ranking::{CategoryFilter, CategoryGroup, RankedPurchase, rank_purchases};

/// The errors that may occur in the library.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty string was used to create a category name.
    #[error("category name cannot be empty")]
    EmptyCategoryName,

    /// An empty string was used as a purchase's product name.
    #[error("product name cannot be empty")]
    EmptyProductName,

    /// An empty string was used as a purchase's store name.
    #[error("store name cannot be empty")]
    EmptyStoreName,

    /// The raw measurement of a purchase could not produce a unit price.
    ///
    /// Callers that hit this while logging a purchase should usually store
    /// the purchase unpriced instead of rejecting it; see
    /// [PurchaseBuilder::finalize].
    #[error(transparent)]
    InvalidMeasurement(#[from] InvalidMeasurement),
}
