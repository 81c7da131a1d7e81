//! Grouping and ranking logic for the price comparison view.
//!
//! The ranking engine is a pure function over an immutable snapshot of the
//! purchase and category collections: it filters, groups by category, sorts
//! each group by unit price, and annotates each purchase with its rank. It
//! never mutates its input and produces the same output for the same input
//! set regardless of input order.

use std::{cmp::Ordering, collections::HashMap};

use crate::{
    category::{Category, CategoryId},
    purchase::Purchase,
};

/// The display name of the group holding purchases without a category.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// Which categories the price comparison view should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// Show every category.
    #[default]
    All,
    /// Show only purchases in the category with this id.
    Only(CategoryId),
}

/// A purchase annotated with its rank within its category group.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedPurchase {
    /// The underlying purchase. An annotated copy, never a mutated input
    /// record.
    pub purchase: Purchase,
    /// Whether this purchase has the lowest positive unit price in its
    /// group.
    pub is_best_price: bool,
    /// How much this purchase's unit price exceeds the group's best unit
    /// price. `Some(0.0)` for the best purchase, `None` for unpriced
    /// purchases.
    pub price_diff: Option<f64>,
}

/// One category's purchases, sorted cheapest first.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup {
    /// The ID of the category, or `None` for the uncategorized group.
    pub category_id: Option<CategoryId>,
    /// The display name of the group, [UNCATEGORIZED_LABEL] if the category
    /// id is missing or refers to no known category.
    pub name: String,
    /// The lowest positive unit price in the group, if any purchase in the
    /// group is priced. Exposed so consumers never recompute the ranking.
    pub best_unit_price: Option<f64>,
    /// The group's purchases, ascending by unit price with unpriced
    /// purchases last.
    pub purchases: Vec<RankedPurchase>,
}

/// Group the given purchases by category and rank each group by unit price.
///
/// Groups are returned in case-insensitive alphabetical order by display
/// name. Within a group, purchases are sorted ascending by unit price;
/// unpriced purchases (no positive, finite unit price) sort last and are
/// never marked best. Ties are broken by ascending purchase id, which makes
/// the output independent of the order the purchases are supplied in.
///
/// An empty result (e.g. a filter for a category with no purchases) is a
/// valid output, not an error.
pub fn rank_purchases(
    purchases: &[Purchase],
    categories: &[Category],
    filter: CategoryFilter,
) -> Vec<CategoryGroup> {
    let names: HashMap<CategoryId, &str> = categories
        .iter()
        .map(|category| (category.id, category.name.as_ref()))
        .collect();

    let mut grouped: HashMap<Option<CategoryId>, Vec<Purchase>> = HashMap::new();

    for purchase in purchases {
        if let CategoryFilter::Only(category_id) = filter
            && purchase.category_id != Some(category_id)
        {
            continue;
        }

        grouped
            .entry(purchase.category_id)
            .or_default()
            .push(purchase.clone());
    }

    let mut groups: Vec<CategoryGroup> = grouped
        .into_iter()
        .map(|(category_id, group)| {
            let name = category_id
                .and_then(|id| names.get(&id))
                .map(|name| name.to_string())
                .unwrap_or_else(|| UNCATEGORIZED_LABEL.to_owned());

            rank_group(category_id, name, group)
        })
        .collect();

    groups.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then(a.category_id.cmp(&b.category_id))
    });

    groups
}

/// Sort one category's purchases by unit price and annotate them with the
/// best-price flag and price delta.
fn rank_group(
    category_id: Option<CategoryId>,
    name: String,
    mut group: Vec<Purchase>,
) -> CategoryGroup {
    warn_on_mixed_standard_units(&name, &group);

    group.sort_by(
        |a, b| match (effective_unit_price(a), effective_unit_price(b)) {
            (Some(price_a), Some(price_b)) => price_a
                .partial_cmp(&price_b)
                .unwrap_or(Ordering::Equal)
                .then(a.id.cmp(&b.id)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.id.cmp(&b.id),
        },
    );

    let best_unit_price = group.first().and_then(effective_unit_price);

    let purchases = group
        .into_iter()
        .enumerate()
        .map(|(index, purchase)| {
            let item_price = effective_unit_price(&purchase);

            RankedPurchase {
                is_best_price: index == 0 && item_price.is_some(),
                price_diff: match (item_price, best_unit_price) {
                    (Some(price), Some(best)) => Some(price - best),
                    _ => None,
                },
                purchase,
            }
        })
        .collect();

    CategoryGroup {
        category_id,
        name,
        best_unit_price,
        purchases,
    }
}

/// The unit price to rank a purchase by, or `None` if the purchase should be
/// treated as unpriced.
///
/// A stored unit price that is missing, non-positive, or non-finite never
/// outranks a priced purchase and never counts as the best price.
fn effective_unit_price(purchase: &Purchase) -> Option<f64> {
    purchase
        .unit_price
        .filter(|price| price.is_finite() && *price > 0.0)
}

/// Mass and volume purchases normalize to different standard units, so their
/// unit prices are not directly comparable. Ranking still proceeds on the
/// raw unit price, but the mismatch is worth surfacing in the logs.
fn warn_on_mixed_standard_units(name: &str, group: &[Purchase]) {
    let mut standards = group.iter().filter_map(|purchase| purchase.standard_unit);

    if let Some(first) = standards.next()
        && standards.any(|standard| standard != first)
    {
        tracing::warn!(
            "category \"{name}\" mixes mass and volume purchases; \
            their unit prices are not directly comparable"
        );
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        category::{Category, CategoryId, CategoryName},
        measurement::Unit,
        purchase::{Purchase, PurchaseId},
    };

    use super::{CategoryFilter, UNCATEGORIZED_LABEL, rank_purchases};

    fn purchase(
        id: PurchaseId,
        store: &str,
        price: f64,
        quantity: f64,
        unit: Unit,
        category_id: Option<CategoryId>,
    ) -> Purchase {
        Purchase::build("Milk", store, date!(2025 - 10 - 05), price, quantity, unit)
            .category_id(category_id)
            .finalize(id)
            .expect("valid purchase")
    }

    fn category(id: CategoryId, name: &str) -> Category {
        Category {
            id,
            name: CategoryName::new_unchecked(name),
        }
    }

    #[test]
    fn cheapest_unit_price_wins_regardless_of_insertion_order() {
        // StoreB's 2L for $5.00 is cheaper per litre than StoreA's 1L for
        // $3.00 even though StoreA was logged first.
        let purchases = vec![
            purchase(1, "StoreA", 3.00, 1.0, Unit::Litre, Some(1)),
            purchase(2, "StoreB", 5.00, 2.0, Unit::Litre, Some(1)),
        ];
        let categories = vec![category(1, "Dairy")];

        let groups = rank_purchases(&purchases, &categories, CategoryFilter::All);

        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert_eq!(group.name, "Dairy");
        assert_eq!(group.best_unit_price, Some(2.50));

        let best = &group.purchases[0];
        assert_eq!(best.purchase.store, "StoreB");
        assert_eq!(best.purchase.unit_price, Some(2.50));
        assert!(best.is_best_price);
        assert_eq!(best.price_diff, Some(0.0));

        let runner_up = &group.purchases[1];
        assert_eq!(runner_up.purchase.store, "StoreA");
        assert!(!runner_up.is_best_price);
        assert_eq!(runner_up.price_diff, Some(0.5));
    }

    #[test]
    fn exactly_one_best_price_per_group() {
        let purchases = vec![
            purchase(1, "StoreA", 3.00, 1.0, Unit::Litre, Some(1)),
            purchase(2, "StoreB", 5.00, 2.0, Unit::Litre, Some(1)),
            purchase(3, "StoreC", 4.00, 500.0, Unit::Gram, Some(2)),
            purchase(4, "StoreD", 9.00, 1.0, Unit::Kilogram, Some(2)),
        ];
        let categories = vec![category(1, "Dairy"), category(2, "Cheese")];

        let groups = rank_purchases(&purchases, &categories, CategoryFilter::All);

        for group in &groups {
            let best_count = group
                .purchases
                .iter()
                .filter(|item| item.is_best_price)
                .count();
            assert_eq!(best_count, 1, "group {} should have one best", group.name);

            let best_price = group.best_unit_price.expect("all groups are priced");
            for item in &group.purchases {
                let unit_price = item.purchase.unit_price.expect("all purchases are priced");
                assert!(unit_price >= best_price);
                assert!(item.price_diff.expect("priced item has a diff") >= 0.0);
            }
        }
    }

    #[test]
    fn unpriced_purchases_sort_last_and_are_never_best() {
        let mut unpriced = purchase(1, "StoreA", 3.00, 1.0, Unit::Litre, Some(1));
        unpriced.set_pricing(0.0, 1.0, Unit::Litre);
        let purchases = vec![
            unpriced,
            purchase(2, "StoreB", 5.00, 2.0, Unit::Litre, Some(1)),
        ];
        let categories = vec![category(1, "Dairy")];

        let groups = rank_purchases(&purchases, &categories, CategoryFilter::All);

        let group = &groups[0];
        assert_eq!(group.purchases[0].purchase.id, 2);
        assert!(group.purchases[0].is_best_price);
        assert_eq!(group.purchases[1].purchase.id, 1);
        assert!(!group.purchases[1].is_best_price);
        assert_eq!(group.purchases[1].price_diff, None);
    }

    #[test]
    fn group_of_only_unpriced_purchases_has_no_best() {
        let mut first = purchase(1, "StoreA", 3.00, 1.0, Unit::Litre, Some(1));
        first.set_pricing(0.0, 1.0, Unit::Litre);
        let mut second = purchase(2, "StoreB", 5.00, 2.0, Unit::Litre, Some(1));
        second.set_pricing(-5.00, 2.0, Unit::Litre);
        let categories = vec![category(1, "Dairy")];

        let groups = rank_purchases(&[first, second], &categories, CategoryFilter::All);

        let group = &groups[0];
        assert_eq!(group.best_unit_price, None);
        assert!(group.purchases.iter().all(|item| !item.is_best_price));
        assert!(group.purchases.iter().all(|item| item.price_diff.is_none()));
    }

    #[test]
    fn output_is_independent_of_input_order() {
        let purchases = vec![
            purchase(1, "StoreA", 3.00, 1.0, Unit::Litre, Some(1)),
            purchase(2, "StoreB", 5.00, 2.0, Unit::Litre, Some(1)),
            purchase(3, "StoreC", 4.50, 1.5, Unit::Litre, Some(2)),
            purchase(4, "StoreD", 2.00, 400.0, Unit::Gram, None),
        ];
        let categories = vec![category(1, "Dairy"), category(2, "Juice")];

        let forwards = rank_purchases(&purchases, &categories, CategoryFilter::All);
        let mut reversed = purchases.clone();
        reversed.reverse();
        let backwards = rank_purchases(&reversed, &categories, CategoryFilter::All);

        assert_eq!(forwards, backwards);
    }

    #[test]
    fn ranking_twice_yields_identical_output_and_mutates_nothing() {
        let purchases = vec![
            purchase(1, "StoreA", 3.00, 1.0, Unit::Litre, Some(1)),
            purchase(2, "StoreB", 5.00, 2.0, Unit::Litre, Some(1)),
        ];
        let categories = vec![category(1, "Dairy")];
        let snapshot = purchases.clone();

        let first = rank_purchases(&purchases, &categories, CategoryFilter::All);
        let second = rank_purchases(&purchases, &categories, CategoryFilter::All);

        assert_eq!(first, second);
        assert_eq!(purchases, snapshot);
    }

    #[test]
    fn equal_unit_prices_tie_break_by_purchase_id() {
        let purchases = vec![
            purchase(7, "StoreB", 5.00, 1.0, Unit::Litre, Some(1)),
            purchase(3, "StoreA", 10.00, 2.0, Unit::Litre, Some(1)),
        ];
        let categories = vec![category(1, "Dairy")];

        let groups = rank_purchases(&purchases, &categories, CategoryFilter::All);

        let group = &groups[0];
        assert_eq!(group.purchases[0].purchase.id, 3);
        assert!(group.purchases[0].is_best_price);
        assert!(!group.purchases[1].is_best_price);
        assert_eq!(group.purchases[1].price_diff, Some(0.0));
    }

    #[test]
    fn category_filter_retains_only_the_selected_category() {
        let purchases = vec![
            purchase(1, "StoreA", 3.00, 1.0, Unit::Litre, Some(1)),
            purchase(2, "StoreB", 4.00, 1.0, Unit::Litre, Some(2)),
            purchase(3, "StoreC", 2.00, 400.0, Unit::Gram, None),
        ];
        let categories = vec![category(1, "Dairy"), category(2, "Juice")];

        let groups = rank_purchases(&purchases, &categories, CategoryFilter::Only(2));

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "Juice");
        assert_eq!(groups[0].purchases.len(), 1);
    }

    #[test]
    fn filter_for_unknown_category_yields_no_groups() {
        let purchases = vec![purchase(1, "StoreA", 3.00, 1.0, Unit::Litre, Some(1))];
        let categories = vec![category(1, "Dairy")];

        let groups = rank_purchases(&purchases, &categories, CategoryFilter::Only(99));

        assert!(groups.is_empty());
    }

    #[test]
    fn no_purchases_yields_no_groups() {
        let groups = rank_purchases(&[], &[category(1, "Dairy")], CategoryFilter::All);

        assert!(groups.is_empty());
    }

    #[test]
    fn purchases_without_a_category_form_the_uncategorized_group() {
        let purchases = vec![
            purchase(1, "StoreA", 3.00, 1.0, Unit::Litre, None),
            purchase(2, "StoreB", 4.00, 1.0, Unit::Litre, Some(1)),
        ];
        let categories = vec![category(1, "Dairy")];

        let groups = rank_purchases(&purchases, &categories, CategoryFilter::All);

        assert_eq!(groups.len(), 2);
        let uncategorized = groups
            .iter()
            .find(|group| group.category_id.is_none())
            .expect("uncategorized group exists");
        assert_eq!(uncategorized.name, UNCATEGORIZED_LABEL);
        assert_eq!(uncategorized.purchases.len(), 1);
        assert!(uncategorized.purchases[0].is_best_price);
    }

    #[test]
    fn category_id_without_a_matching_category_keeps_its_own_group() {
        let purchases = vec![purchase(1, "StoreA", 3.00, 1.0, Unit::Litre, Some(42))];

        let groups = rank_purchases(&purchases, &[], CategoryFilter::All);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].category_id, Some(42));
        assert_eq!(groups[0].name, UNCATEGORIZED_LABEL);
    }

    #[test]
    fn groups_are_ordered_by_name_case_insensitively() {
        let purchases = vec![
            purchase(1, "StoreA", 3.00, 1.0, Unit::Litre, Some(1)),
            purchase(2, "StoreB", 4.00, 1.0, Unit::Litre, Some(2)),
            purchase(3, "StoreC", 5.00, 1.0, Unit::Litre, Some(3)),
            purchase(4, "StoreD", 6.00, 1.0, Unit::Litre, None),
        ];
        let categories = vec![
            category(1, "dairy"),
            category(2, "Apples"),
            category(3, "BAKERY"),
        ];

        let groups = rank_purchases(&purchases, &categories, CategoryFilter::All);

        let names: Vec<&str> = groups.iter().map(|group| group.name.as_str()).collect();
        assert_eq!(names, vec!["Apples", "BAKERY", "dairy", UNCATEGORIZED_LABEL]);
    }
}
