//! # Supplies Mapping
//!
//! Turns a snapshot from the external supplies feed into catalog offers.
//!
//! ```text
//! GET {SUPPLIES_URL}
//!   {"food": {"fruits": 50, "meat": 20, ...}, "medicine": {"bandages": 15, ...}}
//!        │
//!        ▼
//! SuppliesSnapshot::to_offers()    ← THIS MODULE (pure)
//!        │   quantity = units / SUPPLY_UNITS_PER_OFFER
//!        ▼
//! OfferRepository::upsert_by_name  (newworld-db)
//! ```
//!
//! The catalog is fixed: seven offers with fixed prices and categories.
//! Keys missing from the snapshot count as zero units.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::NewOffer;

/// Feed units that make up one sellable offer unit.
pub const SUPPLY_UNITS_PER_OFFER: i64 = 5;

pub const CATEGORY_FOOD: &str = "food";
pub const CATEGORY_DRINK: &str = "drink";
pub const CATEGORY_MEDICINE: &str = "medicine";

/// Which section of the snapshot an offer is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Food,
    Medicine,
}

struct CatalogEntry {
    name: &'static str,
    section: Section,
    price: Money,
    category: &'static str,
}

const CATALOG: [CatalogEntry; 7] = [
    CatalogEntry { name: "fruits", section: Section::Food, price: Money::from_cents(200), category: CATEGORY_FOOD },
    CatalogEntry { name: "meat", section: Section::Food, price: Money::from_cents(400), category: CATEGORY_FOOD },
    CatalogEntry { name: "vegetables", section: Section::Food, price: Money::from_cents(100), category: CATEGORY_FOOD },
    CatalogEntry { name: "water", section: Section::Food, price: Money::from_cents(100), category: CATEGORY_DRINK },
    CatalogEntry { name: "analgesics", section: Section::Medicine, price: Money::from_cents(500), category: CATEGORY_MEDICINE },
    CatalogEntry { name: "antibiotics", section: Section::Medicine, price: Money::from_cents(900), category: CATEGORY_MEDICINE },
    CatalogEntry { name: "bandages", section: Section::Medicine, price: Money::from_cents(400), category: CATEGORY_MEDICINE },
];

/// Body returned by the supplies feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppliesSnapshot {
    #[serde(default)]
    pub food: HashMap<String, i64>,
    #[serde(default)]
    pub medicine: HashMap<String, i64>,
}

impl SuppliesSnapshot {
    /// Maps the snapshot onto the fixed catalog, in catalog order.
    ///
    /// Negative unit counts are clamped to zero so an upsert can never
    /// violate the non-negative stock constraint.
    pub fn to_offers(&self) -> Vec<NewOffer> {
        CATALOG
            .iter()
            .map(|entry| {
                let section = match entry.section {
                    Section::Food => &self.food,
                    Section::Medicine => &self.medicine,
                };
                let units = section.get(entry.name).copied().unwrap_or(0).max(0);
                NewOffer::new(
                    entry.name,
                    units / SUPPLY_UNITS_PER_OFFER,
                    entry.price,
                    entry.category,
                )
            })
            .collect()
    }
}

/// The catalog with every quantity at `quantity`; used to seed a fresh store.
pub fn starter_catalog(quantity: i64) -> Vec<NewOffer> {
    CATALOG
        .iter()
        .map(|entry| NewOffer::new(entry.name, quantity, entry.price, entry.category))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(json: &str) -> SuppliesSnapshot {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_to_offers_divides_units() {
        let snap = snapshot(
            r#"{"food": {"fruits": 52, "meat": 20, "vegetables": 4, "water": 100},
                "medicine": {"analgesics": 10, "antibiotics": 5, "bandages": 15}}"#,
        );
        let offers = snap.to_offers();

        let by_name: HashMap<_, _> = offers.iter().map(|o| (o.name.as_str(), o)).collect();
        assert_eq!(offers.len(), 7);
        assert_eq!(by_name["fruits"].quantity, 10);
        assert_eq!(by_name["meat"].quantity, 4);
        assert_eq!(by_name["vegetables"].quantity, 0);
        assert_eq!(by_name["water"].quantity, 20);
        assert_eq!(by_name["water"].category, "drink");
        assert_eq!(by_name["antibiotics"].price_cents, 900);
        assert_eq!(by_name["bandages"].quantity, 3);
    }

    #[test]
    fn test_missing_keys_count_as_zero() {
        let snap = snapshot(r#"{"food": {"meat": 50}}"#);
        let offers = snap.to_offers();

        assert!(offers
            .iter()
            .filter(|o| o.name != "meat")
            .all(|o| o.quantity == 0));
        assert_eq!(offers.iter().find(|o| o.name == "meat").unwrap().quantity, 10);
    }

    #[test]
    fn test_negative_units_are_clamped() {
        let mut snap = SuppliesSnapshot::default();
        snap.medicine.insert("bandages".to_string(), -40);
        let bandages = snap
            .to_offers()
            .into_iter()
            .find(|o| o.name == "bandages")
            .unwrap();
        assert_eq!(bandages.quantity, 0);
    }

    #[test]
    fn test_starter_catalog() {
        let catalog = starter_catalog(25);
        assert_eq!(catalog.len(), 7);
        assert!(catalog.iter().all(|o| o.quantity == 25));
    }
}
