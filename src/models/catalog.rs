// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Catalog documents: genres, products and license keys.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Genre stored in the `genres` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Genre {
    pub name: String,
}

/// Game listed for sale, stored in the `products` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Product {
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub descr: String,
    /// Cover image URL
    #[serde(default)]
    pub image: String,
    pub price: f64,
}

/// One sellable license key, stored in the `keys` collection.
///
/// `product_id` is a loose reference; nothing checks that the product exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LicenseKey {
    pub product_id: String,
    pub key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_license_key_uses_camel_case_fields() {
        let key = LicenseKey {
            product_id: "p1".to_string(),
            key: "AAAA-BBBB".to_string(),
        };
        let value = serde_json::to_value(&key).unwrap();
        assert_eq!(value["productId"], "p1");
        assert!(value.get("product_id").is_none());
    }

    #[test]
    fn test_product_tolerates_missing_optional_fields() {
        let product: Product =
            serde_json::from_value(serde_json::json!({ "name": "Doom", "price": 9.99 })).unwrap();
        assert_eq!(product.descr, "");
        assert_eq!(product.image, "");
    }
}
