// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Turning a cart into an order.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::{LicenseKey, Order, OrderItem, Record};

/// Place an order for everything in the user's cart.
///
/// One license key is taken per cart item. If any item has no key in
/// stock, the keys already taken are put back and the cart is left as it
/// was. On success the ordered items are removed from the cart; items
/// added while the order was being placed stay. Once the order is written
/// it is returned even if that removal fails.
pub async fn place_order(db: &FirestoreDb, user_id: &str) -> Result<Record<Order>, AppError> {
    let cart = db.fetch_cart(user_id).await?;
    if cart.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".to_string()));
    }

    let ordered_ids: Vec<String> = cart.iter().map(|item| item.id.clone()).collect();
    let mut items = Vec::with_capacity(cart.len());
    let mut taken: Vec<Record<LicenseKey>> = Vec::with_capacity(cart.len());

    for cart_item in cart {
        let product_id = cart_item.product_id.clone();
        let key = match db.fetch_and_delete_key(&product_id).await {
            Ok(Some(key)) => key,
            Ok(None) => {
                tracing::warn!(user_id, product_id = %product_id, "Checkout failed: out of stock");
                restore_keys(db, &taken).await;
                return Err(AppError::OutOfStock(product_id));
            }
            Err(e) => {
                restore_keys(db, &taken).await;
                return Err(e);
            }
        };

        let mut item = OrderItem::from(cart_item.into_data());
        item.key = Some(key.key.clone());
        items.push(item);
        taken.push(key);
    }

    let order = match db.add_order(user_id, items).await {
        Ok(order) => order,
        Err(e) => {
            restore_keys(db, &taken).await;
            return Err(e);
        }
    };

    if let Err(e) = db.remove_cart_items(user_id, &ordered_ids).await {
        tracing::error!(
            user_id,
            order_id = %order.id,
            error = %e,
            "Order placed but ordered items were not removed from the cart"
        );
    }

    Ok(order)
}

/// Return taken keys to stock (under new document IDs).
async fn restore_keys(db: &FirestoreDb, keys: &[Record<LicenseKey>]) {
    for key in keys {
        if let Err(e) = db.add_key(&key.product_id, &key.key).await {
            tracing::error!(
                product_id = %key.product_id,
                error = %e,
                "Failed to restore license key after aborted checkout"
            );
        }
    }
}
