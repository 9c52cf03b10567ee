//! Integration tests for the shopping cart

mod common;

use common::{money, print_test_header, Fixture};
use marketplace_service::contract::*;

#[tokio::test]
async fn test_add_item_increments_existing_line() {
    print_test_header(
        "test_add_item_increments_existing_line",
        &["Adding the same meal twice keeps one line with the summed quantity"],
    );
    let fx = Fixture::new();
    let (_, provider) = fx.provider("Pasta Bar", true);
    let customer = fx.customer("Grace");
    let meal = fx.meal(provider.id, "Carbonara", "11.50");

    let first = fx.services.cart.add_item(customer.id, meal.id, 2).await.unwrap();
    let second = fx.services.cart.add_item(customer.id, meal.id, 3).await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.quantity, 5);
    assert_eq!(fx.store.cart_len(), 1);

    let cart = fx.services.cart.get_cart(customer.id).await.unwrap();
    assert_eq!(cart.item_count, 5);
    assert_eq!(cart.total_amount, money("57.50"));
}

#[tokio::test]
async fn test_add_item_rejects_bad_quantity_and_unavailable_meal() {
    print_test_header("test_add_item_rejects_bad_quantity_and_unavailable_meal", &[]);
    let fx = Fixture::new();
    let (_, provider) = fx.provider("Fish Shack", true);
    let customer = fx.customer("Linus");
    let meal = fx.meal(provider.id, "Fish & Chips", "9.00");

    let err = fx.services.cart.add_item(customer.id, meal.id, 0).await.unwrap_err();
    assert!(matches!(err, MarketplaceError::InvalidArgument { .. }));

    fx.set_meal_available(meal.id, false);
    let err = fx.services.cart.add_item(customer.id, meal.id, 1).await.unwrap_err();
    assert!(matches!(err, MarketplaceError::NotFound { .. }));
    assert_eq!(fx.store.cart_len(), 0);
}

#[tokio::test]
async fn test_cart_hides_unavailable_meals_without_deleting_them() {
    print_test_header(
        "test_cart_hides_unavailable_meals_without_deleting_them",
        &["A meal that goes unavailable drops out of totals but its row survives"],
    );
    let fx = Fixture::new();
    let (_, provider) = fx.provider("Smoothies", true);
    let customer = fx.customer("Margaret");
    let mango = fx.meal(provider.id, "Mango", "5.00");
    let berry = fx.meal(provider.id, "Berry", "6.00");
    fx.services.cart.add_item(customer.id, mango.id, 1).await.unwrap();
    fx.services.cart.add_item(customer.id, berry.id, 2).await.unwrap();

    fx.set_meal_available(berry.id, false);
    let cart = fx.services.cart.get_cart(customer.id).await.unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].meal.id, mango.id);
    assert_eq!(cart.total_amount, money("5.00"));
    assert_eq!(cart.item_count, 1);
    assert_eq!(fx.store.cart_len(), 2);

    fx.set_meal_available(berry.id, true);
    let cart = fx.services.cart.get_cart(customer.id).await.unwrap();
    assert_eq!(cart.total_amount, money("17.00"));
}

#[tokio::test]
async fn test_update_and_remove_require_existing_line() {
    print_test_header("test_update_and_remove_require_existing_line", &[]);
    let fx = Fixture::new();
    let (_, provider) = fx.provider("Crepes", true);
    let customer = fx.customer("Barbara");
    let meal = fx.meal(provider.id, "Nutella Crepe", "4.50");

    let err = fx
        .services
        .cart
        .update_quantity(customer.id, meal.id, 2)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketplaceError::NotFound { .. }));

    fx.services.cart.add_item(customer.id, meal.id, 1).await.unwrap();
    let updated = fx
        .services
        .cart
        .update_quantity(customer.id, meal.id, 4)
        .await
        .unwrap();
    assert_eq!(updated.quantity, 4);

    let err = fx
        .services
        .cart
        .update_quantity(customer.id, meal.id, -1)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketplaceError::InvalidArgument { .. }));

    fx.services.cart.remove_item(customer.id, meal.id).await.unwrap();
    let err = fx
        .services
        .cart
        .remove_item(customer.id, meal.id)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketplaceError::NotFound { .. }));
}

#[tokio::test]
async fn test_clear_only_touches_own_cart() {
    print_test_header("test_clear_only_touches_own_cart", &[]);
    let fx = Fixture::new();
    let (_, provider) = fx.provider("Bagels", true);
    let alice = fx.customer("Alice");
    let bob = fx.customer("Bob");
    let plain = fx.meal(provider.id, "Plain", "2.00");
    let sesame = fx.meal(provider.id, "Sesame", "2.50");
    fx.services.cart.add_item(alice.id, plain.id, 1).await.unwrap();
    fx.services.cart.add_item(alice.id, sesame.id, 1).await.unwrap();
    fx.services.cart.add_item(bob.id, plain.id, 1).await.unwrap();

    assert_eq!(fx.services.cart.clear(alice.id).await.unwrap(), 2);
    assert_eq!(fx.services.cart.clear(alice.id).await.unwrap(), 0);
    let bobs = fx.services.cart.get_cart(bob.id).await.unwrap();
    assert_eq!(bobs.items.len(), 1);
}

#[tokio::test]
async fn test_suspended_user_cannot_use_cart() {
    print_test_header("test_suspended_user_cannot_use_cart", &[]);
    let fx = Fixture::new();
    let (_, provider) = fx.provider("Kebab", true);
    let customer = fx.customer("Dennis");
    let meal = fx.meal(provider.id, "Doner", "8.00");
    fx.services
        .users
        .update_user(
            customer.id,
            UserAdminPatch {
                status: Some("SUSPENDED".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = fx.services.cart.add_item(customer.id, meal.id, 1).await.unwrap_err();
    assert!(matches!(err, MarketplaceError::Unauthorized));
}
