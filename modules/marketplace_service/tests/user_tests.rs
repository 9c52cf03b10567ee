//! Integration tests for profiles, provider onboarding and admin moderation

mod common;

use common::{print_test_header, Fixture};
use marketplace_service::contract::*;

fn application(business_name: &str) -> ProviderApplication {
    ProviderApplication {
        business_name: business_name.into(),
        description: Some("Home cooking".into()),
        phone: "+1 555 0199".into(),
        address: "4 Oak Road".into(),
        logo: None,
    }
}

#[tokio::test]
async fn test_provider_application_flow() {
    print_test_header(
        "test_provider_application_flow",
        &[
            "Applying creates an inactive profile and promotes the role",
            "Meals can only be created after admin approval",
        ],
    );
    let fx = Fixture::new();
    let user = fx.customer("Julia");

    let profile = fx
        .services
        .users
        .apply_for_provider(user.id, application("Julia's Kitchen"))
        .await
        .unwrap();
    assert!(!profile.is_active);
    assert_eq!(profile.user_id, user.id);
    assert_eq!(
        fx.store.tables.read().users.get(&user.id).map(|u| u.role),
        Some(Role::Provider)
    );

    let err = fx
        .services
        .users
        .apply_for_provider(user.id, application("Second Try"))
        .await
        .unwrap_err();
    assert!(matches!(err, MarketplaceError::Conflict { .. }));

    let meal = NewMeal {
        name: "Beef Bourguignon".into(),
        price: "21.00".into(),
        ..Default::default()
    };
    let err = fx
        .services
        .catalog
        .create_meal(profile.id, meal.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, MarketplaceError::Forbidden { .. }));

    fx.services
        .users
        .set_provider_active(profile.id, true)
        .await
        .unwrap();
    let created = fx.services.catalog.create_meal(profile.id, meal).await.unwrap();
    assert_eq!(created.provider_id, profile.id);

    let view = fx.services.users.my_profile(user.id).await.unwrap();
    assert_eq!(view.provider.map(|p| p.id), Some(profile.id));
}

#[tokio::test]
async fn test_admin_applicant_keeps_admin_role() {
    print_test_header("test_admin_applicant_keeps_admin_role", &[]);
    let fx = Fixture::new();
    let admin = fx.admin();
    fx.services
        .users
        .apply_for_provider(admin.id, application("Admin Eats"))
        .await
        .unwrap();
    assert_eq!(
        fx.store.tables.read().users.get(&admin.id).map(|u| u.role),
        Some(Role::Admin)
    );
}

#[tokio::test]
async fn test_application_requires_contact_fields() {
    print_test_header("test_application_requires_contact_fields", &[]);
    let fx = Fixture::new();
    let user = fx.customer("Mary");
    let err = fx
        .services
        .users
        .apply_for_provider(
            user.id,
            ProviderApplication {
                phone: " ".into(),
                ..application("Mary's")
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MarketplaceError::InvalidArgument { .. }));
    assert!(fx.store.tables.read().providers.is_empty());
}

#[tokio::test]
async fn test_profile_updates_and_provider_profile() {
    print_test_header("test_profile_updates_and_provider_profile", &[]);
    let fx = Fixture::new();
    let customer = fx.customer("Claude");
    let updated = fx
        .services
        .users
        .update_profile(
            customer.id,
            ProfilePatch {
                name: Some("  Claude S.  ".into()),
                phone: Some("+33 1 00".into()),
                address: Some("".into()),
                image: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Claude S.");
    assert_eq!(updated.phone.as_deref(), Some("+33 1 00"));
    assert_eq!(updated.address, None);

    let err = fx
        .services
        .users
        .update_provider_profile(customer.id, ProviderProfilePatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, MarketplaceError::NotFound { .. }));

    let (owner, profile) = fx.provider("Noodle Bar", true);
    let changed = fx
        .services
        .users
        .update_provider_profile(
            owner.id,
            ProviderProfilePatch {
                opening_hours: Some("11:00-22:00".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(changed.id, profile.id);
    assert_eq!(changed.opening_hours.as_deref(), Some("11:00-22:00"));
    assert!(changed.is_active);
}

#[tokio::test]
async fn test_disabled_user_profile_is_hidden() {
    print_test_header("test_disabled_user_profile_is_hidden", &[]);
    let fx = Fixture::new();
    let user = fx.customer("Ida");
    fx.services
        .users
        .update_user(
            user.id,
            UserAdminPatch {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = fx.services.users.my_profile(user.id).await.unwrap_err();
    assert!(matches!(err, MarketplaceError::NotFound { .. }));
}

#[tokio::test]
async fn test_invalid_role_leaves_user_untouched() {
    print_test_header(
        "test_invalid_role_leaves_user_untouched",
        &["A rejected patch must not apply any of its fields"],
    );
    let fx = Fixture::new();
    let user = fx.customer("Sophie");
    let err = fx
        .services
        .users
        .update_user(
            user.id,
            UserAdminPatch {
                name: Some("Renamed".into()),
                role: Some("SUPERUSER".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MarketplaceError::InvalidArgument { .. }));

    let stored = fx.store.tables.read().users.get(&user.id).cloned().unwrap();
    assert_eq!(stored, user);

    let promoted = fx
        .services
        .users
        .update_user(
            user.id,
            UserAdminPatch {
                role: Some("ADMIN".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(promoted.role, Role::Admin);
}

#[tokio::test]
async fn test_delete_user_blocked_by_orders() {
    print_test_header("test_delete_user_blocked_by_orders", &[]);
    let fx = Fixture::new();
    let (owner, provider) = fx.provider("Grill", true);
    let customer = fx.customer("Katherine");
    let meal = fx.meal(provider.id, "Ribs", "19.00");
    fx.services
        .orders
        .create_order(customer.id, Fixture::new_order(meal.id, 1))
        .await
        .unwrap();

    let err = fx.services.users.delete_user(customer.id).await.unwrap_err();
    assert_eq!(err, MarketplaceError::has_dependents("user", 1));

    // one meal plus one incoming order
    let err = fx.services.users.delete_user(owner.id).await.unwrap_err();
    assert_eq!(err, MarketplaceError::has_dependents("user", 2));
}

#[tokio::test]
async fn test_delete_user_removes_cart_and_reviews() {
    print_test_header("test_delete_user_removes_cart_and_reviews", &[]);
    let fx = Fixture::new();
    let (_, provider) = fx.provider("Sushi Go", true);
    let customer = fx.customer("Annie");
    let meal = fx.meal(provider.id, "Nigiri", "12.00");
    fx.services.cart.add_item(customer.id, meal.id, 2).await.unwrap();

    fx.services.users.delete_user(customer.id).await.unwrap();
    assert_eq!(fx.store.cart_len(), 0);
    assert!(!fx.store.tables.read().users.contains_key(&customer.id));

    let err = fx.services.users.delete_user(customer.id).await.unwrap_err();
    assert!(matches!(err, MarketplaceError::NotFound { .. }));
}

#[tokio::test]
async fn test_public_provider_page_and_admin_listing() {
    print_test_header(
        "test_public_provider_page_and_admin_listing",
        &[
            "Pending providers are hidden from the public page",
            "Admin listing carries meal and order counts",
        ],
    );
    let fx = Fixture::new();
    let (_, live) = fx.provider("Live Kitchen", true);
    let (_, pending) = fx.provider("Pending Kitchen", false);
    let customer = fx.customer("Evelyn");
    let soup = fx.meal(live.id, "Soup", "5.00");
    fx.meal(live.id, "Bread", "2.00");
    fx.services
        .orders
        .create_order(customer.id, Fixture::new_order(soup.id, 3))
        .await
        .unwrap();

    let err = fx.services.users.get_provider(pending.id).await.unwrap_err();
    assert!(matches!(err, MarketplaceError::NotFound { .. }));

    let page = fx.services.users.get_provider(live.id).await.unwrap();
    assert_eq!(page.meal_count, 2);
    assert_eq!(page.order_count, 1);
    assert!(page.owner.is_some());

    let waiting = fx
        .services
        .users
        .list_providers(
            &ProviderFilter {
                is_active: Some(false),
                ..Default::default()
            },
            &PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(waiting.pagination.total, 1);
    assert_eq!(waiting.data[0].profile.id, pending.id);
    assert_eq!(waiting.data[0].meal_count, 0);

    let err = fx
        .services
        .users
        .set_provider_active(uuid::Uuid::new_v4(), true)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketplaceError::NotFound { .. }));
}

#[tokio::test]
async fn test_list_users_filters_by_role_and_search() {
    print_test_header("test_list_users_filters_by_role_and_search", &[]);
    let fx = Fixture::new();
    fx.customer("Alice Smith");
    fx.customer("Bob Jones");
    fx.admin();
    fx.provider("Corner Cafe", true);

    let customers = fx
        .services
        .users
        .list_users(
            &UserFilter {
                role: Some(Role::Customer),
                ..Default::default()
            },
            &PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(customers.pagination.total, 2);

    let found = fx
        .services
        .users
        .list_users(
            &UserFilter {
                search: Some("JONES".into()),
                ..Default::default()
            },
            &PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(found.data.len(), 1);
    assert_eq!(found.data[0].name, "Bob Jones");
}
