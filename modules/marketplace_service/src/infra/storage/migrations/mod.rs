//! Database migrations for the marketplace service

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users::Migration),
            Box::new(m20250301_000002_create_provider_profiles::Migration),
            Box::new(m20250301_000003_create_catalog::Migration),
            Box::new(m20250301_000004_create_cart_items::Migration),
            Box::new(m20250301_000005_create_orders::Migration),
            Box::new(m20250301_000006_create_reviews::Migration),
        ]
    }
}

fn created_at<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

fn money<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).decimal_len(10, 2).not_null().to_owned()
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    Image,
    Phone,
    Address,
    Role,
    Status,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Sessions {
    Table,
    Id,
    Token,
    UserId,
    ExpiresAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ProviderProfiles {
    Table,
    Id,
    UserId,
    BusinessName,
    Description,
    Logo,
    Phone,
    Address,
    Website,
    Cuisine,
    OpeningHours,
    DeliveryRadius,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    ProviderId,
    Name,
    Description,
    Image,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Cuisines {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Meals {
    Table,
    Id,
    ProviderId,
    CategoryId,
    CuisineId,
    Name,
    Description,
    Price,
    Image,
    Ingredients,
    Allergens,
    PrepTime,
    IsAvailable,
    IsFeatured,
    IsVegan,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CartItems {
    Table,
    Id,
    UserId,
    MealId,
    Quantity,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    OrderNumber,
    CustomerId,
    ProviderId,
    Status,
    TotalAmount,
    DeliveryAddress,
    DeliveryPhone,
    SpecialInstructions,
    EstimatedDeliveryTime,
    ActualDeliveryTime,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OrderItems {
    Table,
    Id,
    OrderId,
    MealId,
    MealName,
    Quantity,
    Price,
}

#[derive(DeriveIden)]
enum Reviews {
    Table,
    Id,
    CustomerId,
    MealId,
    Rating,
    Comment,
    CreatedAt,
    UpdatedAt,
}

mod m20250301_000001_create_users {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000001_create_users"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Users::Name).string().not_null())
                        .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                        .col(ColumnDef::new(Users::Image).string())
                        .col(ColumnDef::new(Users::Phone).string())
                        .col(ColumnDef::new(Users::Address).text())
                        .col(
                            ColumnDef::new(Users::Role)
                                .string_len(16)
                                .not_null()
                                .default("CUSTOMER"),
                        )
                        .col(
                            ColumnDef::new(Users::Status)
                                .string_len(16)
                                .not_null()
                                .default("ACTIVE"),
                        )
                        .col(ColumnDef::new(Users::IsActive).boolean().not_null().default(true))
                        .col(created_at(Users::CreatedAt))
                        .col(created_at(Users::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Sessions::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Sessions::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Sessions::Token).string().not_null().unique_key())
                        .col(ColumnDef::new(Sessions::UserId).uuid().not_null())
                        .col(
                            ColumnDef::new(Sessions::ExpiresAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(created_at(Sessions::CreatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_sessions_user")
                                .from(Sessions::Table, Sessions::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Sessions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }
}

mod m20250301_000002_create_provider_profiles {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000002_create_provider_profiles"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProviderProfiles::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProviderProfiles::Id)
                                .uuid()
                                .not_null()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(ProviderProfiles::UserId)
                                .uuid()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(ProviderProfiles::BusinessName).string().not_null())
                        .col(ColumnDef::new(ProviderProfiles::Description).text())
                        .col(ColumnDef::new(ProviderProfiles::Logo).string())
                        .col(ColumnDef::new(ProviderProfiles::Phone).string().not_null())
                        .col(ColumnDef::new(ProviderProfiles::Address).text().not_null())
                        .col(ColumnDef::new(ProviderProfiles::Website).string())
                        .col(ColumnDef::new(ProviderProfiles::Cuisine).string())
                        .col(ColumnDef::new(ProviderProfiles::OpeningHours).string())
                        .col(ColumnDef::new(ProviderProfiles::DeliveryRadius).decimal_len(10, 2))
                        .col(
                            ColumnDef::new(ProviderProfiles::IsActive)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(created_at(ProviderProfiles::CreatedAt))
                        .col(created_at(ProviderProfiles::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_provider_profiles_user")
                                .from(ProviderProfiles::Table, ProviderProfiles::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProviderProfiles::Table).to_owned())
                .await
        }
    }
}

mod m20250301_000003_create_catalog {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000003_create_catalog"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Categories::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Categories::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Categories::ProviderId).uuid())
                        .col(ColumnDef::new(Categories::Name).string().not_null())
                        .col(ColumnDef::new(Categories::Description).text())
                        .col(ColumnDef::new(Categories::Image).string())
                        .col(
                            ColumnDef::new(Categories::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(created_at(Categories::CreatedAt))
                        .col(created_at(Categories::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_categories_provider")
                                .from(Categories::Table, Categories::ProviderId)
                                .to(ProviderProfiles::Table, ProviderProfiles::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Cuisines::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Cuisines::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Cuisines::Name).string().not_null().unique_key())
                        .col(created_at(Cuisines::CreatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Meals::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Meals::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Meals::ProviderId).uuid().not_null())
                        .col(ColumnDef::new(Meals::CategoryId).uuid())
                        .col(ColumnDef::new(Meals::CuisineId).uuid())
                        .col(ColumnDef::new(Meals::Name).string().not_null())
                        .col(ColumnDef::new(Meals::Description).text())
                        .col(money(Meals::Price).check(Expr::col(Meals::Price).gte(0)).to_owned())
                        .col(ColumnDef::new(Meals::Image).string())
                        .col(ColumnDef::new(Meals::Ingredients).text())
                        .col(ColumnDef::new(Meals::Allergens).text())
                        .col(ColumnDef::new(Meals::PrepTime).integer())
                        .col(ColumnDef::new(Meals::IsAvailable).boolean().not_null().default(true))
                        .col(ColumnDef::new(Meals::IsFeatured).boolean().not_null().default(false))
                        .col(ColumnDef::new(Meals::IsVegan).boolean().not_null().default(false))
                        .col(created_at(Meals::CreatedAt))
                        .col(created_at(Meals::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_meals_provider")
                                .from(Meals::Table, Meals::ProviderId)
                                .to(ProviderProfiles::Table, ProviderProfiles::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_meals_category")
                                .from(Meals::Table, Meals::CategoryId)
                                .to(Categories::Table, Categories::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_meals_cuisine")
                                .from(Meals::Table, Meals::CuisineId)
                                .to(Cuisines::Table, Cuisines::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_meals_provider")
                        .table(Meals::Table)
                        .col(Meals::ProviderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Meals::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Cuisines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Categories::Table).to_owned())
                .await
        }
    }
}

mod m20250301_000004_create_cart_items {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000004_create_cart_items"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(CartItems::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(CartItems::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(CartItems::UserId).uuid().not_null())
                        .col(ColumnDef::new(CartItems::MealId).uuid().not_null())
                        .col(
                            ColumnDef::new(CartItems::Quantity)
                                .integer()
                                .not_null()
                                .check(Expr::col(CartItems::Quantity).gte(1)),
                        )
                        .col(created_at(CartItems::CreatedAt))
                        .col(created_at(CartItems::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_cart_items_user")
                                .from(CartItems::Table, CartItems::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_cart_items_meal")
                                .from(CartItems::Table, CartItems::MealId)
                                .to(Meals::Table, Meals::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            // Target of the add-to-cart upsert
            manager
                .create_index(
                    Index::create()
                        .name("uq_cart_items_user_meal")
                        .table(CartItems::Table)
                        .col(CartItems::UserId)
                        .col(CartItems::MealId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CartItems::Table).to_owned())
                .await
        }
    }
}

mod m20250301_000005_create_orders {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000005_create_orders"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().not_null().primary_key())
                        .col(
                            ColumnDef::new(Orders::OrderNumber)
                                .string_len(64)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Orders::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(Orders::ProviderId).uuid().not_null())
                        .col(
                            ColumnDef::new(Orders::Status)
                                .string_len(32)
                                .not_null()
                                .default("PENDING"),
                        )
                        .col(money(Orders::TotalAmount))
                        .col(ColumnDef::new(Orders::DeliveryAddress).text().not_null())
                        .col(ColumnDef::new(Orders::DeliveryPhone).string().not_null())
                        .col(ColumnDef::new(Orders::SpecialInstructions).text())
                        .col(ColumnDef::new(Orders::EstimatedDeliveryTime).timestamp_with_time_zone())
                        .col(ColumnDef::new(Orders::ActualDeliveryTime).timestamp_with_time_zone())
                        .col(created_at(Orders::CreatedAt))
                        .col(created_at(Orders::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_customer")
                                .from(Orders::Table, Orders::CustomerId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_provider")
                                .from(Orders::Table, Orders::ProviderId)
                                .to(ProviderProfiles::Table, ProviderProfiles::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(OrderItems::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(OrderItems::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::MealId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::MealName).string().not_null())
                        .col(ColumnDef::new(OrderItems::Quantity).integer().not_null())
                        .col(money(OrderItems::Price))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_order")
                                .from(OrderItems::Table, OrderItems::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_meal")
                                .from(OrderItems::Table, OrderItems::MealId)
                                .to(Meals::Table, Meals::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_orders_customer")
                        .table(Orders::Table)
                        .col(Orders::CustomerId)
                        .to_owned(),
                )
                .await?;
            manager
                .create_index(
                    Index::create()
                        .name("idx_orders_provider")
                        .table(Orders::Table)
                        .col(Orders::ProviderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }
}

mod m20250301_000006_create_reviews {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000006_create_reviews"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Reviews::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Reviews::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Reviews::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(Reviews::MealId).uuid().not_null())
                        .col(
                            ColumnDef::new(Reviews::Rating)
                                .integer()
                                .not_null()
                                .check(Expr::col(Reviews::Rating).between(1, 5)),
                        )
                        .col(ColumnDef::new(Reviews::Comment).text())
                        .col(created_at(Reviews::CreatedAt))
                        .col(created_at(Reviews::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_reviews_customer")
                                .from(Reviews::Table, Reviews::CustomerId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_reviews_meal")
                                .from(Reviews::Table, Reviews::MealId)
                                .to(Meals::Table, Meals::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("uq_reviews_customer_meal")
                        .table(Reviews::Table)
                        .col(Reviews::CustomerId)
                        .col(Reviews::MealId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Reviews::Table).to_owned())
                .await
        }
    }
}
