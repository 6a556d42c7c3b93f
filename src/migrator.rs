use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_locations_table::Migration),
            Box::new(m20240301_000002_create_profiles_table::Migration),
            Box::new(m20240301_000003_create_products_table::Migration),
            Box::new(m20240301_000004_create_product_sizes_table::Migration),
            Box::new(m20240301_000005_create_inventory_levels_table::Migration),
            Box::new(m20240301_000006_create_orders_table::Migration),
            Box::new(m20240301_000007_create_order_items_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240301_000001_create_locations_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_locations_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Locations::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Locations::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Locations::Name).string().not_null())
                        .col(ColumnDef::new(Locations::Kind).string().not_null())
                        .col(ColumnDef::new(Locations::Address).string().not_null())
                        .col(ColumnDef::new(Locations::Latitude).double().null())
                        .col(ColumnDef::new(Locations::Longitude).double().null())
                        .col(
                            ColumnDef::new(Locations::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Locations::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Locations::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Locations {
        Table,
        Id,
        Name,
        Kind,
        Address,
        Latitude,
        Longitude,
        IsActive,
        CreatedAt,
    }
}

mod m20240301_000002_create_profiles_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_profiles_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Profiles::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Profiles::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Profiles::Email).string().not_null())
                        .col(ColumnDef::new(Profiles::FullName).string().not_null())
                        .col(
                            ColumnDef::new(Profiles::PasswordHash)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(ColumnDef::new(Profiles::Role).string().not_null())
                        .col(ColumnDef::new(Profiles::AssignedLocationId).uuid().null())
                        .col(
                            ColumnDef::new(Profiles::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Profiles::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Profiles::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx-profiles-email")
                        .table(Profiles::Table)
                        .col(Profiles::Email)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx-profiles-assigned-location")
                        .table(Profiles::Table)
                        .col(Profiles::AssignedLocationId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Profiles::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Profiles {
        Table,
        Id,
        Email,
        FullName,
        PasswordHash,
        Role,
        AssignedLocationId,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000003_create_products_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(ColumnDef::new(Products::Sku).string().not_null())
                        .col(
                            ColumnDef::new(Products::Tags)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(ColumnDef::new(Products::ClothingType).string().null())
                        .col(
                            ColumnDef::new(Products::Sizes)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(Products::AllowCustomMeasurements)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Products::WeightGrams).integer().null())
                        .col(ColumnDef::new(Products::ImageUrl).string().null())
                        .col(
                            ColumnDef::new(Products::IsArchived)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Products::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Products::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx-products-sku")
                        .table(Products::Table)
                        .col(Products::Sku)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
        Name,
        Sku,
        Tags,
        ClothingType,
        Sizes,
        AllowCustomMeasurements,
        WeightGrams,
        ImageUrl,
        IsArchived,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000004_create_product_sizes_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_product_sizes_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProductSizes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductSizes::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductSizes::ProductId).uuid().not_null())
                        .col(ColumnDef::new(ProductSizes::SizeName).string().not_null())
                        .col(
                            ColumnDef::new(ProductSizes::Position)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(ProductSizes::ChestCm).decimal().null())
                        .col(ColumnDef::new(ProductSizes::WaistCm).decimal().null())
                        .col(ColumnDef::new(ProductSizes::HipCm).decimal().null())
                        .col(ColumnDef::new(ProductSizes::InseamCm).decimal().null())
                        .col(ColumnDef::new(ProductSizes::ShoulderCm).decimal().null())
                        .col(ColumnDef::new(ProductSizes::SleeveCm).decimal().null())
                        .col(ColumnDef::new(ProductSizes::FrontLengthCm).decimal().null())
                        .col(ColumnDef::new(ProductSizes::BackLengthCm).decimal().null())
                        .col(ColumnDef::new(ProductSizes::ThighCm).decimal().null())
                        .col(ColumnDef::new(ProductSizes::ShoeSizeUs).decimal().null())
                        .col(ColumnDef::new(ProductSizes::ShoeSizeEu).decimal().null())
                        .col(ColumnDef::new(ProductSizes::FootLengthCm).decimal().null())
                        .col(ColumnDef::new(ProductSizes::FootWidthCm).decimal().null())
                        .col(ColumnDef::new(ProductSizes::BeltLengthCm).decimal().null())
                        .col(ColumnDef::new(ProductSizes::BeltWidthCm).decimal().null())
                        .col(ColumnDef::new(ProductSizes::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(ProductSizes::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx-product-sizes-product-size")
                        .table(ProductSizes::Table)
                        .col(ProductSizes::ProductId)
                        .col(ProductSizes::SizeName)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductSizes::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ProductSizes {
        Table,
        Id,
        ProductId,
        SizeName,
        Position,
        ChestCm,
        WaistCm,
        HipCm,
        InseamCm,
        ShoulderCm,
        SleeveCm,
        FrontLengthCm,
        BackLengthCm,
        ThighCm,
        ShoeSizeUs,
        ShoeSizeEu,
        FootLengthCm,
        FootWidthCm,
        BeltLengthCm,
        BeltWidthCm,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000005_create_inventory_levels_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000005_create_inventory_levels_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventoryLevels::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryLevels::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryLevels::ProductId).uuid().not_null())
                        .col(ColumnDef::new(InventoryLevels::LocationId).uuid().not_null())
                        .col(ColumnDef::new(InventoryLevels::SizeName).string().null())
                        .col(
                            ColumnDef::new(InventoryLevels::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryLevels::Price).decimal().null())
                        .col(
                            ColumnDef::new(InventoryLevels::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx-inventory-product-location-size")
                        .table(InventoryLevels::Table)
                        .col(InventoryLevels::ProductId)
                        .col(InventoryLevels::LocationId)
                        .col(InventoryLevels::SizeName)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx-inventory-location")
                        .table(InventoryLevels::Table)
                        .col(InventoryLevels::LocationId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryLevels::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum InventoryLevels {
        Table,
        Id,
        ProductId,
        LocationId,
        SizeName,
        Quantity,
        Price,
        UpdatedAt,
    }
}

mod m20240301_000006_create_orders_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000006_create_orders_table"
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
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Orders::OrderNumber).string().not_null())
                        .col(ColumnDef::new(Orders::Status).string().not_null())
                        .col(ColumnDef::new(Orders::FulfillmentKind).string().not_null())
                        .col(ColumnDef::new(Orders::CustomerId).uuid().null())
                        .col(ColumnDef::new(Orders::CashierId).uuid().null())
                        .col(ColumnDef::new(Orders::PickupLocationId).uuid().null())
                        .col(ColumnDef::new(Orders::DeliveryAddress).string().null())
                        .col(
                            ColumnDef::new(Orders::TotalAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Orders::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Orders::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx-orders-order-number")
                        .table(Orders::Table)
                        .col(Orders::OrderNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx-orders-status")
                        .table(Orders::Table)
                        .col(Orders::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx-orders-pickup-location")
                        .table(Orders::Table)
                        .col(Orders::PickupLocationId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
        OrderNumber,
        Status,
        FulfillmentKind,
        CustomerId,
        CashierId,
        PickupLocationId,
        DeliveryAddress,
        TotalAmount,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000007_create_order_items_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000007_create_order_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(OrderItems::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(OrderItems::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::ProductId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::Quantity).integer().not_null())
                        .col(ColumnDef::new(OrderItems::SizeName).string().null())
                        .col(
                            ColumnDef::new(OrderItems::UnitPrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx-order-items-order")
                        .table(OrderItems::Table)
                        .col(OrderItems::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum OrderItems {
        Table,
        Id,
        OrderId,
        ProductId,
        Quantity,
        SizeName,
        UnitPrice,
    }
}
