use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_users_table::Migration),
            Box::new(m20240301_000002_create_events_table::Migration),
            Box::new(m20240301_000003_create_coupons_table::Migration),
            Box::new(m20240301_000004_create_clothes_table::Migration),
            Box::new(m20240301_000005_create_orders_table::Migration),
            Box::new(m20240301_000006_create_order_details_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240301_000001_create_users_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_users_table"
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
                        .col(
                            ColumnDef::new(Users::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Users::Name).string().not_null())
                        .col(ColumnDef::new(Users::Email).string().null())
                        .col(ColumnDef::new(Users::Gender).string_len(8).null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Users {
        Table,
        Id,
        Name,
        Email,
        Gender,
    }
}

mod m20240301_000002_create_events_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_events_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Events::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Events::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Events::Name).string().not_null().unique_key())
                        .col(ColumnDef::new(Events::Title).string().not_null())
                        .col(ColumnDef::new(Events::Desc).text().null())
                        .col(ColumnDef::new(Events::StartDate).timestamp_with_time_zone().null())
                        .col(ColumnDef::new(Events::EndDate).timestamp_with_time_zone().null())
                        .col(
                            ColumnDef::new(Events::FreeShipping)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Events::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Events {
        Table,
        Id,
        Name,
        Title,
        Desc,
        StartDate,
        EndDate,
        FreeShipping,
    }
}

mod m20240301_000003_create_coupons_table {
    use super::m20240301_000002_create_events_table::Events;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_coupons_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Coupons::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Coupons::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Coupons::Code).string_len(32).not_null().unique_key())
                        .col(
                            ColumnDef::new(Coupons::Status)
                                .string_len(16)
                                .not_null()
                                .default("unused"),
                        )
                        .col(
                            ColumnDef::new(Coupons::Type)
                                .string_len(16)
                                .not_null()
                                .default("default"),
                        )
                        .col(ColumnDef::new(Coupons::Price).big_integer().not_null().default(0))
                        .col(
                            ColumnDef::new(Coupons::FreeShipping)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Coupons::Desc).text().null())
                        .col(ColumnDef::new(Coupons::EventId).integer().null())
                        .col(ColumnDef::new(Coupons::ExpiresDate).timestamp_with_time_zone().null())
                        .col(ColumnDef::new(Coupons::CreateDate).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Coupons::UpdateDate).timestamp_with_time_zone().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_coupons_event_id")
                                .from(Coupons::Table, Coupons::EventId)
                                .to(Events::Table, Events::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Coupons::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Coupons {
        Table,
        Id,
        Code,
        Status,
        Type,
        Price,
        FreeShipping,
        Desc,
        EventId,
        ExpiresDate,
        CreateDate,
        UpdateDate,
    }
}

mod m20240301_000004_create_clothes_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_clothes_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Clothes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Clothes::Code)
                                .string_len(16)
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Clothes::Category).string().not_null())
                        .col(ColumnDef::new(Clothes::Price).big_integer().not_null().default(0))
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Clothes::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Clothes {
        Table,
        Code,
        Category,
        Price,
    }
}

mod m20240301_000005_create_orders_table {
    use super::m20240301_000001_create_users_table::Users;
    use super::m20240301_000003_create_coupons_table::Coupons;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000005_create_orders_table"
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
                        .col(
                            ColumnDef::new(Orders::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Orders::UserId).integer().not_null())
                        .col(ColumnDef::new(Orders::CouponId).integer().null())
                        .col(ColumnDef::new(Orders::StatusId).integer().not_null())
                        .col(ColumnDef::new(Orders::Online).boolean().not_null().default(false))
                        .col(
                            ColumnDef::new(Orders::AdditionalDay)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Orders::Desc).text().null())
                        .col(ColumnDef::new(Orders::CreateDate).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Orders::UpdateDate).timestamp_with_time_zone().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_user_id")
                                .from(Orders::Table, Orders::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_coupon_id")
                                .from(Orders::Table, Orders::CouponId)
                                .to(Coupons::Table, Coupons::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_coupon_id")
                        .table(Orders::Table)
                        .col(Orders::CouponId)
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
    pub enum Orders {
        Table,
        Id,
        UserId,
        CouponId,
        StatusId,
        Online,
        AdditionalDay,
        Desc,
        CreateDate,
        UpdateDate,
    }
}

mod m20240301_000006_create_order_details_table {
    use super::m20240301_000004_create_clothes_table::Clothes;
    use super::m20240301_000005_create_orders_table::Orders;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000006_create_order_details_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OrderDetails::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderDetails::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(OrderDetails::OrderId).integer().not_null())
                        .col(ColumnDef::new(OrderDetails::ClothesCode).string_len(16).null())
                        .col(ColumnDef::new(OrderDetails::Name).string().not_null())
                        .col(
                            ColumnDef::new(OrderDetails::Price)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(OrderDetails::FinalPrice)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(OrderDetails::Desc).text().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_details_order_id")
                                .from(OrderDetails::Table, OrderDetails::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_details_clothes_code")
                                .from(OrderDetails::Table, OrderDetails::ClothesCode)
                                .to(Clothes::Table, Clothes::Code),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderDetails::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum OrderDetails {
        Table,
        Id,
        OrderId,
        ClothesCode,
        Name,
        Price,
        FinalPrice,
        Desc,
    }
}
