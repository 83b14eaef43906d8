use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_reference_tables::Migration),
            Box::new(m20240101_000002_create_cashbooks_table::Migration),
            Box::new(m20240101_000003_create_indent_tables::Migration),
            Box::new(m20240101_000004_create_purchase_order_tables::Migration),
            Box::new(m20240101_000005_create_challan_tables::Migration),
            Box::new(m20240101_000006_create_stock_tables::Migration),
        ]
    }
}

mod m20240101_000001_create_reference_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_reference_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Sites::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Sites::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Sites::Code).string().not_null().unique_key())
                        .col(ColumnDef::new(Sites::Name).string().not_null())
                        .col(ColumnDef::new(Sites::Address).string())
                        .col(ColumnDef::new(Sites::IsActive).boolean().not_null().default(true))
                        .col(ColumnDef::new(Sites::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Sites::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Items::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Items::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Items::Code).string().not_null().unique_key())
                        .col(ColumnDef::new(Items::Name).string().not_null())
                        .col(ColumnDef::new(Items::Unit).string().not_null())
                        .col(
                            ColumnDef::new(Items::IsExpiryTracked)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Items::HsnCode).string())
                        .col(ColumnDef::new(Items::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Items::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Vendors::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Vendors::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Vendors::Name).string().not_null())
                        .col(ColumnDef::new(Vendors::ContactPerson).string())
                        .col(ColumnDef::new(Vendors::Phone).string())
                        .col(ColumnDef::new(Vendors::GstNumber).string())
                        .col(ColumnDef::new(Vendors::Address).string())
                        .col(ColumnDef::new(Vendors::IsActive).boolean().not_null().default(true))
                        .col(ColumnDef::new(Vendors::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Vendors::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Vendors::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Items::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Sites::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Sites {
        Table,
        Id,
        Code,
        Name,
        Address,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Items {
        Table,
        Id,
        Code,
        Name,
        Unit,
        IsExpiryTracked,
        HsnCode,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Vendors {
        Table,
        Id,
        Name,
        ContactPerson,
        Phone,
        GstNumber,
        Address,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_cashbooks_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_cashbooks_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Cashbooks::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Cashbooks::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Cashbooks::VoucherNo)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Cashbooks::SiteId).big_integer().not_null())
                        .col(ColumnDef::new(Cashbooks::Payee).string().not_null())
                        .col(ColumnDef::new(Cashbooks::Narration).string())
                        .col(
                            ColumnDef::new(Cashbooks::Amount)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Cashbooks::VoucherDate).date().not_null())
                        .col(ColumnDef::new(Cashbooks::ApprovalStatus).string().not_null())
                        .col(ColumnDef::new(Cashbooks::CreatedBy).uuid().not_null())
                        .col(ColumnDef::new(Cashbooks::Approved1By).uuid())
                        .col(ColumnDef::new(Cashbooks::Approved1At).timestamp_with_time_zone())
                        .col(
                            ColumnDef::new(Cashbooks::IsApproved1)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Cashbooks::IsSuspended)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Cashbooks::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Cashbooks::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_cashbooks_site")
                                .from(Cashbooks::Table, Cashbooks::SiteId)
                                .to(Sites::Table, Sites::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Cashbooks::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Cashbooks {
        Table,
        Id,
        VoucherNo,
        SiteId,
        Payee,
        Narration,
        Amount,
        VoucherDate,
        ApprovalStatus,
        CreatedBy,
        Approved1By,
        Approved1At,
        IsApproved1,
        IsSuspended,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Sites {
        Table,
        Id,
    }
}

mod m20240101_000003_create_indent_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_indent_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Indents::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Indents::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Indents::IndentNo)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Indents::SiteId).big_integer().not_null())
                        .col(ColumnDef::new(Indents::RequiredBy).date())
                        .col(ColumnDef::new(Indents::Remark).string())
                        .col(ColumnDef::new(Indents::ApprovalStatus).string().not_null())
                        .col(ColumnDef::new(Indents::CreatedBy).uuid().not_null())
                        .col(ColumnDef::new(Indents::Approved1By).uuid())
                        .col(ColumnDef::new(Indents::Approved1At).timestamp_with_time_zone())
                        .col(ColumnDef::new(Indents::Approved2By).uuid())
                        .col(ColumnDef::new(Indents::Approved2At).timestamp_with_time_zone())
                        .col(ColumnDef::new(Indents::CompletedBy).uuid())
                        .col(ColumnDef::new(Indents::CompletedAt).timestamp_with_time_zone())
                        .col(
                            ColumnDef::new(Indents::IsApproved1)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Indents::IsApproved2)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Indents::IsCompleted)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Indents::IsSuspended)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Indents::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Indents::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_indents_site")
                                .from(Indents::Table, Indents::SiteId)
                                .to(Sites::Table, Sites::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(IndentLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(IndentLines::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(IndentLines::IndentId).big_integer().not_null())
                        .col(ColumnDef::new(IndentLines::ItemId).big_integer().not_null())
                        .col(ColumnDef::new(IndentLines::Qty).decimal_len(19, 4).not_null())
                        .col(ColumnDef::new(IndentLines::Approved1Qty).decimal_len(19, 4))
                        .col(ColumnDef::new(IndentLines::Approved2Qty).decimal_len(19, 4))
                        .col(ColumnDef::new(IndentLines::Remark).string())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_indent_lines_indent")
                                .from(IndentLines::Table, IndentLines::IndentId)
                                .to(Indents::Table, Indents::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_indent_lines_item")
                                .from(IndentLines::Table, IndentLines::ItemId)
                                .to(Items::Table, Items::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(IndentLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Indents::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Indents {
        Table,
        Id,
        IndentNo,
        SiteId,
        RequiredBy,
        Remark,
        ApprovalStatus,
        CreatedBy,
        Approved1By,
        Approved1At,
        Approved2By,
        Approved2At,
        CompletedBy,
        CompletedAt,
        IsApproved1,
        IsApproved2,
        IsCompleted,
        IsSuspended,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum IndentLines {
        Table,
        Id,
        IndentId,
        ItemId,
        Qty,
        Approved1Qty,
        Approved2Qty,
        Remark,
    }

    #[derive(DeriveIden)]
    enum Sites {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Items {
        Table,
        Id,
    }
}

mod m20240101_000004_create_purchase_order_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_purchase_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrders::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::PoNo)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::SiteId).big_integer().not_null())
                        .col(ColumnDef::new(PurchaseOrders::VendorId).big_integer().not_null())
                        .col(ColumnDef::new(PurchaseOrders::IndentId).big_integer())
                        .col(ColumnDef::new(PurchaseOrders::ExpectedDate).date())
                        .col(ColumnDef::new(PurchaseOrders::Remark).string())
                        .col(
                            ColumnDef::new(PurchaseOrders::TotalAmount)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::ApprovalStatus)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::CreatedBy).uuid().not_null())
                        .col(ColumnDef::new(PurchaseOrders::Approved1By).uuid())
                        .col(ColumnDef::new(PurchaseOrders::Approved1At).timestamp_with_time_zone())
                        .col(ColumnDef::new(PurchaseOrders::Approved2By).uuid())
                        .col(ColumnDef::new(PurchaseOrders::Approved2At).timestamp_with_time_zone())
                        .col(ColumnDef::new(PurchaseOrders::CompletedBy).uuid())
                        .col(ColumnDef::new(PurchaseOrders::CompletedAt).timestamp_with_time_zone())
                        .col(
                            ColumnDef::new(PurchaseOrders::IsApproved1)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::IsApproved2)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::IsCompleted)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::IsSuspended)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_orders_site")
                                .from(PurchaseOrders::Table, PurchaseOrders::SiteId)
                                .to(Sites::Table, Sites::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_orders_vendor")
                                .from(PurchaseOrders::Table, PurchaseOrders::VendorId)
                                .to(Vendors::Table, Vendors::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrderLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrderLines::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderLines::PoId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderLines::ItemId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderLines::OrderedQty)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderLines::Rate)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderLines::Amount)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderLines::ReceivedQty)
                                .decimal_len(19, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(PurchaseOrderLines::Approved1Qty).decimal_len(19, 4))
                        .col(ColumnDef::new(PurchaseOrderLines::Approved2Qty).decimal_len(19, 4))
                        .col(ColumnDef::new(PurchaseOrderLines::Remark).string())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_order_lines_po")
                                .from(PurchaseOrderLines::Table, PurchaseOrderLines::PoId)
                                .to(PurchaseOrders::Table, PurchaseOrders::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_order_lines_item")
                                .from(PurchaseOrderLines::Table, PurchaseOrderLines::ItemId)
                                .to(Items::Table, Items::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PurchaseOrderLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PurchaseOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum PurchaseOrders {
        Table,
        Id,
        PoNo,
        SiteId,
        VendorId,
        IndentId,
        ExpectedDate,
        Remark,
        TotalAmount,
        ApprovalStatus,
        CreatedBy,
        Approved1By,
        Approved1At,
        Approved2By,
        Approved2At,
        CompletedBy,
        CompletedAt,
        IsApproved1,
        IsApproved2,
        IsCompleted,
        IsSuspended,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum PurchaseOrderLines {
        Table,
        Id,
        PoId,
        ItemId,
        OrderedQty,
        Rate,
        Amount,
        ReceivedQty,
        Approved1Qty,
        Approved2Qty,
        Remark,
    }

    #[derive(DeriveIden)]
    enum Sites {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Vendors {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Items {
        Table,
        Id,
    }
}

mod m20240101_000005_create_challan_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_challan_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(DeliveryChallans::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DeliveryChallans::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(DeliveryChallans::ChallanNo)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(DeliveryChallans::SiteId).big_integer().not_null())
                        .col(
                            ColumnDef::new(DeliveryChallans::VendorId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DeliveryChallans::PoId).big_integer().not_null())
                        .col(ColumnDef::new(DeliveryChallans::ChallanDate).date().not_null())
                        .col(ColumnDef::new(DeliveryChallans::ReceivedDate).date())
                        .col(ColumnDef::new(DeliveryChallans::VehicleNo).string())
                        .col(ColumnDef::new(DeliveryChallans::Remark).string())
                        .col(
                            ColumnDef::new(DeliveryChallans::TotalAmount)
                                .decimal_len(19, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(DeliveryChallans::BillNo).string())
                        .col(ColumnDef::new(DeliveryChallans::BillDate).date())
                        .col(
                            ColumnDef::new(DeliveryChallans::BillAmount)
                                .decimal_len(19, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(DeliveryChallans::DueDays)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(DeliveryChallans::DueDate).date())
                        .col(
                            ColumnDef::new(DeliveryChallans::PaidAmount)
                                .decimal_len(19, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(DeliveryChallans::DueAmount)
                                .decimal_len(19, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(DeliveryChallans::PaymentStatus)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DeliveryChallans::CreatedBy).uuid().not_null())
                        .col(
                            ColumnDef::new(DeliveryChallans::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DeliveryChallans::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_delivery_challans_site")
                                .from(DeliveryChallans::Table, DeliveryChallans::SiteId)
                                .to(Sites::Table, Sites::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_delivery_challans_po")
                                .from(DeliveryChallans::Table, DeliveryChallans::PoId)
                                .to(PurchaseOrders::Table, PurchaseOrders::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(DeliveryChallanLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DeliveryChallanLines::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(DeliveryChallanLines::ChallanId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DeliveryChallanLines::PoLineId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DeliveryChallanLines::ItemId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DeliveryChallanLines::ReceivingQty)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DeliveryChallanLines::Rate)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DeliveryChallanLines::Amount)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_delivery_challan_lines_challan")
                                .from(
                                    DeliveryChallanLines::Table,
                                    DeliveryChallanLines::ChallanId,
                                )
                                .to(DeliveryChallans::Table, DeliveryChallans::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_delivery_challan_lines_po_line")
                                .from(
                                    DeliveryChallanLines::Table,
                                    DeliveryChallanLines::PoLineId,
                                )
                                .to(PurchaseOrderLines::Table, PurchaseOrderLines::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ChallanLineBatches::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ChallanLineBatches::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(ChallanLineBatches::ChallanLineId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ChallanLineBatches::BatchNumber)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ChallanLineBatches::ExpiryDate).date().not_null())
                        .col(
                            ColumnDef::new(ChallanLineBatches::Qty)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ChallanLineBatches::Amount)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_challan_line_batches_line")
                                .from(
                                    ChallanLineBatches::Table,
                                    ChallanLineBatches::ChallanLineId,
                                )
                                .to(DeliveryChallanLines::Table, DeliveryChallanLines::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ChallanLineBatches::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(DeliveryChallanLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(DeliveryChallans::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum DeliveryChallans {
        Table,
        Id,
        ChallanNo,
        SiteId,
        VendorId,
        PoId,
        ChallanDate,
        ReceivedDate,
        VehicleNo,
        Remark,
        TotalAmount,
        BillNo,
        BillDate,
        BillAmount,
        DueDays,
        DueDate,
        PaidAmount,
        DueAmount,
        PaymentStatus,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum DeliveryChallanLines {
        Table,
        Id,
        ChallanId,
        PoLineId,
        ItemId,
        ReceivingQty,
        Rate,
        Amount,
    }

    #[derive(DeriveIden)]
    enum ChallanLineBatches {
        Table,
        Id,
        ChallanLineId,
        BatchNumber,
        ExpiryDate,
        Qty,
        Amount,
    }

    #[derive(DeriveIden)]
    enum Sites {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum PurchaseOrders {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum PurchaseOrderLines {
        Table,
        Id,
    }
}

mod m20240101_000006_create_stock_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_stock_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SiteItemBalances::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SiteItemBalances::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(SiteItemBalances::SiteId).big_integer().not_null())
                        .col(ColumnDef::new(SiteItemBalances::ItemId).big_integer().not_null())
                        .col(
                            ColumnDef::new(SiteItemBalances::ClosingQty)
                                .decimal_len(19, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(SiteItemBalances::ClosingValue)
                                .decimal_len(19, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(SiteItemBalances::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SiteItemBalances::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("ux_site_item_balances_site_item")
                        .table(SiteItemBalances::Table)
                        .col(SiteItemBalances::SiteId)
                        .col(SiteItemBalances::ItemId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SiteItemBatchBalances::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SiteItemBatchBalances::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(SiteItemBatchBalances::SiteId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SiteItemBatchBalances::ItemId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SiteItemBatchBalances::BatchNumber)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SiteItemBatchBalances::ExpiryDate)
                                .date()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SiteItemBatchBalances::ClosingQty)
                                .decimal_len(19, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(SiteItemBatchBalances::ClosingValue)
                                .decimal_len(19, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(SiteItemBatchBalances::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SiteItemBatchBalances::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("ux_site_item_batch_balances_site_item_batch")
                        .table(SiteItemBatchBalances::Table)
                        .col(SiteItemBatchBalances::SiteId)
                        .col(SiteItemBatchBalances::ItemId)
                        .col(SiteItemBatchBalances::BatchNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(StockTransactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockTransactions::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(StockTransactions::SiteId).big_integer().not_null())
                        .col(ColumnDef::new(StockTransactions::ItemId).big_integer().not_null())
                        .col(ColumnDef::new(StockTransactions::BatchNumber).string())
                        .col(
                            ColumnDef::new(StockTransactions::QtyDelta)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockTransactions::ValueDelta)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockTransactions::ReferenceType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockTransactions::ReferenceId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockTransactions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("ix_stock_transactions_site_item")
                        .table(StockTransactions::Table)
                        .col(StockTransactions::SiteId)
                        .col(StockTransactions::ItemId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockTransactions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(SiteItemBatchBalances::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(SiteItemBalances::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum SiteItemBalances {
        Table,
        Id,
        SiteId,
        ItemId,
        ClosingQty,
        ClosingValue,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum SiteItemBatchBalances {
        Table,
        Id,
        SiteId,
        ItemId,
        BatchNumber,
        ExpiryDate,
        ClosingQty,
        ClosingValue,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum StockTransactions {
        Table,
        Id,
        SiteId,
        ItemId,
        BatchNumber,
        QtyDelta,
        ValueDelta,
        ReferenceType,
        ReferenceId,
        CreatedAt,
    }
}
