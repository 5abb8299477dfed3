use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SysAutoCodeHistories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SysAutoCodeHistories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SysAutoCodeHistories::CreatedAt).string().not_null())
                    .col(ColumnDef::new(SysAutoCodeHistories::UpdatedAt).string().not_null())
                    .col(ColumnDef::new(SysAutoCodeHistories::TableName).string().not_null().default(""))
                    .col(ColumnDef::new(SysAutoCodeHistories::Package).string().not_null().default(""))
                    .col(ColumnDef::new(SysAutoCodeHistories::Request).text().not_null().default(""))
                    .col(ColumnDef::new(SysAutoCodeHistories::StructName).string().not_null().default(""))
                    .col(ColumnDef::new(SysAutoCodeHistories::Abbreviation).string().not_null().default(""))
                    .col(ColumnDef::new(SysAutoCodeHistories::BusinessDb).string().not_null().default(""))
                    .col(ColumnDef::new(SysAutoCodeHistories::Description).string().not_null().default(""))
                    .col(ColumnDef::new(SysAutoCodeHistories::Templates).text().not_null().default("{}"))
                    .col(ColumnDef::new(SysAutoCodeHistories::Injections).text().not_null().default("{}"))
                    .col(ColumnDef::new(SysAutoCodeHistories::MenuId).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(SysAutoCodeHistories::ExportTemplateId)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(SysAutoCodeHistories::Flag).integer().not_null().default(0))
                    .to_owned(),
            )
            .await?;

        // 重复检测按 (business_db, struct_name, package, flag) 查询
        manager
            .create_index(
                Index::create()
                    .name("idx_auto_code_history_entity")
                    .table(SysAutoCodeHistories::Table)
                    .col(SysAutoCodeHistories::BusinessDb)
                    .col(SysAutoCodeHistories::StructName)
                    .col(SysAutoCodeHistories::Package)
                    .col(SysAutoCodeHistories::Flag)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_auto_code_history_updated_at")
                    .table(SysAutoCodeHistories::Table)
                    .col(SysAutoCodeHistories::UpdatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SysAutoCodeHistories::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum SysAutoCodeHistories {
    Table,
    Id,
    CreatedAt,
    UpdatedAt,
    TableName,
    Package,
    Request,
    StructName,
    Abbreviation,
    BusinessDb,
    Description,
    Templates,
    Injections,
    MenuId,
    ExportTemplateId,
    Flag,
}
