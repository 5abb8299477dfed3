use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // API 表
        manager
            .create_table(
                Table::create()
                    .table(SysApis::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SysApis::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SysApis::Path).string().not_null())
                    .col(ColumnDef::new(SysApis::Description).string().not_null().default(""))
                    .col(ColumnDef::new(SysApis::ApiGroup).string().not_null().default(""))
                    .col(ColumnDef::new(SysApis::Method).string().not_null().default("POST"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sys_apis_path_method")
                    .table(SysApis::Table)
                    .col(SysApis::Path)
                    .col(SysApis::Method)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CasbinRule::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CasbinRule::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CasbinRule::Ptype).string().not_null().default("p"))
                    .col(ColumnDef::new(CasbinRule::V0).string().not_null().default(""))
                    .col(ColumnDef::new(CasbinRule::V1).string().not_null().default(""))
                    .col(ColumnDef::new(CasbinRule::V2).string().not_null().default(""))
                    .to_owned(),
            )
            .await?;

        // 菜单及其附属表
        manager
            .create_table(
                Table::create()
                    .table(SysBaseMenus::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SysBaseMenus::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SysBaseMenus::ParentId).integer().not_null().default(0))
                    .col(ColumnDef::new(SysBaseMenus::Path).string().not_null().default(""))
                    .col(ColumnDef::new(SysBaseMenus::Name).string().not_null().default(""))
                    .col(ColumnDef::new(SysBaseMenus::Component).string().not_null().default(""))
                    .col(ColumnDef::new(SysBaseMenus::Title).string().not_null().default(""))
                    .col(ColumnDef::new(SysBaseMenus::Sort).integer().not_null().default(0))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sys_base_menus_parent_id")
                    .table(SysBaseMenus::Table)
                    .col(SysBaseMenus::ParentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SysBaseMenuParameters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SysBaseMenuParameters::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SysBaseMenuParameters::SysBaseMenuId).integer().not_null())
                    .col(ColumnDef::new(SysBaseMenuParameters::Type).string().not_null().default(""))
                    .col(ColumnDef::new(SysBaseMenuParameters::Key).string().not_null().default(""))
                    .col(ColumnDef::new(SysBaseMenuParameters::Value).string().not_null().default(""))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SysBaseMenuBtns::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SysBaseMenuBtns::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SysBaseMenuBtns::SysBaseMenuId).integer().not_null())
                    .col(ColumnDef::new(SysBaseMenuBtns::Name).string().not_null().default(""))
                    .col(ColumnDef::new(SysBaseMenuBtns::Desc).string().not_null().default(""))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SysAuthorityMenus::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SysAuthorityMenus::SysAuthorityAuthorityId).integer().not_null())
                    .col(ColumnDef::new(SysAuthorityMenus::SysBaseMenuId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(SysAuthorityMenus::SysAuthorityAuthorityId)
                            .col(SysAuthorityMenus::SysBaseMenuId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SysAuthorityBtns::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SysAuthorityBtns::AuthorityId).integer().not_null())
                    .col(ColumnDef::new(SysAuthorityBtns::SysMenuId).integer().not_null())
                    .col(ColumnDef::new(SysAuthorityBtns::SysBaseMenuBtnId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(SysAuthorityBtns::AuthorityId)
                            .col(SysAuthorityBtns::SysMenuId)
                            .col(SysAuthorityBtns::SysBaseMenuBtnId),
                    )
                    .to_owned(),
            )
            .await?;

        // 导出模板
        manager
            .create_table(
                Table::create()
                    .table(SysExportTemplates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SysExportTemplates::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SysExportTemplates::DbName).string().not_null().default(""))
                    .col(ColumnDef::new(SysExportTemplates::Name).string().not_null().default(""))
                    .col(ColumnDef::new(SysExportTemplates::TableName).string().not_null().default(""))
                    .col(ColumnDef::new(SysExportTemplates::TemplateId).string().not_null().default(""))
                    .col(ColumnDef::new(SysExportTemplates::TemplateInfo).text().not_null().default(""))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SysExportTemplates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SysAuthorityBtns::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SysAuthorityMenus::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SysBaseMenuBtns::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SysBaseMenuParameters::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SysBaseMenus::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CasbinRule::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SysApis::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SysApis {
    Table,
    Id,
    Path,
    Description,
    ApiGroup,
    Method,
}

#[derive(DeriveIden)]
enum CasbinRule {
    Table,
    Id,
    Ptype,
    V0,
    V1,
    V2,
}

#[derive(DeriveIden)]
enum SysBaseMenus {
    Table,
    Id,
    ParentId,
    Path,
    Name,
    Component,
    Title,
    Sort,
}

#[derive(DeriveIden)]
enum SysBaseMenuParameters {
    Table,
    Id,
    SysBaseMenuId,
    Type,
    Key,
    Value,
}

#[derive(DeriveIden)]
enum SysBaseMenuBtns {
    Table,
    Id,
    SysBaseMenuId,
    Name,
    Desc,
}

#[derive(DeriveIden)]
enum SysAuthorityMenus {
    Table,
    SysAuthorityAuthorityId,
    SysBaseMenuId,
}

#[derive(DeriveIden)]
enum SysAuthorityBtns {
    Table,
    AuthorityId,
    SysMenuId,
    SysBaseMenuBtnId,
}

#[derive(DeriveIden)]
enum SysExportTemplates {
    Table,
    Id,
    DbName,
    Name,
    TableName,
    TemplateId,
    TemplateInfo,
}
