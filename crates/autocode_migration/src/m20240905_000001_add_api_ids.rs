use sea_orm::Statement;
use sea_orm_migration::prelude::*;

/// 历史记录直接保存生成时登记的 API id，回滚时不再依赖命名约定反推
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if !history_has_column(manager, "api_ids").await? {
            manager
                .alter_table(
                    Table::alter()
                        .table(SysAutoCodeHistories::Table)
                        .add_column(
                            ColumnDef::new(SysAutoCodeHistories::ApiIds)
                                .text()
                                .not_null()
                                .default("[]"),
                        )
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if history_has_column(manager, "api_ids").await? {
            manager
                .alter_table(
                    Table::alter()
                        .table(SysAutoCodeHistories::Table)
                        .drop_column(SysAutoCodeHistories::ApiIds)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }
}

#[derive(DeriveIden)]
enum SysAutoCodeHistories {
    Table,
    ApiIds,
}

async fn history_has_column(manager: &SchemaManager<'_>, column: &str) -> Result<bool, DbErr> {
    let backend = manager.get_connection().get_database_backend();
    let sql = format!(
        "SELECT COUNT(*) FROM pragma_table_info('sys_auto_code_histories') WHERE name = '{}'",
        column.replace('\'', "''")
    );
    let result = manager
        .get_connection()
        .query_one(Statement::from_string(backend, sql))
        .await?;
    Ok(result
        .and_then(|row| row.try_get_by_index(0).ok())
        .unwrap_or(0)
        >= 1)
}
