use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use autocode_migration::{Migrator, MigratorTrait};
use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sea_orm::{DatabaseConnection, SqlxSqliteConnector};
use tracing::debug;

use crate::error::AutoCodeError;

fn is_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// 创建 SQLite 连接选项
fn create_sqlite_options(url: &str) -> Result<SqliteConnectOptions> {
    let options = SqliteConnectOptions::from_str(url)
        .with_context(|| format!("无法解析数据库地址: {url}"))?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(30));
    if is_memory(url) {
        return Ok(options);
    }
    Ok(options
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal))
}

/// 建立数据库连接，不执行迁移
pub async fn connect(url: &str) -> Result<DatabaseConnection> {
    // 内存数据库的每个连接互相独立，只能使用单连接
    let max_connections = if is_memory(url) { 1 } else { 10 };
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(create_sqlite_options(url)?)
        .await
        .with_context(|| format!("连接数据库失败: {url}"))?;
    debug!("SQLite 连接池已创建，最大连接数 {}", max_connections);
    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

/// 进行数据库迁移并获取数据库连接，供外部使用
pub async fn setup_database(url: &str) -> Result<DatabaseConnection> {
    let connection = connect(url).await?;
    Migrator::up(&connection, None).await.context("数据库迁移失败")?;
    debug!("数据库迁移完成");
    Ok(connection)
}

/// 默认数据库与按名称登记的业务数据库
#[derive(Clone, Debug)]
pub struct DbRegistry {
    default: DatabaseConnection,
    business: HashMap<String, DatabaseConnection>,
}

impl DbRegistry {
    pub fn new(default: DatabaseConnection) -> Self {
        Self {
            default,
            business: HashMap::new(),
        }
    }

    pub fn with_business(mut self, name: impl Into<String>, connection: DatabaseConnection) -> Self {
        self.business.insert(name.into(), connection);
        self
    }

    pub fn default_db(&self) -> &DatabaseConnection {
        &self.default
    }

    /// 名称为空时返回默认数据库，未登记的名称返回错误
    pub fn resolve(&self, name: &str) -> Result<&DatabaseConnection, AutoCodeError> {
        if name.is_empty() {
            return Ok(&self.default);
        }
        self.business.get(name).ok_or_else(|| {
            AutoCodeError::registration(
                format!("resolve business database {name}"),
                anyhow::anyhow!("业务数据库 {name} 未配置"),
            )
        })
    }
}
