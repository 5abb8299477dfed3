use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use autocode::database::connect;
use autocode::utils::init_logger;
use autocode::{setup_database, AutoCodeConfig, AutoCodeHistoryService, DbRegistry, PageInfo, RollbackRequest};
use clap::{Args, Parser, Subcommand};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "autocode", version, about = "代码生成器历史记录与回滚")]
struct Cli {
    /// 项目根目录
    #[arg(long, env = "AUTOCODE_ROOT")]
    root: Option<PathBuf>,

    /// 后端源码相对根目录的路径
    #[arg(long, env = "AUTOCODE_SERVER", default_value = "server")]
    server: String,

    /// 前端源码相对根目录的路径
    #[arg(long, env = "AUTOCODE_WEB", default_value = "web/src")]
    web: String,

    /// 历史记录所在的数据库
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://autocode.sqlite?mode=rwc")]
    database_url: String,

    /// 业务数据库，格式为 `名称=地址`，可重复
    #[arg(long = "business-db", env = "AUTOCODE_BUSINESS_DB", value_delimiter = ',')]
    business_db: Vec<String>,

    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 分页列出历史记录
    List {
        #[arg(long, default_value_t = 1)]
        page: u64,
        #[arg(long, default_value_t = 10)]
        page_size: u64,
    },
    /// 输出生成时的原始请求
    First { id: i32 },
    /// 检查是否存在未回滚的同名实体
    Repeat {
        #[arg(long, default_value = "")]
        business_db: String,
        #[arg(long)]
        struct_name: String,
        #[arg(long)]
        package: String,
    },
    /// 删除历史记录，不执行回滚
    Delete { id: i32 },
    /// 回滚一次代码生成
    Rollback(RollbackArgs),
}

#[derive(Debug, Args)]
struct RollbackArgs {
    id: i32,
    /// 同时删除登记的 API
    #[arg(long)]
    delete_api: bool,
    /// 同时删除菜单
    #[arg(long)]
    delete_menu: bool,
    /// 同时删除数据表
    #[arg(long)]
    delete_table: bool,
}

async fn build_service(cli: &Cli) -> Result<AutoCodeHistoryService> {
    let mut config = AutoCodeConfig {
        server: cli.server.clone(),
        web: cli.web.clone(),
        ..AutoCodeConfig::default()
    };
    if let Some(root) = &cli.root {
        config.root = root.clone();
    }

    let mut databases = DbRegistry::new(setup_database(&cli.database_url).await?);
    for entry in &cli.business_db {
        let Some((name, url)) = entry.split_once('=') else {
            bail!("业务数据库配置格式错误，应为 名称=地址: {entry}");
        };
        let connection = connect(url.trim())
            .await
            .with_context(|| format!("连接业务数据库 {name} 失败"))?;
        databases = databases.with_business(name.trim(), connection);
    }
    Ok(AutoCodeHistoryService::new(config, databases))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(&cli.log_level)?;
    let service = build_service(&cli).await?;

    match cli.command {
        Command::List { page, page_size } => {
            let (records, total) = service.get_list(PageInfo { page, page_size }).await?;
            println!("共 {total} 条");
            for record in records {
                println!(
                    "{}\t{}.{}\t{}\t{}\t{}",
                    record.id,
                    record.package,
                    record.struct_name,
                    record.table_name,
                    if record.is_rolled_back() { "已回滚" } else { "有效" },
                    record.updated_at
                );
            }
        }
        Command::First { id } => println!("{}", service.first(id).await?),
        Command::Repeat {
            business_db,
            struct_name,
            package,
        } => println!("{}", service.repeat(&business_db, &struct_name, &package).await?),
        Command::Delete { id } => {
            service.delete(id).await?;
            info!("已删除历史记录 {}", id);
        }
        Command::Rollback(args) => {
            let report = service
                .rollback(RollbackRequest {
                    id: args.id,
                    delete_api: args.delete_api,
                    delete_menu: args.delete_menu,
                    delete_table: args.delete_table,
                })
                .await
                .with_context(|| format!("回滚历史记录 {} 失败", args.id))?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
