//! 注入描述
//!
//! 代码生成时，每一次向公共入口文件（路由注册、服务注册、AutoMigrate 列表、插件入口）
//! 插入的代码都会以“类型 + 序列化描述”的形式记录在历史记录里。
//! 回滚时用同一份描述重新定位插入点并删除当时插入的片段。

mod package_enter;
mod package_initialize_gorm;
mod package_initialize_router;
mod package_module_enter;
mod plugin_enter;
mod plugin_gen;
mod plugin_initialize_gorm;
mod plugin_initialize_router;
pub mod source;

use std::path::{Path, PathBuf};

use enum_dispatch::enum_dispatch;
use strum::{AsRefStr, Display, EnumIter, EnumString};
use tokio::fs;

pub use package_enter::PackageEnter;
pub use package_initialize_gorm::PackageInitializeGorm;
pub use package_initialize_router::PackageInitializeRouter;
pub use package_module_enter::PackageModuleEnter;
pub use plugin_enter::PluginEnter;
pub use plugin_gen::PluginGen;
pub use plugin_initialize_gorm::PluginInitializeGorm;
pub use plugin_initialize_router::PluginInitializeRouter;
pub use source::{GoSource, ListKind};

use crate::config::AutoCodeConfig;
use crate::error::{AutoCodeError, Result};
use crate::history::paths::reanchor_absolute;

/// 历史记录中使用的注入类型标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, AsRefStr, Display, EnumIter)]
pub enum InjectionKind {
    PackageApiEnter,
    PackageRouterEnter,
    PackageServiceEnter,
    PackageApiModuleEnter,
    PackageRouterModuleEnter,
    PackageServiceModuleEnter,
    PackageInitializeGorm,
    PackageInitializeRouter,
    PluginGen,
    PluginApiEnter,
    PluginRouterEnter,
    PluginServiceEnter,
    PluginInitializeGorm,
    PluginInitializeRouter,
}

impl InjectionKind {
    /// 包级入口中的分组字段由同一个包下的所有实体共用
    pub fn is_package_enter(self) -> bool {
        matches!(
            self,
            InjectionKind::PackageApiEnter | InjectionKind::PackageRouterEnter | InjectionKind::PackageServiceEnter
        )
    }
}

#[enum_dispatch]
pub enum Injection {
    PackageEnter,
    PackageModuleEnter,
    PackageInitializeGorm,
    PackageInitializeRouter,
    PluginGen,
    PluginEnter,
    PluginInitializeGorm,
    PluginInitializeRouter,
}

#[enum_dispatch(Injection)]
pub trait Ast {
    /// 生成时写入的绝对路径
    fn path(&self) -> &str;

    /// 相对项目根目录的路径，旧记录可能为空
    fn relative_path(&self) -> &str;

    /// 插入片段，已存在时不做任何修改；返回是否修改了文件
    fn inject(&self, file: &mut GoSource) -> bool;

    /// 删除当初插入的片段，找不到时不做任何修改；返回是否修改了文件
    fn rollback(&self, file: &mut GoSource) -> bool;

    /// 以当前项目根目录定位目标文件
    fn target(&self, config: &AutoCodeConfig) -> Option<PathBuf> {
        if !self.relative_path().is_empty() {
            return Some(config.absolute(self.relative_path()));
        }
        if self.path().is_empty() {
            return None;
        }
        let path = PathBuf::from(self.path());
        Some(reanchor_absolute(config, &path).unwrap_or(path))
    }
}

impl Injection {
    pub fn decode(kind: InjectionKind, raw: &str) -> Result<Self, serde_json::Error> {
        use InjectionKind as K;

        Ok(match kind {
            K::PackageApiEnter | K::PackageRouterEnter | K::PackageServiceEnter => {
                serde_json::from_str::<PackageEnter>(raw)?.into()
            }
            K::PackageApiModuleEnter | K::PackageRouterModuleEnter | K::PackageServiceModuleEnter => {
                serde_json::from_str::<PackageModuleEnter>(raw)?.into()
            }
            K::PackageInitializeGorm => serde_json::from_str::<PackageInitializeGorm>(raw)?.into(),
            K::PackageInitializeRouter => serde_json::from_str::<PackageInitializeRouter>(raw)?.into(),
            K::PluginGen => serde_json::from_str::<PluginGen>(raw)?.into(),
            K::PluginApiEnter | K::PluginRouterEnter | K::PluginServiceEnter => {
                serde_json::from_str::<PluginEnter>(raw)?.into()
            }
            K::PluginInitializeGorm => serde_json::from_str::<PluginInitializeGorm>(raw)?.into(),
            K::PluginInitializeRouter => serde_json::from_str::<PluginInitializeRouter>(raw)?.into(),
        })
    }
}

/// 读取并解析目标文件
pub async fn parse(path: &Path) -> Result<GoSource> {
    let text = fs::read_to_string(path).await.map_err(|e| AutoCodeError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    GoSource::parse(text).map_err(|e| AutoCodeError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// 把结构化表示写回文件
pub async fn format(path: &Path, file: &GoSource) -> Result<()> {
    fs::write(path, file.as_str())
        .await
        .map_err(|source| AutoCodeError::Write {
            path: path.to_path_buf(),
            source,
        })
}

/// 向调用参数中追加一项，已存在时跳过
fn add_argument(file: &mut GoSource, call: usize, arg: &str) -> bool {
    if file
        .list(call, ListKind::Arguments)
        .into_iter()
        .any(|node| file.node_is(node, arg))
    {
        return false;
    }
    file.insert_into_list(call, ListKind::Arguments, arg)
}

/// 删除所有与 `arg` 相同的调用参数，`locate` 每次修改后重新定位调用
fn remove_argument(file: &mut GoSource, locate: impl Fn(&GoSource) -> Option<usize>, arg: &str) -> bool {
    let mut removed = false;
    while let Some(call) = locate(file) {
        let target = file
            .list(call, ListKind::Arguments)
            .into_iter()
            .find(|&node| file.node_is(node, arg));
        match target {
            Some(node) if file.remove_node(node, ListKind::Arguments, false) => removed = true,
            _ => break,
        }
    }
    removed
}

/// 删除代码块中所有与 `statement` 相同的语句
fn remove_statement(file: &mut GoSource, locate: impl Fn(&GoSource) -> Option<usize>, statement: &str) -> bool {
    let mut removed = false;
    while let Some(block) = locate(file) {
        let target = file
            .list(block, ListKind::Statements)
            .into_iter()
            .find(|&node| file.node_is(node, statement));
        match target {
            Some(node) if file.remove_node(node, ListKind::Statements, false) => removed = true,
            _ => break,
        }
    }
    removed
}

/// 两个路由分组名拼成调用参数
fn router_group_args(left: &str, right: &str) -> String {
    match (left.is_empty(), right.is_empty()) {
        (false, false) => format!("{left}, {right}"),
        (false, true) => left.to_string(),
        (true, false) => right.to_string(),
        (true, true) => String::new(),
    }
}
