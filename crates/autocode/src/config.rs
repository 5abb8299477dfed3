//! 代码生成器的项目布局配置
//!
//! 历史记录里保存的路径只在生成时有效，项目可能已经整体搬迁，
//! 回滚时一律以这里的“当前”根目录为准重新定位。

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// 未配置根目录时使用进程工作目录
pub static DEFAULT_ROOT: Lazy<PathBuf> =
    Lazy::new(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

/// 回收站目录名，位于项目根目录下
pub const TRASH_DIR: &str = "rm_file";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AutoCodeConfig {
    /// 项目根目录
    pub root: PathBuf,
    /// 后端源码相对根目录的子路径
    pub server: String,
    /// 前端源码相对根目录的子路径
    pub web: String,
}

impl Default for AutoCodeConfig {
    fn default() -> Self {
        Self {
            root: DEFAULT_ROOT.clone(),
            server: "server".to_string(),
            web: "web/src".to_string(),
        }
    }
}

impl AutoCodeConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// 后端源码根目录，例如 `<root>/server`
    pub fn server_root(&self) -> PathBuf {
        self.root.join(split_segments(&self.server))
    }

    /// 前端源码根目录，例如 `<root>/web/src`
    pub fn web_root(&self) -> PathBuf {
        self.root.join(split_segments(&self.web))
    }

    /// 本次回滚使用的回收站目录 `<root>/rm_file/<timestamp>`
    pub fn trash_root(&self, timestamp: &str) -> PathBuf {
        self.root.join(TRASH_DIR).join(timestamp)
    }

    /// 后端多语言目录
    pub fn server_lang_dir(&self) -> PathBuf {
        self.server_root().join("resource").join("lang")
    }

    /// 前端多语言目录
    pub fn web_locales_dir(&self) -> PathBuf {
        self.web_root().join("locales")
    }

    /// 以当前根目录解析注入描述中记录的相对路径
    pub fn absolute(&self, relative: &str) -> PathBuf {
        self.root.join(split_segments(relative))
    }

    /// 路径相对根目录的部分，不在根目录下时返回 None
    pub fn relative<'a>(&self, path: &'a Path) -> Option<&'a Path> {
        path.strip_prefix(&self.root).ok()
    }
}

/// 按 `/` 与 `\` 切分配置或历史记录中的路径，忽略空段与 `.`
pub fn path_segments(raw: &str) -> Vec<&str> {
    raw.split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect()
}

/// 切分后用当前平台的分隔符拼接
pub fn split_segments(raw: &str) -> PathBuf {
    path_segments(raw).into_iter().collect()
}
