use std::path::PathBuf;

use sea_orm::DbErr;
use thiserror::Error;

/// 回滚及历史记录操作的错误
///
/// 致命错误会立即中止回滚并携带足够的上下文（路径、id）供人工处理；
/// 非致命的情况（注入目标缺失、API 已不存在、语言包缺少键）只记录日志，不会出现在这里。
#[derive(Error, Debug)]
pub enum AutoCodeError {
    #[error("history record not found, id: {0}")]
    NotFound(i32),
    #[error("[path:{path}] parse failed: {reason}")]
    Parse { path: PathBuf, reason: String },
    #[error("[path:{path}] write failed: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("[src:{src}][dst:{dst}] move failed: {source}")]
    Move {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{what} failed: {source}")]
    Registration {
        what: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("update history flag failed: {0}")]
    LedgerUpdate(#[source] DbErr),
    #[error("[path:{path}] io error: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl AutoCodeError {
    pub fn registration(what: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Registration {
            what: what.into(),
            source: source.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = AutoCodeError> = std::result::Result<T, E>;
