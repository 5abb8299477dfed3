use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};

use crate::config::AutoCodeConfig;
use crate::error::{AutoCodeError, Result};

/// 把生成的文件移动到 `<root>/rm_file/<timestamp>/` 下，保留相对根目录的路径
///
/// 非绝对路径、不在根目录下的路径以及已经不存在的文件会被跳过；
/// 任意一次移动失败都会立即返回。返回实际移动后的目标路径。
pub async fn quarantine<'a>(
    config: &AutoCodeConfig,
    files: impl IntoIterator<Item = &'a PathBuf>,
    timestamp: &str,
) -> Result<Vec<PathBuf>> {
    let trash = config.trash_root(timestamp);
    let mut moved = Vec::new();
    for src in files {
        if !src.is_absolute() {
            debug!("跳过未生成到磁盘的模板: {}", src.display());
            continue;
        }
        let Some(relative) = config.relative(src) else {
            warn!("文件不在项目根目录下，跳过: {}", src.display());
            continue;
        };
        match fs::try_exists(src).await {
            Ok(true) => {}
            Ok(false) => {
                debug!("文件已不存在，跳过: {}", src.display());
                continue;
            }
            Err(e) => return Err(AutoCodeError::io(src, e)),
        }
        let dst = trash.join(relative);
        move_file(src, &dst).await?;
        debug!("已移动 {} -> {}", src.display(), dst.display());
        moved.push(dst);
    }
    Ok(moved)
}

fn move_error(src: &Path, dst: &Path, source: std::io::Error) -> AutoCodeError {
    AutoCodeError::Move {
        src: src.to_path_buf(),
        dst: dst.to_path_buf(),
        source,
    }
}

/// 先尝试 rename，跨文件系统失败时退化为复制后删除源文件
async fn move_file(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| move_error(src, dst, e))?;
    }
    if let Err(e) = fs::rename(src, dst).await {
        debug!("rename 失败（{}），改为复制: {}", e, src.display());
        copy_then_remove(src, dst).await?;
    }
    Ok(())
}

async fn copy_then_remove(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst).await.map_err(|e| move_error(src, dst, e))?;
    fs::remove_file(src).await.map_err(|e| move_error(src, dst, e))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[tokio::test]
    async fn test_quarantine_preserves_relative_structure() {
        let dir = tempfile::tempdir().unwrap();
        let config = AutoCodeConfig::new(dir.path());
        let api = config.server_root().join("api").join("foo.go");
        let view = config.web_root().join("view").join("foo.vue");
        for file in [&api, &view] {
            std::fs::create_dir_all(file.parent().unwrap()).unwrap();
            std::fs::write(file, "content").unwrap();
        }
        let missing = config.server_root().join("model").join("gone.go");
        let relative = PathBuf::from("readme.md");
        let outside = PathBuf::from("/definitely/not/under/root.go");

        let moved = quarantine(&config, [&api, &view, &missing, &relative, &outside], "1700000000")
            .await
            .unwrap();

        let trash = config.trash_root("1700000000");
        assert_eq!(
            moved,
            vec![
                trash.join("server").join("api").join("foo.go"),
                trash.join("web").join("src").join("view").join("foo.vue"),
            ]
        );
        assert!(!api.exists());
        assert!(!view.exists());
        assert_eq!(std::fs::read_to_string(&moved[0]).unwrap(), "content");
    }

    #[tokio::test]
    async fn test_copy_fallback_moves_content() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("server").join("api").join("foo.go");
        let dst = dir.path().join("rm_file").join("1").join("foo.go");
        std::fs::create_dir_all(src.parent().unwrap()).unwrap();
        std::fs::create_dir_all(dst.parent().unwrap()).unwrap();
        std::fs::write(&src, "package api\n").unwrap();

        copy_then_remove(&src, &dst).await.unwrap();
        assert!(!src.exists());
        assert_eq!(std::fs::read_to_string(&dst).unwrap(), "package api\n");

        assert_matches!(
            copy_then_remove(&src, &dst).await,
            Err(AutoCodeError::Move { .. })
        );
    }

    #[tokio::test]
    async fn test_unreadable_source_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let config = AutoCodeConfig::new(dir.path());
        let blocker = config.server_root().join("api.go");
        std::fs::create_dir_all(blocker.parent().unwrap()).unwrap();
        std::fs::write(&blocker, "package api\n").unwrap();
        // 上级路径是普通文件，无法判断目标是否存在
        let src = blocker.join("foo.go");

        assert_matches!(
            quarantine(&config, [&src], "1700000000").await,
            Err(AutoCodeError::Io { .. })
        );
        assert!(blocker.exists());
    }
}
