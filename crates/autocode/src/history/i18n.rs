//! 多语言文件清理
//!
//! 语言包是按语言拆分的 JSON 文件，键以 `.` 表示嵌套层级，
//! 例如 `system.menu.exampleCustomer` 对应 `{"system":{"menu":{"exampleCustomer":..}}}`。

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Serializer, Value};
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{AutoCodeError, Result};

const API_ACTIONS: [&str; 6] = ["add", "delete", "batch", "update", "find", "list"];

/// 后端菜单名称
pub fn menu_keys(package: &str, struct_name: &str) -> Vec<String> {
    vec![format!("system.menu.{package}{struct_name}")]
}

/// 后端 API 分组名与六个接口描述
pub fn api_keys(package: &str, struct_name: &str) -> Vec<String> {
    std::iter::once(format!("system.api.group.{package}{struct_name}"))
        .chain(
            API_ACTIONS
                .iter()
                .map(|action| format!("system.api.desc.{action}{package}{struct_name}")),
        )
        .collect()
}

/// 前端页面文案
pub fn web_keys(package: &str, struct_name: &str) -> Vec<String> {
    vec![format!("{package}.{struct_name}")]
}

/// 递归列出目录下所有 `.json` 文件，目录不存在时返回空列表
pub async fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let mut entries = match fs::read_dir(&current).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound && current == dir => {
                debug!("语言包目录不存在: {}", dir.display());
                return Ok(files);
            }
            Err(e) => return Err(AutoCodeError::io(current, e)),
        };
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AutoCodeError::io(&current, e))?
        {
            let path = entry.path();
            let file_type = entry.file_type().await.map_err(|e| AutoCodeError::io(&path, e))?;
            if file_type.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

/// 删除 `.` 分隔的嵌套键，返回是否删除了内容
fn remove_key(value: &mut Value, key: &str) -> bool {
    let Some((parents, leaf)) = key.rsplit_once('.') else {
        return value.as_object_mut().is_some_and(|map| map.shift_remove(key).is_some());
    };
    let mut current = value;
    for segment in parents.split('.') {
        match current.get_mut(segment) {
            Some(next) => current = next,
            None => return false,
        }
    }
    current
        .as_object_mut()
        .is_some_and(|map| map.shift_remove(leaf).is_some())
}

/// 沿用文件原有的缩进，取第一行带缩进的内容，没有时使用两个空格
fn detect_indent(raw: &str) -> String {
    raw.lines()
        .map(|line| &line[..line.len() - line.trim_start_matches([' ', '\t']).len()])
        .find(|indent| !indent.is_empty())
        .unwrap_or("  ")
        .to_string()
}

fn to_string_indented(value: &Value, indent: &str) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = Serializer::with_formatter(&mut output, formatter);
    value.serialize(&mut serializer)?;
    Ok(output)
}

/// 从每个文件中删除 `keys`，只回写发生变化的文件，返回回写的文件数
pub async fn prune(files: &[PathBuf], keys: &[String]) -> Result<usize> {
    if keys.is_empty() {
        return Ok(0);
    }
    let mut rewritten = 0;
    for file in files {
        let raw = fs::read_to_string(file)
            .await
            .map_err(|e| AutoCodeError::io(file, e))?;
        let mut value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("语言包 {} 不是合法的 JSON，跳过: {}", file.display(), e);
                continue;
            }
        };
        let mut changed = false;
        for key in keys {
            changed |= remove_key(&mut value, key);
        }
        if !changed {
            continue;
        }
        let mut output = to_string_indented(&value, &detect_indent(&raw))?;
        if raw.ends_with('\n') {
            output.push(b'\n');
        }
        fs::write(file, output).await.map_err(|source| AutoCodeError::Write {
            path: file.clone(),
            source,
        })?;
        debug!("已清理语言包: {}", file.display());
        rewritten += 1;
    }
    Ok(rewritten)
}
