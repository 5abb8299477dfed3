//! 生成文件路径的归一化
//!
//! 历史记录中的模板映射来自不同版本的生成器：键可能带有后端目录前缀，
//! 值可能是相对后端/前端根目录的路径，也可能是生成时（另一个根目录下）的绝对路径。
//! 这里统一换算成当前根目录下的绝对路径，已经正确的输入原样返回。

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::{path_segments as segments, AutoCodeConfig};

/// 按扩展名区分的文件归属
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Server,
    Web,
    Unknown,
}

impl ArtifactKind {
    pub fn of(raw: &str) -> Self {
        let ext = raw.rsplit_once('.').map(|(_, ext)| ext).unwrap_or_default();
        match ext {
            "go" => ArtifactKind::Server,
            "vue" | "js" | "ts" => ArtifactKind::Web,
            _ => ArtifactKind::Unknown,
        }
    }
}

/// 绝对路径（包括在其他平台上生成的 Windows 路径）
fn is_absolute_like(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    Path::new(raw).is_absolute()
        || raw.starts_with(['/', '\\'])
        || (bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':')
}

/// `marker` 第一次出现之后的部分
fn after_marker<'a>(segments: &[&'a str], marker: &[&str]) -> Option<Vec<&'a str>> {
    if marker.is_empty() || segments.len() <= marker.len() {
        return None;
    }
    (0..=segments.len() - marker.len())
        .find(|&i| segments[i..i + marker.len()] == *marker)
        .map(|i| segments[i + marker.len()..].to_vec())
}

fn strip_leading<'a>(segments: &[&'a str], marker: &[&str]) -> Vec<&'a str> {
    if !marker.is_empty() && segments.starts_with(marker) {
        segments[marker.len()..].to_vec()
    } else {
        segments.to_vec()
    }
}

/// 把旧根目录下的绝对路径换算到当前根目录下
///
/// 已在当前根目录下的路径原样返回；找不到前端或后端目录标记时返回 None。
pub fn reanchor_absolute(config: &AutoCodeConfig, path: &Path) -> Option<PathBuf> {
    if config.relative(path).is_some() {
        return Some(path.to_path_buf());
    }
    let raw = path.to_string_lossy();
    let all = segments(&raw);
    let web = segments(&config.web);
    if let Some(rest) = after_marker(&all, &web) {
        return Some(config.web_root().join(rest.iter().collect::<PathBuf>()));
    }
    let server = segments(&config.server);
    after_marker(&all, &server).map(|rest| config.server_root().join(rest.iter().collect::<PathBuf>()))
}

/// 模板映射的键：去掉后端根目录前缀，相对后端根目录、以 `/` 分隔
pub fn normalize_key(config: &AutoCodeConfig, key: &str) -> String {
    let all = segments(key);
    let server_root = config.server_root();
    let server_root = server_root.to_string_lossy();
    let all = strip_leading(&all, &segments(&server_root));
    strip_leading(&all, &segments(&config.server)).join("/")
}

/// 去掉盘符与开头的分隔符，得到相对路径
fn relative_form(raw: &str) -> PathBuf {
    let all = segments(raw);
    let skip = usize::from(all.first().is_some_and(|first| first.ends_with(':')));
    PathBuf::from(all[skip..].join("/"))
}

/// 模板映射的值：后端/前端文件换算为当前根目录下的绝对路径，其他文件一律转为相对路径，不参与移动
pub fn resolve_value(config: &AutoCodeConfig, raw: &str) -> PathBuf {
    let (marker, base) = match ArtifactKind::of(raw) {
        ArtifactKind::Server => (config.server.as_str(), config.server_root()),
        ArtifactKind::Web => (config.web.as_str(), config.web_root()),
        ArtifactKind::Unknown => return relative_form(raw),
    };
    let marker = segments(marker);
    let all = segments(raw);

    if is_absolute_like(raw) {
        let path = Path::new(raw);
        if path.is_absolute() && config.relative(path).is_some() {
            return path.to_path_buf();
        }
        return match after_marker(&all, &marker) {
            Some(rest) => base.join(rest.iter().collect::<PathBuf>()),
            None => path.to_path_buf(),
        };
    }
    base.join(strip_leading(&all, &marker).iter().collect::<PathBuf>())
}

/// 归一化整个模板映射
pub fn resolve_templates(config: &AutoCodeConfig, templates: &BTreeMap<String, String>) -> BTreeMap<String, PathBuf> {
    templates
        .iter()
        .map(|(key, value)| (normalize_key(config, key), resolve_value(config, value)))
        .collect()
}
