use serde::{Deserialize, Serialize};

use super::{Ast, GoSource};

/// 插件入口：`api/enter.go`、`router/enter.go`、`service/enter.go`
///
/// ```go
/// var (
///     Api         = new(api)
///     serviceInfo = service.Service.Info
/// )
///
/// type api struct{ Info info }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PluginEnter {
    pub path: String,
    pub relative_path: String,
    pub import_path: String,
    /// 字段名，例如 `Info`
    pub struct_name: String,
    /// 字段类型，为空时按嵌入字段处理
    pub struct_camel_name: String,
    /// 包级变量名，service 入口没有这一项
    pub module_name: String,
    pub group_name: String,
    pub package_name: String,
    pub service_name: String,
}

impl PluginEnter {
    fn field(&self) -> String {
        if self.struct_camel_name.is_empty() {
            self.struct_name.clone()
        } else {
            format!("{} {}", self.struct_name, self.struct_camel_name)
        }
    }

    fn service_expr(&self) -> String {
        format!("{}.{}.{}", self.package_name, self.group_name, self.service_name)
    }
}

impl Ast for PluginEnter {
    fn path(&self) -> &str {
        &self.path
    }

    fn relative_path(&self) -> &str {
        &self.relative_path
    }

    fn inject(&self, file: &mut GoSource) -> bool {
        if self.struct_name.is_empty() {
            return false;
        }
        let Some(open) = file.find_struct(None) else {
            return false;
        };
        let mut changed = file.add_struct_field(open, &self.struct_name, &self.field());
        if !self.module_name.is_empty() {
            changed |= file.add_var(&self.module_name, &self.service_expr());
            changed |= file.add_import(&self.import_path);
        }
        changed
    }

    fn rollback(&self, file: &mut GoSource) -> bool {
        let mut changed = false;
        if !self.struct_name.is_empty() {
            changed |= file.remove_struct_field(None, &self.struct_name);
        }
        if !self.module_name.is_empty() {
            changed |= file.remove_var(&self.module_name);
            changed |= file.remove_import_if_unused(&self.import_path);
        }
        changed
    }
}
