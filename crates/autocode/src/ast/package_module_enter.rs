use serde::{Deserialize, Serialize};

use super::{Ast, GoSource};

/// 模块级入口：在子包的分组结构体中嵌入新实体的结构体，
/// 并按需声明一个指向服务实例的包级变量
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PackageModuleEnter {
    pub path: String,
    pub relative_path: String,
    pub import_path: String,
    /// 嵌入的结构体，例如 `CustomerApi`
    pub struct_name: String,
    pub app_name: String,
    pub group_name: String,
    /// 包级变量名，service 入口没有这一项
    pub module_name: String,
    pub package_name: String,
    pub service_name: String,
}

impl PackageModuleEnter {
    fn service_expr(&self) -> String {
        format!(
            "{}.{}.{}.{}",
            self.package_name, self.app_name, self.group_name, self.service_name
        )
    }
}

impl Ast for PackageModuleEnter {
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
        let mut changed = file.add_struct_field(open, &self.struct_name, &self.struct_name);
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
