use serde::{Deserialize, Serialize};

use super::{Ast, GoSource};

/// 包级入口：在 `api/v1/enter.go` 等文件的分组结构体中登记子包的分组
///
/// ```go
/// type ApiGroup struct {
///     ExampleApiGroup example.ApiGroup
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PackageEnter {
    pub path: String,
    pub relative_path: String,
    pub import_path: String,
    /// 子包中的分组结构体，例如 `ApiGroup`
    pub struct_name: String,
    pub package_name: String,
    /// 分组结构体中的字段名，例如 `ExampleApiGroup`
    pub package_struct_name: String,
}

impl PackageEnter {
    fn field(&self) -> String {
        format!("{} {}.{}", self.package_struct_name, self.package_name, self.struct_name)
    }
}

impl Ast for PackageEnter {
    fn path(&self) -> &str {
        &self.path
    }

    fn relative_path(&self) -> &str {
        &self.relative_path
    }

    fn inject(&self, file: &mut GoSource) -> bool {
        if self.package_struct_name.is_empty() {
            return false;
        }
        let Some(open) = file.find_struct(None) else {
            return false;
        };
        let mut changed = file.add_struct_field(open, &self.package_struct_name, &self.field());
        changed |= file.add_import(&self.import_path);
        changed
    }

    fn rollback(&self, file: &mut GoSource) -> bool {
        if self.package_struct_name.is_empty() {
            return false;
        }
        let mut changed = file.remove_struct_field(None, &self.package_struct_name);
        changed |= file.remove_import_if_unused(&self.import_path);
        changed
    }
}
