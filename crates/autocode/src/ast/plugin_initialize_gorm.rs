use serde::{Deserialize, Serialize};

use super::{add_argument, remove_argument, Ast, GoSource};

const FUNC: &str = "Gorm";
const METHOD: &str = "AutoMigrate";

/// 插件 `initialize/gorm.go` 中 AutoMigrate 的模型参数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PluginInitializeGorm {
    pub path: String,
    pub relative_path: String,
    pub import_path: String,
    pub struct_name: String,
    pub package_name: String,
    pub is_new: bool,
}

impl PluginInitializeGorm {
    fn model(&self) -> String {
        format!("new({}.{})", self.package_name, self.struct_name)
    }

    fn locate(file: &GoSource) -> Option<usize> {
        let body = file.find_func(FUNC)?;
        file.find_call(body, METHOD, None)
    }
}

impl Ast for PluginInitializeGorm {
    fn path(&self) -> &str {
        &self.path
    }

    fn relative_path(&self) -> &str {
        &self.relative_path
    }

    fn inject(&self, file: &mut GoSource) -> bool {
        let Some(call) = Self::locate(file) else {
            return false;
        };
        let mut changed = add_argument(file, call, &self.model());
        changed |= file.add_import(&self.import_path);
        changed
    }

    fn rollback(&self, file: &mut GoSource) -> bool {
        let mut changed = remove_argument(file, Self::locate, &self.model());
        changed |= file.remove_import_if_unused(&self.import_path);
        changed
    }
}
