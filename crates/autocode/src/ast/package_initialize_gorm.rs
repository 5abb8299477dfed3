use serde::{Deserialize, Serialize};

use super::{add_argument, remove_argument, Ast, GoSource};

const FUNC: &str = "bizModel";
const METHOD: &str = "AutoMigrate";

/// `initialize/gorm_biz.go` 中 AutoMigrate 的模型参数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PackageInitializeGorm {
    pub path: String,
    pub relative_path: String,
    pub import_path: String,
    /// 业务库名称，为空时使用默认库的 AutoMigrate 调用
    pub business: String,
    pub struct_name: String,
    pub package_name: String,
    pub is_new: bool,
}

impl PackageInitializeGorm {
    fn model(&self) -> String {
        format!("{}.{}{{}}", self.package_name, self.struct_name)
    }

    fn locate(&self, file: &GoSource) -> Option<usize> {
        let body = file.find_func(FUNC)?;
        let needle = (!self.business.is_empty()).then_some(self.business.as_str());
        file.find_call(body, METHOD, needle)
    }
}

impl Ast for PackageInitializeGorm {
    fn path(&self) -> &str {
        &self.path
    }

    fn relative_path(&self) -> &str {
        &self.relative_path
    }

    fn inject(&self, file: &mut GoSource) -> bool {
        let Some(call) = self.locate(file) else {
            return false;
        };
        let mut changed = add_argument(file, call, &self.model());
        changed |= file.add_import(&self.import_path);
        changed
    }

    fn rollback(&self, file: &mut GoSource) -> bool {
        let mut changed = remove_argument(file, |f| self.locate(f), &self.model());
        changed |= file.remove_import_if_unused(&self.import_path);
        changed
    }
}
