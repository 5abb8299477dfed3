use serde::{Deserialize, Serialize};

use super::{add_argument, remove_argument, Ast, GoSource};

const FUNC: &str = "main";
const METHOD: &str = "ApplyBasic";

/// 插件 `gen/main.go` 中 ApplyBasic 的模型参数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PluginGen {
    pub path: String,
    pub relative_path: String,
    pub import_path: String,
    pub package_name: String,
    pub struct_name: String,
}

impl PluginGen {
    fn model(&self) -> String {
        format!("new({}.{})", self.package_name, self.struct_name)
    }

    fn locate(file: &GoSource) -> Option<usize> {
        let body = file.find_func(FUNC)?;
        file.find_call(body, METHOD, None)
    }
}

impl Ast for PluginGen {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_apply_basic() {
        let src = r#"package main

import (
	"github.com/acme/server/plugin/shop/model"
	"gorm.io/gen"
)

func main() {
	g := gen.NewGenerator(gen.Config{OutPath: "../query"})
	g.ApplyBasic(new(model.Order), new(model.Foo))
	g.Execute()
}
"#;
        let gen = PluginGen {
            import_path: r#""github.com/acme/server/plugin/shop/model""#.to_string(),
            package_name: "model".to_string(),
            struct_name: "Foo".to_string(),
            ..Default::default()
        };
        let mut file = GoSource::parse(src).unwrap();
        assert!(gen.rollback(&mut file));
        assert!(file.as_str().contains("g.ApplyBasic(new(model.Order))"));
        assert!(file.has_import("github.com/acme/server/plugin/shop/model"));

        assert!(gen.inject(&mut file));
        assert_eq!(file.as_str(), src);
    }
}
