//! Go 源文件的结构化表示
//!
//! 只做注入与回滚需要的那一部分：词法切分、括号配对、按 Go 的自动分号规则
//! 把代码块切成语句/字段/声明，把调用括号切成参数。所有修改都是对原文的
//! 区间替换，未被触及的字节保持原样，修改后会重新解析一遍确保结构依然完整。

use std::ops::Range;

use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("unterminated {what} at byte {offset}")]
    Unterminated { what: &'static str, offset: usize },
    #[error("unbalanced delimiter at byte {offset}")]
    Unbalanced { offset: usize },
    #[error("missing package clause")]
    MissingPackage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Ident,
    Number,
    Str,
    Char,
    Punct,
}

#[derive(Debug, Clone, Copy)]
struct Token {
    kind: TokenKind,
    start: usize,
    end: usize,
}

/// 列表的切分方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// 代码块、结构体字段、分组声明：以换行（自动分号）或 `;` 分隔
    Statements,
    /// 调用参数：以 `,` 分隔
    Arguments,
}

impl ListKind {
    fn separator(self) -> &'static str {
        match self {
            ListKind::Statements => ";",
            ListKind::Arguments => ",",
        }
    }
}

/// 列表中的一个元素，首尾均为 token 下标（闭区间）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    first: usize,
    last: usize,
}

/// 一条 import 说明
#[derive(Debug, Clone)]
pub struct ImportSpec {
    /// 对应的元素；单独声明时覆盖 `import` 关键字
    node: Node,
    /// 所在分组的左括号，单独声明时为 None
    group: Option<usize>,
    pub alias: Option<String>,
    pub path: String,
}

impl ImportSpec {
    /// 代码中引用该包时使用的名字
    pub fn name(&self) -> &str {
        match &self.alias {
            Some(alias) => alias,
            None => self.path.rsplit('/').next().unwrap_or(&self.path),
        }
    }
}

const OPERATORS: [&str; 25] = [
    "<<=", ">>=", "&^=", "...", "&&", "||", "<-", "++", "--", "==", "!=", "<=", ">=", ":=", "+=", "-=", "*=", "/=",
    "%=", "&=", "|=", "^=", "<<", ">>", "&^",
];

const KEYWORDS: [&str; 25] = [
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

#[derive(Debug, Clone)]
pub struct GoSource {
    text: String,
    tokens: Vec<Token>,
    pairs: Vec<Option<usize>>,
}

impl GoSource {
    pub fn parse(text: impl Into<String>) -> Result<Self, SourceError> {
        let text = text.into();
        let tokens = lex(&text)?;
        let pairs = match_pairs(&text, &tokens)?;
        let source = Self { text, tokens, pairs };
        if source.tokens.len() < 2 || !source.is(0, "package") || source.tokens[1].kind != TokenKind::Ident {
            return Err(SourceError::MissingPackage);
        }
        Ok(source)
    }

    pub fn package_name(&self) -> &str {
        self.tok(1)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    fn tok(&self, i: usize) -> &str {
        let t = self.tokens[i];
        &self.text[t.start..t.end]
    }

    fn is(&self, i: usize, s: &str) -> bool {
        i < self.tokens.len() && self.tok(i) == s
    }

    fn pair(&self, i: usize) -> Option<usize> {
        self.pairs.get(i).copied().flatten()
    }

    /// 跳过以 `i` 开头的括号组，返回组内最后一个 token（即右括号）
    fn group_end(&self, i: usize) -> usize {
        match self.pair(i) {
            Some(j) if j > i => j,
            _ => i,
        }
    }

    fn top_level(&self) -> Vec<usize> {
        let mut out = Vec::new();
        let mut i = 0;
        while i < self.tokens.len() {
            out.push(i);
            i = self.group_end(i) + 1;
        }
        out
    }

    fn ends_statement(&self, i: usize) -> bool {
        let text = self.tok(i);
        match self.tokens[i].kind {
            TokenKind::Ident => {
                !KEYWORDS.contains(&text) || matches!(text, "break" | "continue" | "fallthrough" | "return")
            }
            TokenKind::Number | TokenKind::Str | TokenKind::Char => true,
            TokenKind::Punct => matches!(text, ")" | "]" | "}" | "++" | "--"),
        }
    }

    fn newline_between(&self, a: usize, b: usize) -> bool {
        let end = self.tokens[a].end;
        let start = self.tokens.get(b).map_or(self.text.len(), |t| t.start);
        self.text[end..start].contains('\n')
    }

    fn span(&self, node: Node) -> Range<usize> {
        self.tokens[node.first].start..self.tokens[node.last].end
    }

    pub fn node_text(&self, node: Node) -> &str {
        &self.text[self.span(node)]
    }

    /// 切分 `open`（左括号）与其右括号之间的元素
    pub fn list(&self, open: usize, kind: ListKind) -> Vec<Node> {
        let Some(close) = self.pair(open) else {
            return Vec::new();
        };
        let mut nodes = Vec::new();
        let mut start: Option<usize> = None;
        let mut i = open + 1;
        while i < close {
            if self.tok(i) == kind.separator() {
                if let Some(first) = start.take() {
                    nodes.push(Node { first, last: i - 1 });
                }
                i += 1;
                continue;
            }
            let first = *start.get_or_insert(i);
            let last = self.group_end(i);
            if kind == ListKind::Statements && self.ends_statement(last) && self.newline_between(last, last + 1) {
                nodes.push(Node { first, last });
                start = None;
            }
            i = last + 1;
        }
        if let Some(first) = start {
            nodes.push(Node { first, last: close - 1 });
        }
        nodes
    }

    /// 元素的 token 序列是否与 `pattern` 一致（忽略空白与注释）
    pub fn node_is(&self, node: Node, pattern: &str) -> bool {
        self.node_has_prefix(node, pattern, true)
    }

    pub fn node_starts_with(&self, node: Node, pattern: &str) -> bool {
        self.node_has_prefix(node, pattern, false)
    }

    fn node_has_prefix(&self, node: Node, pattern: &str, exact: bool) -> bool {
        let Ok(expected) = lex(pattern) else {
            return false;
        };
        let len = node.last + 1 - node.first;
        if expected.len() > len || (exact && expected.len() != len) {
            return false;
        }
        expected
            .iter()
            .enumerate()
            .all(|(k, t)| self.tok(node.first + k) == &pattern[t.start..t.end])
    }

    /// 元素的第一个 token
    pub fn node_head(&self, node: Node) -> &str {
        self.tok(node.first)
    }

    /// 若元素本身是一个 `{ ... }` 代码块，返回其左括号
    pub fn node_block(&self, node: Node) -> Option<usize> {
        (self.is(node.first, "{") && self.pair(node.first) == Some(node.last)).then_some(node.first)
    }

    fn line_start(&self, pos: usize) -> usize {
        self.text[..pos].rfind('\n').map_or(0, |p| p + 1)
    }

    fn line_end(&self, pos: usize) -> usize {
        self.text[pos..].find('\n').map_or(self.text.len(), |p| pos + p + 1)
    }

    fn indent_at(&self, pos: usize) -> &str {
        let start = self.line_start(pos);
        let line = &self.text[start..];
        let width = line.len() - line.trim_start_matches([' ', '\t']).len();
        &line[..width]
    }

    fn replace(&mut self, range: Range<usize>, with: &str) -> bool {
        let mut text = String::with_capacity(self.text.len() + with.len());
        text.push_str(&self.text[..range.start]);
        text.push_str(with);
        text.push_str(&self.text[range.end..]);
        match GoSource::parse(text) {
            Ok(next) => {
                *self = next;
                true
            }
            Err(e) => {
                warn!("修改后的源码无法解析，已放弃本次修改: {}", e);
                false
            }
        }
    }

    /// 删除列表中的一个元素
    ///
    /// 元素独占整行时删除整行（含行尾注释），否则连同相邻的分隔符一起删除。
    /// `collapse` 为 true 时，删除后若留下连续空行则合并为一行，用于顶层声明。
    pub fn remove_node(&mut self, node: Node, kind: ListKind, collapse: bool) -> bool {
        let sep = kind.separator();
        let start = self.tokens[node.first].start;
        let mut end = self.tokens[node.last].end;
        let has_next_sep = self.is(node.last + 1, sep);
        if has_next_sep {
            end = self.tokens[node.last + 1].end;
        }

        let line_start = self.line_start(start);
        let line_end = self.line_end(end);
        let before = &self.text[line_start..start];
        let after = self.text[end..line_end].trim();
        let own_line = before.trim().is_empty() && (after.is_empty() || after.starts_with("//"));

        let mut range = if own_line {
            line_start..line_end
        } else if has_next_sep {
            let rest = &self.text[end..];
            start..end + (rest.len() - rest.trim_start_matches([' ', '\t']).len())
        } else if node.first > 0 && self.is(node.first - 1, sep) {
            self.tokens[node.first - 1].start..end
        } else {
            start..end
        };

        if own_line && collapse && range.start > 0 {
            let prev_start = self.line_start(range.start - 1);
            let prev_blank = self.text[prev_start..range.start].trim().is_empty();
            let next_line_end = self.line_end(range.end);
            let next_blank = range.end == self.text.len() || self.text[range.end..next_line_end].trim().is_empty();
            if prev_blank && next_blank && prev_start > 0 {
                range = prev_start..range.end;
            }
        }
        self.replace(range, "")
    }

    /// 在列表末尾追加一个元素，`snippet` 可以有多行（相对缩进用 `\t`）
    pub fn insert_into_list(&mut self, open: usize, kind: ListKind, snippet: &str) -> bool {
        let Some(close) = self.pair(open) else {
            return false;
        };
        let nodes = self.list(open, kind);
        let open_tok = self.tokens[open];
        let close_tok = self.tokens[close];
        let close_line = self.line_start(close_tok.start);
        let multi_line = self.text[close_line..close_tok.start].trim().is_empty()
            && self.line_start(open_tok.start) != close_line;

        if multi_line {
            let indent = match nodes.last() {
                Some(last) => self.indent_at(self.tokens[last.first].start).to_string(),
                None => format!("{}\t", self.indent_at(close_tok.start)),
            };
            let trailing = if kind == ListKind::Arguments { "," } else { "" };
            let insertion = indent_lines(snippet, &indent, trailing);
            return self.replace(close_line..close_line, &insertion);
        }

        match nodes.last() {
            None if kind == ListKind::Arguments => self.replace(open_tok.end..open_tok.end, snippet),
            None => {
                let indent = self.indent_at(open_tok.start).to_string();
                let inner = indent_lines(snippet, &format!("{indent}\t"), "");
                self.replace(open_tok.end..close_tok.start, &format!("\n{inner}{indent}"))
            }
            Some(last) => {
                let sep = kind.separator();
                if self.is(last.last + 1, sep) {
                    let pos = self.tokens[last.last + 1].end;
                    self.replace(pos..pos, &format!(" {snippet}"))
                } else {
                    let pos = self.tokens[last.last].end;
                    self.replace(pos..pos, &format!("{sep} {snippet}"))
                }
            }
        }
    }

    pub fn imports(&self) -> Vec<ImportSpec> {
        let mut specs = Vec::new();
        for i in self.top_level() {
            if !self.is(i, "import") {
                continue;
            }
            if self.is(i + 1, "(") {
                for node in self.list(i + 1, ListKind::Statements) {
                    if let Some(spec) = self.import_spec(node, node.first, Some(i + 1)) {
                        specs.push(spec);
                    }
                }
            } else if i + 1 < self.tokens.len() {
                let last = if self.tokens[i + 1].kind == TokenKind::Str { i + 1 } else { i + 2 };
                if last < self.tokens.len() {
                    if let Some(spec) = self.import_spec(Node { first: i, last }, i + 1, None) {
                        specs.push(spec);
                    }
                }
            }
        }
        specs
    }

    fn import_spec(&self, node: Node, spec_first: usize, group: Option<usize>) -> Option<ImportSpec> {
        let path_tok = self.tokens[node.last];
        if path_tok.kind != TokenKind::Str {
            return None;
        }
        let alias = (spec_first < node.last).then(|| self.tok(spec_first).to_string());
        Some(ImportSpec {
            node,
            group,
            alias,
            path: trim_quotes(self.tok(node.last)).to_string(),
        })
    }

    pub fn has_import(&self, path: &str) -> bool {
        let path = trim_quotes(path);
        self.imports().iter().any(|spec| spec.path == path)
    }

    pub fn add_import(&mut self, path: &str) -> bool {
        let path = trim_quotes(path);
        if path.is_empty() || self.has_import(path) {
            return false;
        }
        let quoted = format!("\"{path}\"");
        let group = self
            .top_level()
            .into_iter()
            .find(|&i| self.is(i, "import") && self.is(i + 1, "("))
            .map(|i| i + 1);
        if let Some(open) = group {
            return self.insert_into_list(open, ListKind::Statements, &quoted);
        }
        if let Some(last) = self.imports().last() {
            let pos = self.line_end(self.tokens[last.node.last].end);
            return self.replace(pos..pos, &format!("import {quoted}\n"));
        }
        let pos = self.line_end(self.tokens[1].end);
        let prefix = if self.text[..pos].ends_with('\n') { "" } else { "\n" };
        self.replace(pos..pos, &format!("{prefix}\nimport {quoted}\n"))
    }

    /// 包名不再被引用时删除对应的 import
    pub fn remove_import_if_unused(&mut self, path: &str) -> bool {
        let path = trim_quotes(path);
        let Some(spec) = self.imports().into_iter().find(|spec| spec.path == path) else {
            return false;
        };
        if matches!(spec.name(), "_" | ".") || self.references_package(spec.name()) {
            return false;
        }
        self.remove_node(spec.node, ListKind::Statements, spec.group.is_none())
    }

    /// 是否存在 `name.xxx` 形式的引用
    pub fn references_package(&self, name: &str) -> bool {
        (0..self.tokens.len()).any(|i| {
            self.tokens[i].kind == TokenKind::Ident
                && self.tok(i) == name
                && self.is(i + 1, ".")
                && (i == 0 || !self.is(i - 1, "."))
        })
    }

    /// 查找结构体定义的左花括号，`name` 为 None 时取文件中第一个结构体
    pub fn find_struct(&self, name: Option<&str>) -> Option<usize> {
        let matches = |s: &Self, ident: usize| {
            s.tokens[ident].kind == TokenKind::Ident
                && name.map_or(true, |n| s.tok(ident) == n)
                && s.is(ident + 1, "struct")
                && s.is(ident + 2, "{")
        };
        for i in self.top_level() {
            if !self.is(i, "type") {
                continue;
            }
            if self.is(i + 1, "(") {
                for node in self.list(i + 1, ListKind::Statements) {
                    if matches(self, node.first) {
                        return Some(node.first + 2);
                    }
                }
            } else if matches(self, i + 1) {
                return Some(i + 3);
            }
        }
        None
    }

    fn field_name(&self, node: Node) -> &str {
        if self.is(node.first, "*") && node.first < node.last {
            self.tok(node.first + 1)
        } else {
            self.tok(node.first)
        }
    }

    pub fn has_struct_field(&self, open: usize, field: &str) -> bool {
        self.list(open, ListKind::Statements)
            .into_iter()
            .any(|node| self.field_name(node) == field)
    }

    pub fn add_struct_field(&mut self, open: usize, field_name: &str, field: &str) -> bool {
        if self.has_struct_field(open, field_name) {
            return false;
        }
        self.insert_into_list(open, ListKind::Statements, field)
    }

    /// 删除结构体中名为 `field_name` 的字段（含嵌入字段）
    pub fn remove_struct_field(&mut self, struct_name: Option<&str>, field_name: &str) -> bool {
        let mut removed = false;
        while let Some(open) = self.find_struct(struct_name) {
            let target = self
                .list(open, ListKind::Statements)
                .into_iter()
                .find(|&node| self.field_name(node) == field_name);
            match target {
                Some(node) if self.remove_node(node, ListKind::Statements, false) => removed = true,
                _ => break,
            }
        }
        removed
    }

    fn var_group(&self) -> Option<usize> {
        self.top_level()
            .into_iter()
            .find(|&i| self.is(i, "var") && self.is(i + 1, "("))
            .map(|i| i + 1)
    }

    /// 顶层单独声明的 `var name ...`，返回整条声明
    fn single_var(&self, name: &str) -> Option<Node> {
        let top = self.top_level();
        for (k, &i) in top.iter().enumerate() {
            if !(self.is(i, "var") && self.is(i + 1, name)) {
                continue;
            }
            let mut last = i + 1;
            for &j in &top[k + 1..] {
                last = self.group_end(j);
                if self.ends_statement(last) && self.newline_between(last, last + 1) {
                    break;
                }
            }
            return Some(Node { first: i, last });
        }
        None
    }

    pub fn has_var(&self, name: &str) -> bool {
        let grouped = self.var_group().is_some_and(|open| {
            self.list(open, ListKind::Statements)
                .into_iter()
                .any(|node| self.node_head(node) == name)
        });
        grouped || self.single_var(name).is_some()
    }

    pub fn add_var(&mut self, name: &str, expr: &str) -> bool {
        if self.has_var(name) {
            return false;
        }
        let spec = format!("{name} = {expr}");
        if let Some(open) = self.var_group() {
            return self.insert_into_list(open, ListKind::Statements, &spec);
        }
        let pos = self.text.len();
        let prefix = if self.text.ends_with('\n') { "" } else { "\n" };
        self.replace(pos..pos, &format!("{prefix}\nvar {spec}\n"))
    }

    pub fn remove_var(&mut self, name: &str) -> bool {
        if let Some(open) = self.var_group() {
            let target = self
                .list(open, ListKind::Statements)
                .into_iter()
                .find(|&node| self.node_head(node) == name && !self.is(node.first + 1, "."));
            if let Some(node) = target {
                return self.remove_node(node, ListKind::Statements, false);
            }
        }
        match self.single_var(name) {
            Some(node) => self.remove_node(node, ListKind::Statements, true),
            None => false,
        }
    }

    /// 顶层函数 `name` 的函数体左花括号
    pub fn find_func(&self, name: &str) -> Option<usize> {
        for i in self.top_level() {
            if !(self.is(i, "func") && self.is(i + 1, name) && self.is(i + 2, "(")) {
                continue;
            }
            let mut j = self.group_end(i + 2) + 1;
            while j < self.tokens.len() {
                match self.tok(j) {
                    "{" => return Some(j),
                    "(" | "[" => j = self.group_end(j) + 1,
                    _ => j += 1,
                }
            }
        }
        None
    }

    /// 在代码块 `scope` 内查找 `<receiver>.method(` 调用，返回参数左括号
    ///
    /// `needle` 为 Some 时要求接收者表达式中含有该字符串字面量，
    /// 为 None 时只接受接收者中没有字符串字面量的调用。
    pub fn find_call(&self, scope: usize, method: &str, needle: Option<&str>) -> Option<usize> {
        let close = self.pair(scope)?;
        (scope + 1..close).find_map(|i| {
            let is_call = self.tokens[i].kind == TokenKind::Ident
                && self.tok(i) == method
                && self.is(i - 1, ".")
                && self.is(i + 1, "(");
            if !is_call {
                return None;
            }
            let receiver = self.receiver_start(i)..i;
            let mut literals = receiver
                .filter(|&k| self.tokens[k].kind == TokenKind::Str)
                .map(|k| trim_quotes(self.tok(k)));
            let accepted = match needle {
                Some(needle) => literals.any(|lit| lit == needle),
                None => literals.next().is_none(),
            };
            accepted.then_some(i + 1)
        })
    }

    fn receiver_start(&self, method: usize) -> usize {
        let mut j = method;
        while j > 0 {
            let prev = j - 1;
            let kind = self.tokens[prev].kind;
            match self.tok(prev) {
                "." => j = prev,
                ")" | "]" => match self.pair(prev) {
                    Some(open) => j = open,
                    None => break,
                },
                _ if kind == TokenKind::Ident && !KEYWORDS.contains(&self.tok(prev)) => {
                    if prev > 0 && self.is(prev - 1, ".") {
                        j = prev;
                    } else {
                        return prev;
                    }
                }
                _ => break,
            }
        }
        j
    }
}

fn indent_lines(snippet: &str, indent: &str, trailing: &str) -> String {
    let lines: Vec<&str> = snippet.lines().collect();
    let mut out = String::new();
    for (idx, line) in lines.iter().enumerate() {
        out.push_str(indent);
        out.push_str(line);
        if idx + 1 == lines.len() {
            out.push_str(trailing);
        }
        out.push('\n');
    }
    out
}

pub fn trim_quotes(s: &str) -> &str {
    s.trim().trim_matches(|c| c == '"' || c == '`')
}

fn lex(text: &str) -> Result<Vec<Token>, SourceError> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        let start = i;
        match b {
            b' ' | b'\t' | b'\r' | b'\n' => i += 1,
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let len = text[i + 2..].find("*/").ok_or(SourceError::Unterminated {
                    what: "comment",
                    offset: start,
                })?;
                i += len + 4;
            }
            b'"' | b'\'' => {
                i += 1;
                loop {
                    match bytes.get(i) {
                        None | Some(b'\n') => {
                            return Err(SourceError::Unterminated {
                                what: "literal",
                                offset: start,
                            })
                        }
                        Some(b'\\') => i += 2,
                        Some(&c) if c == b => {
                            i += 1;
                            break;
                        }
                        Some(_) => i += 1,
                    }
                }
                let kind = if b == b'"' { TokenKind::Str } else { TokenKind::Char };
                tokens.push(Token { kind, start, end: i });
            }
            b'`' => {
                let len = text[i + 1..].find('`').ok_or(SourceError::Unterminated {
                    what: "raw string",
                    offset: start,
                })?;
                i += len + 2;
                tokens.push(Token {
                    kind: TokenKind::Str,
                    start,
                    end: i,
                });
            }
            b'0'..=b'9' => {
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || matches!(bytes[i], b'.' | b'_')) {
                    i += 1;
                }
                tokens.push(Token {
                    kind: TokenKind::Number,
                    start,
                    end: i,
                });
            }
            c if c == b'_' || c.is_ascii_alphabetic() || c >= 0x80 => {
                while i < bytes.len() && (bytes[i] == b'_' || bytes[i].is_ascii_alphanumeric() || bytes[i] >= 0x80) {
                    i += 1;
                }
                tokens.push(Token {
                    kind: TokenKind::Ident,
                    start,
                    end: i,
                });
            }
            _ => {
                let rest = &text[i..];
                i += OPERATORS
                    .iter()
                    .find(|op| rest.starts_with(**op))
                    .map_or(1, |op| op.len());
                tokens.push(Token {
                    kind: TokenKind::Punct,
                    start,
                    end: i,
                });
            }
        }
    }
    Ok(tokens)
}

fn match_pairs(text: &str, tokens: &[Token]) -> Result<Vec<Option<usize>>, SourceError> {
    let mut pairs = vec![None; tokens.len()];
    let mut stack: Vec<usize> = Vec::new();
    for (idx, t) in tokens.iter().enumerate() {
        if t.kind != TokenKind::Punct {
            continue;
        }
        let expected_open = match &text[t.start..t.end] {
            "(" | "[" | "{" => {
                stack.push(idx);
                continue;
            }
            ")" => "(",
            "]" => "[",
            "}" => "{",
            _ => continue,
        };
        let open = stack.pop().ok_or(SourceError::Unbalanced { offset: t.start })?;
        let o = tokens[open];
        if &text[o.start..o.end] != expected_open {
            return Err(SourceError::Unbalanced { offset: t.start });
        }
        pairs[open] = Some(idx);
        pairs[idx] = Some(open);
    }
    match stack.last() {
        Some(&open) => Err(SourceError::Unbalanced {
            offset: tokens[open].start,
        }),
        None => Ok(pairs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTER: &str = r#"package v1

import (
	"github.com/acme/server/api/v1/example"
	"github.com/acme/server/api/v1/system"
)

var ApiGroupApp = new(ApiGroup)

type ApiGroup struct {
	SystemApiGroup  system.ApiGroup
	ExampleApiGroup example.ApiGroup
}
"#;

    #[test]
    fn test_parse_rejects_broken_source() {
        assert_eq!(
            GoSource::parse("package x\nfunc a() {\n").unwrap_err(),
            SourceError::Unbalanced { offset: 19 }
        );
        assert!(matches!(
            GoSource::parse("package x\nvar s = \"abc\n"),
            Err(SourceError::Unterminated { .. })
        ));
        assert_eq!(GoSource::parse("func a() {}").unwrap_err(), SourceError::MissingPackage);
    }

    #[test]
    fn test_comments_and_strings_do_not_confuse_braces() {
        let src = "package x\n\n// {\nvar s = \"}\" /* ( */\nvar r = `\n{`\n";
        let file = GoSource::parse(src).unwrap();
        assert_eq!(file.package_name(), "x");
        assert!(file.has_var("s"));
        assert!(file.has_var("r"));
    }

    #[test]
    fn test_imports_and_references() {
        let file = GoSource::parse(ENTER).unwrap();
        let imports = file.imports();
        assert_eq!(imports.len(), 2);
        assert_eq!(imports[0].name(), "example");
        assert!(file.references_package("system"));
        assert!(!file.references_package("ApiGroup"));
    }

    #[test]
    fn test_struct_field_insert_then_remove_restores_bytes() {
        let mut file = GoSource::parse(ENTER).unwrap();
        let open = file.find_struct(Some("ApiGroup")).unwrap();
        assert!(file.add_struct_field(open, "FooApiGroup", "FooApiGroup foo.ApiGroup"));
        assert!(file.as_str().contains("\tFooApiGroup foo.ApiGroup\n}"));
        let open = file.find_struct(Some("ApiGroup")).unwrap();
        assert!(!file.add_struct_field(open, "FooApiGroup", "FooApiGroup foo.ApiGroup"));
        assert!(file.remove_struct_field(Some("ApiGroup"), "FooApiGroup"));
        assert_eq!(file.as_str(), ENTER);
        assert!(!file.remove_struct_field(Some("ApiGroup"), "FooApiGroup"));
    }

    #[test]
    fn test_import_added_to_source_without_imports_is_removed_cleanly() {
        let src = "package initialize\n\nfunc a() {}\n";
        let mut file = GoSource::parse(src).unwrap();
        assert!(file.add_import("github.com/acme/foo"));
        assert_eq!(file.as_str(), "package initialize\n\nimport \"github.com/acme/foo\"\n\nfunc a() {}\n");
        assert!(file.remove_import_if_unused("\"github.com/acme/foo\""));
        assert_eq!(file.as_str(), src);
    }

    #[test]
    fn test_inline_arguments() {
        let src = "package x\n\nfunc m() {\n\tdb.AutoMigrate(a.A{}, b.B{})\n}\n";
        let mut file = GoSource::parse(src).unwrap();
        let body = file.find_func("m").unwrap();
        let call = file.find_call(body, "AutoMigrate", None).unwrap();
        assert!(file.insert_into_list(call, ListKind::Arguments, "c.C{}"));
        assert!(file.as_str().contains("db.AutoMigrate(a.A{}, b.B{}, c.C{})"));

        let body = file.find_func("m").unwrap();
        let call = file.find_call(body, "AutoMigrate", None).unwrap();
        let middle = file.list(call, ListKind::Arguments)[1];
        assert!(file.node_is(middle, "b . B { }"));
        assert!(file.remove_node(middle, ListKind::Arguments, false));
        assert!(file.as_str().contains("db.AutoMigrate(a.A{}, c.C{})"));

        let body = file.find_func("m").unwrap();
        let call = file.find_call(body, "AutoMigrate", None).unwrap();
        let last = file.list(call, ListKind::Arguments)[1];
        assert!(file.remove_node(last, ListKind::Arguments, false));
        assert!(file.as_str().contains("db.AutoMigrate(a.A{})"));
    }

    #[test]
    fn test_find_call_by_receiver_literal() {
        let src = r#"package x

func m() {
	global.DB.AutoMigrate(a.A{})
	global.MustGetGlobalDBByDBName("biz").AutoMigrate(b.B{})
}
"#;
        let file = GoSource::parse(src).unwrap();
        let body = file.find_func("m").unwrap();
        let plain = file.find_call(body, "AutoMigrate", None).unwrap();
        let biz = file.find_call(body, "AutoMigrate", Some("biz")).unwrap();
        assert_ne!(plain, biz);
        assert!(file.node_is(file.list(biz, ListKind::Arguments)[0], "b.B{}"));
        assert!(file.find_call(body, "AutoMigrate", Some("other")).is_none());
    }

    #[test]
    fn test_statements_follow_automatic_semicolons() {
        let src = "package x\n\nfunc m() {\n\ta := b.\n\t\tC\n\tif a {\n\t\treturn\n\t}\n\tf(1,\n\t\t2)\n}\n";
        let file = GoSource::parse(src).unwrap();
        let body = file.find_func("m").unwrap();
        let stmts = file.list(body, ListKind::Statements);
        assert_eq!(stmts.len(), 3);
        assert!(file.node_is(stmts[0], "a := b.C"));
        assert!(file.node_starts_with(stmts[1], "if a"));
        assert!(file.node_is(stmts[2], "f(1, 2)"));
    }
}
