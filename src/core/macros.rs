//! # Macro Expander Module / 宏展开模块
//!
//! Substitutes `$NAME` / `${NAME}` placeholders from variable maps and splits
//! argument text into discrete arguments.
//!
//! 使用变量映射替换 `$NAME` / `${NAME}` 占位符，并将参数文本拆分为独立的参数。
//!
//! Expansion is always done as explicit, ordered passes (environment first,
//! then build variables) rather than through one merged lookup.
//!
//! 展开总是按明确的顺序分多次进行（先环境变量，后构建变量），而不是合并成一次查找。

use std::borrow::Cow;
use std::mem;

use crate::core::models::VarMap;

/// Replaces every placeholder whose name is in `source`. Unknown names are left verbatim.
pub fn expand(text: &str, source: &VarMap) -> String {
    shellexpand::env_with_context_no_errors(text, |name| source.get(name).map(String::as_str))
        .into_owned()
}

/// Runs one [`expand`] pass per source, in order.
pub fn expand_all(text: &str, sources: &[&VarMap]) -> String {
    let mut expanded = Cow::Borrowed(text);
    for source in sources {
        expanded = Cow::Owned(expand(&expanded, source));
    }
    expanded.into_owned()
}

/// Collapses every run of tabs and line breaks into a single space.
pub fn normalize_line_breaks(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    let mut in_break = false;
    for c in text.chars() {
        if matches!(c, '\t' | '\r' | '\n') {
            if !in_break {
                normalized.push(' ');
                in_break = true;
            }
        } else {
            normalized.push(c);
            in_break = false;
        }
    }
    normalized
}

/// Splits on whitespace, honouring one layer of single or double quotes.
///
/// Quotes group characters into one argument and are removed. Backslashes are
/// kept as-is so Windows paths survive untouched. An unterminated quote runs
/// to the end of the input.
///
/// ```
/// use mstest_runner::core::macros::tokenize;
///
/// assert_eq!(
///     tokenize(r#"/detail:owner "C:\Program Files\x.dll""#),
///     vec!["/detail:owner", r"C:\Program Files\x.dll"]
/// );
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_token = false;

    for c in text.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if in_token {
        tokens.push(current);
    }
    tokens
}

/// Splits a newline-delimited field into its trimmed, non-empty lines.
pub fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
}
