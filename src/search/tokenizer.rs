//! Query tokenizer - compiles free text into an index match expression / 查询分词器
//!
//! Supports / 支持：
//! - Bare words, any of which may match (OR) / 普通词（或）
//! - "Quoted phrases", all of which must match (AND) / 引号短语（与）
//! - `-word` and `-"phrase"` exclusions / 排除词与排除短语
//!
//! Case folding, diacritic removal and stemming are left to the index
//! tokenizer, which applies them to documents and queries alike.

use once_cell::sync::Lazy;
use regex::Regex;

/// Optionally negated phrase, or bare token / 短语（可排除）或单词
static QUERY_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(-?)"([^"]*)"?|([^\s"]+)"#).expect("query token pattern"));

/// English stop words dropped from bare terms / 英文停用词
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "in", "into", "is",
    "it", "of", "on", "or", "the", "to", "with",
];

/// Parsed text query / 解析后的文本查询
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextQuery {
    /// Alternative terms / 可选词
    pub terms: Vec<String>,
    /// Required phrases / 必须短语
    pub phrases: Vec<String>,
    /// Excluded terms / 排除词
    pub excluded: Vec<String>,
    /// Excluded phrases / 排除短语
    pub excluded_phrases: Vec<String>,
}

impl TextQuery {
    /// Parse raw user input / 解析用户输入
    pub fn parse(query: &str) -> Self {
        let mut parsed = TextQuery::default();

        for caps in QUERY_TOKEN.captures_iter(query) {
            if let Some(phrase) = caps.get(2) {
                let words = split_words(phrase.as_str());
                if words.is_empty() {
                    continue;
                }
                let negated = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
                let target = if negated {
                    &mut parsed.excluded_phrases
                } else {
                    &mut parsed.phrases
                };
                push_unique(target, words.join(" "));
                continue;
            }

            let Some(token) = caps.get(3).map(|m| m.as_str()) else {
                continue;
            };

            if let Some(negated) = token.strip_prefix('-').filter(|t| !t.is_empty()) {
                for word in split_words(negated) {
                    if !is_stop_word(&word) {
                        push_unique(&mut parsed.excluded, word);
                    }
                }
                continue;
            }

            for word in split_words(token) {
                if !is_stop_word(&word) {
                    push_unique(&mut parsed.terms, word);
                }
            }
        }

        parsed
    }

    /// Nothing left that could match / 无可匹配内容
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.phrases.is_empty()
    }

    /// Render as an FTS5 match expression, `None` when nothing can match / 生成 FTS5 表达式
    pub fn to_match_expression(&self) -> Option<String> {
        let terms = self.terms.iter().map(|t| quote(t)).collect::<Vec<_>>().join(" OR ");

        let mut expr = match self.phrases.first() {
            None if terms.is_empty() => return None,
            None => format!("({})", terms),
            Some(first) => {
                let required = self.phrases.iter().map(|p| quote(p)).collect::<Vec<_>>().join(" AND ");
                if terms.is_empty() {
                    format!("({})", required)
                } else {
                    // Bare words only contribute to the score once a phrase is present
                    format!("({} AND ({} OR {}))", required, quote(first), terms)
                }
            }
        };

        for excluded in self.excluded.iter().chain(&self.excluded_phrases) {
            expr = format!("{} NOT {}", expr, quote(excluded));
        }

        Some(expr)
    }
}

/// Split on anything that is not a letter or digit, lower-cased / 按非字母数字切分
pub fn split_words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

/// FTS5 string literal / FTS5 字符串
fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}
