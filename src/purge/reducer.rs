//! Unused CSS rule elimination.
//!
//! [`CssReducer`] is the seam the rewrite pipeline calls into. The default
//! [`LightningReducer`] parses the stylesheet with `lightningcss`, matches
//! every style rule's selectors against the body with `scraper`, drops rules
//! nothing matches, and prints the rest (minified or pretty).

use std::sync::LazyLock;

use lightningcss::rules::CssRule;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::traits::ToCss;
use regex::Regex;
use scraper::{Html, Selector};
use thiserror::Error;

/// Errors raised while reducing a stylesheet.
#[derive(Debug, Error)]
pub enum ReduceError {
    #[error("failed to parse CSS: {0}")]
    Parse(String),

    #[error("failed to minify CSS: {0}")]
    Minify(String),

    #[error("failed to print CSS: {0}")]
    Print(String),
}

/// Options forwarded to the reducer for one response.
#[derive(Debug, Clone, Copy)]
pub struct ReduceOptions<'a> {
    pub minify: bool,
    pub whitelist: &'a [String],
}

/// Removes CSS rules the body does not use.
pub trait CssReducer {
    /// Return `css` with every rule unused by `body` removed.
    fn reduce(
        &self,
        body: &str,
        css: &str,
        options: &ReduceOptions<'_>,
    ) -> Result<String, ReduceError>;
}

impl<T: CssReducer + ?Sized> CssReducer for &T {
    fn reduce(
        &self,
        body: &str,
        css: &str,
        options: &ReduceOptions<'_>,
    ) -> Result<String, ReduceError> {
        (**self).reduce(body, css, options)
    }
}

// ============================================================================
// LightningReducer
// ============================================================================

/// Reducer backed by `lightningcss` (CSS) and `scraper` (selector matching).
#[derive(Debug, Clone, Copy, Default)]
pub struct LightningReducer;

impl CssReducer for LightningReducer {
    fn reduce(
        &self,
        body: &str,
        css: &str,
        options: &ReduceOptions<'_>,
    ) -> Result<String, ReduceError> {
        let usage = Usage::new(body, options.whitelist);

        let mut stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| ReduceError::Parse(e.to_string()))?;

        retain_used(&mut stylesheet.rules.0, &usage);

        if options.minify {
            stylesheet
                .minify(MinifyOptions::default())
                .map_err(|e| ReduceError::Minify(e.to_string()))?;
        }

        let printed = stylesheet
            .to_css(PrinterOptions {
                minify: options.minify,
                ..PrinterOptions::default()
            })
            .map_err(|e| ReduceError::Print(e.to_string()))?;

        Ok(printed.code.trim_end().to_string())
    }
}

/// Drop style rules nothing uses; recurse into grouping at-rules.
///
/// Grouping rules left empty are dropped too. Everything else
/// (`@font-face`, `@keyframes`, `@import`, ...) is kept as-is.
fn retain_used(rules: &mut Vec<CssRule<'_>>, usage: &Usage<'_>) {
    rules.retain_mut(|rule| match rule {
        CssRule::Style(style) => style
            .selectors
            .to_css_string(PrinterOptions::default())
            .map_or(true, |list| usage.keeps_any(&list)),
        CssRule::Media(media) => {
            retain_used(&mut media.rules.0, usage);
            !media.rules.0.is_empty()
        }
        CssRule::Supports(supports) => {
            retain_used(&mut supports.rules.0, usage);
            !supports.rules.0.is_empty()
        }
        CssRule::LayerBlock(layer) => {
            retain_used(&mut layer.rules.0, usage);
            !layer.rules.0.is_empty()
        }
        _ => true,
    });
}

// ============================================================================
// Usage
// ============================================================================

/// What the body uses: parsed markup plus the always-keep list.
struct Usage<'a> {
    document: Html,
    whitelist: &'a [String],
}

impl<'a> Usage<'a> {
    fn new(body: &str, whitelist: &'a [String]) -> Self {
        Self {
            document: Html::parse_document(body),
            whitelist,
        }
    }

    /// Whether any selector of a serialized selector list is kept.
    fn keeps_any(&self, list: &str) -> bool {
        split_selector_list(list)
            .into_iter()
            .any(|selector| self.keeps(selector))
    }

    fn keeps(&self, selector: &str) -> bool {
        self.is_whitelisted(selector) || self.matches(selector)
    }

    fn is_whitelisted(&self, selector: &str) -> bool {
        self.whitelist
            .iter()
            .any(|entry| whitelist_matches(entry.trim(), selector))
    }

    /// Match against the body. Selectors that cannot be evaluated
    /// statically are kept.
    fn matches(&self, selector: &str) -> bool {
        let stripped = strip_dynamic_pseudos(selector);
        match Selector::parse(&stripped) {
            Ok(parsed) => self.document.select(&parsed).next().is_some(),
            Err(_) => true,
        }
    }
}

/// Whitelist entry test.
///
/// - `*modal*` keeps every selector containing `modal`
/// - `.no` keeps every selector using the class `no` (`#no` the id `no`)
/// - a bare `no` keeps every selector using the name `no` in any position
fn whitelist_matches(entry: &str, selector: &str) -> bool {
    if entry.is_empty() {
        return false;
    }

    if entry.len() > 1 && entry.starts_with('*') && entry.ends_with('*') {
        let needle = entry.trim_matches('*');
        return !needle.is_empty() && selector.contains(needle);
    }

    if entry == selector {
        return true;
    }

    if entry.starts_with(['.', '#']) {
        tokens(selector).any(|token| token == entry)
    } else {
        tokens(selector).any(|token| token.trim_start_matches(['.', '#']) == entry)
    }
}

/// Names in a selector, keeping a leading `.` or `#`
/// (`div.no > #x` yields `div`, `.no`, `#x`).
fn tokens(selector: &str) -> impl Iterator<Item = &str> {
    let is_ident = |c: char| c.is_alphanumeric() || c == '-' || c == '_';
    let mut rest = selector;

    std::iter::from_fn(move || {
        loop {
            let start = rest.find(|c: char| is_ident(c) || c == '.' || c == '#')?;
            let name_start = start + usize::from(rest[start..].starts_with(['.', '#']));
            let name_len = rest[name_start..]
                .find(|c: char| !is_ident(c))
                .unwrap_or(rest.len() - name_start);

            let token = &rest[start..name_start + name_len];
            rest = &rest[name_start + name_len..];
            if name_len > 0 {
                return Some(token);
            }
        }
    })
}

/// Split a selector list on top-level commas.
fn split_selector_list(list: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote = None;
    let mut start = 0;

    for (idx, c) in list.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(list[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(list[start..].trim());
    parts.retain(|part| !part.is_empty());
    parts
}

/// Pseudo-classes that depend on interaction, and all pseudo-elements.
static DYNAMIC_PSEUDO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)::[a-z-]+(?:\([^)]*\))?|:(?:hover|focus-within|focus-visible|focus|active|visited|link|target|before|after|first-line|first-letter)\b",
    )
    .unwrap()
});

/// Remove pseudo-classes/elements that no static document can match.
///
/// `a:hover` → `a`, `:hover > b` → `* > b`, `::selection` → `*`.
fn strip_dynamic_pseudos(selector: &str) -> String {
    let stripped = DYNAMIC_PSEUDO.replace_all(selector, "");
    let mut result = stripped.trim().to_string();

    if result.is_empty() {
        return "*".to_string();
    }
    if result.starts_with(['>', '+', '~']) {
        result.insert_str(0, "* ");
    }
    if result.ends_with(['>', '+', '~']) {
        result.push_str(" *");
    }
    result
}
