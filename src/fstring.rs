//! Interpolated string unparser
//!
//! Before 3.12 an f-string's expression parts may not contain backslashes, and a string
//! nested inside them may not reuse any enclosing quote character. Each nesting level
//! therefore needs its own quote style, which caps nesting at four levels (`'`, `"`, `'''`
//! and `"""`). [`solve_quotes`] finds an assignment by backtracking; rendering then
//! produces every spelling under the feasible assignments and keeps the shortest one that
//! parses back to the same tree.
//!
//! From 3.12 on every quote is legal at every level and no solver is needed. Template
//! strings always use the modern rules.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, trace};

use crate::codegen;
use crate::literal::{encode_str_body, Quote};
use crate::options::TargetVersions;
use crate::parse::Frontend;
use crate::tree::{Conversion, Literal, NodeId, NodeKind, SyntaxTree};
use crate::validate::compare_nodes;
use crate::visitor::children;

/// Deepest nesting the legacy rules can express.
pub const MAX_DEPTH: usize = 4;

/// Upper bound on spellings produced for a single string.
const MAX_CANDIDATES: usize = 64;

lazy_static! {
    /// Literal text that can fold into a following `{name=}` part.
    static ref DEBUG_SUFFIX: Regex =
        Regex::new(r"(?s)^(.*?)([A-Za-z_][A-Za-z0-9_]*)( *)=( *)$").unwrap();
}

// ═══════════════════════════════════════════════════════════════════════════════
// QUOTE SOLVER
// ═══════════════════════════════════════════════════════════════════════════════

/// Characters the literal text at one nesting level contains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Specials {
    pub single: bool,
    pub double: bool,
    pub newline: bool,
    pub backslash: bool,
    pub hash: bool,
}

impl Specials {
    pub fn add_text(&mut self, text: &str) {
        for c in text.chars() {
            match c {
                '\'' => self.single = true,
                '"' => self.double = true,
                '\n' | '\r' => self.newline = true,
                '\\' => self.backslash = true,
                '#' => self.hash = true,
                _ => {}
            }
        }
    }

    fn has_quote_char(&self, quote: Quote) -> bool {
        match quote.char() {
            '\'' => self.single,
            _ => self.double,
        }
    }
}

fn compatible(levels: &[Specials], assigned: &[Quote], quote: Quote) -> bool {
    let level = assigned.len();
    if assigned.contains(&quote) {
        return false;
    }
    if assigned
        .iter()
        .any(|outer| !outer.is_triple() && outer.char() == quote.char())
    {
        return false;
    }
    if level > 0 {
        let own = &levels[level];
        if own.has_quote_char(quote) || (own.newline && !quote.is_triple()) {
            return false;
        }
    }
    levels[level + 1..]
        .iter()
        .all(|deeper| !deeper.has_quote_char(quote) && (quote.is_triple() || !deeper.newline))
}

fn assign(levels: &[Specials], assigned: &mut Vec<Quote>, out: &mut Vec<Vec<Quote>>, first_only: bool) {
    if assigned.len() == levels.len() {
        out.push(assigned.clone());
        return;
    }
    for quote in Quote::ALL {
        if first_only && !out.is_empty() {
            return;
        }
        if compatible(levels, assigned, quote) {
            assigned.push(quote);
            assign(levels, assigned, out, first_only);
            assigned.pop();
        }
    }
}

fn nested_levels_expressible(levels: &[Specials]) -> bool {
    levels.len() <= MAX_DEPTH && levels.iter().skip(1).all(|l| !l.backslash && !l.hash)
}

/// One quote per nesting level such that no level's quote appears in the text of any
/// deeper level, or `None` when the nesting cannot be expressed.
pub fn solve_quotes(levels: &[Specials]) -> Option<Vec<Quote>> {
    if !nested_levels_expressible(levels) {
        return None;
    }
    let mut out = Vec::new();
    assign(levels, &mut Vec::new(), &mut out, true);
    out.pop()
}

fn feasible_assignments(levels: &[Specials]) -> Vec<Vec<Quote>> {
    if !nested_levels_expressible(levels) {
        return Vec::new();
    }
    let mut out = Vec::new();
    assign(levels, &mut Vec::new(), &mut out, false);
    out
}

fn ensure_level(levels: &mut Vec<Specials>, level: usize) {
    if levels.len() <= level {
        levels.resize(level + 1, Specials::default());
    }
}

fn collect_string(tree: &SyntaxTree, id: NodeId, level: usize, levels: &mut Vec<Specials>) {
    ensure_level(levels, level);
    let values = match tree.kind(id) {
        NodeKind::JoinedStr { values } | NodeKind::TemplateStr { values } => values,
        _ => return,
    };
    for &part in values {
        match tree.kind(part) {
            NodeKind::Constant {
                value: Literal::Str(text),
            } => levels[level].add_text(text),
            NodeKind::FormattedValue {
                value, format_spec, ..
            } => {
                collect_expression(tree, *value, level + 1, levels);
                if let Some(spec) = format_spec {
                    collect_string(tree, *spec, level, levels);
                }
            }
            _ => {}
        }
    }
}

fn collect_expression(tree: &SyntaxTree, id: NodeId, level: usize, levels: &mut Vec<Specials>) {
    match tree.kind(id) {
        NodeKind::JoinedStr { .. } | NodeKind::TemplateStr { .. } => {
            collect_string(tree, id, level, levels)
        }
        NodeKind::Constant {
            value: Literal::Str(text),
        } => {
            ensure_level(levels, level);
            levels[level].add_text(text);
        }
        NodeKind::Constant {
            value: Literal::Bytes(bytes),
        } => {
            ensure_level(levels, level);
            let text: String = bytes.iter().map(|&b| b as char).collect();
            levels[level].add_text(&text);
        }
        kind => {
            for child in children(kind) {
                collect_expression(tree, child, level, levels);
            }
        }
    }
}

/// Literal text requirements of every nesting level of an interpolated string.
pub fn level_specials(tree: &SyntaxTree, id: NodeId) -> Vec<Specials> {
    let mut levels = Vec::new();
    collect_string(tree, id, 0, &mut levels);
    levels
}

// ═══════════════════════════════════════════════════════════════════════════════
// RENDERING
// ═══════════════════════════════════════════════════════════════════════════════

/// Quote assignment in force while printing inside a legacy interpolated string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nesting {
    pub quotes: Vec<Quote>,
    /// Level of the string literals currently being printed.
    pub level: usize,
}

impl Nesting {
    pub fn quote(&self) -> Option<Quote> {
        self.quotes.get(self.level).copied()
    }

    fn deeper(&self) -> Nesting {
        Nesting {
            quotes: self.quotes.clone(),
            level: self.level + 1,
        }
    }
}

/// Body of a string literal nested inside a legacy expression part, where no escape
/// sequence is allowed.
pub fn nested_body(text: &str, quote: Quote) -> Option<String> {
    if text.contains('\\') || text.contains('#') {
        return None;
    }
    encode_str_body(text, quote, true, false)
}

fn double_braces(text: &str) -> String {
    text.replace('{', "{{").replace('}', "}}")
}

struct Renderer<'a> {
    tree: &'a SyntaxTree,
    frontend: &'a dyn Frontend,
    targets: TargetVersions,
    /// `None` under the modern rules.
    nesting: Option<Nesting>,
    quote: Quote,
}

impl Renderer<'_> {
    fn text(&self, text: &str) -> Option<String> {
        let body = match &self.nesting {
            Some(nesting) if nesting.level > 0 => nested_body(text, self.quote)?,
            _ => encode_str_body(text, self.quote, false, false)?,
        };
        Some(double_braces(&body))
    }

    fn expression(&self, id: NodeId) -> Option<String> {
        let text = match &self.nesting {
            Some(nesting) => {
                codegen::nested_expression_text(
                    self.tree,
                    id,
                    self.frontend,
                    self.targets,
                    nesting.deeper(),
                )?
            }
            None => {
                codegen::interpolated_expression_text(self.tree, id, self.frontend, self.targets)
            }
        };
        if self.nesting.is_some() && (text.contains('\\') || text.contains('\n')) {
            return None;
        }
        if text.starts_with('{') {
            Some(format!(" {}", text))
        } else {
            Some(text)
        }
    }

    fn format_spec(&self, spec: NodeId) -> Option<String> {
        let NodeKind::JoinedStr { values } = self.tree.kind(spec) else {
            return None;
        };
        let mut out = String::new();
        for &part in values {
            match self.tree.kind(part) {
                NodeKind::Constant {
                    value: Literal::Str(text),
                } => out.push_str(&self.text(text)?),
                NodeKind::FormattedValue { .. } => out.push_str(&self.replacement_field(part)?),
                _ => return None,
            }
        }
        Some(out)
    }

    fn replacement_field(&self, id: NodeId) -> Option<String> {
        let NodeKind::FormattedValue {
            value,
            conversion,
            format_spec,
        } = self.tree.kind(id)
        else {
            return None;
        };
        let mut out = format!("{{{}{}", self.expression(*value)?, conversion.suffix());
        if let Some(spec) = format_spec {
            out.push(':');
            out.push_str(&self.format_spec(*spec)?);
        }
        out.push('}');
        Some(out)
    }

    /// `text{name=...}` for a part whose preceding text already spells `name=`.
    fn debug_field(&self, text: &str, id: NodeId) -> Option<String> {
        let NodeKind::FormattedValue {
            value,
            conversion,
            format_spec,
        } = self.tree.kind(id)
        else {
            return None;
        };
        let NodeKind::Name { id: name, .. } = self.tree.kind(*value) else {
            return None;
        };
        let captures = DEBUG_SUFFIX.captures(text)?;
        let word = captures.get(2)?.as_str();
        let head = word.strip_suffix(name.as_str())?;
        let prefix = format!("{}{}", captures.get(1)?.as_str(), head);

        let suffix = match (conversion, format_spec) {
            (Conversion::Repr, None) => String::new(),
            (Conversion::None, Some(spec)) => format!(":{}", self.format_spec(*spec)?),
            (Conversion::None, None) => return None,
            (conversion, None) => conversion.suffix().to_string(),
            (conversion, Some(spec)) => {
                format!("{}:{}", conversion.suffix(), self.format_spec(*spec)?)
            }
        };
        Some(format!(
            "{}{{{}{}={}{}}}",
            self.text(&prefix)?,
            name,
            captures.get(3)?.as_str(),
            captures.get(4)?.as_str(),
            suffix
        ))
    }

    /// Alternative spellings of every segment of the string body.
    fn segments(&self, values: &[NodeId]) -> Option<Vec<Vec<String>>> {
        let mut segments: Vec<Vec<String>> = Vec::new();
        let mut pending: Option<&str> = None;
        for &part in values {
            match self.tree.kind(part) {
                NodeKind::Constant {
                    value: Literal::Str(text),
                } => {
                    if let Some(previous) = pending.replace(text) {
                        segments.push(vec![self.text(previous)?]);
                    }
                }
                NodeKind::FormattedValue { .. } => {
                    let explicit = self.replacement_field(part)?;
                    match pending.take() {
                        Some(text) => {
                            let mut options = vec![format!("{}{}", self.text(text)?, explicit)];
                            if self.targets.fstring_debug() {
                                if let Some(shorthand) = self.debug_field(text, part) {
                                    options.push(shorthand);
                                }
                            }
                            segments.push(options);
                        }
                        None => segments.push(vec![explicit]),
                    }
                }
                _ => return None,
            }
        }
        if let Some(text) = pending {
            segments.push(vec![self.text(text)?]);
        }
        Some(segments)
    }

    fn candidates(&self, id: NodeId) -> Vec<String> {
        let (prefix, values) = match self.tree.kind(id) {
            NodeKind::JoinedStr { values } => ("f", values),
            NodeKind::TemplateStr { values } => ("t", values),
            _ => return Vec::new(),
        };
        let Some(segments) = self.segments(values) else {
            return Vec::new();
        };

        let combinations: usize = segments
            .iter()
            .map(|options| options.len())
            .try_fold(1usize, |acc, n| acc.checked_mul(n))
            .unwrap_or(usize::MAX);
        let mut bodies = vec![String::new()];
        for options in &segments {
            if combinations > MAX_CANDIDATES {
                // take every shortest option independently
                let best = options.iter().min_by_key(|o| o.len()).cloned().unwrap_or_default();
                for body in &mut bodies {
                    body.push_str(&best);
                }
                continue;
            }
            bodies = bodies
                .iter()
                .flat_map(|body| options.iter().map(move |option| format!("{}{}", body, option)))
                .collect();
        }

        let quote = self.quote.as_str();
        bodies
            .into_iter()
            .map(|body| format!("{}{}{}{}", prefix, quote, body, quote))
            .collect()
    }
}

fn reparses_equal(tree: &SyntaxTree, id: NodeId, frontend: &dyn Frontend, text: &str) -> bool {
    let Ok(parsed) = frontend.parse_expression(text) else {
        return false;
    };
    let NodeKind::Expression { body } = parsed.kind(parsed.root()) else {
        return false;
    };
    compare_nodes(tree, id, &parsed, *body).is_ok()
}

fn legacy_candidates(
    tree: &SyntaxTree,
    id: NodeId,
    frontend: &dyn Frontend,
    targets: TargetVersions,
) -> Vec<String> {
    let levels = level_specials(tree, id);
    let assignments = feasible_assignments(&levels);
    if assignments.is_empty() {
        trace!(depth = levels.len(), "no quote assignment for interpolated string");
    }
    assignments
        .into_iter()
        .flat_map(|quotes| {
            let renderer = Renderer {
                tree,
                frontend,
                targets,
                quote: quotes[0],
                nesting: Some(Nesting { quotes, level: 0 }),
            };
            renderer.candidates(id)
        })
        .collect()
}

fn modern_candidates(
    tree: &SyntaxTree,
    id: NodeId,
    frontend: &dyn Frontend,
    targets: TargetVersions,
) -> Vec<String> {
    Quote::ALL
        .into_iter()
        .flat_map(|quote| {
            Renderer {
                tree,
                frontend,
                targets,
                quote,
                nesting: None,
            }
            .candidates(id)
        })
        .collect()
}

fn shortest_valid(
    tree: &SyntaxTree,
    id: NodeId,
    frontend: &dyn Frontend,
    mut candidates: Vec<String>,
) -> Option<String> {
    candidates.sort_by_key(|c| c.len());
    candidates.dedup();
    candidates
        .into_iter()
        .find(|candidate| reparses_equal(tree, id, frontend, candidate))
}

/// The node's source text, when the tree still reads the same as that text.
///
/// Renaming changes identifiers without touching spans, so text from before a rename
/// no longer matches and is refused.
fn source_text(tree: &SyntaxTree, id: NodeId, frontend: &dyn Frontend) -> Option<String> {
    let original = tree.span_text(id)?;
    if reparses_equal(tree, id, frontend, original) {
        Some(original.to_string())
    } else {
        None
    }
}

/// Text of an f-string or template string node.
///
/// Inside a legacy expression part (`nesting` set) the string takes the quote assigned to
/// its level and `None` means it cannot be spelled that way. At the top level the result
/// is always some text: the shortest verified candidate, else the node's original source
/// text if it still matches the tree, else the shortest unverified candidate.
pub fn interpolated_text(
    tree: &SyntaxTree,
    id: NodeId,
    frontend: &dyn Frontend,
    targets: TargetVersions,
    nesting: Option<&Nesting>,
) -> Option<String> {
    let template = matches!(tree.kind(id), NodeKind::TemplateStr { .. });
    let legacy = targets.legacy_fstrings() && !template;

    if let (false, Some(nesting)) = (template, nesting) {
        let renderer = Renderer {
            tree,
            frontend,
            targets,
            quote: nesting.quote()?,
            nesting: Some(nesting.clone()),
        };
        return renderer.candidates(id).into_iter().min_by_key(|c| c.len());
    }

    let modern = if legacy {
        Vec::new()
    } else {
        modern_candidates(tree, id, frontend, targets)
    };
    if let Some(text) = shortest_valid(tree, id, frontend, modern.clone()) {
        return Some(text);
    }
    // the front-end may not accept the modern grammar, so legacy spellings are tried
    // for every target
    if !template {
        if let Some(text) = shortest_valid(tree, id, frontend, legacy_candidates(tree, id, frontend, targets)) {
            return Some(text);
        }
    }
    if let Some(original) = source_text(tree, id, frontend) {
        debug!(text = %original, "interpolated string kept as written");
        return Some(original);
    }
    let fallback = if modern.is_empty() {
        modern_candidates(tree, id, frontend, targets)
    } else {
        modern
    };
    fallback.into_iter().min_by_key(|c| c.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(text: &str) -> Specials {
        let mut specials = Specials::default();
        specials.add_text(text);
        specials
    }

    #[test]
    fn test_single_level_prefers_single_quote() {
        assert_eq!(solve_quotes(&[level("abc")]), Some(vec![Quote::Single]));
    }

    #[test]
    fn test_outer_quote_avoids_inner_text() {
        let quotes = solve_quotes(&[level(""), level("it's")]).unwrap();
        assert_eq!(quotes, vec![Quote::Double, Quote::TripleSingle]);
    }

    #[test]
    fn test_newline_below_forces_triple() {
        let quotes = solve_quotes(&[level(""), level("a\nb")]).unwrap();
        assert!(quotes[0].is_triple());
        assert!(quotes[1].is_triple());
    }

    #[test]
    fn test_four_levels_use_every_quote() {
        let levels = vec![Specials::default(); 4];
        let quotes = solve_quotes(&levels).unwrap();
        assert_eq!(
            quotes,
            vec![
                Quote::TripleSingle,
                Quote::TripleDouble,
                Quote::Single,
                Quote::Double
            ]
        );
    }

    #[test]
    fn test_five_levels_are_infeasible() {
        assert_eq!(solve_quotes(&vec![Specials::default(); 5]), None);
    }

    #[test]
    fn test_backslash_in_nested_text_is_infeasible() {
        assert_eq!(solve_quotes(&[level(""), level("a\\b")]), None);
        assert!(solve_quotes(&[level("a\\b")]).is_some());
    }

    #[test]
    fn test_assignments_never_share_quotes() {
        for quotes in feasible_assignments(&vec![Specials::default(); 3]) {
            for (i, outer) in quotes.iter().enumerate() {
                for inner in &quotes[i + 1..] {
                    assert_ne!(outer, inner);
                    assert!(outer.is_triple() || outer.char() != inner.char());
                }
            }
        }
    }

    #[test]
    fn test_debug_suffix_pattern() {
        let captures = DEBUG_SUFFIX.captures("value: x = ").unwrap();
        assert_eq!(&captures[1], "value: ");
        assert_eq!(&captures[2], "x");
        assert_eq!(&captures[3], " ");
        assert_eq!(&captures[4], " ");
    }

    #[test]
    fn test_source_text_refused_after_rename() {
        use crate::parse::PythonFrontend;
        use crate::visitor::preorder;

        let mut tree = PythonFrontend
            .parse_module("x = f'{value}'\n", "test.py")
            .unwrap();
        let joined = preorder(&tree, tree.root())
            .into_iter()
            .find(|&id| matches!(tree.kind(id), NodeKind::JoinedStr { .. }))
            .unwrap();
        assert_eq!(
            source_text(&tree, joined, &PythonFrontend).as_deref(),
            Some("f'{value}'")
        );

        let name = preorder(&tree, joined)
            .into_iter()
            .find(|&id| matches!(tree.kind(id), NodeKind::Name { .. }))
            .unwrap();
        if let NodeKind::Name { id, .. } = tree.kind_mut(name) {
            *id = "a".to_string();
        }
        assert_eq!(source_text(&tree, joined, &PythonFrontend), None);
    }

    #[test]
    fn test_nested_body_rejects_escapes() {
        assert_eq!(nested_body("a'b", Quote::Single), None);
        assert_eq!(nested_body("a'b", Quote::Double).as_deref(), Some("a'b"));
        assert_eq!(nested_body("a\\b", Quote::Double), None);
    }
}
