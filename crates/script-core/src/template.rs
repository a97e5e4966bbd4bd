//! Logic-less template renderer (Mustache subset).
//!
//! Supported tags: `{{name}}`, `{{{name}}}`, `{{&name}}`, dotted names,
//! `{{.}}`, sections `{{#name}}..{{/name}}`, inverted sections
//! `{{^name}}..{{/name}}` and comments `{{! .. }}`. Output is never
//! HTML-escaped: the templates produce Python and shell source.
//!
//! Section, inverted and comment tags that sit alone on a line are
//! "standalone": the whole line, including its newline, is dropped.

use crate::data::TemplateData;
use crate::error::{Result, ScriptError};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Var(String),
    Section {
        name: String,
        inverted: bool,
        children: Vec<Node>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum TagKind {
    Var,
    Open,
    Inverted,
    Close,
    Comment,
}

impl TagKind {
    fn can_stand_alone(self) -> bool {
        !matches!(self, TagKind::Var)
    }
}

#[derive(Debug)]
enum Token {
    Text(String),
    Tag {
        kind: TagKind,
        name: String,
        line: usize,
    },
}

#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    nodes: Vec<Node>,
}

impl Template {
    pub fn parse(name: &str, source: &str) -> Result<Self> {
        let tokens = tokenize(name, source)?;
        let nodes = build_tree(name, tokens)?;
        Ok(Self {
            name: name.to_string(),
            nodes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn render(&self, data: &TemplateData) -> String {
        let mut out = String::new();
        let mut stack = vec![Frame::Root(data.as_map())];
        render_nodes(&self.nodes, &mut stack, &mut out);
        out
    }
}

/// Parse and render in one step.
pub fn render(name: &str, source: &str, data: &TemplateData) -> Result<String> {
    Ok(Template::parse(name, source)?.render(data))
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

fn parse_error(name: &str, line: usize, message: impl Into<String>) -> ScriptError {
    ScriptError::TemplateParse {
        name: name.to_string(),
        line,
        message: message.into(),
    }
}

fn tokenize(name: &str, source: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    // Position just past the previous tag; a standalone tag must be the
    // first thing on its line after this point.
    let mut cursor = 0usize;
    let mut pos = 0usize;

    while let Some(offset) = source[pos..].find("{{") {
        let tag_start = pos + offset;
        let line = source[..tag_start].matches('\n').count() + 1;
        text.push_str(&source[pos..tag_start]);

        let (kind, raw_name, tag_end) = if source[tag_start..].starts_with("{{{") {
            let close = source[tag_start + 3..]
                .find("}}}")
                .ok_or_else(|| parse_error(name, line, "unclosed '{{{' tag"))?;
            let inner = &source[tag_start + 3..tag_start + 3 + close];
            (TagKind::Var, inner.trim(), tag_start + 3 + close + 3)
        } else {
            let close = source[tag_start + 2..]
                .find("}}")
                .ok_or_else(|| parse_error(name, line, "unclosed '{{' tag"))?;
            let inner = source[tag_start + 2..tag_start + 2 + close].trim();
            let tag_end = tag_start + 2 + close + 2;
            match inner.chars().next() {
                Some('#') => (TagKind::Open, inner[1..].trim(), tag_end),
                Some('^') => (TagKind::Inverted, inner[1..].trim(), tag_end),
                Some('/') => (TagKind::Close, inner[1..].trim(), tag_end),
                Some('!') => (TagKind::Comment, "", tag_end),
                Some('&') => (TagKind::Var, inner[1..].trim(), tag_end),
                Some('>') => return Err(parse_error(name, line, "partials are not supported")),
                Some('=') => {
                    return Err(parse_error(name, line, "delimiter changes are not supported"))
                }
                _ => (TagKind::Var, inner, tag_end),
            }
        };

        if kind != TagKind::Comment && raw_name.is_empty() {
            return Err(parse_error(name, line, "empty tag"));
        }

        pos = tag_end;
        if kind.can_stand_alone() {
            if let Some(next) = standalone_end(source, cursor, tag_start, tag_end) {
                let line_start = source[..tag_start].rfind('\n').map(|i| i + 1).unwrap_or(0);
                text.truncate(text.len() - (tag_start - line_start));
                pos = next;
            }
        }
        cursor = pos;

        if !text.is_empty() {
            tokens.push(Token::Text(std::mem::take(&mut text)));
        }
        tokens.push(Token::Tag {
            kind,
            name: raw_name.to_string(),
            line,
        });
    }

    text.push_str(&source[pos..]);
    if !text.is_empty() {
        tokens.push(Token::Text(text));
    }
    Ok(tokens)
}

/// If the tag at `tag_start..tag_end` is alone on its line, return the
/// position just past the end of that line.
fn standalone_end(source: &str, cursor: usize, tag_start: usize, tag_end: usize) -> Option<usize> {
    let line_start = source[..tag_start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    if line_start < cursor {
        return None;
    }
    let is_blank = |s: &str| s.chars().all(|c| c == ' ' || c == '\t' || c == '\r');
    if !is_blank(&source[line_start..tag_start]) {
        return None;
    }
    let rest = &source[tag_end..];
    match rest.find('\n') {
        Some(nl) if is_blank(&rest[..nl]) => Some(tag_end + nl + 1),
        None if is_blank(rest) => Some(source.len()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tree builder
// ---------------------------------------------------------------------------

fn build_tree(name: &str, tokens: Vec<Token>) -> Result<Vec<Node>> {
    // Each open section keeps (name, inverted, line, children-so-far).
    let mut stack: Vec<(String, bool, usize, Vec<Node>)> = Vec::new();
    let mut root: Vec<Node> = Vec::new();

    for token in tokens {
        let current = match stack.last_mut() {
            Some((_, _, _, children)) => children,
            None => &mut root,
        };
        match token {
            Token::Text(t) => current.push(Node::Text(t)),
            Token::Tag { kind, name: tag, line } => match kind {
                TagKind::Var => current.push(Node::Var(tag)),
                TagKind::Comment => {}
                TagKind::Open | TagKind::Inverted => {
                    stack.push((tag, kind == TagKind::Inverted, line, Vec::new()))
                }
                TagKind::Close => {
                    let (open, inverted, _, children) = stack.pop().ok_or_else(|| {
                        parse_error(name, line, format!("unexpected closing tag '{tag}'"))
                    })?;
                    if open != tag {
                        return Err(parse_error(
                            name,
                            line,
                            format!("closing tag '{tag}' does not match open section '{open}'"),
                        ));
                    }
                    let node = Node::Section {
                        name: open,
                        inverted,
                        children,
                    };
                    match stack.last_mut() {
                        Some((_, _, _, parent)) => parent.push(node),
                        None => root.push(node),
                    }
                }
            },
        }
    }

    if let Some((open, _, line, _)) = stack.pop() {
        return Err(parse_error(name, line, format!("unclosed section '{open}'")));
    }
    Ok(root)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
enum Frame<'a> {
    Root(&'a Map<String, Value>),
    Item(&'a Value),
}

impl<'a> Frame<'a> {
    fn field(&self, key: &str) -> Option<&'a Value> {
        match *self {
            Frame::Root(map) => map.get(key),
            Frame::Item(Value::Object(map)) => map.get(key),
            Frame::Item(_) => None,
        }
    }
}

/// Resolve `name` against the context stack. The first frame in which the
/// leading segment is present wins, even if it holds `null`.
fn lookup<'a>(name: &str, stack: &[Frame<'a>]) -> Option<&'a Value> {
    if name == "." {
        return match stack.last() {
            Some(Frame::Item(v)) => Some(*v),
            _ => None,
        };
    }
    let mut parts = name.split('.');
    let head = parts.next()?;
    let mut value = stack.iter().rev().find_map(|frame| frame.field(head))?;
    for part in parts {
        value = value.as_object()?.get(part)?;
    }
    Some(value)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

fn render_nodes<'a>(nodes: &[Node], stack: &mut Vec<Frame<'a>>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Var(name) => {
                if let Some(v) = lookup(name, stack) {
                    out.push_str(&display(v));
                }
            }
            Node::Section {
                name,
                inverted,
                children,
            } => {
                let value = lookup(name, stack);
                let truthy = value.map(is_truthy).unwrap_or(false);
                if *inverted {
                    if !truthy {
                        render_nodes(children, stack, out);
                    }
                    continue;
                }
                let Some(value) = value.filter(|_| truthy) else {
                    continue;
                };
                match value {
                    Value::Array(items) => {
                        for item in items {
                            stack.push(Frame::Item(item));
                            render_nodes(children, stack, out);
                            stack.pop();
                        }
                    }
                    other => {
                        stack.push(Frame::Item(other));
                        render_nodes(children, stack, out);
                        stack.pop();
                    }
                }
            }
        }
    }
}

/// Text form of a value inside `{{ }}`.
pub fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (_, Some(u), _) => u.to_string(),
            (_, _, Some(f)) if f.fract() == 0.0 && f.abs() < 1e15 => (f as i64).to_string(),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(display).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(v: Value) -> TemplateData {
        TemplateData::from_value(v).unwrap()
    }

    fn r(src: &str, v: Value) -> String {
        render("test", src, &data(v)).unwrap()
    }

    #[test]
    fn substitutes_without_escaping() {
        assert_eq!(
            r("x = {{v}}; y = {{{v}}}; z = {{& v}}", json!({"v": "<\"a\">"})),
            "x = <\"a\">; y = <\"a\">; z = <\"a\">"
        );
    }

    #[test]
    fn missing_and_null_render_empty() {
        assert_eq!(r("[{{a}}][{{b}}]", json!({"b": null})), "[][]");
    }

    #[test]
    fn numbers_render_like_javascript() {
        assert_eq!(r("{{a}} {{b}} {{c}}", json!({"a": 4, "b": 3.0, "c": 0.25})), "4 3 0.25");
    }

    #[test]
    fn sections_follow_truthiness() {
        let src = "{{#a}}A{{/a}}{{#b}}B{{/b}}{{#c}}C{{/c}}{{#d}}D{{/d}}{{^e}}E{{/e}}";
        assert_eq!(
            r(src, json!({"a": true, "b": "", "c": 0, "d": [], "e": false})),
            "AE"
        );
    }

    #[test]
    fn lists_iterate_with_dot() {
        assert_eq!(
            r("{{#names}}<{{.}}>{{/names}}", json!({"names": ["x", "y"]})),
            "<x><y>"
        );
    }

    #[test]
    fn truthy_scalar_section_exposes_value() {
        assert_eq!(r("{{#f}}file={{.}}{{/f}}", json!({"f": "in.txt"})), "file=in.txt");
    }

    #[test]
    fn absent_keys_fall_through_but_null_stops() {
        let src = "{{#items}}{{label}};{{/items}}";
        let v = json!({"label": "outer", "items": [{"label": "inner"}, {}, {"label": null}]});
        assert_eq!(r(src, v), "inner;outer;;");
    }

    #[test]
    fn dotted_names_descend() {
        assert_eq!(r("{{a.b.c}}", json!({"a": {"b": {"c": 7}}})), "7");
        assert_eq!(r("{{a.x}}", json!({"a": {}})), "");
    }

    #[test]
    fn standalone_tags_remove_their_line() {
        let src = "start\n    {{#on}}\n    inside\n    {{/on}}\n{{! note }}\nend\n";
        assert_eq!(r(src, json!({"on": true})), "start\n    inside\nend\n");
        assert_eq!(r(src, json!({"on": false})), "start\nend\n");
    }

    #[test]
    fn inline_sections_keep_surrounding_text() {
        assert_eq!(
            r("a {{#on}}b{{/on}} c\n", json!({"on": true})),
            "a b c\n"
        );
    }

    #[test]
    fn standalone_at_end_of_input() {
        assert_eq!(r("x\n{{#on}}\ny\n{{/on}}", json!({"on": true})), "x\ny\n");
    }

    #[test]
    fn unclosed_section_is_an_error() {
        let err = Template::parse("t", "a\n{{#open}}\nb").unwrap_err();
        assert!(err.to_string().contains("line 2"));
        assert!(err.to_string().contains("unclosed section 'open'"));
    }

    #[test]
    fn mismatched_close_is_an_error() {
        assert!(Template::parse("t", "{{#a}}{{/b}}").is_err());
        assert!(Template::parse("t", "{{/a}}").is_err());
        assert!(Template::parse("t", "{{a").is_err());
    }

    #[test]
    fn partials_are_rejected() {
        assert!(Template::parse("t", "{{> other}}").is_err());
    }
}
