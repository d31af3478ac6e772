//! Rule-driven HTML to Markdown rendering.
//!
//! The converter walks the parsed tree and dispatches every element through
//! an ordered rule list. Rules registered later are tried first, so the
//! WordPress-specific overrides sit after the generic block and inline
//! rules. New node kinds get a new rule, never a bigger match.
//!
//! html5ever's recovery means malformed input parses into *some* tree;
//! conversion degrades to text extraction instead of failing.

use ego_tree::NodeRef;
use scraper::node::{Element, Node};
use scraper::{ElementRef, Html};

pub trait Converter: Send + Sync {
    fn to_markdown(&self, html: &str) -> String;
}

type MatchFn = fn(&ElementRef) -> bool;
type RenderFn = fn(&RuleBasedConverter, ElementRef) -> String;

struct Rule {
    name: &'static str,
    matches: MatchFn,
    render: RenderFn,
}

pub struct RuleBasedConverter {
    rules: Vec<Rule>,
}

impl RuleBasedConverter {
    pub fn new() -> Self {
        let mut converter = Self { rules: Vec::new() };

        // Generic rules first; overrides below shadow them.
        converter.register("skip", is_skipped, render_nothing);
        converter.register("container", is_container, render_block);
        converter.register("paragraph", |el| el.value().name() == "p", render_block);
        converter.register("heading", is_heading, render_heading);
        converter.register("blockquote", |el| el.value().name() == "blockquote", render_blockquote);
        converter.register("list", is_list, render_list);
        converter.register("break", |el| el.value().name() == "br", |_, _| "\n".to_string());
        converter.register("rule", |el| el.value().name() == "hr", |_, _| "\n\n---\n\n".to_string());
        converter.register("emphasis", is_emphasis, render_emphasis);
        converter.register("anchor", |el| el.value().name() == "a", render_anchor);
        converter.register("image", |el| el.value().name() == "img", render_image);

        // WordPress-specific overrides, most specific last.
        converter.register("code", |el| el.value().name() == "code", render_code);
        converter.register("pre", |el| el.value().name() == "pre", render_code);
        converter.register("strong", is_strong, render_strong);
        converter.register("styled-span", is_styled_span, render_styled_span);

        converter
    }

    /// Append a rule. Later registrations win over earlier ones whenever
    /// both predicates match the same element.
    pub fn register(&mut self, name: &'static str, matches: MatchFn, render: RenderFn) {
        self.rules.push(Rule {
            name,
            matches,
            render,
        });
    }

    fn render_element(&self, element: ElementRef) -> String {
        for rule in self.rules.iter().rev() {
            if (rule.matches)(&element) {
                log::trace!("rule {} matched <{}>", rule.name, element.value().name());
                return (rule.render)(self, element);
            }
        }
        // Unknown elements contribute their children inline.
        self.render_children(element)
    }

    fn render_node(&self, node: NodeRef<'_, Node>) -> String {
        match node.value() {
            Node::Text(text) => escape_markdown(text),
            Node::Element(_) => ElementRef::wrap(node)
                .map(|element| self.render_element(element))
                .unwrap_or_default(),
            _ => String::new(),
        }
    }

    fn render_children(&self, element: ElementRef) -> String {
        element
            .children()
            .map(|child| self.render_node(child))
            .collect()
    }
}

impl Default for RuleBasedConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter for RuleBasedConverter {
    fn to_markdown(&self, html: &str) -> String {
        let fragment = Html::parse_fragment(html);
        let rendered: String = fragment
            .root_element()
            .children()
            .map(|node| self.render_node(node))
            .collect();
        tidy(&rendered)
    }
}

// ---- predicates ----

fn is_skipped(element: &ElementRef) -> bool {
    matches!(
        element.value().name(),
        "script" | "style" | "noscript" | "iframe" | "template"
    )
}

fn is_container(element: &ElementRef) -> bool {
    matches!(
        element.value().name(),
        "div" | "section" | "article" | "header" | "footer" | "nav" | "figure" | "figcaption"
            | "address"
    )
}

fn is_heading(element: &ElementRef) -> bool {
    matches!(
        element.value().name(),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
    )
}

fn is_list(element: &ElementRef) -> bool {
    matches!(element.value().name(), "ul" | "ol")
}

fn is_emphasis(element: &ElementRef) -> bool {
    matches!(element.value().name(), "em" | "i")
}

fn is_strong(element: &ElementRef) -> bool {
    matches!(element.value().name(), "strong" | "b")
}

/// A `<span>` whose first attribute carries a value is kept as literal HTML.
fn is_styled_span(element: &ElementRef) -> bool {
    element.value().name() == "span"
        && element
            .value()
            .attrs()
            .next()
            .is_some_and(|(_, value)| !value.is_empty())
}

// ---- renderers ----

fn render_nothing(_converter: &RuleBasedConverter, _element: ElementRef) -> String {
    String::new()
}

fn render_block(converter: &RuleBasedConverter, element: ElementRef) -> String {
    let content = converter.render_children(element);
    let content = content.trim();
    if content.is_empty() {
        return String::new();
    }
    format!("\n\n{content}\n\n")
}

fn render_heading(converter: &RuleBasedConverter, element: ElementRef) -> String {
    let level = match element.value().name() {
        "h1" => 1,
        "h2" => 2,
        "h3" => 3,
        "h4" => 4,
        "h5" => 5,
        _ => 6,
    };
    let content = converter.render_children(element);
    let content = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if content.is_empty() {
        return String::new();
    }
    format!("\n\n{} {}\n\n", "#".repeat(level), content)
}

fn render_blockquote(converter: &RuleBasedConverter, element: ElementRef) -> String {
    let content = converter.render_children(element);
    let content = collapse_blank_lines(content.trim());
    if content.is_empty() {
        return String::new();
    }
    let quoted = content
        .lines()
        .map(|line| format!("> {line}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!("\n\n{quoted}\n\n")
}

fn render_list(converter: &RuleBasedConverter, element: ElementRef) -> String {
    let ordered = element.value().name() == "ol";
    let mut out = String::from("\n\n");
    let mut index = 0usize;
    for child in element.children().filter_map(ElementRef::wrap) {
        if child.value().name() != "li" {
            continue;
        }
        index += 1;
        let item = converter.render_children(child);
        let item = collapse_blank_lines(item.trim());
        let mut lines = item.lines();
        let Some(first) = lines.next() else {
            continue;
        };
        if ordered {
            out.push_str(&format!("{index}. "));
        } else {
            out.push_str("- ");
        }
        out.push_str(first);
        out.push('\n');
        for line in lines {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out.push('\n');
    out
}

fn render_emphasis(converter: &RuleBasedConverter, element: ElementRef) -> String {
    let content = converter.render_children(element);
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    format!("*{trimmed}*")
}

fn render_anchor(converter: &RuleBasedConverter, element: ElementRef) -> String {
    let content = converter.render_children(element);
    let content = content.trim();
    match element.value().attr("href") {
        Some(href) if !href.is_empty() => format!("[{content}]({href})"),
        _ => content.to_string(),
    }
}

fn render_image(_converter: &RuleBasedConverter, element: ElementRef) -> String {
    match element.value().attr("src") {
        Some(src) if !src.is_empty() => {
            let alt = element.value().attr("alt").unwrap_or_default();
            format!("![{alt}]({src})")
        }
        _ => String::new(),
    }
}

/// Shared by `<pre>` and `<code>`. The outer `<pre>` consumes the raw text
/// of its whole subtree, so an inner `<code>` is never wrapped twice.
/// Content spanning multiple lines, or carrying a `language-*` class,
/// becomes a fenced block; anything else becomes inline code.
fn render_code(_converter: &RuleBasedConverter, element: ElementRef) -> String {
    let text: String = element.text().collect();
    let text = text.trim_matches('\n');
    if text.is_empty() {
        return String::new();
    }
    let language = code_language(element);
    if text.contains('\n') || language.is_some() {
        format!("\n\n```{}\n{text}\n```\n\n", language.unwrap_or_default())
    } else {
        format!(" `{text}` ")
    }
}

fn render_strong(converter: &RuleBasedConverter, element: ElementRef) -> String {
    let content = converter.render_children(element);
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    format!("**{trimmed}**")
}

/// Re-emit the span literally, carrying its first attribute value as an
/// inline style, instead of flattening it to plain Markdown.
fn render_styled_span(converter: &RuleBasedConverter, element: ElementRef) -> String {
    let value = element
        .value()
        .attrs()
        .next()
        .map(|(_, value)| value)
        .unwrap_or_default();
    format!(
        "<span style=\"{value}\">{}</span>",
        converter.render_children(element)
    )
}

// ---- text handling ----

fn code_language(element: ElementRef) -> Option<String> {
    if let Some(language) = class_language(element.value()) {
        return Some(language);
    }
    for child in element.children().filter_map(ElementRef::wrap) {
        if child.value().name() == "code" {
            if let Some(language) = class_language(child.value()) {
                return Some(language);
            }
        }
    }
    None
}

fn class_language(element: &Element) -> Option<String> {
    element
        .attr("class")?
        .split_whitespace()
        .find_map(|class| class.strip_prefix("language-"))
        .map(|language| language.to_string())
}

/// Collapse runs of whitespace and escape Markdown structure characters.
fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
            continue;
        }
        last_was_space = false;
        if matches!(ch, '\\' | '`' | '*' | '_' | '[' | ']') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut newlines = 0;
    for ch in text.chars() {
        if ch == '\n' {
            newlines += 1;
            if newlines <= 2 {
                out.push('\n');
            }
        } else {
            newlines = 0;
            out.push(ch);
        }
    }
    out
}

/// Final cleanup: outside fenced blocks, drop trailing spaces, squeeze
/// interior space runs and cap blank runs; fence content stays verbatim.
fn tidy(rendered: &str) -> String {
    let mut cleaned = String::with_capacity(rendered.len());
    let mut in_fence = false;
    let mut blank_run = 0;
    for raw in rendered.lines() {
        let line = if in_fence {
            raw.to_string()
        } else {
            squeeze_spaces(raw.trim_end())
        };
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
        }
        if !in_fence && line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        cleaned.push_str(&line);
        cleaned.push('\n');
    }
    cleaned.trim().to_string()
}

/// Collapse interior runs of spaces while preserving leading indentation.
fn squeeze_spaces(line: &str) -> String {
    let indent_len = line.len() - line.trim_start_matches(' ').len();
    let (indent, rest) = line.split_at(indent_len);
    let mut out = String::with_capacity(line.len());
    out.push_str(indent);
    let mut last_was_space = false;
    for ch in rest.chars() {
        if ch == ' ' {
            if last_was_space {
                continue;
            }
            last_was_space = true;
        } else {
            last_was_space = false;
        }
        out.push(ch);
    }
    out
}
