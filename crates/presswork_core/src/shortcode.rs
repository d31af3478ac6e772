//! WordPress shortcode normalization.
//!
//! Bracket shortcodes are rewritten into plain HTML before the content is
//! handed to the tree parser. These are flat, literal regex rewrites over
//! the whole document; nested or escaped shortcode delimiters are not
//! supported. Order matters: the language-carrying forms must run before
//! the bare forms, and named quotes before nameless ones.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref CODE_LANG: Regex =
        Regex::new(r#"\[(?:code|sourcecode) language="([^"]+)"\]"#).unwrap();
    static ref CODE_OPEN: Regex = Regex::new(r"\[(?:code|sourcecode)\]").unwrap();
    static ref CODE_CLOSE: Regex = Regex::new(r"\[/(?:code|sourcecode)\]").unwrap();
    static ref BASH_OPEN: Regex = Regex::new(r"\[bash\]").unwrap();
    static ref BASH_CLOSE: Regex = Regex::new(r"\[/bash\]").unwrap();
    static ref CAPTION_OPEN: Regex = Regex::new(r"\[caption[^\]]*\]").unwrap();
    static ref CAPTION_CLOSE: Regex = Regex::new(r"\[/caption\]").unwrap();
    static ref QUOTE_NAMED: Regex =
        Regex::new(r#"(?s)\[quote[^\]]*name="([^"]*)"[^\]]*\](.*?)\[/quote\]"#).unwrap();
    static ref QUOTE_PLAIN: Regex = Regex::new(r"(?s)\[quote[^\]]*\](.*?)\[/quote\]").unwrap();
    static ref LINKED_IMAGE: Regex =
        Regex::new(r"(?s)<a(?:\s[^>]*)?>\s*(<img[^>]*/?>)\s*</a>").unwrap();
}

/// Rewrite the recognized WordPress shortcodes into their HTML equivalents.
///
/// Also unwraps anchors that contain nothing but a single `<img>`, so the
/// Markdown converter sees a bare image instead of a linked one.
pub fn normalize_shortcodes(html: &str) -> String {
    let html = CODE_LANG.replace_all(html, r#"<pre><code class="language-$1">"#);
    let html = CODE_OPEN.replace_all(&html, "<pre><code>");
    let html = CODE_CLOSE.replace_all(&html, "</code></pre>");
    let html = BASH_OPEN.replace_all(&html, r#"<pre><code class="language-bash">"#);
    let html = BASH_CLOSE.replace_all(&html, "</code></pre>");
    let html = CAPTION_OPEN.replace_all(&html, "<div>");
    let html = CAPTION_CLOSE.replace_all(&html, "</div>");
    let html = QUOTE_NAMED.replace_all(
        &html,
        "<blockquote><p>$2<br/><br/><cite>$1</cite></p></blockquote>",
    );
    let html = QUOTE_PLAIN.replace_all(&html, "<blockquote><p>$1</p></blockquote>");
    let html = LINKED_IMAGE.replace_all(&html, "$1");
    html.into_owned()
}
