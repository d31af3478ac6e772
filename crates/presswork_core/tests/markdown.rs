use presswork_core::{
    extract_images, normalize_shortcodes, rewrite_image_urls, Converter, RuleBasedConverter,
};
use pretty_assertions::assert_eq;

fn convert(html: &str) -> String {
    RuleBasedConverter::new().to_markdown(html)
}

#[test]
fn headings_use_atx_style() {
    assert_eq!(convert("<h1>Hello</h1><p>world</p>"), "# Hello\n\nworld");
    assert_eq!(convert("<h3>Deep</h3>"), "### Deep");
}

#[test]
fn strong_content_is_trimmed() {
    assert_eq!(convert("<p><strong>  bold  </strong></p>"), "**bold**");
    assert_eq!(convert("<b>also bold</b>"), "**also bold**");
}

#[test]
fn emphasis_and_links_render_inline() {
    assert_eq!(
        convert(r#"<p>Go <a href="http://x">here</a> <em>now</em></p>"#),
        "Go [here](http://x) *now*"
    );
}

#[test]
fn multi_line_pre_becomes_a_fenced_block() {
    assert_eq!(
        convert("<pre>line one\nline two</pre>"),
        "```\nline one\nline two\n```"
    );
}

#[test]
fn single_line_pre_becomes_inline_code() {
    assert_eq!(convert("<pre>ls -la</pre>"), "`ls -la`");
}

#[test]
fn single_line_code_becomes_inline_code() {
    assert_eq!(convert("<p>Run <code>make</code> first</p>"), "Run `make` first");
}

#[test]
fn pre_wrapping_code_is_not_double_wrapped() {
    assert_eq!(convert("<pre><code>a\nb</code></pre>"), "```\na\nb\n```");
}

#[test]
fn normalized_code_shortcode_ends_as_a_fenced_block() {
    let html = normalize_shortcodes(r#"[code language="js"]x[/code]"#);
    assert_eq!(convert(&html), "```js\nx\n```");
}

#[test]
fn styled_spans_pass_through_as_html() {
    assert_eq!(
        convert(r#"<p><span style="color: red">warn</span></p>"#),
        r#"<span style="color: red">warn</span>"#
    );
}

#[test]
fn plain_spans_flatten_to_text() {
    assert_eq!(convert("<p><span>just text</span></p>"), "just text");
    assert_eq!(convert(r#"<p><span class="">empty attr</span></p>"#), "empty attr");
}

#[test]
fn images_render_with_alt_text() {
    assert_eq!(
        convert(r#"<p><img src="./y.png" alt="pic"/></p>"#),
        "![pic](./y.png)"
    );
}

#[test]
fn lists_render_with_markers() {
    assert_eq!(convert("<ul><li>one</li><li>two</li></ul>"), "- one\n- two");
    assert_eq!(convert("<ol><li>one</li><li>two</li></ol>"), "1. one\n2. two");
}

#[test]
fn blockquotes_prefix_every_line() {
    assert_eq!(
        convert("<blockquote><p>a</p><p>b</p></blockquote>"),
        "> a\n>\n> b"
    );
}

#[test]
fn markdown_structure_characters_are_escaped() {
    assert_eq!(convert("<p>5 * 3 = 15</p>"), "5 \\* 3 = 15");
    assert_eq!(convert("<p>snake_case</p>"), "snake\\_case");
}

#[test]
fn escaping_never_reaches_code_content() {
    assert_eq!(convert("<pre>a * b\nc_d</pre>"), "```\na * b\nc_d\n```");
}

#[test]
fn malformed_html_degrades_to_text() {
    assert_eq!(convert("<p>unclosed <em>text"), "unclosed *text*");
    assert_eq!(convert("</div></p>stray end tags"), "stray end tags");
}

#[test]
fn scripts_and_styles_are_dropped() {
    assert_eq!(
        convert("<p>keep</p><script>alert(1)</script><style>p{}</style>"),
        "keep"
    );
}

#[test]
fn shortcode_image_pipeline_produces_local_references() {
    let html = r#"<p>Hello <img src="http://cdn/x/y.png"/></p>"#;
    let normalized = normalize_shortcodes(html);
    let images = extract_images(&normalized);
    let rewritten = rewrite_image_urls(&normalized, &images);
    assert_eq!(convert(&rewritten), "Hello ![](./y.png)");
}
