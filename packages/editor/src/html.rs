//! HTML → markdown conversion for rich clipboard content.
//!
//! This is a tag-level rewrite, not an HTML parser: recognized elements are
//! mapped to their markdown form, everything else is stripped. It never
//! fails; unrecognized markup degrades to plain text.

use regex::Regex;
use std::sync::OnceLock;

struct Rules {
    significant: Regex,
    pre_code: Regex,
    pre: Regex,
    headings: [(Regex, &'static str); 3],
    paragraph: Regex,
    bold: Regex,
    italic: Regex,
    inline_code: Regex,
    line_break: Regex,
    any_tag: Regex,
    blank_runs: Regex,
}

fn rules() -> &'static Rules {
    static RULES: OnceLock<Rules> = OnceLock::new();
    RULES.get_or_init(|| {
        let re = |pattern: &str| Regex::new(pattern).expect("static regex");
        Rules {
            significant: re(r"(?i)<(h[1-3]|p|strong|b|em|i|code|pre|br)(\s[^>]*)?/?>"),
            pre_code: re(r"(?is)<pre(\s[^>]*)?>\s*<code(\s[^>]*)?>(.*?)</code>\s*</pre>"),
            pre: re(r"(?is)<pre(\s[^>]*)?>(.*?)</pre>"),
            headings: [
                (re(r"(?is)<h1(\s[^>]*)?>(.*?)</h1>"), "# "),
                (re(r"(?is)<h2(\s[^>]*)?>(.*?)</h2>"), "## "),
                (re(r"(?is)<h3(\s[^>]*)?>(.*?)</h3>"), "### "),
            ],
            paragraph: re(r"(?is)<p(\s[^>]*)?>(.*?)</p>"),
            bold: re(r"(?is)<(strong|b)(\s[^>]*)?>(.*?)</(strong|b)>"),
            italic: re(r"(?is)<(em|i)(\s[^>]*)?>(.*?)</(em|i)>"),
            inline_code: re(r"(?is)<code(\s[^>]*)?>(.*?)</code>"),
            line_break: re(r"(?i)<br\s*/?>"),
            any_tag: re(r"<[^>]+>"),
            blank_runs: re(r"\n\s*\n\s*\n"),
        }
    })
}

/// Whether the HTML carries any markup that maps to markdown
pub fn has_markdown_markup(html: &str) -> bool {
    rules().significant.is_match(html)
}

/// Convert an HTML fragment to the markdown subset understood by the editor
pub fn html_to_markdown(html: &str) -> String {
    let rules = rules();
    let mut md = html.replace("\r\n", "\n");

    // Fenced blocks first so their inner <code> is not turned into backticks
    md = rules
        .pre_code
        .replace_all(&md, "```\n${3}\n```\n")
        .into_owned();
    md = rules.pre.replace_all(&md, "```\n${2}\n```\n").into_owned();

    for (pattern, prefix) in &rules.headings {
        md = pattern
            .replace_all(&md, format!("{prefix}${{2}}\n").as_str())
            .into_owned();
    }

    md = rules.paragraph.replace_all(&md, "${2}\n").into_owned();
    md = rules.bold.replace_all(&md, "**${3}**").into_owned();
    md = rules.italic.replace_all(&md, "*${3}*").into_owned();
    md = rules.inline_code.replace_all(&md, "`${2}`").into_owned();
    md = rules.line_break.replace_all(&md, "\n").into_owned();
    md = rules.any_tag.replace_all(&md, "").into_owned();
    md = decode_entities(&md);
    md = rules.blank_runs.replace_all(&md, "\n\n").into_owned();

    md.trim().to_string()
}

fn decode_entities(text: &str) -> String {
    // &amp; last so "&amp;lt;" stays "&lt;"
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings_and_paragraphs() {
        let md = html_to_markdown("<h1>Title</h1><p>First</p><h2 class=\"x\">Sub</h2><p>Second</p>");
        assert_eq!(md, "# Title\nFirst\n## Sub\nSecond");
    }

    #[test]
    fn test_inline_formatting() {
        let md = html_to_markdown("<p><strong>bold</strong>, <em>it</em>, <b>b</b>, <i>i</i> and <code>x()</code></p>");
        assert_eq!(md, "**bold**, *it*, **b**, *i* and `x()`");
    }

    #[test]
    fn test_pre_code_becomes_fence() {
        let md = html_to_markdown("<p>Example:</p><pre><code class=\"lang-rs\">let a = 1;\nlet b = 2;</code></pre>");
        assert_eq!(md, "Example:\n```\nlet a = 1;\nlet b = 2;\n```");
    }

    #[test]
    fn test_bare_pre_becomes_fence() {
        let md = html_to_markdown("<pre>raw</pre>");
        assert_eq!(md, "```\nraw\n```");
    }

    #[test]
    fn test_br_and_unknown_tags() {
        let md = html_to_markdown("<div><span>one</span><br>two<br/>three</div>");
        assert_eq!(md, "one\ntwo\nthree");
    }

    #[test]
    fn test_br_is_not_bold() {
        let md = html_to_markdown("a<br>b</b>");
        assert_eq!(md, "a\nb");
    }

    #[test]
    fn test_collapses_blank_runs() {
        let md = html_to_markdown("<p>a</p>\n\n\n\n<p>b</p>");
        assert_eq!(md, "a\n\nb");
    }

    #[test]
    fn test_entities_decoded() {
        let md = html_to_markdown("<p>a &lt; b &amp;&amp; c&nbsp;&gt; d</p>");
        assert_eq!(md, "a < b && c > d");
    }

    #[test]
    fn test_markup_detection() {
        assert!(has_markdown_markup("<h2>x</h2>"));
        assert!(has_markdown_markup("<br/>"));
        assert!(has_markdown_markup("<P class='a'>x</P>"));
        assert!(!has_markdown_markup("<span style=\"x\">plain</span>"));
        assert!(!has_markdown_markup("<meta charset='utf-8'><span>x</span>"));
    }
}
