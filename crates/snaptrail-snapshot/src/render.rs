//! HTML rendering of unified diffs.

const DIFF_CSS: &str = r#"<style>
.diff {
    font-family: monospace;
    white-space: pre;
    margin: 0;
    padding: 10px;
    background-color: #f8f8f8;
    border: 1px solid #ddd;
    border-radius: 3px;
}
.added {
    background-color: #e6ffed;
    color: #22863a;
    display: block;
}
.removed {
    background-color: #ffeef0;
    color: #cb2431;
    display: block;
}
.info {
    color: #6f42c1;
    display: block;
}
</style>
"#;

/// Escape `& < > " '` for HTML text and attribute content.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Stylesheet followed by a `<pre class="diff">` block.
///
/// Added, removed and `@` lines are wrapped in `added`, `removed` and `info`
/// spans; everything else is emitted escaped as-is.
pub fn html_fragment(diff: &str) -> String {
    let mut lines = vec![r#"<pre class="diff">"#.to_string()];
    for line in diff.split('\n') {
        let class = if line.starts_with('+') {
            Some("added")
        } else if line.starts_with('-') {
            Some("removed")
        } else if line.starts_with('@') {
            Some("info")
        } else {
            None
        };
        let escaped = escape_html(line);
        lines.push(match class {
            Some(class) => format!(r#"<span class="{class}">{escaped}</span>"#),
            None => escaped,
        });
    }
    lines.push("</pre>".to_string());

    format!("{DIFF_CSS}{}", lines.join("\n"))
}

/// Standalone HTML document around [`html_fragment`].
pub fn html_page(diff: &str, title: &str) -> String {
    let title = escape_html(title);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
</head>
<body>
    <h1>{title}</h1>
{}
</body>
</html>
"#,
        html_fragment(diff)
    )
}
