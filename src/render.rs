//! Rendering of search results: indented names and the HTML search page.

use crate::tree::DisplayRecord;
use html_escape::{encode_double_quoted_attribute, encode_text};

pub const EMPTY_MESSAGE: &str = "No results found for your search.";

const INDENT_TOKEN: &str = "- ";

/// Name as shown in the tree: `"- "` once per level, depth 0 shown bare.
pub fn display_name(item: &DisplayRecord) -> String {
    if item.depth == 0 {
        return item.name.clone();
    }
    format!("{}{}", INDENT_TOKEN.repeat(item.depth), item.name)
}

/// What the page shows below the search form.
#[derive(Debug, Clone, Copy)]
pub enum SearchOutcome<'a> {
    /// No search submitted yet.
    NotSearched,
    Found(&'a [DisplayRecord]),
    Failed(&'a str),
}

/// Render the full search page. `query` pre-fills the input.
pub fn render_page(query: &str, outcome: SearchOutcome<'_>) -> String {
    let mut html = String::with_capacity(2048);
    html.push_str(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Course Tree Search</title>
</head>
<body>
<div class="app">
<header class="app-header">
<h1>Course Tree Search</h1>
<p class="app-subtitle">Search for course items and view their hierarchical structure</p>
</header>
<main class="app-main">
"#,
    );

    html.push_str(&format!(
        r#"<form method="get" action="/" class="search-form">
<div class="search-input-container">
<input type="text" name="query" value="{}" placeholder="Enter search term (e.g. 'Lab')" class="search-input" aria-label="Search course tree">
<button type="submit" class="search-button">Search</button>
</div>
</form>
"#,
        encode_double_quoted_attribute(query)
    ));

    match outcome {
        SearchOutcome::NotSearched => {}
        SearchOutcome::Failed(message) => {
            html.push_str(&format!(
                "<div class=\"error-message\" role=\"alert\">\n<p class=\"error-text\">{}</p>\n</div>\n",
                encode_text(message)
            ));
        }
        SearchOutcome::Found(items) => html.push_str(&render_tree(items)),
    }

    html.push_str("</main>\n</div>\n</body>\n</html>\n");
    html
}

/// Tree list markup, or the empty-state message when there is nothing to show.
pub fn render_tree(items: &[DisplayRecord]) -> String {
    if items.is_empty() {
        return format!("<div class=\"course-tree-empty\">{}</div>\n", EMPTY_MESSAGE);
    }

    let mut html = String::from("<div class=\"course-tree\" role=\"tree\">\n");
    for item in items {
        html.push_str(&format!(
            "<div class=\"course-tree-item\" style=\"padding-left: {}rem\">{}</div>\n",
            item.depth as f64 * 1.5,
            encode_text(&display_name(item))
        ));
    }
    html.push_str("</div>\n");
    html
}
