//! Article cards in Markdown.
//!
//! Each card is:
//!
//! ```text
//! ### [Title](https://link)
//!
//! ![Title](https://image)          (only when the API sent an image)
//!
//! Description
//!
//! *Source: BBC News | Published: 2025-05-06 | Sentiment: Positive (0.50)*
//!
//! ---
//! ```

use crate::models::ArticleRecord;
use crate::sentiment;
use std::fmt::Write;

/// Render `articles` as cards, in input order.
pub fn cards(articles: &[ArticleRecord]) -> String {
    let mut md = String::new();
    for article in articles {
        write_card(&mut md, article);
    }
    md
}

fn write_card(md: &mut String, article: &ArticleRecord) {
    writeln!(md, "### [{}]({})\n", escape_link_text(&article.title), article.url).unwrap();

    if let Some(image) = &article.image_url {
        writeln!(md, "![{}]({})\n", escape_link_text(&article.title), image).unwrap();
    }

    writeln!(md, "{}\n", article.description).unwrap();
    writeln!(md, "*{}*\n", caption(article)).unwrap();
    writeln!(md, "---\n").unwrap();
}

/// `Source: X | Published: YYYY-MM-DD | Sentiment: ...`, skipping the parts
/// that are unknown.
pub fn caption(article: &ArticleRecord) -> String {
    let mut parts = vec![format!("Source: {}", article.source_name)];
    let date = article.published_date();
    if !date.is_empty() {
        parts.push(format!("Published: {date}"));
    }
    if article.sentiment_score.is_some() {
        parts.push(format!("Sentiment: {}", sentiment::describe(article.sentiment_score)));
    }
    parts.join(" | ")
}

fn escape_link_text(text: &str) -> String {
    text.replace('[', "\\[").replace(']', "\\]")
}
