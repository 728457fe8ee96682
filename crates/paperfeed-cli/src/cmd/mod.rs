pub mod fetch;
pub mod latest;
pub mod probe;
pub mod serve;

use anyhow::Result;
use comfy_table::{
    Cell, Color, ContentArrangement, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
};

use paperfeed_arxiv::Article;

const TITLE_WIDTH: usize = 72;

fn styled_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.iter().map(|h| Cell::new(h).fg(Color::Cyan)));
    table
}

/// Print a key-value summary table on stderr
pub fn print_summary(title: &str, rows: &[(&str, String)]) {
    let mut table = styled_table(&[title, "Value"]);
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    eprintln!("\n{table}");
}

/// Print articles on stdout, as a table or one JSON array
pub fn print_articles(articles: &[Article], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(articles)?);
        return Ok(());
    }
    if articles.is_empty() {
        eprintln!("No papers.");
        return Ok(());
    }

    let mut table = styled_table(&["Published", "Title", "Authors", "Link"]);
    for article in articles {
        table.add_row(vec![
            Cell::new(article.published.format("%Y-%m-%d %H:%M")),
            Cell::new(truncate(&article.title, TITLE_WIDTH)),
            Cell::new(authors_short(&article.authors)),
            Cell::new(&article.link),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

fn authors_short(authors: &[String]) -> String {
    match authors {
        [] => String::new(),
        [one] => one.clone(),
        [first, rest @ ..] => format!("{first} +{}", rest.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_on_char_boundary() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("ééééé", 2), "éé...");
    }

    #[test]
    fn authors_abbreviated() {
        assert_eq!(authors_short(&[]), "");
        assert_eq!(authors_short(&["A. Author".to_string()]), "A. Author");
        assert_eq!(
            authors_short(&["A".to_string(), "B".to_string(), "C".to_string()]),
            "A +2"
        );
    }
}
