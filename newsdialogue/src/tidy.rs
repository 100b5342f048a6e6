//! Optional clean-up of a feed item before it goes into the prompt.
//! Aggregator feeds append the outlet to the title and often repeat the
//! title, marked up, as the summary.

use scraper::Html;

use crate::ingestion::NewsItem;

const TRUNCATED_TITLE_NOTE: &str = " (título completo no link)";
const TRUNCATED_SUMMARY_NOTE: &str = " (continuação disponível na matéria original)";
const MIN_SUMMARY_WORDS: usize = 4;

/// Tidied copy of `item`; the link is kept as is.
pub fn tidy_news(item: &NewsItem) -> NewsItem {
    let mut title = strip_source_suffix(&item.title).to_string();
    let mut content = html_to_text(&item.content);

    let common = common_prefix_len_ignore_case(&title, &content);
    let title_len = title.chars().count();
    if title_len > 0 && common as f64 / title_len as f64 > 0.9 {
        content = content
            .chars()
            .skip(common)
            .collect::<String>()
            .trim_start_matches([' ', '-', '–', '—', ':'])
            .trim()
            .to_string();
    }

    if content.split_whitespace().count() < MIN_SUMMARY_WORDS {
        content.clear();
    }

    if title.ends_with("...") {
        title.push_str(TRUNCATED_TITLE_NOTE);
    }
    if content.ends_with("...") {
        content.push_str(TRUNCATED_SUMMARY_NOTE);
    }

    NewsItem {
        title,
        content,
        link: item.link.clone(),
    }
}

/// "Headline - Outlet" -> "Headline"
fn strip_source_suffix(title: &str) -> &str {
    match title.find(" - ") {
        Some(idx) => title[..idx].trim(),
        None => title.trim(),
    }
}

fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text = fragment.root_element().text().collect::<Vec<_>>().join(" ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Length, in chars, of the case-insensitive common prefix.
fn common_prefix_len_ignore_case(a: &str, b: &str) -> usize {
    a.chars()
        .zip(b.chars())
        .take_while(|(x, y)| x.to_lowercase().eq(y.to_lowercase()))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, content: &str) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            content: content.to_string(),
            link: "https://example.com/a".to_string(),
        }
    }

    #[test]
    fn strips_outlet_and_markup() {
        let tidy = tidy_news(&item(
            "Satélite brasileiro entra em órbita - G1",
            "<p>O lançamento ocorreu <b>nesta manhã</b> em Alcântara, sem atrasos.</p>",
        ));
        assert_eq!(tidy.title, "Satélite brasileiro entra em órbita");
        assert_eq!(tidy.content, "O lançamento ocorreu nesta manhã em Alcântara, sem atrasos.");
        assert_eq!(tidy.link, "https://example.com/a");
    }

    #[test]
    fn drops_summary_that_repeats_the_title() {
        let tidy = tidy_news(&item(
            "Nova lei de IA aprovada - Folha",
            "<a href=\"x\">NOVA LEI DE IA APROVADA</a> - Folha de S.Paulo",
        ));
        // what survives after the echoed title is too short to keep
        assert_eq!(tidy.content, "");
    }

    #[test]
    fn keeps_remainder_after_echoed_title() {
        let tidy = tidy_news(&item(
            "Nova lei de IA aprovada",
            "Nova lei de IA aprovada: texto segue agora para sanção presidencial",
        ));
        assert_eq!(tidy.content, "texto segue agora para sanção presidencial");
    }

    #[test]
    fn annotates_truncation() {
        let tidy = tidy_news(&item("Governo anuncia...", "Medidas incluem cortes e novos investimentos..."));
        assert!(tidy.title.ends_with(TRUNCATED_TITLE_NOTE));
        assert!(tidy.content.ends_with(TRUNCATED_SUMMARY_NOTE));
    }

    #[test]
    fn common_prefix_counts_chars() {
        assert_eq!(common_prefix_len_ignore_case("Ação", "AÇÃO final"), 4);
        assert_eq!(common_prefix_len_ignore_case("abc", "xbc"), 0);
    }
}
