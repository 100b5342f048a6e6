use common::{Config, FeedConfig};
use newsdialogue::ingestion::NewsFetcher;
use newsdialogue::prompt::dialogue_prompt;
use newsdialogue::tidy::tidy_news;

/// Smoke check: fetch the configured feed once and print what the dialogue would be built from.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let feed = match std::env::args().nth(1) {
        Some(path) => Config::from_file(path).await?.feed,
        None => FeedConfig::default(),
    };

    println!("\n{}", "=".repeat(60));
    println!("Feed: {} ({:?})", feed.rss_url(), feed.mode);
    println!("{}", "=".repeat(60));

    let fetcher = NewsFetcher::from_config(&feed)?;
    match fetcher.fetch_latest().await {
        Ok(item) => {
            println!("✓ Success!");
            println!("  Title: {}", item.title);
            println!("  Link: {}", item.link);
            println!("  Content: {} chars", item.content.len());

            let tidy = tidy_news(&item);
            println!("\n  Tidied title: {}", tidy.title);
            println!("  Tidied content: {}", tidy.content);

            println!("\n[Prompt]\n{}", dialogue_prompt(&item));
        }
        Err(e) => {
            println!("✗ Failed: {}", e);
        }
    }

    Ok(())
}
