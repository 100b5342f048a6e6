use std::sync::Arc;
use std::time::Duration;

use common::FeedMode;
use mockito::Matcher;
use newsdialogue::dialogue::{fallback_dialogue, DialogueOutcome, DialoguePipeline, PipelineOptions};
use newsdialogue::ingestion::{NewsFetcher, NewsItem};
use newsdialogue::llm::scripted::{ScriptedProvider, SIMULATED_DIALOGUE};
use newsdialogue::persona::Persona;
use newsdialogue::render::{
    dialogue_region, Regions, RenderOptions, GENERATION_ERROR, NEWS_ERROR, NO_NEWS_FOR_DIALOGUE,
};

const FEED_URL: &str = "https://g1.globo.com/rss/g1/tecnologia/";

fn fetcher_for(server: &mockito::Server) -> NewsFetcher {
    NewsFetcher::new(
        FeedMode::Converter,
        FEED_URL,
        format!("{}/v1/api.json", server.url()),
        Some(5),
    )
    .expect("fetcher")
}

/// Fetcher pointed at a port where nothing answers, for paths that must not fetch
fn offline_fetcher() -> NewsFetcher {
    NewsFetcher::new(FeedMode::Converter, FEED_URL, "http://127.0.0.1:9/v1/api.json", Some(2))
        .expect("fetcher")
}

fn item(title: &str, content: &str) -> NewsItem {
    NewsItem {
        title: title.to_string(),
        content: content.to_string(),
        link: "https://g1.globo.com/tecnologia/noticia/x.ghtml".to_string(),
    }
}

#[tokio::test]
async fn test_generated_html_is_rendered_verbatim() {
    let reply = "<p><strong>Sagredo:</strong> S</p>\n<p><strong>Salvati:</strong> S</p>";
    let provider = Arc::new(ScriptedProvider::replying(reply));
    let pipeline = DialoguePipeline::new(offline_fetcher(), provider.clone());

    let run = pipeline.generate_dialogue(Some(item("T", "C"))).await;

    assert!(run.fetched.is_none());
    assert!(matches!(run.outcome, DialogueOutcome::Generated { .. }));
    assert_eq!(dialogue_region(&run.outcome, RenderOptions::default()), reply);
    assert_eq!(provider.calls(), 1);

    let prompt = provider.last_prompt().expect("prompt sent");
    assert!(prompt.contains("\"T\""));
    assert!(prompt.contains("\"C\""));
}

#[tokio::test]
async fn test_generation_failure_renders_fallback() {
    let provider = Arc::new(ScriptedProvider::failing("backend unreachable"));
    let pipeline = DialoguePipeline::new(offline_fetcher(), provider.clone());

    let first = pipeline.generate_dialogue(Some(item("T", "C"))).await;
    let second = pipeline.generate_dialogue(Some(item("Outra", "Coisa"))).await;

    let first_html = dialogue_region(&first.outcome, RenderOptions::default());
    let second_html = dialogue_region(&second.outcome, RenderOptions::default());

    match &first.outcome {
        DialogueOutcome::Fallback { news, error } => {
            assert_eq!(news.title, "T");
            assert!(error.to_string().contains("backend unreachable"));
        }
        other => panic!("expected fallback, got {:?}", other),
    }

    assert_eq!(first_html, format!("{}{}", GENERATION_ERROR, fallback_dialogue()));
    assert_eq!(first_html, second_html);
    for persona in Persona::ALL {
        assert!(first_html.contains(&persona.label()));
    }
    // one call per invocation, no retries
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn test_no_news_never_calls_generator() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/v1/api.json")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"status":"ok","items":[]}"#)
        .create_async()
        .await;

    let provider = Arc::new(ScriptedProvider::replying("<p>never</p>"));
    let pipeline = DialoguePipeline::new(fetcher_for(&server), provider.clone());

    let run = pipeline.generate_dialogue(None).await;

    assert!(matches!(run.outcome, DialogueOutcome::NoNews));
    assert!(matches!(run.fetched, Some(Err(_))));
    assert_eq!(dialogue_region(&run.outcome, RenderOptions::default()), NO_NEWS_FOR_DIALOGUE);
    assert_eq!(provider.calls(), 0);

    let mut regions = Regions::default();
    regions.apply_run(&run, RenderOptions::default());
    assert_eq!(regions.news_html, NEWS_ERROR);
    assert_eq!(regions.dialogue_html, NO_NEWS_FOR_DIALOGUE);
}

#[tokio::test]
async fn test_missing_item_triggers_fresh_fetch() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/api.json")
        .match_query(Matcher::UrlEncoded("rss_url".into(), FEED_URL.into()))
        .with_status(200)
        .with_body(r#"{"status":"ok","items":[{"title":"Fresco","description":"Novo resumo","link":"https://x"}]}"#)
        .expect(1)
        .create_async()
        .await;

    let provider = Arc::new(ScriptedProvider::replying("<p>ok</p>"));
    let pipeline = DialoguePipeline::new(fetcher_for(&server), provider.clone());

    let run = pipeline.generate_dialogue(None).await;

    match &run.fetched {
        Some(Ok(news)) => assert_eq!(news.title, "Fresco"),
        other => panic!("expected fetched item, got {:?}", other),
    }
    assert!(provider.last_prompt().unwrap().contains("\"Novo resumo\""));

    let mut regions = Regions::default();
    regions.apply_run(&run, RenderOptions::default());
    assert!(regions.news_html.starts_with("<h3>Fresco</h3>"));
    assert_eq!(regions.dialogue_html, "<p>ok</p>");
    assert!(regions.updated_at.is_some());

    mock.assert_async().await;
}

#[tokio::test]
async fn test_page_load_skips_dialogue_when_fetch_fails() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/v1/api.json")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let provider = Arc::new(ScriptedProvider::replying("<p>never</p>"));
    let pipeline = DialoguePipeline::new(fetcher_for(&server), provider.clone());

    let load = pipeline.page_load().await;
    assert!(load.news.is_err());
    assert!(load.dialogue.is_none());
    assert_eq!(provider.calls(), 0);

    let mut regions = Regions::default();
    regions.apply_page_load(&load, RenderOptions::default());
    assert_eq!(regions.news_html, NEWS_ERROR);
    assert_eq!(regions.dialogue_html, Regions::default().dialogue_html);
}

#[tokio::test]
async fn test_clean_news_option_tidies_prompt_only() {
    let provider = Arc::new(ScriptedProvider::replying("<p>ok</p>"));
    let pipeline = DialoguePipeline::new(offline_fetcher(), provider.clone())
        .with_options(PipelineOptions { clean_news: true });

    let news = item(
        "Startup brasileira capta US$ 10 milhões - Exame",
        "<p>Rodada foi liderada por fundo <b>americano</b> e inclui novos sócios.</p>",
    );
    let run = pipeline.generate_dialogue(Some(news.clone())).await;

    let prompt = provider.last_prompt().unwrap();
    assert!(prompt.contains("\"Startup brasileira capta US$ 10 milhões\""));
    assert!(prompt.contains("\"Rodada foi liderada por fundo americano e inclui novos sócios.\""));

    // the item carried in the outcome is the one fetched, untouched
    match run.outcome {
        DialogueOutcome::Generated { news: carried, .. } => assert_eq!(carried, news),
        other => panic!("expected generated, got {:?}", other),
    }
}

#[tokio::test]
async fn test_end_to_end_with_simulated_backend() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/v1/api.json")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"status":"ok","items":[{"title":"China lança supercomputador orbital","description":"Resumo X","link":"https://g1.globo.com/orbital"}]}"#,
        )
        .create_async()
        .await;

    let provider = Arc::new(ScriptedProvider::replying(SIMULATED_DIALOGUE).with_delay(Duration::from_millis(50)));
    let pipeline = DialoguePipeline::new(fetcher_for(&server), provider.clone());

    let load = pipeline.page_load().await;
    let mut regions = Regions::default();
    regions.apply_page_load(&load, RenderOptions::default());

    assert_eq!(
        regions.news_html,
        r#"<h3>China lança supercomputador orbital</h3><p>Resumo X</p><p><a href="https://g1.globo.com/orbital" target="_blank">Leia mais</a></p>"#
    );
    assert_eq!(regions.dialogue_html, SIMULATED_DIALOGUE);
    assert_eq!(provider.calls(), 1);
}
