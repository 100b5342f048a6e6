use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::ingestion::{NewsError, NewsFetcher, NewsItem};
use crate::llm::{LlmProvider, LlmRequest};
use crate::persona::Persona;
use crate::prompt::dialogue_prompt;
use crate::tidy::tidy_news;

/// Canned exchange shown when generation fails, in speaking order.
const FALLBACK_LINES: [(Persona, &str); 4] = [
    (
        Persona::Sagredo,
        "Eu li os jornais hoje, ô, caras. Parece que a China está construindo um supercomputador no espaço.",
    ),
    (
        Persona::Salvati,
        "Isso representa a mais recente etapa da automação da vigilância. O capital agora opera até fora da Terra.",
    ),
    (
        Persona::Simplicio,
        "Mas será que isso não representa progresso? Eles estão apenas inovando com liberdade.",
    ),
    (
        Persona::Sagredo,
        "Liberdade ou dominação computacional orbital? Eis a questão.",
    ),
];

/// The fallback dialogue, one `<p>` per line. Same output on every call.
pub fn fallback_dialogue() -> String {
    FALLBACK_LINES
        .iter()
        .map(|(persona, line)| format!("<p>{} {}</p>", persona.label(), line))
        .collect()
}

/// How one dialogue request ended.
#[derive(Debug)]
pub enum DialogueOutcome {
    /// The backend answered; `html` is its reply untouched.
    Generated { news: NewsItem, html: String },
    /// The backend failed for this item; the fallback dialogue stands in.
    Fallback { news: NewsItem, error: anyhow::Error },
    /// No news item could be obtained, so nothing was generated.
    NoNews,
}

/// Result of `generate_dialogue`. `fetched` is set when the pipeline had to
/// fetch the news itself, so the news panel can be refreshed as well.
#[derive(Debug)]
pub struct DialogueRun {
    pub fetched: Option<Result<NewsItem, NewsError>>,
    pub outcome: DialogueOutcome,
}

/// Result of the initial load: the fetch, and the dialogue if the fetch succeeded.
#[derive(Debug)]
pub struct PageLoad {
    pub news: Result<NewsItem, NewsError>,
    pub dialogue: Option<DialogueOutcome>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    pub clean_news: bool,
}

pub struct DialoguePipeline {
    fetcher: NewsFetcher,
    provider: Arc<dyn LlmProvider>,
    options: PipelineOptions,
}

impl DialoguePipeline {
    pub fn new(fetcher: NewsFetcher, provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            fetcher,
            provider,
            options: PipelineOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Fetch the news once and, if that worked, stage the first dialogue.
    pub async fn page_load(&self) -> PageLoad {
        let news = self.fetcher.fetch_latest().await;
        let dialogue = match &news {
            Ok(item) => Some(self.dialogue_for(item.clone()).await),
            Err(_) => None,
        };
        PageLoad { news, dialogue }
    }

    /// Produce a dialogue for `news`, fetching the latest item first when none is given.
    pub async fn generate_dialogue(&self, news: Option<NewsItem>) -> DialogueRun {
        let (item, fetched) = match news {
            Some(item) => (item, None),
            None => match self.fetcher.fetch_latest().await {
                Ok(item) => (item.clone(), Some(Ok(item))),
                Err(e) => {
                    warn!("no news item available, dialogue not generated: {}", e);
                    return DialogueRun {
                        fetched: Some(Err(e)),
                        outcome: DialogueOutcome::NoNews,
                    };
                }
            },
        };

        DialogueRun {
            fetched,
            outcome: self.dialogue_for(item).await,
        }
    }

    async fn dialogue_for(&self, news: NewsItem) -> DialogueOutcome {
        let prompt = if self.options.clean_news {
            dialogue_prompt(&tidy_news(&news))
        } else {
            dialogue_prompt(&news)
        };

        let start = Instant::now();
        match self.provider.generate(LlmRequest::new(prompt)).await {
            Ok(response) => {
                info!(
                    provider = self.provider.name(),
                    model = %response.model,
                    duration_ms = start.elapsed().as_millis() as u64,
                    total_tokens = response.usage.total_tokens,
                    "dialogue generated"
                );
                DialogueOutcome::Generated {
                    news,
                    html: response.content,
                }
            }
            Err(e) => {
                error!(provider = self.provider.name(), "dialogue generation failed, using fallback: {:#}", e);
                DialogueOutcome::Fallback { news, error: e }
            }
        }
    }
}
