//! Deterministic provider: answers every prompt with the same text (or the
//! same failure), optionally after a fixed delay. Backs the `simulated` and
//! `failing` adapters and stands in for the network in tests.

use anyhow::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

use super::{LlmProvider, LlmRequest, LlmResponse, UsageMetadata};

/// Canned exchange about the orbital supercomputer. It ignores whatever news
/// item was prompted.
pub const SIMULATED_DIALOGUE: &str = r#"
    <p><strong>Sagredo:</strong> Eu li os jornais hoje, ô, caras. A China agora quer processar dados no espaço, longe dos nossos olhos.</p>
    <p><strong>Salvati:</strong> É a expansão inevitável do complexo industrial-tecnológico. O capital não conhece fronteiras, nem mesmo a gravidade. A vigilância se torna celestial.</p>
    <p><strong>Simplicio:</strong> Vejo como um avanço notável. A competição impulsiona a inovação. Se não limitarmos o progresso com ideologias, todos nos beneficiaremos da soberania tecnológica.</p>
    <p><strong>Sagredo:</strong> Soberania ou o panóptico orbital definitivo? Fico imaginando o absurdo de um erro de '404 Not Found' em plena órbita.</p>
  "#;

/// Latency of the simulated backend.
pub const SIMULATED_LATENCY: Duration = Duration::from_millis(1500);

enum Script {
    Reply(String),
    Fail(String),
}

pub struct ScriptedProvider {
    script: Script,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl ScriptedProvider {
    /// Always answers with `reply`.
    pub fn replying(reply: impl Into<String>) -> Self {
        Self::with_script(Script::Reply(reply.into()))
    }

    /// Always fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_script(Script::Fail(message.into()))
    }

    /// The orbital-supercomputer stand-in with its 1.5s latency.
    pub fn simulated() -> Self {
        Self::replying(SIMULATED_DIALOGUE).with_delay(SIMULATED_LATENCY)
    }

    fn with_script(script: Script) -> Self {
        Self {
            script,
            delay: None,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `generate` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_prompt(&self, prompt: String) {
        match self.last_prompt.lock() {
            Ok(mut slot) => *slot = Some(prompt),
            Err(poisoned) => *poisoned.into_inner() = Some(prompt),
        }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt
            .lock()
            .map(|p| p.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

#[async_trait::async_trait]
impl LlmProvider for ScriptedProvider {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        debug!(prompt_chars = request.prompt.len(), "scripted provider received prompt");
        self.record_prompt(request.prompt);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.script {
            Script::Reply(text) => Ok(LlmResponse {
                content: text.clone(),
                usage: UsageMetadata::default(),
                model: "scripted".to_string(),
            }),
            Script::Fail(message) => anyhow::bail!("{}", message),
        }
    }

    fn name(&self) -> &str {
        match self.script {
            Script::Reply(_) => "scripted",
            Script::Fail(_) => "failing",
        }
    }
}
