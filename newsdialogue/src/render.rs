//! Everything that turns pipeline results into HTML. The pipeline itself
//! never touches markup beyond what the backend returns.

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Utc, Weekday};
use chrono_tz::America::Sao_Paulo;
use serde::Serialize;

use crate::dialogue::{fallback_dialogue, DialogueOutcome, DialogueRun, PageLoad};
use crate::ingestion::{NewsError, NewsItem};
use crate::persona::Persona;
use std::path::Path;

pub const NEWS_ERROR: &str =
    r#"<p style="color: red;">Falha ao carregar a notícia. Tente novamente mais tarde.</p>"#;
pub const NO_NEWS_FOR_DIALOGUE: &str =
    "<p>Não foi possível obter uma notícia para gerar o diálogo.</p>";
pub const GENERATION_ERROR: &str = r#"<p style="color: red;">Ocorreu um erro ao contatar a IA. O diálogo simulado será exibido.</p>"#;
pub const NEWS_PENDING: &str = "<h4>Buscando notícia relevante...</h4>";
pub const DIALOGUE_PENDING: &str = "<p><em>Nenhum diálogo gerado ainda.</em></p>";

/// Contents of the two page regions: `noticia-texto` and `falas`.
#[derive(Debug, Clone, Serialize)]
pub struct Regions {
    pub news_html: String,
    pub dialogue_html: String,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for Regions {
    fn default() -> Self {
        Self {
            news_html: NEWS_PENDING.to_string(),
            dialogue_html: DIALOGUE_PENDING.to_string(),
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub decorate_icons: bool,
}

impl Regions {
    pub fn apply_page_load(&mut self, load: &PageLoad, opts: RenderOptions) {
        self.news_html = news_panel(&load.news);
        if let Some(outcome) = &load.dialogue {
            self.dialogue_html = dialogue_region(outcome, opts);
        }
        self.updated_at = Some(Utc::now());
    }

    pub fn apply_run(&mut self, run: &DialogueRun, opts: RenderOptions) {
        if let Some(fetched) = &run.fetched {
            self.news_html = news_panel(fetched);
        }
        self.dialogue_html = dialogue_region(&run.outcome, opts);
        self.updated_at = Some(Utc::now());
    }
}

/// Title, summary and a "Leia mais" link, or the failure notice.
pub fn news_panel(news: &Result<NewsItem, NewsError>) -> String {
    match news {
        Ok(item) => format!(
            r#"<h3>{}</h3><p>{}</p><p><a href="{}" target="_blank">Leia mais</a></p>"#,
            item.title, item.content, item.link
        ),
        Err(_) => NEWS_ERROR.to_string(),
    }
}

/// What the dialogue region shows for `outcome`.
pub fn dialogue_region(outcome: &DialogueOutcome, opts: RenderOptions) -> String {
    match outcome {
        DialogueOutcome::Generated { html, .. } if opts.decorate_icons => decorate_with_icons(html),
        DialogueOutcome::Generated { html, .. } => html.clone(),
        DialogueOutcome::Fallback { .. } => format!("{}{}", GENERATION_ERROR, fallback_dialogue()),
        DialogueOutcome::NoNews => NO_NEWS_FOR_DIALOGUE.to_string(),
    }
}

/// Put each persona's icon in front of its speaker tag, unless the fragment
/// already carries images.
pub fn decorate_with_icons(html: &str) -> String {
    if html.contains("img src=") {
        return html.to_string();
    }
    Persona::ALL.iter().fold(html.to_string(), |acc, persona| {
        let label = persona.label();
        acc.replace(&label, &format!("{}{}", persona.icon_tag(), label))
    })
}

fn weekday_pt(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Segunda-feira",
        Weekday::Tue => "Terça-feira",
        Weekday::Wed => "Quarta-feira",
        Weekday::Thu => "Quinta-feira",
        Weekday::Fri => "Sexta-feira",
        Weekday::Sat => "Sábado",
        Weekday::Sun => "Domingo",
    }
}

/// "Sexta-feira, 16/10/2026, 19:14" in São Paulo time.
pub fn sao_paulo_timestamp(now: DateTime<Utc>) -> String {
    let local = now.with_timezone(&Sao_Paulo);
    format!(
        "{}, {}",
        weekday_pt(local.weekday()),
        local.format("%d/%m/%Y, %H:%M")
    )
}

const PAGE_STYLE: &str = r#"
    body{font-family:Georgia,serif;margin:0;padding:0;background:#fdfdfd;color:#222;font-size:17px;}
    header{background-color:#e3e3e3;padding:1.5em;}
    footer{background-color:#e3e3e3;padding:1em;text-align:center;}
    main{max-width:800px;margin:auto;padding:2em;}
    h1{font-size:2em;text-align:center;}
    .data-hora{font-style:italic;color:#666;font-size:1em;}
    .dialogo p{margin-bottom:1.2em;line-height:1.6;}
    .dialogo strong{color:#2c5aa0;}
    #dialogo{margin-top:2em;}
"#;

/// Whole document around the two regions, with the regenerate button.
pub fn page(regions: &Regions, now: DateTime<Utc>) -> String {
    let stamp = sao_paulo_timestamp(now);
    format!(
        r#"<!DOCTYPE html><html lang="pt"><head><meta charset="UTF-8" /><meta name="viewport" content="width=device-width, initial-scale=1.0" />
<title>Eu li os jornais hoje, ô, cara</title>
<style>{style}</style></head><body>
<header><h1>Eu li os jornais hoje, ô, cara</h1><p style="text-align:center;">"I read the news today, oh, boy" (Lennon/McCartney, A day in the life, 1967)</p></header>
<main>
    <section>
        <span class="data-hora">{stamp}</span>
        <div id="noticia-texto">{news}</div>
    </section>
    <section id="dialogo" class="dialogo">
        <h2>Sagredo, Salvati e Simplício no século 21</h2>
        <div id="falas">{dialogue}</div>
        <form method="post" action="/dialogue"><button type="submit">Gerar novo diálogo</button></form>
    </section>
</main>
<footer><p>Página gerada em {stamp}.</p></footer>
</body></html>
"#,
        style = PAGE_STYLE,
        stamp = stamp,
        news = regions.news_html,
        dialogue = regions.dialogue_html,
    )
}

/// Write the rendered page to `path`, replacing any previous file.
pub async fn write_page(regions: &Regions, path: &Path, now: DateTime<Utc>) -> Result<()> {
    tokio::fs::write(path, page(regions, now))
        .await
        .with_context(|| format!("failed to write page to {}", path.display()))
}
