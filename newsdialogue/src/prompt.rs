use crate::ingestion::NewsItem;
use crate::persona::Persona;

/// Stand-in for an empty summary, so the model knows to work from the title alone.
pub const MISSING_SUMMARY: &str =
    "(O resumo da notícia não foi fornecido. Baseie o diálogo apenas no título.)";

/// Screenwriter prompt for one news item: title and summary quoted, each
/// persona's stance, and the `<p><strong>Name:</strong> ...</p>` answer format.
pub fn dialogue_prompt(news: &NewsItem) -> String {
    let summary = if news.content.trim().is_empty() {
        MISSING_SUMMARY
    } else {
        news.content.as_str()
    };

    let mut personas = String::new();
    for persona in Persona::ALL {
        personas.push_str(&format!("- {}: {}", persona.name(), persona.stance()));
        if let Some(line) = persona.opening_line() {
            personas.push_str(&format!(" Ele sempre começa o diálogo com a frase \"{}\"", line));
        }
        personas.push('\n');
    }

    let mut format_lines = String::new();
    for persona in Persona::ALL {
        format_lines.push_str(&format!("<p>{} [fala]</p>\n", persona.label()));
    }

    format!(
        r#"Você é um roteirista que cria diálogos filosóficos.
A notícia é:
Título: "{title}"
Conteúdo: "{summary}"

Crie um diálogo curto entre três personagens sobre esta notícia. Siga estritamente as personalidades abaixo:
{personas}
O diálogo deve ser em português do Brasil e conter pelo menos uma fala para cada personagem, mantendo o tom crítico e filosófico do projeto.
Responda apenas com o HTML, sem marcadores de código.
Formato da resposta:
{format_lines}...
"#,
        title = news.title,
        summary = summary,
        personas = personas,
        format_lines = format_lines,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, content: &str) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            content: content.to_string(),
            link: "L".to_string(),
        }
    }

    #[test]
    fn prompt_quotes_title_and_content() {
        let prompt = dialogue_prompt(&item("T", "C"));
        assert!(prompt.contains("\"T\""));
        assert!(prompt.contains("\"C\""));
    }

    #[test]
    fn prompt_describes_every_persona() {
        let prompt = dialogue_prompt(&item("T", "C"));
        for persona in Persona::ALL {
            assert!(prompt.contains(persona.stance()));
            assert!(prompt.contains(&format!("<p>{} [fala]</p>", persona.label())));
        }
        assert!(prompt.contains("Eu li os jornais hoje, ô, caras."));
        assert!(prompt.contains("português do Brasil"));
    }

    #[test]
    fn blank_summary_is_replaced() {
        let prompt = dialogue_prompt(&item("Só o título", "   "));
        assert!(prompt.contains(MISSING_SUMMARY));
    }
}
