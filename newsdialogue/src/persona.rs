/// The three voices of every dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Persona {
    Sagredo,
    Salvati,
    Simplicio,
}

const ICON_STYLE: &str = r#"width="24" height="24" style="vertical-align: middle; margin-right: 8px;""#;

impl Persona {
    pub const ALL: [Persona; 3] = [Persona::Sagredo, Persona::Salvati, Persona::Simplicio];

    pub fn name(self) -> &'static str {
        match self {
            Persona::Sagredo => "Sagredo",
            Persona::Salvati => "Salvati",
            Persona::Simplicio => "Simplicio",
        }
    }

    /// Stance handed to the generator.
    pub fn stance(self) -> &'static str {
        match self {
            Persona::Sagredo => "Observador irônico e inquieto, sensível ao absurdo moderno.",
            Persona::Salvati => {
                "Marxista pós-moderno, crítico da lógica do capital e do controle algorítmico."
            }
            Persona::Simplicio => {
                "Conservador confiante, defensor da ordem, da liberdade de mercado e da autoridade institucional."
            }
        }
    }

    /// Line the persona must open the dialogue with, if any.
    pub fn opening_line(self) -> Option<&'static str> {
        match self {
            Persona::Sagredo => Some("Eu li os jornais hoje, ô, caras."),
            _ => None,
        }
    }

    /// `<strong>Name:</strong>`, the speaker tag of one turn.
    pub fn label(self) -> String {
        format!("<strong>{}:</strong>", self.name())
    }

    pub fn icon_data_uri(self) -> &'static str {
        match self {
            Persona::Sagredo => "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' width='24' height='24' viewBox='0 0 24 24' fill='none' stroke='%232c5aa0' stroke-width='2'%3E%3Ccircle cx='12' cy='12' r='10'/%3E%3Cpath d='M8 14s1.5 2 4 2 4-2 4-2'/%3E%3Cline x1='9' y1='9' x2='9.01' y2='9'/%3E%3Cline x1='15' y1='9' x2='15.01' y2='9'/%3E%3C/svg%3E",
            Persona::Salvati => "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' width='24' height='24' viewBox='0 0 24 24' fill='none' stroke='%23c53030' stroke-width='2'%3E%3Ccircle cx='12' cy='12' r='10'/%3E%3Cpath d='M16 16s-1.5-2-4-2-4 2-4 2'/%3E%3Cline x1='9' y1='9' x2='9.01' y2='9'/%3E%3Cline x1='15' y1='9' x2='15.01' y2='9'/%3E%3C/svg%3E",
            Persona::Simplicio => "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' width='24' height='24' viewBox='0 0 24 24' fill='none' stroke='%2338a169' stroke-width='2'%3E%3Ccircle cx='12' cy='12' r='10'/%3E%3Cline x1='8' y1='15' x2='16' y2='15'/%3E%3Cline x1='9' y1='9' x2='9.01' y2='9'/%3E%3Cline x1='15' y1='9' x2='15.01' y2='9'/%3E%3C/svg%3E",
        }
    }

    pub fn icon_tag(self) -> String {
        format!(
            r#"<img src="{}" {} alt="{}">"#,
            self.icon_data_uri(),
            ICON_STYLE,
            self.name()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_sagredo_has_an_opening_line() {
        assert!(Persona::Sagredo.opening_line().is_some());
        assert!(Persona::Salvati.opening_line().is_none());
        assert!(Persona::Simplicio.opening_line().is_none());
    }

    #[test]
    fn icon_tag_carries_name_as_alt() {
        let tag = Persona::Salvati.icon_tag();
        assert!(tag.starts_with("<img src=\"data:image/svg+xml,"));
        assert!(tag.ends_with("alt=\"Salvati\">"));
    }
}
