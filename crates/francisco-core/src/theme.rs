use serde::Serialize;

/// One of the fixed subject areas the assistant covers. Each theme pairs a
/// prompt form with its own handler route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Theme {
    Homework,
    Recipes,
    Leisure,
    Vacations,
    Finances,
    Sports,
    Medical,
    WellBeing,
}

// Each block is sent byte-for-byte after the prompt and a blank line,
// trailing spaces and final newline included.
const HOMEWORK_FORMATTING: &str = "Veuillez NE PAS utiliser de symboles Markdown tels que ###, **, *, etc.\n\
N'utilisez aucune forme d'astérisque ou de dièse dans votre réponse.\n\
Utilisez uniquement la balise <b> (sans fermeture) pour mettre en relief les passages importants.\n\
Ajoutez autant d'émojis pertinents que possible (ex: 📚, 📝, 😊, 📖, etc.) pour illustrer le propos.\n";

const RECIPES_FORMATTING: &str = "Veuillez NE PAS utiliser de symboles Markdown tels que \"###\", \"**\", etc.  \n\
Utilisez uniquement la balise <b> (uniquement l'ouverture, sans aucune balise </b>) pour mettre en valeur les passages importants.  \n\
N'incluez absolument aucun caractère '*' dans votre réponse.  \n\
Ajoutez de nombreux emojis adaptés pour rendre la réponse plus engageante, par exemple 🍴, 🔥, 😊, 😋, 👍, etc.";

const LEISURE_FORMATTING: &str = "Veuillez NE PAS utiliser de symboles Markdown tels que ###, **, etc.\n\
N'incluez aucun caractère '*' ni '#'.\n\
Utilisez uniquement la balise <b> (sans fermeture) pour mettre en valeur les points importants.\n\
Ajoutez de nombreux émojis adaptés (ex: 🎉, 🏞️, 🚴, 🍀...) pour rendre la réponse plus engageante.\n";

const FINANCES_FORMATTING: &str = "Veuillez NE PAS utiliser de symboles Markdown (###, **, etc.).\n\
N'utilisez aucune forme d'astérisque ou de dièse.\n\
Utilisez uniquement la balise <b> (sans fermeture) si vous voulez mettre un mot/phrase en relief.\n\
Ajoutez beaucoup d'emojis adaptés (ex: 💰, 📈, 💡, 👍) pour agrémenter la réponse.\n";

const SPORTS_FORMATTING: &str = "Veuillez NE PAS utiliser de symboles Markdown (###, **, etc.).\n\
Ne mettez aucun caractère '*' ni '#'.\n\
Utilisez uniquement <b> (sans fermeture) pour mettre en relief un mot. \n\
Incorporez des émojis sportifs (🏋️, 🤸, 🏃, 🍏...) pour dynamiser la réponse.\n";

const MEDICAL_FORMATTING: &str = "Veuillez NE PAS utiliser de symboles Markdown (###, **, etc.). \n\
N'insérez aucun caractère '*' ni '#'.\n\
Utilisez seulement <b> (sans la fermer) pour mettre en relief un mot ou un titre.\n\
Ajoutez des émojis liés au domaine médical ou à la planification (🏥, 📅, 🩺, etc.) pour rendre le texte plus chaleureux.\n";

const WELL_BEING_FORMATTING: &str = "Veuillez NE PAS utiliser de symboles Markdown tels que ###, **, etc.\n\
N'utilisez aucun caractère '*' ou '#'.\n\
Utilisez uniquement la balise <b> (sans fermeture) pour mettre en relief les mots importants.\n\
Ajoutez de nombreux émojis adaptés (🎉, 🌟, 👍, etc.) pour rendre la réponse plus conviviale.\n";

/// System message the free-form chat handler prepends to every conversation.
pub const CHAT_SYSTEM_PROMPT: &str = "Ne pas utiliser de symboles Markdown (ex. ### ou **). Utilisez uniquement la balise <b> pour mettre en gras (sans fermeture). Ajoutez des emojis adaptés (ex. 🍴, 🔥, 😊).";

pub const DEFAULT_MAX_TOKENS: u32 = 500;

impl Theme {
    /// Landing-page order.
    pub const ALL: [Theme; 8] = [
        Theme::Homework,
        Theme::Recipes,
        Theme::Leisure,
        Theme::Vacations,
        Theme::Finances,
        Theme::Sports,
        Theme::Medical,
        Theme::WellBeing,
    ];

    /// Page slug
    pub fn id(&self) -> &'static str {
        match self {
            Theme::Homework => "aide-devoirs",
            Theme::Recipes => "recettes-cuisine",
            Theme::Leisure => "loisirs-weekend",
            Theme::Vacations => "vacances",
            Theme::Finances => "finances",
            Theme::Sports => "assistant-sportif",
            Theme::Medical => "rendez-vous-medical",
            Theme::WellBeing => "bien-etre",
        }
    }

    pub fn from_id(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|t| t.id() == s)
    }

    /// Handler route segment, i.e. the part after `/api/`.
    pub fn route(&self) -> &'static str {
        match self {
            Theme::Homework => "aide-devoirs",
            Theme::Recipes => "recettes",
            Theme::Leisure => "loisirs",
            Theme::Vacations => "vacances",
            Theme::Finances => "finances",
            Theme::Sports => "assistant-sportif",
            Theme::Medical => "rendez-vous-medical",
            Theme::WellBeing => "bien-etre",
        }
    }

    pub fn endpoint(&self) -> String {
        format!("/api/{}", self.route())
    }

    /// Accepts either a bare route segment or a full `/api/...` path.
    pub fn from_endpoint(path: &str) -> Option<Self> {
        let segment = path.trim_end_matches('/').rsplit('/').next()?;
        Self::ALL.into_iter().find(|t| t.route() == segment)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Theme::Homework => "Aide aux devoirs",
            Theme::Recipes => "Recettes de cuisine",
            Theme::Leisure => "Loisirs week-end",
            Theme::Vacations => "Planification de vacances",
            Theme::Finances => "Gestion des finances",
            Theme::Sports => "Assistant sportif",
            Theme::Medical => "Rendez-vous médical",
            Theme::WellBeing => "Conseils bien-être",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Theme::Homework => "Je transforme vos devoirs en une aventure d'apprentissage !",
            Theme::Recipes => "Je vous aide à créer des plats surprenants avec ce que vous avez.",
            Theme::Leisure => "Je vous propose des idées pour des week-ends inoubliables.",
            Theme::Vacations => {
                "Je construis des voyages sur mesure pour des vacances riches en découvertes."
            }
            Theme::Finances => "Je vous conseille pour optimiser votre budget au quotidien.",
            Theme::Sports => "Je vous motive pour intégrer le sport même quand le temps manque.",
            Theme::Medical => "Je vous aide à organiser et suivre vos consultations.",
            Theme::WellBeing => "Je vous offre des conseils pour améliorer votre quotidien.",
        }
    }

    /// Instructions appended after the user's prompt. `None` means the prompt
    /// is forwarded verbatim.
    pub fn formatting(&self) -> Option<&'static str> {
        match self {
            Theme::Homework => Some(HOMEWORK_FORMATTING),
            Theme::Recipes => Some(RECIPES_FORMATTING),
            Theme::Leisure => Some(LEISURE_FORMATTING),
            Theme::Vacations => None,
            Theme::Finances => Some(FINANCES_FORMATTING),
            Theme::Sports => Some(SPORTS_FORMATTING),
            Theme::Medical => Some(MEDICAL_FORMATTING),
            Theme::WellBeing => Some(WELL_BEING_FORMATTING),
        }
    }

    pub fn max_tokens(&self) -> u32 {
        match self {
            Theme::Homework => 700,
            _ => DEFAULT_MAX_TOKENS,
        }
    }

    pub fn strips_markdown(&self) -> bool {
        !matches!(self, Theme::Recipes | Theme::Vacations)
    }

    /// JSON field the handler puts the generated text under.
    pub fn reply_field(&self) -> &'static str {
        match self {
            Theme::Recipes => "recipe",
            _ => "response",
        }
    }

    /// Text returned when the upstream reply carries no content.
    pub fn fallback_reply(&self) -> &'static str {
        match self {
            Theme::Homework | Theme::Finances | Theme::Sports => "Aucune réponse générée.",
            Theme::Recipes => "Aucune recette générée.",
            Theme::Leisure => "Aucune idée trouvée.",
            Theme::Vacations => "Aucune proposition reçue.",
            Theme::Medical | Theme::WellBeing => "Aucune suggestion reçue.",
        }
    }

    /// Message sent back when the completion API answers with a non-2xx status.
    pub fn upstream_error(&self) -> &'static str {
        match self {
            Theme::Recipes => "Erreur lors de la génération de la recette.",
            Theme::Leisure => "Erreur lors de la génération des suggestions.",
            _ => "Erreur lors de la génération.",
        }
    }

    pub fn internal_error(&self) -> &'static str {
        match self {
            Theme::Recipes => "Erreur lors de la génération de la recette.",
            _ => "Erreur interne du serveur.",
        }
    }

    /// Whether a reply without a `choices` list is a server error rather than
    /// an empty answer. Only the recipe handler indexes the list unguarded.
    pub fn requires_choices(&self) -> bool {
        matches!(self, Theme::Recipes)
    }

    pub fn summary(&self) -> ThemeSummary {
        ThemeSummary {
            id: self.id(),
            title: self.title(),
            description: self.description(),
            endpoint: self.endpoint(),
        }
    }
}

/// Serializable view of a theme, as listed by `GET /api/themes`.
#[derive(Debug, Clone, Serialize)]
pub struct ThemeSummary {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub endpoint: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_and_routes_round_trip() {
        for theme in Theme::ALL {
            assert_eq!(Theme::from_id(theme.id()), Some(theme));
            assert_eq!(Theme::from_endpoint(&theme.endpoint()), Some(theme));
        }
    }

    #[test]
    fn test_from_endpoint_accepts_bare_segment() {
        assert_eq!(Theme::from_endpoint("recettes"), Some(Theme::Recipes));
        assert_eq!(Theme::from_endpoint("/api/bien-etre/"), Some(Theme::WellBeing));
        assert_eq!(Theme::from_endpoint("/api/recettes-cuisine"), None);
    }

    #[test]
    fn test_homework_has_larger_token_cap() {
        assert_eq!(Theme::Homework.max_tokens(), 700);
        assert_eq!(Theme::Finances.max_tokens(), DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn test_recipe_and_vacation_handlers_keep_markdown() {
        let keep: Vec<Theme> = Theme::ALL
            .into_iter()
            .filter(|t| !t.strips_markdown())
            .collect();
        assert_eq!(keep, vec![Theme::Recipes, Theme::Vacations]);
    }

    #[test]
    fn test_formatting_blocks_keep_original_whitespace() {
        assert!(SPORTS_FORMATTING.contains("un mot. \n"));
        assert!(MEDICAL_FORMATTING.starts_with("Veuillez NE PAS utiliser de symboles Markdown (###, **, etc.). \n"));
        assert!(RECIPES_FORMATTING.contains("etc.  \n"));
        assert!(RECIPES_FORMATTING.ends_with("👍, etc."));
        for theme in Theme::ALL.into_iter().filter(|t| *t != Theme::Recipes) {
            assert!(theme.formatting().map_or(true, |b| b.ends_with(".\n")));
        }
    }

    #[test]
    fn test_only_recipes_require_choices() {
        assert!(Theme::Recipes.requires_choices());
        assert!(!Theme::Finances.requires_choices());
        assert!(!Theme::Vacations.requires_choices());
    }

    #[test]
    fn test_only_recipes_reply_under_recipe_field() {
        assert_eq!(Theme::Recipes.reply_field(), "recipe");
        assert!(Theme::ALL
            .into_iter()
            .filter(|t| *t != Theme::Recipes)
            .all(|t| t.reply_field() == "response"));
    }
}
