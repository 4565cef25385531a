//! Prompt templating
//!
//! Each themed form gathers a handful of typed fields and renders them into
//! the natural-language prompt that is POSTed to the matching handler.

use crate::error::{FranciscoError, Result};
use crate::theme::Theme;

pub const DEFAULT_USERNAME: &str = "invité";

/// A form whose fields render into a prompt for one theme.
pub trait PromptForm {
    fn theme(&self) -> Theme;

    fn to_prompt(&self) -> Result<String>;
}

/// Append the theme's formatting instructions to a prompt, the way the
/// handlers do before calling the completion API.
pub fn with_formatting(theme: Theme, prompt: &str) -> String {
    match theme.formatting() {
        Some(block) => format!("{}\n\n{}", prompt, block),
        None => prompt.to_string(),
    }
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default
    } else {
        trimmed
    }
}

fn require(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(FranciscoError::Validation(format!("{} is required", what)));
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct HomeworkForm {
    pub subject: String,
    pub level: String,
    pub exercise_kind: String,
    pub deadline: String,
    pub explanation_style: String,
    pub statement: String,
}

impl PromptForm for HomeworkForm {
    fn theme(&self) -> Theme {
        Theme::Homework
    }

    fn to_prompt(&self) -> Result<String> {
        require(&self.statement, "homework statement")?;

        Ok(format!(
            "\n\
Tu es Francisco, un professeur innovant et patient. \n\
Tu reçois les informations suivantes :\n\
- Matière : {}\n\
- Niveau : {}\n\
- Type d'exercice : {}\n\
- Deadline : {}\n\
- Style d'explication souhaité : {}\n\
- Énoncé du devoir : {}\n\
\n\
Explique la solution de façon claire et structurée, avec des exemples concrets. \n\
Donne éventuellement des astuces pour progresser, ou des ressources supplémentaires (sans Markdown). \n\
Si possible, propose un lien vers une ressource vidéo explicative, ou une référence de livre.\n\
N'utilise pas de symboles Markdown (ex: \"###\", \"**\"). Tu peux utiliser la balise <b> (sans fermeture) pour mettre en relief un mot-clé. \n",
            or_default(&self.subject, "non précisé"),
            or_default(&self.level, "non précisé"),
            or_default(&self.exercise_kind, "non précisé"),
            or_default(&self.deadline, "pas d'urgence mentionnée"),
            or_default(&self.explanation_style, "classique"),
            self.statement.trim(),
        ))
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecipeForm {
    pub fridge: Vec<String>,
    pub cupboard: Vec<String>,
    pub guests: String,
}

impl RecipeForm {
    fn list(items: &[String]) -> String {
        let kept: Vec<&str> = items
            .iter()
            .map(|i| i.trim())
            .filter(|i| !i.is_empty())
            .collect();
        if kept.is_empty() {
            "aucun".to_string()
        } else {
            kept.join(", ")
        }
    }
}

impl PromptForm for RecipeForm {
    fn theme(&self) -> Theme {
        Theme::Recipes
    }

    fn to_prompt(&self) -> Result<String> {
        Ok(format!(
            "Génère une recette simple et rapide à préparer en fonction des ingrédients disponibles.

Contraintes:
- Utilise uniquement les ingrédients fournis.
- La recette doit être prévue pour {} personnes.
- Donne des instructions claires et faciles à suivre.
- Propose une suggestion de présentation ou d'accompagnement si possible.

Données:
- Ingrédients du frigo: {}
- Ingrédients du placard: {}

Réponds sous la forme suivante:
1. <b>Nom de la recette
2. <b>Ingrédients avec quantités approximatives
3. <b>Instructions pas à pas
4. <b>Suggestion de présentation ou d’accompagnement

N'utilise pas de symboles Markdown (pas de \"###\" ou \"**\") et n'utilise QUE la balise <b> (sans fermeture). Ajoute des emojis (🍴, 🔥, 😊, 😋, 👍).",
            or_default(&self.guests, "un nombre indéfini"),
            Self::list(&self.fridge),
            Self::list(&self.cupboard),
        ))
    }
}

#[derive(Debug, Clone, Default)]
pub struct LeisureForm {
    pub people: String,
    pub young_children: String,
    pub teenagers: String,
    pub reduced_mobility: String,
    pub activity: String,
    pub city: String,
    pub sporty: String,
}

impl PromptForm for LeisureForm {
    fn theme(&self) -> Theme {
        Theme::Leisure
    }

    fn to_prompt(&self) -> Result<String> {
        Ok(format!(
            "Génère quelques idées de sorties à faire le week-end en fonction des réponses suivantes :

- Nombre de personnes : {}
- Enfants de moins de 5 ans : {}
- Adolescents : {}
- Personnes à mobilité réduite : {}
- Activité (gratuite ou payante) : {}
- Ville : {}
- Sortie sportive ? (oui/non) : {}

Réponds sous la forme suivante :
1. <b>Nom de la sortie
2. <b>Description de l'activité
3. <b>Pourquoi cette sortie est adaptée (ajoute des emojis adaptés)

N'utilise pas de symboles Markdown (pas de \"###\" ou \"**\") et n'utilise QUE la balise <b>.",
            self.people,
            self.young_children,
            self.teenagers,
            self.reduced_mobility,
            self.activity,
            self.city,
            self.sporty,
        ))
    }
}

/// Free question for the themes whose page only asks for a message.
#[derive(Debug, Clone)]
pub struct QuestionForm {
    pub theme: Theme,
    pub username: String,
    pub question: String,
}

impl QuestionForm {
    pub fn new(theme: Theme, question: impl Into<String>) -> Self {
        Self {
            theme,
            username: DEFAULT_USERNAME.to_string(),
            question: question.into(),
        }
    }
}

impl PromptForm for QuestionForm {
    fn theme(&self) -> Theme {
        self.theme
    }

    fn to_prompt(&self) -> Result<String> {
        require(&self.question, "question")?;

        Ok(format!(
            "Tu es Francisco, un assistant chaleureux. Thème : {}.
{} te pose la question suivante :
{}

Réponds de façon claire, concrète et personnalisée.",
            self.theme.title(),
            or_default(&self.username, DEFAULT_USERNAME),
            self.question.trim(),
        ))
    }
}
