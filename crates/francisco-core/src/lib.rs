pub mod ai;
pub mod config;
pub mod error;
pub mod prompt;
pub mod sanitize;
pub mod state;
pub mod theme;

// Re-export main types for convenience
pub use ai::{Completion, CompletionReply, CompletionSettings, MistralClient};
pub use config::Config;
pub use error::{CompletionError, FranciscoError};
pub use prompt::{with_formatting, HomeworkForm, LeisureForm, PromptForm, QuestionForm, RecipeForm};
pub use sanitize::strip_markdown;
pub use state::{ChatMessage, ChatRole, Transcript};
pub use theme::{Theme, ThemeSummary, CHAT_SYSTEM_PROMPT};
