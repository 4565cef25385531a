use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tokio::io::{AsyncBufReadExt, BufReader};

mod client;
mod display;

use client::HandlerClient;
use francisco_core::prompt::DEFAULT_USERNAME;
use francisco_core::{
    ChatMessage, HomeworkForm, LeisureForm, PromptForm, QuestionForm, RecipeForm, Theme,
    Transcript,
};

#[derive(Parser)]
#[command(name = "francisco")]
#[command(about = "Francisco-IA: ask the themed assistant from your terminal")]
struct Cli {
    /// Base URL of the Francisco-IA handlers
    #[arg(long, env = "FRANCISCO_SERVER", default_value = "http://127.0.0.1:3000")]
    server: String,
    /// Your nickname
    #[arg(short, long, default_value = DEFAULT_USERNAME)]
    user: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available themes
    Themes,
    /// Homework help
    Devoirs {
        /// Homework statement
        enonce: String,
        #[arg(long, default_value = "")]
        matiere: String,
        #[arg(long, default_value = "")]
        niveau: String,
        #[arg(long = "type", default_value = "")]
        type_exo: String,
        #[arg(long, default_value = "")]
        deadline: String,
        #[arg(long, default_value = "")]
        style: String,
    },
    /// Recipe from what is in the fridge and cupboard
    Recette {
        /// Fridge ingredient (repeatable)
        #[arg(long = "frigo")]
        frigo: Vec<String>,
        /// Cupboard ingredient (repeatable)
        #[arg(long = "placard")]
        placard: Vec<String>,
        /// Number of guests
        #[arg(long, default_value = "")]
        personnes: String,
    },
    /// Weekend outing ideas
    Loisirs {
        #[arg(long, default_value = "")]
        personnes: String,
        /// Children under 5
        #[arg(long, default_value = "")]
        enfants: String,
        #[arg(long, default_value = "")]
        ados: String,
        /// People with reduced mobility
        #[arg(long, default_value = "")]
        mobilite: String,
        /// Free or paid activity
        #[arg(long, default_value = "")]
        activite: String,
        #[arg(long, default_value = "")]
        ville: String,
        /// Sporty outing (oui/non)
        #[arg(long, default_value = "")]
        sportif: String,
    },
    /// Ask a free question within a theme (e.g. finances, vacances, bien-etre)
    Ask {
        /// Theme id
        theme: String,
        /// Your question
        question: String,
    },
    /// Free-form conversation with Francisco
    Chat,
}

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    let cli = Cli::parse();
    let client = HandlerClient::new(&cli.server);

    match cli.command {
        Commands::Themes => display::print_themes(),
        Commands::Devoirs { enonce, matiere, niveau, type_exo, deadline, style } => {
            let form = HomeworkForm {
                subject: matiere,
                level: niveau,
                exercise_kind: type_exo,
                deadline,
                explanation_style: style,
                statement: enonce.clone(),
            };
            run_form(&client, &cli.user, &form, &enonce).await?
        }
        Commands::Recette { frigo, placard, personnes } => {
            let summary = format!("Ingrédients : {}", [frigo.clone(), placard.clone()].concat().join(", "));
            let form = RecipeForm {
                fridge: frigo,
                cupboard: placard,
                guests: personnes,
            };
            run_form(&client, &cli.user, &form, &summary).await?
        }
        Commands::Loisirs { personnes, enfants, ados, mobilite, activite, ville, sportif } => {
            let summary = format!("Sortie à {} pour {} personne(s)", ville, personnes);
            let form = LeisureForm {
                people: personnes,
                young_children: enfants,
                teenagers: ados,
                reduced_mobility: mobilite,
                activity: activite,
                city: ville,
                sporty: sportif,
            };
            run_form(&client, &cli.user, &form, &summary).await?
        }
        Commands::Ask { theme, question } => {
            let theme = Theme::from_id(&theme)
                .or_else(|| Theme::from_endpoint(&theme))
                .ok_or_else(|| anyhow!("unknown theme '{}' (see `francisco themes`)", theme))?;
            let mut form = QuestionForm::new(theme, question.clone());
            form.username = cli.user.clone();
            run_form(&client, &cli.user, &form, &question).await?
        }
        Commands::Chat => chat_loop(&client, &cli.user).await?,
    }

    Ok(())
}

/// Build the prompt, call the theme's handler and print the two-turn transcript.
async fn run_form(client: &HandlerClient, user: &str, form: &dyn PromptForm, shown: &str) -> Result<()> {
    let theme = form.theme();
    let prompt = form.to_prompt()?;

    println!(
        "{}",
        format!("📋 {} - bonjour {} !", theme.title(), user).bold().blue()
    );

    let mut transcript = Transcript::new();
    transcript.push(ChatMessage::user(shown));
    display::print_transcript(&transcript);

    println!("{}", "Francisco réfléchit...".dimmed());
    match client.ask(theme, &prompt).await {
        Ok(text) => {
            transcript.push(ChatMessage::assistant(text));
            if let Some(reply) = transcript.last() {
                display::print_message(reply);
            }
        }
        Err(e) => {
            println!("{}: {}", "Erreur de l'API".red(), e);
            println!("Le serveur est-il lancé ? Démarrez-le avec : {}", "francisco-server".bold());
        }
    }

    Ok(())
}

async fn chat_loop(client: &HandlerClient, user: &str) -> Result<()> {
    println!(
        "{}",
        format!("💬 Bonjour {}, je suis Francisco. Tapez 'exit' pour quitter.", user).bold().blue()
    );

    let mut transcript = Transcript::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" {
            break;
        }

        transcript.push(ChatMessage::user(line));

        match client.chat(transcript.messages()).await {
            Ok(Some(reply)) => {
                display::print_message(&reply);
                transcript.push(reply);
            }
            Ok(None) => println!("{}", "Aucune réponse générée.".yellow()),
            Err(e) => println!("{}: {}", "Erreur de l'API".red(), e),
        }
    }

    Ok(())
}
