use colored::*;
use francisco_core::{ChatMessage, ChatRole, Theme, Transcript};

/// Render one assistant reply for the terminal. The model marks highlights
/// with an unclosed `<b>`, so everything after it on the same line is bold.
pub fn render_reply(text: &str) -> String {
    text.lines()
        .map(|line| match line.split_once("<b>") {
            Some((before, after)) => {
                format!("{}{}", before, after.replace("<b>", "").bold())
            }
            None => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn print_message(message: &ChatMessage) {
    match message.role {
        ChatRole::User => {
            println!("\n{} {}", "Vous :".bold().cyan(), message.content);
        }
        ChatRole::Assistant => {
            println!("\n{}", "Francisco :".bold().green());
            println!("{}", render_reply(&message.content));
        }
        ChatRole::System => {}
    }
}

pub fn print_transcript(transcript: &Transcript) {
    for message in transcript.messages() {
        print_message(message);
    }
}

pub fn print_themes() {
    println!("\n{}", "Choisissez un thème pour commencer :".bold().blue());
    for theme in Theme::ALL {
        println!(
            "\n{}  {}",
            theme.title().bold().yellow(),
            format!("({})", theme.id()).dimmed()
        );
        println!("   {}", theme.description());
    }
}
