use anyhow::{anyhow, Result};
use log::{debug, error, info};
use std::env;
use std::path::PathBuf;
use survey_bot::config::Messages;
use survey_bot::survey::{Keyboard, QuestionSet};

fn main() -> Result<()> {
    // Initialize basic logging for the checker
    env_logger::init();
    dotenvy::dotenv().ok();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("check");

    match command {
        "check" => check(),
        "preview" => {
            let id = args
                .get(2)
                .ok_or_else(|| anyhow!("preview needs a question id"))?
                .parse()
                .map_err(|_| anyhow!("question id must be a positive number"))?;
            preview(id)
        }
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {command}");
            print_help();
            std::process::exit(1);
        }
    }
}

fn path_from_env(name: &str, default: &str) -> PathBuf {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            debug!("{name} not set, using {default}");
            PathBuf::from(default)
        })
}

fn check() -> Result<()> {
    println!("🔍 Survey Bot - Question Checker");
    println!("================================");

    let question_file = path_from_env("QUESTION_FILE", "data/questions.json");
    let config_file = path_from_env("CONFIG_FILE", "data/config.json");

    println!("📋 Questions: {}", question_file.display());
    info!("Loading questions from {}", question_file.display());
    let questions = match QuestionSet::load(&question_file) {
        Ok(questions) => questions,
        Err(e) => {
            error!("Question file rejected: {e}");
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };
    debug!("Loaded {} questions", questions.len());

    for question in questions.iter() {
        let flags = match (question.required, question.form_entry.as_deref()) {
            (true, Some(entry)) => format!("required, {entry}"),
            (true, None) => "required".to_string(),
            (false, Some(entry)) => format!("optional, {entry}"),
            (false, None) => "optional".to_string(),
        };
        println!("  {:>3}. [{}] {} ({})", question.id, question.kind.name(), question.text, flags);
    }

    println!("💬 Messages: {}", config_file.display());
    info!("Loading message templates from {}", config_file.display());
    if let Err(e) = Messages::load(&config_file) {
        error!("Message templates rejected: {e:#}");
        eprintln!("❌ {e:#}");
        std::process::exit(1);
    }

    println!("✅ {} questions and the message templates look good!", questions.len());
    Ok(())
}

fn preview(id: u32) -> Result<()> {
    let question_file = path_from_env("QUESTION_FILE", "data/questions.json");
    info!("Loading questions from {}", question_file.display());
    let questions = QuestionSet::load(&question_file)?;
    let question = questions.require(id)?;
    debug!("Previewing {} question {}", question.kind.name(), question.id);

    println!("{}", question.prompt_text());
    match question.keyboard(None) {
        Some(Keyboard::Inline(rows)) => print_rows("inline", &rows),
        Some(Keyboard::Reply(rows)) => print_rows("reply", &rows),
        None => println!("\n(no keyboard, answer is typed)"),
    }
    Ok(())
}

fn print_rows(kind: &str, rows: &[Vec<String>]) {
    println!("\n{kind} keyboard:");
    for row in rows {
        println!("  | {} |", row.join(" | "));
    }
}

fn print_help() {
    println!("🔍 Survey Bot - Question Checker");
    println!();
    println!("USAGE:");
    println!("    check-questions [COMMAND]");
    println!();
    println!("COMMANDS:");
    println!("    check          Load and validate the question and message files (default)");
    println!("    preview <id>   Print the MarkdownV2 prompt and keyboard of one question");
    println!("    help           Show this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    QUESTION_FILE  Question definitions (default: data/questions.json)");
    println!("    CONFIG_FILE    Message templates (default: data/config.json)");
    println!();
}
