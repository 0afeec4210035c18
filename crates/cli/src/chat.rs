//! Interactive wizard loop.

use crate::config::CliConfig;
use crate::open_store;
use anyhow::Result;
use dialoguer::Input;
use storyflow_core::{ChatMessage, Role, Session};
use storyflow_engine::{Engine, EngineError, EngineOptions, MockGenerator, TurnIntent, GREETING};
use storyflow_parser::ClassifyOptions;
use storyflow_store::SavedOutline;

const HELP: &str = "Commands: /table  /select ap <n>  /select <n>  /export  /save  /reset  /help  /quit";

pub fn run_chat(session_id: Option<String>, config: &CliConfig) -> Result<()> {
    let store = open_store(config)?;
    let mut session = match &session_id {
        Some(id) => store.load_session(id)?,
        None => Session::new(),
    };

    let engine = Engine::with_options(
        EngineOptions {
            default_concept: config.concept.default.clone(),
            classify: ClassifyOptions {
                implicit_attack_min_chars: config.parser.implicit_attack_min_chars,
            },
        },
        Box::new(MockGenerator),
    );

    println!(
        "storyflow - session {} · backend: {}",
        session.session_id,
        engine.backend_name()
    );
    println!("{HELP}");
    println!();
    if session.history.is_empty() {
        session.history.push(ChatMessage::assistant(GREETING));
        store.save_session(&session)?;
        println!("{GREETING}");
    } else if let Some(last) = session
        .history
        .iter()
        .rev()
        .find(|m| m.role == Role::Assistant)
    {
        println!("{}", last.content);
    }

    loop {
        let input: String = Input::new()
            .with_prompt("you")
            .allow_empty(true)
            .interact_text()?;
        let trimmed = input.trim();
        if trimmed.is_empty() {
            // Empty input never starts a turn.
            continue;
        }

        if let Some(command) = trimmed.strip_prefix('/') {
            if handle_command(command, &mut session, &store)? {
                break;
            }
            continue;
        }

        match engine.take_turn(&mut session, trimmed, TurnIntent::Unspecified) {
            Ok(outcome) => {
                println!();
                println!("{}", outcome.reply);
                println!();
                store.save_session(&session)?;
            }
            Err(EngineError::EmptyInput) => {}
            Err(err) => {
                // The turn was abandoned; the session is unchanged and
                // the user may retry.
                eprintln!("Failed to generate a response: {err:#}");
            }
        }
    }

    Ok(())
}

/// Handle a local slash command. Returns true to leave the loop.
fn handle_command(
    command: &str,
    session: &mut Session,
    store: &storyflow_store::Store,
) -> Result<bool> {
    let mut parts = command.split_whitespace();
    match parts.next().unwrap_or_default() {
        "quit" | "q" => return Ok(true),
        "help" => println!("{HELP}"),
        "reset" => {
            session.reset();
            session.history.push(ChatMessage::assistant(GREETING));
            store.save_session(session)?;
            println!("{GREETING}");
        }
        "table" => {
            session.ensure_table();
            store.save_session(session)?;
            print!("{}", session.table.to_markdown());
        }
        "select" => {
            select(session, parts.next(), parts.next());
            store.save_session(session)?;
        }
        "export" => {
            print!("{}", session.export_selection().to_markdown());
        }
        "save" => {
            let outline = SavedOutline::from_session(session);
            store.save_outline(&outline)?;
            println!("Saved outline {}", outline.id);
        }
        other => println!("Unknown command /{other} - {HELP}"),
    }
    Ok(false)
}

fn select(session: &mut Session, first: Option<&str>, second: Option<&str>) {
    match (first, second) {
        (Some("ap"), Some(n)) => match n.parse() {
            Ok(index) => session.select_attack_point(index),
            Err(_) => println!("Usage: /select ap <n>"),
        },
        (Some(n), None) => match n.parse() {
            Ok(index) => session.toggle_beat(index),
            Err(_) => println!("Usage: /select <n> | /select ap <n>"),
        },
        _ => println!("Usage: /select <n> | /select ap <n>"),
    }
    let beats: Vec<String> = session.selection.beats.iter().map(u32::to_string).collect();
    println!(
        "Selected: attack point {}, points [{}]",
        session
            .selection
            .attack_point
            .map(|i| i.to_string())
            .unwrap_or_else(|| "none".to_string()),
        beats.join(", ")
    );
}
