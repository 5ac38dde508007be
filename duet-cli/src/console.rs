use anyhow::Result;
use duet_agent::{RunOutcome, TurnCoordinator};
use duet_core::Message;
use futures::StreamExt;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

pub fn format_message(message: &Message) -> String {
    format!("{} -> {}", message.sender, message.content)
}

/// Transcript lines followed by the final answer.
pub fn format_outcome(outcome: &RunOutcome) -> String {
    let mut out: Vec<String> = outcome.transcript.iter().map(format_message).collect();
    out.push(String::new());
    match outcome.final_text() {
        Some(answer) => out.push(format!("Final answer:\n{answer}")),
        None => {
            let unit = if outcome.turns == 1 { "turn" } else { "turns" };
            out.push(format!("No answer from the responder after {} {unit}.", outcome.turns));
        }
    }
    out.join("\n")
}

/// Interactive loop. Every line is an independent run with a fresh transcript.
pub async fn run_console(coordinator: &TurnCoordinator) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    println!("duet console");
    println!("Max turns: {}", coordinator.config().effective_max_turns());
    println!("Type a question and press Enter. Ctrl+C to exit.\n");

    loop {
        match rl.readline("User -> ") {
            Ok(line) => {
                let query = line.trim();
                if query.is_empty() {
                    continue;
                }
                rl.add_history_entry(query)?;

                let mut messages = coordinator.run_stream(query);
                // The user line is already on screen.
                let _ = messages.next().await;
                while let Some(message) = messages.next().await {
                    match message {
                        Ok(message) => println!("{}", format_message(&message)),
                        Err(e) => eprintln!("Error: {e}"),
                    }
                }
                println!();
            }
            Err(ReadlineError::Interrupted) => {
                println!("Interrupted");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("EOF");
                break;
            }
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        }
    }

    Ok(())
}
