//! `tempo start` - run a focus session in the foreground.

use super::context;
use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;
use tempo_application::FocusEvent;
use tempo_core::completion::CompletionOutcome;
use tempo_core::session::Session;

pub async fn run(owner: Option<String>, minutes: Option<u32>) -> Result<()> {
    let usecase = context::build_usecase(owner).await?;
    let (session, mut events) = usecase.start_focus(minutes).await?;
    // Catch up on snapshots dropped by earlier history write failures.
    usecase.start_history_reconciler(60);

    println!(
        "Focus session {} started ({} min). Press Ctrl-C to end early.",
        session.id.bold(),
        session.duration_minutes
    );

    let mut display = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Some(FocusEvent::Completed { session, history_recorded }) => {
                        println!();
                        print_completed(&session, history_recorded);
                        break;
                    }
                    Some(FocusEvent::CompletionFailed { message }) => {
                        println!();
                        eprintln!(
                            "{} {message}\nThe session was not completed; run `tempo end {}` to retry.",
                            "error:".red().bold(),
                            session.id
                        );
                        break;
                    }
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                match usecase.end_focus().await {
                    Ok(CompletionOutcome::Completed { session, history_recorded }) => {
                        print_completed(&session, history_recorded);
                        break;
                    }
                    // Expiry got there first; its event arrives next loop.
                    Ok(CompletionOutcome::Suppressed) => {}
                    Err(e) => {
                        eprintln!(
                            "{} {e}\nThe session was not completed; run `tempo end {}` to retry.",
                            "error:".red().bold(),
                            session.id
                        );
                        break;
                    }
                }
            }
            _ = display.tick() => {
                if let Some(remaining) = usecase.remaining() {
                    print!("\r  {} remaining ", context::format_remaining(remaining).cyan());
                    std::io::stdout().flush()?;
                }
            }
        }
    }

    Ok(())
}

fn print_completed(session: &Session, history_recorded: bool) {
    println!(
        "{} session {} ({} min)",
        "Completed".green().bold(),
        session.id,
        session.duration_minutes
    );
    if !history_recorded {
        println!(
            "{}",
            "History entry could not be written; run `tempo reconcile` later.".yellow()
        );
    }
}
