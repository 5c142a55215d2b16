//! `tempo history` - list the signed-in user's completed sessions.

use super::context;
use anyhow::Result;
use colored::Colorize;

pub async fn run(owner: Option<String>) -> Result<()> {
    let usecase = context::build_usecase(owner).await?;
    let entries = usecase.history().await?;

    if entries.is_empty() {
        println!("No completed sessions yet.");
        return Ok(());
    }

    println!("{}", "Completed focus sessions:".bold());
    for entry in entries {
        let actual_secs = (entry.end_time - entry.start_time).num_seconds().max(0);
        println!(
            "{}  {}  planned {:>3} min, focused {}",
            entry.id,
            entry.start_time.format("%Y-%m-%d %H:%M"),
            entry.duration_minutes,
            context::format_remaining(actual_secs as u64).cyan()
        );
    }

    Ok(())
}
