//! `tempo sessions` - list all stored sessions.

use super::context;
use anyhow::Result;
use colored::Colorize;

pub async fn run(owner: Option<String>) -> Result<()> {
    let usecase = context::build_usecase(owner).await?;
    let mut sessions = usecase.sessions().await?;
    sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time));

    if sessions.is_empty() {
        println!("No sessions recorded.");
        return Ok(());
    }

    for session in sessions {
        let status = if session.is_completed() {
            "completed".green()
        } else {
            "active".yellow()
        };
        println!(
            "{}  {}  {:>3} min  {}  {}",
            session.id,
            session.start_time.format("%Y-%m-%d %H:%M"),
            session.duration_minutes,
            status,
            session.owner.dimmed()
        );
    }

    Ok(())
}
