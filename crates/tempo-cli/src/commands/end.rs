//! `tempo end` - end a session by id.

use super::context;
use anyhow::Result;
use colored::Colorize;

pub async fn run(owner: Option<String>, id: &str) -> Result<()> {
    let usecase = context::build_usecase(owner).await?;
    let session = usecase.end_session_by_id(id).await?;

    let end_time = session
        .end_time
        .map(|t| t.to_rfc3339())
        .unwrap_or_default();
    println!(
        "{} session {} ended at {}",
        "Completed".green().bold(),
        session.id,
        end_time
    );

    Ok(())
}
