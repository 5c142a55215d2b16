//! `tempo reconcile` - repair history entries that failed to persist.

use super::context;
use anyhow::Result;

pub async fn run(owner: Option<String>) -> Result<()> {
    let usecase = context::build_usecase(owner).await?;
    let repaired = usecase.reconcile_history().await?;

    if repaired == 0 {
        println!("History is up to date.");
    } else {
        println!("Repaired {repaired} missing history entr{}.", if repaired == 1 { "y" } else { "ies" });
    }

    Ok(())
}
