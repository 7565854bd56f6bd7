//! Novels command handler.

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// List the novels the backend can serve.
pub async fn execute(ctx: &CliContext) -> Result<(), CliError> {
    let novels = ctx.source.list_novels().await?;

    if novels.is_empty() {
        println!("The backend has no novels yet.");
        return Ok(());
    }

    println!("Found {} novel(s):\n", novels.len());
    for novel in &novels {
        println!("  {novel}");
    }
    println!("\nUse 'novelvox chapters <novel>' to see a novel's chapters.");
    Ok(())
}
