//! Command handlers.
//!
//! Handlers follow the canonical pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<(), CliError>`
//! - Thin wrappers that call the ports or the player and format output for
//!   the terminal.

pub mod chapters;
pub mod novels;
pub mod read;
pub mod voices;
