//! CLI entry point.
//!
//! Parses arguments, bootstraps the backend client and dispatches to the
//! command handlers. Errors are mapped to sysexits-style exit codes.

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use novelvox_cli::{Cli, CliError, Commands, bootstrap, handlers};

fn init_logging(verbose: bool) {
    let default = if verbose {
        "warn,novelvox_core=debug,novelvox_http=debug,novelvox_player=debug,novelvox_cli=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = cli.settings();
    let Some(command) = cli.command else {
        // No command provided - show help
        Cli::command().print_help()?;
        return Ok(());
    };

    let ctx = bootstrap(settings)?;

    match command {
        Commands::Novels => handlers::novels::execute(&ctx).await?,
        Commands::Chapters { novel } => handlers::chapters::execute(&ctx, &novel).await?,
        Commands::Voices => handlers::voices::execute(ctx.settings.effective_voice()),
        Commands::Read {
            novel,
            chapter,
            start,
        } => {
            // --start is 1-based and clap guarantees it is at least 1
            let start = usize::try_from(start - 1)?;
            handlers::read::execute(&ctx, &novel, chapter, start).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables before clap reads NOVELVOX_*
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            let code = err.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}
