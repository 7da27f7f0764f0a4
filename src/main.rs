use anyhow::Result;
use bumpscope::analyzers::{self, AnalyzerRegistry};
use bumpscope::cli::{Cli, Commands};
use bumpscope::commands::{self, DecideConfig};
use clap::Parser;

fn main() -> Result<()> {
    let cli = Cli::parse();
    bumpscope::observability::init_tracing(cli.verbosity);

    // Built-ins are registered before any command runs.
    analyzers::install(AnalyzerRegistry::with_builtins()?)?;

    match cli.command {
        Commands::Decide {
            base,
            head,
            format,
            enable_analyzer,
            disable_analyzer,
            repo,
        } => commands::run_decide(DecideConfig {
            base,
            head,
            format,
            enable_analyzer,
            disable_analyzer,
            repo,
            config: cli.config,
        }),
        Commands::Analyzers => {
            commands::list_analyzers(analyzers::global()?, &mut std::io::stdout().lock())
        }
        Commands::Init { force } => commands::init_config(&cli.config, force),
    }
}
