//! tfx CLI: render and inspect fixture templates outside of a test run.
//!
//! `tfx render` runs the full two-phase load and prints the resolved document.
//! `tfx vars` lists the free variables a fixture can be parameterized with.

mod commands;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use tfx_core::counter::CounterScope;

#[derive(Parser)]
#[command(
    name = "tfx",
    about = "Parameterized YAML test fixtures",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to tfx.config.json (defaults apply if the file is missing)
    #[arg(long, global = true, default_value = "tfx.config.json")]
    config: PathBuf,

    /// Fixture directory, overriding the config file
    #[arg(long, global = true, env = "TFX_FIXTURE_DIR")]
    dir: Option<PathBuf>,

    /// Fixture file extension, overriding the config file
    #[arg(long, global = true)]
    ext: Option<String>,

    /// Render unbound chained lookups as empty instead of failing
    #[arg(long, global = true)]
    no_strict: bool,

    /// Lifetime of `seq` counters within one load
    #[arg(long, global = true, value_enum)]
    counter_scope: Option<ScopeChoice>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a fixture and print the resolved document
    Render {
        /// Fixture name (file stem inside the fixture directory)
        name: String,

        /// Supply a variable, e.g. `--param id=5`. Values are read as YAML scalars.
        #[arg(long = "param", short = 'p', value_name = "KEY=VALUE")]
        params: Vec<String>,

        /// Bind a loop source, e.g. `--loop postCount=3`
        #[arg(long = "loop", short = 'l', value_name = "NAME=COUNT")]
        loops: Vec<String>,

        /// Output format
        #[arg(long, short, default_value = "yaml")]
        output: OutputFormat,

        /// Print the first-pass text instead of the resolved document
        #[arg(long)]
        first_pass: bool,
    },

    /// List the free variables of a fixture
    Vars {
        /// Fixture name
        name: String,

        /// Also list chained references such as `post.author.id`
        #[arg(long)]
        all: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum OutputFormat {
    Yaml,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeChoice {
    /// Counters run through both rendering phases
    Load,
    /// Counters restart before the per-entry phase
    Phase,
}

impl From<ScopeChoice> for CounterScope {
    fn from(choice: ScopeChoice) -> Self {
        match choice {
            ScopeChoice::Load => CounterScope::Load,
            ScopeChoice::Phase => CounterScope::Phase,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let overrides = commands::Overrides {
        dir: cli.dir,
        extension: cli.ext,
        no_strict: cli.no_strict,
        counter_scope: cli.counter_scope.map(CounterScope::from),
    };
    let factory = commands::factory(&cli.config, overrides)?;

    match cli.command {
        Commands::Render {
            name,
            params,
            loops,
            output,
            first_pass,
        } => {
            commands::render::run(&factory, &name, &params, &loops, output, first_pass)?;
        }
        Commands::Vars { name, all } => {
            commands::vars::run(&factory, &name, all)?;
        }
    }

    Ok(())
}
