// Statebench - command line workbench over the automaton registry

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use sqlx::PgPool;
use tracing::info;

use statebench_automata::{AutomatonRegistry, DefinitionFields, PgAutomataStore, TestRun};
use statebench_common::Config;

#[derive(Parser)]
#[command(
    name = "statebench",
    about = "Define DFAs, run words against them, inspect test history"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List stored automata
    List,
    /// Create an automaton from field values
    Create {
        #[arg(long)]
        name: String,
        /// Comma-separated state labels
        #[arg(long)]
        states: String,
        /// Comma-separated alphabet symbols
        #[arg(long)]
        alphabet: String,
        /// Initial state label
        #[arg(long)]
        initial: String,
        /// Comma-separated accepting states (may be empty)
        #[arg(long, default_value = "")]
        finals: String,
        /// Transition rule 'STATE , SYMBOL -> DESTINATION'; repeatable
        #[arg(long = "rule")]
        rules: Vec<String>,
    },
    /// Import an automaton definition from a text file
    Import { path: PathBuf },
    /// Run a word against a stored automaton
    Run { name: String, word: String },
    /// Show the test history, newest first
    History,
    /// Delete all test history records
    ClearHistory,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    let pool = PgPool::connect(&config.database_url).await?;
    info!("database connection established");

    let store = Arc::new(PgAutomataStore::new(pool));
    let mut registry = AutomatonRegistry::load(store).await?;

    match cli.command {
        Command::List => {
            for name in registry.list_names() {
                println!("{name}");
            }
        }
        Command::Create {
            name,
            states,
            alphabet,
            initial,
            finals,
            rules,
        } => {
            let fields = DefinitionFields {
                name: name.clone(),
                states,
                alphabet,
                initial,
                finals,
                transitions: rules.join("\n"),
            };
            registry.create_from_fields(&fields).await?;
            println!("automaton '{name}' saved");
        }
        Command::Import { path } => {
            let content = std::fs::read_to_string(&path)?;
            let name = registry.create_from_file(&content).await?;
            println!("automaton '{name}' imported from {}", path.display());
        }
        Command::Run { name, word } => {
            let run = registry.run_test(&name, &word).await?;
            print_run(&run);
        }
        Command::History => {
            for record in registry.history().await? {
                println!(
                    "{}  {:<10}  '{}'  {}",
                    record.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    record.outcome,
                    record.input_word,
                    record.automaton_name,
                );
            }
        }
        Command::ClearHistory => {
            registry.clear_history().await?;
            println!("test history cleared");
        }
    }

    Ok(())
}

fn print_run(run: &TestRun) {
    let verdict = if run.accepted { "Accepted" } else { "Rejected" };
    println!("{verdict}: '{}'", run.input_word);
    println!("path: {}", run.path.join(" -> "));
    if !run.history_recorded {
        eprintln!("warning: result was not recorded in the test history");
    }
}
