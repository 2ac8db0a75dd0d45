mod terminal_output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cmdgate_core::RiskLevel;
use cmdgate_security::{
    CommandSecurityAnalyzer, GoblinNetworkAnalyzer, ValidatorConfig, DEFAULT_REGISTRY,
};
use terminal_output::{note_error, note_success, note_warn};

#[derive(Parser)]
#[command(name = "cmdgate")]
#[command(about = "Pre-execution command security gate")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file. Defaults to `~/.cmdgate/config.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse a command before running it and print a risk verdict.
    Check {
        /// Absolute path to the binary that would be executed.
        cmd_path: String,
        /// Arguments that would be passed to it.
        args: Vec<String>,
        /// Print the verdict as JSON instead of human-readable text.
        #[arg(long)]
        json: bool,
    },
    /// Print the resolved configuration (defaults merged with any config file).
    ShowConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(|| cmdgate_config::config_file_path(&cmdgate_config::config_dir()));
    let config = cmdgate_config::load_and_prepare(&config_path).await.unwrap_or_else(|e| {
        note_warn(&format!("failed to load config ({e}); using built-in defaults"));
        ValidatorConfig::default()
    });

    match cli.command {
        Commands::Check { cmd_path, args, json } => run_check(&config, &cmd_path, &args, json),
        Commands::ShowConfig => {
            println!("{config:#?}");
            Ok(())
        }
    }
}

fn run_check(config: &ValidatorConfig, cmd_path: &str, args: &[String], json: bool) -> anyhow::Result<()> {
    let allow_list = config.build_allow_list_validator()?;
    if let Err(e) = allow_list.validate_command_allowed(cmd_path, &[]) {
        if json {
            println!(r#"{{"allowed":false,"error":{:?}}}"#, e.to_string());
        } else {
            note_error(&format!("rejected: {e}"));
        }
        std::process::exit(2);
    }

    let elf_analyzer = GoblinNetworkAnalyzer;
    let analyzer = CommandSecurityAnalyzer::new(&DEFAULT_REGISTRY, &elf_analyzer);
    let verdict = analyzer.analyze(cmd_path, args, Default::default(), None)?;

    if json {
        println!(
            r#"{{"risk":"{}","pattern":{:?},"reason":{:?},"isNetwork":{}}}"#,
            verdict.risk, verdict.pattern, verdict.reason, verdict.is_network
        );
    } else if verdict.risk >= RiskLevel::High {
        note_error(&format!("{} — {}", verdict.risk, verdict.reason));
    } else {
        note_success(&format!("{} — {}", verdict.risk, verdict.reason));
    }

    Ok(())
}
