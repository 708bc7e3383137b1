use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use id_extractor::config::resolve_config;
use id_extractor::host::MemoryHost;
use id_extractor::inference::{ExtractionClient, Extractor};
use id_extractor::workflow::selection::resolve_display_name;
use id_extractor::workflow::{CollectingNotices, NoticeLevel, RunOutcome};
use id_extractor::{build_workflow, init_tracing, LogTarget};

#[derive(Parser)]
#[command(name = "id-extractor", version, about = "Extract identifiers from attached documents")]
struct Cli {
    /// Configuration file (defaults to discovery, then the environment).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log to stderr instead of the data-directory log file.
    #[arg(long, global = true)]
    log_stderr: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the extraction for the snapshot's selected record and save the result.
    Run {
        #[arg(long)]
        snapshot: PathBuf,
    },
    /// Call the model directly and print its answer.
    Extract {
        #[arg(long)]
        name: String,
        #[arg(long)]
        url: String,
    },
    /// Print the name the display would show for the snapshot's selection.
    Show {
        #[arg(long)]
        snapshot: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(if cli.log_stderr {
        LogTarget::Stderr
    } else {
        LogTarget::File
    });

    let config = resolve_config(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Command::Run { snapshot } => {
            config.validate()?;
            let host = Arc::new(MemoryHost::load(&snapshot)?);
            let notices = Arc::new(CollectingNotices::new());
            let workflow = build_workflow(&config, host.clone(), notices.clone())?;

            let outcome = workflow.trigger().await;
            for notice in notices.notices() {
                let tag = match notice.level {
                    NoticeLevel::Info => "info",
                    NoticeLevel::Success => "success",
                    NoticeLevel::Error => "error",
                };
                println!("[{tag}] {}", notice.message);
            }

            match outcome {
                RunOutcome::Completed(extraction) => {
                    host.save(&snapshot)?;
                    println!("{}", extraction.value);
                }
                RunOutcome::Failed(e) => anyhow::bail!(e),
                RunOutcome::Skipped => {}
            }
        }
        Command::Extract { name, url } => {
            config.validate()?;
            let client = ExtractionClient::from_config(&config.model, config.locale)?;
            let answer = client.extract(&name, &url).await?;
            println!("{answer}");
        }
        Command::Show { snapshot } => {
            let host = MemoryHost::load(&snapshot)?;
            let display = resolve_display_name(&host, &config.fields.name).await?;
            println!("{}", display.render(config.locale));
        }
    }

    Ok(())
}
