use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ingestion::{DocumentAggregator, IngestionError};
use medbrief_core::config::AppConfig;
use medbrief_core::document::UploadedDocument;
use medbrief_core::presentation::{IngestWarning, JsonlPresentationSink};
use medbrief_core::{init_tracing_with, LogFormat};
use medbrief_sdk::{
    summary_path, write_summary, write_transcript, AssistantError, ReportAssistant, SessionContext,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "medbrief", version, about = "Summarize medical checkup reports and ask follow-up questions")]
struct Cli {
    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    json_logs: bool,

    /// Directory holding default.toml and <RUN_MODE>.toml.
    #[arg(long, global = true, default_value = "config")]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract and print the corpus without contacting the model.
    Inspect {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Generate a clinical summary, optionally followed by a Q&A session.
    Summarize {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Write the summary to this file (or into this directory).
        #[arg(long)]
        out: Option<PathBuf>,

        /// Write the chat transcript as JSON when the session ends.
        #[arg(long)]
        transcript: Option<PathBuf>,

        /// Read follow-up questions from stdin until EOF or "exit".
        #[arg(long)]
        chat: bool,

        /// Append presentation events to this JSON lines file.
        #[arg(long)]
        events: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing_with(if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    });

    let config = AppConfig::load_from(&cli.config_dir).context("failed to load configuration")?;

    match cli.command {
        Command::Inspect { files } => {
            let documents = read_documents(&files)?;
            let aggregator = DocumentAggregator::new(config.ingestion.clone());
            match aggregator.aggregate(&documents) {
                Ok(aggregation) => {
                    print_warnings(&aggregation.warnings);
                    println!("{}", aggregation.text());
                    Ok(())
                }
                Err(e) => Err(report_failure(e.into())),
            }
        }
        Command::Summarize {
            files,
            out,
            transcript,
            chat,
            events,
        } => {
            let documents = read_documents(&files)?;
            let mut assistant = ReportAssistant::from_config(&config)?;
            if let Some(path) = events {
                let sink = JsonlPresentationSink::open(&path)
                    .with_context(|| format!("cannot open event log {}", path.display()))?;
                assistant.set_presentation_sink(Arc::new(sink));
            }

            let mut session = SessionContext::new();
            let report = match assistant.summarize(&mut session, &documents).await {
                Ok(report) => report,
                Err(e) => return Err(report_failure(e)),
            };
            print_warnings(&report.warnings);
            println!("{}", report.summary);

            if let Some(target) = out {
                let path = summary_path(&target, &config.export);
                write_summary(&session, &path)?;
                eprintln!("Summary saved to {}", path.display());
            }

            if chat {
                chat_loop(&assistant, &mut session).await?;
            }

            if let Some(path) = transcript {
                write_transcript(&session, &path)?;
            }
            Ok(())
        }
    }
}

async fn chat_loop(assistant: &ReportAssistant, session: &mut SessionContext) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    eprintln!("Ask a follow-up question about the summary (\"exit\" to quit).");

    while let Some(line) = lines.next_line().await? {
        let question = line.trim();
        if question.eq_ignore_ascii_case("exit") {
            break;
        }
        if question.is_empty() {
            continue;
        }
        match assistant.ask(session, question).await {
            Ok(answer) => println!("\n{answer}\n"),
            // The question was rolled back; the user can simply ask again.
            Err(e) => eprintln!("error: {e}"),
        }
    }
    Ok(())
}

fn read_documents(files: &[PathBuf]) -> Result<Vec<UploadedDocument>> {
    files
        .iter()
        .map(|path| {
            UploadedDocument::from_path(path)
                .with_context(|| format!("cannot read {}", path.display()))
        })
        .collect()
}

fn print_warnings(warnings: &[IngestWarning]) {
    for warning in warnings {
        eprintln!("warning [{}]: {warning}", warning.kind.error_code());
    }
}

fn report_failure(err: AssistantError) -> anyhow::Error {
    if let AssistantError::Ingestion(IngestionError::EmptyCorpus { warnings }) = &err {
        print_warnings(warnings);
    }
    err.into()
}
