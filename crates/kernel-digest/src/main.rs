//! Kernel digest CLI - daily kernel fusion research digest.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::{MakeWriter, MakeWriterExt, OrElse, WithMaxLevel};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kernel_digest::config::DigestConfig;
use kernel_digest::digest::EmailSender;
use kernel_digest::pipeline::{Delivery, Pipeline};

/// Kernel digest CLI - Search arXiv and Semantic Scholar and mail a ranked digest.
#[derive(Parser)]
#[command(name = "kernel-digest")]
#[command(about = "Kernel fusion / CuTe DSL research digest")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the digest once (default; for cron use)
    Run {
        /// Render a local preview instead of sending (same as DRY_RUN=1)
        #[arg(long)]
        dry_run: bool,

        /// Preview file path for dry runs
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Send a short test email to check Gmail credentials
    SendTest,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing, RUST_LOG wins over the verbosity flag
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("kernel_digest=debug,info")
        } else {
            EnvFilter::new("kernel_digest=info,warn")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(log_writer(std::io::stdout, std::io::stderr)))
        .with(filter)
        .init();

    let config = DigestConfig::from_env().context("Failed to load configuration")?;

    match cli.command.unwrap_or(Commands::Run {
        dry_run: false,
        output: None,
    }) {
        Commands::Run { dry_run, output } => run_digest(config, dry_run, output).await,
        Commands::SendTest => run_send_test(config).await,
    }
}

/// Warnings and errors go to `err`, everything else to `out`.
fn log_writer<O, E>(out: O, err: E) -> OrElse<WithMaxLevel<E>, O>
where
    O: for<'a> MakeWriter<'a>,
    E: for<'a> MakeWriter<'a>,
{
    err.with_max_level(Level::WARN).or_else(out)
}

async fn run_digest(
    mut config: DigestConfig,
    dry_run: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    config.dry_run |= dry_run;
    if let Some(path) = output {
        config.preview_path = path;
    }

    let pipeline = Pipeline::new(config).context("Failed to create search clients")?;
    let summary = pipeline.run().await.context("Digest delivery failed")?;

    // Print summary
    println!("\nDigest Summary");
    println!("   Raw results:   {}", summary.raw);
    println!("   After dedup:   {}", summary.deduped);
    println!("   In window:     {}", summary.recent);
    if summary.fell_back {
        println!("   (no recent papers, fell back to relevance)");
    }
    println!("   Selected:      {}", summary.selected.len());
    match summary.outcome {
        Delivery::Sent { message_id } => println!("   Sent:          {message_id}"),
        Delivery::Preview { path } => println!("   Preview:       {}", path.display()),
    }

    Ok(())
}

async fn run_send_test(config: DigestConfig) -> Result<()> {
    let sender = EmailSender::from_env(&config).context("Failed to configure email sender")?;
    let message_id = sender.send_test().await.context("Test email failed")?;

    tracing::info!(to = %config.recipient, message_id = %message_id, "Test email sent");
    println!("Test email sent to {} ({message_id})", config.recipient);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_warnings_are_written_to_error_stream() {
        let out = Captured::default();
        let err = Captured::default();
        let (out_writer, err_writer) = (out.clone(), err.clone());

        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(log_writer(move || out_writer.clone(), move || err_writer.clone())),
        );
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("Query complete");
            tracing::warn!("Search failed, treating as no results");
            tracing::error!("Digest delivery failed");
        });

        let out = out.contents();
        let err = err.contents();
        assert!(out.contains("Query complete"));
        assert!(!out.contains("Search failed"));
        assert!(err.contains("Search failed, treating as no results"));
        assert!(err.contains("Digest delivery failed"));
        assert!(!err.contains("Query complete"));
    }
}
