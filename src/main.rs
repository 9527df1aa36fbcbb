use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use ctxpack::config::Config;
use ctxpack::processor::Processor;
use ctxpack::scanner::{self, Scanner};
use ctxpack::tree::directory_tree;
use ctxpack::writer::FileWriter;

/// Pack a directory tree into a single LLM-ready context artifact.
#[derive(Parser, Debug)]
#[command(name = "ctxpack", version, about)]
struct Cli {
    /// Directory to pack
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Config file path (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file path (overrides config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: xml, json, or yaml (overrides config)
    #[arg(short, long)]
    format: Option<String>,

    /// Strip comments from recognized languages
    #[arg(long)]
    strip_comments: bool,

    /// Worker pool size (overrides config)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Maximum number of files to pack (overrides config, 0 = unlimited)
    #[arg(long)]
    max_files: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(output) = &cli.output {
        config.writer.output_path = output.to_string_lossy().into_owned();
    }
    if let Some(format) = &cli.format {
        config.writer.format = format.clone();
    }
    if cli.strip_comments {
        config.processor.strip_comments = true;
    }
    if let Some(workers) = cli.workers {
        config.scanner.workers = workers as i64;
    }
    if let Some(max_files) = cli.max_files {
        config.scanner.max_files = max_files as i64;
    }
    config.validate()?;

    let opts = config.scan_options(&cli.root);
    let mut s = Scanner::new().with_workers(config.scanner.workers as usize);
    let (results, errors) = s.scan(opts);
    let (mut entries, errs) = scanner::drain(results, errors).await;

    for err in &errs {
        tracing::warn!(path = ?err.path(), "skipped during scan: {}", err);
    }
    tracing::info!(files = entries.len(), errors = errs.len(), "scan complete");

    for entry in &mut entries {
        entry.is_selected = true;
    }

    let processor = Processor::new(config.processor_options())?;
    let processed = processor.process_all(&cli.root, &entries);

    let writer_opts = config.writer_options()?;
    let output_path = writer_opts.output_path.clone();
    let mut writer = FileWriter::new(writer_opts)?;

    let cwd = std::env::current_dir()?;
    writer.write_directory_context(
        cwd.to_string_lossy(),
        directory_tree(&cli.root, &config.scanner.ignore_patterns),
    );

    for result in processed {
        match result {
            Ok(content) if !content.content.is_empty() => writer.write(content)?,
            Ok(content) => {
                tracing::debug!(path = %content.entry.path, "nothing to pack");
            }
            Err(err) => tracing::warn!("skipped during processing: {}", err),
        }
    }

    let staged = writer.staged();
    writer.close()?;
    if staged > 0 {
        println!("{}", output_path.display());
    } else {
        tracing::info!("no packable content found, no artifact written");
    }

    Ok(())
}
