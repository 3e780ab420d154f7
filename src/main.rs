use anyhow::Context;
use clap::Parser;
use project_context::{Config, Pipeline};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "project-context",
    version,
    author,
    about = "Collate a project into a single Markdown file with per-file sections",
    long_about = "Collate a project's text source files into a single Markdown document.\n\n\
    Build, cache and dependency folders are skipped, large and binary files are \
    left out, and files are ordered alphabetically so repeated runs produce the \
    same output.\n\n\
    USAGE EXAMPLES:\n  \
      # Collate the current directory into project_context.md\n  \
      project-context\n\n  \
      # Collate another project, Rust and TOML files only\n  \
      project-context --root ../engine --only-exts .rs .toml\n\n  \
      # Raise the size limit and skip an extra folder\n  \
      project-context --max-kb 1024 --extra-dirs vendor"
)]
struct Cli {
    /// Root directory of the project
    #[arg(short, long, default_value = ".", value_name = "PATH")]
    root: PathBuf,

    /// Output Markdown filename
    #[arg(short, long, default_value = "project_context.md", value_name = "FILE")]
    output: PathBuf,

    /// Skip files larger than this size in KB
    #[arg(long, default_value_t = 512, value_name = "KB")]
    max_kb: u64,

    /// Include hidden files and directories
    #[arg(long)]
    include_hidden: bool,

    /// Additional directory names to exclude
    #[arg(long, num_args = 0.., value_name = "NAME")]
    extra_dirs: Vec<String>,

    /// Only include these extensions (e.g. --only-exts .gd .rs .toml)
    #[arg(long, num_args = 0.., value_name = "EXT")]
    only_exts: Vec<String>,

    /// Render the document without writing it
    #[arg(long)]
    dry_run: bool,

    /// Also write a JSON run summary to this path
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose);

    let mut builder = Config::builder()
        .root_dir(cli.root)
        .output_path(cli.output)
        .max_file_kb(cli.max_kb)
        .include_hidden(cli.include_hidden)
        .extra_excluded_dirs(cli.extra_dirs)
        .only_extensions(cli.only_exts)
        .dry_run(cli.dry_run);

    if let Some(summary) = cli.summary {
        builder = builder.summary_path(summary);
    }

    let config = builder.build().context("Failed to build configuration")?;
    let dry_run = config.dry_run;

    let summary = Pipeline::new(config)
        .context("Failed to create pipeline")?
        .run()
        .context("Collation failed")?;

    if dry_run {
        println!(
            "Dry run: {} files would be written to {}",
            summary.included_count,
            summary.output_path.display()
        );
    } else {
        println!("Created: {}", summary.output_path.display());
    }

    Ok(())
}

fn setup_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::new("project_context=info"),
        1 => EnvFilter::new("project_context=debug"),
        _ => EnvFilter::new("project_context=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_flags_accept_no_values() {
        let cli = Cli::try_parse_from(["project-context", "--only-exts", "--extra-dirs"]).unwrap();
        assert!(cli.only_exts.is_empty());
        assert!(cli.extra_dirs.is_empty());
    }

    #[test]
    fn test_list_flags_collect_values() {
        let cli = Cli::try_parse_from([
            "project-context",
            "--only-exts",
            ".rs",
            "toml",
            "--extra-dirs",
            "vendor",
            "--max-kb",
            "64",
        ])
        .unwrap();
        assert_eq!(cli.only_exts, vec![".rs", "toml"]);
        assert_eq!(cli.extra_dirs, vec!["vendor"]);
        assert_eq!(cli.max_kb, 64);
    }
}
