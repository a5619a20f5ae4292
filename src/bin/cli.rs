//! CLI binary for industry-scout.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use industry_scout::config::PathsConfig;
use industry_scout::project::find_project_root;
use industry_scout::{
    LinkProgress, Pipeline, ProgressCallback, ProgressEvent, ProjectLayout, ScoutConfig,
    ScoutError, Services,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Find, summarise and judge information sources for an industry.
#[derive(Parser)]
#[command(name = "industry-scout", version, about)]
struct Cli {
    /// Project root (default: nearest ancestor containing the root marker).
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Path to TOML configuration file (default: <root>/industry-scout.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Discover links, summarise new ones and write reports.
    Run {
        /// Industry query files to run (with or without `.json`).
        #[arg(short, long = "industry", required = true, num_args = 1..)]
        industries: Vec<String>,

        /// Skip report aggregation.
        #[arg(long)]
        no_report: bool,
    },

    /// Search every query and save result links with their page titles.
    Discover {
        /// Industry query files to search.
        #[arg(short, long = "industry", required = true, num_args = 1..)]
        industries: Vec<String>,
    },

    /// Judge existing summaries and write reports.
    Report {
        /// Industries to report on.
        #[arg(short, long = "industry", required = true, num_args = 1..)]
        industries: Vec<String>,
    },

    /// Write the default configuration file.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Command::InitConfig { force } = cli.command {
        industry_scout::logging::init(None)?;
        return init_config(cli.root.as_deref(), cli.config.as_deref(), force);
    }

    let (config, layout) = resolve(cli.root.as_deref(), cli.config.as_deref())?;

    let _log_guard = industry_scout::logging::init(Some(&layout.logs_dir()))?;
    tracing::info!(root = %layout.root().display(), "industry-scout v{}", env!("CARGO_PKG_VERSION"));

    let services = Services::from_config(&config)?;
    match cli.command {
        Command::Run {
            industries,
            no_report,
        } => run(layout, config, services, &industries, !no_report).await,
        Command::Discover { industries } => {
            let pipeline = Pipeline::new(layout, config, services);
            let path = pipeline.discover(&industries).await?;
            println!("Raw sources saved to {}", path.display());
            Ok(())
        }
        Command::Report { industries } => {
            let pipeline = Pipeline::new(layout, config, services);
            print_reports(pipeline.report(&industries).await.iter());
            Ok(())
        }
        Command::InitConfig { .. } => Ok(()),
    }
}

/// Load the configuration and locate the project.
///
/// An explicit config file is read first so its root marker can be used to
/// find the root; otherwise the default marker is used and the root's own
/// config file, if present, is loaded.
fn resolve(root: Option<&Path>, config: Option<&Path>) -> Result<(ScoutConfig, ProjectLayout), ScoutError> {
    let explicit = config.map(ScoutConfig::from_file).transpose()?;
    let paths = explicit
        .as_ref()
        .map(|c| c.paths.clone())
        .unwrap_or_default();

    let found = match root {
        Some(root) => ProjectLayout::at(root, paths)?,
        None => ProjectLayout::discover(paths)?,
    };

    let config = match explicit {
        Some(config) => {
            config.validate()?;
            config
        }
        None => ScoutConfig::load(None, found.root())?,
    };
    let layout = ProjectLayout::at(found.root(), config.paths.clone())?;
    Ok((config, layout))
}

fn init_config(root: Option<&Path>, explicit: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let path = match (explicit, root) {
        (Some(path), _) => path.to_path_buf(),
        (None, Some(root)) => ScoutConfig::default_config_path(root),
        (None, None) => {
            let cwd = std::env::current_dir()?;
            let root = find_project_root(&cwd, &PathsConfig::default().root_marker).unwrap_or(cwd);
            ScoutConfig::default_config_path(&root)
        }
    };
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    ScoutConfig::default().save_to_file(&path)?;
    println!("Configuration written to {}", path.display());
    Ok(())
}

async fn run(
    layout: ProjectLayout,
    config: ScoutConfig,
    services: Services,
    industries: &[String],
    report: bool,
) -> anyhow::Result<()> {
    let bar = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::with_template(
        "  Processing Links [{bar:30}] {pos}/{len} {elapsed_precise} {wide_msg}",
    ) {
        bar.set_style(style);
    }
    let progress = Arc::new(LinkProgress::with_callback(progress_callback(bar.clone())));

    let pipeline = Pipeline::new(layout, config, services).with_progress(progress);
    let result = pipeline.run(industries, report).await;
    bar.finish_and_clear();
    let result = result?;

    println!("{}", result.total);
    for (industry, entry) in &result.industries {
        println!("  {industry}: {}", entry.links);
    }
    if report {
        print_reports(
            result
                .industries
                .iter()
                .map(|(industry, entry)| (industry, &entry.report)),
        );
    }
    Ok(())
}

fn progress_callback(bar: ProgressBar) -> ProgressCallback {
    Box::new(move |event| match event {
        ProgressEvent::Planned { total } => bar.set_length(total as u64),
        ProgressEvent::Started { .. } => {}
        ProgressEvent::Finished { url, completed, .. } => {
            bar.set_position(completed as u64);
            bar.set_message(url);
        }
    })
}

fn print_reports<'a>(reports: impl Iterator<Item = (&'a String, &'a Option<PathBuf>)>) {
    for (industry, path) in reports {
        match path {
            Some(path) => println!("Report for {industry}: {}", path.display()),
            None => println!("No report for {industry} (no summaries)"),
        }
    }
}
