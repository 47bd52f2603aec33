use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pom_bump::config;
use pom_bump::scenario::Scenario;
use pom_bump::session::{RunMode, Session};
use pom_bump::ui;
use pom_bump::vcs;

#[derive(clap::Parser)]
#[command(
    name = "pom-bump",
    version,
    about = "Bump versions and references across Maven pom.xml files"
)]
struct Args {
    #[arg(help = "Base directory of the module tree")]
    base_dir: PathBuf,

    #[arg(help = "Scenario file naming the modules and their new versions")]
    scenario: PathBuf,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(
        short,
        long,
        conflicts_with = "revert",
        help = "Apply the scenario without writing anything"
    )]
    dry_run: bool,

    #[arg(
        short,
        long,
        conflicts_with_all = ["dry_run", "revert"],
        help = "Write pom.xml files but never commit or label"
    )]
    prepare_test_build: bool,

    #[arg(short, long, help = "Restore uncommitted pom.xml changes")]
    revert: bool,

    #[arg(short, long, help = "Report SNAPSHOT references after applying the scenario")]
    warn_snapshots: bool,

    #[arg(short, long, help = "Skip confirmation prompts")]
    force: bool,

    #[arg(short, long, help = "Show debug logging")]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<()> {
    let mode = RunMode::from_flags(args.dry_run, args.prepare_test_build, args.revert);

    let config = config::load_config(args.config.as_deref()).context("Error loading config")?;
    let backend = vcs::from_config(&config)?;
    info!(vcs = backend.name(), %mode, "starting");

    let scenario = Scenario::load(&args.scenario)?;
    let mut session = Session::new(&args.base_dir).with_version_control(backend);
    scenario
        .apply(&mut session)
        .with_context(|| format!("Cannot apply {}", args.scenario.display()))?;

    ui::display_bumps(&session.bumps());

    for warning in session.warnings(args.warn_snapshots) {
        ui::display_warning(&warning);
    }
    if args.warn_snapshots {
        ui::display_snapshot_report(&session.snapshot_report());
    }

    let commits = mode == RunMode::Normal && !session.version_control().is_noop();
    if commits && !args.force {
        let prompt = format!(
            "Commit {} module(s) using {}?",
            session.modules().len(),
            session.version_control().name()
        );
        if !ui::confirm_action(&prompt)? {
            println!("Operation cancelled by user.");
            return Ok(());
        }
    }

    if mode.writes() || mode == RunMode::Revert {
        ui::display_status(&format!("Running in {} mode", mode));
    }
    let summary = session.run(mode)?;
    ui::display_summary(&summary);

    Ok(())
}
