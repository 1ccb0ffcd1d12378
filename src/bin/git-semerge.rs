//! Thin entry point: parse args, load config, drive the pipeline over
//! every conflicted file, rewrite imports, stage results, print the
//! result record, and exit with the fixed exit-code contract (§6).

use semerge::cli::Cli;
use semerge::config::MergeConfig;
use semerge::error::SemergeError;
use semerge::orchestrator::{run_merge, RawFileJob};
use semerge::output::{ErrorPayload, FileResult, MergeResult};
use semerge::registry::Language;
use semerge::vcs::{Deadline, Stage, VcsDriver};
use semerge::vcs_git::GitDriver;
use semerge::write::{atomic_write, write_backup_if_absent};
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{layer::Layered, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

fn main() {
    let cli = Cli::parse();

    // `--json` reserves stdout for the machine-readable result record, so
    // log lines switch to structured JSON too rather than interleaving
    // human-formatted text with it.
    let fmt_layer: Box<dyn Layer<Layered<EnvFilter, tracing_subscriber::Registry>> + Send + Sync> = if cli.json {
        Box::new(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
    } else {
        Box::new(tracing_subscriber::fmt::layer())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" })))
        .with(fmt_layer)
        .init();

    let result = run(&cli);
    let exit_code = result.exit_code();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result).expect("MergeResult always serializes"));
    } else {
        print_human_summary(&result);
    }
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> MergeResult {
    let workspace_root = cli.resolved_workspace_root();
    let mut config = MergeConfig::load(&workspace_root).unwrap_or_else(|err| {
        warn!(error = %err, "failed to parse .semerge.toml, using defaults");
        MergeConfig::default()
    });
    config.dry_run = config.dry_run || cli.dry_run;
    config.create_backup = config.create_backup && !cli.no_backup;
    config.verbose = config.verbose || cli.verbose;
    if let Some(secs) = cli.git_timeout_secs {
        config.git_timeout_secs = secs;
    }

    let driver = GitDriver::new(workspace_root.clone());
    let deadline = Deadline::after(config.git_timeout());

    match driver.is_repository(deadline) {
        Ok(true) => {}
        Ok(false) => return fatal_from(SemergeError::NotARepository),
        Err(err) => return fatal_from(err),
    }

    let paths = if cli.files.is_empty() {
        match driver.conflicted_files(deadline) {
            Ok(paths) => paths,
            Err(err) => return fatal_from(err),
        }
    } else {
        cli.files.iter().map(|p| p.to_string_lossy().into_owned()).collect()
    };

    info!(count = paths.len(), "resolving conflicted files");

    let mut jobs = Vec::with_capacity(paths.len());
    let mut read_errors = Vec::new();
    for path in &paths {
        match read_job(&driver, path, deadline) {
            Ok(job) => jobs.push(job),
            Err(err) => read_errors.push((path.clone(), err)),
        }
    }

    let extractors = semerge_extract::build_registry();
    let (outcomes, moves) = run_merge(jobs, &extractors, &config);

    if !config.dry_run && !moves.is_empty() {
        let options = semerge_imports::RewriteOptions { workspace_root: workspace_root.clone(), dry_run: false };
        match semerge_imports::rewrite_imports(&moves, &options) {
            Ok(updates) => info!(count = updates.len(), "rewrote imports following inter-file moves"),
            Err(err) => warn!(error = %err, "import rewrite failed; moved definitions may leave stale imports"),
        }
    }

    let mut files: Vec<FileResult> = Vec::with_capacity(outcomes.len() + read_errors.len());
    for outcome in outcomes {
        let path = workspace_root.join(&outcome.path);
        let write_result = if config.dry_run {
            Ok(())
        } else {
            write_outcome(&path, &outcome, &config).and_then(|_| {
                if !outcome.synth.has_markers {
                    driver.stage_file(&outcome.path, deadline)?;
                }
                Ok(())
            })
        };
        files.push(FileResult {
            file: outcome.path,
            conflict_count: outcome.synth.total_conflicts,
            resolved_count: outcome.synth.resolved_count,
            all_auto_merged: outcome.synth.total_conflicts == outcome.synth.resolved_count,
            has_markers: outcome.synth.has_markers,
            error: write_result.err().map(|e: SemergeError| e.to_string()),
        });
    }
    for (path, err) in read_errors {
        files.push(FileResult { file: path, conflict_count: 0, resolved_count: 0, all_auto_merged: false, has_markers: true, error: Some(err.to_string()) });
    }

    MergeResult::new(files)
}

fn read_job(driver: &GitDriver, path: &str, deadline: Deadline) -> Result<RawFileJob, SemergeError> {
    let base = driver.read_stage(path, Stage::Base, deadline)?;
    let local = driver.read_stage(path, Stage::Local, deadline)?;
    let remote = driver.read_stage(path, Stage::Remote, deadline)?;
    let language = Language::from_path(Path::new(path));
    Ok(RawFileJob { path: path.to_string(), language, base, local, remote })
}

fn write_outcome(path: &Path, outcome: &semerge::orchestrator::FileOutcome, config: &MergeConfig) -> Result<(), SemergeError> {
    if config.create_backup {
        if let Ok(pre_merge_local) = std::fs::read(path) {
            write_backup_if_absent(path, &pre_merge_local)?;
        }
    }
    atomic_write(path, &outcome.synth.bytes)
}

fn fatal_from(err: SemergeError) -> MergeResult {
    let code = err.exit_code().map(|c| c.code()).unwrap_or(2);
    MergeResult::fatal(ErrorPayload { code, message: err.to_string(), details: None })
}

fn print_human_summary(result: &MergeResult) {
    if let Some(err) = &result.error {
        eprintln!("git-semerge: {}", err.message);
        return;
    }
    for file in &result.files {
        let status = if file.has_markers { "NEEDS RESOLUTION" } else { "resolved" };
        println!("{}: {}/{} conflicts {status}", file.file, file.resolved_count, file.conflict_count);
    }
    println!(
        "{} file(s), {}/{} conflicts resolved",
        result.files.len(),
        result.resolved_count,
        result.total_conflicts
    );
}
