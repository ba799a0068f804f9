//! Prune command implementation.
//!
//! Fetches every image version of a package, applies the retention policy and
//! deletes the versions it does not preserve.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Args;
use tracing::{info, warn};

use retainer_core::RetentionPolicy;
use retainer_registry::{
    fetch_catalog, DeletionExecutor, DeletionOutcome, DeletionReport, DeletionResult,
    GithubPackagesClient, PackageRegistry, DEFAULT_CONCURRENCY,
};

use super::{kept_lines, RunStatus};
use crate::config::{executor_config, ConfirmMode, Environment, PolicyArgs, TargetArgs};

/// Arguments for the prune command.
#[derive(Args)]
pub struct PruneArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub policy: PolicyArgs,

    /// Maximum concurrent delete requests (1-8)
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Print the plan without deleting anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Settings for one prune run.
#[derive(Debug, Clone)]
pub struct PruneOptions {
    /// Listing page size.
    pub page_size: u32,

    /// Whether to ask before deleting.
    pub mode: ConfirmMode,

    /// Print the plan and stop.
    pub dry_run: bool,

    /// Raise the cancel flag on Ctrl-C while deleting.
    pub watch_interrupt: bool,
}

/// Executes the prune command.
///
/// # Errors
///
/// Returns an error if:
/// - The configuration is incomplete or invalid
/// - The registry client cannot be created
/// - The version listing cannot be fetched
/// - The confirmation prompt cannot be read
pub async fn execute(args: PruneArgs) -> Result<RunStatus> {
    let env = Environment::from_process();
    let target = args.target.resolve(&env)?;
    let executor = DeletionExecutor::new(executor_config(args.concurrency, args.target.timeout)?);
    let policy = args.policy.retention_policy();
    let options = PruneOptions {
        page_size: target.page_size,
        mode: ConfirmMode::from_flags(args.yes, &env),
        dry_run: args.dry_run,
        watch_interrupt: true,
    };

    info!(
        owner = %target.registry.owner,
        package = %target.registry.package,
        keep = policy.keep(),
        dry_run = args.dry_run,
        "Pruning image versions"
    );

    println!(
        "Fetching package versions for {}/{}...",
        target.registry.owner, target.registry.package
    );
    let client =
        GithubPackagesClient::new(target.registry).context("Failed to create registry client")?;

    run(
        &client,
        &policy,
        &executor,
        &options,
        io::stdin().lock(),
        &mut io::stdout(),
    )
    .await
}

/// Fetches, evaluates and deletes against `registry`.
///
/// The confirmation answer is read from `input`; operator output goes to
/// `out`.
///
/// # Errors
///
/// Returns an error if the listing cannot be fetched, or if `input` or
/// `out` fail.
pub async fn run<R, B, W>(
    registry: &R,
    policy: &RetentionPolicy,
    executor: &DeletionExecutor,
    options: &PruneOptions,
    mut input: B,
    out: &mut W,
) -> Result<RunStatus>
where
    R: PackageRegistry + ?Sized,
    B: BufRead,
    W: Write,
{
    let catalog = fetch_catalog(registry, options.page_size)
        .await
        .context("Failed to fetch package versions")?;
    writeln!(out, "Found {} image versions", catalog.len())?;

    let plan = policy.evaluate(&catalog);
    for line in kept_lines(&plan, policy.keep()) {
        writeln!(out, "{line}")?;
    }
    writeln!(out)?;
    writeln!(out, "{}", plan.summary())?;

    if plan.nothing_to_delete() {
        writeln!(out, "No images to delete.")?;
        return Ok(RunStatus::Completed);
    }

    let count = plan.delete_ids.len();

    if options.dry_run {
        writeln!(out)?;
        writeln!(out, "Dry run: {count} image versions would be deleted:")?;
        for id in &plan.delete_ids {
            writeln!(out, "  {id}")?;
        }
        return Ok(RunStatus::Completed);
    }

    match options.mode {
        ConfirmMode::Unattended => {
            writeln!(out, "Running in CI mode, proceeding with deletion...")?;
        }
        ConfirmMode::Interactive => {
            if !confirm(count, &mut input, out)? {
                writeln!(out, "Aborted.")?;
                return Ok(RunStatus::Aborted);
            }
        }
    }

    let interrupt = options.watch_interrupt.then(|| {
        let cancel = executor.cancel_flag();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
                warn!("Interrupt received, waiting for in-flight deletions");
            }
        })
    });

    let mut write_error = None;
    let report = executor
        .execute(registry, plan.delete_ids.iter().copied(), |result| {
            if let Err(e) = writeln!(out, "{}", result_line(result)) {
                write_error.get_or_insert(e);
            }
        })
        .await;
    if let Some(handle) = interrupt {
        handle.abort();
    }
    if let Some(e) = write_error {
        return Err(e.into());
    }

    writeln!(out)?;
    for line in report_lines(&report) {
        writeln!(out, "{line}")?;
    }

    if report.cancelled {
        return Ok(RunStatus::Interrupted);
    }
    Ok(RunStatus::Completed)
}

/// Asks the operator to confirm deleting `count` versions.
fn confirm<B, W>(count: usize, input: &mut B, out: &mut W) -> Result<bool>
where
    B: BufRead,
    W: Write,
{
    write!(out, "Delete {count} old images? (y/N): ")?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

fn result_line(result: &DeletionResult) -> String {
    match &result.outcome {
        DeletionOutcome::Deleted => format!("✓ Deleted image version {}", result.id),
        DeletionOutcome::AlreadyGone => format!("- Image version {} already gone", result.id),
        DeletionOutcome::Failed(detail) => format!("✗ Failed to delete {}: {detail}", result.id),
    }
}

fn report_lines(report: &DeletionReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Deleted {}/{} images.",
        report.succeeded,
        report.total()
    )];

    if report.already_gone > 0 {
        lines.push(format!("Already gone: {}", report.already_gone));
    }
    if report.failed > 0 {
        lines.push(format!("Failed: {}", report.failed));
    }
    if report.cancelled {
        lines.push(format!(
            "Interrupted: {} image versions were not attempted.",
            report.skipped
        ));
    }

    lines
}
