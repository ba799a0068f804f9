//! CLI commands and argument parsing.

pub mod plan;
pub mod prune;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use retainer_core::{PreserveReason, RetentionPlan};

/// Retainer - retention policy for GHCR container images
#[derive(Parser)]
#[command(name = "retainer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Delete image versions outside the retention policy
    Prune(prune::PruneArgs),

    /// Show the decision for every image version without deleting
    Plan(plan::PlanArgs),

    /// Print version information
    Version,
}

/// How a command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Completed normally.
    Completed,

    /// The operator declined the confirmation prompt.
    Aborted,

    /// Interrupted by the operator during deletion.
    Interrupted,
}

impl RunStatus {
    /// Process exit code for this status.
    pub const fn code(self) -> u8 {
        match self {
            Self::Completed => 0,
            Self::Aborted => 3,
            Self::Interrupted => 130,
        }
    }
}

impl From<RunStatus> for ExitCode {
    fn from(status: RunStatus) -> Self {
        Self::from(status.code())
    }
}

/// Renders the kept versions: the keep window one line per tag, then every
/// version kept by an alias or a non-semantic tag.
fn kept_lines(plan: &RetentionPlan, keep: usize) -> Vec<String> {
    let mut lines = vec![format!("Keeping {keep} most recent versions:")];
    for kept in &plan.keep_window {
        let reason = PreserveReason::KeepWindow { rank: kept.rank };
        for tag in &kept.tags {
            lines.push(format!("  - {tag} ({}, {reason})", kept.version));
        }
    }

    let others: Vec<String> = plan
        .decisions
        .iter()
        .filter_map(|decision| {
            decision
                .justification
                .as_ref()
                .filter(|why| !matches!(why.reason, PreserveReason::KeepWindow { .. }))
                .map(|why| {
                    format!(
                        "  - {} (image version {}, {})",
                        why.tag, decision.id, why.reason
                    )
                })
        })
        .collect();

    if !others.is_empty() {
        lines.push("Also preserving:".to_string());
        lines.extend(others);
    }

    lines
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use clap::CommandFactory;
    use retainer_core::{Catalog, RetentionPolicy, VersionRecord};

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(RunStatus::Completed.code(), 0);
        assert_eq!(RunStatus::Aborted.code(), 3);
        assert_eq!(RunStatus::Interrupted.code(), 130);
    }

    #[test]
    fn test_parse_prune_flags() {
        let cli = Cli::try_parse_from([
            "retainer",
            "prune",
            "--package",
            "vllm-custom",
            "--owner",
            "acme",
            "--token",
            "t",
            "-k",
            "3",
            "--alias",
            "latest",
            "--alias",
            "stable",
            "--dry-run",
        ])
        .unwrap();

        let Commands::Prune(args) = cli.command else {
            panic!("Expected prune command");
        };
        assert_eq!(args.policy.keep, 3);
        assert_eq!(args.policy.aliases, vec!["latest", "stable"]);
        assert_eq!(args.policy.variant_suffixes, vec!["-avx2"]);
        assert_eq!(args.concurrency, 4);
        assert!(args.dry_run);
        assert!(!args.yes);
    }

    #[test]
    fn test_parse_hyphen_led_values() {
        let cli = Cli::try_parse_from([
            "retainer",
            "plan",
            "--variant-suffix",
            "-arm64",
            "--variant-suffix",
            "-avx2",
            "--alias",
            "-edge",
            "--keep",
            "2",
        ])
        .unwrap();

        let Commands::Plan(args) = cli.command else {
            panic!("Expected plan command");
        };
        assert_eq!(args.policy.variant_suffixes, vec!["-arm64", "-avx2"]);
        assert_eq!(args.policy.aliases, vec!["-edge"]);
        assert_eq!(args.policy.keep, 2);
    }

    #[test]
    fn test_kept_lines() {
        let now = Utc::now();
        let catalog = Catalog::from_records(vec![
            VersionRecord::new(1, ["1.0.0"], now),
            VersionRecord::new(2, ["1.1.0", "1.1.0-avx2"], now),
            VersionRecord::new(3, ["latest"], now),
            VersionRecord::new(4, ["sha-deadbeef"], now),
            VersionRecord::new(5, Vec::<String>::new(), now),
        ]);
        let plan = RetentionPolicy::new(1).evaluate(&catalog);

        assert_eq!(
            kept_lines(&plan, 1),
            vec![
                "Keeping 1 most recent versions:",
                "  - 1.1.0 (1.1.0, within keep window (#1))",
                "  - 1.1.0-avx2 (1.1.0, within keep window (#1))",
                "Also preserving:",
                "  - latest (image version 3, reserved alias)",
                "  - sha-deadbeef (image version 4, non-semantic tag)",
            ]
        );
    }

    #[test]
    fn test_kept_lines_without_extra_preserved_versions() {
        let catalog = Catalog::from_records(vec![VersionRecord::new(1, ["2.0.0"], Utc::now())]);
        let plan = RetentionPolicy::new(3).evaluate(&catalog);

        assert_eq!(
            kept_lines(&plan, 3),
            vec![
                "Keeping 3 most recent versions:",
                "  - 2.0.0 (2.0.0, within keep window (#1))",
            ]
        );
    }
}
