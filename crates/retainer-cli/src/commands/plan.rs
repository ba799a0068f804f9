//! Plan command implementation.
//!
//! Evaluates the retention policy and prints the decision for every image
//! version. Never prompts and never deletes.

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use retainer_core::{Catalog, RetentionPlan};
use retainer_registry::{fetch_catalog, GithubPackagesClient};

use super::{kept_lines, RunStatus};
use crate::config::{Environment, PolicyArgs, TargetArgs};

/// Arguments for the plan command.
#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

/// Executes the plan command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the version listing
/// cannot be fetched.
pub async fn execute(args: PlanArgs) -> Result<RunStatus> {
    let target = args.target.resolve(&Environment::from_process())?;
    let policy = args.policy.retention_policy();

    info!(
        owner = %target.registry.owner,
        package = %target.registry.package,
        keep = policy.keep(),
        "Planning retention"
    );

    println!(
        "Fetching package versions for {}/{}...",
        target.registry.owner, target.registry.package
    );
    let client =
        GithubPackagesClient::new(target.registry).context("Failed to create registry client")?;
    let catalog = fetch_catalog(&client, target.page_size)
        .await
        .context("Failed to fetch package versions")?;
    println!("Found {} image versions", catalog.len());

    let plan = policy.evaluate(&catalog);
    for line in kept_lines(&plan, policy.keep()) {
        println!("{line}");
    }

    println!();
    for line in decision_lines(&catalog, &plan) {
        println!("{line}");
    }

    println!();
    println!("{}", plan.summary());

    Ok(RunStatus::Completed)
}

/// Renders one line per version, in catalog order.
fn decision_lines(catalog: &Catalog, plan: &RetentionPlan) -> Vec<String> {
    catalog
        .iter()
        .zip(&plan.decisions)
        .map(|(record, decision)| {
            let tags = if record.tags.is_empty() {
                "<untagged>".to_string()
            } else {
                record.tags.join(", ")
            };

            match &decision.justification {
                Some(why) => format!(
                    "  keep   {} [{tags}] {}: {}",
                    record.id, why.tag, why.reason
                ),
                None => format!("  delete {} [{tags}]", record.id),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use retainer_core::{RetentionPolicy, VersionRecord};

    use super::*;

    #[test]
    fn test_decision_lines() {
        let now = Utc::now();
        let catalog = Catalog::from_records(vec![
            VersionRecord::new(1, ["1.0.0"], now),
            VersionRecord::new(2, ["1.1.0", "latest"], now),
            VersionRecord::new(3, Vec::<String>::new(), now),
            VersionRecord::new(4, ["sha-deadbeef"], now),
        ]);
        let plan = RetentionPolicy::new(1).evaluate(&catalog);

        assert_eq!(
            decision_lines(&catalog, &plan),
            vec![
                "  delete 1 [1.0.0]",
                "  keep   2 [1.1.0, latest] 1.1.0: within keep window (#1)",
                "  delete 3 [<untagged>]",
                "  keep   4 [sha-deadbeef] sha-deadbeef: non-semantic tag",
            ]
        );
    }
}
