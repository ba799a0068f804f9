//! Run configuration resolved from flags and the environment.
//!
//! Everything is resolved once, before any network call, into the typed
//! settings the library crates take.

use std::time::Duration;

use clap::Args;
use thiserror::Error;

use retainer_core::{RetentionPolicy, TagClassifier, DEFAULT_KEEP};
use retainer_registry::{
    ExecutorConfig, OwnerKind, RegistryAuth, RegistryConfig, RegistryError, DEFAULT_API_URL,
    MAX_CONCURRENCY, MAX_PAGE_SIZE,
};

/// Errors raised while resolving the run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No package owner could be determined.
    #[error("could not determine the package owner; pass --owner or set GITHUB_REPOSITORY_OWNER")]
    MissingOwner,

    /// No package name could be determined.
    #[error("could not determine the package name; pass --package or set GITHUB_REPOSITORY")]
    MissingPackage,

    /// No credential was supplied.
    #[error("no token supplied; pass --token or set GITHUB_TOKEN")]
    MissingToken,

    /// A numeric option is out of range.
    #[error("invalid value for --{name}: {reason}")]
    InvalidOption {
        /// Option name without dashes.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The registry settings are invalid.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Process environment consulted for fallbacks.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// `GITHUB_REPOSITORY`, in `owner/name` form.
    pub repository: Option<String>,

    /// `GITHUB_ACTOR`.
    pub actor: Option<String>,

    /// Whether `CI` is set to a non-empty value.
    pub ci: bool,
}

impl Environment {
    /// Reads the fallbacks from the current process environment.
    pub fn from_process() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        Self {
            repository: var("GITHUB_REPOSITORY"),
            actor: var("GITHUB_ACTOR"),
            ci: var("CI").is_some(),
        }
    }

    fn repository_name(&self) -> Option<String> {
        self.repository
            .as_deref()
            .and_then(|repo| repo.rsplit_once('/'))
            .map(|(_, name)| name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}

/// Registry connection options shared by every command.
#[derive(Args, Clone)]
pub struct TargetArgs {
    /// Package name (defaults to the repository name of GITHUB_REPOSITORY)
    #[arg(short, long, env = "RETAINER_PACKAGE")]
    pub package: Option<String>,

    /// Package owner (defaults to GITHUB_ACTOR)
    #[arg(short, long, env = "GITHUB_REPOSITORY_OWNER")]
    pub owner: Option<String>,

    /// Treat the owner as a user account instead of an organization
    #[arg(long)]
    pub user: bool,

    /// Bearer token for the GitHub API
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout: u64,

    /// Versions requested per listing page (at most 100)
    #[arg(long, default_value = "100")]
    pub page_size: u32,
}

/// Retention policy options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct PolicyArgs {
    /// Number of semantic versions to keep
    #[arg(short, long, default_value_t = DEFAULT_KEEP)]
    pub keep: usize,

    /// Tag suffix marking a build variant of a version
    #[arg(
        long = "variant-suffix",
        allow_hyphen_values = true,
        default_values_t = ["-avx2".to_string()]
    )]
    pub variant_suffixes: Vec<String>,

    /// Tag that is always preserved
    #[arg(long = "alias", allow_hyphen_values = true, default_values_t = ["latest".to_string()])]
    pub aliases: Vec<String>,
}

impl PolicyArgs {
    /// Builds the retention policy.
    pub fn retention_policy(&self) -> RetentionPolicy {
        let classifier = self
            .aliases
            .iter()
            .fold(TagClassifier::empty(), |c, alias| c.with_reserved_alias(alias));
        let classifier = self
            .variant_suffixes
            .iter()
            .fold(classifier, |c, suffix| c.with_variant_suffix(suffix));

        RetentionPolicy::new(self.keep).with_classifier(classifier)
    }
}

/// Resolved registry target.
#[derive(Debug, Clone)]
pub struct Target {
    /// Client configuration.
    pub registry: RegistryConfig,

    /// Listing page size.
    pub page_size: u32,
}

impl TargetArgs {
    /// Resolves the registry target.
    ///
    /// # Errors
    ///
    /// Returns an error if the owner, package or token cannot be determined,
    /// or if an option is out of range.
    pub fn resolve(&self, env: &Environment) -> Result<Target, ConfigError> {
        let owner = non_empty(self.owner.as_deref())
            .or_else(|| non_empty(env.actor.as_deref()))
            .ok_or(ConfigError::MissingOwner)?;
        let package = non_empty(self.package.as_deref())
            .or_else(|| env.repository_name())
            .ok_or(ConfigError::MissingPackage)?;
        let auth = determine_auth(self)?;

        if self.timeout == 0 {
            return Err(ConfigError::InvalidOption {
                name: "timeout",
                reason: "must be at least 1 second".to_string(),
            });
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidOption {
                name: "page-size",
                reason: format!("must be between 1 and {MAX_PAGE_SIZE}"),
            });
        }

        let owner_kind = if self.user {
            OwnerKind::User
        } else {
            OwnerKind::Organization
        };

        let registry = RegistryConfig::new(owner, package)
            .with_api_url(&self.api_url)
            .with_owner_kind(owner_kind)
            .with_auth(auth)
            .with_timeout(Duration::from_secs(self.timeout));
        registry.validate()?;

        Ok(Target {
            registry,
            page_size: self.page_size,
        })
    }
}

/// Determines the authentication method from CLI arguments.
fn determine_auth(args: &TargetArgs) -> Result<RegistryAuth, ConfigError> {
    non_empty(args.token.as_deref())
        .map(RegistryAuth::bearer)
        .ok_or(ConfigError::MissingToken)
}

/// Builds the executor configuration.
///
/// # Errors
///
/// Returns an error if `concurrency` is outside `1..=MAX_CONCURRENCY`.
pub fn executor_config(concurrency: usize, timeout: u64) -> Result<ExecutorConfig, ConfigError> {
    if !(1..=MAX_CONCURRENCY).contains(&concurrency) {
        return Err(ConfigError::InvalidOption {
            name: "concurrency",
            reason: format!("must be between 1 and {MAX_CONCURRENCY}"),
        });
    }

    Ok(ExecutorConfig::default()
        .with_concurrency(concurrency)
        .with_request_timeout(Duration::from_secs(timeout)))
}

/// Whether deletion needs an operator's confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmMode {
    /// Ask before deleting.
    Interactive,

    /// Proceed without asking.
    Unattended,
}

impl ConfirmMode {
    /// Unattended when `--yes` was passed or `CI` is set.
    pub const fn from_flags(yes: bool, env: &Environment) -> Self {
        if yes || env.ci {
            Self::Unattended
        } else {
            Self::Interactive
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
