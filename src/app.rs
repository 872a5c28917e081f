//! One complete prune run: confirm, authenticate, select, prune, report

use crate::config::PruneConfig;
use crate::error::{Error, Result};
use crate::gitlab::GroupApi;
use crate::interaction::{offered_groups, select_by_keys, select_groups, UserPrompter};
use crate::prune::{PruneReport, RemovalCoordinator, Whitelist};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Exit status when a run completed but recorded failures under `fail_on_errors`
pub const EXIT_RUN_FAILURES: i32 = 2;

/// Options supplied on the command line rather than in configuration
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Skip the execution confirmation
    pub assume_yes: bool,
    /// Group ids, names, or full paths to prune without prompting
    pub groups: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// The user declined to execute
    Declined,
    /// The group list itself could not be fetched
    GroupsUnavailable(String),
    Completed(PruneReport),
}

impl RunStatus {
    pub fn has_failures(&self) -> bool {
        match self {
            RunStatus::Declined => false,
            RunStatus::GroupsUnavailable(_) => true,
            RunStatus::Completed(report) => report.has_failures(),
        }
    }

    /// Process exit code for this status under `config`
    pub fn exit_code(&self, config: &PruneConfig) -> i32 {
        if config.fail_on_errors && self.has_failures() {
            EXIT_RUN_FAILURES
        } else {
            0
        }
    }
}

/// Run a full prune. `connect` builds the API client once a token is known.
///
/// Only configuration problems and prompt failures are returned as errors;
/// API failures are recorded in the returned status.
pub async fn run<F>(
    mut config: PruneConfig,
    options: &RunOptions,
    prompter: &dyn UserPrompter,
    connect: F,
) -> Result<RunStatus>
where
    F: FnOnce(&PruneConfig) -> Result<Arc<dyn GroupApi>>,
{
    if !options.assume_yes && !prompter.prompt_yes_no("Execute group cleanup?", true).await? {
        info!("Group cleanup not requested");
        return Ok(RunStatus::Declined);
    }

    if !config.has_token() {
        let token = prompter.prompt_text("Gitlab token?", None).await?;
        if token.trim().is_empty() {
            error!("private token required for execution");
            return Err(Error::Config(
                "private token required for execution".to_string(),
            ));
        }
        config.private_token = Some(token.trim().to_string());
    }

    let api = connect(&config)?;

    let groups = match api.list_groups().await {
        Ok(groups) => groups,
        Err(e) => {
            error!("Unable to list groups: {}", e);
            return Ok(RunStatus::GroupsUnavailable(e.to_string()));
        }
    };
    info!("Found {} group(s)", groups.len());

    let offered = offered_groups(groups, &Whitelist::new(config.whitelist_groups.clone()));
    let selected = if options.groups.is_empty() {
        select_groups(prompter, &offered).await?
    } else {
        select_by_keys(&offered, &options.groups)
    };

    if selected.is_empty() {
        warn!("No groups selected for cleanup");
    }

    let coordinator = RemovalCoordinator::new(
        api,
        Whitelist::new(config.whitelist_members.clone()),
        config.max_concurrent_requests,
    );
    let report = coordinator.run(selected).await;

    info!("kthxbai!");
    Ok(RunStatus::Completed(report))
}
