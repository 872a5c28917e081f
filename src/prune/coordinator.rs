//! Fetch, filter, and remove members across the selected groups
//!
//! Each group's member list is fetched concurrently with the others. As soon
//! as a group is filtered, its removals are spawned as tasks gated by one
//! semaphore shared by every request of the run, so the number of in-flight
//! API calls never exceeds `max_concurrent_requests`. Every spawned task is
//! joined before the run returns; a task that panics is recorded as failed.

use super::outcome::{GroupFailure, PruneReport, RemovalOutcome, RemovalResult};
use super::whitelist::{partition, Whitelist};
use crate::error::Result;
use crate::gitlab::{Group, GroupApi, Member};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub struct RemovalCoordinator {
    api: Arc<dyn GroupApi>,
    whitelist: Arc<Whitelist>,
    permits: Arc<Semaphore>,
}

impl RemovalCoordinator {
    pub fn new(api: Arc<dyn GroupApi>, whitelist: Whitelist, max_concurrent: usize) -> Self {
        Self {
            api,
            whitelist: Arc::new(whitelist),
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Prune every group in `groups` and return all recorded outcomes.
    ///
    /// Failures stay scoped to the group or member they happened to.
    pub async fn run(&self, groups: Vec<Group>) -> PruneReport {
        let mut report = PruneReport::default();
        if groups.is_empty() {
            info!("No groups selected; nothing to prune");
            return report;
        }

        info!(
            "Pruning {} group(s) with at most {} concurrent requests",
            groups.len(),
            self.permits.available_permits()
        );
        if self.whitelist.is_empty() {
            warn!("White list is empty; every qualifying member will be removed");
        } else {
            debug!("{} name(s) in the member white list", self.whitelist.len());
        }

        let mut group_runs: FuturesUnordered<_> = groups
            .into_iter()
            .map(|group| self.prune_group(group))
            .collect();

        while let Some(group_report) = group_runs.next().await {
            report.absorb(group_report);
        }

        info!(
            "Prune finished: {} removed, {} skipped, {} failed, {} group(s) unreadable",
            report.removed(),
            report.skipped(),
            report.failed(),
            report.group_failures.len()
        );
        report
    }

    async fn prune_group(&self, group: Group) -> PruneReport {
        let mut report = PruneReport::default();

        let members = match self.fetch_members(&group).await {
            Ok(members) => members,
            Err(e) => {
                warn!(
                    "An error occurred while trying to get members for {}",
                    group
                );
                error!("{}", e);
                report.group_failures.push(GroupFailure {
                    group,
                    error: e.to_string(),
                });
                return report;
            }
        };
        debug!("{} has {} qualifying member(s)", group, members.len());

        let split = partition(&members, &self.whitelist);
        for member in split.skip {
            info!("{} is in white list. Skipping.", member.username);
            report.outcomes.push(RemovalOutcome {
                group: group.clone(),
                member,
                result: RemovalResult::Skipped,
            });
        }

        let mut removals = FuturesUnordered::new();
        for member in split.remove {
            info!(
                "marking {} for removal from group '{}'",
                member.username, group.name
            );
            let handle = self.spawn_removal(group.id, member.id).await;
            removals.push(async move { (member, handle.await) });
        }

        while let Some((member, joined)) = removals.next().await {
            let result = match joined {
                Ok(Ok(())) => {
                    info!("{} removed from group '{}'", member.username, group.name);
                    RemovalResult::Removed
                }
                Ok(Err(e)) => {
                    warn!(
                        "There was an issue while trying to remove {} from group '{}'",
                        member, group.name
                    );
                    error!("{}", e);
                    RemovalResult::Failed(e.to_string())
                }
                Err(e) => {
                    error!(
                        "Removal task for {} in group '{}' did not complete: {}",
                        member, group.name, e
                    );
                    RemovalResult::Failed(format!("removal task did not complete: {e}"))
                }
            };
            report.outcomes.push(RemovalOutcome {
                group: group.clone(),
                member,
                result,
            });
        }

        report
    }

    async fn fetch_members(&self, group: &Group) -> Result<Vec<Member>> {
        // The semaphore is never closed, so a permit is always granted.
        let _permit = self.permits.acquire().await.ok();
        self.api.list_qualifying_members(group.id).await
    }

    async fn spawn_removal(&self, group_id: u64, member_id: u64) -> JoinHandle<Result<()>> {
        let permit = self.permits.clone().acquire_owned().await.ok();
        let api = self.api.clone();
        tokio::spawn(async move {
            let result = api.delete_member(group_id, member_id).await;
            drop(permit);
            result
        })
    }
}
