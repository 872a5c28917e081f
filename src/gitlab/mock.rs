//! In-memory `GroupApi` used by tests

use super::client::GroupApi;
use super::types::{Group, Member};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Scriptable fake of the upstream API.
///
/// Records every call and the peak number of fetches and deletes in flight.
#[derive(Default)]
pub struct MockGroupApi {
    groups: Vec<Group>,
    groups_error: Option<(u16, String)>,
    members: HashMap<u64, Vec<Member>>,
    member_errors: HashMap<u64, (u16, String)>,
    delete_errors: HashMap<(u64, u64), (u16, String)>,
    delete_delay: Option<Duration>,
    fetch_delay: Option<Duration>,
    deleted: Mutex<Vec<(u64, u64)>>,
    member_fetches: Mutex<Vec<u64>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    fetches_in_flight: AtomicUsize,
    peak_fetches_in_flight: AtomicUsize,
}

impl MockGroupApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, group: Group, members: Vec<Member>) -> Self {
        self.members.insert(group.id, members);
        self.groups.push(group);
        self
    }

    pub fn with_groups_error(mut self, status: u16, body: &str) -> Self {
        self.groups_error = Some((status, body.to_string()));
        self
    }

    pub fn with_member_error(mut self, group_id: u64, status: u16, body: &str) -> Self {
        self.member_errors
            .insert(group_id, (status, body.to_string()));
        self
    }

    pub fn with_delete_error(mut self, group_id: u64, member_id: u64, status: u16, body: &str) -> Self {
        self.delete_errors
            .insert((group_id, member_id), (status, body.to_string()));
        self
    }

    pub fn with_delete_delay(mut self, delay: Duration) -> Self {
        self.delete_delay = Some(delay);
        self
    }

    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }

    /// `(group_id, member_id)` pairs in the order deletes were issued
    pub fn deleted(&self) -> Vec<(u64, u64)> {
        self.deleted.lock().map(|d| d.clone()).unwrap_or_default()
    }

    pub fn member_fetches(&self) -> Vec<u64> {
        self.member_fetches
            .lock()
            .map(|f| f.clone())
            .unwrap_or_default()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn peak_fetches_in_flight(&self) -> usize {
        self.peak_fetches_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GroupApi for MockGroupApi {
    async fn list_groups(&self) -> Result<Vec<Group>> {
        if let Some((status, body)) = &self.groups_error {
            return Err(Error::Fetch {
                url: "mock://groups".to_string(),
                status: *status,
                body: body.clone(),
            });
        }
        Ok(self.groups.clone())
    }

    async fn list_qualifying_members(&self, group_id: u64) -> Result<Vec<Member>> {
        if let Ok(mut fetches) = self.member_fetches.lock() {
            fetches.push(group_id);
        }

        let now = self.fetches_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_fetches_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }
        self.fetches_in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some((status, body)) = self.member_errors.get(&group_id) {
            return Err(Error::Fetch {
                url: format!("mock://groups/{group_id}/members"),
                status: *status,
                body: body.clone(),
            });
        }
        Ok(self.members.get(&group_id).cloned().unwrap_or_default())
    }

    async fn delete_member(&self, group_id: u64, member_id: u64) -> Result<()> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delete_delay {
            tokio::time::sleep(delay).await;
        }

        if let Ok(mut deleted) = self.deleted.lock() {
            deleted.push((group_id, member_id));
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.delete_errors.get(&(group_id, member_id)) {
            Some((status, body)) => Err(Error::Deletion {
                group_id,
                member_id,
                status: *status,
                body: body.clone(),
            }),
            None => Ok(()),
        }
    }
}
