//! Allow-list filtering

use crate::gitlab::{Group, Member};
use std::collections::HashSet;

/// Exact, case-sensitive set of names exempt from pruning
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Whitelist {
    names: HashSet<String>,
}

impl Whitelist {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Whether a group is listed by name or full path
    pub fn excludes_group(&self, group: &Group) -> bool {
        self.contains(&group.name)
            || group
                .full_path
                .as_deref()
                .map(|path| self.contains(path))
                .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Members split by whitelist status, each side in input order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub skip: Vec<Member>,
    pub remove: Vec<Member>,
}

pub fn partition(members: &[Member], whitelist: &Whitelist) -> Partition {
    let (skip, remove): (Vec<Member>, Vec<Member>) = members
        .iter()
        .cloned()
        .partition(|member| whitelist.contains(&member.username));
    Partition { skip, remove }
}
