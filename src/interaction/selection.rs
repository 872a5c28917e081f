//! Choosing which groups to prune

use super::prompts::UserPrompter;
use crate::error::Result;
use crate::gitlab::Group;
use crate::prune::Whitelist;
use std::collections::HashSet;
use tracing::{info, warn};

/// Drop groups listed in the group whitelist
pub fn offered_groups(groups: Vec<Group>, group_whitelist: &Whitelist) -> Vec<Group> {
    groups
        .into_iter()
        .filter(|group| {
            let excluded = group_whitelist.excludes_group(group);
            if excluded {
                info!("{} is in group white list. Skipping.", group);
            }
            !excluded
        })
        .collect()
}

/// Ask about each group in turn; the default answer is no
pub async fn select_groups(prompter: &dyn UserPrompter, groups: &[Group]) -> Result<Vec<Group>> {
    let mut selected = Vec::new();
    for (index, group) in groups.iter().enumerate() {
        let message = format!("{index}: clean out '{}'?", group.name);
        if prompter.prompt_yes_no(&message, false).await? {
            selected.push(group.clone());
        }
    }
    Ok(selected)
}

/// Pick groups by id, name, or full path without prompting
pub fn select_by_keys(groups: &[Group], keys: &[String]) -> Vec<Group> {
    let mut seen = HashSet::new();
    let mut selected = Vec::new();

    for key in keys {
        let matches: Vec<&Group> = groups.iter().filter(|g| g.matches(key)).collect();
        if matches.is_empty() {
            warn!("No offered group matches '{}'", key);
            continue;
        }
        for group in matches {
            if seen.insert(group.id) {
                selected.push(group.clone());
            }
        }
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::ScriptedPrompter;

    fn groups() -> Vec<Group> {
        vec![
            Group {
                id: 1,
                name: "Eng".to_string(),
                full_path: Some("acme/eng".to_string()),
            },
            Group {
                id: 2,
                name: "Ops".to_string(),
                full_path: Some("acme/ops".to_string()),
            },
            Group {
                id: 3,
                name: "Infra".to_string(),
                full_path: Some("acme/infra".to_string()),
            },
        ]
    }

    #[tokio::test]
    async fn test_select_groups_prompts_each_with_index() {
        let prompter = ScriptedPrompter::new(["yes", "", "y"]);

        let selected = select_groups(&prompter, &groups()).await.unwrap();

        let ids: Vec<u64> = selected.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(
            prompter.asked(),
            vec![
                "0: clean out 'Eng'?",
                "1: clean out 'Ops'?",
                "2: clean out 'Infra'?"
            ]
        );
    }

    #[tokio::test]
    async fn test_select_groups_empty() {
        let prompter = ScriptedPrompter::new(Vec::<String>::new());
        assert!(select_groups(&prompter, &[]).await.unwrap().is_empty());
    }

    #[test]
    fn test_select_by_keys_dedupes_and_ignores_unknown() {
        let keys = vec![
            "2".to_string(),
            "acme/ops".to_string(),
            "Eng".to_string(),
            "missing".to_string(),
        ];
        let selected = select_by_keys(&groups(), &keys);
        let ids: Vec<u64> = selected.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_offered_groups_respects_group_whitelist() {
        let offered = offered_groups(groups(), &Whitelist::new(["acme/infra", "Ops"]));
        let ids: Vec<u64> = offered.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![1]);
    }
}
