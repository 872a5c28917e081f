//! Group and membership operations against the REST API

use super::pagination::{PaginatedFetcher, PRIVATE_TOKEN_HEADER};
use super::types::{AccessLevel, Group, Member};
use crate::config::PruneConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error};
use url::Url;

/// Operations the prune run needs from the upstream service
///
/// `GitlabClient` is the HTTP implementation; tests substitute
/// [`MockGroupApi`](super::mock::MockGroupApi).
#[async_trait]
pub trait GroupApi: Send + Sync {
    /// Every group visible to the token, across all pages
    async fn list_groups(&self) -> Result<Vec<Group>>;

    /// Members of `group_id` at or above [`AccessLevel::REMOVAL_THRESHOLD`]
    async fn list_qualifying_members(&self, group_id: u64) -> Result<Vec<Member>>;

    /// Remove one member from one group. Not retried.
    async fn delete_member(&self, group_id: u64, member_id: u64) -> Result<()>;
}

pub struct GitlabClient {
    client: Client,
    fetcher: PaginatedFetcher,
    base: Url,
    token: String,
    per_page: u32,
}

impl GitlabClient {
    /// Build a client from configuration. Fails without a token.
    pub fn new(config: &PruneConfig) -> Result<Self> {
        let token = config.require_token()?.to_string();
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            fetcher: PaginatedFetcher::new(client.clone(), token.clone()),
            client,
            base: config.api_base()?,
            token,
            per_page: config.per_page,
        })
    }

    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url> {
        let mut url = Url::parse(&format!(
            "{}/{}",
            self.base.as_str().trim_end_matches('/'),
            path
        ))?;
        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    pub fn groups_url(&self) -> Result<Url> {
        self.endpoint("groups", &[("per_page", self.per_page.to_string())])
    }

    pub fn members_url(&self, group_id: u64) -> Result<Url> {
        self.endpoint(
            &format!("groups/{group_id}/members"),
            &[
                (
                    "access_level",
                    AccessLevel::REMOVAL_THRESHOLD.as_u8().to_string(),
                ),
                ("per_page", self.per_page.to_string()),
            ],
        )
    }

    pub fn member_url(&self, group_id: u64, member_id: u64) -> Result<Url> {
        self.endpoint(&format!("groups/{group_id}/members/{member_id}"), &[])
    }
}

#[async_trait]
impl GroupApi for GitlabClient {
    async fn list_groups(&self) -> Result<Vec<Group>> {
        self.fetcher.fetch_all(self.groups_url()?).await
    }

    async fn list_qualifying_members(&self, group_id: u64) -> Result<Vec<Member>> {
        self.fetcher.fetch_all(self.members_url(group_id)?).await
    }

    async fn delete_member(&self, group_id: u64, member_id: u64) -> Result<()> {
        let url = self.member_url(group_id, member_id)?;
        debug!("DELETE {}", url);

        let response = self
            .client
            .delete(url)
            .header(PRIVATE_TOKEN_HEADER, &self.token)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        error!(
            "Removing member {} from group {} returned {}: {}",
            member_id, group_id, status, body
        );
        Err(Error::Deletion {
            group_id,
            member_id,
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_url: &str) -> GitlabClient {
        let config = PruneConfig {
            api_url: api_url.to_string(),
            private_token: Some("secret".to_string()),
            per_page: 25,
            ..PruneConfig::default()
        };
        GitlabClient::new(&config).unwrap()
    }

    #[test]
    fn test_new_requires_token() {
        let result = GitlabClient::new(&PruneConfig::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_groups_url() {
        let client = client("https://gitlab.example.com/api/v4");
        assert_eq!(
            client.groups_url().unwrap().as_str(),
            "https://gitlab.example.com/api/v4/groups?per_page=25"
        );
    }

    #[test]
    fn test_members_url_always_filters_at_developer() {
        let client = client("https://gitlab.example.com/api/v4/");
        let url = client.members_url(42).unwrap();

        assert_eq!(url.path(), "/api/v4/groups/42/members");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("access_level".to_string(), "30".to_string())));
        assert!(pairs.contains(&("per_page".to_string(), "25".to_string())));
    }

    #[test]
    fn test_member_url_has_no_query() {
        let client = client("https://gitlab.example.com/api/v4");
        let url = client.member_url(1, 11).unwrap();
        assert_eq!(
            url.as_str(),
            "https://gitlab.example.com/api/v4/groups/1/members/11"
        );
        assert!(url.query().is_none());
    }
}
