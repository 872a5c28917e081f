//! Common test utilities and helpers

#![allow(dead_code)]

use group_prune::config::PruneConfig;
use serde_json::{json, Value};
use wiremock::{Match, MockServer, Request};

pub const TOKEN: &str = "test-token";

/// Matches on the `page` query parameter; `None` requires it to be absent
pub struct PageIs(pub Option<u32>);

impl Match for PageIs {
    fn matches(&self, request: &Request) -> bool {
        let page = request
            .url
            .query_pairs()
            .find(|(k, _)| k == "page")
            .map(|(_, v)| v.into_owned());
        match (&self.0, page) {
            (None, None) => true,
            (Some(expected), Some(actual)) => actual == expected.to_string(),
            _ => false,
        }
    }
}

pub fn api_base(server: &MockServer) -> String {
    format!("{}/api/v4", server.uri())
}

/// Config pointed at the mock server with a token and small page size
pub fn config_for(server: &MockServer) -> PruneConfig {
    PruneConfig {
        api_url: api_base(server),
        private_token: Some(TOKEN.to_string()),
        per_page: 100,
        request_timeout_secs: 5,
        ..PruneConfig::default()
    }
}

/// `Link` header advertising `page` of `path` as next
pub fn next_link(server: &MockServer, path: &str, page: u32) -> String {
    format!(
        "<{}{}?page={}&per_page=100>; rel=\"next\", <{}{}?page=1&per_page=100>; rel=\"first\"",
        server.uri(),
        path,
        page,
        server.uri(),
        path
    )
}

pub fn group_json(id: u64) -> Value {
    json!({
        "id": id,
        "name": format!("group-{id}"),
        "full_path": format!("acme/group-{id}"),
        "visibility": "private"
    })
}

pub fn groups_json(ids: std::ops::Range<u64>) -> Value {
    Value::Array(ids.map(group_json).collect())
}

pub fn member_json(id: u64, username: &str) -> Value {
    json!({
        "id": id,
        "username": username,
        "name": username.to_uppercase(),
        "state": "active",
        "access_level": 30
    })
}
