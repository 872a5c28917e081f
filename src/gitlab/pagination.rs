//! Link-header pagination
//!
//! List endpoints return one page per response and advertise the next page
//! through an RFC 8288 `Link` header:
//!
//! ```text
//! Link: <https://gitlab.com/api/v4/groups?page=2&per_page=100>; rel="next",
//!       <https://gitlab.com/api/v4/groups?page=1&per_page=100>; rel="first"
//! ```
//!
//! [`PaginatedFetcher::fetch_all`] follows `rel="next"` until it disappears and
//! returns every page's items in server order. A page failure voids the whole
//! fetch. A missing or unparsable header ends the walk.

use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, LINK};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use tracing::{debug, error, info, warn};
use url::Url;

pub const PRIVATE_TOKEN_HEADER: &str = "PRIVATE-TOKEN";
const NEXT_PAGE_HEADER: &str = "x-next-page";

/// One entry of a `Link` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub uri: String,
    pub rels: Vec<String>,
}

impl Link {
    pub fn has_rel(&self, rel: &str) -> bool {
        self.rels.iter().any(|r| r.eq_ignore_ascii_case(rel))
    }
}

/// Parse a `Link` header value into its entries
pub fn parse_link_header(value: &str) -> Result<Vec<Link>> {
    let mut links = Vec::new();
    let mut rest = value.trim();

    while !rest.is_empty() {
        let after_open = rest
            .strip_prefix('<')
            .ok_or_else(|| malformed(value, "expected '<' at start of link"))?;
        let close = after_open
            .find('>')
            .ok_or_else(|| malformed(value, "unterminated '<'"))?;
        let uri = after_open[..close].trim().to_string();
        let tail = &after_open[close + 1..];

        let (params, remaining) = match find_unquoted(tail, ',', value)? {
            Some(idx) => (&tail[..idx], &tail[idx + 1..]),
            None => (tail, ""),
        };

        let mut rels = Vec::new();
        for param in split_unquoted(params, ';', value)? {
            let param = param.trim();
            if param.is_empty() {
                continue;
            }
            let Some((key, raw)) = param.split_once('=') else {
                continue;
            };
            if key.trim().eq_ignore_ascii_case("rel") {
                let raw = raw.trim();
                let unquoted = raw
                    .strip_prefix('"')
                    .and_then(|r| r.strip_suffix('"'))
                    .unwrap_or(raw);
                rels.extend(unquoted.split_whitespace().map(str::to_ascii_lowercase));
            }
        }

        links.push(Link { uri, rels });
        rest = remaining.trim_start_matches(|c: char| c == ',' || c.is_whitespace());
    }

    Ok(links)
}

fn malformed(header: &str, reason: &str) -> Error {
    Error::MalformedLinkHeader(format!("{reason} in '{header}'"))
}

fn find_unquoted(s: &str, delim: char, header: &str) -> Result<Option<usize>> {
    let mut in_quotes = false;
    for (idx, c) in s.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c == delim && !in_quotes => return Ok(Some(idx)),
            _ => {}
        }
    }
    if in_quotes {
        Err(malformed(header, "unterminated quoted string"))
    } else {
        Ok(None)
    }
}

fn split_unquoted<'a>(s: &'a str, delim: char, header: &str) -> Result<Vec<&'a str>> {
    let mut parts = Vec::new();
    let mut rest = s;
    while let Some(idx) = find_unquoted(rest, delim, header)? {
        parts.push(&rest[..idx]);
        rest = &rest[idx + 1..];
    }
    parts.push(rest);
    Ok(parts)
}

/// URL of the next page advertised by `headers`, resolved against `current`.
///
/// Absent, non-UTF-8, or malformed headers all mean "no next page".
pub fn next_page_url(headers: &HeaderMap, current: &Url) -> Option<Url> {
    let raw = headers.get(LINK)?;
    let value = match raw.to_str() {
        Ok(v) => v,
        Err(_) => {
            warn!("Ignoring non-UTF-8 link header from {}", current);
            return None;
        }
    };

    let links = match parse_link_header(value) {
        Ok(links) => links,
        Err(e) => {
            warn!("Treating as last page: {}", e);
            return None;
        }
    };

    let next = links.into_iter().find(|link| link.has_rel("next"))?;
    match current.join(&next.uri) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!("Treating as last page: bad next link '{}': {}", next.uri, e);
            None
        }
    }
}

/// Sequential GET loop over a paginated list endpoint
#[derive(Clone)]
pub struct PaginatedFetcher {
    client: Client,
    token: String,
}

impl PaginatedFetcher {
    pub fn new(client: Client, token: impl Into<String>) -> Self {
        Self {
            client,
            token: token.into(),
        }
    }

    /// Fetch every page starting at `initial` and concatenate the items.
    ///
    /// Each page body must be a JSON array of `T`. The first non-success
    /// status aborts with [`Error::Fetch`] and nothing accumulated so far is
    /// returned.
    pub async fn fetch_all<T: DeserializeOwned>(&self, initial: Url) -> Result<Vec<T>> {
        let mut items: Vec<T> = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(initial);
        let mut pages = 0usize;

        while let Some(url) = next.take() {
            if !visited.insert(url.clone()) {
                warn!("Pagination revisited {}; stopping", url);
                break;
            }

            info!("Calling out to {}", url);
            let response = self
                .client
                .get(url.clone())
                .header(PRIVATE_TOKEN_HEADER, &self.token)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                error!("Fetching {} failed with {}: {}", url, status, body);
                return Err(Error::Fetch {
                    url: url.to_string(),
                    status: status.as_u16(),
                    body,
                });
            }

            if let Some(page) = response
                .headers()
                .get(NEXT_PAGE_HEADER)
                .and_then(|v| v.to_str().ok())
            {
                debug!("next page: {}", page);
            }
            let following = next_page_url(response.headers(), &url);

            let page: Vec<T> = response.json().await?;
            pages += 1;
            debug!("Page {} from {} held {} records", pages, url, page.len());
            items.extend(page);

            if following.is_some() {
                info!("calling for more payload");
            }
            next = following;
        }

        info!("returning {} records", items.len());
        Ok(items)
    }
}
