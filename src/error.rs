use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Fetch from {url} failed with status {status}: {body}")]
    Fetch {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Removing member {member_id} from group {group_id} failed with status {status}: {body}")]
    Deletion {
        group_id: u64,
        member_id: u64,
        status: u16,
        body: String,
    },

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Malformed link header: {0}")]
    MalformedLinkHeader(String),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Prompt error: {0}")]
    Prompt(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deletion_error_carries_body_verbatim() {
        let err = Error::Deletion {
            group_id: 1,
            member_id: 11,
            status: 404,
            body: r#"{"message":"404 Not found"}"#.to_string(),
        };

        assert!(err.to_string().contains(r#"{"message":"404 Not found"}"#));
        assert!(err.to_string().contains("member 11 from group 1"));
    }

    #[test]
    fn test_config_error_message() {
        let err = Error::Config("private token required for execution".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: private token required for execution"
        );
    }
}
