//! Issue-tracker boundary.
//!
//! Files a rendered description as a new Jira issue through the REST v3
//! `issue` endpoint and hands back the issue key.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::env;

pub const BASE_URL_VAR: &str = "JIRA_BASE_URL";
pub const EMAIL_VAR: &str = "JIRA_EMAIL";
pub const API_TOKEN_VAR: &str = "JIRA_API_TOKEN";

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("missing environment variables: {}", .0.join(", "))]
    MissingConfig(Vec<&'static str>),
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("issue creation rejected: {status} {body}")]
    Rejected { status: u16, body: String },
    #[error("unexpected tracker response: {0}")]
    InvalidResponse(String),
}

/// Credentials and location of the tracker instance.
#[derive(Clone)]
pub struct TrackerConfig {
    pub base_url: String,
    pub email: String,
    pub api_token: String,
}

impl std::fmt::Debug for TrackerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerConfig")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("api_token", &"***")
            .finish()
    }
}

impl TrackerConfig {
    pub fn from_env() -> Result<Self, TrackerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    ///
    /// Every missing or blank variable is reported at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TrackerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut fetch = |key: &'static str| match lookup(key) {
            Some(value) if !value.trim().is_empty() => value,
            _ => {
                missing.push(key);
                String::new()
            }
        };
        let base_url = fetch(BASE_URL_VAR);
        let email = fetch(EMAIL_VAR);
        let api_token = fetch(API_TOKEN_VAR);

        if !missing.is_empty() {
            return Err(TrackerError::MissingConfig(missing));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            email,
            api_token,
        })
    }

    fn issue_url(&self) -> String {
        format!("{}/rest/api/3/issue", self.base_url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRequest {
    pub project_key: String,
    pub issue_type: String,
    pub summary: String,
    pub description: String,
}

impl IssueRequest {
    pub fn payload(&self) -> Value {
        json!({
            "fields": {
                "project": { "key": self.project_key },
                "summary": self.summary,
                "issuetype": { "name": self.issue_type },
                "description": self.description,
            }
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedIssue {
    pub key: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "self")]
    pub url: Option<String>,
}

pub trait IssueTracker {
    fn create_issue(&self, request: &IssueRequest) -> Result<CreatedIssue, TrackerError>;
}

#[derive(Debug)]
pub struct JiraClient {
    config: TrackerConfig,
    client: Client,
}

impl JiraClient {
    pub fn new(config: TrackerConfig) -> Result<Self, TrackerError> {
        let client = Client::builder()
            .user_agent(concat!("bddtrace/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(TrackerError::Client)?;
        Ok(Self { config, client })
    }
}

impl IssueTracker for JiraClient {
    fn create_issue(&self, request: &IssueRequest) -> Result<CreatedIssue, TrackerError> {
        let url = self.config.issue_url();
        tracing::info!(
            project = %request.project_key,
            issue_type = %request.issue_type,
            summary = %request.summary,
            "creating issue"
        );

        let resp = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .basic_auth(&self.config.email, Some(&self.config.api_token))
            .json(&request.payload())
            .send()
            .map_err(|source| TrackerError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = resp.status().as_u16();
        let body = resp.text().map_err(|source| TrackerError::Transport {
            url: url.clone(),
            source,
        })?;
        let issue = parse_create_response(status, &body)?;
        tracing::info!(key = %issue.key, "issue created");
        Ok(issue)
    }
}

/// Interprets the tracker's reply; anything at or above 300 is a rejection.
pub fn parse_create_response(status: u16, body: &str) -> Result<CreatedIssue, TrackerError> {
    if status >= 300 {
        return Err(TrackerError::Rejected {
            status,
            body: body.to_string(),
        });
    }
    serde_json::from_str(body).map_err(|err| TrackerError::InvalidResponse(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn config_reports_every_missing_variable() {
        let err = TrackerConfig::from_lookup(lookup_from(&[(EMAIL_VAR, "qa@example.com")]))
            .expect_err("incomplete config");
        match err {
            TrackerError::MissingConfig(names) => {
                assert_eq!(names, vec![BASE_URL_VAR, API_TOKEN_VAR]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn blank_variable_counts_as_missing() {
        let err = TrackerConfig::from_lookup(lookup_from(&[
            (BASE_URL_VAR, "https://example.atlassian.net"),
            (EMAIL_VAR, "qa@example.com"),
            (API_TOKEN_VAR, "   "),
        ]))
        .expect_err("blank token");
        assert!(err.to_string().contains(API_TOKEN_VAR));
    }

    #[test]
    fn config_trims_trailing_slash_and_hides_token() {
        let config = TrackerConfig::from_lookup(lookup_from(&[
            (BASE_URL_VAR, "https://example.atlassian.net/"),
            (EMAIL_VAR, "qa@example.com"),
            (API_TOKEN_VAR, "secret-token"),
        ]))
        .expect("complete config");
        assert_eq!(
            config.issue_url(),
            "https://example.atlassian.net/rest/api/3/issue"
        );
        assert!(!format!("{config:?}").contains("secret-token"));
    }

    #[test]
    fn payload_matches_issue_contract() {
        let request = IssueRequest {
            project_key: "TRAV".to_string(),
            issue_type: "Tarea".to_string(),
            summary: "BDD: Login".to_string(),
            description: "body".to_string(),
        };
        let payload = request.payload();
        assert_eq!(payload["fields"]["project"]["key"], "TRAV");
        assert_eq!(payload["fields"]["issuetype"]["name"], "Tarea");
        assert_eq!(payload["fields"]["summary"], "BDD: Login");
        assert_eq!(payload["fields"]["description"], "body");
    }

    #[rstest]
    #[case(200)]
    #[case(201)]
    fn success_reads_issue_key(#[case] status: u16) {
        let issue = parse_create_response(status, r#"{"id":"10001","key":"TRAV-7","self":"x"}"#)
            .expect("created");
        assert_eq!(issue.key, "TRAV-7");
        assert_eq!(issue.id.as_deref(), Some("10001"));
    }

    #[rstest]
    #[case(300)]
    #[case(400)]
    #[case(500)]
    fn non_success_status_is_rejected_verbatim(#[case] status: u16) {
        let err = parse_create_response(status, "{\"errors\":{}}").expect_err("rejected");
        assert!(matches!(err, TrackerError::Rejected { status: s, .. } if s == status));
        assert!(err.to_string().contains("{\"errors\":{}}"));
    }

    #[test]
    fn success_without_key_is_invalid() {
        let err = parse_create_response(201, "{}").expect_err("no key");
        assert!(matches!(err, TrackerError::InvalidResponse(_)));
    }
}
