//! GitHub Projects (v2) integration over the GraphQL API.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::domain::{FieldValue, ItemState, RunConfig, WorkItem};
use crate::error::AppError;

const USER_AGENT: &str = concat!("burndown/", env!("CARGO_PKG_VERSION"));

/// Projects are matched by title among the first 100 of the organization;
/// items are paged 50 at a time.
const PROJECT_ITEMS_QUERY: &str = r#"
query($org: String!, $cursor: String) {
  organization(login: $org) {
    projectsV2(first: 100) {
      nodes {
        title
        items(first: 50, after: $cursor) {
          nodes {
            id
            fieldValues(first: 10) {
              nodes {
                ... on ProjectV2ItemFieldTextValue {
                  text
                  field { ... on ProjectV2FieldCommon { name } }
                }
                ... on ProjectV2ItemFieldNumberValue {
                  number
                  field { ... on ProjectV2FieldCommon { name } }
                }
              }
            }
            content {
              ... on Issue {
                title
                state
                closedAt
              }
            }
          }
          pageInfo {
            hasNextPage
            endCursor
          }
        }
      }
    }
  }
}
"#;

pub struct GithubClient {
    client: Client,
    api_url: String,
    token: String,
    org: String,
    project_title: String,
}

impl GithubClient {
    pub fn new(config: &RunConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::upstream(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            token: config.token.clone(),
            org: config.org.clone(),
            project_title: config.project_title.clone(),
        })
    }

    /// Fetch every item of the configured project, following pagination.
    pub fn fetch_project_items(&self) -> Result<Vec<WorkItem>, AppError> {
        let raw = collect_pages(|cursor| {
            let body = self.post_query(cursor)?;
            extract_page(body, &self.org, &self.project_title)
        })?;
        Ok(raw.into_iter().map(normalize_item).collect())
    }

    fn post_query(&self, cursor: Option<&str>) -> Result<GraphqlResponse, AppError> {
        let request = GraphqlRequest {
            query: PROJECT_ITEMS_QUERY,
            variables: QueryVariables {
                org: &self.org,
                cursor,
            },
        };

        let resp = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .map_err(|e| AppError::upstream(format!("GitHub request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let rate_remaining = resp
                .headers()
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let body = resp.text().unwrap_or_default();
            return Err(status_error(status, rate_remaining.as_deref(), &body));
        }

        let body = resp
            .text()
            .map_err(|e| AppError::upstream(format!("Failed to read GitHub response: {e}")))?;
        parse_response(&body)
    }
}

/// Map a failed HTTP status to an error.
///
/// GitHub answers 403 both for a bad token and for rate limiting; the latter
/// is recognized by an exhausted `x-ratelimit-remaining` or the response body.
fn status_error(status: StatusCode, rate_remaining: Option<&str>, body: &str) -> AppError {
    let rate_limited = status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN
            && (rate_remaining.map(str::trim) == Some("0") || body.to_ascii_lowercase().contains("rate limit")));
    if rate_limited {
        return AppError::upstream(format!("GitHub rate limit exceeded ({status}). Retry later."));
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return AppError::upstream(format!(
            "GitHub rejected the token ({status}). Check GITHUB_TOKEN and its project scopes."
        ));
    }
    AppError::upstream(format!("GitHub request failed with status {status}."))
}

/// One page of raw project items plus the cursor to continue from.
#[derive(Debug)]
pub struct ItemPage {
    pub items: Vec<RawItem>,
    pub next_cursor: Option<String>,
}

/// Drive a page source until it reports no further pages.
///
/// `fetch` receives the cursor of the page to request (`None` for the first).
pub fn collect_pages<F>(mut fetch: F) -> Result<Vec<RawItem>, AppError>
where
    F: FnMut(Option<&str>) -> Result<ItemPage, AppError>,
{
    let mut all = Vec::new();
    let mut cursor: Option<String> = None;
    let mut seen = HashSet::new();
    let mut page_no = 1usize;

    loop {
        let page = fetch(cursor.as_deref())?;
        tracing::info!(page = page_no, items = page.items.len(), "fetched project items");
        all.extend(page.items);

        match page.next_cursor {
            Some(next) => {
                if !seen.insert(next.clone()) {
                    return Err(AppError::upstream(format!(
                        "GitHub returned the same cursor twice ({next}); aborting pagination."
                    )));
                }
                cursor = Some(next);
                page_no += 1;
            }
            None => break,
        }
    }

    Ok(all)
}

/// Validate a GraphQL response and pull out the configured project's items.
pub fn extract_page(resp: GraphqlResponse, org: &str, project_title: &str) -> Result<ItemPage, AppError> {
    if let Some(errors) = resp.errors.filter(|e| !e.is_empty()) {
        let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
        return Err(AppError::upstream(format!("GraphQL query failed: {}", messages.join("; "))));
    }

    let data = resp
        .data
        .ok_or_else(|| AppError::upstream("Unexpected GitHub response: 'data' key missing."))?;
    let organization = data
        .organization
        .ok_or_else(|| AppError::upstream(format!("Organization '{org}' not found or not accessible.")))?;

    let project = organization
        .projects_v2
        .nodes
        .into_iter()
        .flatten()
        .find(|p| p.title == project_title)
        .ok_or_else(|| {
            AppError::upstream(format!("Project '{project_title}' not found in organization '{org}'."))
        })?;

    let items = project.items.nodes.into_iter().flatten().collect();
    let info = project.items.page_info;
    let next_cursor = if info.has_next_page {
        Some(info.end_cursor.ok_or_else(|| {
            AppError::upstream("GitHub reported another page of items but no end cursor.")
        })?)
    } else {
        None
    };

    Ok(ItemPage { items, next_cursor })
}

/// Flatten a raw GraphQL item into a `WorkItem`.
pub fn normalize_item(raw: RawItem) -> WorkItem {
    let mut fields = BTreeMap::new();
    for value in raw.field_values.nodes.into_iter().flatten() {
        let Some(name) = value.field.and_then(|f| f.name) else {
            tracing::debug!(item = %raw.id, "skipping field value without field metadata");
            continue;
        };
        let parsed = match (value.text, value.number) {
            (Some(text), _) if !text.is_empty() => FieldValue::Text(text),
            (_, Some(number)) => FieldValue::Number(number),
            _ => continue,
        };
        fields.insert(name, parsed);
    }

    let content = raw.content.unwrap_or_default();
    WorkItem {
        id: raw.id,
        title: content.title.unwrap_or_else(|| "No Title".to_string()),
        state: ItemState::from_graphql(content.state.as_deref()),
        closed_at: content.closed_at,
        fields,
    }
}

#[derive(Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: QueryVariables<'a>,
}

#[derive(Serialize)]
struct QueryVariables<'a> {
    org: &'a str,
    cursor: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlResponse {
    data: Option<ResponseData>,
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    organization: Option<Organization>,
}

#[derive(Debug, Deserialize)]
struct Organization {
    #[serde(rename = "projectsV2")]
    projects_v2: Connection<Project>,
}

#[derive(Debug, Deserialize)]
struct Connection<T> {
    #[serde(default = "Vec::new")]
    nodes: Vec<Option<T>>,
}

#[derive(Debug, Deserialize)]
struct Project {
    title: String,
    items: ItemConnection,
}

#[derive(Debug, Deserialize)]
struct ItemConnection {
    #[serde(default)]
    nodes: Vec<Option<RawItem>>,
    #[serde(rename = "pageInfo")]
    page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
struct PageInfo {
    #[serde(rename = "hasNextPage")]
    has_next_page: bool,
    #[serde(rename = "endCursor")]
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawItem {
    id: String,
    #[serde(rename = "fieldValues")]
    field_values: Connection<RawFieldValue>,
    content: Option<RawContent>,
}

/// Text and number values share one shape; other value kinds come back as `{}`.
#[derive(Debug, Deserialize)]
struct RawFieldValue {
    text: Option<String>,
    number: Option<f64>,
    field: Option<RawField>,
}

#[derive(Debug, Deserialize)]
struct RawField {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawContent {
    title: Option<String>,
    state: Option<String>,
    #[serde(rename = "closedAt")]
    closed_at: Option<DateTime<Utc>>,
}

pub fn parse_response(body: &str) -> Result<GraphqlResponse, AppError> {
    serde_json::from_str(body).map_err(|e| AppError::upstream(format!("Failed to parse GitHub response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EXIT_UPSTREAM;
    use chrono::NaiveDate;

    fn page_json(title: &str, items: &str, has_next: bool, cursor: Option<&str>) -> String {
        let cursor = cursor.map(|c| format!("\"{c}\"")).unwrap_or_else(|| "null".to_string());
        format!(
            r#"{{"data":{{"organization":{{"projectsV2":{{"nodes":[
                {{"title":"Other","items":{{"nodes":[],"pageInfo":{{"hasNextPage":false,"endCursor":null}}}}}},
                {{"title":"{title}","items":{{"nodes":[{items}],"pageInfo":{{"hasNextPage":{has_next},"endCursor":{cursor}}}}}}}
            ]}}}}}}}}"#
        )
    }

    const ISSUE_CLOSED: &str = r#"{
        "id":"PVTI_1",
        "fieldValues":{"nodes":[
            {},
            {"text":"Sprint 4","field":{"name":"Title"}},
            {"number":3,"field":{"name":"Estimate"}},
            {"text":"orphan"}
        ]},
        "content":{"title":"Fix palette","state":"CLOSED","closedAt":"2025-01-14T10:00:00Z"}
    }"#;

    const DRAFT: &str = r#"{"id":"PVTI_2","fieldValues":{"nodes":[]},"content":{}}"#;

    #[test]
    fn extracts_matching_project_and_normalizes_items() {
        let body = page_json("Palette", &format!("{ISSUE_CLOSED},{DRAFT}"), false, None);
        let page = extract_page(parse_response(&body).unwrap(), "acme", "Palette").unwrap();
        assert!(page.next_cursor.is_none());

        let items: Vec<WorkItem> = page.items.into_iter().map(normalize_item).collect();
        assert_eq!(items.len(), 2);

        let issue = &items[0];
        assert_eq!(issue.title, "Fix palette");
        assert_eq!(issue.state, ItemState::Closed);
        assert_eq!(issue.closed_on(), NaiveDate::from_ymd_opt(2025, 1, 14));
        assert_eq!(issue.fields.get("Estimate"), Some(&FieldValue::Number(3.0)));
        assert_eq!(issue.fields.get("Title"), Some(&FieldValue::Text("Sprint 4".into())));
        assert_eq!(issue.fields.len(), 2);

        let draft = &items[1];
        assert_eq!(draft.title, "No Title");
        assert_eq!(draft.state, ItemState::Other);
        assert!(draft.closed_at.is_none());
    }

    #[test]
    fn null_content_is_tolerated() {
        let item = r#"{"id":"PVTI_3","fieldValues":{"nodes":[]},"content":null}"#;
        let body = page_json("Palette", item, false, None);
        let page = extract_page(parse_response(&body).unwrap(), "acme", "Palette").unwrap();
        let normalized = normalize_item(page.items.into_iter().next().unwrap());
        assert_eq!(normalized.state, ItemState::Other);
    }

    #[test]
    fn missing_project_is_an_error() {
        let body = page_json("Palette", "", false, None);
        let err = extract_page(parse_response(&body).unwrap(), "acme", "Roadmap").unwrap_err();
        assert_eq!(err.exit_code(), EXIT_UPSTREAM);
        assert!(err.message().contains("Project 'Roadmap' not found"));
    }

    #[test]
    fn graphql_errors_are_surfaced() {
        let body = r#"{"data":null,"errors":[{"message":"Bad credentials"},{"message":"second"}]}"#;
        let err = extract_page(parse_response(body).unwrap(), "acme", "Palette").unwrap_err();
        assert!(err.message().contains("Bad credentials; second"));
    }

    #[test]
    fn missing_data_and_missing_organization() {
        let err = extract_page(parse_response("{}").unwrap(), "acme", "Palette").unwrap_err();
        assert!(err.message().contains("'data' key missing"));

        let body = r#"{"data":{"organization":null}}"#;
        let err = extract_page(parse_response(body).unwrap(), "acme", "Palette").unwrap_err();
        assert!(err.message().contains("Organization 'acme' not found"));
    }

    #[test]
    fn next_page_without_cursor_is_rejected() {
        let body = page_json("Palette", "", true, None);
        let err = extract_page(parse_response(&body).unwrap(), "acme", "Palette").unwrap_err();
        assert!(err.message().contains("no end cursor"));
    }

    #[test]
    fn collect_pages_follows_cursors_in_order() {
        let pages = vec![
            page_json("Palette", ISSUE_CLOSED, true, Some("c1")),
            page_json("Palette", DRAFT, true, Some("c2")),
            page_json("Palette", "", false, None),
        ];
        let mut seen = Vec::new();
        let items = collect_pages(|cursor| {
            seen.push(cursor.map(str::to_string));
            let body = &pages[seen.len() - 1];
            extract_page(parse_response(body)?, "acme", "Palette")
        })
        .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(seen, vec![None, Some("c1".to_string()), Some("c2".to_string())]);
    }

    #[test]
    fn collect_pages_stops_on_repeated_cursor() {
        let err = collect_pages(|_| {
            Ok(ItemPage {
                items: Vec::new(),
                next_cursor: Some("same".to_string()),
            })
        })
        .unwrap_err();
        assert!(err.message().contains("same cursor twice"));
    }

    #[test]
    fn collect_pages_stops_on_cursor_cycle() {
        let cursors = ["a", "b", "a", "b"];
        let mut calls = 0usize;
        let err = collect_pages(|_| {
            let next = cursors.get(calls).map(|c| c.to_string());
            calls += 1;
            Ok(ItemPage {
                items: Vec::new(),
                next_cursor: next,
            })
        })
        .unwrap_err();
        assert!(err.message().contains("same cursor twice (a)"));
        assert_eq!(calls, 3);
    }

    #[test]
    fn forbidden_distinguishes_rate_limit_from_bad_token() {
        let limited = status_error(StatusCode::FORBIDDEN, Some("0"), "");
        assert!(limited.message().contains("rate limit"));
        assert_eq!(limited.exit_code(), crate::error::EXIT_UPSTREAM);

        let secondary = status_error(
            StatusCode::FORBIDDEN,
            Some("4999"),
            r#"{"message":"You have exceeded a secondary rate limit."}"#,
        );
        assert!(secondary.message().contains("rate limit exceeded"));

        let token = status_error(StatusCode::FORBIDDEN, Some("4999"), r#"{"message":"Resource not accessible"}"#);
        assert!(token.message().contains("GITHUB_TOKEN"));
        assert!(status_error(StatusCode::UNAUTHORIZED, None, "").message().contains("GITHUB_TOKEN"));
        assert!(status_error(StatusCode::BAD_GATEWAY, None, "").message().contains("status 502"));
    }

    #[test]
    fn request_body_carries_query_and_variables() {
        let req = GraphqlRequest {
            query: PROJECT_ITEMS_QUERY,
            variables: QueryVariables { org: "acme", cursor: None },
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["variables"]["org"], "acme");
        assert!(json["variables"]["cursor"].is_null());
        assert!(json["query"].as_str().unwrap().contains("projectsV2"));
    }
}
