//! Paged comment fetcher for a single GitHub Discussion.
//!
//! Follows the GraphQL `endCursor` until the API reports no further pages.
//! The configured `max_pages` is a hard ceiling: reaching it while pages
//! remain aborts the run instead of silently truncating the thread.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::config::DiscussionConfig;
use crate::github::GitHubApi;
use crate::models::Comment;
use crate::progress::{ProgressEvent, ProgressReporter};

const COMMENTS_QUERY: &str = "query($owner: String!, $name: String!, $number: Int!, $first: Int!, $cursor: String) { \
repository(owner: $owner, name: $name) { \
discussion(number: $number) { \
comments(first: $first, after: $cursor) { \
pageInfo { hasNextPage endCursor } \
nodes { author { login } body createdAt } \
} } } }";

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<ResponseData>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    repository: Option<Repository>,
}

#[derive(Debug, Deserialize)]
struct Repository {
    discussion: Option<Discussion>,
}

#[derive(Debug, Deserialize)]
struct Discussion {
    comments: CommentPage,
}

/// One page of the `comments` connection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPage {
    pub page_info: PageInfo,
    #[serde(default)]
    pub nodes: Vec<Option<Comment>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

/// Fetch a single page of comments after `cursor`.
pub async fn fetch_page(
    api: &dyn GitHubApi,
    discussion: &DiscussionConfig,
    cursor: Option<&str>,
) -> Result<CommentPage> {
    let mut variables = Map::new();
    variables.insert("owner".into(), Value::from(discussion.owner.as_str()));
    variables.insert("name".into(), Value::from(discussion.repo.as_str()));
    variables.insert("number".into(), Value::from(discussion.number));
    variables.insert("first".into(), Value::from(discussion.page_size));
    variables.insert(
        "cursor".into(),
        cursor.map(Value::from).unwrap_or(Value::Null),
    );

    let raw = api
        .graphql(COMMENTS_QUERY, &variables)
        .await
        .with_context(|| {
            format!(
                "Failed to query discussion #{} in {}/{}",
                discussion.number, discussion.owner, discussion.repo
            )
        })?;

    let response: GraphqlResponse =
        serde_json::from_value(raw).with_context(|| "Unexpected GraphQL response shape")?;

    if let Some(err) = response.errors.first() {
        bail!("GraphQL error: {}", err.message);
    }

    response
        .data
        .and_then(|d| d.repository)
        .and_then(|r| r.discussion)
        .map(|d| d.comments)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Discussion #{} not found in {}/{}",
                discussion.number,
                discussion.owner,
                discussion.repo
            )
        })
}

/// Fetch every comment of the discussion in thread order.
///
/// Deleted comments (null nodes) are dropped. Stops when the API reports no
/// next page or hands back an empty cursor.
pub async fn fetch_all_comments(
    api: &dyn GitHubApi,
    discussion: &DiscussionConfig,
    progress: &dyn ProgressReporter,
) -> Result<Vec<Comment>> {
    let mut comments = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0u32;

    loop {
        if pages == discussion.max_pages {
            bail!(
                "Pagination ceiling reached: {} pages fetched and more remain",
                pages
            );
        }
        pages += 1;

        let page = fetch_page(api, discussion, cursor.as_deref()).await?;
        let fetched = page.nodes.len();
        comments.extend(page.nodes.into_iter().flatten());

        progress.report(ProgressEvent::Page {
            page: pages,
            fetched,
            total: comments.len(),
        });

        match page.page_info.end_cursor {
            Some(next) if page.page_info.has_next_page && !next.is_empty() => cursor = Some(next),
            _ => break,
        }
    }

    Ok(comments)
}
