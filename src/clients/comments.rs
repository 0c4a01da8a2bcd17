use std::sync::Arc;

use crate::{
    clients::encode_segment,
    error::{ClientError, ClientResult},
    fetch::{ApiRequest, AuthenticatedFetch},
    models::{Comment, CommentBody, CommentCount},
    ui::notify::ToastLevel,
};

pub const DEFAULT_COMMENT_LIMIT: u32 = 50;

/// CommentsClient
///
/// Comments live under their post for listing and creation, and under
/// `/api/comments/{id}` for edits and deletion.
pub struct CommentsClient {
    fetch: Arc<AuthenticatedFetch>,
}

/// Rejects whitespace-only text before it reaches the network.
fn non_empty(content: &str) -> ClientResult<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ClientError::ValidationFailed(
            "Comment cannot be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

impl CommentsClient {
    pub fn new(fetch: Arc<AuthenticatedFetch>) -> Self {
        Self { fetch }
    }

    pub async fn create_comment(&self, post_id: &str, content: &str) -> ClientResult<Comment> {
        let body = CommentBody {
            content: non_empty(content)?,
        };
        let response = self
            .fetch
            .expect_success(
                ApiRequest::post(format!("/api/posts/{}/comments", encode_segment(post_id)))
                    .json(&body)?,
                "Failed to create comment",
            )
            .await?;
        let comment: Comment = response.json()?;
        self.fetch
            .notifier()
            .notify("Comment added!", ToastLevel::Success);
        Ok(comment)
    }

    pub async fn list_comments(
        &self,
        post_id: &str,
        limit: u32,
        offset: u32,
    ) -> ClientResult<Vec<Comment>> {
        self.fetch
            .fetch_list(
                ApiRequest::get(format!("/api/posts/{}/comments", encode_segment(post_id)))
                    .query("limit", limit)
                    .query("offset", offset),
                "Failed to load comments",
            )
            .await
    }

    pub async fn update_comment(&self, comment_id: &str, content: &str) -> ClientResult<Comment> {
        let body = CommentBody {
            content: non_empty(content)?,
        };
        let response = self
            .fetch
            .expect_success(
                ApiRequest::put(format!("/api/comments/{}", encode_segment(comment_id)))
                    .json(&body)?,
                "Failed to update comment",
            )
            .await?;
        let comment: Comment = response.json()?;
        self.fetch
            .notifier()
            .notify("Comment updated!", ToastLevel::Success);
        Ok(comment)
    }

    pub async fn delete_comment(&self, comment_id: &str) -> ClientResult<bool> {
        self.fetch
            .expect_success(
                ApiRequest::delete(format!("/api/comments/{}", encode_segment(comment_id))),
                "Failed to delete comment",
            )
            .await?;
        self.fetch
            .notifier()
            .notify("Comment deleted!", ToastLevel::Success);
        Ok(true)
    }

    /// comment_count
    ///
    /// Non-critical read: any failure degrades to 0 instead of surfacing.
    pub async fn comment_count(&self, post_id: &str) -> u64 {
        let request =
            ApiRequest::get(format!("/api/posts/{}/comments/count", encode_segment(post_id)));
        match self
            .fetch
            .fetch_json::<CommentCount>(request, "Failed to get comment count")
            .await
        {
            Ok(count) => count.comment_count,
            Err(e) => {
                tracing::warn!(post_id, error = %e, "Comment count unavailable, showing 0");
                0
            }
        }
    }
}
