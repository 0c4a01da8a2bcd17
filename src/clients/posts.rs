use std::sync::Arc;

use crate::{
    clients::{encode_segment, media::UploadFile},
    error::{ClientError, ClientResult},
    fetch::{ApiRequest, AuthenticatedFetch, MultipartPart, PartContent},
    models::{CategoryStats, CreatePostRequest, Post, PostQuery, UpdatePostRequest},
    ui::notify::ToastLevel,
};

pub const DEFAULT_PINNED_LIMIT: u32 = 5;
pub const DEFAULT_POPULAR_DAYS: u32 = 7;

/// PostsClient
///
/// All network operations on `/api/posts`. Reads return parsed records and never
/// touch local state; mutations toast on success.
pub struct PostsClient {
    fetch: Arc<AuthenticatedFetch>,
}

fn post_path(id: &str) -> String {
    format!("/api/posts/{}", encode_segment(id))
}

impl PostsClient {
    pub fn new(fetch: Arc<AuthenticatedFetch>) -> Self {
        Self { fetch }
    }

    fn toast(&self, message: &str, level: ToastLevel) {
        self.fetch.notifier().notify(message, level);
    }

    // --- Writes ---

    /// create_post
    ///
    /// Plain JSON when there are no files; otherwise a multipart form carrying the
    /// post as a JSON `post` field plus one `files` field per attachment.
    pub async fn create_post(
        &self,
        request: &CreatePostRequest,
        files: Vec<UploadFile>,
    ) -> ClientResult<Post> {
        if self.fetch.session().get_token().is_none() {
            return Err(ClientError::AuthenticationRequired);
        }

        let (api_request, fallback) = if files.is_empty() {
            (
                ApiRequest::post("/api/posts").json(request)?,
                "Failed to create post",
            )
        } else {
            let mut parts = vec![MultipartPart {
                name: "post".to_string(),
                content: PartContent::Text(serde_json::to_string(request)?),
            }];
            parts.extend(files.into_iter().map(|file| MultipartPart {
                name: "files".to_string(),
                content: PartContent::File {
                    file_name: file.name,
                    content_type: file.content_type,
                    bytes: file.bytes,
                },
            }));
            (
                ApiRequest::post("/api/posts").multipart(parts),
                "Failed to create post with files",
            )
        };

        let response = self.fetch.expect_success(api_request, fallback).await?;
        let post: Post = response.json()?;
        self.toast("Post created successfully!", ToastLevel::Success);
        Ok(post)
    }

    pub async fn update_post(&self, id: &str, request: &UpdatePostRequest) -> ClientResult<Post> {
        let response = self
            .fetch
            .expect_success(
                ApiRequest::put(post_path(id)).json(request)?,
                "Failed to update post",
            )
            .await?;
        let post: Post = response.json()?;
        self.toast("Post updated successfully!", ToastLevel::Success);
        Ok(post)
    }

    pub async fn delete_post(&self, id: &str) -> ClientResult<bool> {
        self.fetch
            .expect_success(ApiRequest::delete(post_path(id)), "Failed to delete post")
            .await?;
        self.toast("Post deleted successfully!", ToastLevel::Success);
        Ok(true)
    }

    // --- Toggles ---

    pub async fn like_post(&self, id: &str) -> ClientResult<()> {
        self.set_like(id, true).await
    }

    pub async fn unlike_post(&self, id: &str) -> ClientResult<()> {
        self.set_like(id, false).await
    }

    /// set_like
    ///
    /// Unlike other mutations, the like endpoints report failures in `error`, and
    /// every failure is toasted here. Rate limiting is shown as a warning.
    async fn set_like(&self, id: &str, liked: bool) -> ClientResult<()> {
        let path = format!("{}/like", post_path(id));
        let (request, verb) = if liked {
            (ApiRequest::post(path), "like")
        } else {
            (ApiRequest::delete(path), "unlike")
        };

        let response = match self.fetch.send(request).await {
            Ok(response) => response,
            Err(e @ (ClientError::AuthenticationRequired | ClientError::PermissionDenied)) => {
                return Err(e);
            }
            Err(e) => {
                self.toast(&e.to_string(), ToastLevel::Error);
                return Err(e);
            }
        };

        if !response.is_success() {
            let body = response.error_body().unwrap_or_default();
            let message = body
                .error
                .filter(|m| !m.is_empty())
                .or(body.message.filter(|m| !m.is_empty()))
                .unwrap_or_else(|| format!("Failed to {} post: {}", verb, response.status));
            let level = if message.contains("rate limit exceeded") {
                ToastLevel::Warning
            } else {
                ToastLevel::Error
            };
            self.toast(&message, level);
            return Err(ClientError::request_failed(response.status, message));
        }

        if liked {
            self.toast("Post liked!", ToastLevel::Success);
        } else {
            self.toast("Post unliked", ToastLevel::Info);
        }
        Ok(())
    }

    async fn toggle(
        &self,
        id: &str,
        endpoint: &str,
        enable: bool,
        fallback: &str,
        success: (&str, ToastLevel),
    ) -> ClientResult<bool> {
        let path = format!("{}/{}", post_path(id), endpoint);
        let request = if enable {
            ApiRequest::post(path)
        } else {
            ApiRequest::delete(path)
        };
        self.fetch.expect_success(request, fallback).await?;
        self.toast(success.0, success.1);
        Ok(true)
    }

    pub async fn pin_post(&self, id: &str) -> ClientResult<bool> {
        self.toggle(id, "pin", true, "Failed to pin post", ("Post pinned!", ToastLevel::Success))
            .await
    }

    pub async fn unpin_post(&self, id: &str) -> ClientResult<bool> {
        self.toggle(id, "pin", false, "Failed to unpin post", ("Post unpinned", ToastLevel::Info))
            .await
    }

    pub async fn feature_post(&self, id: &str) -> ClientResult<bool> {
        self.toggle(
            id,
            "feature",
            true,
            "Failed to feature post",
            ("Post featured!", ToastLevel::Success),
        )
        .await
    }

    pub async fn unfeature_post(&self, id: &str) -> ClientResult<bool> {
        self.toggle(
            id,
            "feature",
            false,
            "Failed to unfeature post",
            ("Post unfeatured", ToastLevel::Info),
        )
        .await
    }

    // --- Reads ---

    pub async fn list_posts(&self, query: &PostQuery) -> ClientResult<Vec<Post>> {
        self.fetch
            .fetch_list(
                ApiRequest::get("/api/posts").queries(query.to_query()),
                "Failed to load posts",
            )
            .await
    }

    pub async fn get_post(&self, id: &str) -> ClientResult<Post> {
        self.fetch
            .fetch_json(ApiRequest::get(post_path(id)), "Failed to load post")
            .await
    }

    pub async fn search_posts(&self, query: &str, limit: u32) -> ClientResult<Vec<Post>> {
        self.fetch
            .fetch_list(
                ApiRequest::get("/api/posts/search")
                    .query("q", query)
                    .query("limit", limit),
                "Failed to search posts",
            )
            .await
    }

    pub async fn posts_by_category(&self, category: &str, limit: u32) -> ClientResult<Vec<Post>> {
        self.fetch
            .fetch_list(
                ApiRequest::get("/api/posts")
                    .query("category", category)
                    .query("limit", limit),
                "Failed to load posts",
            )
            .await
    }

    pub async fn pinned_posts(&self, limit: u32) -> ClientResult<Vec<Post>> {
        self.fetch
            .fetch_list(
                ApiRequest::get("/api/posts/pinned").query("limit", limit),
                "Failed to load pinned posts",
            )
            .await
    }

    pub async fn featured_posts(&self, limit: u32) -> ClientResult<Vec<Post>> {
        self.fetch
            .fetch_list(
                ApiRequest::get("/api/posts/featured").query("limit", limit),
                "Failed to load featured posts",
            )
            .await
    }

    pub async fn popular_posts(&self, limit: u32, days: u32) -> ClientResult<Vec<Post>> {
        self.fetch
            .fetch_list(
                ApiRequest::get("/api/posts/popular")
                    .query("limit", limit)
                    .query("days", days),
                "Failed to load popular posts",
            )
            .await
    }

    pub async fn category_stats(&self) -> ClientResult<CategoryStats> {
        self.fetch
            .fetch_json(
                ApiRequest::get("/api/posts/categories/stats"),
                "Failed to load category stats",
            )
            .await
    }

    pub async fn feed(&self, category: Option<&str>, limit: u32, offset: u32) -> ClientResult<Vec<Post>> {
        let mut request = ApiRequest::get("/api/posts/feed");
        if let Some(category) = category {
            request = request.query("category", category);
        }
        self.fetch
            .fetch_list(
                request.query("limit", limit).query("offset", offset),
                "Failed to load feed",
            )
            .await
    }
}
