use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;

use crate::{
    AppContext,
    controllers::report,
    error::ClientResult,
    models::Post,
    render::{
        Viewer,
        posts::{post_share_url, render_post, render_post_list},
    },
    ui::{
        actions::{ActionKind, Dispatcher, UiAction},
        notify::{Page, ToastLevel},
    },
};

pub const POSTS_CONTAINER: &str = "posts-container";
pub const DEFAULT_FEED_LIMIT: u32 = 10;

/// Region holding a single card, so a patch can be applied without a reload.
pub fn card_region(post_id: &str) -> String {
    format!("post-card:{}", post_id)
}

/// PostCardState
///
/// The client's copy of one displayed post. Optimistic patches land here and the
/// card is re-rendered from it; the next full load replaces it with server data.
#[derive(Debug, Clone, PartialEq)]
pub struct PostCardState {
    pub post: Post,
}

impl PostCardState {
    pub fn new(post: Post) -> Self {
        Self { post }
    }

    pub fn id(&self) -> &str {
        &self.post.id
    }

    pub fn liked(&self) -> bool {
        self.post.user_liked
    }

    pub fn like_count(&self) -> u64 {
        self.post.like_count
    }

    pub fn apply_like(&mut self) {
        self.post.like_count += 1;
        self.post.user_liked = true;
    }

    /// The displayed count never goes below zero.
    pub fn apply_unlike(&mut self) {
        self.post.like_count = self.post.like_count.saturating_sub(1);
        self.post.user_liked = false;
    }

    pub fn set_pinned(&mut self, pinned: bool) {
        self.post.is_pinned = pinned;
    }

    pub fn set_featured(&mut self, featured: bool) {
        self.post.is_featured = featured;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Moderation {
    Pin(bool),
    Feature(bool),
    Delete,
}

impl Moderation {
    fn verb(&self) -> &'static str {
        match self {
            Moderation::Pin(true) => "pin",
            Moderation::Pin(false) => "unpin",
            Moderation::Feature(true) => "feature",
            Moderation::Feature(false) => "unfeature",
            Moderation::Delete => "delete",
        }
    }
}

/// FeedController
///
/// Loads the feed into `posts-container`, one region per card, and applies like,
/// moderation and delete results to the cards in place.
pub struct FeedController {
    ctx: AppContext,
    category: Option<String>,
    limit: u32,
    cards: Mutex<Vec<PostCardState>>,
}

impl FeedController {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            category: None,
            limit: DEFAULT_FEED_LIMIT,
            cards: Mutex::new(Vec::new()),
        }
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit.max(1);
        self
    }

    fn viewer(&self) -> Viewer {
        Viewer::from_user(self.ctx.auth.current_user().as_ref())
    }

    pub fn cards(&self) -> Vec<PostCardState> {
        self.cards.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn card(&self, post_id: &str) -> Option<PostCardState> {
        self.cards
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|card| card.id() == post_id)
            .cloned()
    }

    /// load
    ///
    /// Fetches the first page of the feed and replaces every card. On failure the
    /// container shows an error line and the previous cards are dropped.
    pub async fn load(&self) -> bool {
        match self.fetch_page().await {
            Ok(posts) => {
                let stale = self.ctx.document.regions_with_prefix("post-card:");
                for region in stale {
                    self.ctx.document.remove(&region);
                }
                *self.cards.lock().unwrap_or_else(PoisonError::into_inner) =
                    posts.into_iter().map(PostCardState::new).collect();
                self.render();
                true
            }
            Err(e) => {
                report(self.ctx.notifier.as_ref(), &e, "load feed");
                self.cards.lock().unwrap_or_else(PoisonError::into_inner).clear();
                self.ctx.document.set_html(
                    POSTS_CONTAINER,
                    r#"<div class="error"><p>Failed to load posts</p></div>"#,
                );
                false
            }
        }
    }

    async fn fetch_page(&self) -> ClientResult<Vec<Post>> {
        self.ctx
            .posts
            .feed(self.category.as_deref(), self.limit, 0)
            .await
    }

    /// Rewrites every card region and the container from the current state.
    pub fn render(&self) {
        let viewer = self.viewer();
        let now = Utc::now();
        let posts: Vec<Post> = self.cards().into_iter().map(|card| card.post).collect();
        for post in &posts {
            self.ctx
                .document
                .set_html(&card_region(&post.id), render_post(post, &viewer, now));
        }
        self.ctx
            .document
            .set_html(POSTS_CONTAINER, render_post_list(&posts, &viewer, now));
    }

    fn patch(&self, post_id: &str, apply: impl FnOnce(&mut PostCardState)) {
        let patched = {
            let mut cards = self.cards.lock().unwrap_or_else(PoisonError::into_inner);
            match cards.iter_mut().find(|card| card.id() == post_id) {
                Some(card) => {
                    apply(card);
                    true
                }
                None => false,
            }
        };
        if patched {
            self.render();
        }
    }

    // --- Likes ---

    /// Likes or unlikes depending on the card's current state.
    pub async fn toggle_like(&self, post_id: &str) {
        let liked = self.card(post_id).is_some_and(|card| card.liked());
        self.set_like(post_id, !liked).await;
    }

    pub async fn like(&self, post_id: &str) {
        self.set_like(post_id, true).await;
    }

    pub async fn unlike(&self, post_id: &str) {
        self.set_like(post_id, false).await;
    }

    /// set_like
    ///
    /// Anonymous viewers are sent to the login page. On success the card's count
    /// and button are patched immediately; failures were already toasted by the
    /// posts client.
    async fn set_like(&self, post_id: &str, like: bool) {
        if !self.ctx.auth.is_authenticated() {
            self.ctx
                .notifier
                .notify("Please login to like posts", ToastLevel::Warning);
            self.ctx.navigator.redirect(Page::Login);
            return;
        }

        let result = if like {
            self.ctx.posts.like_post(post_id).await
        } else {
            self.ctx.posts.unlike_post(post_id).await
        };

        match result {
            Ok(()) => self.patch(post_id, |card| {
                if like {
                    card.apply_like()
                } else {
                    card.apply_unlike()
                }
            }),
            Err(e) => tracing::debug!(post_id, error = %e, "Like toggle failed"),
        }
    }

    // --- Moderation ---

    pub async fn pin(&self, post_id: &str, pinned: bool) {
        self.moderate(post_id, Moderation::Pin(pinned)).await;
    }

    pub async fn feature(&self, post_id: &str, featured: bool) {
        self.moderate(post_id, Moderation::Feature(featured)).await;
    }

    pub async fn delete(&self, post_id: &str) {
        self.moderate(post_id, Moderation::Delete).await;
    }

    async fn moderate(&self, post_id: &str, action: Moderation) {
        if !self.ctx.auth.can("manage_posts") {
            self.ctx
                .notifier
                .notify("Permission denied", ToastLevel::Error);
            return;
        }

        let posts = &self.ctx.posts;
        let result = match action {
            Moderation::Pin(true) => posts.pin_post(post_id).await,
            Moderation::Pin(false) => posts.unpin_post(post_id).await,
            Moderation::Feature(true) => posts.feature_post(post_id).await,
            Moderation::Feature(false) => posts.unfeature_post(post_id).await,
            Moderation::Delete => posts.delete_post(post_id).await,
        };

        if let Err(e) = result {
            report(self.ctx.notifier.as_ref(), &e, action.verb());
            return;
        }

        match action {
            Moderation::Pin(pinned) => self.patch(post_id, |card| card.set_pinned(pinned)),
            Moderation::Feature(featured) => {
                self.patch(post_id, |card| card.set_featured(featured))
            }
            Moderation::Delete => self.remove_card(post_id),
        }
    }

    fn remove_card(&self, post_id: &str) {
        self.cards
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|card| card.id() != post_id);
        self.ctx.document.remove(&card_region(post_id));
        self.render();
    }

    /// share
    ///
    /// Returns the link to hand to the clipboard and confirms it with a toast.
    pub fn share(&self, post_id: &str) -> String {
        let url = post_share_url(&self.ctx.config.api_base, post_id);
        self.ctx
            .notifier
            .notify("Link copied to clipboard!", ToastLevel::Success);
        url
    }

    pub async fn handle(&self, action: UiAction) {
        match action {
            UiAction::LikePost { post_id } => self.like(&post_id).await,
            UiAction::UnlikePost { post_id } => self.unlike(&post_id).await,
            UiAction::PinPost { post_id } => self.pin(&post_id, true).await,
            UiAction::UnpinPost { post_id } => self.pin(&post_id, false).await,
            UiAction::FeaturePost { post_id } => self.feature(&post_id, true).await,
            UiAction::UnfeaturePost { post_id } => self.feature(&post_id, false).await,
            UiAction::DeletePost { post_id } => self.delete(&post_id).await,
            UiAction::SharePost { post_id } => {
                self.share(&post_id);
            }
            other => tracing::debug!(action = other.kind().as_str(), "Not a feed action"),
        }
    }

    pub fn dispatcher(self: &Arc<Self>) -> Dispatcher {
        let mut dispatcher = Dispatcher::new();
        for kind in [
            ActionKind::LikePost,
            ActionKind::UnlikePost,
            ActionKind::PinPost,
            ActionKind::UnpinPost,
            ActionKind::FeaturePost,
            ActionKind::UnfeaturePost,
            ActionKind::DeletePost,
            ActionKind::SharePost,
        ] {
            let this = self.clone();
            dispatcher.register(kind, move |action| {
                let this = this.clone();
                async move { this.handle(action).await }
            });
        }
        dispatcher
    }
}
