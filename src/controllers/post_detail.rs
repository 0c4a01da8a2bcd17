use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;

use crate::{
    AppContext,
    clients::comments::DEFAULT_COMMENT_LIMIT,
    controllers::report,
    models::Comment,
    render::{
        Viewer,
        comments::{
            render_comment, render_comment_form, render_comment_list, render_edit_form,
            render_login_prompt,
        },
    },
    ui::{
        actions::{ActionKind, Dispatcher, UiAction},
        notify::ToastLevel,
    },
};

pub const COMMENTS_LIST: &str = "comments-list";
pub const COMMENT_FORM: &str = "comment-form";
pub const COMMENT_COUNT: &str = "comment-count";

#[derive(Debug, Default)]
struct Thread {
    comments: Vec<Comment>,
    editing: Option<String>,
}

/// PostDetailController
///
/// The comment thread under one post: list, form (or login prompt), inline edit,
/// delete, and the comment counter.
pub struct PostDetailController {
    ctx: AppContext,
    post_id: String,
    thread: Mutex<Thread>,
}

impl PostDetailController {
    pub fn new(ctx: AppContext, post_id: impl Into<String>) -> Self {
        Self {
            ctx,
            post_id: post_id.into(),
            thread: Mutex::new(Thread::default()),
        }
    }

    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .comments
            .clone()
    }

    pub fn editing(&self) -> Option<String> {
        self.thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .editing
            .clone()
    }

    fn viewer(&self) -> Viewer {
        Viewer::from_user(self.ctx.auth.current_user().as_ref())
    }

    /// load
    ///
    /// Loads the thread, renders the form or a login prompt, and refreshes the
    /// counter. A failed load leaves an error line in the list.
    pub async fn load(&self) -> bool {
        let form = if self.ctx.auth.is_authenticated() {
            render_comment_form()
        } else {
            render_login_prompt()
        };
        self.ctx.document.set_html(COMMENT_FORM, form);

        let loaded = match self
            .ctx
            .comments
            .list_comments(&self.post_id, DEFAULT_COMMENT_LIMIT, 0)
            .await
        {
            Ok(comments) => {
                *self.thread.lock().unwrap_or_else(PoisonError::into_inner) = Thread {
                    comments,
                    editing: None,
                };
                self.render();
                true
            }
            Err(e) => {
                report(self.ctx.notifier.as_ref(), &e, "load comments");
                self.ctx.document.set_html(
                    COMMENTS_LIST,
                    r#"<div class="error"><p>Failed to load comments</p></div>"#,
                );
                false
            }
        };

        self.refresh_count().await;
        loaded
    }

    /// The comment being edited is shown as its edit form in place.
    pub fn render(&self) {
        let viewer = self.viewer();
        let now = Utc::now();
        let html = {
            let thread = self.thread.lock().unwrap_or_else(PoisonError::into_inner);
            match &thread.editing {
                None => render_comment_list(&thread.comments, &viewer, now),
                Some(editing) => thread
                    .comments
                    .iter()
                    .map(|comment| {
                        if &comment.id == editing {
                            render_edit_form(&comment.id, &comment.content)
                        } else {
                            render_comment(comment, &viewer, now)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("\n"),
            }
        };
        self.ctx.document.set_html(COMMENTS_LIST, html);
    }

    /// refresh_count
    ///
    /// Never fails; the client already degrades any error to 0.
    pub async fn refresh_count(&self) -> u64 {
        let count = self.ctx.comments.comment_count(&self.post_id).await;
        self.ctx.document.set_html(COMMENT_COUNT, count.to_string());
        count
    }

    /// submit
    ///
    /// Blank text is rejected locally. A created comment goes to the top of the list.
    pub async fn submit(&self, content: &str) -> bool {
        if content.trim().is_empty() {
            self.ctx
                .notifier
                .notify("Comment cannot be empty", ToastLevel::Error);
            return false;
        }
        match self.ctx.comments.create_comment(&self.post_id, content).await {
            Ok(comment) => {
                self.thread
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .comments
                    .insert(0, comment);
                self.render();
                self.refresh_count().await;
                true
            }
            Err(e) => {
                report(self.ctx.notifier.as_ref(), &e, "create comment");
                false
            }
        }
    }

    fn owns(&self, comment_id: &str) -> bool {
        let viewer = self.viewer();
        self.thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .comments
            .iter()
            .any(|comment| comment.id == comment_id && viewer.is(&comment.author_id))
    }

    /// Switches one comment into edit mode. Only its author may do that.
    pub fn begin_edit(&self, comment_id: &str) -> bool {
        if !self.owns(comment_id) {
            self.ctx
                .notifier
                .notify("Permission denied", ToastLevel::Error);
            return false;
        }
        self.thread.lock().unwrap_or_else(PoisonError::into_inner).editing =
            Some(comment_id.to_string());
        self.render();
        true
    }

    pub fn cancel_edit(&self) {
        self.thread.lock().unwrap_or_else(PoisonError::into_inner).editing = None;
        self.render();
    }

    /// save_edit
    ///
    /// Replaces the comment with the server's copy, which carries the new
    /// `updated_at` and therefore the "Edited" marker.
    pub async fn save_edit(&self, comment_id: &str, content: &str) -> bool {
        if content.trim().is_empty() {
            self.ctx
                .notifier
                .notify("Comment cannot be empty", ToastLevel::Error);
            return false;
        }
        match self.ctx.comments.update_comment(comment_id, content).await {
            Ok(updated) => {
                {
                    let mut thread = self.thread.lock().unwrap_or_else(PoisonError::into_inner);
                    if let Some(slot) = thread.comments.iter_mut().find(|c| c.id == comment_id) {
                        *slot = updated;
                    }
                    thread.editing = None;
                }
                self.render();
                true
            }
            Err(e) => {
                report(self.ctx.notifier.as_ref(), &e, "update comment");
                false
            }
        }
    }

    pub async fn delete(&self, comment_id: &str) -> bool {
        match self.ctx.comments.delete_comment(comment_id).await {
            Ok(_) => {
                {
                    let mut thread = self.thread.lock().unwrap_or_else(PoisonError::into_inner);
                    thread.comments.retain(|c| c.id != comment_id);
                    if thread.editing.as_deref() == Some(comment_id) {
                        thread.editing = None;
                    }
                }
                self.render();
                self.refresh_count().await;
                true
            }
            Err(e) => {
                report(self.ctx.notifier.as_ref(), &e, "delete comment");
                false
            }
        }
    }

    pub async fn handle(&self, action: UiAction) {
        match action {
            UiAction::SubmitComment { content } => {
                self.submit(&content).await;
            }
            UiAction::EditComment { comment_id } => {
                self.begin_edit(&comment_id);
            }
            UiAction::SaveComment {
                comment_id,
                content,
            } => {
                self.save_edit(&comment_id, &content).await;
            }
            UiAction::CancelEdit { .. } => self.cancel_edit(),
            UiAction::DeleteComment { comment_id } => {
                self.delete(&comment_id).await;
            }
            other => tracing::debug!(action = other.kind().as_str(), "Not a comment action"),
        }
    }

    pub fn dispatcher(self: &Arc<Self>) -> Dispatcher {
        let mut dispatcher = Dispatcher::new();
        for kind in [
            ActionKind::SubmitComment,
            ActionKind::EditComment,
            ActionKind::SaveComment,
            ActionKind::CancelEdit,
            ActionKind::DeleteComment,
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
