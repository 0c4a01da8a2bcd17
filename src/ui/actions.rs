use std::{
    collections::{BTreeMap, HashMap},
    future::Future,
    pin::Pin,
    sync::Arc,
};

use crate::models::Role;

/// ActionKind
///
/// The `data-action` marker renderers put on interactive elements. The string form
/// is what appears in markup; `parse` maps it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionKind {
    LikePost,
    UnlikePost,
    PinPost,
    UnpinPost,
    FeaturePost,
    UnfeaturePost,
    DeletePost,
    SharePost,
    SubmitComment,
    EditComment,
    SaveComment,
    CancelEdit,
    DeleteComment,
    ActivateUser,
    DeactivateUser,
    DeleteUser,
    ChangeRole,
    ChangePage,
    SearchUsers,
    RemoveFile,
    Logout,
}

impl ActionKind {
    pub const ALL: [ActionKind; 21] = [
        ActionKind::LikePost,
        ActionKind::UnlikePost,
        ActionKind::PinPost,
        ActionKind::UnpinPost,
        ActionKind::FeaturePost,
        ActionKind::UnfeaturePost,
        ActionKind::DeletePost,
        ActionKind::SharePost,
        ActionKind::SubmitComment,
        ActionKind::EditComment,
        ActionKind::SaveComment,
        ActionKind::CancelEdit,
        ActionKind::DeleteComment,
        ActionKind::ActivateUser,
        ActionKind::DeactivateUser,
        ActionKind::DeleteUser,
        ActionKind::ChangeRole,
        ActionKind::ChangePage,
        ActionKind::SearchUsers,
        ActionKind::RemoveFile,
        ActionKind::Logout,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::LikePost => "like-post",
            ActionKind::UnlikePost => "unlike-post",
            ActionKind::PinPost => "pin-post",
            ActionKind::UnpinPost => "unpin-post",
            ActionKind::FeaturePost => "feature-post",
            ActionKind::UnfeaturePost => "unfeature-post",
            ActionKind::DeletePost => "delete-post",
            ActionKind::SharePost => "share-post",
            ActionKind::SubmitComment => "submit-comment",
            ActionKind::EditComment => "edit-comment",
            ActionKind::SaveComment => "save-comment",
            ActionKind::CancelEdit => "cancel-edit",
            ActionKind::DeleteComment => "delete-comment",
            ActionKind::ActivateUser => "activate-user",
            ActionKind::DeactivateUser => "deactivate-user",
            ActionKind::DeleteUser => "delete-user",
            ActionKind::ChangeRole => "change-role",
            ActionKind::ChangePage => "change-page",
            ActionKind::SearchUsers => "search-users",
            ActionKind::RemoveFile => "remove-file",
            ActionKind::Logout => "logout",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == raw)
    }
}

/// UiAction
///
/// A user interaction together with the identifiers it targets.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    LikePost { post_id: String },
    UnlikePost { post_id: String },
    PinPost { post_id: String },
    UnpinPost { post_id: String },
    FeaturePost { post_id: String },
    UnfeaturePost { post_id: String },
    DeletePost { post_id: String },
    SharePost { post_id: String },
    SubmitComment { content: String },
    EditComment { comment_id: String },
    SaveComment { comment_id: String, content: String },
    CancelEdit { comment_id: String },
    DeleteComment { comment_id: String },
    ActivateUser { user_id: String },
    DeactivateUser { user_id: String },
    DeleteUser { user_id: String },
    ChangeRole { user_id: String, role: Role },
    ChangePage { page: u32 },
    SearchUsers { query: String },
    RemoveFile { index: usize },
    Logout,
}

impl UiAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            UiAction::LikePost { .. } => ActionKind::LikePost,
            UiAction::UnlikePost { .. } => ActionKind::UnlikePost,
            UiAction::PinPost { .. } => ActionKind::PinPost,
            UiAction::UnpinPost { .. } => ActionKind::UnpinPost,
            UiAction::FeaturePost { .. } => ActionKind::FeaturePost,
            UiAction::UnfeaturePost { .. } => ActionKind::UnfeaturePost,
            UiAction::DeletePost { .. } => ActionKind::DeletePost,
            UiAction::SharePost { .. } => ActionKind::SharePost,
            UiAction::SubmitComment { .. } => ActionKind::SubmitComment,
            UiAction::EditComment { .. } => ActionKind::EditComment,
            UiAction::SaveComment { .. } => ActionKind::SaveComment,
            UiAction::CancelEdit { .. } => ActionKind::CancelEdit,
            UiAction::DeleteComment { .. } => ActionKind::DeleteComment,
            UiAction::ActivateUser { .. } => ActionKind::ActivateUser,
            UiAction::DeactivateUser { .. } => ActionKind::DeactivateUser,
            UiAction::DeleteUser { .. } => ActionKind::DeleteUser,
            UiAction::ChangeRole { .. } => ActionKind::ChangeRole,
            UiAction::ChangePage { .. } => ActionKind::ChangePage,
            UiAction::SearchUsers { .. } => ActionKind::SearchUsers,
            UiAction::RemoveFile { .. } => ActionKind::RemoveFile,
            UiAction::Logout => ActionKind::Logout,
        }
    }

    /// from_dataset
    ///
    /// Rebuilds an action from an element's `data-*` attributes (keys without the
    /// `data-` prefix). Form input travels under `value`. Returns `None` when the
    /// marker is unknown or a required attribute is missing.
    pub fn from_dataset(dataset: &BTreeMap<String, String>) -> Option<Self> {
        let kind = ActionKind::parse(dataset.get("action")?)?;
        let attr = |name: &str| dataset.get(name).cloned();
        let post_id = || attr("post-id");
        let comment_id = || attr("comment-id");
        let user_id = || attr("user-id");

        let action = match kind {
            ActionKind::LikePost => UiAction::LikePost { post_id: post_id()? },
            ActionKind::UnlikePost => UiAction::UnlikePost { post_id: post_id()? },
            ActionKind::PinPost => UiAction::PinPost { post_id: post_id()? },
            ActionKind::UnpinPost => UiAction::UnpinPost { post_id: post_id()? },
            ActionKind::FeaturePost => UiAction::FeaturePost { post_id: post_id()? },
            ActionKind::UnfeaturePost => UiAction::UnfeaturePost { post_id: post_id()? },
            ActionKind::DeletePost => UiAction::DeletePost { post_id: post_id()? },
            ActionKind::SharePost => UiAction::SharePost { post_id: post_id()? },
            ActionKind::SubmitComment => UiAction::SubmitComment {
                content: attr("value").unwrap_or_default(),
            },
            ActionKind::EditComment => UiAction::EditComment {
                comment_id: comment_id()?,
            },
            ActionKind::SaveComment => UiAction::SaveComment {
                comment_id: comment_id()?,
                content: attr("value").unwrap_or_default(),
            },
            ActionKind::CancelEdit => UiAction::CancelEdit {
                comment_id: comment_id()?,
            },
            ActionKind::DeleteComment => UiAction::DeleteComment {
                comment_id: comment_id()?,
            },
            ActionKind::ActivateUser => UiAction::ActivateUser { user_id: user_id()? },
            ActionKind::DeactivateUser => UiAction::DeactivateUser { user_id: user_id()? },
            ActionKind::DeleteUser => UiAction::DeleteUser { user_id: user_id()? },
            ActionKind::ChangeRole => {
                let role = serde_json::from_value(serde_json::Value::String(attr("value")?)).ok()?;
                UiAction::ChangeRole {
                    user_id: user_id()?,
                    role,
                }
            }
            ActionKind::ChangePage => UiAction::ChangePage {
                page: attr("page")?.parse().ok()?,
            },
            ActionKind::SearchUsers => UiAction::SearchUsers {
                query: attr("value").unwrap_or_default(),
            },
            ActionKind::RemoveFile => UiAction::RemoveFile {
                index: attr("index")?.parse().ok()?,
            },
            ActionKind::Logout => UiAction::Logout,
        };
        Some(action)
    }
}

pub type ActionFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type Handler = Arc<dyn Fn(UiAction) -> ActionFuture + Send + Sync>;

/// Dispatcher
///
/// Explicit table from action kind to handler. Controllers register the actions
/// they own; the host routes every interaction through `dispatch`.
#[derive(Default, Clone)]
pub struct Dispatcher {
    handlers: HashMap<ActionKind, Handler>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `kind`, replacing any previous one.
    pub fn register<F, Fut>(&mut self, kind: ActionKind, handler: F) -> &mut Self
    where
        F: Fn(UiAction) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let boxed: Handler = Arc::new(move |action| -> ActionFuture { Box::pin(handler(action)) });
        self.handlers.insert(kind, boxed);
        self
    }

    /// Merges another table in; its entries win on conflict.
    pub fn extend(&mut self, other: Dispatcher) -> &mut Self {
        self.handlers.extend(other.handlers);
        self
    }

    pub fn handles(&self, kind: ActionKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Runs the handler registered for the action's kind. Returns `false` if
    /// nothing is registered.
    pub async fn dispatch(&self, action: UiAction) -> bool {
        let Some(handler) = self.handlers.get(&action.kind()).cloned() else {
            tracing::debug!(action = action.kind().as_str(), "No handler registered");
            return false;
        };
        handler(action).await;
        true
    }
}
