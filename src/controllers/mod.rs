// Page controllers: each one owns a set of document regions and the actions that
// patch them. Errors stop here and become toasts.
pub mod admin;
pub mod feed;
pub mod nav;
pub mod post_detail;
pub mod upload;

pub use admin::AdminController;
pub use feed::{FeedController, PostCardState};
pub use nav::NavController;
pub use post_detail::PostDetailController;
pub use upload::UploadWidget;

use crate::{
    error::ClientError,
    ui::notify::{Notifier, ToastLevel},
};

/// report
///
/// Converts an error caught at an action boundary into a toast. A 401 has already
/// redirected and a 403 has already been announced by the fetch layer, so those
/// are only logged.
pub(crate) fn report(notifier: &dyn Notifier, error: &ClientError, context: &str) {
    match error {
        ClientError::AuthenticationRequired | ClientError::PermissionDenied => {
            tracing::debug!(error = %error, context, "Action stopped by authorization");
        }
        _ => {
            tracing::error!(error = %error, context, "Action failed");
            notifier.notify(&error.to_string(), ToastLevel::Error);
        }
    }
}
