// One client per backend resource. Each depends only on the authenticated fetch
// (and through it, the session); none of them call each other.
pub mod admin;
pub mod comments;
pub mod media;
pub mod posts;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

pub use admin::{AdminClient, StatusAction, TotalEstimate, UserPage};
pub use comments::CommentsClient;
pub use media::{MediaClient, UploadFile, UploadLimits};
pub use posts::PostsClient;

// Same unreserved set as the browser's encodeURIComponent.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Encodes a value so it can be embedded as a single path segment.
pub fn encode_segment(raw: &str) -> String {
    utf8_percent_encode(raw, COMPONENT).to_string()
}
