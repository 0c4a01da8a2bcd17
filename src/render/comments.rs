use chrono::{DateTime, Utc};

use crate::{
    models::Comment,
    render::{DEFAULT_AVATAR, Viewer, escape_html, format_time, present},
    ui::actions::ActionKind,
};

/// render_comment
///
/// Edit and delete controls are offered to the comment's author only. The
/// "Edited" marker appears iff the comment was changed after creation.
pub fn render_comment(comment: &Comment, viewer: &Viewer, now: DateTime<Utc>) -> String {
    let id = escape_html(&comment.id);
    let author = escape_html(&comment.author_name);
    let avatar = escape_html(present(&comment.author_profile_image).unwrap_or(DEFAULT_AVATAR));

    let actions = if viewer.is(&comment.author_id) {
        format!(
            r#"<div class="comment-actions"><button class="btn-icon edit-comment-btn" data-action="{}" data-comment-id="{id}"><i class="fas fa-edit"></i></button><button class="btn-icon delete-comment-btn" data-action="{}" data-comment-id="{id}"><i class="fas fa-trash"></i></button></div>"#,
            ActionKind::EditComment.as_str(),
            ActionKind::DeleteComment.as_str(),
        )
    } else {
        String::new()
    };

    format!(
        r#"<div class="comment" data-comment-id="{id}">
<div class="comment-header">
<div class="comment-author">
<img src="{avatar}" alt="{author}" class="comment-avatar">
<div class="comment-author-info"><h5>{author}</h5><span class="comment-time">{time}</span></div>
</div>
{actions}
</div>
<div class="comment-content"><p>{content}</p></div>
{edited}
</div>"#,
        time = escape_html(&format_time(comment.created_at, now)),
        content = escape_html(&comment.content),
        edited = render_edited_marker(comment, now),
    )
}

/// Empty for a never-edited comment.
pub fn render_edited_marker(comment: &Comment, now: DateTime<Utc>) -> String {
    if !comment.is_edited() {
        return String::new();
    }
    format!(
        r#"<div class="comment-edited"><small>Edited <time datetime="{}">{}</time></small></div>"#,
        comment.updated_at.to_rfc3339(),
        escape_html(&format_time(comment.updated_at, now))
    )
}

pub fn render_comment_list(comments: &[Comment], viewer: &Viewer, now: DateTime<Utc>) -> String {
    if comments.is_empty() {
        return r#"<div class="no-comments"><p>No comments yet. Be the first to comment!</p></div>"#
            .to_string();
    }
    comments
        .iter()
        .map(|comment| render_comment(comment, viewer, now))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_comment_form() -> String {
    format!(
        r#"<div class="comment-form">
<div class="form-group"><textarea class="form-control" id="comment-text" placeholder="Write your comment here..." rows="3" required></textarea></div>
<div class="form-actions"><button type="submit" class="btn btn-primary" data-action="{}"><i class="fas fa-paper-plane"></i> Post Comment</button></div>
</div>"#,
        ActionKind::SubmitComment.as_str()
    )
}

/// Shown instead of the form to anonymous visitors.
pub fn render_login_prompt() -> String {
    r#"<div class="auth-required"><p>Please <a href="login.html">login</a> to post comments</p></div>"#
        .to_string()
}

pub fn render_edit_form(comment_id: &str, content: &str) -> String {
    let id = escape_html(comment_id);
    format!(
        r#"<div class="comment-edit-form" data-comment-id="{id}">
<div class="form-group"><textarea class="form-control edit-comment-text">{}</textarea></div>
<div class="form-actions">
<button type="button" class="btn btn-primary save-edit-btn" data-action="{}" data-comment-id="{id}"><i class="fas fa-save"></i> Save</button>
<button type="button" class="btn btn-secondary cancel-edit-btn" data-action="{}" data-comment-id="{id}"><i class="fas fa-times"></i> Cancel</button>
</div>
</div>"#,
        escape_html(content),
        ActionKind::SaveComment.as_str(),
        ActionKind::CancelEdit.as_str(),
    )
}
