use chrono::{DateTime, Utc};

use crate::{
    clients::encode_segment,
    models::{MediaItem, Post},
    render::{DEFAULT_AVATAR, Viewer, category_label, escape_html, format_time, present},
    ui::actions::ActionKind,
};

/// Most media tiles shown in a grid before the rest collapse into "+N".
pub const MEDIA_GRID_LIMIT: usize = 4;

/// Link copied by the share action. Plain URL text, not markup.
pub fn post_share_url(origin: &str, post_id: &str) -> String {
    format!(
        "{}/post-detail.html?id={}",
        origin.trim_end_matches('/'),
        encode_segment(post_id)
    )
}

/// render_post
///
/// One feed card. Badges, media, counters, the like button in the viewer's state,
/// and the moderation menu when the viewer can manage posts.
pub fn render_post(post: &Post, viewer: &Viewer, now: DateTime<Utc>) -> String {
    let id = escape_html(&post.id);
    let author = escape_html(&post.author_name);
    let avatar = escape_html(present(&post.author_profile_image).unwrap_or(DEFAULT_AVATAR));

    let mut badges = String::new();
    if post.is_pinned {
        badges.push_str(r#"<span class="badge pinned"><i class="fas fa-thumbtack"></i> Pinned</span>"#);
    }
    if post.is_featured {
        badges.push_str(r#"<span class="badge featured"><i class="fas fa-star"></i> Featured</span>"#);
    }
    if let Some(category) = present(&post.category) {
        badges.push_str(&format!(
            r#"<span class="badge category">{}</span>"#,
            escape_html(&category_label(category))
        ));
    }

    let title = if post.title.trim().is_empty() {
        "Untitled Post".to_string()
    } else {
        escape_html(&post.title)
    };
    let description = present(&post.description)
        .map(|d| format!(r#"<p class="post-description">{}</p>"#, escape_html(d)))
        .unwrap_or_default();
    let body = present(&post.content)
        .map(|c| format!(r#"<div class="post-body">{}</div>"#, escape_html(c)))
        .unwrap_or_default();

    format!(
        r#"<div class="post-card" data-post-id="{id}">
<div class="post-header">
<div class="post-author">
<img src="{avatar}" alt="{author}" class="author-avatar">
<div class="author-info"><h4>{author}</h4><span class="post-time">{time}</span></div>
</div>
<div class="post-badges">{badges}</div>
</div>
<div class="post-content">
<h3 class="post-title">{title}</h3>
{description}{body}
</div>
{media}
<div class="post-footer">
{stats}
<div class="post-actions">
{like}
<a href="post-detail.html?id={id}" class="btn-icon"><i class="fas fa-comment"></i> Comment</a>
{moderation}
<button class="btn-icon share-btn" data-action="{share}" data-post-id="{id}"><i class="fas fa-share"></i> Share</button>
</div>
</div>
</div>"#,
        time = escape_html(&format_time(post.created_at, now)),
        media = render_media(&post.media),
        stats = render_post_stats(post),
        like = render_like_button(&post.id, post.user_liked),
        moderation = render_moderation_menu(post, viewer),
        share = ActionKind::SharePost.as_str(),
    )
}

pub fn render_post_stats(post: &Post) -> String {
    format!(
        r#"<div class="post-stats"><span class="stat like-count"><i class="fas fa-heart"></i> {}</span><span class="stat"><i class="fas fa-comment"></i> {}</span><span class="stat"><i class="fas fa-eye"></i> {}</span></div>"#,
        post.like_count, post.comment_count, post.view_count
    )
}

/// The button's `data-action` is the action it will perform next.
pub fn render_like_button(post_id: &str, liked: bool) -> String {
    let (action, icon, label) = if liked {
        (ActionKind::UnlikePost, "fa-heart text-danger", "Liked")
    } else {
        (ActionKind::LikePost, "fa-heart", "Like")
    };
    format!(
        r#"<button class="btn-icon like-btn" data-action="{}" data-liked="{}" data-post-id="{}"><i class="fas {}"></i> {}</button>"#,
        action.as_str(),
        liked,
        escape_html(post_id),
        icon,
        label
    )
}

/// render_media
///
/// A single item is shown large with its caption; several are shown as a grid of
/// at most four tiles, the last one carrying a "+N" overlay for the remainder.
pub fn render_media(media: &[MediaItem]) -> String {
    match media {
        [] => String::new(),
        [item] => {
            let caption = present(&item.caption);
            format!(
                r#"<div class="post-media"><img src="{}" alt="{}" class="media-preview single">{}</div>"#,
                escape_html(&item.url),
                escape_html(caption.unwrap_or("Post media")),
                caption
                    .map(|c| format!(r#"<p class="media-caption">{}</p>"#, escape_html(c)))
                    .unwrap_or_default()
            )
        }
        items => {
            let overflow = items.len() > MEDIA_GRID_LIMIT;
            let tiles: String = items
                .iter()
                .take(MEDIA_GRID_LIMIT)
                .enumerate()
                .map(|(index, item)| {
                    let last_with_overlay = overflow && index == MEDIA_GRID_LIMIT - 1;
                    let alt = present(&item.caption)
                        .map(escape_html)
                        .unwrap_or_else(|| format!("Media {}", index + 1));
                    let overlay = if last_with_overlay {
                        format!(
                            r#"<div class="media-overlay">+{}</div>"#,
                            items.len() - (MEDIA_GRID_LIMIT - 1)
                        )
                    } else {
                        String::new()
                    };
                    format!(
                        r#"<div class="media-item{}"><img src="{}" alt="{}">{}</div>"#,
                        if last_with_overlay { " with-overlay" } else { "" },
                        escape_html(&item.url),
                        alt,
                        overlay
                    )
                })
                .collect();
            format!(r#"<div class="post-media grid">{}</div>"#, tiles)
        }
    }
}

/// render_moderation_menu
///
/// Empty unless the viewer may manage posts. Each entry offers the opposite of the
/// post's current pin/feature state.
pub fn render_moderation_menu(post: &Post, viewer: &Viewer) -> String {
    if !viewer.can_manage_posts {
        return String::new();
    }
    let id = escape_html(&post.id);
    let pin = if post.is_pinned {
        (ActionKind::UnpinPost, "Unpin Post")
    } else {
        (ActionKind::PinPost, "Pin Post")
    };
    let feature = if post.is_featured {
        (ActionKind::UnfeaturePost, "Unfeature Post")
    } else {
        (ActionKind::FeaturePost, "Feature Post")
    };

    format!(
        r#"<div class="moderation-dropdown">
<button class="btn-icon mod-btn"><i class="fas fa-ellipsis-h"></i> Mod</button>
<div class="moderation-menu">
<button class="mod-action" data-action="{pin_action}" data-post-id="{id}"><i class="fas fa-thumbtack"></i> {pin_label}</button>
<button class="mod-action" data-action="{feature_action}" data-post-id="{id}"><i class="fas fa-star"></i> {feature_label}</button>
<hr>
<button class="mod-action text-danger" data-action="{delete}" data-post-id="{id}"><i class="fas fa-trash"></i> Delete Post</button>
</div>
</div>"#,
        pin_action = pin.0.as_str(),
        pin_label = pin.1,
        feature_action = feature.0.as_str(),
        feature_label = feature.1,
        delete = ActionKind::DeletePost.as_str(),
    )
}

pub fn render_post_list(posts: &[Post], viewer: &Viewer, now: DateTime<Utc>) -> String {
    if posts.is_empty() {
        return r#"<div class="no-posts"><p>No posts yet.</p></div>"#.to_string();
    }
    posts
        .iter()
        .map(|post| render_post(post, viewer, now))
        .collect::<Vec<_>>()
        .join("\n")
}
