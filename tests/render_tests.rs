mod common;

use chrono::{Duration, TimeZone, Utc};
use common::{post_json, user};
use serde_json::json;
use unisocial_client::{
    models::{Post, Role},
    render::{
        Viewer, admin::render_user_row, escape_html, format_file_size, format_time,
        nav::{render_auth_links, render_profile_sidebar},
        posts::{render_like_button, render_media, render_post, render_post_list},
        render_toast, truncate_text,
    },
    ui::notify::ToastLevel,
};

fn post_with(overrides: serde_json::Value) -> Post {
    let mut raw = post_json("p1", 2, false);
    if let (Some(base), Some(extra)) = (raw.as_object_mut(), overrides.as_object()) {
        for (key, value) in extra {
            base.insert(key.clone(), value.clone());
        }
    }
    serde_json::from_value(raw).unwrap()
}

fn media(count: usize) -> serde_json::Value {
    json!((0..count)
        .map(|i| json!({ "url": format!("/media/{}.png", i), "type": "image" }))
        .collect::<Vec<_>>())
}

#[cfg(test)]
mod helpers {
    use super::*;

    #[test]
    fn test_escape_html_covers_all_specials() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_format_time_buckets() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        assert_eq!(format_time(now - Duration::seconds(30), now), "Just now");
        assert_eq!(format_time(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(format_time(now - Duration::hours(3), now), "3 hours ago");
        assert_eq!(format_time(now - Duration::days(2), now), "2 days ago");
        assert_eq!(format_time(now - Duration::days(30), now), "9/19/2026");
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(10 * 1024 * 1024), "10 MB");
    }

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("héllo", 10), "héllo");
        assert_eq!(truncate_text("héllo wörld", 5), "héllo...");
    }
}

#[cfg(test)]
mod posts {
    use super::*;

    #[test]
    fn test_user_text_is_escaped() {
        let post = post_with(json!({
            "title": "<script>alert('t')</script>",
            "author_name": "<b>Mallory</b>",
            "content": "<img src=x onerror=alert(1)>"
        }));

        let html = render_post(&post, &Viewer::anonymous(), Utc::now());

        assert!(!html.contains("<script>"));
        assert!(!html.contains("<b>Mallory</b>"));
        assert!(!html.contains("<img src=x"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_untitled_post_and_category_label() {
        let post = post_with(json!({ "title": "  ", "category": "lost_found" }));
        let html = render_post(&post, &Viewer::anonymous(), Utc::now());

        assert!(html.contains("Untitled Post"));
        assert!(html.contains("Lost &amp; Found"));
    }

    #[test]
    fn test_like_button_reflects_state() {
        let unliked = render_like_button("p1", false);
        assert!(unliked.contains(r#"data-action="like-post""#));
        assert!(unliked.contains("Like</button>"));

        let liked = render_like_button("p1", true);
        assert!(liked.contains(r#"data-action="unlike-post""#));
        assert!(liked.contains("text-danger"));
    }

    #[test]
    fn test_moderation_menu_only_for_staff() {
        let post = post_with(json!({ "is_pinned": true }));
        let now = Utc::now();

        let student = Viewer::from_user(Some(&user("s1", Role::Student, true)));
        assert!(!render_post(&post, &student, now).contains("moderation-menu"));

        let moderator = Viewer::from_user(Some(&user("m1", Role::Moderator, true)));
        let html = render_post(&post, &moderator, now);
        assert!(html.contains("moderation-menu"));
        assert!(html.contains(r#"data-action="unpin-post""#));
        assert!(html.contains(r#"data-action="feature-post""#));
    }

    #[test]
    fn test_single_media_item_shows_caption() {
        let post = post_with(json!({
            "media": [{ "url": "/media/a.png", "caption": "Quad at dawn" }]
        }));
        let html = render_media(&post.media);

        assert!(html.contains("media-preview single"));
        assert!(html.contains("Quad at dawn"));
    }

    #[test]
    fn test_media_grid_overflow_overlay() {
        let post = post_with(json!({ "media": media(6) }));
        let html = render_media(&post.media);

        assert_eq!(html.matches("media-item").count(), 4);
        assert!(html.contains("+3"));
        assert!(html.contains("with-overlay"));
        assert!(!html.contains("/media/4.png"));
    }

    #[test]
    fn test_media_grid_without_overflow() {
        let post = post_with(json!({ "media": media(4) }));
        let html = render_media(&post.media);

        assert_eq!(html.matches("media-item").count(), 4);
        assert!(!html.contains("media-overlay"));
        assert_eq!(render_media(&[]), "");
    }

    #[test]
    fn test_empty_feed_placeholder() {
        assert!(render_post_list(&[], &Viewer::anonymous(), Utc::now()).contains("No posts yet."));
    }
}

#[cfg(test)]
mod chrome {
    use super::*;

    #[test]
    fn test_auth_links_for_anonymous() {
        let html = render_auth_links(None);
        assert!(html.contains("login.html"));
        assert!(html.contains("register.html"));
        assert!(!html.contains("logout"));
    }

    #[test]
    fn test_auth_links_for_user_escape_name() {
        let mut signed_in = user("u1", Role::Student, true);
        signed_in.display_name = "<i>Ada</i>".to_string();

        let html = render_auth_links(Some(&signed_in));

        assert!(html.contains("&lt;i&gt;Ada&lt;/i&gt;"));
        assert!(html.contains(r#"data-action="logout""#));
        assert!(html.contains(r##"<a href="#" id="logout-btn""##));
        assert!(html.ends_with("</div>"));
    }

    #[test]
    fn test_profile_sidebar() {
        assert!(render_profile_sidebar(None).contains("Please login to see your profile"));

        let html = render_profile_sidebar(Some(&user("a1", Role::Admin, true)));
        assert!(html.contains("Administrator"));
    }

    #[test]
    fn test_user_row_toggle_offers_opposite_state() {
        let active = render_user_row(&user("u1", Role::Alumni, true));
        assert!(active.contains("Active"));
        assert!(active.contains(r#"data-action="deactivate-user""#));

        let inactive = render_user_row(&user("u2", Role::Student, false));
        assert!(inactive.contains("Inactive"));
        assert!(inactive.contains(r#"data-action="activate-user""#));
    }

    #[test]
    fn test_toast_markup_matches_level() {
        let html = render_toast("Saved <b>!</b>", ToastLevel::Success);

        assert!(html.contains(r#"class="notification success""#));
        assert!(html.contains("fa-check-circle"));
        assert!(html.contains("Saved &lt;b&gt;!&lt;/b&gt;"));
    }
}
