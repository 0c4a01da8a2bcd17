mod common;

use std::{collections::BTreeMap, sync::Arc};

use chrono::{TimeZone, Utc};
use common::{TestApp, anonymous_app, comment_json, signed_in_app, user};
use serde_json::json;
use unisocial_client::{
    ClientError,
    controllers::{PostDetailController, post_detail},
    fetch::Method,
    models::{Comment, Role},
    render::{
        Viewer,
        comments::{render_comment, render_edited_marker},
    },
    ui::actions::UiAction,
};

async fn loaded_thread(app: &TestApp, comments: serde_json::Value, count: u64) -> Arc<PostDetailController> {
    app.transport
        .push_json(200, comments)
        .push_json(200, json!({ "comment_count": count }));
    let controller = Arc::new(PostDetailController::new(app.ctx.clone(), "p1"));
    assert!(controller.load().await);
    controller
}

fn comment(id: &str, author_id: &str, edited: bool) -> Comment {
    serde_json::from_value(comment_json(id, author_id, "hello", edited)).unwrap()
}

#[cfg(test)]
mod comments_client {
    use super::*;

    #[tokio::test]
    async fn test_blank_comment_is_rejected_without_request() {
        let app = signed_in_app(&user("u1", Role::Student, true));

        let err = app.ctx.comments.create_comment("p1", "   \n").await.unwrap_err();

        assert!(matches!(err, ClientError::ValidationFailed(ref m) if m == "Comment cannot be empty"));
        assert_eq!(app.transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_comment_text_is_trimmed() {
        let app = signed_in_app(&user("u1", Role::Student, true));
        app.transport
            .push_json(201, comment_json("c1", "u1", "nice", false));

        app.ctx.comments.create_comment("p1", "  nice  ").await.unwrap();

        let request = app.transport.last_request().unwrap();
        assert_eq!(request.path, "/api/posts/p1/comments");
        assert_eq!(
            request.body,
            unisocial_client::fetch::RequestBody::Json(json!({ "content": "nice" }))
        );
        assert_eq!(app.last_toast().as_deref(), Some("Comment added!"));
    }

    #[tokio::test]
    async fn test_count_degrades_to_zero_on_server_error() {
        let app = anonymous_app();
        app.transport.push_status(500);

        assert_eq!(app.ctx.comments.comment_count("p1").await, 0);
        assert!(app.notifier.toasts().is_empty());
    }

    #[tokio::test]
    async fn test_count_degrades_to_zero_on_malformed_body() {
        let app = anonymous_app();
        app.transport.push_text(200, "<html>oops</html>");

        assert_eq!(app.ctx.comments.comment_count("p1").await, 0);
    }

    #[tokio::test]
    async fn test_count_reads_body() {
        let app = anonymous_app();
        app.transport.push_json(200, json!({ "comment_count": 12 }));

        assert_eq!(app.ctx.comments.comment_count("p1").await, 12);
        assert_eq!(
            app.transport.last_request().unwrap().path,
            "/api/posts/p1/comments/count"
        );
    }
}

#[cfg(test)]
mod rendering {
    use super::*;

    #[test]
    fn test_edited_marker_only_for_changed_comments() {
        let now = Utc.with_ymd_and_hms(2026, 10, 1, 14, 0, 0).unwrap();

        assert_eq!(render_edited_marker(&comment("c1", "u1", false), now), "");

        let marker = render_edited_marker(&comment("c2", "u1", true), now);
        assert!(marker.contains("Edited"));
        assert!(marker.contains("30 minutes ago"));
        assert!(marker.contains("2026-10-01T13:30:00+00:00"));
    }

    #[test]
    fn test_controls_only_for_author() {
        let now = Utc::now();
        let c = comment("c1", "u1", false);

        let author = Viewer::from_user(Some(&user("u1", Role::Student, true)));
        let other = Viewer::from_user(Some(&user("u2", Role::Admin, true)));

        assert!(render_comment(&c, &author, now).contains("edit-comment"));
        assert!(!render_comment(&c, &other, now).contains("edit-comment"));
        assert!(!render_comment(&c, &Viewer::anonymous(), now).contains("delete-comment"));
    }

    #[test]
    fn test_comment_content_is_escaped() {
        let mut c = comment("c1", "u1", false);
        c.content = "<script>alert(1)</script>".to_string();

        let html = render_comment(&c, &Viewer::anonymous(), Utc::now());

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }
}

#[cfg(test)]
mod post_detail_controller {
    use super::*;

    #[tokio::test]
    async fn test_load_renders_thread_and_count() {
        let app = signed_in_app(&user("u1", Role::Student, true));
        let controller = loaded_thread(
            &app,
            json!([comment_json("c1", "u1", "first", false), comment_json("c2", "u2", "second", true)]),
            2,
        )
        .await;

        assert_eq!(controller.comments().len(), 2);
        let list = app.ctx.document.html(post_detail::COMMENTS_LIST).unwrap();
        assert!(list.contains("first"));
        assert!(list.contains("comment-edited"));
        assert_eq!(app.ctx.document.html(post_detail::COMMENT_COUNT).as_deref(), Some("2"));
        assert!(app.ctx.document.html(post_detail::COMMENT_FORM).unwrap().contains("submit-comment"));

        let list_request = &app.transport.requests()[0];
        assert_eq!(list_request.query_value("limit"), Some("50"));
    }

    #[tokio::test]
    async fn test_anonymous_sees_login_prompt() {
        let app = anonymous_app();
        loaded_thread(&app, json!([]), 0).await;

        let form = app.ctx.document.html(post_detail::COMMENT_FORM).unwrap();
        assert!(form.contains("Please"));
        assert!(form.contains("login.html"));
        assert!(app.ctx.document.html(post_detail::COMMENTS_LIST).unwrap().contains("No comments yet"));
    }

    #[tokio::test]
    async fn test_failed_list_still_refreshes_count() {
        let app = anonymous_app();
        app.transport
            .push_json(500, json!({ "message": "boom" }))
            .push_status(500);

        let controller = PostDetailController::new(app.ctx.clone(), "p1");
        assert!(!controller.load().await);

        assert!(app.ctx.document.html(post_detail::COMMENTS_LIST).unwrap().contains("Failed to load comments"));
        assert_eq!(app.ctx.document.html(post_detail::COMMENT_COUNT).as_deref(), Some("0"));
    }

    #[tokio::test]
    async fn test_empty_submit_sends_nothing() {
        let app = signed_in_app(&user("u1", Role::Student, true));
        let controller = loaded_thread(&app, json!([]), 0).await;
        let before = app.transport.request_count();

        assert!(!controller.submit("   ").await);

        assert_eq!(app.transport.request_count(), before);
        assert_eq!(app.last_toast().as_deref(), Some("Comment cannot be empty"));
    }

    #[tokio::test]
    async fn test_submit_prepends_and_updates_count() {
        let app = signed_in_app(&user("u1", Role::Student, true));
        let controller = loaded_thread(&app, json!([comment_json("c1", "u2", "older", false)]), 1).await;
        app.transport
            .push_json(201, comment_json("c2", "u1", "newest", false))
            .push_json(200, json!({ "comment_count": 2 }));

        assert!(controller.submit("newest").await);

        assert_eq!(controller.comments()[0].id, "c2");
        assert_eq!(app.ctx.document.html(post_detail::COMMENT_COUNT).as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_only_author_can_begin_edit() {
        let app = signed_in_app(&user("u1", Role::Student, true));
        let controller = loaded_thread(
            &app,
            json!([comment_json("mine", "u1", "a", false), comment_json("theirs", "u2", "b", false)]),
            2,
        )
        .await;

        assert!(!controller.begin_edit("theirs"));
        assert_eq!(app.last_toast().as_deref(), Some("Permission denied"));
        assert!(controller.editing().is_none());

        assert!(controller.begin_edit("mine"));
        assert_eq!(controller.editing().as_deref(), Some("mine"));
        assert!(app.ctx.document.html(post_detail::COMMENTS_LIST).unwrap().contains("comment-edit-form"));

        controller.cancel_edit();
        assert!(!app.ctx.document.html(post_detail::COMMENTS_LIST).unwrap().contains("comment-edit-form"));
    }

    #[tokio::test]
    async fn test_save_edit_shows_edited_marker() {
        let app = signed_in_app(&user("u1", Role::Student, true));
        let controller = loaded_thread(&app, json!([comment_json("c1", "u1", "typo", false)]), 1).await;
        controller.begin_edit("c1");
        app.transport
            .push_json(200, comment_json("c1", "u1", "fixed", true));

        assert!(controller.save_edit("c1", "fixed").await);

        assert!(controller.editing().is_none());
        assert_eq!(controller.comments()[0].content, "fixed");
        let list = app.ctx.document.html(post_detail::COMMENTS_LIST).unwrap();
        assert!(list.contains("comment-edited"));
        assert_eq!(app.transport.last_request().unwrap().method, Method::PUT);
    }

    #[tokio::test]
    async fn test_delete_through_dispatcher() {
        let app = signed_in_app(&user("u1", Role::Student, true));
        let controller = loaded_thread(&app, json!([comment_json("c1", "u1", "bye", false)]), 1).await;
        app.transport
            .push_status(204)
            .push_json(200, json!({ "comment_count": 0 }));

        let dataset = BTreeMap::from([
            ("action".to_string(), "delete-comment".to_string()),
            ("comment-id".to_string(), "c1".to_string()),
        ]);
        let action = UiAction::from_dataset(&dataset).unwrap();
        assert!(controller.dispatcher().dispatch(action).await);

        assert!(controller.comments().is_empty());
        assert_eq!(app.ctx.document.html(post_detail::COMMENT_COUNT).as_deref(), Some("0"));
        assert_eq!(app.last_toast().as_deref(), Some("Comment deleted!"));
    }
}
