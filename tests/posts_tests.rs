mod common;

use std::{collections::BTreeMap, sync::Arc};

use common::{TestApp, anonymous_app, post_json, signed_in_app, user};
use serde_json::json;
use unisocial_client::{
    ClientError,
    clients::{
        UploadFile,
        posts::{DEFAULT_PINNED_LIMIT, DEFAULT_POPULAR_DAYS},
    },
    controllers::{FeedController, feed},
    fetch::{Method, PartContent, RequestBody},
    models::{CreatePostRequest, Role, UpdatePostRequest},
    ui::{
        actions::UiAction,
        notify::{Page, ToastLevel},
    },
};

async fn loaded_feed(app: &TestApp, posts: Vec<serde_json::Value>) -> Arc<FeedController> {
    app.transport.push_json(200, json!(posts));
    let controller = Arc::new(FeedController::new(app.ctx.clone()));
    assert!(controller.load().await);
    controller
}

#[cfg(test)]
mod posts_client {
    use super::*;

    #[tokio::test]
    async fn test_create_post_requires_token() {
        let app = anonymous_app();
        let request = CreatePostRequest {
            title: "Hi".to_string(),
            ..CreatePostRequest::default()
        };

        let err = app.ctx.posts.create_post(&request, Vec::new()).await.unwrap_err();

        assert!(matches!(err, ClientError::AuthenticationRequired));
        assert_eq!(app.transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_create_post_with_files_is_multipart() {
        let app = signed_in_app(&user("u1", Role::Student, true));
        app.transport.push_json(201, post_json("p9", 0, false));
        let request = CreatePostRequest {
            title: "Lost keys".to_string(),
            ..CreatePostRequest::default()
        };
        let files = vec![UploadFile::new("keys.png", "image/png", vec![1, 2, 3])];

        let post = app.ctx.posts.create_post(&request, files).await.unwrap();

        assert_eq!(post.id, "p9");
        assert_eq!(app.last_toast().as_deref(), Some("Post created successfully!"));
        let sent = app.transport.last_request().unwrap();
        let RequestBody::Multipart(parts) = sent.body else {
            panic!("expected multipart body");
        };
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].name, "post");
        assert!(matches!(parts[0].content, PartContent::Text(ref t) if t.contains("Lost keys")));
        assert_eq!(parts[1].name, "files");
    }

    #[tokio::test]
    async fn test_like_rate_limit_is_a_warning() {
        let app = signed_in_app(&user("u1", Role::Student, true));
        app.transport
            .push_json(429, json!({ "error": "rate limit exceeded, slow down" }));

        let err = app.ctx.posts.like_post("p1").await.unwrap_err();

        assert!(matches!(err, ClientError::RequestFailed { status: 429, .. }));
        let toast = app.notifier.last().unwrap();
        assert_eq!(toast.level, ToastLevel::Warning);
        assert_eq!(toast.message, "rate limit exceeded, slow down");
    }

    #[tokio::test]
    async fn test_like_failure_without_body_uses_status_message() {
        let app = signed_in_app(&user("u1", Role::Student, true));
        app.transport.push_status(500);

        app.ctx.posts.unlike_post("p1").await.unwrap_err();

        let toast = app.notifier.last().unwrap();
        assert_eq!(toast.message, "Failed to unlike post: 500");
        assert_eq!(toast.level, ToastLevel::Error);
    }

    #[tokio::test]
    async fn test_like_and_unlike_endpoints() {
        let app = signed_in_app(&user("u1", Role::Student, true));
        app.transport.push_status(200).push_status(200);

        app.ctx.posts.like_post("a b").await.unwrap();
        app.ctx.posts.unlike_post("a b").await.unwrap();

        let requests = app.transport.requests();
        assert_eq!(requests[0].method, Method::POST);
        assert_eq!(requests[0].path, "/api/posts/a%20b/like");
        assert_eq!(requests[1].method, Method::DELETE);
        assert_eq!(app.last_toast().as_deref(), Some("Post unliked"));
    }

    #[tokio::test]
    async fn test_list_posts_sends_default_limit_and_offset() {
        let app = anonymous_app();
        app.transport.push_text(200, "null");

        let posts = app.ctx.posts.list_posts(&Default::default()).await.unwrap();

        assert!(posts.is_empty());
        let request = app.transport.last_request().unwrap();
        assert_eq!(request.query_value("limit"), Some("10"));
        assert_eq!(request.query_value("offset"), Some("0"));
        assert!(request.query_value("category").is_none());
    }

    #[tokio::test]
    async fn test_null_media_decodes_as_empty() {
        let app = anonymous_app();
        app.transport.push_json(200, post_json("p1", 3, false));

        let post = app.ctx.posts.get_post("p1").await.unwrap();

        assert!(post.media.is_empty());
        assert_eq!(post.like_count, 3);
    }
}

#[cfg(test)]
mod post_queries {
    use super::*;

    #[tokio::test]
    async fn test_search_posts_query() {
        let app = anonymous_app();
        app.transport.push_json(200, json!([post_json("p1", 0, false)]));

        let posts = app.ctx.posts.search_posts("exam week", 20).await.unwrap();

        assert_eq!(posts.len(), 1);
        let request = app.transport.last_request().unwrap();
        assert_eq!(request.path, "/api/posts/search");
        assert_eq!(request.query_value("q"), Some("exam week"));
        assert_eq!(request.query_value("limit"), Some("20"));
    }

    #[tokio::test]
    async fn test_highlight_endpoints() {
        let app = anonymous_app();
        app.transport
            .push_json(200, json!([]))
            .push_json(200, json!(null))
            .push_json(200, json!([post_json("p9", 40, false)]));

        assert!(app.ctx.posts.pinned_posts(DEFAULT_PINNED_LIMIT).await.unwrap().is_empty());
        assert!(app.ctx.posts.featured_posts(DEFAULT_PINNED_LIMIT).await.unwrap().is_empty());
        let popular = app
            .ctx
            .posts
            .popular_posts(10, DEFAULT_POPULAR_DAYS)
            .await
            .unwrap();
        assert_eq!(popular[0].like_count, 40);

        let requests = app.transport.requests();
        assert_eq!(requests[0].path, "/api/posts/pinned");
        assert_eq!(requests[0].query_value("limit"), Some("5"));
        assert_eq!(requests[1].path, "/api/posts/featured");
        assert_eq!(requests[2].path, "/api/posts/popular");
        assert_eq!(requests[2].query_value("days"), Some("7"));
    }

    #[tokio::test]
    async fn test_posts_by_category_failure_message() {
        let app = anonymous_app();
        app.transport.push_status(503);

        let err = app.ctx.posts.posts_by_category("event", 10).await.unwrap_err();

        assert_eq!(err.to_string(), "Failed to load posts");
        assert_eq!(
            app.transport.last_request().unwrap().query_value("category"),
            Some("event")
        );
    }

    #[tokio::test]
    async fn test_update_post_sends_only_changed_fields() {
        let app = signed_in_app(&user("u1", Role::Student, true));
        app.transport.push_json(200, post_json("p1", 0, false));
        let request = UpdatePostRequest {
            title: Some("Renamed".to_string()),
            ..UpdatePostRequest::default()
        };

        app.ctx.posts.update_post("p1", &request).await.unwrap();

        let sent = app.transport.last_request().unwrap();
        assert_eq!(sent.method, Method::PUT);
        assert_eq!(sent.path, "/api/posts/p1");
        assert_eq!(sent.body, RequestBody::Json(json!({ "title": "Renamed" })));
        assert_eq!(app.last_toast().as_deref(), Some("Post updated successfully!"));
    }
}

#[cfg(test)]
mod feed_controller {
    use super::*;

    #[tokio::test]
    async fn test_load_renders_every_card() {
        let app = anonymous_app();
        let controller = loaded_feed(&app, vec![post_json("p1", 1, false), post_json("p2", 0, false)]).await;

        assert_eq!(controller.cards().len(), 2);
        assert!(app.ctx.document.contains(&feed::card_region("p1")));
        assert!(app.ctx.document.contains(&feed::card_region("p2")));
        let container = app.ctx.document.html(feed::POSTS_CONTAINER).unwrap();
        assert!(container.contains(r#"data-post-id="p1""#));

        let request = app.transport.last_request().unwrap();
        assert_eq!(request.path, "/api/posts/feed");
        assert_eq!(request.query_value("limit"), Some("10"));
    }

    #[tokio::test]
    async fn test_load_failure_shows_error_line() {
        let app = anonymous_app();
        app.transport.push_json(500, json!({ "message": "db down" }));

        let controller = FeedController::new(app.ctx.clone());
        assert!(!controller.load().await);

        assert!(controller.cards().is_empty());
        assert!(app.ctx.document.html(feed::POSTS_CONTAINER).unwrap().contains("Failed to load posts"));
        assert_eq!(app.last_toast().as_deref(), Some("db down"));
    }

    #[tokio::test]
    async fn test_reload_drops_stale_cards() {
        let app = anonymous_app();
        let controller = loaded_feed(&app, vec![post_json("p1", 0, false)]).await;

        app.transport.push_json(200, json!([post_json("p2", 0, false)]));
        controller.load().await;

        assert!(!app.ctx.document.contains(&feed::card_region("p1")));
        assert!(app.ctx.document.contains(&feed::card_region("p2")));
    }

    #[tokio::test]
    async fn test_like_then_unlike_restores_card() {
        let app = signed_in_app(&user("u1", Role::Student, true));
        let controller = loaded_feed(&app, vec![post_json("p1", 4, false)]).await;
        app.transport.push_status(200).push_status(200);

        controller.like("p1").await;
        let liked = controller.card("p1").unwrap();
        assert!(liked.liked());
        assert_eq!(liked.like_count(), 5);
        assert!(app.ctx.document.html(&feed::card_region("p1")).unwrap().contains("unlike-post"));

        controller.unlike("p1").await;
        let card = controller.card("p1").unwrap();
        assert!(!card.liked());
        assert_eq!(card.like_count(), 4);
    }

    #[tokio::test]
    async fn test_toggle_like_follows_card_state() {
        let app = signed_in_app(&user("u1", Role::Student, true));
        let controller = loaded_feed(&app, vec![post_json("p1", 1, true)]).await;
        app.transport.push_status(200);

        controller.toggle_like("p1").await;

        assert_eq!(app.transport.last_request().unwrap().method, Method::DELETE);
        assert_eq!(controller.card("p1").unwrap().like_count(), 0);
    }

    #[tokio::test]
    async fn test_unlike_never_goes_below_zero() {
        let app = signed_in_app(&user("u1", Role::Student, true));
        let controller = loaded_feed(&app, vec![post_json("p1", 0, true)]).await;
        app.transport.push_status(200);

        controller.unlike("p1").await;

        assert_eq!(controller.card("p1").unwrap().like_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_like_leaves_card_untouched() {
        let app = signed_in_app(&user("u1", Role::Student, true));
        let controller = loaded_feed(&app, vec![post_json("p1", 2, false)]).await;
        app.transport.push_json(400, json!({ "error": "already liked" }));

        controller.like("p1").await;

        let card = controller.card("p1").unwrap();
        assert!(!card.liked());
        assert_eq!(card.like_count(), 2);
        assert_eq!(app.last_toast().as_deref(), Some("already liked"));
    }

    #[tokio::test]
    async fn test_anonymous_like_redirects_to_login() {
        let app = anonymous_app();
        let controller = loaded_feed(&app, vec![post_json("p1", 0, false)]).await;
        let before = app.transport.request_count();

        controller.like("p1").await;

        let toast = app.notifier.last().unwrap();
        assert_eq!(toast.message, "Please login to like posts");
        assert_eq!(toast.level, ToastLevel::Warning);
        assert_eq!(app.navigator.current(), Some(Page::Login));
        assert_eq!(app.transport.request_count(), before);
    }

    #[tokio::test]
    async fn test_moderation_without_permission_is_denied_locally() {
        let app = signed_in_app(&user("u1", Role::Student, true));
        let controller = loaded_feed(&app, vec![post_json("p1", 0, false)]).await;
        let before = app.transport.request_count();

        controller.pin("p1", true).await;
        controller.delete("p1").await;

        assert_eq!(app.transport.request_count(), before);
        assert_eq!(app.last_toast().as_deref(), Some("Permission denied"));
        assert!(controller.card("p1").is_some());
    }

    #[tokio::test]
    async fn test_moderator_pin_patches_card() {
        let app = signed_in_app(&user("m1", Role::Moderator, true));
        let controller = loaded_feed(&app, vec![post_json("p1", 0, false)]).await;
        app.transport.push_status(200);

        controller.pin("p1", true).await;

        assert!(controller.card("p1").unwrap().post.is_pinned);
        let card = app.ctx.document.html(&feed::card_region("p1")).unwrap();
        assert!(card.contains("Pinned"));
        assert!(card.contains("unpin-post"));
        assert_eq!(app.last_toast().as_deref(), Some("Post pinned!"));
    }

    #[tokio::test]
    async fn test_delete_removes_card_region() {
        let app = signed_in_app(&user("a1", Role::Admin, true));
        let controller = loaded_feed(&app, vec![post_json("p1", 0, false), post_json("p2", 0, false)]).await;
        app.transport.push_status(204);

        controller.delete("p1").await;

        assert!(controller.card("p1").is_none());
        assert!(!app.ctx.document.contains(&feed::card_region("p1")));
        assert!(!app.ctx.document.html(feed::POSTS_CONTAINER).unwrap().contains(r#"data-post-id="p1""#));
        assert_eq!(app.transport.last_request().unwrap().method, Method::DELETE);
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_card() {
        let app = signed_in_app(&user("a1", Role::Admin, true));
        let controller = loaded_feed(&app, vec![post_json("p1", 0, false)]).await;
        app.transport.push_json(500, json!({ "message": "could not delete" }));

        controller.delete("p1").await;

        assert!(controller.card("p1").is_some());
        assert_eq!(app.last_toast().as_deref(), Some("could not delete"));
    }

    #[tokio::test]
    async fn test_share_uses_api_origin() {
        let app = anonymous_app();
        let controller = FeedController::new(app.ctx.clone());

        let url = controller.share("p7");

        assert_eq!(
            url,
            format!("{}/post-detail.html?id=p7", app.ctx.config.api_base.trim_end_matches('/'))
        );
        assert_eq!(app.last_toast().as_deref(), Some("Link copied to clipboard!"));
    }

    #[tokio::test]
    async fn test_share_url_is_percent_encoded() {
        let app = anonymous_app();
        let controller = FeedController::new(app.ctx.clone());

        let url = controller.share("a&b c");

        assert!(url.ends_with("/post-detail.html?id=a%26b%20c"));
        assert!(!url.contains("&amp;"));
    }

    #[tokio::test]
    async fn test_dispatcher_routes_dataset_actions() {
        let app = signed_in_app(&user("u1", Role::Student, true));
        let controller = loaded_feed(&app, vec![post_json("p1", 0, false)]).await;
        app.transport.push_status(200);

        let dataset = BTreeMap::from([
            ("action".to_string(), "like-post".to_string()),
            ("post-id".to_string(), "p1".to_string()),
        ]);
        let action = UiAction::from_dataset(&dataset).unwrap();
        assert!(controller.dispatcher().dispatch(action).await);

        assert_eq!(controller.card("p1").unwrap().like_count(), 1);
    }
}
