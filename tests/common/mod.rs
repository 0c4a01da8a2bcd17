#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{Value, json};
use unisocial_client::{
    AppConfig, AppContext, MemoryStore, MockTransport,
    models::{Role, UserRecord},
    session::{TOKEN_KEY, USER_KEY},
    ui::notify::{RecordingNavigator, RecordingNotifier},
};

// --- Test Harness ---

/// A fully wired context over a scripted transport and an in-memory session.
pub struct TestApp {
    pub ctx: AppContext,
    pub transport: Arc<MockTransport>,
    pub notifier: Arc<RecordingNotifier>,
    pub navigator: Arc<RecordingNavigator>,
}

impl TestApp {
    pub fn last_toast(&self) -> Option<String> {
        self.notifier.last().map(|toast| toast.message)
    }
}

fn build(store: MemoryStore) -> TestApp {
    let transport = Arc::new(MockTransport::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let navigator = Arc::new(RecordingNavigator::new());
    let ctx = AppContext::new(
        AppConfig::default(),
        transport.clone(),
        Arc::new(store),
        notifier.clone(),
        navigator.clone(),
    );
    TestApp {
        ctx,
        transport,
        notifier,
        navigator,
    }
}

pub fn anonymous_app() -> TestApp {
    build(MemoryStore::new())
}

pub fn signed_in_app(user: &UserRecord) -> TestApp {
    let raw = serde_json::to_string(user).expect("user serializes");
    build(MemoryStore::with_entries(&[
        (TOKEN_KEY, "test-token"),
        (USER_KEY, raw.as_str()),
    ]))
}

// --- Fixtures ---

pub fn user(id: &str, role: Role, is_active: bool) -> UserRecord {
    UserRecord {
        id: id.to_string(),
        email: format!("{}@uni.test", id),
        display_name: format!("User {}", id),
        role,
        is_active,
        ..UserRecord::default()
    }
}

pub fn user_json(id: &str, role: &str) -> Value {
    json!({
        "id": id,
        "email": format!("{}@uni.test", id),
        "display_name": format!("User {}", id),
        "role": role,
        "is_active": true,
        "post_count": 3
    })
}

pub fn post_json(id: &str, like_count: u64, user_liked: bool) -> Value {
    json!({
        "id": id,
        "author_id": "author-1",
        "author_name": "Author One",
        "title": format!("Post {}", id),
        "content": "Hello campus",
        "category": "news",
        "media": null,
        "like_count": like_count,
        "comment_count": 0,
        "view_count": 5,
        "is_pinned": false,
        "is_featured": false,
        "user_liked": user_liked,
        "created_at": "2026-10-01T12:00:00Z"
    })
}

pub fn comment_json(id: &str, author_id: &str, content: &str, edited: bool) -> Value {
    let updated = if edited {
        "2026-10-01T13:30:00Z"
    } else {
        "2026-10-01T12:00:00Z"
    };
    json!({
        "id": id,
        "post_id": "p1",
        "author_id": author_id,
        "author_name": format!("Author {}", author_id),
        "content": content,
        "created_at": "2026-10-01T12:00:00Z",
        "updated_at": updated
    })
}
