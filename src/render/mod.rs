// Pure markup renderers. Nothing in here touches the network or the session;
// every user-supplied string is escaped before it is embedded.
pub mod admin;
pub mod comments;
pub mod media;
pub mod nav;
pub mod posts;

use chrono::{DateTime, Utc};

use crate::{
    auth::capability::{self, Permission},
    models::{Role, UserRecord},
    ui::notify::ToastLevel,
};

pub const DEFAULT_AVATAR: &str = "/assets/default-avatar.svg";

/// Viewer
///
/// What a renderer needs to know about whoever is looking at the page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Viewer {
    pub user_id: Option<String>,
    pub can_manage_posts: bool,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn from_user(user: Option<&UserRecord>) -> Self {
        match user {
            Some(user) => Self {
                user_id: Some(user.id.clone()),
                can_manage_posts: capability::allows_permission(
                    user.role,
                    user.is_active,
                    Permission::ManagePosts,
                ),
            },
            None => Self::anonymous(),
        }
    }

    pub fn is(&self, user_id: &str) -> bool {
        self.user_id.as_deref() == Some(user_id)
    }
}

/// escape_html
///
/// Neutralizes the five characters that can break out of text or a quoted
/// attribute value.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Treats `Some("")` (common in backend payloads) as absent.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// format_time
///
/// Relative time for recent timestamps, a plain date for anything older than a week.
pub fn format_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (now - at).num_seconds();
    if diff < 60 {
        "Just now".to_string()
    } else if diff < 3_600 {
        format!("{} minutes ago", diff / 60)
    } else if diff < 86_400 {
        format!("{} hours ago", diff / 3_600)
    } else if diff < 604_800 {
        format!("{} days ago", diff / 86_400)
    } else {
        at.format("%-m/%-d/%Y").to_string()
    }
}

pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{}...", head)
}

/// format_file_size
///
/// Binary units with at most two decimals: `10485760` → `"10 MB"`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut unit = 0;
    let mut scale: u64 = 1;
    while unit < UNITS.len() - 1 && bytes >= scale * 1024 {
        scale *= 1024;
        unit += 1;
    }
    let value = format!("{:.2}", bytes as f64 / scale as f64);
    let value = value.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", value, UNITS[unit])
}

pub fn category_label(category: &str) -> String {
    match category {
        "meme" => "Memes",
        "event" => "Events",
        "news" => "News",
        "question" => "Questions",
        "lost_found" => "Lost & Found",
        "academic" => "Academic",
        "social" => "Social",
        "sports" => "Sports",
        other => other,
    }
    .to_string()
}

pub fn role_label(role: Role) -> &'static str {
    match role {
        Role::Student => "Student",
        Role::Admin => "Administrator",
        Role::Alumni => "Alumni",
        Role::Moderator => "Moderator",
        Role::Unknown => "Unknown",
    }
}

pub fn role_color(role: Role) -> &'static str {
    match role {
        Role::Student => "#4a6fa5",
        Role::Admin => "#e74c3c",
        Role::Alumni => "#2ecc71",
        Role::Moderator => "#f39c12",
        Role::Unknown => "#6c757d",
    }
}

pub fn notification_icon(level: ToastLevel) -> &'static str {
    match level {
        ToastLevel::Success => "check-circle",
        ToastLevel::Error => "exclamation-circle",
        ToastLevel::Warning => "exclamation-triangle",
        ToastLevel::Info => "info-circle",
    }
}

pub fn file_type_icon(content_type: &str) -> &'static str {
    if content_type.contains("image") {
        "fa-image"
    } else if content_type.contains("video") {
        "fa-video"
    } else if content_type.contains("pdf") {
        "fa-file-pdf"
    } else if content_type.contains("word") || content_type.contains("document") {
        "fa-file-word"
    } else {
        "fa-file"
    }
}

/// Markup for a toast, for hosts that display notifications in the document.
pub fn render_toast(message: &str, level: ToastLevel) -> String {
    format!(
        r#"<div class="notification {}"><i class="fas fa-{}"></i><span>{}</span></div>"#,
        level.as_str(),
        notification_icon(level),
        escape_html(message)
    )
}
