use std::sync::{Mutex, PoisonError};

/// ToastLevel
///
/// Severity of a transient notification; drives the icon and styling class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl ToastLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastLevel::Info => "info",
            ToastLevel::Success => "success",
            ToastLevel::Warning => "warning",
            ToastLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
}

/// Notifier
///
/// Sink for transient user-visible notifications. Only the latest one matters to
/// the user; implementations may drop older ones.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, level: ToastLevel);
}

/// Page
///
/// Navigation targets the client can redirect to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Landing,
    Login,
    Register,
    Dashboard,
    Profile,
    Admin,
    PostDetail(String),
}

impl Page {
    pub fn path(&self) -> String {
        match self {
            Page::Landing => "/index.html".to_string(),
            Page::Login => "/login.html".to_string(),
            Page::Register => "/register.html".to_string(),
            Page::Dashboard => "/dashboard.html".to_string(),
            Page::Profile => "/profile.html".to_string(),
            Page::Admin => "/admin.html".to_string(),
            Page::PostDetail(id) => format!("/post-detail.html?id={}", id),
        }
    }
}

/// Navigator
///
/// Performs redirects. The last redirect issued within one action wins.
pub trait Navigator: Send + Sync {
    fn redirect(&self, page: Page);
}

// --- Tracing-backed implementations (CLI) ---

/// TracingNotifier
///
/// Routes toasts into the log stream at a level matching their severity.
#[derive(Debug, Default, Clone)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str, level: ToastLevel) {
        match level {
            ToastLevel::Error => tracing::error!(toast = %message),
            ToastLevel::Warning => tracing::warn!(toast = %message),
            ToastLevel::Info | ToastLevel::Success => tracing::info!(toast = %message, level = level.as_str()),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn redirect(&self, page: Page) {
        tracing::info!(target_page = %page.path(), "Redirect");
    }
}

// --- Recording implementations (tests, embedding hosts) ---

/// RecordingNotifier
///
/// Keeps every toast so a host (or a test) can inspect what the user was shown.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn last(&self) -> Option<Toast> {
        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, level: ToastLevel) {
        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Toast {
                message: message.to_string(),
                level,
            });
    }
}

#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<Page>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visited(&self) -> Vec<Page> {
        self.visited.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn current(&self) -> Option<Page> {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, page: Page) {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(page);
    }
}
