use std::sync::Arc;

// --- Module Structure ---

// Leaves: persisted session, the authorized-call chokepoint, and the error taxonomy.
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod session;

// Auth calls and capability decisions derived from the cached user.
pub mod auth;

// One client per backend resource.
pub mod clients;

// Pure markup, and the pages that drive fetch -> render -> document.
pub mod controllers;
pub mod render;
pub mod ui;

// --- Public Re-exports ---

pub use auth::AuthClient;
pub use clients::{AdminClient, CommentsClient, MediaClient, PostsClient};
pub use config::{AppConfig, Env};
pub use error::{ClientError, ClientResult};
pub use fetch::{AuthenticatedFetch, MockTransport, ReqwestTransport, Transport};
pub use session::{FileStore, KeyValueStore, MemoryStore, SessionStore};
pub use ui::{
    document::Document,
    notify::{Navigator, Notifier},
};

/// AppContext
///
/// The composed application: configuration, session, the authenticated fetch and
/// every resource client, built once and handed to each page controller. Nothing
/// in the crate reaches for a global instance.
#[derive(Clone)]
pub struct AppContext {
    /// Loaded, immutable configuration.
    pub config: AppConfig,
    /// Token + last-known user. Mutated by the auth client and by 401 handling only.
    pub session: Arc<SessionStore>,
    pub fetch: Arc<AuthenticatedFetch>,
    pub auth: Arc<AuthClient>,
    pub posts: Arc<PostsClient>,
    pub comments: Arc<CommentsClient>,
    pub media: Arc<MediaClient>,
    pub admin: Arc<AdminClient>,
    /// Where controllers write their markup.
    pub document: Arc<Document>,
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
}

impl AppContext {
    /// new
    ///
    /// Wires every component over the given transport and key-value backend. The
    /// session is loaded from the backend immediately.
    pub fn new(
        config: AppConfig,
        transport: Arc<dyn Transport>,
        store: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self::with_session(
            config,
            transport,
            Arc::new(SessionStore::new(store)),
            notifier,
            navigator,
        )
    }

    pub fn with_session(
        config: AppConfig,
        transport: Arc<dyn Transport>,
        session: Arc<SessionStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        // 1. The chokepoint every resource client goes through.
        let fetch = Arc::new(AuthenticatedFetch::new(
            transport,
            session.clone(),
            notifier.clone(),
            navigator.clone(),
        ));

        // 2. Resource clients share the one fetch (and through it, the session).
        let auth = Arc::new(AuthClient::new(fetch.clone(), session.clone()));
        let posts = Arc::new(PostsClient::new(fetch.clone()));
        let comments = Arc::new(CommentsClient::new(fetch.clone()));
        let media = Arc::new(MediaClient::new(fetch.clone()));
        let admin = Arc::new(AdminClient::new(fetch.clone(), config.admin_page_size));

        Self {
            config,
            session,
            fetch,
            auth,
            posts,
            comments,
            media,
            admin,
            document: Arc::new(Document::new()),
            notifier,
            navigator,
        }
    }

    /// The production wiring: reqwest against the configured backend and a
    /// file-backed session.
    pub fn from_config(
        config: AppConfig,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let transport = Arc::new(ReqwestTransport::new(&config.api_base));
        let store = Arc::new(FileStore::new(config.session_file.clone()));
        Self::new(config, transport, store, notifier, navigator)
    }
}
