use std::sync::Arc;

use crate::{
    AppContext,
    render::nav::{render_auth_links, render_profile_sidebar},
    ui::actions::{ActionKind, Dispatcher, UiAction},
};

pub const AUTH_LINKS: &str = "auth-links";
pub const PROFILE_SIDEBAR: &str = "user-profile-sidebar";
pub const CREATE_POST_BUTTON: &str = "create-post-btn";
pub const ADMIN_LINK: &str = "admin-link";

/// NavController
///
/// The header shared by every page: account links, the profile sidebar, and the
/// affordances gated on capabilities.
pub struct NavController {
    ctx: AppContext,
}

impl NavController {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    /// render
    ///
    /// Re-derives everything from the session. The create-post button needs
    /// `create_post`, the admin link needs `view_admin`.
    pub fn render(&self) {
        let auth = &self.ctx.auth;
        let user = auth.current_user().filter(|_| auth.is_authenticated());
        let document = &self.ctx.document;

        document.set_html(AUTH_LINKS, render_auth_links(user.as_ref()));
        document.set_html(PROFILE_SIDEBAR, render_profile_sidebar(user.as_ref()));
        document.set_visible(CREATE_POST_BUTTON, auth.can("create_post"));
        document.set_visible(ADMIN_LINK, auth.can("view_admin"));
    }

    pub async fn logout(&self) {
        self.ctx.auth.logout().await;
        self.render();
    }

    pub fn dispatcher(self: &Arc<Self>) -> Dispatcher {
        let mut dispatcher = Dispatcher::new();
        let this = self.clone();
        dispatcher.register(ActionKind::Logout, move |action| {
            let this = this.clone();
            async move {
                if action == UiAction::Logout {
                    this.logout().await;
                }
            }
        });
        dispatcher
    }
}
