use std::sync::Arc;

use crate::{
    error::{ClientError, ClientResult},
    fetch::{ApiRequest, AuthenticatedFetch},
    models::{
        AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest, Role,
        UpdateProfileRequest, UserRecord,
    },
    session::SessionStore,
    ui::notify::Page,
};

/// Capability decisions for UI affordances.
///
/// These are advisory: they decide which buttons and links are shown. The backend
/// re-checks every request.
pub mod capability {
    use crate::models::Role;

    /// Permission
    ///
    /// The named capabilities the UI gates on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Permission {
        CreatePost,
        ManagePosts,
        ManageUsers,
        ViewAdmin,
    }

    impl Permission {
        /// Unknown names have no permission at all.
        pub fn parse(name: &str) -> Option<Self> {
            match name {
                "create_post" => Some(Permission::CreatePost),
                "manage_posts" => Some(Permission::ManagePosts),
                "manage_users" => Some(Permission::ManageUsers),
                "view_admin" => Some(Permission::ViewAdmin),
                _ => None,
            }
        }
    }

    /// allows
    ///
    /// Pure function of (role, is_active, permission name).
    pub fn allows(role: Role, is_active: bool, permission: &str) -> bool {
        match Permission::parse(permission) {
            Some(permission) => allows_permission(role, is_active, permission),
            None => false,
        }
    }

    pub fn allows_permission(role: Role, is_active: bool, permission: Permission) -> bool {
        if role == Role::Unknown {
            return false;
        }
        match permission {
            Permission::CreatePost => is_active,
            Permission::ManagePosts | Permission::ManageUsers => role.is_staff(),
            Permission::ViewAdmin => role == Role::Admin,
        }
    }
}

/// AuthClient
///
/// Login, registration, logout and profile calls, plus the capability checks
/// derived from the cached user. "Authenticated" is recomputed on every call as
/// token present AND user present.
pub struct AuthClient {
    fetch: Arc<AuthenticatedFetch>,
    session: Arc<SessionStore>,
}

impl AuthClient {
    pub fn new(fetch: Arc<AuthenticatedFetch>, session: Arc<SessionStore>) -> Self {
        Self { fetch, session }
    }

    /// login
    ///
    /// Stores token and user together on success. Any non-2xx answer (including a
    /// 401 for bad credentials) is a `LoginFailed` with the server's message.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<UserRecord> {
        let payload = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .fetch
            .send_public(ApiRequest::post("/api/auth/login").json(&payload)?)
            .await?;

        if !response.is_success() {
            let message = response.error_message("Login failed");
            tracing::info!(status = response.status, "Login rejected");
            return Err(ClientError::LoginFailed(message));
        }

        let auth: AuthResponse = response.json()?;
        self.session.establish(&auth.token, &auth.user)?;
        tracing::info!(user_id = %auth.user.id, role = auth.user.role.as_str(), "Logged in");
        Ok(auth.user)
    }

    /// register
    ///
    /// Same contract as `login`; failures are `RegistrationFailed`.
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<UserRecord> {
        let response = self
            .fetch
            .send_public(ApiRequest::post("/api/auth/register").json(request)?)
            .await?;

        if !response.is_success() {
            let message = response.error_message("Registration failed");
            return Err(ClientError::RegistrationFailed(message));
        }

        let auth: AuthResponse = response.json()?;
        self.session.establish(&auth.token, &auth.user)?;
        tracing::info!(user_id = %auth.user.id, "Registered");
        Ok(auth.user)
    }

    /// logout
    ///
    /// Tells the server on a best-effort basis, then always clears the local session
    /// and returns to the landing page. Nothing here can fail the caller.
    pub async fn logout(&self) {
        if let Err(e) = self.fetch.send(ApiRequest::post("/api/auth/logout")).await {
            tracing::debug!(error = %e, "Ignoring logout notification failure");
        }
        if let Err(e) = self.session.clear() {
            tracing::warn!(error = %e, "Session cleared in memory but not on disk");
        }
        self.fetch.navigator().redirect(Page::Landing);
    }

    /// Re-reads the current user from the server and refreshes the cached copy.
    pub async fn fetch_profile(&self) -> ClientResult<UserRecord> {
        let user: UserRecord = self
            .fetch
            .fetch_json(ApiRequest::get("/api/users/me"), "Failed to load profile")
            .await?;
        self.session.save(&user)?;
        Ok(user)
    }

    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> ClientResult<UserRecord> {
        let response = self
            .fetch
            .send(ApiRequest::put("/api/users/me").json(request)?)
            .await?;

        if !response.is_success() {
            return Err(response.into_error("Failed to update profile"));
        }

        let user: UserRecord = response.json()?;
        self.session.save(&user)?;
        Ok(user)
    }

    pub async fn change_password(&self, current: &str, new: &str) -> ClientResult<()> {
        let payload = ChangePasswordRequest {
            current_password: current.to_string(),
            new_password: new.to_string(),
        };
        self.fetch
            .expect_success(
                ApiRequest::put("/api/users/me/password").json(&payload)?,
                "Password change failed",
            )
            .await?;
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn current_user(&self) -> Option<UserRecord> {
        self.session.current_user()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.session
            .current_user()
            .is_some_and(|user| user.role == role)
    }

    /// can
    ///
    /// `false` without a cached user or for any permission name it does not know.
    pub fn can(&self, permission: &str) -> bool {
        match self.session.current_user() {
            Some(user) => capability::allows(user.role, user.is_active, permission),
            None => false,
        }
    }
}
