use std::sync::Arc;

use crate::{
    clients::encode_segment,
    error::ClientResult,
    fetch::{ApiRequest, AuthenticatedFetch},
    models::{CategoryStats, Role, SystemStats, UpdateRoleRequest, UserRecord},
    ui::notify::ToastLevel,
};

/// StatusAction
///
/// The two account status transitions an admin can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAction {
    Activate,
    Deactivate,
}

impl StatusAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusAction::Activate => "activate",
            StatusAction::Deactivate => "deactivate",
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            StatusAction::Activate => "activated",
            StatusAction::Deactivate => "deactivated",
        }
    }
}

/// TotalEstimate
///
/// The users endpoint returns no total, so the client infers one from page fill.
/// A full page means "at least one more user exists", which is an approximation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TotalEstimate {
    #[default]
    Unknown,
    Exact(u64),
    Approximate(u64),
}

impl TotalEstimate {
    /// after_page
    ///
    /// A full page at `page` implies at least `page * page_size + 1` users; a short
    /// page pins the total exactly.
    pub fn after_page(page: u32, page_size: u32, returned: usize) -> Self {
        let page = u64::from(page.max(1));
        let page_size = u64::from(page_size);
        let returned = returned as u64;
        if page_size > 0 && returned == page_size {
            TotalEstimate::Approximate(page * page_size + 1)
        } else {
            TotalEstimate::Exact((page - 1) * page_size + returned)
        }
    }

    pub fn count(&self) -> u64 {
        match self {
            TotalEstimate::Unknown => 0,
            TotalEstimate::Exact(n) | TotalEstimate::Approximate(n) => *n,
        }
    }

    pub fn is_approximate(&self) -> bool {
        matches!(self, TotalEstimate::Approximate(_))
    }

    pub fn total_pages(&self, page_size: u32) -> u32 {
        if page_size == 0 {
            return 0;
        }
        let pages = self.count().div_ceil(u64::from(page_size));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }
}

/// UserPage
///
/// One page of the admin user table together with the inferred total.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserPage {
    pub users: Vec<UserRecord>,
    pub page: u32,
    pub total: TotalEstimate,
}

/// AdminClient
///
/// Console operations under `/api/admin`. All of them require an admin session
/// server-side; the client only gates the UI.
pub struct AdminClient {
    fetch: Arc<AuthenticatedFetch>,
    page_size: u32,
}

impl AdminClient {
    pub fn new(fetch: Arc<AuthenticatedFetch>, page_size: u32) -> Self {
        Self {
            fetch,
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub async fn system_stats(&self) -> ClientResult<SystemStats> {
        self.fetch
            .fetch_json(ApiRequest::get("/api/admin/stats"), "Failed to load system stats")
            .await
    }

    /// users
    ///
    /// Without a search term this pages through `/api/admin/users`. With one, the
    /// search endpoint is used; it takes no offset, so results are always page 1.
    pub async fn users(&self, page: u32, search: Option<&str>) -> ClientResult<UserPage> {
        let page = page.max(1);
        let search = search.map(str::trim).filter(|q| !q.is_empty());

        let (request, page) = match search {
            Some(query) => (
                ApiRequest::get("/api/admin/users/search")
                    .query("q", query)
                    .query("limit", self.page_size),
                1,
            ),
            None => (
                ApiRequest::get("/api/admin/users")
                    .query("limit", self.page_size)
                    .query("offset", (page - 1) * self.page_size),
                page,
            ),
        };

        let users: Vec<UserRecord> = self.fetch.fetch_list(request, "Failed to load users").await?;
        let total = TotalEstimate::after_page(page, self.page_size, users.len());
        Ok(UserPage { users, page, total })
    }

    pub async fn search_users(&self, query: &str) -> ClientResult<Vec<UserRecord>> {
        self.fetch
            .fetch_list(
                ApiRequest::get("/api/admin/users/search").query("q", query),
                "Failed to search users",
            )
            .await
    }

    pub async fn update_user_role(&self, user_id: &str, role: Role) -> ClientResult<bool> {
        self.fetch
            .expect_success(
                ApiRequest::put(format!("/api/admin/users/{}/role", encode_segment(user_id)))
                    .json(&UpdateRoleRequest { role })?,
                "Failed to update user role",
            )
            .await?;
        self.fetch
            .notifier()
            .notify("User role updated successfully", ToastLevel::Success);
        Ok(true)
    }

    pub async fn set_user_status(&self, user_id: &str, action: StatusAction) -> ClientResult<bool> {
        let fallback = format!("Failed to {} user", action.as_str());
        self.fetch
            .expect_success(
                ApiRequest::put(format!(
                    "/api/admin/users/{}/status/{}",
                    encode_segment(user_id),
                    action.as_str()
                )),
                &fallback,
            )
            .await?;
        self.fetch.notifier().notify(
            &format!("User {} successfully", action.past_tense()),
            ToastLevel::Success,
        );
        Ok(true)
    }

    pub async fn delete_user(&self, user_id: &str) -> ClientResult<bool> {
        self.fetch
            .expect_success(
                ApiRequest::delete(format!("/api/admin/users/{}", encode_segment(user_id))),
                "Failed to delete user",
            )
            .await?;
        self.fetch
            .notifier()
            .notify("User deleted successfully", ToastLevel::Success);
        Ok(true)
    }

    pub async fn category_stats(&self) -> ClientResult<CategoryStats> {
        self.fetch
            .fetch_json(
                ApiRequest::get("/api/posts/categories/stats"),
                "Failed to load category stats",
            )
            .await
    }
}
