use std::sync::{Arc, Mutex, PoisonError};

use crate::{
    AppContext,
    clients::{StatusAction, TotalEstimate, UserPage},
    controllers::report,
    error::ClientResult,
    models::Role,
    render::admin::{
        render_category_chart, render_pagination, render_role_chart, render_search_summary,
        render_stats, render_user_table, render_user_table_error,
    },
    ui::{
        actions::{ActionKind, Dispatcher, UiAction},
        debounce::Debouncer,
        notify::{Page, ToastLevel},
    },
};

pub const ADMIN_STATS: &str = "admin-stats";
pub const USERS_LIST: &str = "users-list";
pub const USERS_PAGINATION: &str = "users-pagination";
pub const CATEGORY_CHART: &str = "category-chart";
pub const ROLE_CHART: &str = "role-chart";

#[derive(Debug, Clone, Default)]
struct TableState {
    page: u32,
    search: String,
    total: TotalEstimate,
}

/// AdminController
///
/// The admin console. Everything is behind `view_admin`; the table keeps its
/// current page and search term between reloads.
pub struct AdminController {
    ctx: AppContext,
    table: Mutex<TableState>,
    debouncer: Debouncer,
}

impl AdminController {
    pub fn new(ctx: AppContext) -> Self {
        Self::with_debouncer(ctx, Debouncer::default())
    }

    pub fn with_debouncer(ctx: AppContext, debouncer: Debouncer) -> Self {
        Self {
            ctx,
            table: Mutex::new(TableState {
                page: 1,
                ..TableState::default()
            }),
            debouncer,
        }
    }

    pub fn current_page(&self) -> u32 {
        self.table.lock().unwrap_or_else(PoisonError::into_inner).page
    }

    pub fn search_term(&self) -> String {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .search
            .clone()
    }

    pub fn total(&self) -> TotalEstimate {
        self.table.lock().unwrap_or_else(PoisonError::into_inner).total
    }

    /// Non-admins are turned away to the landing page.
    pub fn guard(&self) -> bool {
        let auth = &self.ctx.auth;
        if auth.is_authenticated() && auth.can("view_admin") {
            return true;
        }
        self.ctx
            .notifier
            .notify("Access denied. Admin privileges required.", ToastLevel::Error);
        self.ctx.navigator.redirect(Page::Landing);
        false
    }

    /// open
    ///
    /// Guard, then stats, the user table and the category chart. Any failure
    /// leaves whatever already rendered and shows one toast.
    pub async fn open(&self) -> bool {
        if !self.guard() {
            return false;
        }
        match self.load_dashboard().await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load admin data");
                if !e.is_fatal() {
                    self.ctx
                        .notifier
                        .notify("Failed to load admin data", ToastLevel::Error);
                }
                false
            }
        }
    }

    async fn load_dashboard(&self) -> ClientResult<()> {
        // 1. Headline numbers
        let stats = self.ctx.admin.system_stats().await?;
        self.ctx.document.set_html(ADMIN_STATS, render_stats(&stats));

        // 2. User table (handles its own errors)
        self.load_users().await;

        // 3. Posts per category
        let categories = self.ctx.admin.category_stats().await?;
        self.ctx
            .document
            .set_html(CATEGORY_CHART, render_category_chart(&categories));
        Ok(())
    }

    /// load_users
    ///
    /// Fetches the current page (or search results) and rewrites the table,
    /// pagination and role chart.
    pub async fn load_users(&self) -> bool {
        let (page, search) = {
            let table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
            (table.page, table.search.clone())
        };
        let search = Some(search.as_str()).filter(|q| !q.is_empty());

        match self.ctx.admin.users(page, search).await {
            Ok(result) => {
                self.show_users(&result, search.is_some());
                true
            }
            Err(e) => {
                report(self.ctx.notifier.as_ref(), &e, "load users");
                self.ctx
                    .document
                    .set_html(USERS_LIST, render_user_table_error());
                false
            }
        }
    }

    fn show_users(&self, result: &UserPage, searching: bool) {
        {
            let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
            table.page = result.page;
            table.total = result.total;
        }
        let document = &self.ctx.document;
        document.set_html(USERS_LIST, render_user_table(&result.users));
        let pagination = if result.users.is_empty() {
            String::new()
        } else if searching {
            render_search_summary(result.users.len(), result.total)
        } else {
            render_pagination(result.page, result.total, self.ctx.admin.page_size())
        };
        document.set_html(USERS_PAGINATION, pagination);
        document.set_html(ROLE_CHART, render_role_chart(&result.users));
    }

    pub async fn change_page(&self, page: u32) -> bool {
        self.table.lock().unwrap_or_else(PoisonError::into_inner).page = page.max(1);
        self.load_users().await
    }

    /// search
    ///
    /// Debounced: only the last call within the delay reaches the server. Returns
    /// `false` for superseded calls.
    pub async fn search(&self, query: &str) -> bool {
        let query = query.trim().to_string();
        self.debouncer
            .call(|| async move {
                {
                    let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
                    table.search = query;
                    table.page = 1;
                }
                self.load_users().await
            })
            .await
            .is_some()
    }

    // --- User actions (each reloads the table) ---

    pub async fn set_status(&self, user_id: &str, action: StatusAction) -> bool {
        let result = self.ctx.admin.set_user_status(user_id, action).await;
        self.after_action(result, action.as_str()).await
    }

    pub async fn change_role(&self, user_id: &str, role: Role) -> bool {
        let result = self.ctx.admin.update_user_role(user_id, role).await;
        self.after_action(result, "update role").await
    }

    pub async fn delete_user(&self, user_id: &str) -> bool {
        let result = self.ctx.admin.delete_user(user_id).await;
        self.after_action(result, "delete user").await
    }

    async fn after_action(&self, result: ClientResult<bool>, context: &str) -> bool {
        match result {
            Ok(_) => {
                self.load_users().await;
                true
            }
            Err(e) => {
                report(self.ctx.notifier.as_ref(), &e, context);
                false
            }
        }
    }

    pub async fn handle(&self, action: UiAction) {
        match action {
            UiAction::ActivateUser { user_id } => {
                self.set_status(&user_id, StatusAction::Activate).await;
            }
            UiAction::DeactivateUser { user_id } => {
                self.set_status(&user_id, StatusAction::Deactivate).await;
            }
            UiAction::DeleteUser { user_id } => {
                self.delete_user(&user_id).await;
            }
            UiAction::ChangeRole { user_id, role } => {
                self.change_role(&user_id, role).await;
            }
            UiAction::ChangePage { page } => {
                self.change_page(page).await;
            }
            UiAction::SearchUsers { query } => {
                self.search(&query).await;
            }
            other => tracing::debug!(action = other.kind().as_str(), "Not an admin action"),
        }
    }

    pub fn dispatcher(self: &Arc<Self>) -> Dispatcher {
        let mut dispatcher = Dispatcher::new();
        for kind in [
            ActionKind::ActivateUser,
            ActionKind::DeactivateUser,
            ActionKind::DeleteUser,
            ActionKind::ChangeRole,
            ActionKind::ChangePage,
            ActionKind::SearchUsers,
        ] {
            let this = self.clone();
            dispatcher.register(kind, move |action| {
                let this = this.clone();
                async move { this.handle(action).await }
            });
        }
        dispatcher
    }
}
