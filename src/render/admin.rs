use crate::{
    clients::TotalEstimate,
    models::{CategoryStats, Role, SystemStats, UserRecord},
    render::{DEFAULT_AVATAR, category_label, escape_html, present, role_color, role_label},
    ui::actions::ActionKind,
};

/// render_user_row
///
/// One row of the admin user table. The status toggle offers the opposite of the
/// account's current state.
pub fn render_user_row(user: &UserRecord) -> String {
    let id = escape_html(&user.id);
    let name = escape_html(&user.display_name);
    let (status_class, status_label) = if user.is_active {
        ("status-active", "Active")
    } else {
        ("status-inactive", "Inactive")
    };
    let toggle = if user.is_active {
        format!(
            r#"<button class="action-btn toggle-btn deactivate-btn" data-action="{}" data-user-id="{id}"><i class="fas fa-user-slash"></i></button>"#,
            ActionKind::DeactivateUser.as_str()
        )
    } else {
        format!(
            r#"<button class="action-btn toggle-btn activate-btn" data-action="{}" data-user-id="{id}"><i class="fas fa-user-check"></i></button>"#,
            ActionKind::ActivateUser.as_str()
        )
    };

    format!(
        r#"<tr data-user-id="{id}">
<td><div class="user-info"><img src="{avatar}" alt="{name}" class="user-avatar"><div><strong>{name}</strong><div class="user-email">{email}</div></div></div></td>
<td><span class="role-badge role-{role}">{role_label}</span></td>
<td><span class="status-badge {status_class}">{status_label}</span></td>
<td>{posts}</td>
<td><div class="table-actions">
<button class="action-btn edit-btn" data-action="{edit}" data-user-id="{id}"><i class="fas fa-edit"></i></button>
{toggle}
<button class="action-btn delete-btn" data-action="{delete}" data-user-id="{id}"><i class="fas fa-trash"></i></button>
</div></td>
</tr>"#,
        avatar = escape_html(present(&user.profile_image).unwrap_or(DEFAULT_AVATAR)),
        email = escape_html(&user.email),
        role = user.role.as_str(),
        role_label = role_label(user.role),
        posts = user.post_count,
        edit = ActionKind::ChangeRole.as_str(),
        delete = ActionKind::DeleteUser.as_str(),
    )
}

pub fn render_user_table(users: &[UserRecord]) -> String {
    if users.is_empty() {
        return r#"<tr><td colspan="5" class="text-center">No users found</td></tr>"#.to_string();
    }
    users.iter().map(render_user_row).collect::<Vec<_>>().join("\n")
}

/// Row shown when the user list could not be fetched.
pub fn render_user_table_error() -> String {
    r#"<tr><td colspan="5" class="text-center error">Failed to load users</td></tr>"#.to_string()
}

/// render_pagination
///
/// Windowed page buttons: first and last always, `current - 1 ..= current + 1`,
/// and a "..." marker at `current ± 2`. Nothing is rendered for a single page.
pub fn render_pagination(current: u32, total: TotalEstimate, page_size: u32) -> String {
    let total_pages = total.total_pages(page_size);
    if total_pages <= 1 {
        return String::new();
    }
    let current = current.clamp(1, total_pages);
    let action = ActionKind::ChangePage.as_str();

    let mut html = if total.is_approximate() {
        String::from(r#"<div class="pagination approximate">"#)
    } else {
        String::from(r#"<div class="pagination">"#)
    };

    if current > 1 {
        html.push_str(&format!(
            r#"<button class="page-btn" data-action="{action}" data-page="{}">«</button>"#,
            current - 1
        ));
    }

    for page in 1..=total_pages {
        let in_window = page + 1 >= current && page <= current + 1;
        if page == 1 || page == total_pages || in_window {
            let active = if page == current { " active" } else { "" };
            html.push_str(&format!(
                r#"<button class="page-btn{active}" data-action="{action}" data-page="{page}">{page}</button>"#
            ));
        } else if page + 2 == current || page == current + 2 {
            html.push_str(r#"<span class="page-dots">...</span>"#);
        }
    }

    if current < total_pages {
        html.push_str(&format!(
            r#"<button class="page-btn" data-action="{action}" data-page="{}">»</button>"#,
            current + 1
        ));
    }

    if total.is_approximate() {
        html.push_str(&format!(
            r#"<span class="page-estimate" title="Total is estimated">~{} users</span>"#,
            total.count()
        ));
    }

    html.push_str("</div>");
    html
}

/// render_search_summary
///
/// Search results come back as a single page, so instead of page buttons the
/// footer only notes when the result limit was hit.
pub fn render_search_summary(shown: usize, total: TotalEstimate) -> String {
    if !total.is_approximate() {
        return String::new();
    }
    format!(
        r#"<div class="pagination approximate"><span class="page-estimate" title="Refine the search to narrow results">First {} matches</span></div>"#,
        shown
    )
}

fn chart_bar(label: &str, count: u64, max: u64, color: Option<&str>) -> String {
    let percentage = if max == 0 { 0 } else { count * 100 / max };
    let background = color
        .map(|c| format!("; background-color: {}", c))
        .unwrap_or_default();
    format!(
        r#"<div class="chart-bar"><div class="chart-label">{}</div><div class="chart-value"><div class="chart-fill" style="width: {}%{}"></div></div><div class="chart-count">{}</div></div>"#,
        escape_html(label),
        percentage,
        background,
        count
    )
}

/// Bars are scaled against the largest category.
pub fn render_category_chart(stats: &CategoryStats) -> String {
    if stats.categories.is_empty() {
        return "<p>No category data available</p>".to_string();
    }
    let max = stats.categories.values().copied().max().unwrap_or(0);
    stats
        .categories
        .iter()
        .map(|(category, count)| chart_bar(&category_label(category), *count, max, None))
        .collect()
}

/// render_role_chart
///
/// Counts the given users per known role; roles with no users are omitted.
pub fn render_role_chart(users: &[UserRecord]) -> String {
    let counts: Vec<(Role, u64)> = Role::ALL
        .iter()
        .map(|role| {
            let count = users.iter().filter(|user| user.role == *role).count() as u64;
            (*role, count)
        })
        .filter(|(_, count)| *count > 0)
        .collect();
    let max = counts.iter().map(|(_, count)| *count).max().unwrap_or(0);
    counts
        .into_iter()
        .map(|(role, count)| chart_bar(role_label(role), count, max, Some(role_color(role))))
        .collect()
}

pub fn render_stats(stats: &SystemStats) -> String {
    let card = |id: &str, icon: &str, label: &str, value: u64| {
        format!(
            r#"<div class="stat-card"><i class="fas fa-{icon}"></i><div class="stat-info"><h3 id="{id}">{value}</h3><p>{label}</p></div></div>"#
        )
    };
    [
        card("total-users", "users", "Total Users", stats.total_users),
        card("total-posts", "newspaper", "Total Posts", stats.total_posts),
        card("total-comments", "comments", "Total Comments", stats.total_comments),
        card("total-likes", "heart", "Total Likes", stats.total_likes),
    ]
    .join("\n")
}
