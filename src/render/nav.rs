use crate::{
    models::UserRecord,
    render::{DEFAULT_AVATAR, escape_html, present, role_label},
    ui::actions::ActionKind,
};

/// render_auth_links
///
/// The header's account area: a dropdown for a signed-in user, login and register
/// links otherwise.
pub fn render_auth_links(user: Option<&UserRecord>) -> String {
    let Some(user) = user else {
        return r#"<a href="login.html" class="nav-link"><i class="fas fa-sign-in-alt"></i> Login</a>
<a href="register.html" class="nav-link"><i class="fas fa-user-plus"></i> Register</a>"#
            .to_string();
    };
    let name = escape_html(&user.display_name);
    format!(
        r##"<div class="nav-dropdown">
<button class="nav-dropbtn"><img src="{avatar}" alt="{name}" class="nav-avatar"> {name} <i class="fas fa-caret-down"></i></button>
<div class="nav-dropdown-content">
<a href="dashboard.html"><i class="fas fa-tachometer-alt"></i> Dashboard</a>
<a href="profile.html"><i class="fas fa-user-circle"></i> Profile</a>
<hr>
<a href="#" id="logout-btn" data-action="{logout}"><i class="fas fa-sign-out-alt"></i> Logout</a>
</div>
</div>"##,
        avatar = escape_html(present(&user.profile_image).unwrap_or(DEFAULT_AVATAR)),
        logout = ActionKind::Logout.as_str(),
    )
}

pub fn render_profile_sidebar(user: Option<&UserRecord>) -> String {
    let Some(user) = user else {
        return r#"<p>Please login to see your profile</p>
<a href="login.html" class="btn btn-small">Login</a>"#
            .to_string();
    };
    let name = escape_html(&user.display_name);
    format!(
        r#"<div class="sidebar-profile">
<img src="{avatar}" alt="{name}" class="profile-avatar">
<h4>{name}</h4>
<span class="user-role {role}">{role_label}</span>
<div class="profile-stats">
<div class="stat"><span class="stat-value">{posts}</span><span class="stat-label">Posts</span></div>
<div class="stat"><span class="stat-value">{likes}</span><span class="stat-label">Likes</span></div>
<div class="stat"><span class="stat-value">{comments}</span><span class="stat-label">Comments</span></div>
</div>
<a href="profile.html" class="btn btn-small btn-outline mt-2"><i class="fas fa-edit"></i> Edit Profile</a>
</div>"#,
        avatar = escape_html(present(&user.profile_image).unwrap_or(DEFAULT_AVATAR)),
        role = user.role.as_str(),
        role_label = role_label(user.role),
        posts = user.post_count,
        likes = user.like_count,
        comments = user.comment_count,
    )
}
