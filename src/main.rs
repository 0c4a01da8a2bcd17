use std::{path::PathBuf, process::ExitCode, sync::Arc};

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use unisocial_client::{
    AppConfig, AppContext, ClientError, Env,
    clients::{
        UploadFile,
        posts::{DEFAULT_PINNED_LIMIT, DEFAULT_POPULAR_DAYS},
    },
    controllers::{
        AdminController, FeedController, NavController, PostDetailController, UploadWidget, admin,
        feed, nav, post_detail,
    },
    models::{Post, RegisterRequest},
    render::{Viewer, posts::render_post_list},
    ui::{
        actions::UiAction,
        notify::{TracingNavigator, TracingNotifier},
    },
};

/// Command-line front end for the campus social backend. Each command runs one
/// page controller and prints the markup it produced.
#[derive(Parser, Debug)]
#[command(name = "unisocial", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and persist the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and sign in.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        display_name: String,
    },
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Render the feed.
    Feed {
        #[arg(long)]
        category: Option<String>,
    },
    /// Search posts by text.
    Search {
        query: String,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Render pinned, featured and popular posts.
    Highlights,
    /// Render a post's comment thread.
    Post { id: String },
    Like { id: String },
    Unlike { id: String },
    /// Render a page of the admin user table.
    AdminUsers {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        search: Option<String>,
    },
    /// Upload media files.
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

/// main
///
/// Loads configuration, installs logging, wires the `AppContext` and runs the
/// requested command.
#[tokio::main]
async fn main() -> ExitCode {
    // 1. Configuration & Environment Loading (Fail-Fast)
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // 2. Logging Filter Setup
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "unisocial_client=debug,reqwest=info".into());

    // 3. Initialize Logging based on Environment
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
    }

    tracing::debug!(env = ?config.env, api_base = %config.api_base, "Client starting");

    // 4. Application context over reqwest + the session file
    let ctx = AppContext::from_config(
        config,
        Arc::new(TracingNotifier),
        Arc::new(TracingNavigator),
    );

    match run(ctx, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(ctx: AppContext, command: Command) -> Result<(), ClientError> {
    match command {
        Command::Login { email, password } => {
            let user = ctx.auth.login(&email, &password).await?;
            println!("Logged in as {} ({})", user.display_name, user.role.as_str());
        }
        Command::Register {
            email,
            password,
            display_name,
        } => {
            let request = RegisterRequest {
                email,
                password,
                display_name,
            };
            let user = ctx.auth.register(&request).await?;
            println!("Registered {} ({})", user.display_name, user.email);
        }
        Command::Logout => {
            let nav = NavController::new(ctx.clone());
            nav.logout().await;
            println!("Logged out");
        }
        Command::Whoami => {
            let nav = NavController::new(ctx.clone());
            nav.render();
            print_region(&ctx, nav::PROFILE_SIDEBAR);
        }
        Command::Feed { category } => {
            let feed = FeedController::new(ctx.clone()).with_category(category);
            feed.load().await;
            print_region(&ctx, feed::POSTS_CONTAINER);
        }
        Command::Search { query, limit } => {
            let posts = ctx.posts.search_posts(&query, limit).await?;
            print_posts(&ctx, &posts);
        }
        Command::Highlights => {
            let pinned = ctx.posts.pinned_posts(DEFAULT_PINNED_LIMIT).await?;
            let featured = ctx.posts.featured_posts(DEFAULT_PINNED_LIMIT).await?;
            let popular = ctx
                .posts
                .popular_posts(DEFAULT_PINNED_LIMIT, DEFAULT_POPULAR_DAYS)
                .await?;
            for (heading, posts) in [("Pinned", pinned), ("Featured", featured), ("Popular", popular)] {
                println!("<h2>{}</h2>", heading);
                print_posts(&ctx, &posts);
            }
        }
        Command::Post { id } => {
            let detail = PostDetailController::new(ctx.clone(), id);
            detail.load().await;
            print_region(&ctx, post_detail::COMMENTS_LIST);
            print_region(&ctx, post_detail::COMMENT_COUNT);
        }
        Command::Like { id } => dispatch_feed(&ctx, UiAction::LikePost { post_id: id }).await,
        Command::Unlike { id } => dispatch_feed(&ctx, UiAction::UnlikePost { post_id: id }).await,
        Command::AdminUsers { page, search } => {
            let console = AdminController::new(ctx.clone());
            if !console.guard() {
                return Err(ClientError::PermissionDenied);
            }
            match search {
                Some(query) => console.search(&query).await,
                None => console.change_page(page).await,
            };
            print_region(&ctx, admin::USERS_LIST);
            print_region(&ctx, admin::USERS_PAGINATION);
        }
        Command::Upload { files } => {
            let widget = UploadWidget::new(ctx.clone());
            let mut selected = Vec::with_capacity(files.len());
            for path in &files {
                selected.push(UploadFile::from_path(path).await?);
            }
            widget.select(selected);
            for media in widget.upload().await? {
                println!("{}", media.url);
            }
        }
    }
    Ok(())
}

async fn dispatch_feed(ctx: &AppContext, action: UiAction) {
    let feed = Arc::new(FeedController::new(ctx.clone()));
    feed.dispatcher().dispatch(action).await;
}

fn print_region(ctx: &AppContext, region: &str) {
    if let Some(html) = ctx.document.html(region) {
        println!("{}", html);
    }
}

fn print_posts(ctx: &AppContext, posts: &[Post]) {
    let user = ctx.auth.current_user();
    let viewer = Viewer::from_user(user.as_ref());
    println!("{}", render_post_list(posts, &viewer, chrono::Utc::now()));
}
