use std::{process, sync::Arc};

use piazza::{
    application::{
        error::AppError,
        feed::FeedService,
        follows::FollowService,
        pagination::Pager,
        posts::PostService,
        repos::{
            CommentsRepo, FollowsRepo, GroupsRepo, HealthRepo, PostsRepo, PostsWriteRepo, UsersRepo,
        },
    },
    cache::{CacheState, ResponseCache},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, RouterState},
        identity::HttpIdentityProvider,
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let (state, cache) = build_router_state(repositories, &settings)?;
    let router = http::build_router(state, cache);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(InfraError::from)?;
    info!(
        target = "piazza::server",
        addr = %settings.server.addr,
        "listening"
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
    });

    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
    }
    info!(
        target = "piazza::server",
        timeout_secs = settings.server.graceful_shutdown.as_secs(),
        "shutdown signal received, draining connections"
    );
    let _ = shutdown_tx.send(());

    match tokio::time::timeout(settings.server.graceful_shutdown, server).await {
        Ok(joined) => {
            let result = joined
                .map_err(|err| InfraError::configuration(format!("server task failed: {err}")))?;
            result.map_err(InfraError::from)?;
        }
        Err(_) => {
            error!(
                target = "piazza::server",
                "graceful shutdown timed out, aborting open connections"
            );
        }
    }

    Ok(())
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    // init_repositories applies pending migrations on connect
    init_repositories(&settings).await?;
    info!(target = "piazza::migrate", "database schema is up to date");
    Ok(())
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))?;

    let pool =
        PostgresRepositories::connect(database_url, settings.database.max_connections.get())
            .await?;
    PostgresRepositories::run_migrations(&pool).await?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_router_state(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> Result<(RouterState, CacheState), AppError> {
    let users_repo: Arc<dyn UsersRepo> = repositories.clone();
    let groups_repo: Arc<dyn GroupsRepo> = repositories.clone();
    let posts_repo: Arc<dyn PostsRepo> = repositories.clone();
    let posts_write_repo: Arc<dyn PostsWriteRepo> = repositories.clone();
    let comments_repo: Arc<dyn CommentsRepo> = repositories.clone();
    let follows_repo: Arc<dyn FollowsRepo> = repositories.clone();
    let health_repo: Arc<dyn HealthRepo> = repositories.clone();

    let pager = Pager::new(settings.feed.page_size.get());

    let feed = Arc::new(FeedService::new(
        posts_repo.clone(),
        users_repo.clone(),
        groups_repo.clone(),
        follows_repo.clone(),
        pager,
    ));
    let posts = Arc::new(PostService::new(
        posts_repo,
        posts_write_repo,
        groups_repo,
        comments_repo,
    ));
    let follows = Arc::new(FollowService::new(users_repo, follows_repo));

    let identity = Arc::new(HttpIdentityProvider::new(&settings.identity)?);

    let state = RouterState {
        feed,
        posts,
        follows,
        identity,
        health: health_repo,
        login_url: settings.identity.login_url.clone(),
    };

    let cache_config = settings.cache.to_cache_config();
    let cache = CacheState {
        cache: Arc::new(ResponseCache::new(&cache_config)),
        enabled: cache_config.enabled,
    };

    Ok((state, cache))
}
