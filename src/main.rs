use std::{
    io::{self, BufRead},
    process,
    sync::Arc,
};

use pulseboard::{
    application::{
        access::AccessControl,
        admin_stats::AdminStatsService,
        clock::{Clock, SystemClock},
        credentials::CredentialStore,
        error::AppError,
        goal::GoalService,
        posts::PostService,
        repos::{PostsRepo, PostsWriteRepo, UsersRepo, UsersWriteRepo},
        users::UserService,
    },
    config::{self, ImageProvider},
    infra::{
        credentials::Argon2CredentialStore,
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState, HttpState, RouterState},
        images::{self, ImageHosts},
        memory::InMemoryRepositories,
        telemetry,
    },
};
use tokio::signal;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
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

    match cli_args.command {
        Some(config::Command::HashPassword) => run_hash_password(),
        Some(config::Command::Serve(_)) | None => {
            telemetry::init(&settings.logging)?;
            run_serve(settings).await
        }
    }
}

fn run_hash_password() -> Result<(), AppError> {
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(InfraError::from)?;
    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err(AppError::Input("password must not be empty"));
    }

    let hash = Argon2CredentialStore::new().hash(password)?;
    println!("{hash}");
    Ok(())
}

struct Repositories {
    users: Arc<dyn UsersRepo>,
    users_write: Arc<dyn UsersWriteRepo>,
    posts: Arc<dyn PostsRepo>,
    posts_write: Arc<dyn PostsWriteRepo>,
    postgres: Option<Arc<PostgresRepositories>>,
}

async fn init_repositories(settings: &config::Settings) -> Result<Repositories, AppError> {
    let Some(database_url) = settings.database.url.as_deref() else {
        warn!(
            target = "pulseboard::bootstrap",
            "database url is not configured; records are kept in memory and lost on exit"
        );
        let memory = Arc::new(InMemoryRepositories::new());
        return Ok(Repositories {
            users: memory.clone(),
            users_write: memory.clone(),
            posts: memory.clone(),
            posts_write: memory,
            postgres: None,
        });
    };

    let postgres = Arc::new(PostgresRepositories::open(database_url, &settings.database).await?);
    Ok(Repositories {
        users: postgres.clone(),
        users_write: postgres.clone(),
        posts: postgres.clone(),
        posts_write: postgres.clone(),
        postgres: Some(postgres),
    })
}

fn init_image_hosts(settings: &config::Settings) -> Result<ImageHosts, AppError> {
    if matches!(settings.images.provider, ImageProvider::Unconfigured) {
        warn!(
            target = "pulseboard::bootstrap",
            placeholder = %settings.images.placeholder_url,
            "image hosting is not configured; uploads resolve to the placeholder image"
        );
    }

    Ok(images::from_settings(&settings.images)?)
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let image_hosts = init_image_hosts(&settings)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let credentials: Arc<dyn CredentialStore> = Arc::new(Argon2CredentialStore::new());
    let access = AccessControl::new(repositories.users.clone());
    let max_image_bytes = settings.images.max_bytes.get();

    let api_state = ApiState {
        goal: Arc::new(GoalService::new(settings.goal.clone(), clock.clone())),
        posts: Arc::new(PostService::new(
            repositories.posts.clone(),
            repositories.posts_write.clone(),
            access.clone(),
            image_hosts.host,
            clock.clone(),
            max_image_bytes,
        )),
        users: Arc::new(UserService::new(
            repositories.users.clone(),
            repositories.users_write.clone(),
            access.clone(),
            credentials,
            clock.clone(),
        )),
        admin_stats: Arc::new(AdminStatsService::new(
            repositories.users.clone(),
            repositories.posts.clone(),
            access,
            clock,
            settings.goal.timezone,
        )),
    };
    let http_state = HttpState {
        db: repositories.postgres.clone(),
        local_images: image_hosts.local,
    };

    let router = http::build_router(
        RouterState {
            http: http_state,
            api: api_state,
        },
        max_image_bytes,
    );

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(InfraError::from)?;

    info!(
        target = "pulseboard::bootstrap",
        addr = %settings.server.addr,
        timezone = %settings.goal.timezone,
        "Serving HTTP"
    );

    let grace = settings.server.graceful_shutdown;
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal());

    server.await.map_err(InfraError::from)?;

    if let Some(postgres) = repositories.postgres
        && tokio::time::timeout(grace, postgres.pool().close())
            .await
            .is_err()
    {
        warn!(
            target = "pulseboard::bootstrap",
            seconds = grace.as_secs(),
            "database pool did not close within the grace period"
        );
    }

    info!(target = "pulseboard::bootstrap", "Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(target = "pulseboard::bootstrap", error = %err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(target = "pulseboard::bootstrap", error = %err, "failed to listen for SIGTERM");
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!(target = "pulseboard::bootstrap", "Shutdown signal received");
}
