use std::{io, sync::OnceLock, time};

use application::{args::Command, config, Args, Config};
use axum::extract::MatchedPath;
use axum_client_ip::InsecureClientIp;
use service::{
    command::{self, Command as _},
    domain::session,
    infra::{postgres, Postgres},
    Service,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
};

const STDERR_LEVELS: &[log::Level] = &[log::Level::WARN, log::Level::ERROR];

static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

postgres::embed_migrations!("../migrations");

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stdout)
                .with_filter(filter_fn(|meta| {
                    meta.is_span()
                        || (!STDERR_LEVELS.contains(meta.level()))
                            && LOG_LEVEL
                                .get()
                                .copied()
                                .unwrap_or(log::Level::INFO)
                                >= *meta.level()
                })),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stderr)
                .with_filter(filter_fn(|meta| {
                    meta.is_span()
                        || (STDERR_LEVELS.contains(meta.level()))
                            && LOG_LEVEL
                                .get()
                                .copied()
                                .unwrap_or(log::Level::INFO)
                                >= *meta.level()
                })),
        )
        .init();

    _ = start().await;
}

async fn start() -> Result<(), ()> {
    let Args { config, command } = Args::parse().map_err(|e| {
        log::error!("failed to parse command line arguments: {e}");
    })?;

    let Config {
        postgres,
        service,
        server,
        log,
    } = Config::new(config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
    })?;

    LOG_LEVEL
        .set(log.level.into())
        .unwrap_or_else(|_| unreachable!("first initialization"));

    let mut postgres = Postgres::new(&postgres.into()).map_err(|e| {
        log::error!("failed to initialize `Postgres` client: {e}");
    })?;

    match command.unwrap_or(Command::Serve) {
        Command::Serve => {
            migrations::runner()
                .run_async(&mut postgres)
                .await
                .map_err(|e| {
                    log::error!("failed to run database migrations: {e}");
                })?;

            serve(Service::new(service.into(), postgres), server).await
        }
        Command::IssueToken { subject } => {
            issue_token(&Service::new(service.into(), postgres), subject).await
        }
    }
}

/// Issues a new bearer token to the provided `subject` and prints it to
/// `stdout`.
async fn issue_token(
    service: &application::Service,
    subject: String,
) -> Result<(), ()> {
    let subject = session::Subject::new(subject).ok_or_else(|| {
        log::error!("subject must not be blank");
    })?;

    let command::create_session::Output { token, expires_at } = service
        .execute(command::CreateSession { subject })
        .await
        .map_err(|e| log::error!("failed to issue token: {e}"))?;

    log::info!("issued token expires at {}", expires_at.to_rfc3339());
    println!("{token}");

    Ok(())
}

/// Serves the HTTP API until the server fails.
async fn serve(
    service: application::Service,
    server: config::Server,
) -> Result<(), ()> {
    let allow_origin = server.cors.allow_origin().map_err(|e| {
        log::error!(
            "`{:?}` are not correct CORS origins: {e}",
            server.cors.origins,
        );
    })?;
    let cors = CorsLayer::new()
        .allow_methods([
            http::Method::DELETE,
            http::Method::GET,
            http::Method::OPTIONS,
            http::Method::PATCH,
            http::Method::POST,
        ])
        .allow_headers([
            http::header::AUTHORIZATION,
            http::header::CONTENT_TYPE,
        ])
        .allow_origin(allow_origin);

    let app = application::router(service).layer(cors).layer(
        TraceLayer::new_for_http()
            .make_span_with(|r: &http::Request<_>| {
                tracing::info_span!(
                    "HTTP request",
                    http.client_ip = InsecureClientIp::from(
                        r.headers(),
                        r.extensions()
                    )
                        .map(|ip| ip.0.to_string())
                        .ok(),
                    http.flavor = ?r.version(),
                    http.host = r.uri().host(),
                    http.method = r.method().as_str(),
                    http.route = r
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str),
                    http.scheme = r
                        .uri()
                        .scheme()
                        .map(http::uri::Scheme::as_str),
                    http.target = r
                        .uri()
                        .path_and_query()
                        .map(http::uri::PathAndQuery::as_str),
                    http.user_agent = r
                        .headers()
                        .get("User-Agent")
                        .and_then(|h| h.to_str().ok()),
                    http.status_code = tracing::field::Empty,
                )
            })
            .on_response(
                |r: &http::Response<_>,
                 dur: time::Duration,
                 span: &tracing::Span| {
                    span.record(
                        "http.status_code",
                        tracing::field::display(r.status().as_u16()),
                    );

                    if r.status().is_server_error() {
                        tracing::error!(
                            duration = format!("{}ms", dur.as_millis()),
                        );
                    } else if r.status().is_client_error() {
                        tracing::warn!(
                            duration = format!("{}ms", dur.as_millis()),
                        );
                    } else {
                        tracing::info!(
                            duration = format!("{}ms", dur.as_millis()),
                        );
                    }
                },
            ),
    );

    let listener = TcpListener::bind((server.host.clone(), server.port))
        .await
        .map_err(|e| {
            log::error!(
                "failed to listen on `{}:{}`: {e}",
                server.host,
                server.port,
            );
        })?;

    log::info!("listening on `{}:{}`", server.host, server.port);

    axum::serve(listener, app)
        .await
        .map_err(|e| log::error!("webserver failed: {e}"))
}
