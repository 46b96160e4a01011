use std::{process, sync::Arc};

use purgewire::{
    application::error::AppError,
    config::{self, PurgeArgs, Settings},
    infra::{
        cdn::HttpPurger,
        content_api::RestContentStore,
        error::InfraError,
        http::{self, HookState, OutcomeReport},
        telemetry,
    },
    purge::{ContentTransition, PurgeConfig, PurgeDispatcher, PurgeOutcome, PurgeTrigger},
};
use tokio::{signal, sync::Notify};
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

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(std::io::stderr)
        .finish();
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
        config::Command::Purge(args) => run_purge(settings, args).await,
    }
}

/// Wire the HTTP adapters into one trigger. Nothing is contacted here.
fn build_trigger(settings: &Settings) -> Result<PurgeTrigger, AppError> {
    let config = PurgeConfig::from(&settings.purge);
    let store = Arc::new(RestContentStore::new(&settings.content_store)?);
    let purger = Arc::new(HttpPurger::new(&settings.cdn)?);

    let dispatcher = Arc::new(PurgeDispatcher::new(config.clone(), store.clone(), purger));

    Ok(PurgeTrigger::new(config, dispatcher).with_comment_store(store))
}

async fn run_serve(settings: Settings) -> Result<(), AppError> {
    let trigger = Arc::new(build_trigger(&settings)?);
    let state = HookState::new(trigger, settings.server.webhook_token.as_deref());
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "purgewire::serve",
        addr = %settings.server.addr,
        purge_enabled = settings.purge.enabled,
        auth = settings.server.webhook_token.is_some(),
        "Webhook listener started"
    );

    let shutdown = Arc::new(Notify::new());
    let signalled = shutdown.clone();
    let server = axum::serve(listener, router.into_make_service()).with_graceful_shutdown(
        async move {
            shutdown_signal().await;
            signalled.notify_one();
        },
    );

    let grace = settings.server.graceful_shutdown;
    tokio::select! {
        result = server.into_future() => {
            result.map_err(|err| AppError::from(InfraError::from(err)))?;
        }
        _ = async {
            shutdown.notified().await;
            tokio::time::sleep(grace).await;
        } => {
            warn!(
                target = "purgewire::serve",
                grace_secs = grace.as_secs(),
                "In-flight webhooks did not finish before the shutdown deadline"
            );
        }
    }

    info!(target = "purgewire::serve", "Webhook listener stopped");
    Ok(())
}

async fn run_purge(settings: Settings, args: PurgeArgs) -> Result<(), AppError> {
    let trigger = build_trigger(&settings)?;

    let transition = ContentTransition::new(args.content_id.as_str(), args.event.into());
    let transition_id = transition.id;
    let outcome = trigger.on_content_transition(transition).await;

    let report = serde_json::to_string_pretty(&OutcomeReport::new(transition_id, &outcome))
        .map_err(|err| AppError::unexpected(format!("failed to encode outcome: {err}")))?;
    println!("{report}");

    match outcome {
        PurgeOutcome::Failed(failure) => Err(AppError::from(failure)),
        PurgeOutcome::Sent(_) | PurgeOutcome::Suppressed(_) => Ok(()),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!(target = "purgewire::serve", "Shutdown signal received");
}
