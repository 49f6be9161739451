// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cfbotd`: the patch-processing pipeline daemon. Wires together `Store`,
//! `PipelineEngine` with the local-subprocess stage drivers, the Unix
//! listener, and the queue ticker.

use cfbot_adapters::{JsonDirectoryAttachmentSource, LocalApplier, LocalCompiler, LocalTester};
use cfbot_core::SystemClock;
use cfbot_daemon::{config::Config, lifecycle, App, Listener, Ticker};
use cfbot_engine::{LoggingNotifier, PipelineEngine};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var("CFBOTD_CONFIG").ok().map(PathBuf::from);
    let config = Config::load(config_path.as_deref())?;

    let _log_guard = init_tracing(&config);

    tracing::info!(
        data_dir = %config.data_dir.display(),
        socket_path = %config.socket_path.display(),
        tick_interval_ms = config.tick_interval_ms,
        "starting cfbotd"
    );

    let startup = lifecycle::startup(&config).await?;

    let attachments = Arc::new(JsonDirectoryAttachmentSource::new(&config.attachments_dir));
    let applier = LocalApplier::new(
        &config.base_dir,
        &config.template_dir,
        &config.apply_script_path,
        &config.file_fetch_url_base,
        attachments,
    );
    let compiler = LocalCompiler::new(&config.base_dir);
    let tester = LocalTester::new(&config.base_dir);

    let engine = PipelineEngine::new(Box::new(applier), Box::new(compiler), Box::new(tester), Box::new(LoggingNotifier), SystemClock);

    let app = Arc::new(Mutex::new(App::new(startup.store, engine, SystemClock)));

    let shutdown = Arc::new(Notify::new());
    let listener = Listener::new(startup.listener, Arc::clone(&app), Arc::clone(&shutdown));
    let ticker = Ticker::new(Arc::clone(&app), config.tick_interval());

    // `lock` is held for the process lifetime via this binding; dropping it
    // at the end of `main` releases the flock.
    let _lock = startup.lock;

    tokio::select! {
        _ = listener.run() => {}
        _ = ticker.run() => {}
        _ = shutdown.notified() => {
            tracing::info!("received shutdown request, shutting down");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received ctrl-c, shutting down");
        }
    }

    app.lock().await.checkpoint()?;
    Ok(())
}

fn init_tracing(config: &Config) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_dir = config.data_dir.join("logs");
    if std::fs::create_dir_all(&log_dir).is_err() {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(&log_dir, "cfbotd.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(non_blocking).init();
    Some(guard)
}
