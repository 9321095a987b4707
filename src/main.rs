use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use azure_face_extractor::{
    plugins::CollectingEmitter,
    utils::{config::Config, logging},
    Application,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (.env first)
    let config = Config::new().context("Failed to load configuration")?;
    let _log_guard = logging::init(&config.logging.level);

    info!("Starting face extractor v{}", env!("CARGO_PKG_VERSION"));

    let images: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    if images.is_empty() {
        warn!("No image files given; nothing to do");
    }

    let mut app = Application::new(config).map_err(|e| {
        error!("Failed to initialize application: {}", e);
        e
    })?;

    // Cancel in-flight detection on Ctrl-C
    let cancellation = CancellationToken::new();
    let signal_token = cancellation.clone();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("Received shutdown signal");
                signal_token.cancel();
            }
            Err(err) => {
                error!("Failed to listen for shutdown signal: {}", err);
            }
        }
    });

    app.start(cancellation.clone()).await.map_err(|e| {
        error!("Failed to start application: {}", e);
        e
    })?;

    let result = run(&app, &images, &cancellation).await;

    if let Err(e) = app.shutdown().await {
        error!("Error during shutdown: {}", e);
    }

    result
}

async fn run(
    app: &Application,
    images: &[PathBuf],
    cancellation: &CancellationToken,
) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut emitter = CollectingEmitter::new();

    for path in images {
        if cancellation.is_cancelled() {
            break;
        }

        let image = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read image {}", path.display()))?;
        info!(path = %path.display(), bytes = image.len(), "Processing image");

        let outcome = app.process(image.into(), &mut emitter).await;

        // Records emitted before a failure are still written out.
        let mut out = stdout.lock();
        for record in emitter.drain() {
            serde_json::to_writer(&mut out, &record)?;
            out.write_all(b"\n")?;
        }
        out.flush()?;

        outcome.with_context(|| format!("Failed to process image {}", path.display()))?;
    }

    Ok(())
}
