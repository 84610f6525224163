//! Test server lifecycle management
//!
//! Spawns the upload server wired to a [`FakeUpstream`].

use super::constants::*;
use super::fixtures::test_app_config;
use super::upstream::FakeUpstream;
use outfit_tunes::config::AppConfig;
use outfit_tunes::server::make_app;
use outfit_tunes::OutfitPipeline;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Upload server instance
///
/// When dropped, the server gracefully shuts down.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a server using the default test config for `upstream`.
    pub async fn spawn(upstream: &FakeUpstream) -> Self {
        Self::spawn_with_config(test_app_config(upstream)).await
    }

    /// Spawns a server on a random port with the given config.
    ///
    /// # Panics
    ///
    /// Panics if the pipeline can't be built, the port can't be bound or the
    /// server doesn't become ready within [`SERVER_READY_TIMEOUT_MS`].
    pub async fn spawn_with_config(config: AppConfig) -> Self {
        let pipeline =
            Arc::new(OutfitPipeline::from_config(&config).expect("Failed to build pipeline"));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let mut server_config = config.server.clone();
        server_config.port = port;
        let app = make_app(server_config, pipeline);

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url: format!("http://127.0.0.1:{}", port),
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling `/`
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
