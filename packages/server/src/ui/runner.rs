//! Server assembly and lifecycle.

use std::{future::Future, net::SocketAddr, sync::Arc};

use tokio::net::TcpListener;
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use crate::{
    domain::{AuthVerifier, ConnectionRegistry, MessageStore, RoomName},
    error::ServerError,
    infrastructure::{
        auth::{JwtAuthVerifier, StaticTokenVerifier},
        repository::{InMemoryConnectionRegistry, InMemoryMessageStore, SqliteMessageStore},
    },
    usecase::{BroadcastDispatcher, broadcast_channel},
};

use super::{
    build_router,
    config::{ServerConfig, StoreBackend},
    signal::shutdown_signal,
    state::{AppState, ConnectionSettings},
};

/// Run the server until Ctrl-C / SIGTERM.
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    Server::bind(&config).await?.serve(shutdown_signal()).await
}

/// A bound, not yet serving, relay.
pub struct Server {
    listener: TcpListener,
    state: Arc<AppState>,
    dispatcher: BroadcastDispatcher,
}

impl Server {
    /// Build every component from `config` and bind the listener.
    pub async fn bind(config: &ServerConfig) -> Result<Self, ServerError> {
        let default_room = RoomName::new(config.default_room.clone())
            .map_err(|e| ServerError::Config(format!("default room: {e}")))?;
        let verifier = build_verifier(config)?;
        let store = build_store(config)?;
        let registry: Arc<dyn ConnectionRegistry> = Arc::new(InMemoryConnectionRegistry::new());

        let (queue, receiver) = broadcast_channel(config.broadcast_capacity);
        let dispatcher =
            BroadcastDispatcher::new(registry.clone(), receiver, config.write_timeout());

        let state = Arc::new(AppState {
            verifier,
            registry,
            store,
            queue,
            stats: dispatcher.stats(),
            settings: ConnectionSettings {
                default_room,
                client_buffer: config.client_buffer.max(1),
                write_timeout: config.write_timeout(),
                history_limit: config.history_limit,
                history_max_limit: config.history_max_limit,
            },
            shutdown: CancellationToken::new(),
            close_connections: CancellationToken::new(),
            tasks: TaskTracker::new(),
        });

        let listener = TcpListener::bind(config.bind_addr()).await?;
        Ok(Self {
            listener,
            state,
            dispatcher,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until `signal` resolves, then shut down in order: stop accepting,
    /// drain the broadcast queue, close every connection.
    pub async fn serve<F>(self, signal: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Server {
            listener,
            state,
            dispatcher,
        } = self;
        let shutdown = state.shutdown.clone();
        let close_connections = state.close_connections.clone();
        let tasks = state.tasks.clone();
        let addr = listener.local_addr()?;

        // Connections stay open until everything queued has reached their buffers
        let dispatcher_task = {
            let shutdown = shutdown.clone();
            let close_connections = close_connections.clone();
            tokio::spawn(async move {
                dispatcher.run(shutdown).await;
                close_connections.cancel();
            })
        };

        let app = build_router(state);
        tracing::info!("Listening on {}", addr);

        let graceful = {
            let shutdown = shutdown.clone();
            async move {
                signal.await;
                shutdown.cancel();
            }
        };
        let served = axum::serve(listener, app)
            .with_graceful_shutdown(graceful)
            .await;

        shutdown.cancel();
        if let Err(e) = dispatcher_task.await {
            tracing::error!("Broadcast dispatcher task failed: {}", e);
        }

        close_connections.cancel();
        tasks.close();
        tasks.wait().await;
        tracing::info!("All connections closed");
        tracing::info!("Server stopped");

        served?;
        Ok(())
    }
}

fn build_verifier(config: &ServerConfig) -> Result<Arc<dyn AuthVerifier>, ServerError> {
    match config.jwt_secret.as_deref() {
        Some(secret) if !secret.is_empty() => {
            if !config.static_tokens.is_empty() {
                tracing::warn!("JWT_SECRET is set, ignoring --static-token entries");
            }
            tracing::info!("Verifying access tokens with HS256");
            Ok(Arc::new(JwtAuthVerifier::new(secret.as_bytes())))
        }
        _ if !config.static_tokens.is_empty() => {
            tracing::info!(
                "Verifying access tokens against {} static tokens",
                config.static_tokens.len()
            );
            Ok(Arc::new(
                config
                    .static_tokens
                    .iter()
                    .cloned()
                    .collect::<StaticTokenVerifier>(),
            ))
        }
        _ => Err(ServerError::Config(
            "set JWT_SECRET or pass at least one --static-token".to_string(),
        )),
    }
}

fn build_store(config: &ServerConfig) -> Result<Arc<dyn MessageStore>, ServerError> {
    match config.store {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory message store");
            Ok(Arc::new(InMemoryMessageStore::new()))
        }
        StoreBackend::Sqlite => {
            tracing::info!("Opening SQLite message store at {}", config.db_path.display());
            Ok(Arc::new(SqliteMessageStore::open(&config.db_path)?))
        }
    }
}
