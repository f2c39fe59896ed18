//! TCP listener: accepts connections and spawns one session task each

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};
use tokio::select;
use tracing::{info, warn};

use crate::{error::AppResult, services::Services, session::Session, AppState};

pub struct Server {
    listener: TcpListener,
    services: Arc<Services>,
}

impl Server {
    /// Bind the configured listen address
    pub async fn bind(state: &AppState) -> AppResult<Self> {
        let server = &state.config.server;
        let listener = TcpListener::bind((server.host.as_str(), server.port)).await?;
        Ok(Self {
            listener,
            services: Arc::clone(&state.services),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the shutdown future resolves. Accept failures
    /// are logged and the loop keeps serving; session failures never escape
    /// their own task.
    pub async fn run_until<F>(self, shutdown: F) -> AppResult<()>
    where
        F: Future<Output = ()> + Send,
    {
        let Server { listener, services } = self;
        tokio::pin!(shutdown);

        loop {
            select! {
                _ = &mut shutdown => {
                    info!("listener shutting down");
                    break;
                }
                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, peer)) => spawn_session(stream, peer, &services),
                        Err(err) => warn!(error = %err, "failed to accept connection"),
                    }
                }
            }
        }

        Ok(())
    }

    /// Accept connections until ctrl-c
    pub async fn run_until_ctrl_c(self) -> AppResult<()> {
        self.run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = %err, "failed to install ctrl-c handler");
            }
        })
        .await
    }
}

fn spawn_session(stream: TcpStream, peer: SocketAddr, services: &Arc<Services>) {
    let services = Arc::clone(services);
    tokio::spawn(async move {
        info!(peer = %peer, "client connected");
        let (reader, writer) = stream.into_split();
        let session = Session::new(BufReader::new(reader), writer, services, peer.to_string());
        if let Err(err) = session.run().await {
            warn!(peer = %peer, error = %err, "session ended with error");
        } else {
            info!(peer = %peer, "client disconnected");
        }
    });
}
