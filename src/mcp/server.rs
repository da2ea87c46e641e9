//! MCP server main loop.
//!
//! Reads one line at a time from the transport, hands it to the [`Router`],
//! and writes exactly one reply per non-blank line. Messages are processed
//! strictly in arrival order. The loop ends on EOF or, when run through
//! [`McpServer::run`], on SIGINT/SIGTERM (Ctrl+C on Windows).

use std::io;

use tokio::io::{AsyncBufRead, AsyncWrite};

use crate::mcp::router::Router;
use crate::mcp::transport::{StdioTransport, Transport};

/// The MCP server for TheBrain.
pub struct McpServer<R, W> {
    /// The transport layer.
    transport: Transport<R, W>,
    /// Request dispatch.
    router: Router,
}

impl McpServer<tokio::io::BufReader<tokio::io::Stdin>, tokio::io::Stdout> {
    /// Creates a server speaking over stdin and stdout.
    #[must_use]
    pub fn stdio(router: Router) -> Self {
        Self::new(StdioTransport::stdio(), router)
    }
}

impl<R, W> McpServer<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a server over the given transport.
    pub const fn new(transport: Transport<R, W>, router: Router) -> Self {
        Self { transport, router }
    }

    /// The router handling requests.
    pub const fn router(&self) -> &Router {
        &self.router
    }

    /// Consumes the server, returning its transport.
    pub fn into_transport(self) -> Transport<R, W> {
        self.transport
    }

    /// Runs the MCP server main loop with graceful shutdown handling.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn run(&mut self) -> io::Result<()> {
        self.run_with_shutdown().await
    }

    /// Serves messages until the input reaches EOF.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn serve(&mut self) -> io::Result<()> {
        while let Some(line) = self.transport.read_line().await? {
            self.handle_line(&line).await?;
        }
        tracing::info!("Input closed, shutting down");
        Ok(())
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(unix)]
    async fn run_with_shutdown(&mut self) -> io::Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt()).map_err(io::Error::other)?;
        let mut sigterm = signal(SignalKind::terminate()).map_err(io::Error::other)?;

        tokio::select! {
            _ = sigint.recv() => {
                tracing::info!("Received SIGINT, initiating graceful shutdown");
                Ok(())
            }

            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, initiating graceful shutdown");
                Ok(())
            }

            result = self.serve() => result,
        }
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(windows)]
    async fn run_with_shutdown(&mut self) -> io::Result<()> {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, initiating graceful shutdown");
                Ok(())
            }

            result = self.serve() => result,
        }
    }

    /// Handles a single line and writes its reply, if any.
    async fn handle_line(&mut self, line: &str) -> io::Result<()> {
        match self.router.handle_line(line).await {
            None => Ok(()),
            Some(Ok(response)) => self.transport.write_response(&response).await,
            Some(Err(error)) => self.transport.write_error(&error).await,
        }
    }
}
