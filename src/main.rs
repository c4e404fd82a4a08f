use std::process::ExitCode;

use camel_lsp::create_service;
use camel_lsp::transport::{Transport, USAGE};
use tokio::net::TcpListener;
use tower_lsp::Server;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout carries the protocol.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let transport = match Transport::from_args(std::env::args().skip(1)) {
        Ok(transport) => transport,
        Err(e) => {
            eprintln!("{e}\n\n{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    let (service, socket) = create_service();
    match transport {
        Transport::Help => println!("{USAGE}"),
        Transport::Stdio => {
            tracing::info!("serving on stdio");
            Server::new(tokio::io::stdin(), tokio::io::stdout(), socket)
                .serve(service)
                .await;
        }
        Transport::Tcp(port) => {
            let listener = match TcpListener::bind(("127.0.0.1", port)).await {
                Ok(listener) => listener,
                Err(e) => {
                    tracing::error!(port, error = %e, "failed to bind");
                    return ExitCode::FAILURE;
                }
            };
            tracing::info!(port, "waiting for a client");
            let stream = match listener.accept().await {
                Ok((stream, peer)) => {
                    tracing::info!(%peer, "client connected");
                    stream
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to accept a client");
                    return ExitCode::FAILURE;
                }
            };
            let (input, output) = tokio::io::split(stream);
            Server::new(input, output, socket).serve(service).await;
        }
    }
    ExitCode::SUCCESS
}
