//! TCP transport.

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use voltguard_wire::FeedCodec;

use crate::config::FeedConfig;
use crate::error::{FeedError, Result};

/// Framed feed connection over TCP.
pub type TcpTransport = Framed<TcpStream, FeedCodec>;

/// Connect to `config.endpoint`, bounded by `config.connect_timeout`.
pub async fn connect(config: FeedConfig) -> Result<TcpTransport> {
    let endpoint = config.endpoint;
    tracing::debug!(endpoint = %endpoint, "connecting to frame server");

    let stream = within_timeout(
        &endpoint,
        config.connect_timeout,
        TcpStream::connect(endpoint.as_str()),
    )
    .await?;
    stream.set_nodelay(true)?;

    tracing::info!(endpoint = %endpoint, "connected to frame server");
    Ok(Framed::new(
        stream,
        FeedCodec::with_max_payload(config.max_payload_size),
    ))
}

async fn within_timeout<S>(
    endpoint: &str,
    limit: Duration,
    connecting: impl Future<Output = io::Result<S>>,
) -> Result<S> {
    match tokio::time::timeout(limit, connecting).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(source)) => Err(FeedError::Connect {
            endpoint: endpoint.to_string(),
            source,
        }),
        Err(_) => Err(FeedError::ConnectTimeout {
            endpoint: endpoint.to_string(),
            timeout: limit,
        }),
    }
}
