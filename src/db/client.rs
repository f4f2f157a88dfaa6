use std::time::Duration;

use anyhow::Result;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::compat::TokioAsyncWriteCompatExt;
use tracing::debug;

use crate::config::ConnectionSettings;
use crate::db::connection::build_config;
use crate::error::{AppError, ErrorKind};

pub type Client = tiberius::Client<tokio_util::compat::Compat<TcpStream>>;

/// Connect to SQL Server using resolved settings.
///
/// Each command opens one connection, runs its statements, and drops it on
/// return. Connect and login both honor the configured timeout; a timeout of
/// zero disables the deadline.
pub async fn connect(settings: &ConnectionSettings) -> Result<Client> {
    let config =
        build_config(settings).map_err(|err| AppError::new(ErrorKind::Config, err.to_string()))?;
    let deadline = if settings.timeout_ms == 0 {
        None
    } else {
        Some(Duration::from_millis(settings.timeout_ms))
    };

    debug!(server = %settings.server, port = settings.port, "connecting");

    let tcp = with_deadline(
        deadline,
        TcpStream::connect(config.get_addr()),
        &format!("Connection timed out after {} ms", settings.timeout_ms),
    )
    .await?;
    tcp.set_nodelay(true)?;

    let client = with_deadline(
        deadline,
        tiberius::Client::connect(config, tcp.compat_write()),
        &format!("Login timed out after {} ms", settings.timeout_ms),
    )
    .await?;
    Ok(client)
}

async fn with_deadline<T, E, F>(
    deadline: Option<Duration>,
    future: F,
    timeout_message: &str,
) -> Result<T>
where
    E: std::fmt::Display,
    F: std::future::Future<Output = std::result::Result<T, E>>,
{
    let result = match deadline {
        Some(duration) => timeout(duration, future)
            .await
            .map_err(|_| AppError::new(ErrorKind::Connection, timeout_message))?,
        None => future.await,
    };
    result.map_err(|err| AppError::new(ErrorKind::Connection, err.to_string()).into())
}
