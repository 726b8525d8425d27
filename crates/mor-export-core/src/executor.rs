use std::sync::Arc;

use chrono::NaiveDateTime;
use futures::TryStreamExt;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow, MySqlSslMode};
use sqlx::{Connection, FromRow};
use tracing::{debug, info, instrument, warn};

use crate::config::{ConnectionProfile, DatabaseSettings};
use crate::error::{ExportError, Result};
use crate::tunnel::{Dialer, LocalForwarder, SshTunnel};

/// A value bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryParam {
    DateTime(NaiveDateTime),
    Text(String),
}

impl From<NaiveDateTime> for QueryParam {
    fn from(value: NaiveDateTime) -> Self {
        QueryParam::DateTime(value)
    }
}

impl From<String> for QueryParam {
    fn from(value: String) -> Self {
        QueryParam::Text(value)
    }
}

impl From<&str> for QueryParam {
    fn from(value: &str) -> Self {
        QueryParam::Text(value.to_string())
    }
}

/// SQL text plus the values for its placeholders, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub sql: String,
    pub params: Vec<QueryParam>,
}

impl QuerySpec {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn bind(mut self, param: impl Into<QueryParam>) -> Self {
        self.params.push(param.into());
        self
    }
}

/// Runs one query against the MOR database through an SSH jump host.
pub struct TunneledExecutor<'a> {
    profile: &'a ConnectionProfile,
}

impl<'a> TunneledExecutor<'a> {
    pub fn new(profile: &'a ConnectionProfile) -> Self {
        Self { profile }
    }

    /// Opens the tunnel, runs `spec`, decodes every row and tears everything down.
    #[instrument(
        skip_all,
        fields(
            ssh = %self.profile.ssh.address(),
            database = %self.profile.database.address()
        )
    )]
    pub async fn execute<R>(&self, spec: &QuerySpec) -> Result<Vec<R>>
    where
        R: for<'r> FromRow<'r, MySqlRow> + Send + Unpin,
    {
        let settings = self.profile.ssh.clone();
        let tunnel = tokio::task::spawn_blocking(move || SshTunnel::connect(&settings))
            .await
            .map_err(|err| ExportError::Tunnel(format!("tunnel task failed: {err}")))??;
        let tunnel = Arc::new(tunnel);

        let rows = execute_via(Arc::clone(&tunnel), &self.profile.database, spec).await;

        // Disconnecting blocks on the SSH socket.
        let _ = tokio::task::spawn_blocking(move || drop(tunnel)).await;
        rows
    }
}

/// Runs `spec` on a database reached through any [`Dialer`].
pub async fn execute_via<D, R>(
    dialer: Arc<D>,
    database: &DatabaseSettings,
    spec: &QuerySpec,
) -> Result<Vec<R>>
where
    D: Dialer + ?Sized + 'static,
    R: for<'r> FromRow<'r, MySqlRow> + Send + Unpin,
{
    let forwarder = LocalForwarder::start(dialer, database.address())?;
    let local = forwarder.local_addr();

    let options = MySqlConnectOptions::new()
        .host(&local.ip().to_string())
        .port(local.port())
        .username(&database.user)
        .password(&database.password)
        .database(&database.name)
        // No TLS over the forwarded hop.
        .ssl_mode(MySqlSslMode::Disabled);

    let rows = match MySqlConnection::connect_with(&options).await {
        Ok(mut conn) => {
            debug!(local = %local, "database connection opened through tunnel");
            let rows = fetch_rows(&mut conn, spec).await;
            if let Err(err) = conn.close().await {
                warn!(error = %err, "database connection did not close cleanly");
            }
            rows
        }
        Err(err) => Err(connect_error(err)),
    };

    let _ = tokio::task::spawn_blocking(move || drop(forwarder)).await;
    rows
}

async fn fetch_rows<R>(conn: &mut MySqlConnection, spec: &QuerySpec) -> Result<Vec<R>>
where
    R: for<'r> FromRow<'r, MySqlRow> + Send + Unpin,
{
    let mut query = sqlx::query_as::<_, R>(&spec.sql);
    for param in &spec.params {
        query = match param {
            QueryParam::DateTime(value) => query.bind(*value),
            QueryParam::Text(value) => query.bind(value.as_str()),
        };
    }

    let mut stream = query.fetch(&mut *conn);
    let mut rows = Vec::new();
    while let Some(row) = stream.try_next().await? {
        rows.push(row);
    }

    info!(rows = rows.len(), "query complete");
    Ok(rows)
}

fn connect_error(err: sqlx::Error) -> ExportError {
    match err {
        sqlx::Error::Io(io) => {
            ExportError::Tunnel(format!("database connection through tunnel failed: {io}"))
        }
        other => ExportError::Query(other),
    }
}
