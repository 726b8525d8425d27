use std::io::Write;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mor_export_core::config::{ConnectionProfile, DatabaseSettings, SshSettings};
use mor_export_core::executor::{execute_via, QuerySpec};
use mor_export_core::reports::{self, IncomingCallsDuration, LineDurationRow, ProviderActivity};
use mor_export_core::tunnel::{Dialer, Duplex};
use mor_export_core::ExportError;

struct TcpDialer;

impl Dialer for TcpDialer {
    fn dial(&self, addr: &str) -> mor_export_core::Result<Box<dyn Duplex>> {
        let stream = TcpStream::connect(addr)
            .map_err(|err| ExportError::Tunnel(format!("failed to reach {addr}: {err}")))?;
        stream.set_nonblocking(true)?;
        Ok(Box::new(stream))
    }
}

fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind");
    listener.local_addr().expect("addr")
}

fn database(port: u16) -> DatabaseSettings {
    DatabaseSettings {
        host: "127.0.0.1".into(),
        port,
        name: "mor".into(),
        user: "reporter".into(),
        password: "secret".into(),
    }
}

fn profile(ssh_port: u16, key_path: PathBuf) -> ConnectionProfile {
    ConnectionProfile {
        ssh: SshSettings {
            host: "127.0.0.1".into(),
            port: ssh_port,
            user: "tunnel".into(),
            key_path,
            key_passphrase: None,
            known_hosts: None,
        },
        database: database(3306),
    }
}

fn is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).expect("read dir").next().is_none()
}

#[tokio::test]
async fn inverted_window_fails_before_connecting() {
    let out = tempfile::tempdir().expect("tempdir");
    let profile = profile(closed_port().port(), PathBuf::from("/nonexistent/id_ed25519"));

    let result = reports::run(
        &IncomingCallsDuration,
        "2024-02-01 00:00:00",
        "2024-01-01 00:00:00",
        &profile,
        out.path(),
    )
    .await;

    assert!(matches!(result, Err(ExportError::Validation(_))));
    assert!(is_empty(out.path()));
}

#[tokio::test]
async fn malformed_date_fails_before_connecting() {
    let out = tempfile::tempdir().expect("tempdir");
    let profile = profile(closed_port().port(), PathBuf::from("/nonexistent/id_ed25519"));

    let result = reports::run(
        &ProviderActivity::new("sfr"),
        "yesterday",
        "2024-01-01 00:00:00",
        &profile,
        out.path(),
    )
    .await;

    match result {
        Err(ExportError::Validation(message)) => assert!(message.contains("dateStart")),
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(is_empty(out.path()));
}

#[tokio::test]
async fn missing_private_key_is_a_key_error() {
    let out = tempfile::tempdir().expect("tempdir");
    let profile = profile(closed_port().port(), PathBuf::from("/nonexistent/id_ed25519"));

    let result = reports::run(
        &IncomingCallsDuration,
        "2024-01-01 00:00:00",
        "2024-01-31 23:59:59",
        &profile,
        out.path(),
    )
    .await;

    assert!(matches!(result, Err(ExportError::Key(_))));
    assert!(is_empty(out.path()));
}

#[tokio::test]
async fn unreachable_jump_host_is_a_tunnel_error() {
    let out = tempfile::tempdir().expect("tempdir");
    let mut key = tempfile::NamedTempFile::new().expect("key file");
    writeln!(key, "not a real key").expect("write key");
    let profile = profile(closed_port().port(), key.path().to_path_buf());

    let result = reports::run(
        &IncomingCallsDuration,
        "2024-01-01 00:00:00",
        "2024-01-31 23:59:59",
        &profile,
        out.path(),
    )
    .await;

    assert!(matches!(result, Err(ExportError::Tunnel(_))));
    assert!(is_empty(out.path()));
}

#[tokio::test]
async fn unreachable_database_behind_the_tunnel_fails_the_query() {
    let database = database(closed_port().port());
    let spec = QuerySpec::new("SELECT dst AS destination, billsec AS duration FROM calls");

    let result =
        execute_via::<_, LineDurationRow>(Arc::new(TcpDialer), &database, &spec).await;

    assert!(matches!(
        result,
        Err(ExportError::Tunnel(_)) | Err(ExportError::Query(_))
    ));
}
