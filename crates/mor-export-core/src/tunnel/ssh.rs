use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::sync::Mutex;

use ssh2::{Channel, CheckResult, KnownHostFileKind, Session};
use tracing::{debug, info, warn};

use super::{Dialer, Duplex};
use crate::config::SshSettings;
use crate::error::{ExportError, Result};

/// An authenticated SSH session used only to relay TCP connections.
pub struct SshTunnel {
    session: Session,
    // Channel setup needs the session in blocking mode; relays run it non-blocking.
    dial_lock: Mutex<()>,
}

impl SshTunnel {
    /// Connects and authenticates with the configured private key.
    pub fn connect(settings: &SshSettings) -> Result<Self> {
        std::fs::metadata(&settings.key_path).map_err(|err| {
            ExportError::Key(format!(
                "cannot read private key {}: {err}",
                settings.key_path.display()
            ))
        })?;

        let address = settings.address();
        let tcp = TcpStream::connect(&address)
            .map_err(|err| ExportError::Tunnel(format!("failed to reach {address}: {err}")))?;

        let mut session = Session::new()
            .map_err(|err| ExportError::Tunnel(format!("failed to create SSH session: {err}")))?;
        session.set_tcp_stream(tcp);
        session
            .handshake()
            .map_err(|err| ExportError::Tunnel(format!("SSH handshake with {address} failed: {err}")))?;

        verify_host_key(&session, settings)?;

        session
            .userauth_pubkey_file(
                &settings.user,
                None,
                &settings.key_path,
                settings.key_passphrase.as_deref(),
            )
            .map_err(|err| {
                ExportError::Key(format!(
                    "public-key authentication as '{}' with {} failed: {err}",
                    settings.user,
                    settings.key_path.display()
                ))
            })?;
        if !session.authenticated() {
            return Err(ExportError::Key(format!(
                "{address} rejected the key for '{}'",
                settings.user
            )));
        }

        info!(host = %address, user = %settings.user, "SSH tunnel established");
        Ok(Self {
            session,
            dial_lock: Mutex::new(()),
        })
    }
}

impl Dialer for SshTunnel {
    fn dial(&self, addr: &str) -> Result<Box<dyn Duplex>> {
        let (host, port) = split_host_port(addr)?;
        let _guard = self
            .dial_lock
            .lock()
            .map_err(|_| ExportError::Tunnel("SSH dial lock poisoned".to_string()))?;

        self.session.set_blocking(true);
        let channel = self.session.channel_direct_tcpip(host, port, None);
        self.session.set_blocking(false);

        let channel = channel
            .map_err(|err| ExportError::Tunnel(format!("failed to open channel to {addr}: {err}")))?;
        debug!(target_addr = addr, "opened direct-tcpip channel");
        Ok(Box::new(ChannelStream { channel }))
    }
}

impl Drop for SshTunnel {
    fn drop(&mut self) {
        self.session.set_blocking(true);
        if let Err(err) = self.session.disconnect(None, "export finished", None) {
            debug!(error = %err, "SSH disconnect was not clean");
        }
    }
}

struct ChannelStream {
    channel: Channel,
}

impl Read for ChannelStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.channel.read(buf) {
            Ok(0) if !self.channel.eof() => Err(io::ErrorKind::WouldBlock.into()),
            other => other,
        }
    }
}

impl Write for ChannelStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.channel.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.channel.flush()
    }
}

impl Drop for ChannelStream {
    fn drop(&mut self) {
        let _ = self.channel.close();
    }
}

fn verify_host_key(session: &Session, settings: &SshSettings) -> Result<()> {
    let Some(path) = settings.known_hosts.as_deref() else {
        warn!(
            host = %settings.host,
            "host key verification disabled; accepting any host key"
        );
        return Ok(());
    };

    let mut known_hosts = session
        .known_hosts()
        .map_err(|err| ExportError::Tunnel(format!("failed to initialise known hosts: {err}")))?;
    known_hosts
        .read_file(path, KnownHostFileKind::OpenSSH)
        .map_err(|err| {
            ExportError::Config(format!("failed to read known hosts {}: {err}", path.display()))
        })?;

    let (key, _) = session
        .host_key()
        .ok_or_else(|| ExportError::Tunnel("server presented no host key".to_string()))?;

    match known_hosts.check_port(&settings.host, settings.port, key) {
        CheckResult::Match => Ok(()),
        CheckResult::NotFound => Err(ExportError::Tunnel(format!(
            "host key for {} not found in {}",
            settings.address(),
            path.display()
        ))),
        CheckResult::Mismatch => Err(ExportError::Tunnel(format!(
            "host key for {} does not match {}",
            settings.address(),
            path.display()
        ))),
        CheckResult::Failure => Err(ExportError::Tunnel(format!(
            "host key check for {} failed",
            settings.address()
        ))),
    }
}

fn split_host_port(addr: &str) -> Result<(&str, u16)> {
    let (host, port) = addr
        .rsplit_once(':')
        .ok_or_else(|| ExportError::Tunnel(format!("address '{addr}' has no port")))?;
    let port = port
        .parse()
        .map_err(|_| ExportError::Tunnel(format!("address '{addr}' has an invalid port")))?;
    Ok((host, port))
}
