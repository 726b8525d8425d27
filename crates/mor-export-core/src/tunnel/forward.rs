use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use super::{Dialer, Duplex};
use crate::error::Result;

const IDLE_WAIT: Duration = Duration::from_millis(2);
const BUFFER_SIZE: usize = 16 * 1024;

/// Relays connections made to an ephemeral loopback port through a [`Dialer`].
///
/// Dropping the forwarder stops accepting, ends every relay and joins their threads.
pub struct LocalForwarder {
    local_addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    acceptor: Option<JoinHandle<()>>,
}

impl LocalForwarder {
    pub fn start<D>(dialer: Arc<D>, target: impl Into<String>) -> Result<Self>
    where
        D: Dialer + ?Sized + 'static,
    {
        let listener = TcpListener::bind(("127.0.0.1", 0))?;
        listener.set_nonblocking(true)?;
        let local_addr = listener.local_addr()?;
        let target = target.into();
        let shutdown = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&shutdown);
        let acceptor = thread::Builder::new()
            .name("tunnel-forwarder".to_string())
            .spawn(move || accept_loop(listener, dialer, target, flag))?;

        debug!(%local_addr, "local forwarder listening");
        Ok(Self {
            local_addr,
            shutdown,
            acceptor: Some(acceptor),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl Drop for LocalForwarder {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(acceptor) = self.acceptor.take() {
            let _ = acceptor.join();
        }
    }
}

fn accept_loop<D>(listener: TcpListener, dialer: Arc<D>, target: String, shutdown: Arc<AtomicBool>)
where
    D: Dialer + ?Sized,
{
    let mut relays = Vec::new();

    while !shutdown.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((client, peer)) => match dialer.dial(&target) {
                Ok(remote) => {
                    debug!(%peer, target_addr = %target, "relaying connection");
                    let flag = Arc::clone(&shutdown);
                    relays.push(thread::spawn(move || {
                        if let Err(err) = relay(client, remote, &flag) {
                            warn!(error = %err, "relay ended with an error");
                        }
                    }));
                }
                Err(err) => warn!(error = %err, target_addr = %target, "dial failed"),
            },
            Err(err) if is_transient(&err) => thread::sleep(IDLE_WAIT),
            Err(err) => {
                warn!(error = %err, "accept failed");
                thread::sleep(IDLE_WAIT);
            }
        }
    }

    for handle in relays {
        let _ = handle.join();
    }
}

/// Copies bytes both ways until either side closes or shutdown is requested.
///
/// An ssh2 channel has no readiness handle to wait on, so both sides are polled
/// non-blocking with a short sleep between idle passes.
fn relay(client: TcpStream, mut remote: Box<dyn Duplex>, shutdown: &AtomicBool) -> io::Result<()> {
    client.set_nonblocking(true)?;
    let mut client = client;
    let mut buffer = vec![0u8; BUFFER_SIZE];

    while !shutdown.load(Ordering::SeqCst) {
        let mut moved = false;

        match client.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => {
                write_fully(remote.as_mut(), &buffer[..n], shutdown)?;
                moved = true;
            }
            Err(err) if is_transient(&err) => {}
            Err(err) => return Err(err),
        }

        match remote.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => {
                write_fully(&mut client, &buffer[..n], shutdown)?;
                moved = true;
            }
            Err(err) if is_transient(&err) => {}
            Err(err) => return Err(err),
        }

        if !moved {
            thread::sleep(IDLE_WAIT);
        }
    }

    Ok(())
}

fn write_fully<W>(writer: &mut W, mut data: &[u8], shutdown: &AtomicBool) -> io::Result<()>
where
    W: Write + ?Sized,
{
    while !data.is_empty() {
        if shutdown.load(Ordering::SeqCst) {
            return Ok(());
        }
        match writer.write(data) {
            Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
            Ok(n) => data = &data[n..],
            Err(err) if is_transient(&err) => thread::sleep(IDLE_WAIT),
            Err(err) => return Err(err),
        }
    }

    loop {
        match writer.flush() {
            Ok(()) => return Ok(()),
            Err(err) if is_transient(&err) => thread::sleep(IDLE_WAIT),
            Err(err) => return Err(err),
        }
    }
}

fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}
