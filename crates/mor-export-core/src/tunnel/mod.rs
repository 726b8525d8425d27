use std::io::{Read, Write};

use crate::error::Result;

mod forward;
mod ssh;

pub use forward::LocalForwarder;
pub use ssh::SshTunnel;

/// A relayed byte stream.
///
/// Streams are non-blocking: an idle read or a full write fails with
/// `io::ErrorKind::WouldBlock`, and `Ok(0)` from `read` means the far side closed.
pub trait Duplex: Read + Write + Send {}

impl<T: Read + Write + Send> Duplex for T {}

/// Opens connections to `host:port` addresses on behalf of a local client.
pub trait Dialer: Send + Sync {
    fn dial(&self, addr: &str) -> Result<Box<dyn Duplex>>;
}
