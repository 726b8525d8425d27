use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use mor_export_core::tunnel::{Dialer, Duplex, LocalForwarder};
use mor_export_core::ExportError;

/// Plain TCP stand-in for the SSH jump host.
struct TcpDialer;

impl Dialer for TcpDialer {
    fn dial(&self, addr: &str) -> mor_export_core::Result<Box<dyn Duplex>> {
        let stream = TcpStream::connect(addr)
            .map_err(|err| ExportError::Tunnel(format!("failed to reach {addr}: {err}")))?;
        stream.set_nonblocking(true)?;
        Ok(Box::new(stream))
    }
}

fn echo_server() -> SocketAddr {
    let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind echo server");
    let addr = listener.local_addr().expect("echo addr");
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            thread::spawn(move || {
                let mut buffer = [0u8; 1024];
                loop {
                    match stream.read(&mut buffer) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            if stream.write_all(&buffer[..n]).is_err() {
                                break;
                            }
                        }
                    }
                }
            });
        }
    });
    addr
}

fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind");
    listener.local_addr().expect("addr")
}

fn connect(addr: SocketAddr) -> TcpStream {
    let stream = TcpStream::connect(addr).expect("connect to forwarder");
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("read timeout");
    stream
}

#[test]
fn forwarder_relays_bytes_both_ways() {
    let target = echo_server();
    let forwarder = LocalForwarder::start(Arc::new(TcpDialer), target.to_string()).expect("start");
    assert!(forwarder.local_addr().ip().is_loopback());

    let mut client = connect(forwarder.local_addr());
    client.write_all(b"SELECT 1").expect("write");
    let mut reply = [0u8; 8];
    client.read_exact(&mut reply).expect("echoed bytes");
    assert_eq!(&reply, b"SELECT 1");

    drop(client);
    drop(forwarder);
}

#[test]
fn forwarder_relays_payloads_larger_than_one_buffer() {
    let target = echo_server();
    let forwarder = LocalForwarder::start(Arc::new(TcpDialer), target.to_string()).expect("start");
    let mut client = connect(forwarder.local_addr());

    let payload: Vec<u8> = (0..40_000u32).map(|i| (i % 251) as u8).collect();
    let mut writer = client.try_clone().expect("clone client");
    let sent = payload.clone();
    let sender = thread::spawn(move || writer.write_all(&sent).expect("write payload"));

    let mut received = vec![0u8; payload.len()];
    client.read_exact(&mut received).expect("echoed payload");
    sender.join().expect("sender thread");
    assert_eq!(received, payload);
}

#[test]
fn forwarder_serves_several_connections() {
    let target = echo_server();
    let forwarder = LocalForwarder::start(Arc::new(TcpDialer), target.to_string()).expect("start");

    let mut first = connect(forwarder.local_addr());
    let mut second = connect(forwarder.local_addr());
    first.write_all(b"one").expect("write");
    second.write_all(b"two").expect("write");

    let mut reply = [0u8; 3];
    second.read_exact(&mut reply).expect("second reply");
    assert_eq!(&reply, b"two");
    first.read_exact(&mut reply).expect("first reply");
    assert_eq!(&reply, b"one");
}

#[test]
fn failed_dial_closes_the_local_connection() {
    let forwarder =
        LocalForwarder::start(Arc::new(TcpDialer), closed_port().to_string()).expect("start");
    let mut client = connect(forwarder.local_addr());

    let mut buffer = [0u8; 16];
    match client.read(&mut buffer) {
        Ok(n) => assert_eq!(n, 0),
        Err(err) => assert_ne!(err.kind(), std::io::ErrorKind::WouldBlock),
    }
}
