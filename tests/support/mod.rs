//! Scripted stand-in for the server under test.
//!
//! Tests drive both ends from one task: the probe through a
//! [`SessionRegistry`], the server side through [`Peer`] handles that read
//! exactly what the probe wrote and reply with canned lines.

#![allow(dead_code)]

use ircprobe::config::{ProbeConfig, ServerConfig, TimeoutConfig};
use ircprobe::SessionRegistry;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::time::timeout;

pub const SERVER: &str = "irc.test";
const PEER_TIMEOUT: Duration = Duration::from_secs(2);

pub struct FakeServer {
    listener: TcpListener,
    addr: SocketAddr,
}

impl FakeServer {
    pub async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        Self { listener, addr }
    }

    /// Probe configuration pointing at this server, with deadlines short
    /// enough to keep timeout tests fast.
    pub fn config(&self) -> ProbeConfig {
        ProbeConfig {
            server: ServerConfig {
                host: self.addr.ip().to_string(),
                port: self.addr.port(),
            },
            timeouts: TimeoutConfig {
                connect_ms: 1000,
                read_ms: 400,
                drain_ms: 100,
                write_ms: 1000,
                teardown_pause_ms: 10,
            },
            ..ProbeConfig::default()
        }
    }

    pub fn registry(&self) -> SessionRegistry {
        SessionRegistry::new(self.config())
    }

    pub async fn accept(&self) -> Peer {
        let (stream, _) = timeout(PEER_TIMEOUT, self.listener.accept())
            .await
            .expect("probe never connected")
            .unwrap();
        let (read_half, write_half) = stream.into_split();
        Peer {
            reader: BufReader::new(read_half),
            writer: write_half,
        }
    }
}

/// Server side of one probe connection.
pub struct Peer {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Peer {
    /// Next line written by the probe, terminator stripped.
    pub async fn recv(&mut self) -> String {
        let mut buf = String::new();
        let n = timeout(PEER_TIMEOUT, self.reader.read_line(&mut buf))
            .await
            .expect("probe sent nothing")
            .unwrap();
        assert!(n > 0, "probe closed the connection");
        assert!(buf.ends_with("\r\n"), "line not CRLF terminated: {:?}", buf);
        buf.trim_end_matches("\r\n").to_string()
    }

    pub async fn send(&mut self, line: &str) {
        self.send_raw(format!("{}\r\n", line).as_bytes()).await;
    }

    pub async fn send_raw(&mut self, bytes: &[u8]) {
        self.writer.write_all(bytes).await.unwrap();
        self.writer.flush().await.unwrap();
    }

    /// Play the registration exchange for `nick`.
    pub async fn register(&mut self, nick: &str) {
        assert_eq!(self.recv().await, format!("NICK {}", nick));
        assert!(self.recv().await.starts_with(&format!("USER {} ", nick)));
        self.send(&format!(":{} NOTICE * :*** Looking up your hostname", SERVER))
            .await;
        self.send(&format!(":{} 001 {} :Welcome to the test network {}", SERVER, nick, nick))
            .await;
        self.send(&format!(":{} 002 {} :Your host is {}", SERVER, nick, SERVER))
            .await;
        self.send(&format!(":{} 376 {} :End of MOTD", SERVER, nick))
            .await;
    }

    /// Assert the probe writes nothing for `dur`.
    pub async fn expect_silence(&mut self, dur: Duration) {
        let mut buf = String::new();
        if let Ok(read) = timeout(dur, self.reader.read_line(&mut buf)).await {
            let n = read.unwrap();
            assert!(n == 0, "unexpected line from probe: {:?}", buf);
        }
    }

    /// Assert the probe has shut down its write side.
    pub async fn expect_eof(&mut self) {
        let mut buf = String::new();
        let n = timeout(PEER_TIMEOUT, self.reader.read_line(&mut buf))
            .await
            .expect("probe kept the connection open")
            .unwrap_or(0);
        assert_eq!(n, 0, "expected EOF, got {:?}", buf);
    }
}

/// Open `nick` on `registry` while playing the server side of registration.
pub async fn open(registry: &mut SessionRegistry, server: &FakeServer, nick: &str) -> Peer {
    let (opened, peer) = tokio::join!(registry.open(nick), async {
        let mut peer = server.accept().await;
        peer.register(nick).await;
        peer
    });
    opened.expect("registration failed");
    peer
}
