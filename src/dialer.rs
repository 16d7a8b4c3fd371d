use crate::types::ScanTarget;
use async_trait::async_trait;
use std::io;
use std::time::Duration;
use tokio::io::AsyncRead;
use tokio::net::TcpStream;
use tokio::time;

/// Something that can open a byte stream to a scan target.
///
/// The attempter only needs to read from the stream for the banner probe, so
/// tests can plug in in-memory streams instead of sockets.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Stream: AsyncRead + Unpin + Send + 'static;

    async fn connect(&self, target: &ScanTarget) -> io::Result<Self::Stream>;
}

/// Plain TCP connect with a fixed per-attempt timeout. Name resolution counts against it.
#[derive(Debug, Clone)]
pub struct TcpDialer {
    timeout: Duration,
}

impl TcpDialer {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl Connector for TcpDialer {
    type Stream = TcpStream;

    async fn connect(&self, target: &ScanTarget) -> io::Result<TcpStream> {
        let addr = (target.host.as_str(), target.port);
        match time::timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(res) => res,
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("connect to {target} timed out after {:?}", self.timeout),
            )),
        }
    }
}
