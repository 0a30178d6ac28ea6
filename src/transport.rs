use crate::{
    config::Config,
    errors::{deadline_elapsed, WhoisError},
};
use async_trait::async_trait;
use std::{future::Future, io, time::Duration};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    time::{timeout_at, Instant},
};
use tracing::debug;

/// ARIN needs "n + " in front of the query to force a network/name lookup.
pub const ARIN_WHOIS_SERVER: &str = "whois.arin.net";
const ARIN_QUERY_PREFIX: &str = "n + ";

/// One WHOIS round trip: send `query` to `server`, return everything it
/// answers before closing the connection.
#[async_trait]
pub trait WhoisTransport: Send + Sync {
    async fn query(&self, query: &str, server: &str) -> Result<String, WhoisError>;
}

/// Plain TCP transport with independent connect, write and read deadlines.
#[derive(Debug, Clone)]
pub struct TcpTransport {
    port: u16,
    connect_timeout: Duration,
    write_timeout: Duration,
    read_timeout: Duration,
    buffer_size: usize,
    max_response_size: usize,
}

impl TcpTransport {
    pub fn new(config: &Config) -> Self {
        Self {
            port: config.whois_port,
            connect_timeout: config.connect_timeout(),
            write_timeout: config.write_timeout(),
            read_timeout: config.read_timeout(),
            buffer_size: config.buffer_size.max(1),
            max_response_size: config.max_response_size,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_timeouts(mut self, connect: Duration, write: Duration, read: Duration) -> Self {
        self.connect_timeout = connect;
        self.write_timeout = write;
        self.read_timeout = read;
        self
    }

    pub fn with_max_response_size(mut self, max_response_size: usize) -> Self {
        self.max_response_size = max_response_size;
        self
    }

    async fn read_response(&self, stream: &mut TcpStream, server: &str) -> Result<Vec<u8>, WhoisError> {
        // One deadline covers the whole response, not each read call.
        let deadline = Instant::now() + self.read_timeout;
        let mut buffer = vec![0; self.buffer_size];
        let mut response = Vec::new();

        loop {
            let n = within(deadline, "read", stream.read(&mut buffer))
                .await
                .map_err(|source| WhoisError::Read { server: server.to_string(), source })?;
            if n == 0 {
                break; // EOF
            }

            response.extend_from_slice(&buffer[..n]);
            if response.len() > self.max_response_size {
                return Err(WhoisError::ResponseTooLarge {
                    server: server.to_string(),
                    limit: self.max_response_size,
                });
            }
        }

        Ok(response)
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

#[async_trait]
impl WhoisTransport for TcpTransport {
    async fn query(&self, query: &str, server: &str) -> Result<String, WhoisError> {
        debug!("Querying {}:{} for {}", server, self.port, query);

        let connect_deadline = Instant::now() + self.connect_timeout;
        let mut stream = within(connect_deadline, "connect", TcpStream::connect((server, self.port)))
            .await
            .map_err(|source| WhoisError::Connect { server: server.to_string(), source })?;

        if let Err(e) = stream.set_nodelay(true) {
            debug!("Failed to set TCP_NODELAY: {}", e);
        }

        let line = query_line(query, server);
        let write_deadline = Instant::now() + self.write_timeout;
        within(write_deadline, "write", stream.write_all(line.as_bytes()))
            .await
            .map_err(|source| WhoisError::Send { server: server.to_string(), source })?;

        let response = self.read_response(&mut stream, server).await?;
        debug!("{} answered with {} bytes", server, response.len());

        // The stream closes when it drops here, on success and on every early return above.
        Ok(String::from_utf8_lossy(&response).into_owned())
    }
}

/// Runs one socket stage, turning an expired deadline into a `TimedOut` error.
async fn within<T, F>(deadline: Instant, stage: &str, stage_io: F) -> io::Result<T>
where
    F: Future<Output = io::Result<T>>,
{
    match timeout_at(deadline, stage_io).await {
        Ok(result) => result,
        Err(_) => Err(deadline_elapsed(stage)),
    }
}

/// The exact line written to `server` for `query`.
pub fn query_line(query: &str, server: &str) -> String {
    if server == ARIN_WHOIS_SERVER {
        format!("{}{}\r\n", ARIN_QUERY_PREFIX, query)
    } else {
        format!("{}\r\n", query)
    }
}
