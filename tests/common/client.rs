//! Test chat client.
//!
//! A thin line-oriented client for integration testing that can send
//! records and assert on received ones.

use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

/// A test chat client.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

impl TestClient {
    /// Connect to a test server.
    pub async fn connect(addr: SocketAddr) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;

        let (read_half, write_half) = stream.into_split();
        let reader = BufReader::new(read_half);
        let writer = BufWriter::new(write_half);

        Ok(Self { reader, writer })
    }

    /// Send a single record.
    pub async fn send_line(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Receive a single record from the server.
    pub async fn recv(&mut self) -> anyhow::Result<String> {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    /// Receive a record with a timeout.
    ///
    /// Only the line terminator is trimmed; a broadcast with an empty
    /// body legitimately ends in a space.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<String> {
        let mut line = String::new();
        let n = timeout(dur, self.reader.read_line(&mut line)).await??;
        if n == 0 {
            anyhow::bail!("connection closed");
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Receive records until the given predicate returns true.
    #[allow(dead_code)]
    pub async fn recv_until<F>(&mut self, mut predicate: F) -> anyhow::Result<Vec<String>>
    where
        F: FnMut(&str) -> bool,
    {
        let mut lines = Vec::new();
        loop {
            let line = self.recv().await?;
            let done = predicate(&line);
            lines.push(line);
            if done {
                break;
            }
        }
        Ok(lines)
    }

    /// Assert the server has closed this connection.
    #[allow(dead_code)]
    pub async fn expect_closed(&mut self) -> anyhow::Result<()> {
        let mut line = String::new();
        let n = timeout(Duration::from_secs(5), self.reader.read_line(&mut line)).await??;
        if n != 0 {
            anyhow::bail!("expected close, got {line:?}");
        }
        Ok(())
    }

    /// Walk the full handshake (password gate + login).
    pub async fn login(&mut self, password: &str, name: &str) -> anyhow::Result<()> {
        let prompt = self.recv().await?;
        anyhow::ensure!(prompt == "PASSWORD:", "expected password prompt, got {prompt:?}");
        self.send_line(&format!("PASS:{password}")).await?;

        let reply = self.recv().await?;
        anyhow::ensure!(reply == "OKPASS", "password rejected: {reply:?}");
        self.send_line(&format!("LOGIN:{name}")).await?;

        let reply = self.recv().await?;
        anyhow::ensure!(reply == "OK", "login rejected: {reply:?}");
        Ok(())
    }

    /// Send a chat message.
    pub async fn msg(&mut self, text: &str) -> anyhow::Result<()> {
        self.send_line(&format!("MSG:{text}")).await
    }

    /// Send QUIT.
    #[allow(dead_code)]
    pub async fn quit(&mut self) -> anyhow::Result<()> {
        self.send_line("QUIT").await
    }
}
