//! In-process test server.
//!
//! Boots a full natterd instance on an ephemeral port so tests can talk
//! to it over real TCP sockets and drive shutdown directly through the
//! hub.

use natterd::config::{Config, ServerConfig};
use natterd::network::Gateway;
use natterd::state::Hub;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

use super::client::TestClient;

/// The password every test server is configured with.
pub const TEST_PASSWORD: &str = "hunter2";

/// A running server instance bound to an ephemeral localhost port.
pub struct TestServer {
    hub: Arc<Hub>,
    addr: SocketAddr,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl TestServer {
    /// Bind and start a server on 127.0.0.1 with an OS-assigned port.
    pub async fn spawn() -> anyhow::Result<TestServer> {
        let config = Config {
            server: ServerConfig {
                address: "127.0.0.1".to_string(),
                port: 0,
                password: TEST_PASSWORD.to_string(),
            },
        };

        let hub = Arc::new(Hub::new(&config));
        let bind_addr = format!("{}:{}", config.server.address, config.server.port);
        let gateway = Gateway::bind(&bind_addr, Arc::clone(&hub)).await?;
        let addr = gateway.local_addr()?;
        let handle = tokio::spawn(gateway.run());

        Ok(TestServer { hub, addr, handle })
    }

    /// The address clients should connect to.
    #[allow(dead_code)]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Open a raw client connection to this server.
    pub async fn connect(&self) -> anyhow::Result<TestClient> {
        TestClient::connect(self.addr).await
    }

    /// Signal shutdown and wait for the gateway to drain and exit.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        self.hub.shutdown();
        self.handle.await??;
        Ok(())
    }
}
