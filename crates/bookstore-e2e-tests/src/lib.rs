use std::time::Duration;

use anyhow::{Result, anyhow};
use bookstore_server::config::{Parser, ServerConfig};
use rand::Rng as _;
use tempfile::TempDir;

fn random_port() -> Result<u16> {
    let mut rng = rand::rng();

    let mut retries = 3;
    while retries > 0 {
        let port: u16 = rng.random_range(3030..4030);
        let addr: std::net::SocketAddr = format!("127.0.0.1:{}", port).parse()?;
        match std::net::TcpStream::connect_timeout(&addr, std::time::Duration::from_millis(100)) {
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => return Ok(port),
            Err(_) => retries -= 1,
            Ok(_) => retries -= 1,
        }
    }

    Err(anyhow!("Could not find a free port"))
}

pub struct ConfigGuard {
    #[allow(dead_code)]
    data_dir: TempDir,
}

pub fn prepare_env(test_name: &str) -> Result<(ServerConfig, ConfigGuard)> {
    let tmp_data_dir = TempDir::with_prefix(format!("{}_", test_name))?;
    let data_dir = tmp_data_dir.path().to_string_lossy().to_string();
    let port = random_port()?;
    let port = port.to_string();
    let args = &[
        "bookstore-e2e-tests",
        "--data-dir",
        &data_dir,
        "--port",
        &port,
    ];
    let config = ServerConfig::try_parse_from(args)?;
    Ok((
        config,
        ConfigGuard {
            data_dir: tmp_data_dir,
        },
    ))
}

pub fn base_url(config: &ServerConfig) -> String {
    format!("http://{}:{}", config.listen_address, config.port)
}

/// Spawns the server in the background and waits until it answers on
/// /health. Returns a client to talk to it.
pub async fn launch_env(args: ServerConfig) -> Result<reqwest::Client> {
    let base = base_url(&args);
    tokio::spawn(async move {
        if let Err(e) = bookstore_server::run(args).await {
            tracing::error!("Server failed: {e:#}");
        }
    });

    let client = reqwest::Client::new();
    let health_url = format!("{base}/health");
    for _ in 0..50 {
        if let Ok(response) = client.get(&health_url).send().await {
            if response.status().is_success() {
                return Ok(client);
            }
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    Err(anyhow!("Server did not come up at {base}"))
}
