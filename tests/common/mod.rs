#![allow(dead_code)]

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use shop_api::config::AppConfig;
use shop_api::database::DatabaseManager;
use shop_api::state::AppState;

pub const TEST_SECRET: &str = "test_secret_key_for_testing_purposes_only";

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
}

/// Config used by every test server: in-memory storage, fast bcrypt
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.server.host = "127.0.0.1".to_string();
    config.security.secret_key = TEST_SECRET.to_string();
    config.security.bcrypt_cost = 4;
    config
}

pub fn test_state() -> AppState {
    AppState::new(test_config(), DatabaseManager::in_memory()).expect("test state")
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Each #[tokio::test] owns a runtime that ends with the test, so the
        // shared server gets a runtime of its own on a background thread
        std::thread::Builder::new()
            .name("shop-api-test-server".into())
            .spawn(move || {
                let runtime = tokio::runtime::Builder::new_multi_thread()
                    .enable_all()
                    .build()
                    .expect("test server runtime");
                runtime.block_on(async move {
                    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
                        .await
                        .expect("bind test server");
                    shop_api::server::run(listener, test_state(), std::future::pending())
                        .await
                        .expect("test server");
                });
            })
            .context("failed to spawn server thread")?;

        Ok(Self { port, base_url })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn test server"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// A fresh, schema-valid email so tests sharing the server never collide
pub fn unique_email() -> String {
    format!("u{}@shop.test", uuid::Uuid::new_v4().simple())
}

pub fn unique_name(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}

/// Log in (registering on first use) and return the bearer token
pub async fn login(server: &TestServer, client: &reqwest::Client, user: &str) -> Result<String> {
    let res = client
        .post(server.url("/auth/login"))
        .json(&json!({ "user": user, "password": "pw123" }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());

    let body: Value = res.json().await?;
    body["token"]
        .as_str()
        .map(str::to_string)
        .context("login response has no token")
}
