use std::time::Duration;

use reqwest::Client as HttpClient;
use tracing::{info, warn};

const FIRST_PING_DELAY: Duration = Duration::from_secs(60);
const PING_INTERVAL: Duration = Duration::from_secs(14 * 60);

/// Ping `{base_url}/health` once and report whether it answered 2xx
pub async fn ping_once(http_client: &HttpClient, base_url: &str) -> bool {
    let url = format!("{}/health", base_url);
    match http_client.get(&url).send().await {
        Ok(response) if response.status().is_success() => {
            info!("Keep-alive ping to {} succeeded", url);
            true
        }
        Ok(response) => {
            warn!("Keep-alive ping to {} returned {}", url, response.status());
            false
        }
        Err(e) => {
            warn!("Keep-alive ping to {} failed: {}", url, e);
            false
        }
    }
}

/// Keep a sleeping host awake by pinging our own health endpoint
pub fn spawn(base_url: String) -> tokio::task::JoinHandle<()> {
    info!(
        "Keep-alive pinger started (every {} minutes)",
        PING_INTERVAL.as_secs() / 60
    );

    tokio::spawn(async move {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| HttpClient::new());

        tokio::time::sleep(FIRST_PING_DELAY).await;
        let mut interval = tokio::time::interval(PING_INTERVAL);
        loop {
            interval.tick().await;
            ping_once(&http_client, &base_url).await;
        }
    })
}
