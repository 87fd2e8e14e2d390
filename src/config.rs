use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub listing_service_url: String,
    pub user_service_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            listing_service_url: service_url("LISTING_SERVICE_URL", "http://localhost:6000")?,
            user_service_url: service_url("USER_SERVICE_URL", "http://localhost:7000")?,
        };

        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Listing service URL: {}", config.listing_service_url);
        tracing::debug!("User service URL: {}", config.user_service_url);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

fn service_url(var: &str, default: &str) -> anyhow::Result<String> {
    let url = std::env::var(var).unwrap_or_else(|_| default.to_string());
    if url.trim().is_empty() {
        anyhow::bail!("{} cannot be empty", var);
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("{} must start with http:// or https://", var);
    }
    Ok(url)
}
