use std::env;

use reqwest::Url;

use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8001";
pub const BASE_URL_VAR: &str = "ENROLLMENT_API_URL";

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: Url,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::Config(format!("invalid base url '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Config(format!("'{}' cannot be used as a base url", base_url)));
        }
        Ok(Self { base_url })
    }

    /// Reads `ENROLLMENT_API_URL` (a `.env` file is honored), falling back to
    /// the local development service.
    pub fn new_from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let base_url = env::var(BASE_URL_VAR).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(&base_url)
    }
}
