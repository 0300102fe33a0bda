//! Remote API configuration loaded from environment variables.

/// Base-URL configuration for the storefront REST API.
///
/// Reads from environment variables:
/// - `STOREFRONT_API_URL` — API origin (default: `"http://localhost:8080"`)
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    /// Loads configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("STOREFRONT_API_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
        }
    }

    /// Creates a configuration pointing at the given origin.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_url() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_with_base_url() {
        let config = ApiConfig::with_base_url("https://shop.example.com");
        assert_eq!(config.base_url, "https://shop.example.com");
    }
}
