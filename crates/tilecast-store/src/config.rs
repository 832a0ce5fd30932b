//! Runtime configuration for the store backend.

use crate::StoreError;

/// Connection settings for the external room store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub base_url: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl StoreConfig {
    /// Constructs a configuration from an explicit base URL and
    /// database name.
    pub fn new(base_url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            database: database.into(),
            username: None,
            password: None,
        }
    }

    /// Attaches basic-auth credentials.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Builds a configuration from the expected environment variables.
    ///
    /// `TILECAST_STORE_URL` and `TILECAST_STORE_DB` are required;
    /// `TILECAST_STORE_USERNAME` / `TILECAST_STORE_PASSWORD` are
    /// optional and only applied together.
    pub fn from_env() -> Result<Self, StoreError> {
        let base_url = std::env::var("TILECAST_STORE_URL")
            .map_err(|_| StoreError::MissingEnvVar {
                var: "TILECAST_STORE_URL",
            })?;
        let database = std::env::var("TILECAST_STORE_DB")
            .map_err(|_| StoreError::MissingEnvVar {
                var: "TILECAST_STORE_DB",
            })?;

        let mut config = Self::new(base_url, database);

        if let (Some(username), Some(password)) = (
            std::env::var("TILECAST_STORE_USERNAME").ok(),
            std::env::var("TILECAST_STORE_PASSWORD").ok(),
        ) {
            config = config.with_credentials(username, password);
        }

        Ok(config)
    }
}
