use serde::Deserialize;

/// Top-level settings, loaded once at startup and passed explicitly to each
/// component. No component reads the environment on its own.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub payables_database: DatabaseSettings,
    pub ledger_database: DatabaseSettings,
    pub auth: AuthSettings,
    pub ledger_client: LedgerClientSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationSettings {
    pub payables_port: u16,
    pub ledger_port: u16,
    pub log_level: String,
    pub log_format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub pool_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    /// Secret for end-user tokens issued by the auth service.
    pub jwt_secret: String,
    /// Shared secret for short-lived service-to-service tokens.
    pub service_secret: String,
    pub service_token_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerClientSettings {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Settings {
    pub fn new() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        builder.build()?.try_deserialize()
    }
}
