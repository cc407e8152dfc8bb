//! Database module for PostgreSQL persistence

pub mod gateway;
pub mod models;
pub mod reports;
pub mod repository;

#[cfg(test)]
pub(crate) mod testing;

use std::env;
use std::fmt;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

pub use gateway::{Gateway, Params};

// Environment variable names
const ENV_DB_HOST: &str = "MRNA_DB_HOST";
const ENV_DB_PORT: &str = "MRNA_DB_PORT";
const ENV_DB_USER: &str = "MRNA_DB_USER";
const ENV_DB_PASSWORD: &str = "MRNA_DB_PASSWORD";
const ENV_DB_SCHEMA: &str = "MRNA_DB_SCHEMA";
const ENV_DB_MAX_CONNECTIONS: &str = "MRNA_DB_MAX_CONNECTIONS";

// Default values
const DEFAULT_DB_HOST: &str = "127.0.0.1";
const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_DB_USER: &str = "mrna";
const DEFAULT_DB_SCHEMA: &str = "mrna_biopharma_db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Query(#[from] sqlx::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Invalid stored value: {0}")]
    Decode(String),

    #[error("Database unavailable: {0}")]
    Unavailable(String),
}

impl DbError {
    /// The statement was refused because a referenced or referencing row blocks it
    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self, DbError::Query(sqlx::Error::Database(e)) if e.is_foreign_key_violation())
    }
}

/// Connection settings for the relational store
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    /// Read from the environment; never prompted for
    pub password: Option<String>,
    pub schema: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DB_HOST.to_string(),
            port: DEFAULT_DB_PORT,
            user: DEFAULT_DB_USER.to_string(),
            password: None,
            schema: DEFAULT_DB_SCHEMA.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("schema", &self.schema)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl DatabaseConfig {
    /// Read connection settings from the environment, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env::var(ENV_DB_HOST).unwrap_or(defaults.host),
            port: env::var(ENV_DB_PORT)
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            user: env::var(ENV_DB_USER).unwrap_or(defaults.user),
            password: env::var(ENV_DB_PASSWORD).ok().filter(|p| !p.is_empty()),
            schema: env::var(ENV_DB_SCHEMA).unwrap_or(defaults.schema),
            max_connections: env::var(ENV_DB_MAX_CONNECTIONS)
                .ok()
                .and_then(|n| n.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_connections),
        }
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.schema);

        match &self.password {
            Some(password) => options.password(password),
            None => options,
        }
    }
}

/// Open a connection pool and verify the store is reachable
pub async fn connect(config: &DatabaseConfig) -> Result<Gateway, DbError> {
    tracing::debug!(host = %config.host, port = config.port, schema = %config.schema, "Connecting to PostgreSQL");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(config.connect_options())
        .await?;

    tracing::info!(host = %config.host, port = config.port, "PostgreSQL connection established");

    Ok(Gateway::new(pool))
}

/// Create the tables this application reads and writes, if missing
pub async fn init_schema(gateway: &Gateway) -> Result<(), DbError> {
    const STATEMENTS: [&str; 10] = [
        r#"
        CREATE TABLE IF NOT EXISTS countries_real (
            country_id SERIAL PRIMARY KEY,
            country_name TEXT NOT NULL UNIQUE,
            population BIGINT NOT NULL,
            region TEXT,
            income_level TEXT
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS vaccinations (
            vaccination_id SERIAL PRIMARY KEY,
            country_id INTEGER NOT NULL REFERENCES countries_real(country_id),
            date_administered DATE NOT NULL,
            vaccine_type TEXT NOT NULL,
            age_group TEXT NOT NULL,
            dose_number INTEGER NOT NULL DEFAULT 1,
            doses_given INTEGER NOT NULL DEFAULT 0
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS contracts (
            contract_id SERIAL PRIMARY KEY,
            country_id INTEGER NOT NULL REFERENCES countries_real(country_id),
            total_doses BIGINT NOT NULL,
            price_per_dose DOUBLE PRECISION NOT NULL,
            manufacturer TEXT NOT NULL,
            contract_date DATE NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS adverse_events (
            event_id SERIAL PRIMARY KEY,
            vaccination_id INTEGER REFERENCES vaccinations(vaccination_id),
            country_id INTEGER NOT NULL REFERENCES countries_real(country_id),
            severity TEXT NOT NULL CHECK (severity IN ('Mild', 'Moderate', 'Severe')),
            description TEXT NOT NULL DEFAULT '',
            resolved BOOLEAN NOT NULL DEFAULT FALSE
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS shipments (
            shipment_id SERIAL PRIMARY KEY,
            contract_id INTEGER NOT NULL REFERENCES contracts(contract_id),
            doses_shipped INTEGER NOT NULL,
            shipment_date DATE
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS clinical_trials (
            trial_id SERIAL PRIMARY KEY,
            country_id INTEGER NOT NULL REFERENCES countries_real(country_id),
            phase TEXT NOT NULL,
            efficacy_rate DOUBLE PRECISION,
            participants INTEGER NOT NULL DEFAULT 0
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_vaccinations_country_date ON vaccinations(country_id, date_administered)",
        "CREATE INDEX IF NOT EXISTS idx_contracts_country ON contracts(country_id)",
        // Earlier schemas cascaded these deletes
        // TODO: drop once every deployed schema has been migrated
        r#"
        ALTER TABLE shipments
            DROP CONSTRAINT IF EXISTS shipments_contract_id_fkey,
            ADD CONSTRAINT shipments_contract_id_fkey
                FOREIGN KEY (contract_id) REFERENCES contracts(contract_id)
        "#,
        r#"
        ALTER TABLE adverse_events
            DROP CONSTRAINT IF EXISTS adverse_events_vaccination_id_fkey,
            ADD CONSTRAINT adverse_events_vaccination_id_fkey
                FOREIGN KEY (vaccination_id) REFERENCES vaccinations(vaccination_id)
        "#,
    ];

    for statement in STATEMENTS {
        gateway.execute_command(statement, Params::new()).await?;
    }

    tracing::info!("Database schema initialized");

    Ok(())
}

/// The process-wide store resource, created once at start-up
#[derive(Clone)]
pub enum Store {
    Connected(Gateway),
    /// Start-up could not reach the store; every store-backed view reports this
    Unavailable { reason: String },
}

impl Store {
    /// Connect and bootstrap the schema, recording a failure instead of exiting
    pub async fn open(config: &DatabaseConfig) -> Self {
        let gateway = match connect(config).await {
            Ok(gateway) => gateway,
            Err(e) => {
                tracing::error!(error = %e, host = %config.host, port = config.port, "Could not connect to the database, running without store access");
                return Store::Unavailable {
                    reason: e.to_string(),
                };
            }
        };

        match init_schema(&gateway).await {
            Ok(()) => Store::Connected(gateway),
            Err(e) => {
                tracing::error!(error = %e, "Could not initialize database schema, running without store access");
                Store::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn gateway(&self) -> Result<&Gateway, DbError> {
        match self {
            Store::Connected(gateway) => Ok(gateway),
            Store::Unavailable { reason } => Err(DbError::Unavailable(reason.clone())),
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Store::Connected(_))
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match self {
            Store::Connected(_) => None,
            Store::Unavailable { reason } => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password() {
        let config = DatabaseConfig {
            password: Some("hunter2".to_string()),
            ..DatabaseConfig::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_unavailable_store_reports_reason() {
        let store = Store::Unavailable {
            reason: "connection refused".to_string(),
        };
        assert!(!store.is_connected());
        assert_eq!(store.unavailable_reason(), Some("connection refused"));
        match store.gateway() {
            Err(DbError::Unavailable(reason)) => assert_eq!(reason, "connection refused"),
            _ => panic!("expected an unavailable store"),
        }
    }

    #[tokio::test]
    async fn test_schema_init_is_idempotent() {
        let Some(gateway) = testing::gateway().await else {
            return;
        };
        init_schema(&gateway).await.unwrap();
        init_schema(&gateway).await.unwrap();
    }
}
