//! Shared fixtures for tests that need a live PostgreSQL
//!
//! Store-backed tests run only when `MRNA_TEST_DATABASE_URL` is set and
//! return early otherwise.

use sqlx::postgres::PgPoolOptions;
use tokio::sync::OnceCell;

use super::{DbError, Gateway, Params, init_schema};

const ENV_TEST_DATABASE_URL: &str = "MRNA_TEST_DATABASE_URL";

static PREPARED: OnceCell<()> = OnceCell::const_new();

pub const SEED_COUNTRIES: [(&str, i64, &str, &str); 3] = [
    ("Kenya", 53_000_000, "Africa", "Lower middle income"),
    ("Norway", 5_400_000, "Europe", "High income"),
    ("Russia", 144_000_000, "Europe", "Upper middle income"),
];

/// Connect to the test database, bootstrapping schema and seed rows once
pub async fn gateway() -> Option<Gateway> {
    let url = std::env::var(ENV_TEST_DATABASE_URL).ok()?;

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("test database should be reachable");
    let gateway = Gateway::new(pool);

    PREPARED
        .get_or_try_init(|| async {
            init_schema(&gateway).await?;
            seed_countries(&gateway).await
        })
        .await
        .expect("test database should accept the schema");

    Some(gateway)
}

async fn seed_countries(gateway: &Gateway) -> Result<(), DbError> {
    for (name, population, region, income_level) in SEED_COUNTRIES {
        gateway
            .execute_command(
                r#"
                INSERT INTO countries_real (country_name, population, region, income_level)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (country_name) DO NOTHING
                "#,
                Params::new()
                    .bind(name)
                    .bind(population)
                    .bind(region)
                    .bind(income_level),
            )
            .await?;
    }
    Ok(())
}

/// A value no other test run will have written
pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}
