//! Query/command gateway: the only code that talks to the relational store
//!
//! Statements are always parameterized. Every call acquires a pooled
//! connection and returns it when the call completes; commands run inside
//! their own transaction.

use chrono::NaiveDate;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{FromRow, Postgres};

use super::DbError;

/// A single bound statement argument, positional (`$1`, `$2`, ...)
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Text(String),
    OptionalText(Option<String>),
    TextList(Vec<String>),
    Int(i32),
    OptionalInt(Option<i32>),
    BigInt(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::Text(value.to_string())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Param::Text(value)
    }
}

impl From<Option<String>> for Param {
    fn from(value: Option<String>) -> Self {
        Param::OptionalText(value)
    }
}

impl From<Vec<String>> for Param {
    fn from(value: Vec<String>) -> Self {
        Param::TextList(value)
    }
}

impl From<i32> for Param {
    fn from(value: i32) -> Self {
        Param::Int(value)
    }
}

impl From<Option<i32>> for Param {
    fn from(value: Option<i32>) -> Self {
        Param::OptionalInt(value)
    }
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Param::BigInt(value)
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Param::Float(value)
    }
}

impl From<bool> for Param {
    fn from(value: bool) -> Self {
        Param::Bool(value)
    }
}

impl From<NaiveDate> for Param {
    fn from(value: NaiveDate) -> Self {
        Param::Date(value)
    }
}

/// Ordered statement arguments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Vec<Param>);

impl Params {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append the next positional argument
    pub fn bind(mut self, value: impl Into<Param>) -> Self {
        self.0.push(value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.0.iter()
    }
}

// `Query` and `QueryAs` share `bind` by name only, not through a trait.
macro_rules! bind_params {
    ($query:expr, $params:expr) => {{
        let mut query = $query;
        for param in $params.iter() {
            query = match param {
                Param::Text(v) => query.bind(v.clone()),
                Param::OptionalText(v) => query.bind(v.clone()),
                Param::TextList(v) => query.bind(v.clone()),
                Param::Int(v) => query.bind(*v),
                Param::OptionalInt(v) => query.bind(*v),
                Param::BigInt(v) => query.bind(*v),
                Param::Float(v) => query.bind(*v),
                Param::Bool(v) => query.bind(*v),
                Param::Date(v) => query.bind(*v),
            };
        }
        query
    }};
}

#[derive(Clone)]
pub struct Gateway {
    pool: PgPool,
}

impl Gateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run a read statement and decode every row into `T`
    pub async fn run_query<T>(&self, statement: &str, params: Params) -> Result<Vec<T>, DbError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let rows = bind_params!(sqlx::query_as::<Postgres, T>(statement), params)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(rows = rows.len(), params = params.len(), "Query completed");
        Ok(rows)
    }

    /// Run a read statement expected to yield at most one row
    pub async fn run_query_optional<T>(
        &self,
        statement: &str,
        params: Params,
    ) -> Result<Option<T>, DbError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let row = bind_params!(sqlx::query_as::<Postgres, T>(statement), params)
            .fetch_optional(&self.pool)
            .await?;

        tracing::debug!(found = row.is_some(), "Query completed");
        Ok(row)
    }

    /// Execute a write statement in its own transaction
    ///
    /// Returns the number of rows affected. The transaction rolls back if the
    /// statement fails.
    pub async fn execute_command(&self, statement: &str, params: Params) -> Result<u64, DbError> {
        let mut tx = self.pool.begin().await?;

        let result = bind_params!(sqlx::query::<Postgres>(statement), params)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(rows_affected = result.rows_affected(), "Command committed");
        Ok(result.rows_affected())
    }

    /// Cheap liveness round trip
    pub async fn ping(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing;

    #[derive(Debug, FromRow)]
    struct Echo {
        name: String,
        doses: i64,
        flag: bool,
    }

    #[test]
    fn test_params_keep_bind_order() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 4).unwrap();
        let params = Params::new().bind("Kenya").bind(2_i32).bind(date).bind(None::<i32>);

        assert_eq!(params.len(), 4);
        let collected: Vec<&Param> = params.iter().collect();
        assert_eq!(collected[0], &Param::Text("Kenya".to_string()));
        assert_eq!(collected[1], &Param::Int(2));
        assert_eq!(collected[2], &Param::Date(date));
        assert_eq!(collected[3], &Param::OptionalInt(None));
    }

    #[test]
    fn test_empty_params() {
        assert!(Params::new().is_empty());
        assert_eq!(Params::default(), Params::new());
    }

    #[tokio::test]
    async fn test_query_binds_values_without_interpolation() {
        let Some(gateway) = testing::gateway().await else {
            return;
        };

        let hostile = "'; DROP TABLE contracts; --";
        let rows: Vec<Echo> = gateway
            .run_query(
                "SELECT $1::text AS name, $2::bigint AS doses, $3::boolean AS flag",
                Params::new().bind(hostile).bind(42_i64).bind(true),
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, hostile);
        assert_eq!(rows[0].doses, 42);
        assert!(rows[0].flag);
    }

    #[tokio::test]
    async fn test_optional_query_reports_absence() {
        let Some(gateway) = testing::gateway().await else {
            return;
        };

        let row: Option<Echo> = gateway
            .run_query_optional(
                "SELECT 'x'::text AS name, 1::bigint AS doses, false AS flag WHERE $1",
                Params::new().bind(false),
            )
            .await
            .unwrap();

        assert!(row.is_none());
    }

    #[tokio::test]
    async fn test_failed_command_propagates() {
        let Some(gateway) = testing::gateway().await else {
            return;
        };

        let result = gateway
            .execute_command("UPDATE no_such_table SET x = $1", Params::new().bind(1_i32))
            .await;

        assert!(matches!(result, Err(DbError::Query(_))));
        assert!(!result.unwrap_err().is_foreign_key_violation());
    }
}
