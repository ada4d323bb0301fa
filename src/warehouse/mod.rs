//! Warehouse boundary for structured-query execution
//!
//! This module defines the row/value model exchanged with the transaction
//! warehouse and a postgres implementation that decodes result columns
//! dynamically. Temporal columns are converted to ISO-8601 text before any
//! JSON serialization; a column of an unsupported database type is a typed
//! error naming that type.

use crate::error::{FraudsightError, Result};
use crate::secrets::DbCredentials;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Column, Row as SqlxRow, TypeInfo};

/// A scalar value in a query-result column
///
/// Covers the JSON-native scalars plus the two temporal types the
/// transaction table uses; anything else is rejected during decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
}

impl SqlValue {
    /// Convert to a JSON value; temporal variants render as ISO-8601 text
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(i) => serde_json::Value::Number((*i).into()),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::Text(s) => serde_json::Value::String(s.clone()),
            Self::Timestamp(ts) => serde_json::Value::String(ts.to_rfc3339()),
            Self::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d").to_string()),
        }
    }
}

/// One query-result row: ordered (column name, value) pairs
#[derive(Debug, Clone, Default)]
pub struct Row {
    /// Columns in result-set order
    pub columns: Vec<(String, SqlValue)>,
}

impl Row {
    /// Build a row from (name, value) pairs
    pub fn new(columns: Vec<(String, SqlValue)>) -> Self {
        Self { columns }
    }

    /// Convert to a JSON object
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (name, value) in &self.columns {
            map.insert(name.clone(), value.to_json());
        }
        serde_json::Value::Object(map)
    }
}

/// Serialize rows as the JSON text handed back to the reasoning engine
///
/// An empty result set serializes as the literal `[]`, never null.
pub fn rows_to_json(rows: &[Row]) -> Result<String> {
    let values: Vec<serde_json::Value> = rows.iter().map(Row::to_json).collect();
    Ok(serde_json::to_string(&values)?)
}

/// Warehouse trait for structured-query execution
///
/// The query string is executed verbatim; the caller (the `retrieving_data_db`
/// capability) is responsible for input validation. Errors propagate to the
/// orchestrator, which converts them to the fallback response.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Execute a query and return all result rows
    async fn query(&self, sql: &str) -> Result<Vec<Row>>;
}

/// Build a lazily-connecting pool from credentials
///
/// The pool does not dial until the first query, so startup does not
/// require the database to be reachable. The same pool serves both the
/// warehouse queries and the vector index.
pub fn build_pool(credentials: &DbCredentials) -> Result<PgPool> {
    let url = format!(
        "postgres://{}:{}@{}/{}",
        credentials.user,
        credentials.password,
        credentials.instance_connection_name,
        credentials.database
    );
    PgPoolOptions::new()
        .max_connections(5)
        .connect_lazy(&url)
        .map_err(|e| FraudsightError::Warehouse(format!("Failed to build pool: {}", e)).into())
}

/// Postgres-backed warehouse
///
/// Holds a process-wide connection pool built once at startup from the
/// secret-derived credentials. Read-only from this system's perspective.
pub struct PgWarehouse {
    pool: PgPool,
}

impl PgWarehouse {
    /// Wrap an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build a warehouse with its own pool from credentials
    pub fn connect(credentials: &DbCredentials) -> Result<Self> {
        Ok(Self::new(build_pool(credentials)?))
    }

    /// Decode one postgres row into the scalar model
    fn decode_row(row: &PgRow) -> Result<Row> {
        let mut columns = Vec::with_capacity(row.columns().len());
        for (i, column) in row.columns().iter().enumerate() {
            let name = column.name().to_string();
            let type_name = column.type_info().name().to_string();
            let value = match type_name.as_str() {
                "BOOL" => row.try_get::<Option<bool>, _>(i)?.map(SqlValue::Bool),
                "INT2" => row
                    .try_get::<Option<i16>, _>(i)?
                    .map(|v| SqlValue::Int(v.into())),
                "INT4" => row
                    .try_get::<Option<i32>, _>(i)?
                    .map(|v| SqlValue::Int(v.into())),
                "INT8" => row.try_get::<Option<i64>, _>(i)?.map(SqlValue::Int),
                "FLOAT4" => row
                    .try_get::<Option<f32>, _>(i)?
                    .map(|v| SqlValue::Float(v.into())),
                "FLOAT8" => row.try_get::<Option<f64>, _>(i)?.map(SqlValue::Float),
                "TEXT" | "VARCHAR" | "BPCHAR" | "CHAR" | "NAME" => {
                    row.try_get::<Option<String>, _>(i)?.map(SqlValue::Text)
                }
                "TIMESTAMPTZ" => row
                    .try_get::<Option<DateTime<Utc>>, _>(i)?
                    .map(SqlValue::Timestamp),
                "TIMESTAMP" => row.try_get::<Option<NaiveDateTime>, _>(i)?.map(|v| {
                    SqlValue::Timestamp(DateTime::from_naive_utc_and_offset(v, Utc))
                }),
                "DATE" => row.try_get::<Option<NaiveDate>, _>(i)?.map(SqlValue::Date),
                other => {
                    return Err(FraudsightError::UnsupportedColumnType {
                        column: name,
                        type_name: other.to_string(),
                    }
                    .into());
                }
            };
            columns.push((name, value.unwrap_or(SqlValue::Null)));
        }
        Ok(Row::new(columns))
    }
}

#[async_trait]
impl Warehouse for PgWarehouse {
    async fn query(&self, sql: &str) -> Result<Vec<Row>> {
        tracing::debug!("Executing warehouse query: {}", sql);

        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| FraudsightError::Warehouse(format!("Query failed: {}", e)))?;

        rows.iter().map(Self::decode_row).collect()
    }
}
