//! Data loader: pulls the `housing_prices` relation from the configured
//! source and materializes it as a [`Dataset`].

use std::env;

use ndarray::Array2;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use thiserror::Error;

use super::Dataset;

/// Environment variable holding the data source connection string.
pub const DB_URI_VAR: &str = "DB_URI";

const QUERY: &str = "SELECT * FROM housing_prices";
const INDEX_COLUMN: &str = "id";

/// Errors from data loading
#[derive(Debug, Error)]
pub enum DataError {
    /// Required configuration is missing; raised before any I/O.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Connection or query failure, wrapping the original cause. Not
    /// retried.
    #[error("failed to load data from database: {0}")]
    Access(#[from] rusqlite::Error),

    /// The source relation does not have the expected shape.
    #[error("malformed housing_prices relation: {0}")]
    Malformed(String),
}

/// Result alias for loader operations
pub type Result<T> = std::result::Result<T, DataError>;

/// Load the housing table from the source named by `DB_URI`.
pub fn load_data() -> Result<Dataset> {
    let db_uri = env::var(DB_URI_VAR)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            DataError::Configuration(format!("{DB_URI_VAR} environment variable is not set"))
        })?;
    load_data_from(&db_uri)
}

/// Load the housing table from an explicit connection string.
///
/// Accepts a plain file path or a `sqlite://` URI. The connection is
/// bounded by this call: every exit path, including open and query
/// failures, releases it.
pub fn load_data_from(db_uri: &str) -> Result<Dataset> {
    let path = db_uri.strip_prefix("sqlite://").unwrap_or(db_uri);
    let conn = Connection::open(path)?;
    read_housing_table(&conn)
}

fn read_housing_table(conn: &Connection) -> Result<Dataset> {
    let mut stmt = conn.prepare(QUERY)?;
    let column_names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    let id_idx = column_names
        .iter()
        .position(|c| c == INDEX_COLUMN)
        .ok_or_else(|| {
            DataError::Malformed(format!("index column '{INDEX_COLUMN}' not found"))
        })?;
    let data_columns: Vec<String> = column_names
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != id_idx)
        .map(|(_, c)| c.clone())
        .collect();

    let mut ids = Vec::new();
    let mut cells = Vec::new();
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        ids.push(row.get::<_, i64>(id_idx)?);
        for (i, name) in column_names.iter().enumerate() {
            if i == id_idx {
                continue;
            }
            cells.push(cell_to_f64(row.get_ref(i)?, name)?);
        }
    }

    let n_rows = ids.len();
    let data = Array2::from_shape_vec((n_rows, data_columns.len()), cells)
        .map_err(|e| DataError::Malformed(format!("result shape: {e}")))?;

    log::info!("loaded {n_rows} rows and {} columns from housing_prices", data_columns.len());
    Ok(Dataset::new(ids, data_columns, data))
}

/// Numeric coercion for a single cell. Booleans arrive as SQLite integers.
fn cell_to_f64(value: ValueRef<'_>, column: &str) -> Result<f64> {
    match value {
        ValueRef::Integer(v) => Ok(v as f64),
        ValueRef::Real(v) => Ok(v),
        other => Err(DataError::Malformed(format!(
            "column '{column}' holds non-numeric value of type {}",
            other.data_type()
        ))),
    }
}
