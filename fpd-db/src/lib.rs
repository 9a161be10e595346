//! In-memory SQLite snapshot of the cleaned fuel price table.
//!
//! This crate loads the cleaned survey records into an in-memory SQLite
//! database once and exposes typed, read-only query methods that produce
//! the derived aggregate tables behind each dashboard chart.
//!
//! # Architecture
//!
//! - `Arc<Mutex<Connection>>` wrapper so one snapshot can be shared by every
//!   request handler; the connection is only written while the snapshot is
//!   built in [`Database::from_table`]
//! - In-memory SQLite via `rusqlite`
//! - Typed query methods returning serializable structs from [`models`]
//!
//! # Usage
//!
//! ```rust
//! use fpd_db::Database;
//! use fpd_survey::clean_csv;
//!
//! let csv = "DATA INICIAL,DATA FINAL,REGIÃO,ESTADO,PRODUTO,PREÇO MÉDIO REVENDA\n\
//!            2020-01-05,2020-01-11,SUDESTE,SAO PAULO,GASOLINA COMUM,4.50\n";
//! let table = clean_csv(csv.as_bytes()).unwrap();
//! let db = Database::from_table(&table).unwrap();
//!
//! let extremes = db.query_yearly_extremes().unwrap();
//! assert_eq!(extremes.len(), 1);
//! ```

pub mod schema;
mod loader;
mod queries;
pub mod models;

use anyhow::anyhow;
use fpd_survey::CleanedTable;
use rusqlite::Connection;
use std::sync::{Arc, Mutex, MutexGuard};

/// Read-only snapshot of the cleaned survey table.
///
/// Cheaply cloneable (via `Arc`); every clone sees the same data.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Create an empty in-memory database with the schema applied.
    fn new() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::create_schema())?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Build the snapshot from a cleaned table.
    pub fn from_table(table: &CleanedTable) -> anyhow::Result<Self> {
        let db = Self::new()?;
        db.load_records(table.records())?;
        Ok(db)
    }

    fn conn(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database connection lock poisoned"))
    }
}
