//! SQLite repository over the `stocks` and `currencies` tables

use super::repository::OrderedRepository;
use crate::error::{MetricsError, Result};
use crate::types::{
    format_timestamp, parse_timestamp, ExchangeRatePoint, PricePoint, Series, TimePoint,
    TimeRange, Timestamp,
};
use chrono::{DateTime, Utc};
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use std::path::Path;

/// `datetime` column as microseconds since the epoch, whatever text layout the row was written in
const DATETIME_MICROS: &str = "ts_micros(datetime)";

/// Register `ts_micros(text)`: NULL for text `parse_timestamp` rejects
fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "ts_micros",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text = ctx.get::<Option<String>>(0).ok().flatten();
            Ok(text
                .and_then(|s| parse_timestamp(&s).ok())
                .map(|ts| ts.timestamp_micros()))
        },
    )
}

trait Record: TimePoint + Sized {
    const TABLE: &'static str;
    const COLUMNS: &'static str;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

impl Record for PricePoint {
    const TABLE: &'static str = "stocks";
    const COLUMNS: &'static str = "symbol, datetime, open, high, low, close, volume";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(PricePoint {
            symbol: row.get(0)?,
            timestamp: row.get::<_, DateTime<Utc>>(1)?,
            open: row.get(2)?,
            high: row.get(3)?,
            low: row.get(4)?,
            close: row.get(5)?,
            volume: row.get(6)?,
        })
    }
}

impl Record for ExchangeRatePoint {
    const TABLE: &'static str = "currencies";
    const COLUMNS: &'static str = "symbol, datetime, open, high, low, close";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ExchangeRatePoint {
            pair: row.get(0)?,
            timestamp: row.get::<_, DateTime<Utc>>(1)?,
            open: row.get(2)?,
            high: row.get(3)?,
            low: row.get(4)?,
            close: row.get(5)?,
        })
    }
}

fn db_err(context: &str) -> impl Fn(rusqlite::Error) -> MetricsError + '_ {
    move |e| MetricsError::DatabaseError(format!("{}: {}", context, e))
}

/// Price database with SQLite backend
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Create or open database at path
    pub fn new(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path).map_err(db_err("Failed to open database"))?;
        log::debug!("Opened price database {}", db_path.display());

        let repo = Self::from_connection(conn)?;
        repo.create_tables()?;
        Ok(repo)
    }

    /// Open an existing database read-only; a missing file is an error, never created
    pub fn open_read_only(db_path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| {
            MetricsError::DatabaseError(format!(
                "Failed to open database {}: {}",
                db_path.display(),
                e
            ))
        })?;
        log::debug!("Opened price database {} read-only", db_path.display());
        Self::from_connection(conn)
    }

    /// Create in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().map_err(db_err("Failed to create in-memory database"))?;

        let repo = Self::from_connection(conn)?;
        repo.create_tables()?;
        Ok(repo)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        register_functions(&conn).map_err(db_err("Failed to register SQL functions"))?;
        Ok(Self { conn })
    }

    /// Create tables and indexes if missing
    pub fn create_tables(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS stocks (
                    id INTEGER PRIMARY KEY,
                    symbol VARCHAR(255),
                    datetime DATETIME,
                    open FLOAT,
                    high FLOAT,
                    low FLOAT,
                    close FLOAT,
                    volume FLOAT
                );
                CREATE TABLE IF NOT EXISTS currencies (
                    id INTEGER PRIMARY KEY,
                    symbol VARCHAR(255),
                    datetime DATETIME,
                    open FLOAT,
                    high FLOAT,
                    low FLOAT,
                    close FLOAT
                );
                CREATE INDEX IF NOT EXISTS idx_stocks_symbol_datetime ON stocks(symbol, datetime);
                CREATE INDEX IF NOT EXISTS idx_currencies_symbol_datetime ON currencies(symbol, datetime);",
            )
            .map_err(db_err("Failed to create tables"))
    }

    /// Insert one equity bar
    pub fn insert_price(&self, point: &PricePoint) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO stocks (symbol, datetime, open, high, low, close, volume)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    &point.symbol,
                    format_timestamp(point.timestamp),
                    point.open,
                    point.high,
                    point.low,
                    point.close,
                    point.volume,
                ],
            )
            .map_err(db_err("Failed to insert price"))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert one exchange-rate bar
    pub fn insert_rate(&self, point: &ExchangeRatePoint) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO currencies (symbol, datetime, open, high, low, close)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    &point.pair,
                    format_timestamp(point.timestamp),
                    point.open,
                    point.high,
                    point.low,
                    point.close,
                ],
            )
            .map_err(db_err("Failed to insert rate"))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert many equity bars in one transaction
    pub fn insert_prices(&mut self, points: &[PricePoint]) -> Result<usize> {
        let tx = self
            .conn
            .transaction()
            .map_err(db_err("Failed to start transaction"))?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO stocks (symbol, datetime, open, high, low, close, volume)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                )
                .map_err(db_err("Failed to prepare insert"))?;
            for p in points {
                stmt.execute(params![
                    &p.symbol,
                    format_timestamp(p.timestamp),
                    p.open,
                    p.high,
                    p.low,
                    p.close,
                    p.volume,
                ])
                .map_err(db_err("Failed to insert price"))?;
            }
        }
        tx.commit().map_err(db_err("Failed to commit prices"))?;
        Ok(points.len())
    }

    /// Insert many exchange-rate bars in one transaction
    pub fn insert_rates(&mut self, points: &[ExchangeRatePoint]) -> Result<usize> {
        let tx = self
            .conn
            .transaction()
            .map_err(db_err("Failed to start transaction"))?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO currencies (symbol, datetime, open, high, low, close)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )
                .map_err(db_err("Failed to prepare insert"))?;
            for p in points {
                stmt.execute(params![
                    &p.pair,
                    format_timestamp(p.timestamp),
                    p.open,
                    p.high,
                    p.low,
                    p.close,
                ])
                .map_err(db_err("Failed to insert rate"))?;
            }
        }
        tx.commit().map_err(db_err("Failed to commit rates"))?;
        Ok(points.len())
    }

    /// Distinct symbols in the `stocks` table
    pub fn symbols(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT symbol FROM stocks ORDER BY symbol")
            .map_err(db_err("Failed to prepare query"))?;
        let symbols = stmt
            .query_map([], |row| row.get(0))
            .map_err(db_err("Failed to query symbols"))?
            .collect::<rusqlite::Result<Vec<String>>>()
            .map_err(db_err("Failed to collect symbols"))?;
        Ok(symbols)
    }

    /// Row counts of `stocks` and `currencies`
    pub fn count(&self) -> Result<(usize, usize)> {
        let count = |table: &str| -> Result<usize> {
            let n: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })
                .map_err(db_err("Failed to count rows"))?;
            Ok(n as usize)
        };
        Ok((count("stocks")?, count("currencies")?))
    }

    fn ordered<P: Record>(&self, key: &str, range: Option<&TimeRange>) -> Result<Series<P>> {
        let sql = format!(
            "SELECT {cols} FROM {table}
             WHERE symbol = ?1
               AND (?2 IS NULL OR {dt} >= ?2)
               AND (?3 IS NULL OR {dt} <= ?3)
             ORDER BY {dt} ASC, id ASC",
            cols = P::COLUMNS,
            table = P::TABLE,
            dt = DATETIME_MICROS,
        );
        let start = range.and_then(|r| r.start).map(|t| t.timestamp_micros());
        let end = range.and_then(|r| r.end).map(|t| t.timestamp_micros());

        let mut stmt = self
            .conn
            .prepare_cached(&sql)
            .map_err(db_err("Failed to prepare query"))?;
        let points = stmt
            .query_map(params![key, start, end], P::from_row)
            .map_err(db_err("Failed to query series"))?
            .collect::<rusqlite::Result<Vec<P>>>()
            .map_err(db_err("Failed to read series"))?;

        log::debug!("Read {} {} rows for {}", points.len(), P::TABLE, key);
        Series::new(key, points)
    }

    /// First row by `order` whose timestamp compares `op` to `ts`, at microsecond precision
    fn neighbour<P: Record>(
        &self,
        key: &str,
        ts: Timestamp,
        op: &str,
        order: &str,
    ) -> Result<Option<P>> {
        let sql = format!(
            "SELECT {cols} FROM {table}
             WHERE symbol = ?1 AND {dt} {op} ?2
             ORDER BY {dt} {order}, id {order}
             LIMIT 1",
            cols = P::COLUMNS,
            table = P::TABLE,
            dt = DATETIME_MICROS,
            op = op,
            order = order,
        );
        self.conn
            .prepare_cached(&sql)
            .map_err(db_err("Failed to prepare query"))?
            .query_row(params![key, ts.timestamp_micros()], P::from_row)
            .optional()
            .map_err(db_err("Failed to query point"))
    }
}

impl OrderedRepository<PricePoint> for SqliteRepository {
    fn query_ordered(&self, key: &str, range: Option<&TimeRange>) -> Result<Series<PricePoint>> {
        self.ordered(key, range)
    }

    fn query_exact(&self, key: &str, ts: Timestamp) -> Result<Option<PricePoint>> {
        self.neighbour(key, ts, "=", "ASC")
    }

    fn query_greater(&self, key: &str, ts: Timestamp) -> Result<Option<PricePoint>> {
        self.neighbour(key, ts, ">", "ASC")
    }

    fn query_less(&self, key: &str, ts: Timestamp) -> Result<Option<PricePoint>> {
        self.neighbour(key, ts, "<", "DESC")
    }
}

impl OrderedRepository<ExchangeRatePoint> for SqliteRepository {
    fn query_ordered(
        &self,
        key: &str,
        range: Option<&TimeRange>,
    ) -> Result<Series<ExchangeRatePoint>> {
        self.ordered(key, range)
    }

    fn query_exact(&self, key: &str, ts: Timestamp) -> Result<Option<ExchangeRatePoint>> {
        self.neighbour(key, ts, "=", "ASC")
    }

    fn query_greater(&self, key: &str, ts: Timestamp) -> Result<Option<ExchangeRatePoint>> {
        self.neighbour(key, ts, ">", "ASC")
    }

    fn query_less(&self, key: &str, ts: Timestamp) -> Result<Option<ExchangeRatePoint>> {
        self.neighbour(key, ts, "<", "DESC")
    }
}
