//! DuckDB-based group source
//!
//! Answers the pager's queries with `GROUP BY` / `COUNT(*)` scans over a
//! table or a custom query. Group counts are read in keyset batches of
//! `batch_size`, so a scan that stops early never reads the whole table.

use crate::config::{check_identifier, SourceConfig};
use crate::error::{Error, Result};
use crate::source::{GroupCountStream, GroupSequenceSource};
use crate::types::{Direction, GroupCount, GroupedItem, KeyValue};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use duckdb::types::{TimeUnit, Value as DbValue};
use duckdb::{params_from_iter, Connection, Row};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// Days from 0001-01-01 (CE day 1) to 1970-01-01
const UNIX_EPOCH_CE_DAYS: i32 = 719_163;

/// Relation the groups are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation {
    /// Table or view name
    Table(String),
    /// Arbitrary SELECT statement
    Query(String),
}

impl Relation {
    /// SQL usable in a FROM clause
    fn from_clause(&self) -> String {
        match self {
            Self::Table(table) => table.clone(),
            Self::Query(query) => format!("({query}) AS src"),
        }
    }
}

/// A row of the relation together with its grouping value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Grouping value
    pub key: KeyValue,
    /// Full row as a JSON object
    pub fields: Value,
}

impl GroupedItem for Record {
    type Key = KeyValue;

    fn group_key(&self) -> &KeyValue {
        &self.key
    }
}

/// Group source backed by a DuckDB connection
pub struct DuckDbSource {
    /// DuckDB connection (not `Sync`, so guarded for concurrent pages)
    conn: Mutex<Connection>,
    relation: Relation,
    group_by: String,
    batch_size: usize,
}

impl std::fmt::Debug for DuckDbSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuckDbSource")
            .field("relation", &self.relation)
            .field("group_by", &self.group_by)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl DuckDbSource {
    /// Create a source over an open connection
    ///
    /// The table name and grouping column are spliced into generated SQL, so
    /// both must be plain identifiers (a table may be schema-qualified).
    pub fn new(
        conn: Connection,
        relation: Relation,
        group_by: impl Into<String>,
        batch_size: usize,
    ) -> Result<Self> {
        let group_by = group_by.into();
        if let Relation::Table(table) = &relation {
            check_identifier("table", table, true)?;
        }
        check_identifier("group_by", &group_by, false)?;

        Ok(Self {
            conn: Mutex::new(conn),
            relation,
            group_by,
            batch_size: batch_size.max(1),
        })
    }

    /// Open the database described by a source config
    pub fn open(config: &SourceConfig) -> Result<Self> {
        let conn = if config.database == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open(&config.database)
        }
        .map_err(|e| {
            Error::config(format!(
                "Failed to open DuckDB database '{}': {e}",
                config.database
            ))
        })?;

        let relation = match (&config.table, &config.query) {
            (Some(table), None) => Relation::Table(table.clone()),
            (None, Some(query)) => Relation::Query(query.clone()),
            _ => {
                return Err(Error::config(
                    "Source must define exactly one of 'table' or 'query'",
                ))
            }
        };

        tracing::debug!(
            "Opened DuckDB source '{}' grouped by {}",
            config.database,
            config.group_by
        );

        Self::new(conn, relation, &config.group_by, config.batch_size)
    }

    /// Run setup statements (DDL, inserts, extension loads) on the connection
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.lock()?.execute_batch(sql)?;
        Ok(())
    }

    pub fn relation(&self) -> &Relation {
        &self.relation
    }

    pub fn group_by(&self) -> &str {
        &self.group_by
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::source("DuckDB connection lock poisoned"))
    }

    /// Prepare and run a query, mapping every row with `map`
    fn query_rows<R, F>(&self, sql: &str, params: Vec<DbValue>, map: F) -> Result<Vec<R>>
    where
        F: FnMut(&Row<'_>) -> duckdb::Result<R>,
    {
        tracing::debug!("Executing query: {}", sql);

        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params_from_iter(params), map)?
            .collect::<duckdb::Result<Vec<R>>>()?;
        Ok(rows)
    }

    /// `WHERE` predicate comparing the grouping column against `key`
    fn predicate(&self, op: &str, key: &KeyValue, params: &mut Vec<DbValue>) -> String {
        let (placeholder, param) = bind_key(key);
        params.push(param);
        format!("{} {op} {placeholder}", self.group_by)
    }

    /// Fetch one batch of group counts starting from `bound`
    fn group_count_batch(
        &self,
        direction: Direction,
        bound: &KeyValue,
        inclusive: bool,
    ) -> Result<Vec<GroupCount<KeyValue>>> {
        let op = match (direction, inclusive) {
            (Direction::Forward, true) => ">=",
            (Direction::Forward, false) => ">",
            (Direction::Backward, true) => "<=",
            (Direction::Backward, false) => "<",
        };
        let mut params = Vec::new();
        let predicate = self.predicate(op, bound, &mut params);
        let sql = format!(
            "SELECT {col}, COUNT(*) FROM {rel} WHERE {predicate} GROUP BY {col} ORDER BY {col} {order} LIMIT {limit}",
            col = self.group_by,
            rel = self.relation.from_clause(),
            order = direction.sql_order(),
            limit = self.batch_size,
        );

        self.query_group_counts(&sql, params)
    }

    fn query_group_counts(
        &self,
        sql: &str,
        params: Vec<DbValue>,
    ) -> Result<Vec<GroupCount<KeyValue>>> {
        self.query_rows(sql, params, |row| {
            Ok((row.get::<_, DbValue>(0)?, row.get::<_, i64>(1)?))
        })?
        .into_iter()
        .map(|(key, count)| {
            let key = duckdb_value_to_key(key)?.ok_or(Error::NullGroupingValue)?;
            Ok(GroupCount::new(key, count as u64))
        })
        .collect()
    }

    /// Single grouping value returned by `sql`, if any row matched
    fn query_key(&self, sql: &str, params: Vec<DbValue>) -> Result<Option<KeyValue>> {
        let keys = self.query_rows(sql, params, |row| row.get::<_, DbValue>(0))?;
        match keys.into_iter().next() {
            Some(value) => duckdb_value_to_key(value)?
                .map(Some)
                .ok_or(Error::NullGroupingValue),
            None => Ok(None),
        }
    }

    /// Output column names of the relation, in order
    fn column_names(&self) -> Result<Vec<String>> {
        let sql = format!("DESCRIBE SELECT * FROM {}", self.relation.from_clause());
        self.query_rows(&sql, Vec::new(), |row| row.get::<_, String>(0))
    }

    /// `WHERE` predicate for the inclusive range between `start` and `end`
    fn range_predicate(
        &self,
        direction: Direction,
        start: &KeyValue,
        end: &KeyValue,
        params: &mut Vec<DbValue>,
    ) -> String {
        let (low, high) = match direction {
            Direction::Forward => (start, end),
            Direction::Backward => (end, start),
        };
        let lower = self.predicate(">=", low, params);
        let upper = self.predicate("<=", high, params);
        format!("{lower} AND {upper}")
    }
}

impl GroupSequenceSource for DuckDbSource {
    type Key = KeyValue;
    type Item = Record;

    fn ordered_group_counts(
        &self,
        direction: Direction,
        from: &KeyValue,
    ) -> Result<GroupCountStream<'_, KeyValue>> {
        Ok(Box::new(GroupCountCursor {
            source: self,
            direction,
            bound: from.clone(),
            inclusive: true,
            buffer: VecDeque::new(),
            exhausted: false,
        }))
    }

    fn first_group_key(&self, direction: Direction) -> Result<Option<KeyValue>> {
        // NULLs sort after every value ascending and before every value descending
        let nulls = match direction {
            Direction::Forward => "NULLS LAST",
            Direction::Backward => "NULLS FIRST",
        };
        let sql = format!(
            "SELECT {col} FROM {rel} ORDER BY {col} {order} {nulls} LIMIT 1",
            col = self.group_by,
            rel = self.relation.from_clause(),
            order = direction.sql_order(),
        );
        self.query_key(&sql, Vec::new())
    }

    fn next_group_key_beyond(&self, direction: Direction, key: &KeyValue) -> Result<Option<KeyValue>> {
        let op = if direction.is_forward() { ">" } else { "<" };
        let mut params = Vec::new();
        let predicate = self.predicate(op, key, &mut params);
        let sql = format!(
            "SELECT {col} FROM {rel} WHERE {predicate} ORDER BY {col} {order} LIMIT 1",
            col = self.group_by,
            rel = self.relation.from_clause(),
            order = direction.sql_order(),
        );
        self.query_key(&sql, params)
    }

    fn fetch_items(
        &self,
        direction: Direction,
        start: &KeyValue,
        end: &KeyValue,
    ) -> Result<Vec<Record>> {
        let columns = self.column_names()?;
        let width = columns.len();

        let mut params = Vec::new();
        let predicate = self.range_predicate(direction, start, end, &mut params);
        let sql = format!(
            "SELECT {col}, * FROM {rel} WHERE {predicate} ORDER BY {col} {order}",
            col = self.group_by,
            rel = self.relation.from_clause(),
            order = direction.sql_order(),
        );

        self.query_rows(&sql, params, |row| {
            let key = row.get::<_, DbValue>(0)?;
            let values = (1..=width)
                .map(|i| row.get::<_, DbValue>(i))
                .collect::<duckdb::Result<Vec<_>>>()?;
            Ok((key, values))
        })?
        .into_iter()
        .map(|(key, values)| {
            let key = duckdb_value_to_key(key)?.ok_or(Error::NullGroupingValue)?;
            let fields: Map<String, Value> = columns
                .iter()
                .cloned()
                .zip(values.into_iter().map(duckdb_value_to_json))
                .collect();
            Ok(Record {
                key,
                fields: Value::Object(fields),
            })
        })
        .collect()
    }

    fn fetch_group_counts(
        &self,
        direction: Direction,
        start: &KeyValue,
        end: &KeyValue,
    ) -> Result<Vec<GroupCount<KeyValue>>> {
        let mut params = Vec::new();
        let predicate = self.range_predicate(direction, start, end, &mut params);
        let sql = format!(
            "SELECT {col}, COUNT(*) FROM {rel} WHERE {predicate} GROUP BY {col} ORDER BY {col} {order}",
            col = self.group_by,
            rel = self.relation.from_clause(),
            order = direction.sql_order(),
        );
        self.query_group_counts(&sql, params)
    }

    fn count(&self) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.relation.from_clause());
        let counts = self.query_rows(&sql, Vec::new(), |row| row.get::<_, i64>(0))?;
        Ok(counts.into_iter().next().unwrap_or(0) as u64)
    }
}

/// Lazy group count stream reading `batch_size` groups per query
struct GroupCountCursor<'a> {
    source: &'a DuckDbSource,
    direction: Direction,
    /// Key the next batch starts from
    bound: KeyValue,
    /// Whether `bound` itself belongs to the next batch
    inclusive: bool,
    buffer: VecDeque<GroupCount<KeyValue>>,
    exhausted: bool,
}

impl Iterator for GroupCountCursor<'_> {
    type Item = Result<GroupCount<KeyValue>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            match self
                .source
                .group_count_batch(self.direction, &self.bound, self.inclusive)
            {
                Ok(batch) => {
                    self.exhausted = batch.len() < self.source.batch_size;
                    if let Some(last) = batch.last() {
                        self.bound = last.key.clone();
                        self.inclusive = false;
                    }
                    self.buffer.extend(batch);
                }
                Err(e) => {
                    self.exhausted = true;
                    return Some(Err(e));
                }
            }
        }
        self.buffer.pop_front().map(Ok)
    }
}

/// Placeholder and parameter binding a key in a query
fn bind_key(key: &KeyValue) -> (&'static str, DbValue) {
    match key {
        KeyValue::Int(i) => ("?", DbValue::BigInt(*i)),
        KeyValue::Text(s) => ("?", DbValue::Text(s.clone())),
        KeyValue::Date(d) => (
            "CAST(? AS DATE)",
            DbValue::Text(d.format("%Y-%m-%d").to_string()),
        ),
        KeyValue::Timestamp(ts) => (
            "CAST(? AS TIMESTAMP)",
            DbValue::Text(ts.format("%Y-%m-%d %H:%M:%S%.6f").to_string()),
        ),
    }
}

/// Convert a DuckDB value to a grouping key (`None` for NULL)
fn duckdb_value_to_key(value: DbValue) -> Result<Option<KeyValue>> {
    let key = match value {
        DbValue::Null => return Ok(None),
        DbValue::TinyInt(i) => KeyValue::Int(i.into()),
        DbValue::SmallInt(i) => KeyValue::Int(i.into()),
        DbValue::Int(i) => KeyValue::Int(i.into()),
        DbValue::BigInt(i) => KeyValue::Int(i),
        DbValue::UTinyInt(i) => KeyValue::Int(i.into()),
        DbValue::USmallInt(i) => KeyValue::Int(i.into()),
        DbValue::UInt(i) => KeyValue::Int(i.into()),
        DbValue::UBigInt(i) => KeyValue::Int(
            i64::try_from(i).map_err(|_| Error::source(format!("Key {i} overflows i64")))?,
        ),
        DbValue::HugeInt(i) => KeyValue::Int(
            i64::try_from(i).map_err(|_| Error::source(format!("Key {i} overflows i64")))?,
        ),
        DbValue::Text(s) => KeyValue::Text(s),
        DbValue::Date32(d) => date_from_epoch_days(d)
            .map(KeyValue::Date)
            .ok_or_else(|| Error::source(format!("Date {d} out of range")))?,
        // ns keys cannot round-trip through a microsecond `KeyValue::Timestamp`
        DbValue::Timestamp(TimeUnit::Nanosecond, _) => {
            return Err(Error::source(
                "Unsupported grouping column type: TIMESTAMP_NS",
            ))
        }
        DbValue::Timestamp(unit, i) => timestamp_from_unit(unit, i)
            .map(KeyValue::Timestamp)
            .ok_or_else(|| Error::source(format!("Timestamp {i} out of range")))?,
        other => {
            return Err(Error::source(format!(
                "Unsupported grouping column type: {other:?}"
            )))
        }
    };
    Ok(Some(key))
}

/// Date from DuckDB's days since 1970-01-01 (`None` for `infinity` and other out of range days)
fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_CE_DAYS)?)
}

/// Timestamp from a DuckDB epoch offset in `unit`
fn timestamp_from_unit(unit: TimeUnit, value: i64) -> Option<NaiveDateTime> {
    let dt = match unit {
        TimeUnit::Second => DateTime::from_timestamp(value, 0),
        TimeUnit::Millisecond => DateTime::from_timestamp_millis(value),
        TimeUnit::Microsecond => DateTime::from_timestamp_micros(value),
        TimeUnit::Nanosecond => Some(DateTime::from_timestamp_nanos(value)),
    };
    dt.map(|dt| dt.naive_utc())
}

/// Convert a DuckDB value to its JSON form in a record
fn duckdb_value_to_json(value: DbValue) -> Value {
    match value {
        DbValue::Null => Value::Null,
        DbValue::Boolean(b) => Value::Bool(b),
        DbValue::TinyInt(i) => Value::Number(i.into()),
        DbValue::SmallInt(i) => Value::Number(i.into()),
        DbValue::Int(i) => Value::Number(i.into()),
        DbValue::BigInt(i) => Value::Number(i.into()),
        DbValue::HugeInt(i) => Value::String(i.to_string()),
        DbValue::UTinyInt(i) => Value::Number(i.into()),
        DbValue::USmallInt(i) => Value::Number(i.into()),
        DbValue::UInt(i) => Value::Number(i.into()),
        DbValue::UBigInt(i) => Value::Number(i.into()),
        DbValue::Float(f) => {
            serde_json::Number::from_f64(f64::from(f)).map_or(Value::Null, Value::Number)
        }
        DbValue::Double(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
        DbValue::Text(s) => Value::String(s),
        DbValue::Blob(b) => Value::String(STANDARD.encode(b)),
        DbValue::Date32(d) => date_from_epoch_days(d)
            .map_or(Value::Number(d.into()), |date| {
                Value::String(date.format("%Y-%m-%d").to_string())
            }),
        DbValue::Timestamp(unit, i) => timestamp_from_unit(unit, i)
            .map_or(Value::Number(i.into()), |ts| {
                Value::String(ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
            }),
        other => Value::String(format!("{other:?}")),
    }
}
