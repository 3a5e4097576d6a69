use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection};
use serde::Deserialize;

use super::crime::CrimePoint;
use super::error::Error;
use super::geo_util::BBox;

/// Extra margin added to every store query so incidents just outside the
/// requested box still count toward near-border segments.
const QUERY_BUFFER_DEG: f64 = 0.01;

/// Spatio-temporal crime query capability.
#[async_trait(?Send)]
pub trait CrimeStore {
    /// Incidents inside `bbox` (expanded by ~1 km) within the retention
    /// window, most recent first.
    async fn crimes_in_bbox(&self, bbox: BBox) -> Result<Vec<CrimePoint>, Error>;
}

/// An incident row to persist, as parsed from fixture files.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCrime {
    pub lat: f64,
    pub lng: f64,
    pub severity: u8,
    pub crime_type: String,
    pub occurred_at: DateTime<Utc>,
}

/// SQLite-backed store using a range scan over the indexed
/// `(lat, lng, occurred_at)` columns.
///
/// A connection is opened per query; the store itself holds no mutable
/// state and can be shared across requests.
pub struct SqliteCrimeStore {
    db_path: String,
    retention_days: i64,
}

impl SqliteCrimeStore {
    pub fn new(db_path: impl Into<String>, retention_days: i64) -> SqliteCrimeStore {
        SqliteCrimeStore {
            db_path: db_path.into(),
            retention_days,
        }
    }

    pub fn create_tables(&self) -> Result<(), Error> {
        let conn = Connection::open(&self.db_path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS crimes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                lat REAL NOT NULL,
                lng REAL NOT NULL,
                severity INTEGER NOT NULL,
                crime_type TEXT NOT NULL,
                occurred_at INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_crimes_lat_lng_occurred
                ON crimes (lat, lng, occurred_at);",
        )?;
        Ok(())
    }

    /// Bulk-inserts fixture incidents. Ingestion proper lives elsewhere;
    /// this exists for seeding and tests.
    pub fn insert_crimes(&self, rows: &[NewCrime]) -> Result<usize, Error> {
        let mut conn = Connection::open(&self.db_path)?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO crimes (lat, lng, severity, crime_type, occurred_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for row in rows {
                stmt.execute(params![
                    row.lat,
                    row.lng,
                    row.severity,
                    row.crime_type,
                    row.occurred_at.timestamp(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    fn query(&self, bbox: BBox, now: DateTime<Utc>) -> Result<Vec<CrimePoint>, Error> {
        let bbox = bbox.expanded(QUERY_BUFFER_DEG);
        let cutoff = now - Duration::days(self.retention_days);

        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(
            "SELECT lat, lng, severity, crime_type, occurred_at
             FROM crimes
             WHERE lat BETWEEN ?1 AND ?2
               AND lng BETWEEN ?3 AND ?4
               AND occurred_at >= ?5
             ORDER BY occurred_at DESC",
        )?;

        let rows = stmt.query_map(
            params![
                bbox.min_lat,
                bbox.max_lat,
                bbox.min_lng,
                bbox.max_lng,
                cutoff.timestamp()
            ],
            |row| {
                Ok((
                    row.get::<_, f64>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, u8>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            },
        )?;

        let mut crimes = Vec::new();
        for row in rows {
            let (lat, lng, severity, crime_type, epoch) = row?;
            let occurred_at = DateTime::from_timestamp(epoch, 0)
                .ok_or_else(|| Error::StoreUnavailable(format!("bad timestamp {epoch}")))?;
            let age_hours = (now - occurred_at).num_seconds() as f64 / 3600.0;
            crimes.push(CrimePoint {
                lat,
                lng,
                severity,
                crime_type,
                occurred_at,
                age_hours,
            });
        }
        log::debug!("store returned {} incidents", crimes.len());
        Ok(crimes)
    }
}

#[async_trait(?Send)]
impl CrimeStore for SqliteCrimeStore {
    async fn crimes_in_bbox(&self, bbox: BBox) -> Result<Vec<CrimePoint>, Error> {
        self.query(bbox, Utc::now())
    }
}
