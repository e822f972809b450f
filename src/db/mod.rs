//! Append-only session store.
//!
//! All SQLite access happens on one dedicated worker thread; callers send
//! closures over a channel and await the result on a oneshot. Sessions and
//! samples live under a stable schema keyed by session id, one row per
//! decoded sample, auto-committed per insert.

use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use log::{error, info};
use rusqlite::{params, Connection};
use tokio::sync::oneshot;

mod migrations;

use crate::cache::DeviceRole;
use crate::models::{SensorSample, Session};
use migrations::run_migrations;

type DbTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum DbCommand {
    Execute(DbTask),
    Shutdown,
}

struct DatabaseInner {
    sender: mpsc::Sender<DbCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(DbCommand::Shutdown) {
                error!("Failed to send shutdown to DB thread: {err}");
            }
            if let Err(join_err) = handle.join() {
                error!("Failed to join DB thread: {join_err:?}");
            }
        }
    }
}

fn parse_datetime(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| anyhow!("invalid datetime '{value}': {err}"))
}

fn role_from_column(value: &str) -> Result<DeviceRole> {
    DeviceRole::from_str(value).ok_or_else(|| anyhow!("unknown imu_name '{value}'"))
}

/// One row of the read contract consumed by the offline visualization
/// tool: `(time, acc_x, acc_y, acc_z, imu_name)` ordered by `time`.
#[derive(Debug, Clone, Copy)]
pub struct AccelerationRow {
    pub time: f64,
    pub acc: [f32; 3],
    pub role: DeviceRole,
}

#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
    db_path: Arc<PathBuf>,
}

impl Database {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let (command_tx, command_rx) = mpsc::channel::<DbCommand>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let path_for_thread = db_path.clone();

        let worker = thread::Builder::new()
            .name("posture-db".into())
            .spawn(move || {
                let mut conn = match Connection::open(&path_for_thread) {
                    Ok(connection) => connection,
                    Err(err) => {
                        let _ = ready_tx.send(Err(anyhow::Error::new(err)
                            .context("failed to open SQLite database")));
                        return;
                    }
                };

                if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
                    error!("Failed to enable WAL mode: {err}");
                }
                if let Err(err) = conn.pragma_update(None, "foreign_keys", "ON") {
                    error!("Failed to enable foreign keys: {err}");
                }

                let init_result =
                    run_migrations(&mut conn).context("failed to run database migrations");
                if ready_tx.send(init_result).is_err() {
                    error!("DB initialization receiver dropped before ready signal");
                    return;
                }

                while let Ok(command) = command_rx.recv() {
                    match command {
                        DbCommand::Execute(task) => {
                            task(&mut conn);
                        }
                        DbCommand::Shutdown => break,
                    }
                }

                info!("Database thread shutting down");
            })
            .with_context(|| "failed to spawn database worker thread")?;

        ready_rx
            .recv()
            .context("database worker exited before signaling readiness")??;

        info!("Database initialized at {}", db_path.as_path().display());

        Ok(Self {
            inner: Arc::new(DatabaseInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
            db_path: Arc::new(db_path),
        })
    }

    pub fn path(&self) -> &Path {
        self.db_path.as_path()
    }

    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sender = self.inner.sender.clone();
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = DbCommand::Execute(Box::new(move |conn| {
            let result = task(conn);
            if reply_tx.send(result).is_err() {
                error!("DB caller dropped before receiving result");
            }
        }));

        sender
            .send(command)
            .map_err(|err| anyhow!("failed to send command to DB thread: {err}"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("database thread terminated unexpectedly"))?
    }

    pub async fn insert_session(&self, session: &Session) -> Result<()> {
        let record = session.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO sessions (id, started_at, stopped_at, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    record.id,
                    record.started_at.to_rfc3339(),
                    record.stopped_at.as_ref().map(|dt| dt.to_rfc3339()),
                    record.created_at.to_rfc3339(),
                ],
            )
            .with_context(|| "failed to insert session")?;
            Ok(())
        })
        .await
    }

    pub async fn mark_session_stopped(
        &self,
        session_id: &str,
        stopped_at: DateTime<Utc>,
    ) -> Result<()> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            conn.execute(
                "UPDATE sessions SET stopped_at = ?1 WHERE id = ?2",
                params![stopped_at.to_rfc3339(), session_id],
            )
            .with_context(|| "failed to mark session stopped")?;
            Ok(())
        })
        .await
    }

    /// Append one decoded sample. The `processed` flag is written unset
    /// and the velocity/position columns are left NULL; both are reserved
    /// for a later derivation pass.
    pub async fn insert_sample(&self, sample: &SensorSample) -> Result<()> {
        let record = sample.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO samples (
                     session_id, time, imu_name,
                     acc_x, acc_y, acc_z,
                     gyro_x, gyro_y, gyro_z,
                     heading, pitch, roll,
                     steps, processed
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, 0)",
                params![
                    record.session_id,
                    record.time as f64,
                    record.role.as_str(),
                    record.frame.acc[0] as f64,
                    record.frame.acc[1] as f64,
                    record.frame.acc[2] as f64,
                    record.frame.gyro[0] as f64,
                    record.frame.gyro[1] as f64,
                    record.frame.gyro[2] as f64,
                    record.frame.orientation[0] as f64,
                    record.frame.orientation[1] as f64,
                    record.frame.orientation[2] as f64,
                    record.frame.steps as i64,
                ],
            )
            .with_context(|| "failed to insert sensor sample")?;
            Ok(())
        })
        .await
    }

    pub async fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, started_at, stopped_at, created_at
                 FROM sessions WHERE id = ?1",
            )?;
            let mut rows = stmt.query(params![session_id])?;
            if let Some(row) = rows.next()? {
                Ok(Some(session_from_row(row)?))
            } else {
                Ok(None)
            }
        })
        .await
    }

    /// All recorded sessions, newest first. This is what the offline
    /// visualization tool enumerates for its session picker.
    pub async fn list_sessions(&self) -> Result<Vec<Session>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, started_at, stopped_at, created_at
                 FROM sessions ORDER BY started_at DESC",
            )?;
            let mut rows = stmt.query([])?;
            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                sessions.push(session_from_row(row)?);
            }
            Ok(sessions)
        })
        .await
    }

    /// The visualization read contract: acceleration rows for one session
    /// ordered by `time` ascending.
    pub async fn samples_for_session(&self, session_id: &str) -> Result<Vec<AccelerationRow>> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT time, acc_x, acc_y, acc_z, imu_name
                 FROM samples WHERE session_id = ?1 ORDER BY time ASC",
            )?;
            let mut rows = stmt.query(params![session_id])?;
            let mut samples = Vec::new();
            while let Some(row) = rows.next()? {
                samples.push(AccelerationRow {
                    time: row.get::<_, f64>(0)?,
                    acc: [
                        row.get::<_, f64>(1)? as f32,
                        row.get::<_, f64>(2)? as f32,
                        row.get::<_, f64>(3)? as f32,
                    ],
                    role: role_from_column(&row.get::<_, String>(4)?)?,
                });
            }
            Ok(samples)
        })
        .await
    }

    pub async fn sample_count(&self, session_id: &str, role: DeviceRole) -> Result<u64> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM samples WHERE session_id = ?1 AND imu_name = ?2",
                params![session_id, role.as_str()],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
        .await
    }
}

fn session_from_row(row: &rusqlite::Row<'_>) -> Result<Session> {
    Ok(Session {
        id: row.get::<_, String>(0)?,
        started_at: parse_datetime(&row.get::<_, String>(1)?)?,
        stopped_at: row
            .get::<_, Option<String>>(2)?
            .map(|s| parse_datetime(&s))
            .transpose()?,
        created_at: parse_datetime(&row.get::<_, String>(3)?)?,
    })
}
