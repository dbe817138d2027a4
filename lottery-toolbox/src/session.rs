use crate::draw::pick_prize;
use crate::editor::{collect_pool, EditorError, PoolEdit};
use crate::host::{HostError, HostGate};
use crate::records::{new_record_id, DrawRecord, ExportFormat, RecordLog, RecordsError, ANONYMOUS_PLAYER};
use crate::storage::{
    read_json, write_json, MemoryStorage, Storage, StorageError, HOST_PIN_KEY, POOL_KEY,
    RECORDS_KEY,
};
use crate::utils::Timestamp;
use crate::ToolboxConfig;
use chrono::{DateTime, TimeZone};
use prize_pool_lib::{default_pool, PoolOrigin, PrizeEntry, PrizePool};
use rand::Rng;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error(transparent)]
    Records(#[from] RecordsError),
}

/// Result of a single draw.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOutcome {
    /// Nothing in the pool can be drawn right now.
    Unavailable,
    Won { prize: PrizeEntry, record: DrawRecord },
}

/// Lottery state for one participant-facing session: the prize pool and draw
/// history backed by `S`, the host unlock flag backed by the session scoped
/// `T`.
pub struct DrawSession<S, T = MemoryStorage> {
    storage: S,
    session: T,
    pool: PrizePool,
    records: RecordLog,
    host: HostGate,
}

impl<S: Storage, T: Storage> DrawSession<S, T> {
    /// Load pool, records and host PIN. The pool is written back right away
    /// so storage always holds its normalized form.
    #[instrument(skip_all)]
    pub fn open<R: Rng>(
        mut storage: S,
        session: T,
        config: &ToolboxConfig,
        now: Timestamp,
        rng: &mut R,
    ) -> Result<Self, SessionError> {
        let (pool, origin) = PrizePool::from_stored(read_json(&storage, POOL_KEY)?);
        if origin == PoolOrigin::Defaults {
            info!("no usable stored prize pool, starting from the default one");
        }
        write_json(&mut storage, POOL_KEY, &pool)?;

        let records = RecordLog::from_stored(
            read_json(&storage, RECORDS_KEY)?,
            config.max_records,
            now,
            rng,
        );
        let host = HostGate::load(&storage, &session, &config.default_host_pin)?;

        Ok(Self {
            storage,
            session,
            pool,
            records,
            host,
        })
    }

    pub fn pool(&self) -> &PrizePool {
        &self.pool
    }

    pub fn records(&self) -> &RecordLog {
        &self.records
    }

    pub fn host(&self) -> &HostGate {
        &self.host
    }

    /// Draw one prize for `player` and log it. An unavailable pool is a
    /// regular outcome and leaves the history untouched.
    #[instrument(skip(self, rng))]
    pub fn draw_once<R: Rng>(
        &mut self,
        player: &str,
        rng: &mut R,
        now: Timestamp,
    ) -> Result<DrawOutcome, SessionError> {
        let prize = match pick_prize(self.pool.entries(), rng) {
            Some(prize) => prize.clone(),
            None => {
                warn!("prize pool has nothing to draw");
                return Ok(DrawOutcome::Unavailable);
            }
        };

        let player = player.trim();
        let record = DrawRecord {
            id: new_record_id(rng),
            timestamp: now,
            player_name: if player.is_empty() {
                ANONYMOUS_PLAYER.to_string()
            } else {
                player.to_string()
            },
            prize_name: prize.name.clone(),
            prize_detail: prize.detail.clone(),
        };
        let mut records = self.records.clone();
        records.push(record.clone());
        self.replace_records(records)?;
        info!(prize = %prize.id, "prize drawn");

        Ok(DrawOutcome::Won { prize, record })
    }

    pub fn unlock(&mut self, pin: &str) -> Result<(), SessionError> {
        let mut host = self.host.clone();
        host.unlock(pin)?;
        self.replace_host(host)?;
        info!("host mode unlocked");
        Ok(())
    }

    pub fn lock(&mut self) -> Result<(), SessionError> {
        let mut host = self.host.clone();
        host.lock();
        self.replace_host(host)
    }

    // The replace_* helpers persist first, so a failed write leaves the
    // session as it was.

    fn replace_host(&mut self, host: HostGate) -> Result<(), SessionError> {
        host.save_session(&mut self.session)?;
        self.host = host;
        Ok(())
    }

    fn replace_pool(&mut self, pool: PrizePool) -> Result<(), SessionError> {
        let pool = pool.normalized();
        write_json(&mut self.storage, POOL_KEY, &pool)?;
        self.pool = pool;
        Ok(())
    }

    fn replace_records(&mut self, records: RecordLog) -> Result<(), SessionError> {
        write_json(&mut self.storage, RECORDS_KEY, &records)?;
        self.records = records;
        Ok(())
    }

    /// Validate and store the host's edit of every slot.
    pub fn save_pool(&mut self, edits: Vec<PoolEdit>) -> Result<&PrizePool, SessionError> {
        self.host.ensure_unlocked()?;
        let next = collect_pool(edits, &self.pool)?;
        self.replace_pool(next)?;
        info!("prize pool saved");
        Ok(&self.pool)
    }

    pub fn reset_pool(&mut self) -> Result<&PrizePool, SessionError> {
        self.host.ensure_unlocked()?;
        self.replace_pool(default_pool())?;
        info!("prize pool reset to defaults");
        Ok(&self.pool)
    }

    pub fn export_records<Tz: TimeZone>(
        &self,
        dir: &Path,
        format: ExportFormat,
        now: &DateTime<Tz>,
    ) -> Result<PathBuf, SessionError>
    where
        Tz::Offset: std::fmt::Display,
    {
        self.host.ensure_unlocked()?;
        Ok(self.records.export(dir, format, now)?)
    }

    pub fn clear_records(&mut self) -> Result<(), SessionError> {
        self.host.ensure_unlocked()?;
        self.replace_records(RecordLog::new(self.records.max_records()))?;
        info!("draw records cleared");
        Ok(())
    }

    pub fn change_pin(&mut self, new_pin: &str) -> Result<(), SessionError> {
        let mut host = self.host.clone();
        let pin = host.change_pin(new_pin)?.to_string();
        self.storage.set(HOST_PIN_KEY, &pin)?;
        self.host = host;
        info!("host PIN updated");
        Ok(())
    }

    /// Hand back the underlying stores.
    pub fn into_storage(self) -> (S, T) {
        (self.storage, self.session)
    }
}
