use crate::utils::{file_stamp, Timestamp};
use chrono::{DateTime, TimeZone};
use prize_pool_lib::lenient;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

pub const DEFAULT_MAX_RECORDS: usize = 300;

pub const ANONYMOUS_PLAYER: &str = "神秘朋友";
const UNKNOWN_PRIZE: &str = "未知奖项";
const UNKNOWN_DETAIL: &str = "未填写具体内容";

const EXPORT_FILE_PREFIX: &str = "horse-lottery-records";

#[derive(Debug, thiserror::Error)]
pub enum RecordsError {
    #[error("there are no records to export")]
    NoRecords,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// One winning draw, as kept in the history log.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DrawRecord {
    pub id: String,
    pub timestamp: Timestamp,
    pub player_name: String,
    pub prize_name: String,
    pub prize_detail: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawDrawRecord {
    #[serde(default, deserialize_with = "lenient::present")]
    id: Option<Value>,
    #[serde(default, deserialize_with = "lenient::present")]
    timestamp: Option<Value>,
    #[serde(default, deserialize_with = "lenient::present")]
    player_name: Option<Value>,
    #[serde(default, deserialize_with = "lenient::present")]
    prize_name: Option<Value>,
    #[serde(default, deserialize_with = "lenient::present")]
    prize_detail: Option<Value>,
}

#[derive(Serialize)]
struct RecordRow<'a> {
    #[serde(rename = "Time")]
    #[serde(serialize_with = "crate::utils::serde::serialize_timestamp_as_local_time")]
    timestamp: Timestamp,
    #[serde(rename = "Player")]
    player_name: &'a str,
    #[serde(rename = "Prize")]
    prize_name: &'a str,
    #[serde(rename = "Detail")]
    prize_detail: &'a str,
    #[serde(rename = "Id")]
    id: &'a str,
}

impl<'a> From<&'a DrawRecord> for RecordRow<'a> {
    fn from(record: &'a DrawRecord) -> Self {
        Self {
            timestamp: record.timestamp,
            player_name: &record.player_name,
            prize_name: &record.prize_name,
            prize_detail: &record.prize_detail,
            id: &record.id,
        }
    }
}

/// 16 random bytes, hex encoded.
pub fn new_record_id<R: Rng>(rng: &mut R) -> String {
    hex::encode(rng.gen::<[u8; 16]>())
}

fn text_or(value: Option<&Value>, default: &str) -> String {
    value
        .and_then(lenient::truthy_text)
        .unwrap_or_else(|| default.to_string())
}

fn normalize_record<R: Rng>(raw: RawDrawRecord, now: Timestamp, rng: &mut R) -> DrawRecord {
    let timestamp = lenient::to_number(raw.timestamp.as_ref());
    DrawRecord {
        id: raw
            .id
            .as_ref()
            .and_then(lenient::truthy_text)
            .unwrap_or_else(|| new_record_id(rng)),
        timestamp: if timestamp.is_finite() && timestamp != 0.0 {
            timestamp as Timestamp
        } else {
            now
        },
        player_name: text_or(raw.player_name.as_ref(), ANONYMOUS_PLAYER),
        prize_name: text_or(raw.prize_name.as_ref(), UNKNOWN_PRIZE),
        prize_detail: text_or(raw.prize_detail.as_ref(), UNKNOWN_DETAIL),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_ref() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("unknown export format: {}", other)),
        }
    }
}

/// Draw history, newest first, holding at most `max_records` entries.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordLog {
    records: Vec<DrawRecord>,
    max_records: usize,
}

impl RecordLog {
    pub fn new(max_records: usize) -> Self {
        Self {
            records: Vec::new(),
            max_records,
        }
    }

    /// Rebuild the log from storage. Anything but an array yields an empty
    /// log, items that are not objects are dropped and missing fields are
    /// filled in.
    pub fn from_stored<R: Rng>(
        stored: Option<Value>,
        max_records: usize,
        now: Timestamp,
        rng: &mut R,
    ) -> Self {
        let records = match stored {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter(Value::is_object)
                .map(|item| serde_json::from_value::<RawDrawRecord>(item).unwrap_or_default())
                .map(|raw| normalize_record(raw, now, rng))
                .take(max_records)
                .collect(),
            _ => Vec::new(),
        };
        Self {
            records,
            max_records,
        }
    }

    pub fn records(&self) -> &[DrawRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn max_records(&self) -> usize {
        self.max_records
    }

    /// Put `record` in front, dropping the oldest entries past the cap.
    pub fn push(&mut self, record: DrawRecord) {
        self.records.insert(0, record);
        self.records.truncate(self.max_records);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Write the whole log into `dir` as `horse-lottery-records-<stamp>.<ext>`
    /// and return the path of the new file.
    pub fn export<Tz: TimeZone>(
        &self,
        dir: &Path,
        format: ExportFormat,
        now: &DateTime<Tz>,
    ) -> Result<PathBuf, RecordsError>
    where
        Tz::Offset: std::fmt::Display,
    {
        if self.records.is_empty() {
            return Err(RecordsError::NoRecords);
        }

        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!(
            "{}-{}.{}",
            EXPORT_FILE_PREFIX,
            file_stamp(now),
            format.extension()
        ));
        let file = File::create(&path)?;
        match format {
            ExportFormat::Json => serde_json::to_writer_pretty(file, &self.records)?,
            ExportFormat::Csv => {
                let mut writer = csv::Writer::from_writer(file);
                for record in &self.records {
                    writer.serialize(RecordRow::from(record))?;
                }
                writer.flush()?;
            }
        }
        info!(path = %path.display(), records = self.records.len(), "records exported");
        Ok(path)
    }
}

impl Serialize for RecordLog {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.records.serialize(serializer)
    }
}
