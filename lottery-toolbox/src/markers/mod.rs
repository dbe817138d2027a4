pub mod geocode;

use crate::storage::{read_json, write_json, Storage, StorageError, MARKERS_KEY};
use prize_pool_lib::lenient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub use geocode::{GeocodeError, NominatimClient, Place};

pub const DEFAULT_EMOJI: &str = "📍";
pub const EXPORT_FILE_NAME: &str = "markers.json";

#[derive(Debug, thiserror::Error)]
pub enum MarkerError {
    #[error("there is no marker #{0}")]
    NoSuchMarker(usize),

    #[error("invalid coordinates ({lat}, {lng})")]
    InvalidCoordinates { lat: f64, lng: f64 },

    #[error("import rejected: {0}")]
    InvalidImport(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// A pinned place on the travel map.
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub lat: f64,
    pub lng: f64,
    pub emoji: String,
    pub title: String,
    pub notes: String,
    pub date: String,
    pub photo_link: String,
}

impl Marker {
    pub fn new(lat: f64, lng: f64, emoji: &str, title: &str) -> Result<Self, MarkerError> {
        check_coordinates(lat, lng)?;
        let emoji = emoji.trim();
        Ok(Self {
            lat,
            lng,
            emoji: if emoji.is_empty() {
                DEFAULT_EMOJI.to_string()
            } else {
                emoji.to_string()
            },
            title: title.to_string(),
            notes: String::new(),
            date: String::new(),
            photo_link: String::new(),
        })
    }

    /// Photos are only shown for http(s) links.
    pub fn has_photo(&self) -> bool {
        let link = self.photo_link.to_ascii_lowercase();
        link.starts_with("http://") || link.starts_with("https://")
    }

    /// Coordinates as shown to the user, 6 decimals each.
    pub fn coordinates(&self) -> String {
        format!("{:.6}, {:.6}", self.lat, self.lng)
    }

    fn icon_html(&self) -> String {
        format!("<div class=\"emoji-marker\">{}</div>", self.emoji)
    }
}

fn check_coordinates(lat: f64, lng: f64) -> Result<(), MarkerError> {
    if lat.is_finite() && lng.is_finite() {
        Ok(())
    } else {
        Err(MarkerError::InvalidCoordinates { lat, lng })
    }
}

/// The text between the first `>` and the `<` that follows it.
pub fn extract_emoji(html: &str) -> Option<&str> {
    html.match_indices('>').find_map(|(index, _)| {
        let rest = &html[index + 1..];
        match rest.find('<') {
            Some(end) if end > 0 => Some(&rest[..end]),
            _ => None,
        }
    })
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct StoredMarker {
    #[serde(default, deserialize_with = "lenient::present")]
    lat: Option<Value>,
    #[serde(default, deserialize_with = "lenient::present")]
    lng: Option<Value>,
    #[serde(default, deserialize_with = "lenient::present")]
    icon: Option<Value>,
    #[serde(default, deserialize_with = "lenient::present")]
    title: Option<Value>,
    #[serde(default, deserialize_with = "lenient::present")]
    notes: Option<Value>,
    #[serde(default, deserialize_with = "lenient::present")]
    date: Option<Value>,
    #[serde(default, deserialize_with = "lenient::present")]
    photo_link: Option<Value>,
}

impl From<&Marker> for StoredMarker {
    fn from(marker: &Marker) -> Self {
        let text = |s: &str| Some(Value::String(s.to_string()));
        Self {
            lat: Some(marker.lat.into()),
            lng: Some(marker.lng.into()),
            icon: text(&marker.icon_html()),
            title: text(&marker.title),
            notes: text(&marker.notes),
            date: text(&marker.date),
            photo_link: text(&marker.photo_link),
        }
    }
}

impl TryFrom<StoredMarker> for Marker {
    type Error = MarkerError;

    fn try_from(stored: StoredMarker) -> Result<Self, Self::Error> {
        let lat = lenient::to_number(stored.lat.as_ref());
        let lng = lenient::to_number(stored.lng.as_ref());
        check_coordinates(lat, lng)?;

        let text = |value: Option<Value>| {
            value
                .as_ref()
                .and_then(lenient::truthy_text)
                .unwrap_or_default()
        };
        let emoji = stored
            .icon
            .as_ref()
            .and_then(lenient::truthy_text)
            .as_deref()
            .and_then(extract_emoji)
            .unwrap_or(DEFAULT_EMOJI)
            .to_string();

        Ok(Self {
            lat,
            lng,
            emoji,
            title: text(stored.title),
            notes: text(stored.notes),
            date: text(stored.date),
            photo_link: text(stored.photo_link),
        })
    }
}

fn parse_item(item: Value) -> Result<Marker, MarkerError> {
    if !item.is_object() {
        return Err(MarkerError::InvalidImport(format!(
            "expected a marker object, found {}",
            item
        )));
    }
    Marker::try_from(serde_json::from_value::<StoredMarker>(item)?)
}

/// Changes applied by [`MarkerBook::edit`]; `None` keeps the current value.
#[derive(Clone, Debug, Default)]
pub struct MarkerEdit {
    pub title: Option<String>,
    pub notes: Option<String>,
    pub date: Option<String>,
    pub photo_link: Option<String>,
    pub emoji: Option<String>,
}

/// Every marker of the travel map, persisted after each change.
pub struct MarkerBook<S> {
    storage: S,
    markers: Vec<Marker>,
}

impl<S: Storage> MarkerBook<S> {
    /// Load the stored markers. Items that cannot be placed on the map are
    /// skipped.
    pub fn load(storage: S) -> Result<Self, MarkerError> {
        let markers = match read_json(&storage, MARKERS_KEY)? {
            Some(Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .filter_map(|(index, item)| match parse_item(item) {
                    Ok(marker) => Some(marker),
                    Err(e) => {
                        warn!(index, error = %e, "skipping stored marker");
                        None
                    }
                })
                .collect(),
            Some(_) => {
                warn!("stored markers are not a list, starting empty");
                Vec::new()
            }
            None => Vec::new(),
        };
        Ok(Self { storage, markers })
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    fn save(&mut self) -> Result<(), MarkerError> {
        let stored = self
            .markers
            .iter()
            .map(StoredMarker::from)
            .collect::<Vec<_>>();
        write_json(&mut self.storage, MARKERS_KEY, &stored)?;
        Ok(())
    }

    fn marker_mut(&mut self, index: usize) -> Result<&mut Marker, MarkerError> {
        self.markers
            .get_mut(index)
            .ok_or(MarkerError::NoSuchMarker(index))
    }

    pub fn add(&mut self, marker: Marker) -> Result<usize, MarkerError> {
        check_coordinates(marker.lat, marker.lng)?;
        self.markers.push(marker);
        self.save()?;
        Ok(self.markers.len() - 1)
    }

    pub fn edit(&mut self, index: usize, edit: MarkerEdit) -> Result<&Marker, MarkerError> {
        let marker = self.marker_mut(index)?;
        if let Some(title) = edit.title {
            marker.title = title;
        }
        if let Some(notes) = edit.notes {
            marker.notes = notes;
        }
        if let Some(date) = edit.date {
            marker.date = date;
        }
        if let Some(photo_link) = edit.photo_link {
            marker.photo_link = photo_link;
        }
        if let Some(emoji) = edit.emoji.filter(|emoji| !emoji.trim().is_empty()) {
            marker.emoji = emoji.trim().to_string();
        }
        self.save()?;
        Ok(&self.markers[index])
    }

    pub fn move_to(&mut self, index: usize, lat: f64, lng: f64) -> Result<&Marker, MarkerError> {
        check_coordinates(lat, lng)?;
        let marker = self.marker_mut(index)?;
        marker.lat = lat;
        marker.lng = lng;
        self.save()?;
        Ok(&self.markers[index])
    }

    pub fn remove(&mut self, index: usize) -> Result<Marker, MarkerError> {
        if index >= self.markers.len() {
            return Err(MarkerError::NoSuchMarker(index));
        }
        let removed = self.markers.remove(index);
        self.save()?;
        Ok(removed)
    }

    pub fn clear(&mut self) -> Result<(), MarkerError> {
        self.markers.clear();
        self.save()?;
        info!("markers cleared");
        Ok(())
    }

    /// Write the stored marker list, as is, to `dir/markers.json`.
    pub fn export(&self, dir: &Path) -> Result<PathBuf, MarkerError> {
        let raw = self
            .storage
            .get(MARKERS_KEY)?
            .filter(|raw| !raw.is_empty())
            .unwrap_or_else(|| "[]".to_string());
        std::fs::create_dir_all(dir)?;
        let path = dir.join(EXPORT_FILE_NAME);
        std::fs::write(&path, raw)?;
        info!(path = %path.display(), "markers exported");
        Ok(path)
    }

    /// Replace every marker with the content of an exported file. Nothing
    /// changes unless the whole input is valid.
    pub fn import(&mut self, content: &str) -> Result<usize, MarkerError> {
        let items = match serde_json::from_str::<Value>(content)? {
            Value::Array(items) => items,
            _ => {
                return Err(MarkerError::InvalidImport(
                    "expected a list of markers".to_string(),
                ))
            }
        };
        let markers = items
            .into_iter()
            .map(parse_item)
            .collect::<Result<Vec<_>, _>>()?;
        self.markers = markers;
        self.save()?;
        info!(markers = self.markers.len(), "markers imported");
        Ok(self.markers.len())
    }

    pub fn into_storage(self) -> S {
        self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::tests::scratch_dir;
    use crate::storage::MemoryStorage;
    use serde_json::json;

    fn stored(markers: Value) -> MemoryStorage {
        let mut storage = MemoryStorage::new();
        write_json(&mut storage, MARKERS_KEY, &markers).unwrap();
        storage
    }

    #[test]
    fn emoji_extraction() {
        assert_eq!(
            extract_emoji("<div class=\"emoji-marker\">🏔️</div>"),
            Some("🏔️")
        );
        assert_eq!(extract_emoji("<b></b>x<"), Some("x"));
        assert_eq!(extract_emoji("📍"), None);
        assert_eq!(extract_emoji("<div>"), None);
    }

    #[test]
    fn photo_links_need_an_http_scheme() {
        let mut marker = Marker::new(1.0, 2.0, "", "").unwrap();
        assert_eq!(marker.emoji, DEFAULT_EMOJI);
        assert!(!marker.has_photo());
        marker.photo_link = "HTTPS://example.org/a.jpg".to_string();
        assert!(marker.has_photo());
        marker.photo_link = "ftp://example.org/a.jpg".to_string();
        assert!(!marker.has_photo());
        assert_eq!(marker.coordinates(), "1.000000, 2.000000");
    }

    #[test]
    fn load_reads_the_stored_layout() {
        let storage = stored(json!([
            {
                "lat": 48.8584, "lng": 2.2945,
                "icon": "<div class=\"emoji-marker\">🍜</div>",
                "title": "Paris", "notes": "", "date": "2025-05-01",
                "photoLink": "https://example.org/p.jpg"
            },
            {"lat": "35.0", "lng": 135.7, "icon": "📍", "title": null},
            {"lat": "north", "lng": 1.0},
            "garbage",
        ]));
        let book = MarkerBook::load(storage).unwrap();
        assert_eq!(book.len(), 2);

        let paris = &book.markers()[0];
        assert_eq!(paris.emoji, "🍜");
        assert_eq!(paris.date, "2025-05-01");
        assert!(paris.has_photo());

        let kyoto = &book.markers()[1];
        assert_eq!(kyoto.lat, 35.0);
        assert_eq!(kyoto.emoji, DEFAULT_EMOJI);
        assert_eq!(kyoto.title, "");
    }

    #[test]
    fn changes_are_persisted_in_the_stored_layout() {
        let mut book = MarkerBook::load(MemoryStorage::new()).unwrap();
        let index = book.add(Marker::new(10.0, 20.0, "⛺", "Camp").unwrap()).unwrap();
        book.edit(
            index,
            MarkerEdit {
                notes: Some("windy".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        book.move_to(index, 11.5, 21.5).unwrap();

        let storage = book.into_storage();
        assert_eq!(
            read_json(&storage, MARKERS_KEY).unwrap(),
            Some(json!([{
                "lat": 11.5, "lng": 21.5,
                "icon": "<div class=\"emoji-marker\">⛺</div>",
                "title": "Camp", "notes": "windy", "date": "", "photoLink": ""
            }]))
        );
        let reloaded = MarkerBook::load(storage).unwrap();
        assert_eq!(reloaded.markers()[0].emoji, "⛺");
    }

    #[test]
    fn out_of_range_indexes_are_reported() {
        let mut book = MarkerBook::load(MemoryStorage::new()).unwrap();
        assert!(matches!(book.remove(0), Err(MarkerError::NoSuchMarker(0))));
        assert!(matches!(
            book.move_to(3, 1.0, 1.0),
            Err(MarkerError::NoSuchMarker(3))
        ));
        assert!(matches!(
            Marker::new(f64::NAN, 0.0, "", ""),
            Err(MarkerError::InvalidCoordinates { .. })
        ));

        book.add(Marker::new(0.0, 0.0, "", "").unwrap()).unwrap();
        assert!(matches!(
            book.move_to(0, f64::INFINITY, 0.0),
            Err(MarkerError::InvalidCoordinates { .. })
        ));
        assert_eq!(book.markers()[0].lat, 0.0);
    }

    #[test]
    fn invalid_import_keeps_current_markers() {
        let mut book = MarkerBook::load(MemoryStorage::new()).unwrap();
        book.add(Marker::new(1.0, 1.0, "🏠", "Home").unwrap()).unwrap();

        assert!(matches!(book.import("{not json"), Err(MarkerError::Json(_))));
        assert!(matches!(
            book.import(r#"{"lat": 1}"#),
            Err(MarkerError::InvalidImport(_))
        ));
        assert!(book
            .import(r#"[{"lat": 1, "lng": 2}, {"lat": "x", "lng": 2}]"#)
            .is_err());
        assert_eq!(book.markers()[0].title, "Home");

        assert_eq!(book.import(r#"[{"lat": 1, "lng": 2, "title": "New"}]"#).unwrap(), 1);
        assert_eq!(book.markers()[0].title, "New");
    }

    #[test]
    fn export_then_import_restores_markers() {
        let dir = scratch_dir();
        let mut book = MarkerBook::load(MemoryStorage::new()).unwrap();
        book.add(Marker::new(1.0, 2.0, "🎡", "Fair").unwrap()).unwrap();
        let path = book.export(&dir).unwrap();
        assert!(path.ends_with(EXPORT_FILE_NAME));

        let exported = std::fs::read_to_string(&path).unwrap();
        book.clear().unwrap();
        assert!(book.is_empty());
        book.import(&exported).unwrap();
        assert_eq!(book.markers()[0].emoji, "🎡");

        std::fs::remove_dir_all(dir).unwrap();
    }
}
