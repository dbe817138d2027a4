use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const DEFAULT_USER_AGENT: &str = concat!("lottery-toolbox/", env!("CARGO_PKG_VERSION"));

const RESULT_LIMIT: &str = "8";
const ACCEPT_LANGUAGE: &str = "zh-CN";

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("geocoding request to {url} failed")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("geocoding service answered {status}")]
    UnexpectedStatus { status: reqwest::StatusCode },
}

/// A search hit, ready to become a marker.
#[derive(Clone, Debug, PartialEq)]
pub struct Place {
    pub display_name: String,
    pub lat: f64,
    pub lon: f64,
}

// Nominatim sends coordinates as strings.
#[derive(Deserialize)]
struct RawPlace {
    #[serde(default)]
    display_name: String,
    lat: String,
    lon: String,
}

impl RawPlace {
    fn into_place(self) -> Option<Place> {
        let lat = self.lat.trim().parse::<f64>().ok()?;
        let lon = self.lon.trim().parse::<f64>().ok()?;
        Some(Place {
            display_name: self.display_name,
            lat,
            lon,
        })
    }
}

/// Place search against a Nominatim compatible endpoint.
pub struct NominatimClient {
    client: Client,
    url: String,
}

impl NominatimClient {
    pub fn new(url: &str, user_agent: &str) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|source| GeocodeError::Http {
                url: url.to_string(),
                source,
            })?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Look `query` up. A blank query returns no places without contacting
    /// the service.
    #[instrument(skip(self))]
    pub fn search(&self, query: &str) -> Result<Vec<Place>, GeocodeError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let http_err = |source: reqwest::Error| GeocodeError::Http {
            url: self.url.clone(),
            source,
        };
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("format", "json"),
                ("addressdetails", "1"),
                ("limit", RESULT_LIMIT),
                ("accept-language", ACCEPT_LANGUAGE),
                ("q", query),
            ])
            .send()
            .map_err(http_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::UnexpectedStatus { status });
        }

        let raw: Vec<RawPlace> = response.json().map_err(http_err)?;
        let total = raw.len();
        let places = raw
            .into_iter()
            .filter_map(RawPlace::into_place)
            .collect::<Vec<_>>();
        if places.len() < total {
            warn!(dropped = total - places.len(), "ignoring places without coordinates");
        }
        debug!(found = places.len(), "geocoding done");
        Ok(places)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_query_does_not_hit_the_network() {
        // nothing listens on this port, any request would fail
        let client = NominatimClient::new("http://127.0.0.1:9/search", DEFAULT_USER_AGENT).unwrap();
        assert_eq!(client.search("   ").unwrap(), Vec::new());
    }

    #[test]
    fn raw_places_need_numeric_coordinates() {
        let raw: Vec<RawPlace> = serde_json::from_str(
            r#"[
                {"display_name": "京都市, 日本", "lat": "35.0116", "lon": "135.7681", "class": "place"},
                {"display_name": "nowhere", "lat": "", "lon": "1"}
            ]"#,
        )
        .unwrap();
        let places = raw
            .into_iter()
            .filter_map(RawPlace::into_place)
            .collect::<Vec<_>>();
        assert_eq!(
            places,
            vec![Place {
                display_name: "京都市, 日本".to_string(),
                lat: 35.0116,
                lon: 135.7681,
            }]
        );
    }
}
