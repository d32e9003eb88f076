use serde::{Deserialize, Deserializer};

use crate::{
    Error,
    state::{GeoRecord, MapPosition},
};

/// Body returned by the geolocation service. Only the coordinates are
/// mandatory; everything else may be missing or null.
#[derive(Debug, Deserialize)]
pub struct GeoResponse {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub region_name: Option<String>,
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
    #[serde(default, deserialize_with = "postal_code")]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
}

impl GeoResponse {
    pub fn parse(body: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(body)?)
    }

    pub fn position(&self) -> Result<MapPosition, Error> {
        MapPosition::new(self.latitude, self.longitude)
    }

    /// `fallback_ip` is used when the service does not echo the address.
    pub fn into_record(self, fallback_ip: &str) -> GeoRecord {
        let location = format!(
            "{}, {}",
            self.region_name.unwrap_or_default(),
            self.country_name.unwrap_or_default()
        );
        let ip = match self.ip {
            Some(ip) if !ip.trim().is_empty() => ip,
            _ => fallback_ip.to_string(),
        };
        GeoRecord {
            ip,
            location,
            timezone: self.time_zone.unwrap_or_default(),
            postal_code: self.postal_code,
            city: self.city.unwrap_or_default(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PostalCode {
    Text(String),
    Number(u64),
}

fn postal_code<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let code = Option::<PostalCode>::deserialize(deserializer)?;
    Ok(code.and_then(|code| match code {
        PostalCode::Text(text) if text.trim().is_empty() => None,
        PostalCode::Text(text) => Some(text),
        PostalCode::Number(number) => Some(number.to_string()),
    }))
}
