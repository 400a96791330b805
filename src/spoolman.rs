//! Spoolman client and the subset of its spool schema the scanner uses.
//!
//! Spoolman leaves many fields null (vendor, color, weights), so every field
//! here decodes to its default when missing or null.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use std::time::Duration;

use crate::upstream::{http_client, ClientError, ClientResult, InventoryApi};

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Vendor {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Filament {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub material: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub color_hex: String,
    /// Net filament weight of a full spool, in grams.
    #[serde(default, deserialize_with = "null_as_default")]
    pub weight: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vendor: Vendor,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Spool {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub initial_weight: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub used_weight: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub archived: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub filament: Filament,
}

#[derive(Debug, Clone)]
pub struct SpoolmanClient {
    base_url: String,
    http: reqwest::Client,
}

impl SpoolmanClient {
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: http_client(timeout)?,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .map_err(ClientError::from_transport)?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound);
        }
        if status.is_client_error() || status.is_server_error() {
            return Err(ClientError::UpstreamRejected(format!("HTTP {}", status.as_u16())));
        }
        let body = response.bytes().await.map_err(ClientError::from_transport)?;
        serde_json::from_slice(&body).map_err(|e| ClientError::UpstreamProtocolError(e.to_string()))
    }
}

#[async_trait]
impl InventoryApi for SpoolmanClient {
    async fn get_spool(&self, spool_id: &str) -> ClientResult<Spool> {
        self.get_json(&format!("/api/v1/spool/{}", spool_id)).await
    }

    async fn list_spools(&self) -> ClientResult<Vec<Spool>> {
        self.get_json("/api/v1/spool").await
    }
}
