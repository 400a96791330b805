//! Contains the data models for API requests and responses.

use serde::{Deserialize, Deserializer, Serialize};

use crate::octoprint::PrinterStatus;

/// Compact description of the spool loaded on a printer.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CurrentSpool {
    pub id: String,
    pub name: String,
    pub material: String,
    pub color: String,
}

/// One entry of the `/api/printers` listing.
#[derive(Serialize, Debug, Clone)]
pub struct PrinterView {
    pub id: String,
    pub name: String,
    pub status: PrinterStatus,
    /// OctoPrint base URL; the page redirects there after an assignment.
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_spool: Option<CurrentSpool>,
}

#[derive(Serialize, Debug)]
pub struct PrintersResponse {
    pub printers: Vec<PrinterView>,
}

/// Flattened spool record for the selection page.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SpoolView {
    pub id: String,
    pub name: String,
    pub material: String,
    pub color: String,
    pub color_hex: String,
    pub vendor: String,
    pub weight: f64,
    pub used: f64,
    pub remaining: f64,
    pub filament_weight: f64,
}

#[derive(Serialize, Debug)]
pub struct SpoolsResponse {
    pub spools: Vec<SpoolView>,
}

/// Body of `POST /api/assign`. Tags may encode the spool id as a bare number.
#[derive(Deserialize, Debug)]
pub struct AssignRequest {
    #[serde(deserialize_with = "string_or_number")]
    pub spool_id: String,
    pub printer_id: String,
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }
    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

#[derive(Serialize, Debug)]
pub struct AssignResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize, Debug)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub printers: usize,
}

#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}
