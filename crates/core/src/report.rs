// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Daily facility report types.
//!
//! [`ReportPayload`] is what the queue stores and forwards: a JSON object the
//! queue never interprets. [`DailyReport`] is the typed form a facility user
//! fills in; it converts into a payload with the field names the reporting
//! API expects.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Keys owned by the queue. They are removed from every wire body.
pub const RESERVED_KEYS: [&str; 4] = ["id", "createdAt", "created_at", "status"];

/// Stock level of a tracked commodity (ORS, antibiotics).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockLevel {
    #[default]
    Normal,
    Low,
    Critical,
    Stockout,
}

impl StockLevel {
    /// Returns the spelling used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            StockLevel::Normal => "Normal",
            StockLevel::Low => "Low",
            StockLevel::Critical => "Critical",
            StockLevel::Stockout => "Stockout",
        }
    }
}

impl fmt::Display for StockLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StockLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(StockLevel::Normal),
            "low" => Ok(StockLevel::Low),
            "critical" => Ok(StockLevel::Critical),
            "stockout" | "stock-out" | "out" => Ok(StockLevel::Stockout),
            _ => Err(Error::InvalidStockLevel(s.to_string())),
        }
    }
}

/// A facility's daily surveillance report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReport {
    pub report_date: NaiveDate,
    #[serde(default)]
    pub fever_cases: u32,
    #[serde(default)]
    pub diarrhea_cases: u32,
    #[serde(default)]
    pub vomiting_cases: u32,
    #[serde(default)]
    pub respiratory_cases: u32,
    #[serde(default)]
    pub hospital_admissions: u32,
    #[serde(default)]
    pub severe_dehydration_cases: u32,
    #[serde(default)]
    pub unexplained_deaths: u32,
    #[serde(default)]
    pub bed_occupancy_rate: f64,
    #[serde(default)]
    pub ors_stock_level: StockLevel,
    #[serde(default)]
    pub antibiotics_stock_level: StockLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl DailyReport {
    /// Creates an empty report for the given date (all counts zero, stock normal).
    pub fn new(report_date: NaiveDate) -> Self {
        DailyReport {
            report_date,
            fever_cases: 0,
            diarrhea_cases: 0,
            vomiting_cases: 0,
            respiratory_cases: 0,
            hospital_admissions: 0,
            severe_dehydration_cases: 0,
            unexplained_deaths: 0,
            bed_occupancy_rate: 0.0,
            ors_stock_level: StockLevel::Normal,
            antibiotics_stock_level: StockLevel::Normal,
            notes: None,
        }
    }

    /// Checks the fields the type system cannot.
    pub fn validate(&self) -> Result<()> {
        if !self.bed_occupancy_rate.is_finite() || self.bed_occupancy_rate < 0.0 {
            return Err(Error::InvalidOccupancyRate(self.bed_occupancy_rate));
        }
        Ok(())
    }

    /// Validates the report and converts it into a queueable payload.
    pub fn into_payload(self) -> Result<ReportPayload> {
        self.validate()?;
        ReportPayload::from_value(serde_json::to_value(self)?)
    }
}

/// An opaque report body as captured from the user.
///
/// The payload is stored and transmitted exactly as given, except that
/// [`RESERVED_KEYS`] never reach the network (see [`ReportPayload::wire_body`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportPayload(Map<String, Value>);

impl ReportPayload {
    /// Wraps a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(ReportPayload(map)),
            _ => Err(Error::PayloadNotObject),
        }
    }

    /// Parses a payload from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(text)?)
    }

    /// Serializes the payload as stored (reserved keys included, if any).
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.0)?)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// The report date, when the payload carries one.
    pub fn report_date(&self) -> Option<&str> {
        self.0.get("report_date").and_then(Value::as_str)
    }

    /// The body to transmit: the payload minus queue-management keys.
    pub fn wire_body(&self) -> Map<String, Value> {
        self.0
            .iter()
            .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl From<Map<String, Value>> for ReportPayload {
    fn from(map: Map<String, Value>) -> Self {
        ReportPayload(map)
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
