// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared argument structs for CLI commands.

use chrono::NaiveDate;
use clap::Args;
use phip_core::{DailyReport, StockLevel};

use super::non_empty_string;

/// Fields of a daily report.
#[derive(Args, Clone, Debug, Default)]
pub struct ReportArgs {
    /// Report date, YYYY-MM-DD (default: today)
    #[arg(long, short, value_name = "date")]
    pub date: Option<NaiveDate>,

    /// Fever cases
    #[arg(long, default_value_t = 0)]
    pub fever: u32,

    /// Diarrhea cases
    #[arg(long, default_value_t = 0)]
    pub diarrhea: u32,

    /// Vomiting cases
    #[arg(long, default_value_t = 0)]
    pub vomiting: u32,

    /// Respiratory cases
    #[arg(long, default_value_t = 0)]
    pub respiratory: u32,

    /// Hospital admissions
    #[arg(long, default_value_t = 0)]
    pub admissions: u32,

    /// Severe dehydration cases
    #[arg(long, default_value_t = 0)]
    pub severe_dehydration: u32,

    /// Unexplained deaths
    #[arg(long, default_value_t = 0)]
    pub deaths: u32,

    /// Bed occupancy rate, percent
    #[arg(long, default_value_t = 0.0, value_name = "rate")]
    pub bed_occupancy: f64,

    /// ORS stock level (normal, low, critical, stockout)
    #[arg(long, default_value = "normal", value_parser = parse_stock_level, value_name = "level")]
    pub ors_stock: StockLevel,

    /// Antibiotics stock level (normal, low, critical, stockout)
    #[arg(long, default_value = "normal", value_parser = parse_stock_level, value_name = "level")]
    pub antibiotics_stock: StockLevel,

    /// Free-text notes
    #[arg(long, value_parser = non_empty_string)]
    pub notes: Option<String>,
}

impl ReportArgs {
    /// Builds the report, using `today` when no date was given.
    pub fn into_report(self, today: NaiveDate) -> DailyReport {
        DailyReport {
            report_date: self.date.unwrap_or(today),
            fever_cases: self.fever,
            diarrhea_cases: self.diarrhea,
            vomiting_cases: self.vomiting,
            respiratory_cases: self.respiratory,
            hospital_admissions: self.admissions,
            severe_dehydration_cases: self.severe_dehydration,
            unexplained_deaths: self.deaths,
            bed_occupancy_rate: self.bed_occupancy,
            ors_stock_level: self.ors_stock,
            antibiotics_stock_level: self.antibiotics_stock,
            notes: self.notes,
        }
    }
}

fn parse_stock_level(s: &str) -> Result<StockLevel, String> {
    s.parse::<StockLevel>().map_err(|e| e.to_string())
}
