//! Normalized job posting

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Placeholder recorded for a field the source deliberately withholds
pub const UNKNOWN: &str = "Unknown";

/// A single job posting as harvested from a source
///
/// Records are built once during the detail fetch of a listing and are not
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Identifier assigned by the source; unique within that source
    pub external_id: String,

    /// Source the posting was harvested from (e.g. "kariyernet")
    pub source: String,

    pub title: String,

    /// Hiring company, or [`UNKNOWN`] for confidential listings
    pub company: String,

    pub date_posted: NaiveDate,

    pub closing_date: NaiveDate,

    pub location: String,

    /// Salary text, or [`UNKNOWN`] when the source does not publish it
    pub salary: String,

    /// Free-text qualifications / description
    pub details: String,

    /// Language the advert is written in
    pub language: String,
}

impl JobRecord {
    /// Returns true if the company name was withheld
    pub fn is_company_hidden(&self) -> bool {
        self.company == UNKNOWN
    }
}
