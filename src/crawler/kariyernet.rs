//! kariyer.net search and detail API
//!
//! Search is a JSON POST returning `data.totalJobCount` and
//! `data.jobs.items[].id`; detail is a GET on `?jobId=` returning
//! `data.jobGeneralInformation` and `data.jobCompanyInformation`.

use crate::config::KariyerNetConfig;
use crate::crawler::{JobSource, SearchPage};
use crate::job::{JobRecord, UNKNOWN};
use crate::HarvestError;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

/// Website name accepted on the command line
pub const NAME: &str = "kariyernet";

/// Turkish month names as they appear in closing dates
const TURKISH_MONTHS: [(&str, &str); 12] = [
    ("Ocak", "January"),
    ("Şubat", "February"),
    ("Mart", "March"),
    ("Nisan", "April"),
    ("Mayıs", "May"),
    ("Haziran", "June"),
    ("Temmuz", "July"),
    ("Ağustos", "August"),
    ("Eylül", "September"),
    ("Ekim", "October"),
    ("Kasım", "November"),
    ("Aralık", "December"),
];

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    data: SearchData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchData {
    total_job_count: Option<u64>,
    #[serde(default)]
    jobs: Option<SearchJobs>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchJobs {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    id: Value,
}

#[derive(Debug, Deserialize)]
struct DetailEnvelope {
    data: DetailData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetailData {
    job_general_information: GeneralInformation,
    #[serde(default)]
    job_company_information: Option<CompanyInformation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneralInformation {
    title: String,
    #[serde(default)]
    confidential: Option<bool>,
    posting_date: String,
    closing_date: String,
    #[serde(default)]
    location_text: Option<String>,
    #[serde(default)]
    qualifications: Option<String>,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompanyInformation {
    #[serde(default)]
    company_name: Option<String>,
}

/// kariyer.net job source
#[derive(Debug, Clone)]
pub struct KariyerNet {
    config: KariyerNetConfig,
}

impl KariyerNet {
    pub fn new(config: KariyerNetConfig) -> Self {
        Self { config }
    }
}

impl JobSource for KariyerNet {
    fn name(&self) -> &str {
        NAME
    }

    fn search_url(&self) -> &str {
        &self.config.search_endpoint
    }

    fn page_size(&self) -> u32 {
        self.config.page_size
    }

    fn search_body(&self, page: u32) -> Value {
        json!({
            "memberId": 0,
            "currentPage": page,
            "size": self.config.page_size,
            "departments": self.config.departments,
            "sortType": "SortByDate",
            "sortDirection": "Descending",
        })
    }

    fn search_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    fn parse_search(&self, body: &str) -> Result<SearchPage, HarvestError> {
        let envelope: SearchEnvelope = serde_json::from_str(body)?;
        let data = envelope.data;

        let item_ids = data
            .jobs
            .unwrap_or_default()
            .items
            .into_iter()
            .filter_map(|item| {
                let id = id_to_string(&item.id);
                if id.is_none() {
                    tracing::warn!("Ignoring search item without id: {}", item.id);
                }
                id
            })
            .collect();

        Ok(SearchPage {
            total_count: data.total_job_count,
            item_ids,
        })
    }

    fn detail_url(&self, id: &str) -> Result<String, HarvestError> {
        let url = Url::parse_with_params(&self.config.detail_endpoint, &[("jobId", id)])?;
        Ok(url.into())
    }

    fn parse_detail(&self, id: &str, body: &str) -> Result<JobRecord, HarvestError> {
        let normalize_error = |message: String| HarvestError::Normalize {
            id: id.to_string(),
            message,
        };

        let envelope: DetailEnvelope =
            serde_json::from_str(body).map_err(|e| normalize_error(e.to_string()))?;
        let general = envelope.data.job_general_information;

        let company = if general.confidential.unwrap_or(false) {
            UNKNOWN.to_string()
        } else {
            envelope
                .data
                .job_company_information
                .and_then(|info| info.company_name)
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| UNKNOWN.to_string())
        };

        let date_posted = parse_posting_date(&general.posting_date).ok_or_else(|| {
            normalize_error(format!("unreadable posting date {:?}", general.posting_date))
        })?;
        let closing_date = parse_closing_date(&general.closing_date).ok_or_else(|| {
            normalize_error(format!("unreadable closing date {:?}", general.closing_date))
        })?;

        Ok(JobRecord {
            external_id: id.to_string(),
            source: NAME.to_string(),
            title: general.title.trim().to_string(),
            company,
            date_posted,
            closing_date,
            location: general.location_text.unwrap_or_default().trim().to_string(),
            salary: UNKNOWN.to_string(),
            details: general.qualifications.unwrap_or_default(),
            language: general.language.unwrap_or_default(),
        })
    }

    fn proxied(&self) -> bool {
        self.config.proxied
    }
}

/// Search ids arrive as numbers, occasionally as strings
fn id_to_string(id: &Value) -> Option<String> {
    match id {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Parses an ISO posting date, ignoring any time component
fn parse_posting_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Parses a closing date such as "12 Mart 2024"
fn parse_closing_date(raw: &str) -> Option<NaiveDate> {
    let mut translated = raw.trim().to_string();
    for (turkish, english) in TURKISH_MONTHS {
        translated = translated.replace(turkish, english);
    }

    NaiveDate::parse_from_str(&translated, "%d %B %Y")
        .ok()
        .or_else(|| parse_posting_date(raw))
}
