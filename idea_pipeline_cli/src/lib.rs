pub mod error;
pub mod extract;
pub mod fields;
pub mod metrics;
pub mod render;
pub mod translate;
pub mod utils;

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub use fields::{BusinessFitField, CategoryField, ExtractedField, FieldStatus};
pub use metrics::DerivedMetrics;

pub type BusinessFit = BTreeMap<BusinessFitField, ExtractedField>;
pub type Categorization = BTreeMap<CategoryField, ExtractedField>;

/// Everything the extractor pulled off one rendered page.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PageContent {
    pub source_url: String,
    pub title: String,
    pub published_date: Option<NaiveDate>,
    pub scraped_at: DateTime<Utc>,
    pub business_fit: BusinessFit,
    pub keywords: Vec<Keyword>,
    pub categorization: Categorization,
    pub open_graph: OpenGraph,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Keyword {
    pub name: String,
    pub volume: u64,
    pub growth_percent: f64,
    pub trend: Trend,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Growing,
    Stable,
    Declining,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct OpenGraph {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    #[serde(rename = "type")]
    pub og_type: Option<String>,
}

impl Trend {
    pub fn from_growth(growth_percent: f64) -> Self {
        if growth_percent > 10.0 {
            Trend::Growing
        } else if growth_percent < -10.0 {
            Trend::Declining
        } else {
            Trend::Stable
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Trend::Growing => "growing",
            Trend::Stable => "stable",
            Trend::Declining => "declining",
        }
    }
}

impl Keyword {
    pub fn new(name: impl Into<String>, volume: u64, growth_percent: f64) -> Self {
        Self {
            name: name.into(),
            volume,
            growth_percent,
            trend: Trend::from_growth(growth_percent),
        }
    }
}

impl PageContent {
    /// A page with every fixed-key field present and marked missing.
    pub fn new(source_url: String, title: String) -> Self {
        Self {
            source_url,
            title,
            published_date: None,
            scraped_at: Utc::now(),
            business_fit: BusinessFitField::ALL
                .into_iter()
                .map(|f| (f, ExtractedField::missing()))
                .collect(),
            keywords: Vec::new(),
            categorization: CategoryField::ALL
                .into_iter()
                .map(|f| (f, ExtractedField::missing()))
                .collect(),
            open_graph: OpenGraph::default(),
        }
    }

    pub fn business_fit_text(&self, field: BusinessFitField) -> &str {
        self.business_fit.get(&field).map(|f| f.as_str()).unwrap_or("")
    }

    pub fn category_text(&self, field: CategoryField) -> &str {
        self.categorization.get(&field).map(|f| f.as_str()).unwrap_or("")
    }

    /// Always recomputed from the current fields.
    pub fn derived_metrics(&self) -> DerivedMetrics {
        metrics::calculate(
            self.business_fit.values().map(|f| f.as_str()),
            self.categorization.values().map(|f| f.as_str()),
            &self.keywords,
        )
    }

    pub fn report(&self) -> PageReport<'_> {
        PageReport {
            page: self,
            derived_metrics: self.derived_metrics(),
        }
    }
}

/// Serializable view of a page with its metrics computed at serialization time.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageReport<'a> {
    #[serde(flatten)]
    pub page: &'a PageContent,
    pub derived_metrics: DerivedMetrics,
}
