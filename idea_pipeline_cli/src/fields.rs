use serde::{Deserialize, Serialize};

/// The seven prose sections of the business-fit breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BusinessFitField {
    Opportunities,
    Problems,
    WhyNow,
    Feasibility,
    RevenuePotential,
    ExecutionDifficulty,
    GoToMarket,
}

impl BusinessFitField {
    pub const ALL: [BusinessFitField; 7] = [
        BusinessFitField::Opportunities,
        BusinessFitField::Problems,
        BusinessFitField::WhyNow,
        BusinessFitField::Feasibility,
        BusinessFitField::RevenuePotential,
        BusinessFitField::ExecutionDifficulty,
        BusinessFitField::GoToMarket,
    ];

    /// Serialized key, also used in failed-field identifiers.
    pub fn key(self) -> &'static str {
        match self {
            BusinessFitField::Opportunities => "opportunities",
            BusinessFitField::Problems => "problems",
            BusinessFitField::WhyNow => "whyNow",
            BusinessFitField::Feasibility => "feasibility",
            BusinessFitField::RevenuePotential => "revenuePotential",
            BusinessFitField::ExecutionDifficulty => "executionDifficulty",
            BusinessFitField::GoToMarket => "goToMarket",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BusinessFitField::Opportunities => "Opportunities",
            BusinessFitField::Problems => "Problems",
            BusinessFitField::WhyNow => "Why Now",
            BusinessFitField::Feasibility => "Feasibility",
            BusinessFitField::RevenuePotential => "Revenue Potential",
            BusinessFitField::ExecutionDifficulty => "Execution Difficulty",
            BusinessFitField::GoToMarket => "Go-To-Market",
        }
    }

    /// Lowercase substrings that mark the line where this section starts.
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            BusinessFitField::Opportunities => &["opportunit"],
            BusinessFitField::Problems => &["problem", "pain point"],
            BusinessFitField::WhyNow => &["why now", "timing"],
            BusinessFitField::Feasibility => &["feasibility"],
            BusinessFitField::RevenuePotential => &["revenue potential", "revenue"],
            BusinessFitField::ExecutionDifficulty => &["execution difficulty", "difficulty"],
            BusinessFitField::GoToMarket => &["go-to-market", "go to market", "gtm"],
        }
    }
}

/// Short market/competitor classification fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CategoryField {
    Type,
    Market,
    TargetAudience,
    MainCompetitor,
    TrendAnalysis,
}

impl CategoryField {
    pub const ALL: [CategoryField; 5] = [
        CategoryField::Type,
        CategoryField::Market,
        CategoryField::TargetAudience,
        CategoryField::MainCompetitor,
        CategoryField::TrendAnalysis,
    ];

    pub fn key(self) -> &'static str {
        match self {
            CategoryField::Type => "type",
            CategoryField::Market => "market",
            CategoryField::TargetAudience => "targetAudience",
            CategoryField::MainCompetitor => "mainCompetitor",
            CategoryField::TrendAnalysis => "trendAnalysis",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CategoryField::Type => "Type",
            CategoryField::Market => "Market",
            CategoryField::TargetAudience => "Target Audience",
            CategoryField::MainCompetitor => "Main Competitor",
            CategoryField::TrendAnalysis => "Trend Analysis",
        }
    }

    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            CategoryField::Type => &["idea type", "type:", "business type"],
            CategoryField::Market => &["market:", "market type", "market size"],
            CategoryField::TargetAudience => &["target audience", "target:", "audience"],
            CategoryField::MainCompetitor => &["main competitor", "competitor"],
            CategoryField::TrendAnalysis => &["trend analysis"],
        }
    }
}

/// Whether a heuristic located its label and captured anything after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldStatus {
    Found,
    Empty,
    Missing,
}

/// A best-effort extracted value. `value` is empty unless `status` is `Found`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedField {
    pub value: String,
    pub status: FieldStatus,
}

impl ExtractedField {
    pub fn found(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            return Self::empty();
        }
        Self {
            value,
            status: FieldStatus::Found,
        }
    }

    pub fn empty() -> Self {
        Self {
            value: String::new(),
            status: FieldStatus::Empty,
        }
    }

    pub fn missing() -> Self {
        Self {
            value: String::new(),
            status: FieldStatus::Missing,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn is_found(&self) -> bool {
        self.status == FieldStatus::Found
    }
}
