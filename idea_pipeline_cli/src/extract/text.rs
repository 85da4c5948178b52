//! Line-oriented heuristics over the rendered page's visible text.
//!
//! Every function here is best-effort: a label that cannot be found yields
//! a `Missing` field, never an error.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::{ExtractedField, Keyword};

/// Lines scanned after a business-fit label.
const SECTION_WINDOW: usize = 15;
/// Lines this short (in chars) are headings or chrome, not prose.
const SECTION_MIN_LINE: usize = 10;
/// Stop collecting a section once it grows past this.
const SECTION_MAX_CHARS: usize = 600;

const CATEGORY_WINDOW: usize = 5;
const CATEGORY_LINE_LEN: std::ops::RangeInclusive<usize> = 3..=199;

const KEYWORD_NAME_LEN: std::ops::RangeInclusive<usize> = 3..=99;
const GROWTH_LOOKAHEAD: usize = 3;

const DATE_FORMATS: &[&str] = &["%B %d, %Y", "%b %d, %Y", "%Y-%m-%d", "%d %B %Y", "%m/%d/%Y"];

fn date_nav_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)previous\s*\|\s*([^|\n]+?)\s*\|\s*next").expect("valid regex"))
}

fn volume_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^([\d,]*\.?\d+)\s*([KMB])?\s+volume\b").expect("valid regex")
    })
}

fn volume_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^([\d,]*\.?\d+)\s*([KMB])?$").expect("valid regex"))
}

fn growth_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([+\-−]?\d[\d,]*(?:\.\d+)?)\s*%").expect("valid regex"))
}

/// Trimmed, non-empty lines.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty()).collect()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn find_label(lines: &[&str], synonyms: &[&str]) -> Option<usize> {
    lines.iter().position(|line| {
        let lower = line.to_lowercase();
        synonyms.iter().any(|s| lower.contains(s))
    })
}

/// Finds `Previous | <date> | Next` and parses the date; `None` when absent or unparseable.
pub fn published_date(text: &str) -> Option<NaiveDate> {
    let caps = date_nav_re().captures(text)?;
    let raw = caps.get(1)?.as_str().trim();
    let parsed = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok());
    if parsed.is_none() {
        tracing::debug!(raw, "unparseable publication date");
    }
    parsed
}

/// Prose following the first line that mentions one of `synonyms`.
pub fn section(lines: &[&str], synonyms: &[&str]) -> ExtractedField {
    let Some(start) = find_label(lines, synonyms) else {
        return ExtractedField::missing();
    };

    let mut collected = String::new();
    for line in lines.iter().skip(start + 1).take(SECTION_WINDOW) {
        if char_len(line) <= SECTION_MIN_LINE {
            continue;
        }
        if !collected.is_empty() {
            collected.push('\n');
        }
        collected.push_str(line);
        if char_len(&collected) > SECTION_MAX_CHARS {
            break;
        }
    }

    ExtractedField::found(collected)
}

/// `Label: value` on one line, or the label followed by a short value line.
pub fn category(lines: &[&str], synonyms: &[&str]) -> ExtractedField {
    let Some(idx) = find_label(lines, synonyms) else {
        return ExtractedField::missing();
    };

    if let Some((_, after)) = lines[idx].split_once(':') {
        let after = after.trim();
        if !after.is_empty() {
            return ExtractedField::found(after);
        }
    }

    lines
        .iter()
        .skip(idx + 1)
        .take(CATEGORY_WINDOW)
        .find(|l| CATEGORY_LINE_LEN.contains(&char_len(l)))
        .map(|l| ExtractedField::found(*l))
        .unwrap_or_else(ExtractedField::empty)
}

fn volume_from_parts(number: &str, suffix: Option<&str>) -> Option<u64> {
    let base: f64 = number.replace(',', "").parse().ok()?;
    let multiplier = match suffix.map(|s| s.to_ascii_uppercase()).as_deref() {
        Some("K") => 1e3,
        Some("M") => 1e6,
        Some("B") => 1e9,
        _ => 1.0,
    };
    let volume = (base * multiplier).round();
    if volume.is_finite() && volume >= 0.0 {
        Some(volume as u64)
    } else {
        None
    }
}

/// Parses `673K`, `1.2M`, `2B`, `12,400`.
pub fn parse_volume(raw: &str) -> Option<u64> {
    let caps = volume_re().captures(raw.trim())?;
    volume_from_parts(&caps[1], caps.get(2).map(|m| m.as_str()))
}

/// First signed percentage in `line`.
pub fn parse_growth(line: &str) -> Option<f64> {
    let caps = growth_re().captures(line)?;
    caps[1].replace('−', "-").replace(',', "").parse().ok()
}

fn keep_keyword(keyword: &Keyword) -> bool {
    keyword.volume > 0 && char_len(&keyword.name) > 2
}

/// Keyword blocks laid out as `name` / `<n> Volume` / `<±n>% Growth`.
pub fn keywords(lines: &[&str]) -> Vec<Keyword> {
    let mut found = Vec::new();

    for i in 1..lines.len() {
        let Some(caps) = volume_line_re().captures(lines[i]) else {
            continue;
        };
        let name = lines[i - 1];
        if !KEYWORD_NAME_LEN.contains(&char_len(name)) {
            continue;
        }
        let Some(volume) = volume_from_parts(&caps[1], caps.get(2).map(|m| m.as_str())) else {
            continue;
        };
        let growth = lines[i + 1..]
            .iter()
            .take(GROWTH_LOOKAHEAD)
            .take_while(|l| !volume_line_re().is_match(l))
            .find_map(|l| parse_growth(l))
            .unwrap_or(0.0);

        found.push(Keyword::new(name, volume, growth));
    }

    found.retain(keep_keyword);
    found
}

/// Pairs each non-numeric chart label with the numeric label that follows it.
pub fn chart_keywords(labels: &[String]) -> Vec<Keyword> {
    let mut found = Vec::new();
    let mut i = 0;
    while i + 1 < labels.len() {
        let name = labels[i].trim();
        if parse_volume(name).is_none() {
            if let Some(volume) = parse_volume(&labels[i + 1]) {
                found.push(Keyword::new(name, volume, 0.0));
                i += 2;
                continue;
            }
        }
        i += 1;
    }
    found.retain(keep_keyword);
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldStatus, Trend};

    #[test]
    fn date_from_navigation_bar() {
        let text = "Idea of the Day\nPrevious | March 5, 2024 | Next\nSomething";
        assert_eq!(published_date(text), NaiveDate::from_ymd_opt(2024, 3, 5));
    }

    #[test]
    fn malformed_date_is_unset() {
        assert_eq!(published_date("Previous | Soon | Next"), None);
        assert_eq!(published_date("no navigation here"), None);
    }

    #[test]
    fn alternate_date_formats() {
        assert_eq!(published_date("Previous | 2024-11-02 | Next"), NaiveDate::from_ymd_opt(2024, 11, 2));
        assert_eq!(published_date("previous|Jan 15, 2025|next"), NaiveDate::from_ymd_opt(2025, 1, 15));
    }

    #[test]
    fn volume_suffixes() {
        assert_eq!(parse_volume("673K"), Some(673_000));
        assert_eq!(parse_volume("673.0K"), Some(673_000));
        assert_eq!(parse_volume("1.2M"), Some(1_200_000));
        assert_eq!(parse_volume("2B"), Some(2_000_000_000));
        assert_eq!(parse_volume("12,400"), Some(12_400));
        assert_eq!(parse_volume("0"), Some(0));
        assert_eq!(parse_volume("Volume"), None);
    }

    #[test]
    fn growth_percentages() {
        assert_eq!(parse_growth("+45% Growth"), Some(45.0));
        assert_eq!(parse_growth("-12.5%"), Some(-12.5));
        assert_eq!(parse_growth("−30 %"), Some(-30.0));
        assert_eq!(parse_growth("Growth"), None);
    }

    #[test]
    fn grouped_growth_percentages() {
        assert_eq!(parse_growth("+1,200% Growth"), Some(1200.0));
        assert_eq!(parse_growth("-2,500.5%"), Some(-2500.5));

        let found = keywords(&split_lines("AI Agents\n40.5K Volume\n+9,900% Growth"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].growth_percent, 9900.0);
        assert_eq!(found[0].trend, Trend::Growing);
    }

    #[test]
    fn keyword_block() {
        let lines = split_lines("Email Marketing\n673.0K Volume\n+45% Growth");
        let found = keywords(&lines);
        assert_eq!(found, vec![Keyword::new("Email Marketing", 673_000, 45.0)]);
        assert_eq!(found[0].trend, Trend::Growing);
    }

    #[test]
    fn zero_volume_and_short_names_dropped() {
        let text = "Dead Keyword\n0 Volume\n+5%\nAI\n12K Volume\n+1%\nNewsletter tools\n1.2M Volume\n-20% Growth";
        let found = keywords(&split_lines(text));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Newsletter tools");
        assert_eq!(found[0].volume, 1_200_000);
        assert_eq!(found[0].trend, Trend::Declining);
    }

    #[test]
    fn growth_lookahead_stops_at_next_keyword() {
        let text = "first keyword\n10K Volume\nsecond keyword\n20K Volume\n+60% Growth";
        let found = keywords(&split_lines(text));
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].growth_percent, 0.0);
        assert_eq!(found[1].growth_percent, 60.0);
    }

    #[test]
    fn chart_labels_pair_up() {
        let labels: Vec<String> = ["Jan", "remote work", "4.4K", "7", "hiring tools", "900"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let found = chart_keywords(&labels);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "remote work");
        assert_eq!(found[0].volume, 4_400);
        assert_eq!(found[1].name, "hiring tools");
    }

    #[test]
    fn section_collects_following_prose() {
        let text = "Opportunities\nshort\nA big underserved market of freelancers.\nThey pay for tools.\nProblems\nNobody has solved invoicing well.";
        let lines = split_lines(text);
        let field = section(&lines, &["opportunit"]);
        assert_eq!(field.status, FieldStatus::Found);
        assert!(field.as_str().starts_with("A big underserved market of freelancers.\nThey pay for tools."));
        assert!(!field.as_str().contains("short"));
    }

    #[test]
    fn section_respects_length_cap() {
        let long_line = "x".repeat(250);
        let text = format!("Feasibility\n{long_line}\n{long_line}\n{long_line}\n{long_line}");
        let field = section(&split_lines(&text), &["feasibility"]);
        // Stops right after crossing 600 chars.
        assert_eq!(field.as_str().len(), 250 * 3 + 2);
    }

    #[test]
    fn section_found_vs_missing() {
        let lines = split_lines("Why Now\nok\nfine");
        assert_eq!(section(&lines, &["why now"]).status, FieldStatus::Empty);
        assert_eq!(section(&lines, &["feasibility"]).status, FieldStatus::Missing);
    }

    #[test]
    fn category_after_colon_or_next_line() {
        let lines = split_lines("Type: SaaS\nMain Competitor\n--\nFreshBooks\nMarket:\nB2B");
        assert_eq!(category(&lines, &["type:"]).as_str(), "SaaS");
        assert_eq!(category(&lines, &["main competitor"]).as_str(), "FreshBooks");
        assert_eq!(category(&lines, &["market:"]).as_str(), "B2B");
        assert_eq!(category(&lines, &["trend analysis"]).status, FieldStatus::Missing);
    }
}
