use serde::{Deserialize, Serialize};

use crate::Keyword;

/// Keywords growing faster than this count as high-growth.
pub const HIGH_GROWTH_PERCENT: f64 = 50.0;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    pub word_count: usize,
    pub keyword_count: usize,
    pub avg_keyword_volume: u64,
    pub high_growth_keywords: usize,
}

pub fn calculate<'a>(
    business_fit: impl IntoIterator<Item = &'a str>,
    categorization: impl IntoIterator<Item = &'a str>,
    keywords: &[Keyword],
) -> DerivedMetrics {
    let word_count = business_fit
        .into_iter()
        .chain(categorization)
        .map(|text| text.split_whitespace().count())
        .sum();

    DerivedMetrics {
        word_count,
        keyword_count: keywords.len(),
        avg_keyword_volume: average_volume(keywords),
        high_growth_keywords: keywords
            .iter()
            .filter(|k| k.growth_percent > HIGH_GROWTH_PERCENT)
            .count(),
    }
}

fn average_volume(keywords: &[Keyword]) -> u64 {
    if keywords.is_empty() {
        return 0;
    }
    let total: u128 = keywords.iter().map(|k| k.volume as u128).sum();
    (total as f64 / keywords.len() as f64).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_all_zero() {
        let metrics = calculate(Vec::<&str>::new(), Vec::<&str>::new(), &[]);
        assert_eq!(metrics, DerivedMetrics::default());
    }

    #[test]
    fn average_is_rounded_mean() {
        let keywords = vec![
            Keyword::new("email marketing", 673_000, 45.0),
            Keyword::new("newsletter tools", 12_001, -3.0),
            Keyword::new("cold outreach", 2, 80.0),
        ];
        let metrics = calculate(["one two", ""], ["three"], &keywords);
        // (673000 + 12001 + 2) / 3 = 228334.33
        assert_eq!(metrics.avg_keyword_volume, 228_334);
        assert_eq!(metrics.keyword_count, 3);
        assert_eq!(metrics.high_growth_keywords, 1);
        assert_eq!(metrics.word_count, 3);
    }

    #[test]
    fn growth_of_exactly_fifty_is_not_high() {
        let keywords = vec![Keyword::new("edge", 10, 50.0), Keyword::new("over", 10, 50.5)];
        assert_eq!(calculate(Vec::<&str>::new(), Vec::<&str>::new(), &keywords).high_growth_keywords, 1);
    }

    #[test]
    fn words_split_on_any_whitespace() {
        let metrics = calculate(["  a\tb\n\nc  "], ["d   e"], &[]);
        assert_eq!(metrics.word_count, 5);
    }
}
