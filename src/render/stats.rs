use std::collections::BTreeMap;

use crate::data::model::{Dimension, PointRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

/// Frequency tables behind the three summary charts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Charts {
    /// Bar chart, one bar per company.
    pub by_company: Vec<CategoryCount>,
    /// Pie chart, one slice per category.
    pub by_category: Vec<CategoryCount>,
    /// Bar chart of the busiest neighborhoods, colored by count.
    pub top_neighborhoods: Vec<CategoryCount>,
}

/// Count records per value of `dim`, most frequent first (ties by name).
/// Records without a value are not counted.
pub fn count_by(points: &[&PointRecord], dim: Dimension) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for rec in points {
        if let Some(value) = rec.value(dim) {
            *counts.entry(value).or_default() += 1;
        }
    }

    let mut counts: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(label, count)| CategoryCount {
            label: label.to_string(),
            count,
        })
        .collect();
    // BTreeMap order is by label, so a stable sort keeps ties alphabetical.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

pub fn build_charts(points: &[&PointRecord], top_neighborhoods: usize) -> Charts {
    let mut neighborhoods = count_by(points, Dimension::Neighborhood);
    neighborhoods.truncate(top_neighborhoods);

    Charts {
        by_company: count_by(points, Dimension::Company),
        by_category: count_by(points, Dimension::Category),
        top_neighborhoods: neighborhoods,
    }
}
