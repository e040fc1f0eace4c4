use std::collections::{BTreeMap, BTreeSet};

use super::model::{Dimension, PointRecord, PointTable};

// ---------------------------------------------------------------------------
// Filter criteria: search text plus selected values per dimension
// ---------------------------------------------------------------------------

/// What the user currently has selected in the filter panel.
///
/// An empty selection for a dimension means nothing passes that dimension;
/// the only unfiltered view is "every value selected".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    /// Case-insensitive substring of the point name; empty = no constraint.
    pub search: String,
    pub selected: BTreeMap<Dimension, BTreeSet<String>>,
}

impl FilterCriteria {
    /// All distinct values selected and no search text (i.e. show everything).
    pub fn select_all(table: &PointTable) -> Self {
        FilterCriteria {
            search: String::new(),
            selected: Dimension::ALL
                .iter()
                .map(|d| (*d, table.distinct(*d).clone()))
                .collect(),
        }
    }

    pub fn selected(&self, dim: Dimension) -> Option<&BTreeSet<String>> {
        self.selected.get(&dim)
    }

    pub fn selected_mut(&mut self, dim: Dimension) -> &mut BTreeSet<String> {
        self.selected.entry(dim).or_default()
    }

    /// Whether a single record passes every active criterion.
    pub fn matches(&self, record: &PointRecord) -> bool {
        let in_selection = Dimension::ALL.iter().all(|dim| {
            match (record.value(*dim), self.selected(*dim)) {
                (Some(value), Some(selected)) => selected.contains(value),
                _ => false,
            }
        });
        in_selection && self.matches_search(record)
    }

    fn matches_search(&self, record: &PointRecord) -> bool {
        let needle = self.search.to_lowercase();
        if needle.is_empty() {
            return true;
        }
        record
            .name
            .as_deref()
            .is_some_and(|name| name.to_lowercase().contains(&needle))
    }
}

/// Return indices of records that pass all active filters.
pub fn filtered_indices(table: &PointTable, criteria: &FilterCriteria) -> Vec<usize> {
    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| criteria.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(id: i64, name: &str, company: &str, category: &str, neighborhood: &str) -> PointRecord {
        PointRecord {
            id,
            name: Some(name.to_string()),
            company: Some(company.to_string()),
            category: Some(category.to_string()),
            neighborhood: Some(neighborhood.to_string()),
            address: None,
            lat: -25.4,
            lon: -49.2,
        }
    }

    fn sample() -> PointTable {
        PointTable::from_records(vec![
            point(1, "Kiosk A", "Acme", "Food", "Centro"),
            point(2, "Other Point", "Beta", "Retail", "Batel"),
            point(3, "Kiosk C", "Acme", "Retail", "Batel"),
            PointRecord {
                company: None,
                ..point(4, "Orphan", "-", "Food", "Centro")
            },
        ])
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn default_criteria_keep_every_complete_record() {
        let table = PointTable::from_records(sample().records.into_iter().take(3).collect());
        let criteria = FilterCriteria::select_all(&table);
        assert_eq!(filtered_indices(&table, &criteria), vec![0, 1, 2]);
    }

    #[test]
    fn absent_company_never_matches() {
        let table = sample();
        let criteria = FilterCriteria::select_all(&table);
        assert!(!filtered_indices(&table, &criteria).contains(&3));
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let table = sample();
        let mut criteria = FilterCriteria::select_all(&table);
        criteria.search = "kIOSK".to_string();
        let names: Vec<_> = filtered_indices(&table, &criteria)
            .into_iter()
            .filter_map(|i| table.records[i].name.clone())
            .collect();
        assert_eq!(names, vec!["Kiosk A", "Kiosk C"]);
    }

    #[test]
    fn empty_selection_excludes_everything() {
        let table = sample();
        let mut criteria = FilterCriteria::select_all(&table);
        criteria.selected_mut(Dimension::Category).clear();
        assert!(filtered_indices(&table, &criteria).is_empty());
    }

    #[test]
    fn dimensions_combine_with_and() {
        let table = sample();
        let mut criteria = FilterCriteria::select_all(&table);
        *criteria.selected_mut(Dimension::Company) = set(&["Acme"]);
        *criteria.selected_mut(Dimension::Neighborhood) = set(&["Batel"]);
        assert_eq!(filtered_indices(&table, &criteria), vec![2]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let table = sample();
        let mut criteria = FilterCriteria::select_all(&table);
        criteria.search = "o".to_string();
        *criteria.selected_mut(Dimension::Category) = set(&["Retail"]);

        let once: Vec<PointRecord> = filtered_indices(&table, &criteria)
            .into_iter()
            .map(|i| table.records[i].clone())
            .collect();
        let once_table = PointTable::from_records(once.clone());
        let twice: Vec<PointRecord> = filtered_indices(&once_table, &criteria)
            .into_iter()
            .map(|i| once_table.records[i].clone())
            .collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn shrinking_a_selection_never_grows_the_result() {
        let table = sample();
        let full = FilterCriteria::select_all(&table);
        let baseline = filtered_indices(&table, &full).len();

        for dim in Dimension::ALL {
            for value in table.distinct(dim) {
                let mut narrowed = full.clone();
                narrowed.selected_mut(dim).remove(value);
                assert!(filtered_indices(&table, &narrowed).len() <= baseline);
            }
        }
    }
}
