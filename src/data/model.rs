use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use super::error::LoadError;

// ---------------------------------------------------------------------------
// Cell – a single value of a source sheet
// ---------------------------------------------------------------------------

/// A dynamically-typed spreadsheet cell, as read from any supported format.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Null => Ok(()),
        }
    }
}

impl Cell {
    /// Interpret the cell as a join key.
    ///
    /// Spreadsheet tools routinely store integer ids as floats (`12.0`), so an
    /// integral float is accepted. Text is parsed the same way.
    pub fn as_id(&self) -> Option<i64> {
        fn integral(v: f64) -> Option<i64> {
            (v.is_finite() && v.fract() == 0.0).then_some(v as i64)
        }
        match self {
            Cell::Integer(i) => Some(*i),
            Cell::Float(v) => integral(*v),
            Cell::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(integral))
            }
            Cell::Bool(_) | Cell::Null => None,
        }
    }

    /// Interpret the cell as a coordinate. NaN counts as absent.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            Cell::Float(v) => *v,
            Cell::Integer(i) => *i as f64,
            Cell::Text(s) => s.trim().parse::<f64>().ok()?,
            Cell::Bool(_) | Cell::Null => return None,
        };
        v.is_finite().then_some(v)
    }

    /// Interpret the cell as text. Empty text counts as absent.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::Text(s) if s.is_empty() => None,
            Cell::Float(v) if v.is_nan() => None,
            other => Some(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// RawTable – one sheet before typing
// ---------------------------------------------------------------------------

/// A header row plus data rows, exactly as read from a source file.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub path: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Index of a required column; a missing column is a load failure.
    pub fn column(&self, name: &str) -> Result<usize, LoadError> {
        self.headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| LoadError::MissingColumn {
                path: self.path.clone(),
                column: name.to_string(),
            })
    }

    /// Cell at `row`/`col`; short rows read as `Null`.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&Cell::Null)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

// ---------------------------------------------------------------------------
// Dimension – the three categorical filter axes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    Company,
    Category,
    Neighborhood,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [
        Dimension::Company,
        Dimension::Category,
        Dimension::Neighborhood,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Dimension::Company => "Company",
            Dimension::Category => "Category",
            Dimension::Neighborhood => "Neighborhood",
        }
    }
}

// ---------------------------------------------------------------------------
// PointRecord – one row of the joined table
// ---------------------------------------------------------------------------

/// A point of interest with valid coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct PointRecord {
    pub id: i64,
    pub name: Option<String>,
    pub company: Option<String>,
    pub category: Option<String>,
    pub neighborhood: Option<String>,
    pub address: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl PointRecord {
    pub fn value(&self, dim: Dimension) -> Option<&str> {
        match dim {
            Dimension::Company => self.company.as_deref(),
            Dimension::Category => self.category.as_deref(),
            Dimension::Neighborhood => self.neighborhood.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// PointTable – the complete joined dataset
// ---------------------------------------------------------------------------

/// The joined dataset with pre-computed distinct values per dimension.
#[derive(Debug, Clone, Default)]
pub struct PointTable {
    pub records: Vec<PointRecord>,
    /// Sorted distinct non-empty values of each dimension.
    pub distinct: BTreeMap<Dimension, BTreeSet<String>>,
}

impl PointTable {
    /// Build the distinct-value index from the joined records.
    pub fn from_records(records: Vec<PointRecord>) -> Self {
        let mut distinct: BTreeMap<Dimension, BTreeSet<String>> =
            Dimension::ALL.iter().map(|d| (*d, BTreeSet::new())).collect();

        for rec in &records {
            for dim in Dimension::ALL {
                if let Some(v) = rec.value(dim) {
                    distinct.entry(dim).or_default().insert(v.to_string());
                }
            }
        }
        PointTable { records, distinct }
    }

    pub fn distinct(&self, dim: Dimension) -> &BTreeSet<String> {
        static EMPTY: BTreeSet<String> = BTreeSet::new();
        self.distinct.get(&dim).unwrap_or(&EMPTY)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_float_ids_match_integers() {
        assert_eq!(Cell::Float(12.0).as_id(), Some(12));
        assert_eq!(Cell::Text(" 7 ".into()).as_id(), Some(7));
        assert_eq!(Cell::Text("7.0".into()).as_id(), Some(7));
        assert_eq!(Cell::Float(1.5).as_id(), None);
        assert_eq!(Cell::Null.as_id(), None);
    }

    #[test]
    fn nan_and_empty_are_absent() {
        assert_eq!(Cell::Float(f64::NAN).as_f64(), None);
        assert_eq!(Cell::Text(String::new()).as_text(), None);
        assert_eq!(Cell::Text("-25.4".into()).as_f64(), Some(-25.4));
    }

    #[test]
    fn distinct_values_skip_absent_fields() {
        let rec = |company: Option<&str>| PointRecord {
            id: 1,
            name: None,
            company: company.map(String::from),
            category: Some("Food".into()),
            neighborhood: None,
            address: None,
            lat: 0.0,
            lon: 0.0,
        };
        let table = PointTable::from_records(vec![rec(Some("Beta")), rec(None), rec(Some("Acme"))]);
        let companies: Vec<_> = table.distinct(Dimension::Company).iter().cloned().collect();
        assert_eq!(companies, vec!["Acme", "Beta"]);
        assert!(table.distinct(Dimension::Neighborhood).is_empty());
    }
}
