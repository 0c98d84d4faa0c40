//! Alignment & aggregation engine
//!
//! Turns per-text entity results into a single comparison table:
//! - Scores are validated and rounded to two decimals once, on ingestion
//! - Entity names are unioned across texts; exact name match aligns rows
//! - Rows are ranked by the mean of their rounded scores
//! - Cells are formatted as fixed two-decimal strings, blank when absent
//!
//! Everything here is pure; no I/O happens in this module.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;
use serde_json::{Map, Value};

use salience_core::{EntityResult, EntityType, Result, SalienceError, TextLabel};

// ============================================================================
// Rounding
// ============================================================================

/// Round a score to two decimal places.
///
/// Rounds the exact binary value of `value`, so `0.3005` becomes `0.3` and
/// `2.675` (stored as 2.67499...) becomes `2.67`.
pub fn round_score(value: f64) -> f64 {
    // fixed-precision formatting is exact; parsing back yields the nearest f64
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Mean of the given scores rounded to two decimals, `None` when empty
pub fn mean_score(scores: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = scores
        .into_iter()
        .fold((0.0_f64, 0_usize), |(sum, count), s| (sum + s, count + 1));

    if count == 0 {
        None
    } else {
        Some(round_score(sum / count as f64))
    }
}

/// Render a score cell: two decimals when present, empty otherwise
pub fn format_score(score: Option<f64>) -> String {
    match score {
        Some(value) => format!("{value:.2}"),
        None => String::new(),
    }
}

// ============================================================================
// Per-text entity sets
// ============================================================================

/// An entity's type and rounded score within one text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredEntity {
    pub entity_type: EntityType,
    pub score: f64,
}

/// Entity results for every supplied text, keyed by label.
///
/// Iteration is always in label order (Original, Variation 1, Variation 2).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextEntitySet {
    sets: BTreeMap<TextLabel, HashMap<String, ScoredEntity>>,
}

impl TextEntitySet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest one text's raw extraction results.
    ///
    /// Every salience must be a finite number in [0, 1]; the whole batch is
    /// rejected otherwise and the set is left untouched. Duplicate names keep
    /// the last result. Returns the number of distinct entities stored.
    pub fn insert(
        &mut self,
        label: TextLabel,
        results: impl IntoIterator<Item = EntityResult>,
    ) -> Result<usize> {
        let mut entities = HashMap::new();

        for result in results {
            if !(0.0..=1.0).contains(&result.salience) {
                return Err(SalienceError::Data(format!(
                    "{label}: salience for '{}' is {}, expected a value in [0, 1]",
                    result.name, result.salience
                )));
            }

            entities.insert(
                result.name,
                ScoredEntity {
                    entity_type: result.entity_type,
                    // adding zero turns -0.0 into 0.0
                    score: round_score(result.salience) + 0.0,
                },
            );
        }

        let count = entities.len();
        self.sets.insert(label, entities);
        Ok(count)
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(
        mut self,
        label: TextLabel,
        results: impl IntoIterator<Item = EntityResult>,
    ) -> Result<Self> {
        self.insert(label, results)?;
        Ok(self)
    }

    /// Labels that were supplied, in fixed order
    pub fn labels(&self) -> Vec<TextLabel> {
        self.sets.keys().copied().collect()
    }

    /// Entities for a label, if that text was supplied
    pub fn get(&self, label: TextLabel) -> Option<&HashMap<String, ScoredEntity>> {
        self.sets.get(&label)
    }

    /// True when no text was supplied
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Number of distinct entity names across all texts
    pub fn entity_count(&self) -> usize {
        self.names().len()
    }

    fn names(&self) -> BTreeSet<&str> {
        self.sets
            .values()
            .flat_map(|entities| entities.keys().map(String::as_str))
            .collect()
    }
}

// ============================================================================
// Alignment
// ============================================================================

/// One entity's aggregated view across texts, before formatting
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub name: String,
    /// Type from the last label (in fixed order) containing the entity
    pub entity_type: EntityType,
    /// Rounded score per label where the entity is present
    pub scores: BTreeMap<TextLabel, f64>,
    /// Ranking key: mean of `scores`, rounded
    pub aggregate_score: Option<f64>,
}

/// Union entity names across texts and rank the resulting rows.
///
/// Rows are ordered by aggregate score descending, then by name ascending.
pub fn align(set: &TextEntitySet) -> Vec<ComparisonRow> {
    let mut rows: Vec<ComparisonRow> = set
        .names()
        .into_iter()
        .map(|name| {
            let mut entity_type = EntityType::Unknown;
            let mut scores = BTreeMap::new();

            for (label, entities) in &set.sets {
                if let Some(entity) = entities.get(name) {
                    entity_type = entity.entity_type;
                    scores.insert(*label, entity.score);
                }
            }

            let aggregate_score = mean_score(scores.values().copied());

            ComparisonRow {
                name: name.to_string(),
                entity_type,
                scores,
                aggregate_score,
            }
        })
        .collect();

    rows.sort_by(rank_order);
    rows
}

fn rank_order(a: &ComparisonRow, b: &ComparisonRow) -> Ordering {
    let by_score = match (a.aggregate_score, b.aggregate_score) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    by_score.then_with(|| a.name.cmp(&b.name))
}

// ============================================================================
// Comparison table
// ============================================================================

/// A display-ready row: every cell is a string
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub entity: String,
    pub entity_type: EntityType,
    /// One cell per table column
    pub cells: Vec<String>,
}

/// Ranked, formatted comparison of entities across texts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonTable {
    /// Score columns, in fixed label order
    pub columns: Vec<TextLabel>,
    pub rows: Vec<TableRow>,
}

impl ComparisonTable {
    /// Header line: `Entity`, `Type`, then one per label column
    pub fn headers(&self) -> Vec<String> {
        let mut headers = vec!["Entity".to_string(), "Type".to_string()];
        headers.extend(self.columns.iter().map(|l| l.to_string()));
        headers
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Find a row by entity name
    pub fn row(&self, entity: &str) -> Option<&TableRow> {
        self.rows.iter().find(|r| r.entity == entity)
    }

    /// Cell for an entity and label; `None` if either is not in the table
    pub fn cell(&self, entity: &str, label: TextLabel) -> Option<&str> {
        let column = self.columns.iter().position(|l| *l == label)?;
        self.row(entity)
            .and_then(|r| r.cells.get(column))
            .map(String::as_str)
    }

    /// One JSON object per row keyed by header name
    pub fn to_records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                let mut record = Map::new();
                record.insert("Entity".to_string(), Value::from(row.entity.clone()));
                record.insert("Type".to_string(), Value::from(row.entity_type.as_str()));
                for (label, cell) in self.columns.iter().zip(&row.cells) {
                    record.insert(label.to_string(), Value::from(cell.clone()));
                }
                record
            })
            .collect()
    }
}

/// Build the final comparison table for a set of texts.
///
/// An empty table means no entities were found anywhere; callers report
/// that to the user rather than rendering an empty grid.
pub fn build_comparison(set: &TextEntitySet) -> ComparisonTable {
    let columns = set.labels();

    let rows = align(set)
        .into_iter()
        .map(|row| TableRow {
            cells: columns
                .iter()
                .map(|label| format_score(row.scores.get(label).copied()))
                .collect(),
            entity: row.name,
            entity_type: row.entity_type,
        })
        .collect();

    ComparisonTable { columns, rows }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(name: &str, entity_type: EntityType, salience: f64) -> EntityResult {
        EntityResult::new(name, entity_type, salience)
    }

    fn paris_set() -> TextEntitySet {
        TextEntitySet::new()
            .with(
                TextLabel::Original,
                vec![entity("Paris", EntityType::Location, 0.41)],
            )
            .unwrap()
            .with(
                TextLabel::Variation1,
                vec![
                    entity("Paris", EntityType::Location, 0.55),
                    entity("Tour Eiffel", EntityType::Location, 0.10),
                ],
            )
            .unwrap()
    }

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(0.3005), 0.3);
        assert_eq!(round_score(0.41), 0.41);
        assert_eq!(round_score(0.999), 1.0);
        assert_eq!(round_score(2.675), 2.67);
        assert_eq!(round_score(0.0), 0.0);
    }

    #[test]
    fn test_mean_score() {
        assert_eq!(mean_score([0.41, 0.55]), Some(0.48));
        assert_eq!(mean_score([0.1]), Some(0.1));
        assert_eq!(mean_score([0.1, 0.2, 0.4]), Some(0.23));
        assert_eq!(mean_score(std::iter::empty()), None);
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(Some(0.3)), "0.30");
        assert_eq!(format_score(Some(round_score(0.3005))), "0.30");
        assert_eq!(format_score(Some(1.0)), "1.00");
        assert_eq!(format_score(None), "");
    }

    #[test]
    fn test_paris_scenario() {
        let table = build_comparison(&paris_set());

        assert_eq!(table.columns, vec![TextLabel::Original, TextLabel::Variation1]);
        assert_eq!(table.len(), 2);

        assert_eq!(table.rows[0].entity, "Paris");
        assert_eq!(table.rows[0].entity_type, EntityType::Location);
        assert_eq!(table.rows[0].cells, vec!["0.41", "0.55"]);

        assert_eq!(table.rows[1].entity, "Tour Eiffel");
        assert_eq!(table.rows[1].cells, vec!["", "0.10"]);
    }

    #[test]
    fn test_paris_aggregates() {
        let rows = align(&paris_set());

        assert_eq!(rows[0].aggregate_score, Some(0.48));
        assert_eq!(rows[1].aggregate_score, Some(0.1));
        assert!(!rows[1].scores.contains_key(&TextLabel::Original));
    }

    #[test]
    fn test_empty_input_yields_empty_table() {
        let table = build_comparison(&TextEntitySet::new());
        assert!(table.is_empty());
        assert!(table.columns.is_empty());
        assert_eq!(table.headers(), vec!["Entity", "Type"]);
    }

    #[test]
    fn test_supplied_text_without_entities_keeps_column() {
        let set = TextEntitySet::new()
            .with(TextLabel::Original, Vec::new())
            .unwrap()
            .with(TextLabel::Variation2, Vec::new())
            .unwrap();

        let table = build_comparison(&set);
        assert!(table.is_empty());
        assert_eq!(table.columns, vec![TextLabel::Original, TextLabel::Variation2]);
    }

    #[test]
    fn test_type_from_last_label_wins() {
        let set = TextEntitySet::new()
            .with(
                TextLabel::Variation2,
                vec![entity("Mercury", EntityType::ConsumerGood, 0.2)],
            )
            .unwrap()
            .with(
                TextLabel::Original,
                vec![entity("Mercury", EntityType::Person, 0.5)],
            )
            .unwrap()
            .with(
                TextLabel::Variation1,
                vec![entity("Mercury", EntityType::Location, 0.3)],
            )
            .unwrap();

        let rows = align(&set);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].entity_type, EntityType::ConsumerGood);
        assert_eq!(rows[0].aggregate_score, Some(0.33));
    }

    #[test]
    fn test_ties_break_by_name() {
        let set = TextEntitySet::new()
            .with(
                TextLabel::Original,
                vec![
                    entity("Zurich", EntityType::Location, 0.25),
                    entity("Amsterdam", EntityType::Location, 0.25),
                    entity("Milan", EntityType::Location, 0.5),
                ],
            )
            .unwrap();

        let names: Vec<String> = build_comparison(&set)
            .rows
            .into_iter()
            .map(|r| r.entity)
            .collect();
        assert_eq!(names, vec!["Milan", "Amsterdam", "Zurich"]);
    }

    #[test]
    fn test_negative_zero_is_plain_zero() {
        let set = TextEntitySet::new()
            .with(
                TextLabel::Original,
                vec![
                    entity("Zurich", EntityType::Location, 0.0),
                    entity("Amsterdam", EntityType::Location, -0.0),
                ],
            )
            .unwrap();

        let table = build_comparison(&set);
        let names: Vec<&str> = table.rows.iter().map(|r| r.entity.as_str()).collect();
        assert_eq!(names, vec!["Amsterdam", "Zurich"]);
        assert_eq!(table.cell("Amsterdam", TextLabel::Original), Some("0.00"));

        let score = set.get(TextLabel::Original).unwrap()["Amsterdam"].score;
        assert!(score.is_sign_positive());
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let set = TextEntitySet::new()
            .with(
                TextLabel::Original,
                vec![entity("apple", EntityType::ConsumerGood, 0.3)],
            )
            .unwrap()
            .with(
                TextLabel::Variation1,
                vec![entity("Apple", EntityType::Organization, 0.6)],
            )
            .unwrap();

        let table = build_comparison(&set);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell("Apple", TextLabel::Original), Some(""));
        assert_eq!(table.cell("apple", TextLabel::Original), Some("0.30"));
    }

    #[test]
    fn test_rounding_happens_before_averaging() {
        let set = TextEntitySet::new()
            .with(
                TextLabel::Original,
                vec![entity("Rome", EntityType::Location, 0.1249)],
            )
            .unwrap()
            .with(
                TextLabel::Variation1,
                vec![entity("Rome", EntityType::Location, 0.1251)],
            )
            .unwrap();

        let rows = align(&set);
        assert_eq!(rows[0].scores[&TextLabel::Original], 0.12);
        assert_eq!(rows[0].scores[&TextLabel::Variation1], 0.13);
    }

    #[test]
    fn test_duplicate_names_keep_last() {
        let mut set = TextEntitySet::new();
        let count = set
            .insert(
                TextLabel::Original,
                vec![
                    entity("Berlin", EntityType::Location, 0.2),
                    entity("Berlin", EntityType::Organization, 0.7),
                ],
            )
            .unwrap();

        assert_eq!(count, 1);
        let stored = set.get(TextLabel::Original).unwrap()["Berlin"];
        assert_eq!(stored.entity_type, EntityType::Organization);
        assert_eq!(stored.score, 0.7);
    }

    #[test]
    fn test_rejects_malformed_salience() {
        let mut set = TextEntitySet::new();

        let err = set
            .insert(
                TextLabel::Variation1,
                vec![entity("Oslo", EntityType::Location, f64::NAN)],
            )
            .unwrap_err();
        assert!(matches!(err, SalienceError::Data(_)));
        assert!(err.to_string().contains("Variation 1"));

        assert!(set
            .insert(
                TextLabel::Original,
                vec![entity("Oslo", EntityType::Location, 1.5)]
            )
            .is_err());
        assert!(set
            .insert(
                TextLabel::Original,
                vec![entity("Oslo", EntityType::Location, -0.01)]
            )
            .is_err());

        assert!(set.is_empty());
    }

    #[test]
    fn test_to_records() {
        let records = build_comparison(&paris_set()).to_records();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["Entity"], "Tour Eiffel");
        assert_eq!(records[1]["Type"], "LOCATION");
        assert_eq!(records[1]["Original"], "");
        assert_eq!(records[1]["Variation 1"], "0.10");
        assert!(!records[1].contains_key("Variation 2"));
    }

    #[test]
    fn test_cell_lookup_misses() {
        let table = build_comparison(&paris_set());
        assert_eq!(table.cell("Paris", TextLabel::Variation2), None);
        assert_eq!(table.cell("London", TextLabel::Original), None);
    }
}
