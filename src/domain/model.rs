use serde_json::Value;
use std::collections::HashMap;

/// One spreadsheet row: column name to scalar display value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatRecord {
    pub data: HashMap<String, Value>,
}

impl FlatRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the previous value when the column was already set.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.data.insert(column.into(), value.into())
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.data.get(column)
    }

    pub fn contains_key(&self, column: &str) -> bool {
        self.data.contains_key(column)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Projects the record onto `columns`; absent columns become null.
    pub fn reindex(&self, columns: &[String]) -> FlatRecord {
        let data = columns
            .iter()
            .map(|column| {
                let value = self.data.get(column).cloned().unwrap_or(Value::Null);
                (column.clone(), value)
            })
            .collect();
        FlatRecord { data }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FlatRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        FlatRecord {
            data: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Fixed-width table: every row carries exactly `columns`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedTable {
    pub columns: Vec<String>,
    pub rows: Vec<FlatRecord>,
}

impl NormalizedTable {
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn header(&self) -> &[String] {
        &self.columns
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// Header plus rows rendered as text, nulls as empty strings.
    pub fn to_string_grid(&self) -> Vec<Vec<String>> {
        let mut grid = Vec::with_capacity(self.rows.len() + 1);
        grid.push(self.header().to_vec());
        for row in &self.rows {
            grid.push(
                self.header()
                    .iter()
                    .map(|column| display_text(row.get(column)))
                    .collect(),
            );
        }
        grid
    }

    /// Header plus rows for the Sheets values API. Numbers and booleans stay
    /// typed so the spreadsheet can compute on them.
    pub fn to_sheet_values(&self) -> Vec<Vec<Value>> {
        let mut grid = Vec::with_capacity(self.rows.len() + 1);
        grid.push(
            self.header()
                .iter()
                .map(|c| Value::String(c.clone()))
                .collect(),
        );
        for row in &self.rows {
            grid.push(
                self.header()
                    .iter()
                    .map(|column| match row.get(column) {
                        None | Some(Value::Null) => Value::String(String::new()),
                        Some(v @ (Value::Number(_) | Value::Bool(_) | Value::String(_))) => v.clone(),
                        Some(nested) => Value::String(nested.to_string()),
                    })
                    .collect(),
            );
        }
        grid
    }
}

fn display_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Outcome of one export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub rows: usize,
    pub columns: usize,
    pub destination: String,
    pub exported_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reindex_fills_missing_with_null() {
        let record: FlatRecord = [("id", json!(7))].into_iter().collect();
        let columns = vec!["id".to_string(), "price".to_string()];

        let reindexed = record.reindex(&columns);

        assert_eq!(reindexed.len(), 2);
        assert_eq!(reindexed.get("id"), Some(&json!(7)));
        assert_eq!(reindexed.get("price"), Some(&Value::Null));
    }

    #[test]
    fn test_grids_render_nulls_as_empty() {
        let table = NormalizedTable {
            columns: vec!["id".to_string(), "price".to_string(), "Photos".to_string()],
            rows: vec![[("id", json!(1)), ("price", Value::Null), ("Photos", json!("a.jpg"))]
                .into_iter()
                .collect()],
        };

        assert_eq!(
            table.to_string_grid(),
            vec![
                vec!["id".to_string(), "price".to_string(), "Photos".to_string()],
                vec!["1".to_string(), String::new(), "a.jpg".to_string()],
            ]
        );
        assert_eq!(table.to_sheet_values()[1], vec![json!(1), json!(""), json!("a.jpg")]);
    }

    #[test]
    fn test_header_leads_both_grids() {
        let table = NormalizedTable {
            columns: vec!["id".to_string(), "[CT] Ville".to_string()],
            rows: vec![],
        };

        assert_eq!(table.header(), ["id", "[CT] Ville"]);
        assert_eq!(table.to_string_grid(), vec![table.header().to_vec()]);
        assert_eq!(
            table.to_sheet_values(),
            vec![vec![json!("id"), json!("[CT] Ville")]]
        );
    }
}
