//! Equality-filter queries with column projection

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One stored row
pub type Row = Map<String, Value>;

/// `column == value`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// Column name
    pub column: String,
    /// Required value
    pub value: Value,
}

impl Filter {
    /// Whether `row` satisfies the filter (missing columns never match)
    #[must_use]
    pub fn matches(&self, row: &Row) -> bool {
        row.get(&self.column) == Some(&self.value)
    }
}

/// Conjunction of equality filters over one table, projected onto columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Table name
    pub table: String,
    /// Projected columns; empty selects every column
    pub columns: Vec<String>,
    /// Filters, all of which must hold
    pub filters: Vec<Filter>,
}

impl Query {
    /// Query over `table` with no projection and no filters
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            filters: Vec::new(),
        }
    }

    /// Add a projected column
    #[must_use]
    pub fn select(mut self, column: impl Into<String>) -> Self {
        self.columns.push(column.into());
        self
    }

    /// Add an equality filter
    #[must_use]
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    /// Whether `row` satisfies every filter
    #[must_use]
    pub fn matches(&self, row: &Row) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }

    /// Project `row` onto the selected columns
    #[must_use]
    pub fn project(&self, row: &Row) -> Row {
        if self.columns.is_empty() {
            return row.clone();
        }
        self.columns
            .iter()
            .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(v: Value) -> Row {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn filters_are_conjunctive() {
        let q = Query::table("direcciones")
            .select("ciudad")
            .eq("departamento", "Antioquia")
            .eq("subsector", "Salud");

        assert!(q.matches(&row(json!({"departamento": "Antioquia", "subsector": "Salud"}))));
        assert!(!q.matches(&row(json!({"departamento": "Antioquia", "subsector": "Educación"}))));
        assert!(!q.matches(&row(json!({"departamento": "Antioquia"}))));
    }

    #[test]
    fn projection_keeps_only_selected() {
        let q = Query::table("t").select("ciudad");
        let projected = q.project(&row(json!({"ciudad": "Medellín", "departamento": "Antioquia"})));
        assert_eq!(Value::Object(projected), json!({"ciudad": "Medellín"}));
    }
}
