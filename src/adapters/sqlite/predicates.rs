//! Typed WHERE-clause assembly for list queries.
//!
//! Filters compose as AND-joined clauses with positional binds, so adding a
//! filter can never change the meaning of another and user input never ends
//! up inside the SQL text. Column names come from repository code only.

/// A value bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Integer(i64),
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// AND-composed WHERE clause with positional binds.
#[derive(Debug, Default)]
pub struct Predicates {
    clauses: Vec<String>,
    binds: Vec<SqlValue>,
}

impl Predicates {
    pub fn new() -> Self {
        Self::default()
    }

    /// `column = ?`
    pub fn eq(&mut self, column: &str, value: impl Into<SqlValue>) -> &mut Self {
        self.clauses.push(format!("{column} = ?"));
        self.binds.push(value.into());
        self
    }

    /// `column >= ?`
    pub fn gte(&mut self, column: &str, value: impl Into<SqlValue>) -> &mut Self {
        self.clauses.push(format!("{column} >= ?"));
        self.binds.push(value.into());
        self
    }

    /// `column <= ?`
    pub fn lte(&mut self, column: &str, value: impl Into<SqlValue>) -> &mut Self {
        self.clauses.push(format!("{column} <= ?"));
        self.binds.push(value.into());
        self
    }

    /// Clause with no binds, e.g. `completed_at IS NULL`.
    pub fn raw(&mut self, clause: &str) -> &mut Self {
        self.clauses.push(clause.to_string());
        self
    }

    /// Case-insensitive substring match over one or more columns (OR-joined
    /// inside a single clause). LIKE wildcards in the needle are escaped so
    /// they match literally.
    pub fn search(&mut self, columns: &[&str], needle: &str) -> &mut Self {
        let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
        let parts: Vec<String> = columns
            .iter()
            .map(|column| format!("LOWER(COALESCE({column}, '')) LIKE ? ESCAPE '\\'"))
            .collect();
        self.clauses.push(format!("({})", parts.join(" OR ")));
        for _ in columns {
            self.binds.push(SqlValue::Text(pattern.clone()));
        }
        self
    }

    /// Render `" WHERE ..."`, or an empty string when no clause was added.
    pub fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub fn binds(&self) -> &[SqlValue] {
        &self.binds
    }
}

fn escape_like(needle: &str) -> String {
    needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
