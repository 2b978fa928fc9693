use chrono::NaiveDate;

use crate::schema::TableSchema;

/// A single value ready to be bound to an INSERT statement
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Boolean(bool),
    Date(NaiveDate),
}

impl SqlValue {
    pub fn bind_to(&self, idx: usize, stmt: &mut rusqlite::Statement) -> rusqlite::Result<()> {
        match self {
            SqlValue::Null => stmt.raw_bind_parameter(idx, rusqlite::types::Null)?,
            SqlValue::Integer(i) => stmt.raw_bind_parameter(idx, i)?,
            SqlValue::Real(f) => stmt.raw_bind_parameter(idx, f)?,
            SqlValue::Text(s) => stmt.raw_bind_parameter(idx, s.as_str())?,
            SqlValue::Boolean(b) => stmt.raw_bind_parameter(idx, b)?,
            SqlValue::Date(d) => stmt.raw_bind_parameter(idx, d)?,
        }
        Ok(())
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Integer(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Real(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Boolean(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// One row destined for one table, columns kept in insertion order
#[derive(Debug, Clone)]
pub struct Payload {
    pub table: &'static TableSchema,
    values: Vec<(&'static str, SqlValue)>,
}

impl Payload {
    pub fn new(table: &'static TableSchema) -> Self {
        Self {
            table,
            values: Vec::new(),
        }
    }

    /// Set a column, replacing any earlier value for it
    pub fn set(mut self, column: &'static str, value: impl Into<SqlValue>) -> Self {
        debug_assert!(
            self.table.column(column).is_some(),
            "{} has no column {}",
            self.table.name,
            column
        );

        let value = value.into();
        match self.values.iter_mut().find(|(name, _)| *name == column) {
            Some(slot) => slot.1 = value,
            None => self.values.push((column, value)),
        }
        self
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.values
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.values.iter().map(|(name, _)| *name)
    }

    pub fn values(&self) -> impl Iterator<Item = &SqlValue> {
        self.values.iter().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build the INSERT statement matching this payload's columns
    pub fn insert_sql(&self) -> String {
        let columns: Vec<&str> = self.columns().collect();
        let placeholders: Vec<&str> = columns.iter().map(|_| "?").collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table.name,
            columns.join(", "),
            placeholders.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tables::{BOX, VILLAGE};

    #[test]
    fn test_set_replaces_existing_value() {
        let payload = Payload::new(&BOX)
            .set("room", "A1")
            .set("freezer", "F2")
            .set("room", "B4");

        assert_eq!(payload.len(), 2);
        assert_eq!(payload.get("room"), Some(&SqlValue::Text("B4".into())));
    }

    #[test]
    fn test_insert_sql_follows_column_order() {
        let payload = Payload::new(&VILLAGE)
            .set("village_id", "OCA")
            .set("village_name", "Ocaya");

        assert_eq!(
            payload.insert_sql(),
            "INSERT INTO village (village_id, village_name) VALUES (?, ?)"
        );
    }

    #[test]
    fn test_none_becomes_null() {
        let payload = Payload::new(&BOX).set("room", None::<String>);
        assert_eq!(payload.get("room"), Some(&SqlValue::Null));
    }
}
