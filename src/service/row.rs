//! Lenient column access for row mappers.

use sqlx::postgres::{PgRow, Postgres};
use sqlx::{Column, Decode, Row, Type};

pub trait RowExt {
    /// Value of `column` (case-insensitive). Missing column or SQL NULL gives `Ok(None)`;
    /// a value of the wrong type is an error.
    fn value_or_default<'r, T>(&'r self, column: &str) -> Result<Option<T>, sqlx::Error>
    where
        T: Decode<'r, Postgres> + Type<Postgres>;

    /// Value at `index`. Out-of-range index or SQL NULL gives `Ok(None)`.
    fn value_at_or_default<'r, T>(&'r self, index: usize) -> Result<Option<T>, sqlx::Error>
    where
        T: Decode<'r, Postgres> + Type<Postgres>;
}

impl RowExt for PgRow {
    fn value_or_default<'r, T>(&'r self, column: &str) -> Result<Option<T>, sqlx::Error>
    where
        T: Decode<'r, Postgres> + Type<Postgres>,
    {
        match self.columns().iter().position(|c| c.name().eq_ignore_ascii_case(column)) {
            Some(i) => self.try_get::<Option<T>, _>(i),
            None => Ok(None),
        }
    }

    fn value_at_or_default<'r, T>(&'r self, index: usize) -> Result<Option<T>, sqlx::Error>
    where
        T: Decode<'r, Postgres> + Type<Postgres>,
    {
        if index < self.len() {
            self.try_get::<Option<T>, _>(index)
        } else {
            Ok(None)
        }
    }
}
