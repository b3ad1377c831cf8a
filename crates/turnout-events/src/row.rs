//! Row decoding helpers shared by the event and registration queries.

use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::Row;

/// Reads a text column and parses it as one of the code enums.
pub(crate) fn code<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
