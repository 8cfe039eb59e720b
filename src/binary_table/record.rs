use std::{collections::HashMap, fmt, sync::Arc};

use ahash::RandomState;
use nom::{
    bytes::complete::take,
    number::complete::{be_f32, be_f64, be_i16, be_i32, be_i64, be_u8},
    IResult,
};
use serde::{Serialize, Serializer};

use crate::astrokit_errors::AstroKitError;

use super::{column_type::ColumnType, schema::CatalogSchema};

/// One decoded cell of a catalog row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CatalogValue {
    Logical(bool),
    Byte(u8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Text(String),
}

impl CatalogValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CatalogValue::Byte(v) => Some(*v as f64),
            CatalogValue::Short(v) => Some(*v as f64),
            CatalogValue::Int(v) => Some(*v as f64),
            CatalogValue::Long(v) => Some(*v as f64),
            CatalogValue::Float(v) => Some(*v as f64),
            CatalogValue::Double(v) => Some(*v),
            CatalogValue::Logical(_) | CatalogValue::Text(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CatalogValue::Byte(v) => Some(*v as i64),
            CatalogValue::Short(v) => Some(*v as i64),
            CatalogValue::Int(v) => Some(*v as i64),
            CatalogValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CatalogValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CatalogValue::Logical(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for CatalogValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogValue::Logical(b) => write!(f, "{}", if *b { "T" } else { "F" }),
            CatalogValue::Byte(v) => write!(f, "{v}"),
            CatalogValue::Short(v) => write!(f, "{v}"),
            CatalogValue::Int(v) => write!(f, "{v}"),
            CatalogValue::Long(v) => write!(f, "{v}"),
            CatalogValue::Float(v) => write!(f, "{v}"),
            CatalogValue::Double(v) => write!(f, "{v}"),
            CatalogValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Fixed-width text stops at the first NUL and drops trailing blanks.
fn decode_text(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).trim_end().to_string()
}

/// Decode a single cell of `column_type` from the front of `input`.
pub(crate) fn decode_value(column_type: ColumnType, input: &[u8]) -> IResult<&[u8], CatalogValue> {
    match column_type {
        ColumnType::Logical => {
            let (rest, b) = be_u8(input)?;
            Ok((rest, CatalogValue::Logical(b == b'T')))
        }
        ColumnType::UnsignedByte => {
            let (rest, v) = be_u8(input)?;
            Ok((rest, CatalogValue::Byte(v)))
        }
        ColumnType::Short => {
            let (rest, v) = be_i16(input)?;
            Ok((rest, CatalogValue::Short(v)))
        }
        ColumnType::Int => {
            let (rest, v) = be_i32(input)?;
            Ok((rest, CatalogValue::Int(v)))
        }
        ColumnType::Long => {
            let (rest, v) = be_i64(input)?;
            Ok((rest, CatalogValue::Long(v)))
        }
        ColumnType::Float => {
            let (rest, v) = be_f32(input)?;
            Ok((rest, CatalogValue::Float(v)))
        }
        ColumnType::Double => {
            let (rest, v) = be_f64(input)?;
            Ok((rest, CatalogValue::Double(v)))
        }
        ColumnType::Text(width) => {
            let (rest, bytes) = take(width)(input)?;
            Ok((rest, CatalogValue::Text(decode_text(bytes))))
        }
    }
}

/// A decoded catalog row: the shared schema plus one value per column, in column order.
#[derive(Debug, Clone)]
pub struct CatalogRecord {
    schema: Arc<CatalogSchema>,
    values: Vec<CatalogValue>,
}

impl CatalogRecord {
    /// Decode `row` (exactly `schema.row_bytes` long) column by column.
    pub(crate) fn decode(schema: &Arc<CatalogSchema>, row: &[u8]) -> Result<Self, AstroKitError> {
        if row.len() != schema.row_bytes {
            return Err(AstroKitError::RowDecodeError(format!(
                "row of {} bytes, schema expects {}",
                row.len(),
                schema.row_bytes
            )));
        }

        let mut values = Vec::with_capacity(schema.columns.len());
        let mut input = row;
        for column in &schema.columns {
            let (rest, value) = decode_value(column.column_type, input).map_err(|e| {
                AstroKitError::RowDecodeError(format!("column {}: {e}", column.name))
            })?;
            values.push(value);
            input = rest;
        }

        Ok(CatalogRecord {
            schema: Arc::clone(schema),
            values,
        })
    }

    pub fn schema(&self) -> &Arc<CatalogSchema> {
        &self.schema
    }

    pub fn get(&self, name: &str) -> Option<&CatalogValue> {
        self.schema.column_index(name).map(|i| &self.values[i])
    }

    pub fn values(&self) -> &[CatalogValue] {
        &self.values
    }

    /// `(column name, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CatalogValue)> {
        self.schema
            .columns
            .iter()
            .map(|c| c.name.as_str())
            .zip(self.values.iter())
    }

    /// Copy of this record with the value of `name` replaced.
    pub fn with_value(&self, name: &str, value: CatalogValue) -> Result<Self, AstroKitError> {
        let i = self
            .schema
            .column_index(name)
            .ok_or_else(|| AstroKitError::UnknownColumn(name.to_string()))?;
        let mut values = self.values.clone();
        values[i] = value;
        Ok(CatalogRecord {
            schema: Arc::clone(&self.schema),
            values,
        })
    }

    pub fn to_named_map(&self) -> HashMap<String, CatalogValue, RandomState> {
        self.iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }
}

impl PartialEq for CatalogRecord {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Serialize for CatalogRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl fmt::Display for CatalogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = self.iter().map(|(k, _)| k.len()).max().unwrap_or(5).max(5);
        let rendered: Vec<String> = self.values.iter().map(|v| v.to_string()).collect();
        let value_width = rendered.iter().map(|v| v.len()).max().unwrap_or(5).max(5);

        let border = format!(
            "+{:-<label$}+{:-<value$}+",
            "",
            "",
            label = label_width + 2,
            value = value_width + 2
        );

        writeln!(f, "{border}")?;
        writeln!(
            f,
            "| {:<label_width$} | {:<value_width$} |",
            "Field", "Value"
        )?;
        writeln!(f, "{border}")?;
        for ((name, _), value) in self.iter().zip(rendered.iter()) {
            writeln!(f, "| {:<label_width$} | {:<value_width$} |", name, value)?;
        }
        writeln!(f, "{border}")
    }
}
