//! Column type codes of the binary table format.
//!
//! A column format (`TFORMn` card) is an optional repeat count followed by a single
//! type letter. Only the fixed enumeration below is supported; numeric columns must
//! hold a single scalar per row.
//!
//! | Code | Type                      | Width (bytes) |
//! |------|---------------------------|---------------|
//! | `L`  | logical                   | 1             |
//! | `B`  | unsigned 8-bit integer    | 1             |
//! | `I`  | 16-bit integer            | 2             |
//! | `J`  | 32-bit integer            | 4             |
//! | `K`  | 64-bit integer            | 8             |
//! | `E`  | 32-bit IEEE float         | 4             |
//! | `D`  | 64-bit IEEE float         | 8             |
//! | `rA` | fixed-width character (r) | r             |
//!
//! Multi-byte numbers are big-endian.
use std::fmt;

use nom::{
    character::complete::{anychar, digit1},
    combinator::{all_consuming, map_res, opt},
    IResult, Parser,
};
use serde::Serialize;

use crate::astrokit_errors::AstroKitError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ColumnType {
    Logical,
    UnsignedByte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Text(usize),
}

fn tform_parts(input: &str) -> IResult<&str, (Option<usize>, char)> {
    all_consuming((opt(map_res(digit1, str::parse::<usize>)), anychar)).parse(input)
}

impl ColumnType {
    /// Decode a `TFORMn` value such as `"1J"`, `"E"` or `"12A"`.
    ///
    /// Arguments
    /// -----------------
    /// * `tform`: the raw card value, surrounding blanks allowed.
    ///
    /// Return
    /// ----------
    /// * The matching [`ColumnType`], or [`AstroKitError::UnknownColumnFormat`] for a type
    ///   letter outside the enumeration, a numeric repeat count other than 1, or an
    ///   empty character column.
    pub fn from_tform(tform: &str) -> Result<Self, AstroKitError> {
        let trimmed = tform.trim();
        let (_, (repeat, code)) = tform_parts(trimmed)
            .map_err(|_| AstroKitError::UnknownColumnFormat(trimmed.to_string()))?;

        let repeat = repeat.unwrap_or(1);
        let column_type = match code {
            'A' => {
                if repeat == 0 {
                    return Err(AstroKitError::UnknownColumnFormat(format!(
                        "{trimmed} (empty character column)"
                    )));
                }
                return Ok(ColumnType::Text(repeat));
            }
            'L' => ColumnType::Logical,
            'B' => ColumnType::UnsignedByte,
            'I' => ColumnType::Short,
            'J' => ColumnType::Int,
            'K' => ColumnType::Long,
            'E' => ColumnType::Float,
            'D' => ColumnType::Double,
            _ => return Err(AstroKitError::UnknownColumnFormat(trimmed.to_string())),
        };

        if repeat != 1 {
            return Err(AstroKitError::UnknownColumnFormat(format!(
                "{trimmed} (numeric repeat count must be 1)"
            )));
        }
        Ok(column_type)
    }

    pub fn byte_width(&self) -> usize {
        match self {
            ColumnType::Logical | ColumnType::UnsignedByte => 1,
            ColumnType::Short => 2,
            ColumnType::Int | ColumnType::Float => 4,
            ColumnType::Long | ColumnType::Double => 8,
            ColumnType::Text(width) => *width,
        }
    }

    pub fn type_code(&self) -> char {
        match self {
            ColumnType::Logical => 'L',
            ColumnType::UnsignedByte => 'B',
            ColumnType::Short => 'I',
            ColumnType::Int => 'J',
            ColumnType::Long => 'K',
            ColumnType::Float => 'E',
            ColumnType::Double => 'D',
            ColumnType::Text(_) => 'A',
        }
    }

    /// Integer columns are the only ones usable as sorted search keys.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ColumnType::UnsignedByte | ColumnType::Short | ColumnType::Int | ColumnType::Long
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Text(width) => write!(f, "{width}A"),
            other => write!(f, "{}", other.type_code()),
        }
    }
}

#[cfg(test)]
mod test_column_type {
    use super::*;

    #[test]
    fn test_numeric_formats() {
        assert_eq!(ColumnType::from_tform("J"), Ok(ColumnType::Int));
        assert_eq!(ColumnType::from_tform("1J"), Ok(ColumnType::Int));
        assert_eq!(ColumnType::from_tform(" 1D "), Ok(ColumnType::Double));
        assert_eq!(ColumnType::from_tform("K").unwrap().byte_width(), 8);
        assert_eq!(ColumnType::from_tform("I").unwrap().byte_width(), 2);
        assert_eq!(ColumnType::from_tform("L").unwrap().byte_width(), 1);
        assert_eq!(ColumnType::from_tform("E").unwrap().byte_width(), 4);
    }

    #[test]
    fn test_text_format() {
        let text = ColumnType::from_tform("12A").unwrap();
        assert_eq!(text, ColumnType::Text(12));
        assert_eq!(text.byte_width(), 12);
        assert_eq!(text.to_string(), "12A");
        assert_eq!(ColumnType::from_tform("A"), Ok(ColumnType::Text(1)));
    }

    #[test]
    fn test_rejected_formats() {
        assert_eq!(
            ColumnType::from_tform("1C"),
            Err(AstroKitError::UnknownColumnFormat("1C".to_string()))
        );
        assert_eq!(
            ColumnType::from_tform("1PE(12)"),
            Err(AstroKitError::UnknownColumnFormat("1PE(12)".to_string()))
        );
        assert!(matches!(
            ColumnType::from_tform("3E"),
            Err(AstroKitError::UnknownColumnFormat(_))
        ));
        assert!(matches!(
            ColumnType::from_tform("0A"),
            Err(AstroKitError::UnknownColumnFormat(_))
        ));
        assert!(ColumnType::from_tform("").is_err());
    }
}
