//! 80-byte header card decoding.
//!
//! A card is `KEYWORD` (columns 1–8), an optional value indicator `"= "` (columns 9–10)
//! and a free-format value optionally followed by a `/ comment`. Values are quoted
//! strings (with `''` as an escaped quote), logicals `T`/`F`, integers or reals.
//! Commentary cards (`COMMENT`, `HISTORY`, blank keyword) carry no value.
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, none_of, space0, space1},
    combinator::{eof, map_res, opt, peek, value},
    multi::many0,
    number::complete::recognize_float,
    sequence::{delimited, preceded, terminated},
    IResult, Parser,
};

use crate::{astrokit_errors::AstroKitError, constants::CARD_SIZE};

#[derive(Debug, Clone, PartialEq)]
pub enum CardValue {
    Text(String),
    Logical(bool),
    Integer(i64),
    Real(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCard {
    pub keyword: String,
    pub value: Option<CardValue>,
}

fn quoted_string(input: &str) -> IResult<&str, CardValue> {
    delimited(
        char('\''),
        many0(alt((value('\'', tag("''")), none_of("'")))),
        char('\''),
    )
    .map(|chars: Vec<char>| {
        // trailing blanks inside quotes are not significant
        CardValue::Text(chars.into_iter().collect::<String>().trim_end().to_string())
    })
    .parse(input)
}

fn logical(input: &str) -> IResult<&str, CardValue> {
    terminated(
        alt((value(true, char('T')), value(false, char('F')))),
        peek(alt((eof, space1, tag("/")))),
    )
    .map(CardValue::Logical)
    .parse(input)
}

fn number(input: &str) -> IResult<&str, CardValue> {
    map_res(recognize_float, |token: &str| {
        if token.contains(['.', 'E', 'e']) {
            token.parse::<f64>().map(CardValue::Real).map_err(|_| ())
        } else {
            token.parse::<i64>().map(CardValue::Integer).map_err(|_| ())
        }
    })
    .parse(input)
}

fn card_value(input: &str) -> IResult<&str, Option<CardValue>> {
    preceded(space0, opt(alt((quoted_string, logical, number)))).parse(input)
}

impl HeaderCard {
    /// Decode one 80-byte card.
    ///
    /// Arguments
    /// -----------------
    /// * `card`: exactly [`CARD_SIZE`] bytes of ASCII text.
    ///
    /// Return
    /// ----------
    /// * The keyword (trailing blanks removed) and its value when the card has a value
    ///   indicator and a recognizable value, or [`AstroKitError::HeaderParseError`] if the
    ///   bytes are not a valid card.
    pub fn parse(card: &[u8]) -> Result<Self, AstroKitError> {
        if card.len() != CARD_SIZE {
            return Err(AstroKitError::HeaderParseError(format!(
                "card of {} bytes, expected {CARD_SIZE}",
                card.len()
            )));
        }
        let text = std::str::from_utf8(card)
            .ok()
            .filter(|text| text.is_ascii())
            .ok_or_else(|| AstroKitError::HeaderParseError("non-ASCII header card".into()))?;

        let keyword = text[..8].trim_end().to_string();
        let value = if &text[8..10] == "= " {
            card_value(&text[10..])
                .map(|(_, value)| value)
                .map_err(|e| {
                    AstroKitError::HeaderParseError(format!("card {keyword}: {e}"))
                })?
        } else {
            None
        };

        Ok(HeaderCard { keyword, value })
    }

    pub fn is_end(&self) -> bool {
        self.keyword == "END"
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self.value {
            Some(CardValue::Integer(v)) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            Some(CardValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}
