use std::{collections::HashMap, fmt};

use ahash::RandomState;
use serde::Serialize;

use crate::binary_table::record::{CatalogRecord, CatalogValue};

use super::{catalog_id::CatalogId, star_key::StarKey};

/// Shape of the object returned by [`find_object`](super::accessor::CatalogAccessor::find_object).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputShape {
    /// The decoded row, column order preserved.
    #[default]
    Raw,
    /// A `column name → value` map.
    Named,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FoundObject {
    Raw(CatalogRecord),
    Named(HashMap<String, CatalogValue, RandomState>),
}

impl FoundObject {
    pub fn shape(record: CatalogRecord, shape: OutputShape) -> Self {
        match shape {
            OutputShape::Raw => FoundObject::Raw(record),
            OutputShape::Named => FoundObject::Named(record.to_named_map()),
        }
    }

    pub fn get(&self, name: &str) -> Option<&CatalogValue> {
        match self {
            FoundObject::Raw(record) => record.get(name),
            FoundObject::Named(map) => map.get(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchKind {
    Exact,
    /// Key absent; the catalog's reserved null row was returned.
    NullRow,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogMatch {
    pub catalog: CatalogId,
    pub key: StarKey,
    pub kind: MatchKind,
    pub object: FoundObject,
    /// Key of the row right after a Tycho match when it holds `key + 1`.
    pub possible_companion: Option<StarKey>,
}

impl CatalogMatch {
    pub fn is_exact(&self) -> bool {
        self.kind == MatchKind::Exact
    }
}

impl fmt::Display for CatalogMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            MatchKind::Exact => "exact",
            MatchKind::NullRow => "null row",
        };
        writeln!(f, "{} {} ({kind})", self.catalog, self.key)?;
        if let Some(companion) = self.possible_companion {
            writeln!(f, "possible companion: {companion}")?;
        }
        match &self.object {
            FoundObject::Raw(record) => write!(f, "{record}"),
            FoundObject::Named(map) => {
                let mut names: Vec<&String> = map.keys().collect();
                names.sort();
                for name in names {
                    writeln!(f, "{name} = {}", map[name])?;
                }
                Ok(())
            }
        }
    }
}
