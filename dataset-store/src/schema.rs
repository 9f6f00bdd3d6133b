//! Column type vocabulary shared across the backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Inferred type of a dataset column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    Categorical,
    Text,
    Datetime,
    Boolean,
}

impl ColumnType {
    /// Stable wire name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Numeric => "numeric",
            ColumnType::Categorical => "categorical",
            ColumnType::Text => "text",
            ColumnType::Datetime => "datetime",
            ColumnType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "numeric" => Ok(ColumnType::Numeric),
            "categorical" => Ok(ColumnType::Categorical),
            "text" => Ok(ColumnType::Text),
            "datetime" => Ok(ColumnType::Datetime),
            "boolean" => Ok(ColumnType::Boolean),
            other => Err(format!("unknown column type: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_wire_names() {
        for t in [
            ColumnType::Numeric,
            ColumnType::Categorical,
            ColumnType::Text,
            ColumnType::Datetime,
            ColumnType::Boolean,
        ] {
            assert_eq!(t.as_str().parse::<ColumnType>().unwrap(), t);
        }
    }
}
