//! Secret record models.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of secret held by a record, stored and transmitted as an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum DataType {
    Credentials,
    Text,
    Binary,
    BankCard,
}

impl DataType {
    pub const ALL: [DataType; 4] = [
        DataType::Credentials,
        DataType::Text,
        DataType::Binary,
        DataType::BankCard,
    ];

    pub fn code(self) -> i32 {
        match self {
            DataType::Credentials => 1,
            DataType::Text => 2,
            DataType::Binary => 3,
            DataType::BankCard => 4,
        }
    }
}

impl From<DataType> for i32 {
    fn from(kind: DataType) -> Self {
        kind.code()
    }
}

impl TryFrom<i32> for DataType {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        DataType::ALL
            .into_iter()
            .find(|kind| kind.code() == code)
            .ok_or_else(|| format!("unknown data type {code}"))
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Credentials => "credentials",
            DataType::Text => "text",
            DataType::Binary => "binary",
            DataType::BankCard => "bank-card",
        };
        f.write_str(name)
    }
}

/// A stored secret record belonging to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: DataType,
    pub description: String,
    pub value: String,
}

/// Fields supplied when creating or replacing a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordInput {
    #[serde(rename = "type")]
    pub kind: DataType,
    #[serde(default)]
    pub description: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_codes_match_wire_format() {
        assert_eq!(DataType::Credentials.code(), 1);
        assert_eq!(DataType::BankCard.code(), 4);
        assert_eq!(DataType::try_from(3), Ok(DataType::Binary));
        assert!(DataType::try_from(0).is_err());
        assert!(DataType::try_from(5).is_err());
    }

    #[test]
    fn record_serializes_kind_as_type_number() {
        let record = Record {
            id: 7,
            kind: DataType::Text,
            description: "note".into(),
            value: "hello".into(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], 2);
        assert_eq!(json["id"], 7);
    }

    #[test]
    fn record_input_rejects_unknown_type() {
        let parsed: Result<RecordInput, _> =
            serde_json::from_str(r#"{"type": 9, "value": "x"}"#);
        assert!(parsed.is_err());
    }
}
