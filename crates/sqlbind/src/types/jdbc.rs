// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! JDBC type codes recognized by mapping declarations.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JdbcType {
    Array,
    Bit,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Real,
    Double,
    Numeric,
    Decimal,
    Char,
    Varchar,
    LongVarchar,
    Date,
    Time,
    Timestamp,
    Binary,
    Varbinary,
    LongVarbinary,
    Blob,
    Clob,
    Boolean,
    Cursor,
    Null,
    Other,
    Struct,
    Undefined,
}

impl JdbcType {
    pub fn as_str(self) -> &'static str {
        match self {
            JdbcType::Array => "ARRAY",
            JdbcType::Bit => "BIT",
            JdbcType::TinyInt => "TINYINT",
            JdbcType::SmallInt => "SMALLINT",
            JdbcType::Integer => "INTEGER",
            JdbcType::BigInt => "BIGINT",
            JdbcType::Float => "FLOAT",
            JdbcType::Real => "REAL",
            JdbcType::Double => "DOUBLE",
            JdbcType::Numeric => "NUMERIC",
            JdbcType::Decimal => "DECIMAL",
            JdbcType::Char => "CHAR",
            JdbcType::Varchar => "VARCHAR",
            JdbcType::LongVarchar => "LONGVARCHAR",
            JdbcType::Date => "DATE",
            JdbcType::Time => "TIME",
            JdbcType::Timestamp => "TIMESTAMP",
            JdbcType::Binary => "BINARY",
            JdbcType::Varbinary => "VARBINARY",
            JdbcType::LongVarbinary => "LONGVARBINARY",
            JdbcType::Blob => "BLOB",
            JdbcType::Clob => "CLOB",
            JdbcType::Boolean => "BOOLEAN",
            JdbcType::Cursor => "CURSOR",
            JdbcType::Null => "NULL",
            JdbcType::Other => "OTHER",
            JdbcType::Struct => "STRUCT",
            JdbcType::Undefined => "UNDEFINED",
        }
    }
}

impl fmt::Display for JdbcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JdbcType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_uppercase().as_str() {
            "ARRAY" => JdbcType::Array,
            "BIT" => JdbcType::Bit,
            "TINYINT" => JdbcType::TinyInt,
            "SMALLINT" => JdbcType::SmallInt,
            "INTEGER" => JdbcType::Integer,
            "BIGINT" => JdbcType::BigInt,
            "FLOAT" => JdbcType::Float,
            "REAL" => JdbcType::Real,
            "DOUBLE" => JdbcType::Double,
            "NUMERIC" => JdbcType::Numeric,
            "DECIMAL" => JdbcType::Decimal,
            "CHAR" => JdbcType::Char,
            "VARCHAR" => JdbcType::Varchar,
            "LONGVARCHAR" => JdbcType::LongVarchar,
            "DATE" => JdbcType::Date,
            "TIME" => JdbcType::Time,
            "TIMESTAMP" => JdbcType::Timestamp,
            "BINARY" => JdbcType::Binary,
            "VARBINARY" => JdbcType::Varbinary,
            "LONGVARBINARY" => JdbcType::LongVarbinary,
            "BLOB" => JdbcType::Blob,
            "CLOB" => JdbcType::Clob,
            "BOOLEAN" => JdbcType::Boolean,
            "CURSOR" => JdbcType::Cursor,
            "NULL" => JdbcType::Null,
            "OTHER" => JdbcType::Other,
            "STRUCT" => JdbcType::Struct,
            "UNDEFINED" => JdbcType::Undefined,
            _ => return Err(()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        for name in ["INTEGER", "VARCHAR", "TIMESTAMP", "NULL"] {
            let parsed: JdbcType = name.parse().unwrap();
            assert_eq!(parsed.to_string(), name);
        }
        assert!("NOT_A_TYPE".parse::<JdbcType>().is_err());
    }
}
