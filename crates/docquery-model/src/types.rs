//! Type aliases understood by the `$type` operator.

use std::fmt;

/// A document type alias, e.g. `"string"` or `"int"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonType {
    /// 64-bit float.
    Double,
    /// UTF-8 string.
    String,
    /// Embedded document.
    Object,
    /// Array.
    Array,
    /// Binary data.
    BinData,
    /// Deprecated undefined.
    Undefined,
    /// Object id.
    ObjectId,
    /// Boolean.
    Bool,
    /// UTC datetime.
    Date,
    /// Null.
    Null,
    /// Regular expression.
    Regex,
    /// Deprecated DB pointer.
    DbPointer,
    /// JavaScript code.
    JavaScript,
    /// Deprecated symbol.
    Symbol,
    /// 32-bit integer.
    Int,
    /// Internal timestamp.
    Timestamp,
    /// 64-bit integer.
    Long,
    /// 128-bit decimal.
    Decimal,
    /// Min key.
    MinKey,
    /// Max key.
    MaxKey,
}

impl JsonType {
    /// The alias string used on the wire.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Double => "double",
            Self::String => "string",
            Self::Object => "object",
            Self::Array => "array",
            Self::BinData => "binData",
            Self::Undefined => "undefined",
            Self::ObjectId => "objectId",
            Self::Bool => "bool",
            Self::Date => "date",
            Self::Null => "null",
            Self::Regex => "regex",
            Self::DbPointer => "dbPointer",
            Self::JavaScript => "javascript",
            Self::Symbol => "symbol",
            Self::Int => "int",
            Self::Timestamp => "timestamp",
            Self::Long => "long",
            Self::Decimal => "decimal",
            Self::MinKey => "minKey",
            Self::MaxKey => "maxKey",
        }
    }

    /// The numeric type code (`-1` for `minKey`, `127` for `maxKey`).
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::Double => 1,
            Self::String => 2,
            Self::Object => 3,
            Self::Array => 4,
            Self::BinData => 5,
            Self::Undefined => 6,
            Self::ObjectId => 7,
            Self::Bool => 8,
            Self::Date => 9,
            Self::Null => 10,
            Self::Regex => 11,
            Self::DbPointer => 12,
            Self::JavaScript => 13,
            Self::Symbol => 14,
            Self::Int => 16,
            Self::Timestamp => 17,
            Self::Long => 18,
            Self::Decimal => 19,
            Self::MinKey => -1,
            Self::MaxKey => 127,
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
