//! SQLite type names, affinities and the Rust kinds that map onto them.

use std::fmt;

/// SQLite column type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    None,
    Invalid,
    Null,

    Integer,
    Int,
    TinyInt,
    SmallInt,
    MediumInt,
    BigInt,
    Int2,
    Int8,
    Bit,

    Text,
    Char,
    Character,
    VarChar,
    NChar,
    NVarChar,
    Clob,
    Blob,
    TinyBlob,
    TinyText,
    MediumBlob,
    MediumText,
    LongBlob,
    LongText,
    Date,
    DateTime,

    Real,
    Double,
    Float,

    Numeric,
    Decimal,
    Boolean,
}

impl SqlType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SqlType::None => "NONE",
            SqlType::Invalid => "INVALID",
            SqlType::Null => "NULL",
            SqlType::Integer => "INTEGER",
            SqlType::Int => "INT",
            SqlType::TinyInt => "TINYINT",
            SqlType::SmallInt => "SMALLINT",
            SqlType::MediumInt => "MEDIUMINT",
            SqlType::BigInt => "BIGINT",
            SqlType::Int2 => "INT2",
            SqlType::Int8 => "INT8",
            SqlType::Bit => "BIT",
            SqlType::Text => "TEXT",
            SqlType::Char => "CHAR",
            SqlType::Character => "CHARACTER",
            SqlType::VarChar => "VARCHAR",
            SqlType::NChar => "NCHAR",
            SqlType::NVarChar => "NVARCHAR",
            SqlType::Clob => "CLOB",
            SqlType::Blob => "BLOB",
            SqlType::TinyBlob => "TINYBLOB",
            SqlType::TinyText => "TINYTEXT",
            SqlType::MediumBlob => "MEDIUMBLOB",
            SqlType::MediumText => "MEDIUMTEXT",
            SqlType::LongBlob => "LONGBLOB",
            SqlType::LongText => "LONGTEXT",
            SqlType::Date => "DATE",
            SqlType::DateTime => "DATETIME",
            SqlType::Real => "REAL",
            SqlType::Double => "DOUBLE",
            SqlType::Float => "FLOAT",
            SqlType::Numeric => "NUMERIC",
            SqlType::Decimal => "DECIMAL",
            SqlType::Boolean => "BOOLEAN",
        }
    }

    /// The affinity SQLite assigns to a column of this type:
    /// one of `None`, `Integer`, `Text`, `Real` or `Numeric`.
    pub fn affinity(&self) -> SqlType {
        match self {
            SqlType::None | SqlType::Invalid | SqlType::Null => SqlType::None,

            SqlType::Integer
            | SqlType::Int
            | SqlType::TinyInt
            | SqlType::SmallInt
            | SqlType::MediumInt
            | SqlType::BigInt
            | SqlType::Int2
            | SqlType::Int8
            | SqlType::Bit => SqlType::Integer,

            SqlType::Text
            | SqlType::Char
            | SqlType::Character
            | SqlType::VarChar
            | SqlType::NChar
            | SqlType::NVarChar
            | SqlType::Clob
            | SqlType::Blob
            | SqlType::TinyBlob
            | SqlType::TinyText
            | SqlType::MediumBlob
            | SqlType::MediumText
            | SqlType::LongBlob
            | SqlType::LongText
            | SqlType::Date
            | SqlType::DateTime => SqlType::Text,

            SqlType::Real | SqlType::Double | SqlType::Float => SqlType::Real,

            SqlType::Numeric | SqlType::Decimal | SqlType::Boolean => SqlType::Numeric,
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rust-side kind of a model field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Invalid,
    Int,
    Uint,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    Bool,
    F32,
    F64,
    Str,
    Bytes,
    Composite,
}

impl FieldKind {
    pub fn sql_type(&self) -> SqlType {
        match self {
            FieldKind::Invalid => SqlType::None,
            FieldKind::Int | FieldKind::Uint => SqlType::Int,
            FieldKind::I8 | FieldKind::U8 => SqlType::TinyInt,
            FieldKind::I16 | FieldKind::U16 => SqlType::SmallInt,
            FieldKind::I32 | FieldKind::U32 => SqlType::MediumInt,
            FieldKind::I64 | FieldKind::U64 => SqlType::BigInt,
            FieldKind::Bool => SqlType::Numeric,
            FieldKind::F32 => SqlType::Float,
            FieldKind::F64 => SqlType::Double,
            FieldKind::Str => SqlType::Text,
            FieldKind::Bytes | FieldKind::Composite => SqlType::Blob,
        }
    }
}

/// Types usable as model fields.
pub trait SqlKind {
    const KIND: FieldKind;
}

macro_rules! sql_kind {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(impl SqlKind for $ty {
            const KIND: FieldKind = FieldKind::$kind;
        })*
    };
}

sql_kind! {
    isize => Int,
    usize => Uint,
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    bool => Bool,
    f32 => F32,
    f64 => F64,
    String => Str,
    Vec<u8> => Bytes,
}

/// A bound statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

macro_rules! sql_value_from_int {
    ($($ty:ty),*) => {
        $(impl From<$ty> for SqlValue {
            fn from(v: $ty) -> Self {
                SqlValue::Integer(i64::from(v))
            }
        })*
    };
}

sql_value_from_int!(i8, u8, i16, u16, i32, u32, i64);

macro_rules! sql_value_from_wide {
    ($($ty:ty),*) => {
        $(impl From<$ty> for SqlValue {
            fn from(v: $ty) -> Self {
                match i64::try_from(v) {
                    Ok(n) => SqlValue::Integer(n),
                    Err(_) => SqlValue::Text(v.to_string()),
                }
            }
        })*
    };
}

sql_value_from_wide!(u64, isize, usize);

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Integer(i64::from(v))
    }
}

impl From<f32> for SqlValue {
    fn from(v: f32) -> Self {
        SqlValue::Real(f64::from(v))
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Real(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        SqlValue::Blob(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}
