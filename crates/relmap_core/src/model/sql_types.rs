//! Backend storage type codes.
//!
//! Values follow the standard JDBC type codes so that references declared
//! against them stay portable across backends. `TypeReference` treats these
//! as opaque integers; only `JdbcTypeRegistry` assigns meaning.

pub const BIT: i32 = -7;
pub const TINYINT: i32 = -6;
pub const SMALLINT: i32 = 5;
pub const INTEGER: i32 = 4;
pub const BIGINT: i32 = -5;
pub const FLOAT: i32 = 6;
pub const REAL: i32 = 7;
pub const DOUBLE: i32 = 8;
pub const NUMERIC: i32 = 2;
pub const DECIMAL: i32 = 3;
pub const CHAR: i32 = 1;
pub const VARCHAR: i32 = 12;
pub const LONGVARCHAR: i32 = -1;
pub const NCHAR: i32 = -15;
pub const NVARCHAR: i32 = -9;
pub const DATE: i32 = 91;
pub const TIME: i32 = 92;
pub const TIMESTAMP: i32 = 93;
pub const BINARY: i32 = -2;
pub const VARBINARY: i32 = -3;
pub const LONGVARBINARY: i32 = -4;
pub const BLOB: i32 = 2004;
pub const CLOB: i32 = 2005;
pub const BOOLEAN: i32 = 16;
/// Not a JDBC code; reserved for native UUID columns.
pub const UUID: i32 = 3000;

/// Returns the conventional upper-case name for a known code.
pub fn type_code_name(code: i32) -> Option<&'static str> {
    let name = match code {
        BIT => "BIT",
        TINYINT => "TINYINT",
        SMALLINT => "SMALLINT",
        INTEGER => "INTEGER",
        BIGINT => "BIGINT",
        FLOAT => "FLOAT",
        REAL => "REAL",
        DOUBLE => "DOUBLE",
        NUMERIC => "NUMERIC",
        DECIMAL => "DECIMAL",
        CHAR => "CHAR",
        VARCHAR => "VARCHAR",
        LONGVARCHAR => "LONGVARCHAR",
        NCHAR => "NCHAR",
        NVARCHAR => "NVARCHAR",
        DATE => "DATE",
        TIME => "TIME",
        TIMESTAMP => "TIMESTAMP",
        BINARY => "BINARY",
        VARBINARY => "VARBINARY",
        LONGVARBINARY => "LONGVARBINARY",
        BLOB => "BLOB",
        CLOB => "CLOB",
        BOOLEAN => "BOOLEAN",
        UUID => "UUID",
        _ => return None,
    };
    Some(name)
}
