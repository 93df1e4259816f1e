use std::fmt::Display;
use std::hash::{Hash, Hasher};

use chrono::NaiveDate;
use parse_display::Display;
use serde::{Deserialize, Serialize};

pub mod prelude;

pub mod command;
pub mod database;
pub mod lexer;
pub mod parser;
pub mod session;
pub mod store;

/// The declared type of a table column. Determines coercion only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Int,
    Str,
    Float,
    Date,
    Bool,
    Char,
    Text,
}

impl Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ColumnType::Int => "int",
                ColumnType::Str => "str",
                ColumnType::Float => "float",
                ColumnType::Date => "date",
                ColumnType::Bool => "boolean",
                ColumnType::Char => "char",
                ColumnType::Text => "text",
            }
        )
    }
}

#[derive(Debug, Display, Clone, PartialEq)]
#[display("Cannot read \"{value}\" as {ty}.")]
pub struct InvalidValueError {
    pub value: String,
    pub ty: ColumnType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Nil,
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Date(NaiveDate),
    Char(Option<char>),
}

impl Value {
    /// Coerces raw command text into a typed value.
    ///
    /// `Bool` compares case-insensitively against `"true"`; any other text
    /// becomes `false` rather than an error. `Char` keeps at most the first
    /// character. `Str` and `Text` take the input verbatim.
    pub fn coerce(raw: &str, ty: ColumnType) -> Result<Self, InvalidValueError> {
        let invalid = || InvalidValueError {
            value: raw.to_owned(),
            ty,
        };

        Ok(match ty {
            ColumnType::Int => Value::Int(raw.parse().map_err(|_| invalid())?),
            ColumnType::Float => Value::Float(raw.parse().map_err(|_| invalid())?),
            ColumnType::Bool => Value::Bool(raw.eq_ignore_ascii_case("true")),
            ColumnType::Date => {
                Value::Date(NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid())?)
            }
            ColumnType::Char => Value::Char(raw.chars().next()),
            ColumnType::Str | ColumnType::Text => Value::Str(raw.to_owned()),
        })
    }
}

// Equality and hashing are by value, with floats taken as their bit pattern,
// so coerced primary keys can index records in a map.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Int(lhs), Value::Int(rhs)) => lhs == rhs,
            (Value::Float(lhs), Value::Float(rhs)) => lhs.to_bits() == rhs.to_bits(),
            (Value::Str(lhs), Value::Str(rhs)) => lhs == rhs,
            (Value::Bool(lhs), Value::Bool(rhs)) => lhs == rhs,
            (Value::Date(lhs), Value::Date(rhs)) => lhs == rhs,
            (Value::Char(lhs), Value::Char(rhs)) => lhs == rhs,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Nil => {}
            Value::Int(int) => int.hash(state),
            Value::Float(float) => float.to_bits().hash(state),
            Value::Str(str) => str.hash(state),
            Value::Bool(bool) => bool.hash(state),
            Value::Date(date) => date.hash(state),
            Value::Char(char) => char.hash(state),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Int(int) => write!(f, "{int}"),
            Value::Float(float) => write!(f, "{float}"),
            Value::Str(str) => write!(f, "\"{str}\""),
            Value::Bool(bool) => write!(f, "{bool}"),
            Value::Date(date) => write!(f, "{date}"),
            Value::Char(Some(char)) => write!(f, "{char}"),
            Value::Char(None) => Ok(()),
        }
    }
}
