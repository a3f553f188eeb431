/*!
Typed values, and the coercion of raw command line tokens into them.

Every positional argument and every value-taking option has a [`ValueType`].
[`coerce`] turns a token into a [`Value`] of that type, or into the
[`ArgumentError`] the user will see. Boolean *options* never go through
[`coerce`]: each occurrence toggles them instead.
 */

use std::{
    fmt, io,
    path::{self, Component, Path, PathBuf},
};

use joinery::JoinableIterator;

use crate::errors::ArgumentError;

/// The width of an integer type. Tokens are range-checked against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntKind {
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
}

impl IntKind {
    /// The inclusive range of values this type can hold
    #[must_use]
    pub const fn range(self) -> (i128, i128) {
        match self {
            IntKind::I8 => (i8::MIN as i128, i8::MAX as i128),
            IntKind::I16 => (i16::MIN as i128, i16::MAX as i128),
            IntKind::I32 => (i32::MIN as i128, i32::MAX as i128),
            IntKind::I64 => (i64::MIN as i128, i64::MAX as i128),
            IntKind::Isize => (isize::MIN as i128, isize::MAX as i128),
            IntKind::U8 => (0, u8::MAX as i128),
            IntKind::U16 => (0, u16::MAX as i128),
            IntKind::U32 => (0, u32::MAX as i128),
            IntKind::U64 => (0, u64::MAX as i128),
            IntKind::Usize => (0, usize::MAX as i128),
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            IntKind::I8 => "i8",
            IntKind::I16 => "i16",
            IntKind::I32 => "i32",
            IntKind::I64 => "i64",
            IntKind::Isize => "isize",
            IntKind::U8 => "u8",
            IntKind::U16 => "u16",
            IntKind::U32 => "u32",
            IntKind::U64 => "u64",
            IntKind::Usize => "usize",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatKind {
    F32,
    F64,
}

/**
A closed set of named members, matched case-insensitively. Members are
usually declared in upper case (`LOW`, `HIGH`), and they're printed exactly
as declared in help and error messages.
*/
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumType {
    name: String,
    members: Vec<String>,
}

impl EnumType {
    pub fn new(name: impl Into<String>, members: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Find the member matching `token`, by upper-casing both sides
    #[must_use]
    pub fn lookup(&self, token: &str) -> Option<&str> {
        let token = token.to_uppercase();

        self.members
            .iter()
            .find(|member| member.to_uppercase() == token)
            .map(String::as_str)
    }

    /// The members joined with `|`, for usage and error messages
    pub fn pipe_joined(&self) -> impl fmt::Display + '_ {
        self.members.iter().join_with("|")
    }
}

/// The declared type of an argument or option.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    Bool,
    Int(IntKind),
    Float(FloatKind),
    String,
    Path,
    Enum(EnumType),
}

impl ValueType {
    /// Only booleans are flags. Everything else takes a value on the
    /// command line.
    #[inline]
    #[must_use]
    pub fn takes_argument(&self) -> bool {
        !matches!(self, ValueType::Bool)
    }
}

/// Renders like a type name in help output; enums render as their members.
impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Bool => f.write_str("bool"),
            ValueType::Int(kind) => f.write_str(kind.name()),
            ValueType::Float(FloatKind::F32) => f.write_str("f32"),
            ValueType::Float(FloatKind::F64) => f.write_str("f64"),
            ValueType::String => f.write_str("string"),
            ValueType::Path => f.write_str("path"),
            ValueType::Enum(members) => write!(f, "{}", members.pipe_joined()),
        }
    }
}

/// A coerced argument or option value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Integer(i128),
    /// `f32` values are widened losslessly
    Float(f64),
    String(String),
    Path(PathBuf),
    /// The canonical spelling of an enum member
    Member(String),
}

impl Value {
    /// A short noun for this value's kind, used in [`AccessError`][crate::errors::AccessError]
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "a boolean",
            Value::Integer(_) => "an integer",
            Value::Float(_) => "a float",
            Value::String(_) => "a string",
            Value::Path(_) => "a path",
            Value::Member(_) => "an enum member",
        }
    }
}

/// Renders as a token that [`coerce`]s back into an equal value.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(value) => write!(f, "{value}"),
            Value::Integer(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::String(value) | Value::Member(value) => f.write_str(value),
            Value::Path(value) => write!(f, "{}", value.display()),
        }
    }
}

/**
Convert a raw token into a value of type `kind`. `name` identifies the
parameter in the error message; it's the argument name for positionals and
the flag as written for options.
*/
pub fn coerce(token: &str, kind: &ValueType, name: &str) -> Result<Value, ArgumentError> {
    match kind {
        ValueType::Bool => match token.to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(ArgumentError::ExpectedBoolean {
                name: name.to_owned(),
                token: token.to_owned(),
            }),
        },
        ValueType::Int(width) => {
            let (min, max) = width.range();

            token
                .parse::<i128>()
                .ok()
                .filter(|value| (min..=max).contains(value))
                .map(Value::Integer)
                .ok_or_else(|| ArgumentError::ExpectedInteger {
                    name: name.to_owned(),
                    token: token.to_owned(),
                })
        }
        ValueType::Float(width) => {
            let value = match width {
                FloatKind::F32 => token.parse::<f32>().map(f64::from),
                FloatKind::F64 => token.parse::<f64>(),
            };

            value.map(Value::Float).map_err(|_| ArgumentError::ExpectedFloat {
                name: name.to_owned(),
                token: token.to_owned(),
            })
        }
        ValueType::String => Ok(Value::String(token.to_owned())),
        ValueType::Path => {
            resolve_path(token)
                .map(Value::Path)
                .map_err(|err| ArgumentError::UnresolvablePath {
                    token: token.to_owned(),
                    message: err.to_string(),
                })
        }
        ValueType::Enum(members) => members
            .lookup(token)
            .map(|member| Value::Member(member.to_owned()))
            .ok_or_else(|| ArgumentError::ExpectedMember {
                name: name.to_owned(),
                token: token.to_owned(),
                members: members.pipe_joined().to_string(),
            }),
    }
}

/// Canonicalize an existing path; make a missing one absolute and clean up
/// its `.` and `..` components without touching the filesystem.
fn resolve_path(token: &str) -> io::Result<PathBuf> {
    match std::fs::canonicalize(token) {
        Ok(path) => Ok(path),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            path::absolute(token).map(|path| normalize(&path))
        }
        Err(err) => Err(err),
    }
}

fn normalize(path: &Path) -> PathBuf {
    path.components()
        .fold(PathBuf::new(), |mut normalized, component| {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    normalized.pop();
                }
                component => normalized.push(component),
            }
            normalized
        })
}
