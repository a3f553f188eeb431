/*!
Bridges between coerced [`Value`]s and ordinary Rust types, so that
declarations can be written as `ValueType::of::<u16>()` and handlers can read
values back as `invocation.get::<u16>("port")`.
 */

use std::path::PathBuf;

use crate::value::{EnumType, FloatKind, IntKind, Value, ValueType};

/// A Rust type that a [`Value`] can be read back as.
pub trait FromValue: Sized {
    /// The declared type that produces values of this Rust type
    fn value_type() -> ValueType;

    /// Extract the value; `None` if it holds something else
    fn from_value(value: &Value) -> Option<Self>;

    /// A noun for error messages
    const EXPECTED: &'static str;
}

/**
A Rust enum usable as an argument or option type. `MEMBERS` lists the names
the user types (matched case-insensitively), in the same order that
[`from_member`][Choice::from_member] understands.

```
use argtree::{Choice, ValueType};

#[derive(Debug, PartialEq)]
enum Level { Low, High }

impl Choice for Level {
    const NAME: &'static str = "Level";
    const MEMBERS: &'static [&'static str] = &["LOW", "HIGH"];

    fn from_member(index: usize) -> Option<Self> {
        match index {
            0 => Some(Level::Low),
            1 => Some(Level::High),
            _ => None,
        }
    }
}

assert_eq!(ValueType::choice::<Level>().to_string(), "LOW|HIGH");
```
*/
pub trait Choice: Sized {
    const NAME: &'static str;
    const MEMBERS: &'static [&'static str];

    fn from_member(index: usize) -> Option<Self>;

    /// Find the member named by a coerced [`Value::Member`]
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Member(name) => Self::MEMBERS
                .iter()
                .position(|member| *member == name.as_str())
                .and_then(Self::from_member),
            _ => None,
        }
    }
}

impl ValueType {
    #[inline]
    #[must_use]
    pub fn of<T: FromValue>() -> Self {
        T::value_type()
    }

    #[must_use]
    pub fn choice<T: Choice>() -> Self {
        ValueType::Enum(EnumType::new(T::NAME, T::MEMBERS.iter().copied()))
    }
}

macro_rules! integers {
    ($($type:ident => $kind:ident,)*) => {
        $(
            impl FromValue for $type {
                const EXPECTED: &'static str = "an integer";

                #[inline]
                fn value_type() -> ValueType {
                    ValueType::Int(IntKind::$kind)
                }

                #[inline]
                fn from_value(value: &Value) -> Option<Self> {
                    match *value {
                        Value::Integer(value) => $type::try_from(value).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

integers! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
}

impl FromValue for f64 {
    const EXPECTED: &'static str = "a float";

    fn value_type() -> ValueType {
        ValueType::Float(FloatKind::F64)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match *value {
            Value::Float(value) => Some(value),
            _ => None,
        }
    }
}

impl FromValue for f32 {
    const EXPECTED: &'static str = "a float";

    fn value_type() -> ValueType {
        ValueType::Float(FloatKind::F32)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match *value {
            // Only ever widened from an f32 during coercion
            Value::Float(value) => Some(value as f32),
            _ => None,
        }
    }
}

impl FromValue for bool {
    const EXPECTED: &'static str = "a boolean";

    fn value_type() -> ValueType {
        ValueType::Bool
    }

    fn from_value(value: &Value) -> Option<Self> {
        match *value {
            Value::Bool(value) => Some(value),
            _ => None,
        }
    }
}

/// Enum members can be read as their canonical name.
impl FromValue for String {
    const EXPECTED: &'static str = "a string";

    fn value_type() -> ValueType {
        ValueType::String
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(value) | Value::Member(value) => Some(value.clone()),
            _ => None,
        }
    }
}

impl FromValue for PathBuf {
    const EXPECTED: &'static str = "a path";

    fn value_type() -> ValueType {
        ValueType::Path
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Path(path) => Some(path.clone()),
            _ => None,
        }
    }
}
