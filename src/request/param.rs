use serde_json::Value;
use std::fmt;

use crate::encoding::{Context, EncodeError};

/// Value of a matrix, query, form, cookie or header parameter.
///
/// Only [`ParamValue::Text`] is percent encoded, other values are already wire safe and written
/// as-is.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Bool(bool),
}

impl ParamValue {
    /// Encode the value for the given position.
    pub fn encode(&self, ctx: Context) -> Result<String, EncodeError> {
        match self {
            Self::Text(text) => ctx.encode(text),
            _ => Ok(self.to_string()),
        }
    }

    /// Returns the text if this is a [`ParamValue::Text`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Integer(int) => f.write_str(itoa::Buffer::new().format(*int)),
            Self::Unsigned(int) => f.write_str(itoa::Buffer::new().format(*int)),
            Self::Float(float) => fmt::Display::fmt(float, f),
            Self::Bool(b) => fmt::Display::fmt(b, f),
        }
    }
}

macro_rules! from {
    ($($variant:ident($as:ty): $($ty:ty),*;)*) => {
        $(
            $(
                impl From<$ty> for ParamValue {
                    #[inline]
                    fn from(value: $ty) -> Self {
                        Self::$variant(value as $as)
                    }
                }
            )*
        )*
    };
}

from! {
    Integer(i64): i8, i16, i32, i64, isize, u8, u16, u32;
    Unsigned(u64): u64, usize;
    Float(f64): f32, f64;
}

impl From<bool> for ParamValue {
    #[inline]
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for ParamValue {
    #[inline]
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ParamValue {
    #[inline]
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for ParamValue {
    #[inline]
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<&Value> for ParamValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text.clone()),
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(num) => match (num.as_i64(), num.as_u64()) {
                (Some(int), _) => Self::Integer(int),
                (None, Some(int)) => Self::Unsigned(int),
                _ => Self::Float(num.as_f64().unwrap_or(f64::NAN)),
            },
            other => Self::Text(other.to_string()),
        }
    }
}

// ===== Multi-valued =====

/// Conversion into one or more parameter values.
///
/// A sequence adds one `(name, value)` pair per element, in order.
pub trait IntoParamValues {
    fn into_param_values(self) -> Vec<ParamValue>;
}

macro_rules! scalar {
    ($($ty:ty),*) => {
        $(
            impl IntoParamValues for $ty {
                #[inline]
                fn into_param_values(self) -> Vec<ParamValue> {
                    vec![self.into()]
                }
            }
        )*
    };
}

scalar!(&str, String, &String, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, bool);

impl IntoParamValues for ParamValue {
    #[inline]
    fn into_param_values(self) -> Vec<ParamValue> {
        vec![self]
    }
}

impl<T: Into<ParamValue>> IntoParamValues for Vec<T> {
    fn into_param_values(self) -> Vec<ParamValue> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<ParamValue>, const N: usize> IntoParamValues for [T; N] {
    fn into_param_values(self) -> Vec<ParamValue> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<ParamValue> + Clone> IntoParamValues for &[T] {
    fn into_param_values(self) -> Vec<ParamValue> {
        self.iter().cloned().map(Into::into).collect()
    }
}
