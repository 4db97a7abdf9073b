use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use crate::model::Value;

/// The reason a token could not be captured into a [`Value`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidCapture {
    /// The token does not parse as the target type.
    #[error("cannot convert '{token}' to {type_name}")]
    InvalidConversion {
        /// The rejected token.
        token: String,
        /// The target type.
        type_name: &'static str,
    },
    /// A custom converter rejected the token.
    #[error("cannot capture '{token}': {message}")]
    Rejected {
        /// The rejected token.
        token: String,
        /// The converter's explanation.
        message: String,
    },
}

type ConvertFn = dyn Fn(&str) -> Result<Value, InvalidCapture> + Send + Sync;

/// The text to [`Value`] conversion applied to every token a parameter consumes.
///
/// Converters are shared by the immutable parser definition, so they must be `Send + Sync`.
///
/// ### Example
/// ```
/// # use bindarg_builder as bindarg;
/// use bindarg::{Convert, Value};
///
/// let convert = Convert::parse::<u32>();
/// assert_eq!(convert.apply("7").unwrap(), Value::Int(7));
/// assert!(convert.apply("-7").is_err());
/// ```
#[derive(Clone)]
pub struct Convert {
    type_name: &'static str,
    function: Arc<ConvertFn>,
}

impl std::fmt::Debug for Convert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Convert[{}]", self.type_name)
    }
}

impl Default for Convert {
    fn default() -> Self {
        Convert::string()
    }
}

impl Convert {
    /// Keep the token as text (the default).
    pub fn string() -> Self {
        Self {
            type_name: "string",
            function: Arc::new(|token| Ok(Value::Str(token.to_string()))),
        }
    }

    /// Convert to a signed 64-bit integer.
    pub fn integer() -> Self {
        Convert::parse::<i64>()
    }

    /// Convert to a 64-bit float.
    pub fn float() -> Self {
        Convert::parse::<f64>()
    }

    /// Convert to a boolean, accepting `true/false`, `yes/no`, `on/off`, `1/0` (case-insensitive).
    pub fn boolean() -> Self {
        Self {
            type_name: "bool",
            function: Arc::new(|token| match token.to_ascii_lowercase().as_str() {
                "true" | "t" | "yes" | "y" | "on" | "1" => Ok(Value::Bool(true)),
                "false" | "f" | "no" | "n" | "off" | "0" => Ok(Value::Bool(false)),
                _ => Err(InvalidCapture::InvalidConversion {
                    token: token.to_string(),
                    type_name: "bool",
                }),
            }),
        }
    }

    /// Convert through [`std::str::FromStr`] for any type `T` that becomes a [`Value`].
    pub fn parse<T>() -> Self
    where
        T: FromStr + Into<Value> + 'static,
    {
        let type_name = std::any::type_name::<T>();
        Self {
            type_name,
            function: Arc::new(move |token| {
                T::from_str(token)
                    .map(Into::into)
                    .map_err(|_| InvalidCapture::InvalidConversion {
                        token: token.to_string(),
                        type_name,
                    })
            }),
        }
    }

    /// Convert via a custom function.
    /// An `Err(message)` rejects the token.
    pub fn with<F>(type_name: &'static str, function: F) -> Self
    where
        F: Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            type_name,
            function: Arc::new(move |token| {
                function(token).map_err(|message| InvalidCapture::Rejected {
                    token: token.to_string(),
                    message,
                })
            }),
        }
    }

    /// The name of the target type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Convert a single token.
    pub fn apply(&self, token: &str) -> Result<Value, InvalidCapture> {
        (self.function)(token)
    }
}
