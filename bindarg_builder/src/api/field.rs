use std::collections::BTreeMap;
use thiserror::Error;

use crate::model::Value;
use crate::parser::{Args, ParamId};
use crate::prelude::FromValue;

/// The reason a field could not be extracted from [`Parsed`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FieldError {
    /// No parameter of the resolved command path has this name.
    #[error("no parameter '{0}' on the resolved command path")]
    Unknown(String),
    /// The parameter's value is not of the requested type.
    #[error("parameter '{name}' holds {value:?}, which is not a {type_name}")]
    Mismatch {
        /// The parameter.
        name: String,
        /// The requested type.
        type_name: &'static str,
        /// The resolved value.
        value: Value,
    },
}

/// The outcome of a successful parse.
///
/// Holds a value for every parameter along the resolved command path, whether it was provided or defaulted.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub(crate) path: Vec<String>,
    pub(crate) values: BTreeMap<String, Value>,
    pub(crate) action_flags: Vec<(ParamId, String)>,
    pub(crate) unknown: Vec<String>,
    pub(crate) args: Args,
}

impl Parsed {
    /// The resolved command path: the program, followed by each sub-command.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// The deepest resolved command.
    pub fn command(&self) -> &str {
        self.path
            .last()
            .expect("internal error - the path always contains the program")
    }

    /// The value of the parameter `name`, if it is on the resolved command path.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Every resolved value, by parameter name.
    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    /// Extract the value of the parameter `name` as a `T`.
    ///
    /// ### Example
    /// ```
    /// # use bindarg_builder as bindarg;
    /// use bindarg::{CommandLineParser, Convert, FieldError, Parameter};
    ///
    /// let parser = CommandLineParser::new("program")
    ///     .add(Parameter::option("limit").convert(Convert::integer()))
    ///     .build();
    /// let parsed = parser.parse_tokens(vec!["--limit", "5"].as_slice()).unwrap();
    ///
    /// assert_eq!(parsed.get::<u8>("limit").unwrap(), 5);
    /// assert_eq!(parsed.get::<Option<u8>>("limit").unwrap(), Some(5));
    /// assert!(matches!(parsed.get::<String>("limit"), Err(FieldError::Mismatch { .. })));
    /// assert!(matches!(parsed.get::<u8>("other"), Err(FieldError::Unknown(_))));
    /// ```
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T, FieldError> {
        let value = self
            .values
            .get(name)
            .ok_or_else(|| FieldError::Unknown(name.to_string()))?;

        T::from_value(value).ok_or_else(|| FieldError::Mismatch {
            name: name.to_string(),
            type_name: std::any::type_name::<T>(),
            value: value.clone(),
        })
    }

    /// The names of the action flags which fired, in execution order.
    pub fn action_flags(&self) -> Vec<&str> {
        self.action_flags
            .iter()
            .map(|(_, name)| name.as_str())
            .collect()
    }

    /// The tokens kept, rather than rejected, under `allow_unknown`.
    pub fn unknown(&self) -> &[String] {
        &self.unknown
    }

    /// The record of every action taken during the parse.
    pub fn args(&self) -> &Args {
        &self.args
    }
}
