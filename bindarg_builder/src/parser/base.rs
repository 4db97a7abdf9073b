use thiserror::Error;

use crate::constant::{EXIT_SUCCESS, EXIT_USAGE};

/// An invalid command line parser definition.
/// Raised while building, before any token is parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The command (or its sub-command tree) is malformed.
    #[error("Config error: {0}")]
    CommandDefinition(String),

    /// A single parameter is malformed.
    #[error("Config error: parameter '{parameter}' {reason}.")]
    ParameterDefinition {
        /// The offending parameter.
        parameter: String,
        /// Why the parameter was rejected.
        reason: String,
    },

    /// An arity that no count could satisfy.
    #[error("Config error: invalid nargs - {0}.")]
    Nargs(String),
}

impl ConfigError {
    pub(crate) fn parameter(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::ParameterDefinition {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }
}

/// The class of a [`UsageError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An option string, sub-command, or surplus token matched nothing.
    NoSuchOption,
    /// An option received a malformed value.
    BadOptionUsage,
    /// A positional received a malformed value.
    BadArgumentUsage,
    /// A required parameter was never satisfied.
    MissingArgument,
    /// A value outside of the parameter's choices.
    InvalidChoice,
    /// A parameter group constraint was violated.
    ParamConflict,
    /// An intentional early exit (ex: help).
    ParserExit,
}

/// An error raised while parsing tokens against a valid definition.
///
/// Every usage error aborts the parse; no partially bound values escape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UsageError {
    /// An option string which no command in the chain declares.
    #[error("Option '{token}' does not exist.")]
    NoSuchOption {
        /// The unmatched option string.
        token: String,
        /// The index of the unmatched token.
        index: usize,
    },

    /// A sub-command name which is not registered.
    #[error("Unknown sub-command '{token}' for parameter '{parameter}'.")]
    NoSuchSubCommand {
        /// The sub-command parameter.
        parameter: String,
        /// The unmatched name.
        token: String,
        /// The index of the unmatched token.
        index: usize,
    },

    /// Tokens left over after every positional was satisfied.
    #[error("Unrecognized arguments: {}.", .tokens.join(" "))]
    UnrecognizedArguments {
        /// The surplus tokens.
        tokens: Vec<String>,
        /// The index of the first surplus token.
        index: usize,
    },

    /// An option (or flag/counter) used incorrectly.
    #[error("Option '{parameter}' {reason}.")]
    BadOptionUsage {
        /// The offending option.
        parameter: String,
        /// The offending token, if any.
        token: Option<String>,
        /// The index of the offending token.
        index: Option<usize>,
        /// What went wrong.
        reason: String,
    },

    /// A positional used incorrectly.
    #[error("Argument '{parameter}' {reason}.")]
    BadArgumentUsage {
        /// The offending positional.
        parameter: String,
        /// The offending token, if any.
        token: Option<String>,
        /// The index of the offending token.
        index: Option<usize>,
        /// What went wrong.
        reason: String,
    },

    /// Required parameters which were never satisfied.
    #[error("Missing required parameter(s): {}.", .parameters.join(", "))]
    MissingArgument {
        /// Every missing parameter, in declaration order.
        parameters: Vec<String>,
    },

    /// A value outside of the declared choices.
    #[error("Invalid choice '{token}' for '{parameter}' (choose from {}).", .choices.join(", "))]
    InvalidChoice {
        /// The offending parameter.
        parameter: String,
        /// The rejected value.
        token: String,
        /// The index of the rejected value.
        index: usize,
        /// The accepted values.
        choices: Vec<String>,
    },

    /// More than one member of a mutually exclusive group was provided.
    #[error("The following are mutually exclusive - only one is allowed: {}.", .provided.join(", "))]
    MutuallyExclusive {
        /// The group.
        group: String,
        /// The conflicting members.
        provided: Vec<String>,
    },

    /// Some, but not all, members of a mutually dependent group were provided.
    #[error("When {} provided, the following must also be provided: {}.", .provided.join(", "), .missing.join(", "))]
    MutuallyDependent {
        /// The group.
        group: String,
        /// The members which were provided.
        provided: Vec<String>,
        /// The members which are missing.
        missing: Vec<String>,
    },

    /// More than one action flag fired while multiple action flags are disallowed.
    #[error("Only one action flag may be specified: {}.", .provided.join(", "))]
    ActionFlagConflict {
        /// The conflicting action flags.
        provided: Vec<String>,
    },

    /// An intentional early termination.
    #[error("Parser exit ({code}).")]
    ParserExit {
        /// The process exit status.
        code: i32,
    },
}

impl UsageError {
    /// The class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            UsageError::NoSuchOption { .. }
            | UsageError::NoSuchSubCommand { .. }
            | UsageError::UnrecognizedArguments { .. } => ErrorKind::NoSuchOption,
            UsageError::BadOptionUsage { .. } => ErrorKind::BadOptionUsage,
            UsageError::BadArgumentUsage { .. } => ErrorKind::BadArgumentUsage,
            UsageError::MissingArgument { .. } => ErrorKind::MissingArgument,
            UsageError::InvalidChoice { .. } => ErrorKind::InvalidChoice,
            UsageError::MutuallyExclusive { .. }
            | UsageError::MutuallyDependent { .. }
            | UsageError::ActionFlagConflict { .. } => ErrorKind::ParamConflict,
            UsageError::ParserExit { .. } => ErrorKind::ParserExit,
        }
    }

    /// The process exit status for this error.
    pub fn code(&self) -> i32 {
        match self {
            UsageError::ParserExit { code } => *code,
            _ => EXIT_USAGE,
        }
    }

    /// The parameter at fault, if the error concerns a single parameter.
    pub fn parameter(&self) -> Option<&str> {
        match self {
            UsageError::NoSuchSubCommand { parameter, .. }
            | UsageError::BadOptionUsage { parameter, .. }
            | UsageError::BadArgumentUsage { parameter, .. }
            | UsageError::InvalidChoice { parameter, .. } => Some(parameter),
            UsageError::MissingArgument { parameters } if parameters.len() == 1 => {
                Some(&parameters[0])
            }
            _ => None,
        }
    }

    /// The offending token, if the error concerns a single token.
    pub fn token(&self) -> Option<&str> {
        match self {
            UsageError::NoSuchOption { token, .. }
            | UsageError::NoSuchSubCommand { token, .. }
            | UsageError::InvalidChoice { token, .. } => Some(token),
            UsageError::BadOptionUsage { token, .. } | UsageError::BadArgumentUsage { token, .. } => {
                token.as_deref()
            }
            UsageError::UnrecognizedArguments { tokens, .. } => tokens.first().map(|t| t.as_str()),
            _ => None,
        }
    }

    /// The index (into the parsed tokens) of the offending token.
    pub fn index(&self) -> Option<usize> {
        match self {
            UsageError::NoSuchOption { index, .. }
            | UsageError::NoSuchSubCommand { index, .. }
            | UsageError::UnrecognizedArguments { index, .. }
            | UsageError::InvalidChoice { index, .. } => Some(*index),
            UsageError::BadOptionUsage { index, .. } | UsageError::BadArgumentUsage { index, .. } => {
                *index
            }
            _ => None,
        }
    }

    pub(crate) fn help() -> Self {
        UsageError::ParserExit { code: EXIT_SUCCESS }
    }
}
