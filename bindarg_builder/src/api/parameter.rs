use std::sync::Arc;

use crate::api::{Convert, Parsed};
use crate::model::{Nargs, Value};
use crate::parser::{ActionFn, ConfigError, ParamKind, ParameterDef, UsageError};
use crate::prelude::Choices;

/// A parameter of the command line parser.
///
/// Each constructor picks the parameter's variant, and the modifiers refine it.
/// A modifier which does not apply to the variant (ex: `priority` on a positional) is reported when the parser is built.
///
/// ### Example
/// ```
/// # use bindarg_builder as bindarg;
/// use bindarg::{CommandLineParser, Convert, Nargs, Parameter};
///
/// let parser = CommandLineParser::new("program")
///     .add(Parameter::positional("item").nargs(Nargs::at_least_one()).convert(Convert::integer()))
///     .add(Parameter::option("sep").short('s').default(","))
///     .add(Parameter::flag("verbose").short('v'))
///     .build();
///
/// let parsed = parser.parse_tokens(vec!["1", "2", "-s", ";"].as_slice()).unwrap();
/// assert_eq!(parsed.get::<Vec<i64>>("item").unwrap(), vec![1, 2]);
/// assert_eq!(parsed.get::<String>("sep").unwrap(), ";");
/// assert!(!parsed.get::<bool>("verbose").unwrap());
/// ```
pub struct Parameter {
    inner: ParameterDef,
    required: Option<bool>,
    misuse: Option<ConfigError>,
}

impl std::fmt::Debug for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parameter[{}, {:?}]", self.inner.name, self.inner.kind)
    }
}

impl Parameter {
    fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            inner: ParameterDef::new(name, kind),
            required: None,
            misuse: None,
        }
    }

    /// Create a positional parameter, matched by position in the order of declaration.
    ///
    /// Defaults to `Nargs::precisely(1)`, and is required exactly when its nargs require a value.
    pub fn positional(name: impl Into<String>) -> Self {
        Parameter::new(name, ParamKind::Positional)
    }

    /// Create an option `--name` which takes a value.
    ///
    /// Defaults to `Nargs::precisely(1)`.
    /// If repeated on the command line, only the final value applies (see [`Parameter::append`]).
    pub fn option(name: impl Into<String>) -> Self {
        Parameter::new(name, ParamKind::Option { append: false })
    }

    /// Create a flag `--name` which stores `true` when provided, and `false` otherwise.
    pub fn flag(name: impl Into<String>) -> Self {
        Parameter::new(
            name,
            ParamKind::Flag {
                constant: Value::Bool(true),
                append: false,
            },
        )
    }

    /// Create a tri-flag: `--name` stores `true`, `--no-name` stores `false`, and neither leaves the default (`Value::None`).
    ///
    /// Using both forms in one command line is a conflict.
    ///
    /// ### Example
    /// ```
    /// # use bindarg_builder as bindarg;
    /// use bindarg::{CommandLineParser, Parameter, Value};
    ///
    /// let parser = CommandLineParser::new("program")
    ///     .add(Parameter::tri_flag("color").alt_short('C'))
    ///     .build();
    ///
    /// let parsed = parser.resolve(&["--no-color"]).unwrap();
    /// assert_eq!(parsed.value("color"), Some(&Value::Bool(false)));
    ///
    /// let parsed = parser.resolve(&[]).unwrap();
    /// assert_eq!(parsed.value("color"), Some(&Value::None));
    /// ```
    pub fn tri_flag(name: impl Into<String>) -> Self {
        Parameter::new(
            name,
            ParamKind::TriFlag {
                primary: Value::Bool(true),
                alternate: Value::Bool(false),
            },
        )
    }

    /// Create a counter `--name` which counts its occurrences.
    ///
    /// `-vvv` counts 3, and an integer argument (`-v3`, `--name=3`, or `--name 3`) adds that amount instead.
    pub fn counter(name: impl Into<String>) -> Self {
        Parameter::new(name, ParamKind::Counter { step: 1 })
    }

    /// Create an action flag `--name` which, when provided, runs `action` once parsing succeeds.
    ///
    /// See [`crate::GeneralParser::run`] for the order of execution.
    ///
    /// ### Example
    /// ```
    /// # use bindarg_builder as bindarg;
    /// use bindarg::{CommandLineParser, Parameter};
    ///
    /// let parser = CommandLineParser::new("program")
    ///     .add(Parameter::action_flag("version", |_| {
    ///         println!("program 1.0");
    ///         Ok(())
    ///     }))
    ///     .build();
    ///
    /// let parsed = parser.parse_tokens(vec!["--version"].as_slice()).unwrap();
    /// assert_eq!(parsed.action_flags(), vec!["version"]);
    /// ```
    pub fn action_flag(
        name: impl Into<String>,
        action: impl Fn(&Parsed) -> Result<(), UsageError> + Send + Sync + 'static,
    ) -> Self {
        Parameter::new(
            name,
            ParamKind::ActionFlag {
                priority: 0,
                action: ActionFn::Call(Arc::new(action)),
            },
        )
    }

    /// Create a pass-through parameter, which captures every token after `--` verbatim.
    pub fn pass_thru(name: impl Into<String>) -> Self {
        Parameter::new(name, ParamKind::PassThru)
    }

    fn misuse(mut self, modifier: &str) -> Self {
        let kind = match &self.inner.kind {
            ParamKind::Positional => "positional",
            ParamKind::Option { .. } => "option",
            ParamKind::Flag { .. } => "flag",
            ParamKind::TriFlag { .. } => "tri-flag",
            ParamKind::Counter { .. } => "counter",
            ParamKind::ActionFlag { .. } => "action flag",
            ParamKind::PassThru => "pass-through",
            ParamKind::SubCommand => "sub-command",
        };

        if self.misuse.is_none() {
            self.misuse.replace(ConfigError::parameter(
                &self.inner.name,
                format!("cannot use '{modifier}' on a {kind}"),
            ));
        }

        self
    }

    /// Add a short option string `-c`.
    /// If repeated, only the final short will apply.
    pub fn short(mut self, short: char) -> Self {
        match self.inner.kind {
            ParamKind::Positional | ParamKind::PassThru | ParamKind::SubCommand => {
                self.misuse("short")
            }
            _ => {
                self.inner.short.replace(short);
                self
            }
        }
    }

    /// Set the number of values consumed per occurrence.
    ///
    /// For a positional, this also decides whether it is required (unless [`Parameter::required`] says otherwise).
    pub fn nargs(mut self, nargs: Nargs) -> Self {
        match self.inner.kind {
            ParamKind::Positional | ParamKind::Option { .. } => {
                self.inner.nargs = nargs;
                self
            }
            _ => self.misuse("nargs"),
        }
    }

    /// Accumulate every occurrence in a list, rather than keeping the final one.
    ///
    /// Applies to options and flags.
    pub fn append(mut self) -> Self {
        match &mut self.inner.kind {
            ParamKind::Option { append } | ParamKind::Flag { append, .. } => {
                *append = true;
                self
            }
            _ => self.misuse("append"),
        }
    }

    /// Set the conversion applied to each consumed token.
    pub fn convert(mut self, convert: Convert) -> Self {
        match self.inner.kind {
            ParamKind::Positional | ParamKind::Option { .. } => {
                self.inner.convert = convert;
                self
            }
            _ => self.misuse("convert"),
        }
    }

    /// Restrict the accepted tokens to a finite set of texts.
    /// If repeated, only the final set will apply.
    ///
    /// To also document each choice, see [`Choices::choice`].
    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self.inner.kind {
            ParamKind::Positional | ParamKind::Option { .. } => {
                self.inner
                    .choices
                    .replace(choices.into_iter().map(Into::into).collect());
                self
            }
            _ => self.misuse("choices"),
        }
    }

    /// Set the value used when the parameter is not provided.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        match self.inner.kind {
            ParamKind::ActionFlag { .. } | ParamKind::SubCommand => self.misuse("default"),
            _ => {
                self.inner.default.replace(value.into());
                self
            }
        }
    }

    /// Set whether the parameter must be provided.
    pub fn required(mut self, required: bool) -> Self {
        match self.inner.kind {
            ParamKind::Positional | ParamKind::Option { .. } | ParamKind::PassThru => {
                self.required.replace(required);
                self
            }
            _ => self.misuse("required"),
        }
    }

    /// Set the value a flag stores when provided (instead of `true`).
    pub fn constant(mut self, value: impl Into<Value>) -> Self {
        match &mut self.inner.kind {
            ParamKind::Flag { constant, .. } => {
                *constant = value.into();
                self
            }
            _ => self.misuse("constant"),
        }
    }

    /// Set the values a tri-flag stores for its primary and alternate forms (instead of `true` and `false`).
    pub fn consts(mut self, primary: impl Into<Value>, alternate: impl Into<Value>) -> Self {
        match &mut self.inner.kind {
            ParamKind::TriFlag {
                primary: p,
                alternate: a,
            } => {
                *p = primary.into();
                *a = alternate.into();
                self
            }
            _ => self.misuse("consts"),
        }
    }

    /// Set the alternate long option string of a tri-flag (instead of `--no-name`).
    pub fn alt_long(mut self, long: impl Into<String>) -> Self {
        match self.inner.kind {
            ParamKind::TriFlag { .. } => {
                self.inner.alt_long.replace(long.into());
                self
            }
            _ => self.misuse("alt_long"),
        }
    }

    /// Add an alternate short option string to a tri-flag.
    pub fn alt_short(mut self, short: char) -> Self {
        match self.inner.kind {
            ParamKind::TriFlag { .. } => {
                self.inner.alt_short.replace(short);
                self
            }
            _ => self.misuse("alt_short"),
        }
    }

    /// Fall back to the environment variable `name` when the parameter is not provided on the command line.
    /// If repeated, the variables are tried in the order they were added.
    ///
    /// Options convert the variable's text as they would a token.
    /// Flags and tri-flags read it as a boolean (ex: `1`, `true`, `no`), and counters as an integer.
    /// The environment takes precedence over the default, and satisfies a required option.
    ///
    /// ### Example
    /// ```
    /// # use bindarg_builder as bindarg;
    /// use bindarg::{CommandLineParser, Parameter};
    ///
    /// let parser = CommandLineParser::new("program")
    ///     .add(Parameter::option("home").env_var("BINDARG_DOC_HOME").default("/"))
    ///     .build();
    ///
    /// std::env::set_var("BINDARG_DOC_HOME", "/tmp");
    /// assert_eq!(parser.resolve(&[]).unwrap().get::<String>("home").unwrap(), "/tmp");
    /// assert_eq!(parser.resolve(&["--home", "/usr"]).unwrap().get::<String>("home").unwrap(), "/usr");
    /// ```
    pub fn env_var(mut self, name: impl Into<String>) -> Self {
        match self.inner.kind {
            ParamKind::Option { .. }
            | ParamKind::Flag { .. }
            | ParamKind::TriFlag { .. }
            | ParamKind::Counter { .. } => {
                self.inner.env_vars.push(name.into());
                self
            }
            _ => self.misuse("env_var"),
        }
    }

    /// Append `value` to a list each time the flag is provided.
    pub fn append_const(self, value: impl Into<Value>) -> Self {
        self.constant(value).append()
    }

    /// Set whether the short option may appear inside a cluster (ex: `-abc`).
    pub fn short_combinable(mut self, combinable: bool) -> Self {
        self.inner.short_combinable = combinable;
        self
    }

    /// Set the execution priority of an action flag; lower runs first.
    pub fn priority(mut self, priority: i32) -> Self {
        match &mut self.inner.kind {
            ParamKind::ActionFlag { priority: p, .. } => {
                *p = priority;
                self
            }
            _ => self.misuse("priority"),
        }
    }

    /// Set the amount a counter adds per occurrence.
    pub fn step(mut self, step: i64) -> Self {
        match &mut self.inner.kind {
            ParamKind::Counter { step: s } => {
                *s = step;
                self
            }
            _ => self.misuse("step"),
        }
    }

    /// Document the help message for this parameter.
    /// If repeated, only the final help message will apply.
    ///
    /// We recommend allowing `bindarg` to format this field (ex: it is not recommended to use line breaks `'\n'`).
    pub fn help(mut self, description: impl Into<String>) -> Self {
        self.inner.help.replace(description.into());
        self
    }

    /// Omit this parameter from the help message.
    pub fn hide(mut self) -> Self {
        self.inner.hidden = true;
        self
    }

    pub(crate) fn name(&self) -> &str {
        &self.inner.name
    }

    pub(crate) fn consume(self) -> Result<ParameterDef, ConfigError> {
        if let Some(error) = self.misuse {
            return Err(error);
        }

        let mut inner = self.inner;

        match self.required {
            Some(required) => inner.required = required,
            None => {
                if matches!(inner.kind, ParamKind::Positional) {
                    inner.required = inner.nargs.min() > 0;
                }
            }
        }

        Ok(inner)
    }
}

impl Choices for Parameter {
    /// Document a choice's help message for this parameter.
    /// The variant is also added to the accepted choices.
    /// If repeated for the same `variant`, only the final message will apply.
    ///
    /// ### Example
    /// ```
    /// # use bindarg_builder as bindarg;
    /// use bindarg::prelude::*;
    /// use bindarg::{CommandLineParser, Parameter};
    ///
    /// let parser = CommandLineParser::new("program")
    ///     .add(
    ///         Parameter::option("mode")
    ///             .choice("fast", "Skip the checks.")
    ///             .choice("safe", "Run every check."),
    ///     )
    ///     .build();
    ///
    /// assert!(parser.parse_tokens(vec!["--mode", "fast"].as_slice()).is_ok());
    /// ```
    fn choice(mut self, variant: impl Into<String>, description: impl Into<String>) -> Self {
        if !matches!(
            self.inner.kind,
            ParamKind::Positional | ParamKind::Option { .. }
        ) {
            return self.misuse("choice");
        }

        let variant = variant.into();
        let choices = self.inner.choices.get_or_insert_with(Vec::default);

        if !choices.contains(&variant) {
            choices.push(variant.clone());
        }

        self.inner.choice_help.retain(|(v, _)| v != &variant);
        self.inner.choice_help.push((variant, description.into()));
        self
    }
}

/// The sub-command parameter, used with [`crate::CommandLineParser::branch`].
///
/// It binds the sub-command name, and its choices are the registered sub-commands.
pub struct Condition {
    inner: ParameterDef,
}

impl Condition {
    /// Create a condition parameter.
    ///
    /// ### Example
    /// ```
    /// # use bindarg_builder as bindarg;
    /// use bindarg::{CommandLineParser, Condition};
    ///
    /// let parser = CommandLineParser::new("program")
    ///     .branch(Condition::new("command").help("The action to take."))
    ///     .command("start", |sub| sub)
    ///     .command("stop", |sub| sub)
    ///     .build();
    ///
    /// let parsed = parser.parse_tokens(vec!["stop"].as_slice()).unwrap();
    /// assert_eq!(parsed.get::<String>("command").unwrap(), "stop");
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: ParameterDef::new(name, ParamKind::SubCommand),
        }
    }

    /// Document the help message for this sub-command condition.
    /// If repeated, only the final help message will apply.
    pub fn help(mut self, description: impl Into<String>) -> Self {
        self.inner.help.replace(description.into());
        self
    }

    pub(crate) fn consume(self) -> ParameterDef {
        self.inner
    }
}

impl Choices for Condition {
    /// Document a sub-command's help message in the listing of this condition.
    /// Without it, the listing shows the sub-command's about message.
    fn choice(mut self, variant: impl Into<String>, description: impl Into<String>) -> Self {
        let variant = variant.into();
        self.inner.choice_help.retain(|(v, _)| v != &variant);
        self.inner.choice_help.push((variant, description.into()));
        self
    }
}

/// A named set of parameters with a shared constraint.
///
/// A mutually exclusive group admits at most one of its members per invocation.
/// A mutually dependent group admits all or none of its members.
/// A group without either constraint only organizes the help message.
///
/// ### Example
/// ```
/// # use bindarg_builder as bindarg;
/// use bindarg::{CommandLineParser, ErrorKind, Parameter, ParameterGroup};
///
/// let parser = CommandLineParser::new("program")
///     .group(
///         ParameterGroup::new("output")
///             .mutually_exclusive()
///             .add(Parameter::flag("json"))
///             .add(Parameter::flag("yaml")),
///     )
///     .build();
///
/// let error = parser.resolve(&["--json", "--yaml"]).unwrap_err();
/// assert_eq!(error.kind(), ErrorKind::ParamConflict);
/// ```
pub struct ParameterGroup {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) mutually_exclusive: bool,
    pub(crate) mutually_dependent: bool,
    pub(crate) parameters: Vec<Parameter>,
}

impl ParameterGroup {
    /// Create an unconstrained parameter group.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            mutually_exclusive: false,
            mutually_dependent: false,
            parameters: Vec::default(),
        }
    }

    /// At most one member may be provided.
    pub fn mutually_exclusive(mut self) -> Self {
        self.mutually_exclusive = true;
        self
    }

    /// Either every member is provided, or none are.
    pub fn mutually_dependent(mut self) -> Self {
        self.mutually_dependent = true;
        self
    }

    /// Document the group in the help message.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description.replace(description.into());
        self
    }

    /// Add a member parameter.
    pub fn add(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }
}
