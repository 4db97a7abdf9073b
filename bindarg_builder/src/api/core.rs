use crate::api::{Condition, Parameter, ParameterGroup};
use crate::parser::{
    BranchSpec, CommandSpec, CommandTree, ConfigError, ConsoleInterface, GeneralParser, GroupSpec,
    ParameterDef, UserInterface,
};

/// The per-command behaviour of the parser.
///
/// Sub-commands inherit the configuration of their parent, unless they set their own.
///
/// ### Example
/// ```
/// # use bindarg_builder as bindarg;
/// use bindarg::{CommandConfig, CommandLineParser};
///
/// let parser = CommandLineParser::new("program")
///     .config(CommandConfig::default().allow_unknown(true))
///     .build();
///
/// let parsed = parser.parse_tokens(vec!["--unknown"].as_slice()).unwrap();
/// assert_eq!(parsed.unknown(), &["--unknown".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandConfig {
    pub(crate) action_after_action_flags: bool,
    pub(crate) multiple_action_flags: bool,
    pub(crate) allow_unknown: bool,
    pub(crate) unknown_takes_value: bool,
    pub(crate) add_help: bool,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            action_after_action_flags: true,
            multiple_action_flags: true,
            allow_unknown: false,
            unknown_takes_value: false,
            add_help: true,
        }
    }
}

impl CommandConfig {
    /// Whether the main action runs after the action flags (`true`, the default) or before them.
    pub fn action_after_action_flags(mut self, value: bool) -> Self {
        self.action_after_action_flags = value;
        self
    }

    /// Whether more than one action flag may be provided in a single invocation (default `true`).
    pub fn multiple_action_flags(mut self, value: bool) -> Self {
        self.multiple_action_flags = value;
        self
    }

    /// Whether unknown options and surplus positionals are preserved rather than rejected (default `false`).
    pub fn allow_unknown(mut self, value: bool) -> Self {
        self.allow_unknown = value;
        self
    }

    /// Whether an unknown option also keeps the token after it, when that token is not itself an option (default `false`).
    ///
    /// Only meaningful with [`CommandConfig::allow_unknown`].
    pub fn unknown_takes_value(mut self, value: bool) -> Self {
        self.unknown_takes_value = value;
        self
    }

    /// Whether the `-h, --help` action flag is registered (default `true`).
    pub fn add_help(mut self, value: bool) -> Self {
        self.add_help = value;
        self
    }
}

/// The base command line parser.
///
/// ### Example
/// ```
/// # use bindarg_builder as bindarg;
/// use bindarg::{CommandLineParser};
///
/// let parser = CommandLineParser::new("program")
///     // Configure with CommandLineParser::add and CommandLineParser::branch.
///     .build();
/// parser.parse_tokens(&[]).unwrap();
/// ```
pub struct CommandLineParser {
    spec: CommandSpec,
    deferred_error: Option<ConfigError>,
}

impl CommandLineParser {
    /// Create a command line parser.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            spec: CommandSpec {
                name: program.into(),
                about: None,
                config: None,
                parameters: Vec::default(),
                groups: Vec::default(),
                branch: None,
            },
            deferred_error: None,
        }
    }

    fn defer(&mut self, error: ConfigError) {
        if self.deferred_error.is_none() {
            self.deferred_error.replace(error);
        }
    }

    /// Document the about message for this command line parser.
    /// If repeated, only the final help message will apply.
    ///
    /// An about message documents the command line parser in full sentence/paragraph format.
    /// We recommend allowing `bindarg` to format this field (ex: it is not recommended to use line breaks `'\n'`).
    pub fn about(mut self, description: impl Into<String>) -> Self {
        self.spec.about.replace(description.into());
        self
    }

    /// Set the configuration of this command.
    /// If repeated, only the final configuration will apply.
    pub fn config(mut self, config: CommandConfig) -> Self {
        self.spec.config.replace(config);
        self
    }

    /// Add a parameter to the command line parser.
    ///
    /// The order of positional parameters corresponds to their positional order during parsing.
    /// The order of the other parameters does not affect the parser semantics.
    ///
    /// ### Example
    /// ```
    /// # use bindarg_builder as bindarg;
    /// use bindarg::{CommandLineParser, Convert, Parameter};
    ///
    /// let parser = CommandLineParser::new("program")
    ///     .add(Parameter::positional("a").convert(Convert::integer()))
    ///     .add(Parameter::positional("b").convert(Convert::integer()))
    ///     .build();
    ///
    /// let parsed = parser.parse_tokens(vec!["1", "2"].as_slice()).unwrap();
    ///
    /// assert_eq!(parsed.get::<u32>("a").unwrap(), 1);
    /// assert_eq!(parsed.get::<u32>("b").unwrap(), 2);
    /// ```
    pub fn add(mut self, parameter: Parameter) -> Self {
        match parameter.consume() {
            Ok(inner) => self.spec.parameters.push(inner),
            Err(error) => self.defer(error),
        }

        self
    }

    /// Add a group of parameters to the command line parser.
    ///
    /// The members are added as if by [`CommandLineParser::add`], and the group constraint is checked after every token is matched.
    pub fn group(mut self, group: ParameterGroup) -> Self {
        let ParameterGroup {
            name,
            description,
            mutually_exclusive,
            mutually_dependent,
            parameters,
        } = group;
        let members = parameters.iter().map(|p| p.name().to_string()).collect();
        self.spec.groups.push(GroupSpec {
            name,
            description,
            members,
            mutually_exclusive,
            mutually_dependent,
        });

        parameters.into_iter().fold(self, |clp, parameter| clp.add(parameter))
    }

    /// Branch into a sub-command parser.
    ///
    /// This changes the command line parser into a sub-command style command line parser.
    /// Any parameters added before the branch apply to the root parser.
    ///
    /// Branching is always done with a special positional: [`Condition`].
    /// It is matched after the root's positionals, so those must take a fixed number of values.
    ///
    /// ### Example
    /// ```
    /// # use bindarg_builder as bindarg;
    /// use bindarg::{CommandLineParser, Condition, Convert, Parameter};
    ///
    /// let parser = CommandLineParser::new("program")
    ///     .add(Parameter::positional("belongs_to_root").convert(Convert::integer()))
    ///     .branch(Condition::new("sub_command"))
    ///     .command("the-command", |sub| {
    ///         sub.add(Parameter::positional("belongs_to_sub_command").convert(Convert::integer()))
    ///     })
    ///     .build();
    ///
    /// let parsed = parser.parse_tokens(vec!["1", "the-command", "2"].as_slice()).unwrap();
    ///
    /// assert_eq!(parsed.get::<u32>("belongs_to_root").unwrap(), 1);
    /// assert_eq!(parsed.get::<String>("sub_command").unwrap(), "the-command");
    /// assert_eq!(parsed.get::<u32>("belongs_to_sub_command").unwrap(), 2);
    /// assert_eq!(parsed.path(), &["program".to_string(), "the-command".to_string()]);
    /// ```
    pub fn branch(self, condition: Condition) -> SubCommandParser {
        SubCommandParser::new(self, condition.consume())
    }

    #[cfg(test)]
    pub(crate) fn into_tree(self) -> CommandTree {
        CommandTree::build(self.into_spec().unwrap()).unwrap()
    }

    fn into_spec(self) -> Result<CommandSpec, ConfigError> {
        match self.deferred_error {
            Some(error) => Err(error),
            None => Ok(self.spec),
        }
    }

    pub(crate) fn build_with_interface(
        self,
        user_interface: Box<dyn UserInterface>,
    ) -> Result<GeneralParser, ConfigError> {
        let tree = CommandTree::build(self.into_spec()?)?;
        Ok(GeneralParser::new(tree, user_interface))
    }

    /// Build the command line parser as a Result.
    /// This finalizes the configuration and checks for errors (ex: a repeated parameter name).
    pub fn build_parser(self) -> Result<GeneralParser, ConfigError> {
        self.build_with_interface(Box::new(ConsoleInterface::default()))
    }

    /// Build the command line parser.
    /// This finalizes the configuration and checks for errors (ex: a repeated parameter name).
    /// If an error is encountered, exits with error code `1` (via [`std::process::exit`]).
    pub fn build(self) -> GeneralParser {
        match self.build_parser() {
            Ok(gp) => gp,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
    }
}

/// The sub-command parser.
pub struct SubCommandParser {
    root: CommandLineParser,
    condition: ParameterDef,
    commands: Vec<(String, CommandSpec)>,
    default: Option<String>,
}

impl SubCommandParser {
    fn new(root: CommandLineParser, condition: ParameterDef) -> Self {
        Self {
            root,
            condition,
            commands: Vec::default(),
            default: None,
        }
    }

    /// Setup a sub-command.
    ///
    /// If repeated for the same `variant`, only the final version will be created on the parser.
    /// The order of sub-commands does not affect the command parser semantics.
    ///
    /// ### Example
    /// ```
    /// # use bindarg_builder as bindarg;
    /// use bindarg::{CommandLineParser, Condition, Convert, Parameter};
    ///
    /// let parser = CommandLineParser::new("program")
    ///     .branch(Condition::new("sub_command"))
    ///     .command("a", |sub| sub.add(Parameter::positional("value_a").convert(Convert::integer())))
    ///     .command("b", |sub| {
    ///         sub.about("Description for the sub-command 'b'.")
    ///             .add(Parameter::positional("value_b").convert(Convert::integer()))
    ///     })
    ///     .build();
    ///
    /// let parsed = parser.parse_tokens(vec!["a", "1"].as_slice()).unwrap();
    ///
    /// assert_eq!(parsed.command(), "a");
    /// assert_eq!(parsed.get::<u32>("value_a").unwrap(), 1);
    /// assert!(parsed.value("value_b").is_none());
    /// ```
    pub fn command(
        mut self,
        variant: impl Into<String>,
        setup_fn: impl FnOnce(SubCommand) -> SubCommand,
    ) -> Self {
        let variant = variant.into();
        let inner = CommandLineParser::new(variant.clone());
        let sub_command = setup_fn(SubCommand { inner });

        match sub_command.inner.into_spec() {
            Ok(spec) => {
                self.commands.retain(|(v, _)| v != &variant);
                self.commands.push((variant, spec));
            }
            Err(error) => self.root.defer(error),
        }

        self
    }

    /// Descend into `variant` when no sub-command is named on the command line.
    /// If repeated, only the final default will apply.
    ///
    /// ### Example
    /// ```
    /// # use bindarg_builder as bindarg;
    /// use bindarg::{CommandLineParser, Condition, Parameter};
    ///
    /// let parser = CommandLineParser::new("program")
    ///     .branch(Condition::new("sub_command"))
    ///     .command("list", |sub| sub.add(Parameter::flag("all")))
    ///     .command("show", |sub| sub)
    ///     .default_command("list")
    ///     .build();
    ///
    /// let parsed = parser.parse_tokens(vec!["--all"].as_slice()).unwrap();
    ///
    /// assert_eq!(parsed.command(), "list");
    /// assert!(parsed.get::<bool>("all").unwrap());
    /// ```
    pub fn default_command(mut self, variant: impl Into<String>) -> Self {
        self.default.replace(variant.into());
        self
    }

    pub(crate) fn into_root(self) -> CommandLineParser {
        let mut root = self.root;

        if root.spec.branch.is_some() {
            root.defer(ConfigError::CommandDefinition(format!(
                "Cannot branch '{}' more than once.",
                root.spec.name
            )));
        }

        root.spec.branch.replace(BranchSpec {
            condition: self.condition,
            commands: self.commands,
            default: self.default,
        });
        root
    }

    #[cfg(test)]
    pub(crate) fn build_with_interface(
        self,
        user_interface: Box<dyn UserInterface>,
    ) -> Result<GeneralParser, ConfigError> {
        self.into_root().build_with_interface(user_interface)
    }

    /// Build the sub-command based command line parser as a Result.
    /// This finalizes the configuration and checks for errors (ex: a repeated parameter name).
    pub fn build_parser(self) -> Result<GeneralParser, ConfigError> {
        self.into_root().build_parser()
    }

    /// Build the sub-command based command line parser.
    /// This finalizes the configuration and checks for errors (ex: a repeated parameter name).
    /// If an error is encountered, exits with error code `1` (via [`std::process::exit`]).
    pub fn build(self) -> GeneralParser {
        self.into_root().build()
    }
}

/// A sub-command line parser.
///
/// Used with [`SubCommandParser::command`].
pub struct SubCommand {
    inner: CommandLineParser,
}

impl SubCommand {
    /// *Available using 'unit_test' crate feature only.*</br></br>
    /// Build a [`SubCommand`] for use in testing.
    ///
    /// ### Example
    /// ```
    /// # use bindarg_builder as bindarg;
    /// use bindarg::{Convert, Parameter, SubCommand};
    ///
    /// // Function under test.
    /// // We want to make sure the setup_fn is wired up correctly.
    /// pub fn setup_fn() -> impl FnOnce(SubCommand) -> SubCommand {
    ///     |sub| sub.add(Parameter::positional("value").convert(Convert::integer()))
    /// }
    ///
    /// let parser = setup_fn()(SubCommand::test_dummy()).build_parser().unwrap();
    /// let parsed = parser.parse_tokens(vec!["2"].as_slice()).unwrap();
    /// assert_eq!(parsed.get::<u32>("value").unwrap(), 2);
    /// ```
    #[cfg(feature = "unit_test")]
    pub fn test_dummy() -> Self {
        SubCommand {
            inner: CommandLineParser::new("test-dummy"),
        }
    }

    /// *Available using 'unit_test' crate feature only.*</br></br>
    /// Build a [`GeneralParser`] for testing.
    /// See [`SubCommand::test_dummy`] for an example.
    #[cfg(feature = "unit_test")]
    pub fn build_parser(self) -> Result<GeneralParser, ConfigError> {
        self.inner.build_parser()
    }

    /// Document the about message for this sub-command.
    /// If repeated, only the final help message will apply.
    ///
    /// See [`SubCommandParser::command`] for usage.
    pub fn about(self, description: impl Into<String>) -> Self {
        SubCommand {
            inner: self.inner.about(description),
        }
    }

    /// Set the configuration of this sub-command (otherwise inherited from its parent).
    pub fn config(self, config: CommandConfig) -> Self {
        SubCommand {
            inner: self.inner.config(config),
        }
    }

    /// Add a parameter to the sub-command.
    ///
    /// See [`SubCommandParser::command`] for usage.
    pub fn add(self, parameter: Parameter) -> Self {
        SubCommand {
            inner: self.inner.add(parameter),
        }
    }

    /// Add a group of parameters to the sub-command.
    pub fn group(self, group: ParameterGroup) -> Self {
        SubCommand {
            inner: self.inner.group(group),
        }
    }

    /// Branch this sub-command into its own sub-commands.
    ///
    /// ### Example
    /// ```
    /// # use bindarg_builder as bindarg;
    /// use bindarg::{CommandLineParser, Condition, Parameter};
    ///
    /// let parser = CommandLineParser::new("program")
    ///     .branch(Condition::new("area"))
    ///     .command("remote", |sub| {
    ///         sub.branch(Condition::new("action"), |remote| {
    ///             remote
    ///                 .command("add", |add| add.add(Parameter::positional("url")))
    ///                 .command("remove", |remove| remove)
    ///         })
    ///     })
    ///     .build();
    ///
    /// let parsed = parser.parse_tokens(vec!["remote", "add", "https://example.com"].as_slice()).unwrap();
    ///
    /// assert_eq!(parsed.path(), &["program", "remote", "add"]);
    /// assert_eq!(parsed.get::<String>("url").unwrap(), "https://example.com");
    /// ```
    pub fn branch(
        self,
        condition: Condition,
        setup_fn: impl FnOnce(SubCommandParser) -> SubCommandParser,
    ) -> Self {
        let sub_command_parser = setup_fn(self.inner.branch(condition));
        SubCommand {
            inner: sub_command_parser.into_root(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Parameter;
    use crate::model::{Nargs, Value};
    use crate::parser::util::channel_interface;
    use crate::parser::{ErrorKind, UsageError};
    use crate::test::assert_contains;
    use rstest::rstest;

    #[test]
    fn empty_build() {
        // Setup
        let clp = CommandLineParser::new("program");

        // Execute
        let parser = clp.build_parser().unwrap();

        // Verify
        let parsed = parser.parse_tokens(&[]).unwrap();
        assert_eq!(parsed.path(), &["program".to_string()]);
        assert_eq!(parsed.values().len(), 0);
    }

    #[rstest]
    #[case(vec![], false, vec![])]
    #[case(vec!["1"], false, vec![1])]
    #[case(vec!["01"], false, vec![1])]
    #[case(vec!["1", "3", "2"], false, vec![1, 3, 2])]
    #[case(vec!["--flag"], true, vec![])]
    #[case(vec!["--flag", "1"], true, vec![1])]
    #[case(vec!["-f", "01"], true, vec![1])]
    #[case(vec!["1", "--flag", "3", "2"], true, vec![1, 3, 2])]
    fn build(
        #[case] tokens: Vec<&str>,
        #[case] expected_flag: bool,
        #[case] expected_items: Vec<u32>,
    ) {
        // Setup
        let clp = CommandLineParser::new("program")
            .about("abc def")
            .add(Parameter::flag("flag").short('f'))
            .add(
                Parameter::positional("item")
                    .nargs(Nargs::any())
                    .convert(crate::api::Convert::integer()),
            );

        // Execute
        let parser = clp.build_parser().unwrap();

        // Verify
        let parsed = parser.parse_tokens(tokens.as_slice()).unwrap();
        assert_eq!(parsed.get::<bool>("flag").unwrap(), expected_flag);
        assert_eq!(parsed.get::<Vec<u32>>("item").unwrap(), expected_items);
    }

    #[test]
    fn build_deferred_error() {
        let error = CommandLineParser::new("program")
            .add(Parameter::positional("a").short('a'))
            .add(Parameter::flag("b").priority(1))
            .build_parser()
            .unwrap_err();
        assert_matches!(error, ConfigError::ParameterDefinition { parameter, .. } if parameter == "a");
    }

    #[test]
    fn build_duplicate_parameter() {
        let error = CommandLineParser::new("program")
            .add(Parameter::flag("a"))
            .add(Parameter::option("a"))
            .build_parser()
            .unwrap_err();
        assert_eq!(
            error,
            ConfigError::CommandDefinition("Cannot duplicate the parameter 'a'.".to_string())
        );
    }

    #[test]
    fn group() {
        let parser = CommandLineParser::new("program")
            .group(
                ParameterGroup::new("pair")
                    .mutually_dependent()
                    .add(Parameter::option("x"))
                    .add(Parameter::option("y")),
            )
            .build_parser()
            .unwrap();

        parser.resolve(&["--x", "1", "--y", "2"]).unwrap();
        assert_matches!(
            parser.resolve(&["--x", "1"]),
            Err(UsageError::MutuallyDependent { missing, .. }) if missing == vec!["--y".to_string()]
        );
    }

    #[rstest]
    #[case(vec!["a", "1"], "a", Some(Value::Int(1)), None)]
    #[case(vec!["b", "x"], "b", None, Some(Value::Str("x".to_string())))]
    fn sub_command(
        #[case] tokens: Vec<&str>,
        #[case] expected_command: &str,
        #[case] expected_a: Option<Value>,
        #[case] expected_b: Option<Value>,
    ) {
        // Setup
        let parser = CommandLineParser::new("program")
            .add(Parameter::flag("verbose").short('v'))
            .branch(Condition::new("sub"))
            .command("a", |sub| {
                sub.add(Parameter::positional("value_a").convert(crate::api::Convert::integer()))
            })
            .command("b", |sub| sub.add(Parameter::positional("value_b")))
            .build_parser()
            .unwrap();

        // Execute
        let parsed = parser.resolve(&tokens).unwrap();

        // Verify
        assert_eq!(parsed.command(), expected_command);
        assert_eq!(parsed.get::<String>("sub").unwrap(), expected_command);
        assert_eq!(parsed.value("value_a").cloned(), expected_a);
        assert_eq!(parsed.value("value_b").cloned(), expected_b);
        assert_eq!(parsed.value("verbose"), Some(&Value::Bool(false)));
    }

    #[test]
    fn sub_command_repeated() {
        let parser = CommandLineParser::new("program")
            .branch(Condition::new("sub"))
            .command("a", |sub| sub.add(Parameter::positional("first")))
            .command("a", |sub| sub.add(Parameter::flag("second")))
            .build_parser()
            .unwrap();

        let parsed = parser.resolve(&["a", "--second"]).unwrap();
        assert!(parsed.get::<bool>("second").unwrap());
        assert!(parsed.value("first").is_none());
    }

    #[test]
    fn sub_command_deferred_error() {
        let error = CommandLineParser::new("program")
            .branch(Condition::new("sub"))
            .command("a", |sub| sub.add(Parameter::counter("c").nargs(Nargs::any())))
            .build_parser()
            .unwrap_err();
        assert_matches!(error, ConfigError::ParameterDefinition { parameter, .. } if parameter == "c");
    }

    #[test]
    fn sub_command_config_inherited() {
        let parser = CommandLineParser::new("program")
            .config(CommandConfig::default().allow_unknown(true))
            .branch(Condition::new("sub"))
            .command("a", |sub| sub)
            .command("b", |sub| sub.config(CommandConfig::default()))
            .build_parser()
            .unwrap();

        let parsed = parser.resolve(&["a", "--x"]).unwrap();
        assert_eq!(parsed.unknown(), &["--x".to_string()]);
        assert_eq!(
            parser.resolve(&["b", "--x"]).unwrap_err().kind(),
            ErrorKind::NoSuchOption
        );
    }

    #[test]
    fn sub_command_nested() {
        let parser = CommandLineParser::new("program")
            .branch(Condition::new("area"))
            .command("remote", |sub| {
                sub.add(Parameter::flag("dry-run"))
                    .branch(Condition::new("action"), |remote| {
                        remote
                            .command("add", |add| add.add(Parameter::positional("url")))
                            .command("list", |list| list)
                            .default_command("list")
                    })
            })
            .build_parser()
            .unwrap();

        let parsed = parser.resolve(&["remote", "--dry-run"]).unwrap();
        assert_eq!(parsed.path(), &["program", "remote", "list"]);
        assert!(parsed.get::<bool>("dry-run").unwrap());

        let parsed = parser.resolve(&["remote", "add", "x", "--dry-run"]).unwrap();
        assert_eq!(parsed.path(), &["program", "remote", "add"]);
        assert_eq!(parsed.get::<String>("url").unwrap(), "x");
    }

    #[rstest]
    #[case(vec!["--all"], "list", Some(Value::Bool(true)))]
    #[case(vec!["-a"], "list", Some(Value::Bool(true)))]
    #[case(vec!["list", "--all"], "list", Some(Value::Bool(true)))]
    #[case(vec![], "list", Some(Value::Bool(false)))]
    #[case(vec!["show"], "show", None)]
    fn sub_command_default_option(
        #[case] tokens: Vec<&str>,
        #[case] expected_command: &str,
        #[case] expected_all: Option<Value>,
    ) {
        // Setup
        let parser = CommandLineParser::new("program")
            .branch(Condition::new("sub"))
            .command("list", |sub| sub.add(Parameter::flag("all").short('a')))
            .command("show", |sub| sub)
            .default_command("list")
            .build_parser()
            .unwrap();

        // Execute
        let parsed = parser.resolve(&tokens).unwrap();

        // Verify
        assert_eq!(parsed.command(), expected_command);
        assert_eq!(parsed.value("all").cloned(), expected_all);
    }

    #[test]
    fn sub_command_branch_twice() {
        let error = CommandLineParser::new("program")
            .branch(Condition::new("area"))
            .command("remote", |sub| {
                sub.branch(Condition::new("one"), |p| p.command("x", |x| x))
                    .branch(Condition::new("two"), |p| p.command("y", |y| y))
            })
            .build_parser()
            .unwrap_err();
        assert_matches!(error, ConfigError::CommandDefinition(message) if message.contains("more than once"));
    }

    #[test]
    fn sub_command_help() {
        // Setup
        let (sender, receiver) = channel_interface();
        let parser = CommandLineParser::new("program")
            .branch(Condition::new("sub"))
            .command("a", |sub| sub.about("Does the a thing."))
            .build_with_interface(Box::new(sender))
            .unwrap();

        // Execute
        let error_code = parser.parse_tokens(vec!["a", "-h"].as_slice()).unwrap_err();
        drop(parser);

        // Verify
        assert_eq!(error_code, 0);
        let message = receiver.consume_message();
        assert_contains!(message, "usage: program a");
        assert_contains!(message, "Does the a thing.");
    }
}
