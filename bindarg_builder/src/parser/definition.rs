use std::collections::{BTreeMap, HashMap, HashSet};
use std::env;
use std::sync::Arc;

use crate::api::{CommandConfig, Convert, Parsed};
use crate::constant::*;
use crate::matcher::looks_like_option;
use crate::model::{Nargs, Value};
use crate::parser::{ConfigError, UsageError};

pub(crate) type CommandId = usize;
pub(crate) type ActionCallback = dyn Fn(&Parsed) -> Result<(), UsageError> + Send + Sync;

/// A stable handle to a parameter within a built parser.
///
/// Handles are ordered by command (root first) and then by declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamId {
    pub(crate) command: CommandId,
    pub(crate) index: usize,
}

impl ParamId {
    pub(crate) fn new(command: CommandId, index: usize) -> Self {
        Self { command, index }
    }
}

#[derive(Clone)]
pub(crate) enum ActionFn {
    Help,
    Call(Arc<ActionCallback>),
}

impl std::fmt::Debug for ActionFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionFn::Help => write!(f, "Help"),
            ActionFn::Call(_) => write!(f, "Call(..)"),
        }
    }
}

// The closed set of parameter variants.
// The matcher and the binding dispatch exhaustively over these.
#[derive(Debug, Clone)]
pub(crate) enum ParamKind {
    Positional,
    Option { append: bool },
    Flag { constant: Value, append: bool },
    TriFlag { primary: Value, alternate: Value },
    Counter { step: i64 },
    ActionFlag { priority: i32, action: ActionFn },
    PassThru,
    SubCommand,
}

#[derive(Debug, Clone)]
pub(crate) struct ParameterDef {
    pub(crate) name: String,
    pub(crate) long: Option<String>,
    pub(crate) short: Option<char>,
    pub(crate) alt_long: Option<String>,
    pub(crate) alt_short: Option<char>,
    pub(crate) env_vars: Vec<String>,
    pub(crate) nargs: Nargs,
    pub(crate) convert: Convert,
    pub(crate) choices: Option<Vec<String>>,
    pub(crate) choice_help: Vec<(String, String)>,
    pub(crate) required: bool,
    pub(crate) default: Option<Value>,
    pub(crate) short_combinable: bool,
    pub(crate) help: Option<String>,
    pub(crate) hidden: bool,
    pub(crate) kind: ParamKind,
}

impl ParameterDef {
    pub(crate) fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        let name = name.into();
        let (long, nargs, required) = match &kind {
            ParamKind::Positional => (None, Nargs::precisely(1), true),
            ParamKind::Option { .. } => (Some(name.clone()), Nargs::precisely(1), false),
            ParamKind::Counter { .. } => (Some(name.clone()), Nargs::optional(), false),
            ParamKind::Flag { .. } | ParamKind::ActionFlag { .. } | ParamKind::TriFlag { .. } => {
                (Some(name.clone()), Nargs::precisely(0), false)
            }
            ParamKind::PassThru => (None, Nargs::remainder(), false),
            ParamKind::SubCommand => (None, Nargs::precisely(1), true),
        };
        let alt_long = match &kind {
            ParamKind::TriFlag { .. } => Some(format!("no-{name}")),
            _ => None,
        };

        Self {
            name,
            long,
            short: None,
            alt_long,
            alt_short: None,
            env_vars: Vec::default(),
            nargs,
            convert: Convert::default(),
            choices: None,
            choice_help: Vec::default(),
            required,
            default: None,
            short_combinable: true,
            help: None,
            hidden: false,
            kind,
        }
    }

    pub(crate) fn help_flag() -> Self {
        let mut help = ParameterDef::new(
            HELP_NAME,
            ParamKind::ActionFlag {
                priority: i32::MIN,
                action: ActionFn::Help,
            },
        );
        help.short = Some(HELP_SHORT);
        help.help = Some(HELP_MESSAGE.to_string());
        help
    }

    pub(crate) fn is_help(&self) -> bool {
        matches!(
            self.kind,
            ParamKind::ActionFlag {
                action: ActionFn::Help,
                ..
            }
        )
    }

    pub(crate) fn is_positional(&self) -> bool {
        matches!(self.kind, ParamKind::Positional | ParamKind::SubCommand)
    }

    /// Whether a single consumed value is stored as a scalar (rather than accumulated in a list).
    pub(crate) fn stores_scalar(&self) -> bool {
        match &self.kind {
            ParamKind::Positional => self.nargs == Nargs::precisely(1),
            ParamKind::Option { append } => !append,
            _ => false,
        }
    }

    /// How this parameter is written on the command line.
    pub(crate) fn usage_name(&self) -> String {
        match (&self.long, &self.short) {
            (Some(long), _) => format!("--{long}"),
            (None, Some(short)) => format!("-{short}"),
            (None, None) => self.name.clone(),
        }
    }

    /// How the alternate option string of a tri-flag is written on the command line.
    pub(crate) fn switch_name(&self, alternate: bool) -> String {
        if !alternate {
            return self.usage_name();
        }

        match (&self.alt_long, &self.alt_short) {
            (Some(long), _) => format!("--{long}"),
            (None, Some(short)) => format!("-{short}"),
            (None, None) => self.name.clone(),
        }
    }

    pub(crate) fn is_alternate_long(&self, long: &str) -> bool {
        self.alt_long.as_deref() == Some(long)
    }

    pub(crate) fn is_alternate_short(&self, short: char) -> bool {
        self.alt_short == Some(short)
    }

    /// Every option string of the parameter, as written on the command line.
    pub(crate) fn option_strings(&self) -> Vec<String> {
        let longs = self.long.iter().chain(self.alt_long.iter()).map(|l| format!("--{l}"));
        let shorts = self.short.iter().chain(self.alt_short.iter()).map(|s| format!("-{s}"));
        longs.chain(shorts).collect()
    }

    /// A cheap check on whether `text` could be one of this parameter's values.
    pub(crate) fn is_valid_arg(&self, text: &str) -> bool {
        match &self.kind {
            ParamKind::Flag { .. }
            | ParamKind::ActionFlag { .. }
            | ParamKind::TriFlag { .. }
            | ParamKind::SubCommand => false,
            ParamKind::Counter { .. } => text.parse::<i64>().is_ok(),
            ParamKind::PassThru => true,
            ParamKind::Positional if self.nargs.is_remainder() => true,
            ParamKind::Positional | ParamKind::Option { .. } => !looks_like_option(text),
        }
    }

    /// Whether the parameter, having already consumed `consumed` values for the current occurrence, would take `text` as the next one.
    pub(crate) fn would_accept(&self, consumed: usize, text: &str) -> bool {
        self.nargs.can_accept_more(consumed) && self.is_valid_arg(text)
    }

    /// Apply the choices and type conversion to a single token.
    pub(crate) fn prepare_value(&self, text: &str, index: usize) -> Result<Value, UsageError> {
        if let Some(choices) = &self.choices {
            if !choices.iter().any(|choice| choice == text) {
                return Err(UsageError::InvalidChoice {
                    parameter: self.name.clone(),
                    token: text.to_string(),
                    index,
                    choices: choices.clone(),
                });
            }
        }

        self.convert
            .apply(text)
            .map_err(|error| self.usage_error(Some(text), Some(index), error.to_string()))
    }

    /// The value taken from the first of the parameter's environment variables which is set, if any.
    pub(crate) fn env_value(&self) -> Result<Option<Value>, UsageError> {
        let (env_var, text) = match self
            .env_vars
            .iter()
            .find_map(|env_var| env::var(env_var).ok().map(|text| (env_var, text)))
        {
            Some(found) => found,
            None => return Ok(None),
        };
        let invalid = |detail: String| {
            self.usage_error(
                Some(&text),
                None,
                format!("cannot use '{text}' from the environment variable '{env_var}' ({detail})"),
            )
        };
        let switch = || match Convert::boolean().apply(&text) {
            Ok(Value::Bool(on)) => Ok(on),
            Ok(_) => unreachable!("internal error - boolean conversion only yields booleans"),
            Err(error) => Err(invalid(error.to_string())),
        };

        let value = match &self.kind {
            ParamKind::Option { .. } => {
                if let Some(choices) = &self.choices {
                    if !choices.contains(&text) {
                        return Err(invalid(format!("choose from {}", choices.join(", "))));
                    }
                }

                let value = self
                    .convert
                    .apply(&text)
                    .map_err(|error| invalid(error.to_string()))?;

                if self.stores_scalar() {
                    value
                } else {
                    Value::List(vec![value])
                }
            }
            ParamKind::Flag { constant, append } => match (switch()?, append) {
                (true, true) => Value::List(vec![constant.clone()]),
                (true, false) => constant.clone(),
                (false, _) => self.default_value(),
            },
            ParamKind::TriFlag { primary, alternate } => {
                if switch()? {
                    primary.clone()
                } else {
                    alternate.clone()
                }
            }
            ParamKind::Counter { .. } => Value::Int(
                text.parse::<i64>()
                    .map_err(|_| invalid("expected an integer count".to_string()))?,
            ),
            ParamKind::Positional
            | ParamKind::ActionFlag { .. }
            | ParamKind::PassThru
            | ParamKind::SubCommand => return Ok(None),
        };

        #[cfg(feature = "tracing_debug")]
        {
            tracing::debug!("Parameter '{}' takes {value:?} from '{env_var}'.", self.name);
        }

        Ok(Some(value))
    }

    pub(crate) fn usage_error(
        &self,
        token: Option<&str>,
        index: Option<usize>,
        reason: impl Into<String>,
    ) -> UsageError {
        if self.is_positional() {
            UsageError::BadArgumentUsage {
                parameter: self.name.clone(),
                token: token.map(|t| t.to_string()),
                index,
                reason: reason.into(),
            }
        } else {
            UsageError::BadOptionUsage {
                parameter: self.usage_name(),
                token: token.map(|t| t.to_string()),
                index,
                reason: reason.into(),
            }
        }
    }

    /// The value of this parameter when it is never provided.
    pub(crate) fn default_value(&self) -> Value {
        if let Some(default) = &self.default {
            return default.clone();
        }

        match &self.kind {
            ParamKind::Positional | ParamKind::Option { .. } => {
                if self.stores_scalar() {
                    Value::None
                } else {
                    Value::List(Vec::default())
                }
            }
            ParamKind::Flag { append: true, .. } => Value::List(Vec::default()),
            ParamKind::Flag { constant, .. } => match constant {
                Value::Bool(b) => Value::Bool(!b),
                _ => Value::None,
            },
            ParamKind::Counter { .. } => Value::Int(0),
            ParamKind::ActionFlag { .. } => Value::Bool(false),
            ParamKind::TriFlag { .. } => Value::None,
            ParamKind::PassThru | ParamKind::SubCommand => Value::None,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty()
            || self.name.starts_with('-')
            || self.name.contains(|c: char| c == '=' || c.is_whitespace())
        {
            return Err(ConfigError::parameter(
                &self.name,
                "must be non-empty, must not start with '-', and must not contain '=' or whitespace",
            ));
        }

        for short in self.short.iter().chain(self.alt_short.iter()) {
            if *short == '-' || *short == '=' || short.is_whitespace() {
                return Err(ConfigError::parameter(
                    &self.name,
                    format!("cannot use '{short}' as a short option"),
                ));
            }
        }

        if let Some(long) = &self.alt_long {
            if long.is_empty()
                || long.starts_with('-')
                || long.contains(|c: char| c == '=' || c.is_whitespace())
            {
                return Err(ConfigError::parameter(
                    &self.name,
                    format!("cannot use '{long}' as an alternate option"),
                ));
            }
        }

        if let Some(choices) = &self.choices {
            if choices.is_empty() {
                return Err(ConfigError::parameter(&self.name, "cannot have empty choices"));
            }
        }

        match &self.kind {
            ParamKind::Option { append } => {
                if self.nargs.min() == 0 {
                    return Err(ConfigError::parameter(
                        &self.name,
                        format!(
                            "cannot use nargs {} since options require a value (use a flag or counter instead)",
                            self.nargs
                        ),
                    ));
                }

                if !append && self.nargs != Nargs::precisely(1) {
                    return Err(ConfigError::parameter(
                        &self.name,
                        format!(
                            "cannot store nargs {} as a single value (use append instead)",
                            self.nargs
                        ),
                    ));
                }
            }
            ParamKind::Positional => {
                if self.nargs.max() == Some(0) {
                    return Err(ConfigError::parameter(
                        &self.name,
                        "must accept at least one value",
                    ));
                }
            }
            ParamKind::Counter { .. } => {
                if !matches!(self.default, None | Some(Value::Int(_))) {
                    return Err(ConfigError::parameter(
                        &self.name,
                        "must have an integer default",
                    ));
                }
            }
            ParamKind::TriFlag { primary, alternate } => {
                if primary == alternate {
                    return Err(ConfigError::parameter(
                        &self.name,
                        "must store different primary and alternate values",
                    ));
                }

                if let Some(default) = &self.default {
                    if default == primary || default == alternate {
                        return Err(ConfigError::parameter(
                            &self.name,
                            "must not default to either its primary or alternate value",
                        ));
                    }
                }
            }
            ParamKind::Flag { .. }
            | ParamKind::ActionFlag { .. }
            | ParamKind::PassThru
            | ParamKind::SubCommand => {}
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct GroupDef {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) members: Vec<usize>,
    pub(crate) mutually_exclusive: bool,
    pub(crate) mutually_dependent: bool,
}

// The builder side inputs, before validation.
pub(crate) struct CommandSpec {
    pub(crate) name: String,
    pub(crate) about: Option<String>,
    pub(crate) config: Option<CommandConfig>,
    pub(crate) parameters: Vec<ParameterDef>,
    pub(crate) groups: Vec<GroupSpec>,
    pub(crate) branch: Option<BranchSpec>,
}

pub(crate) struct GroupSpec {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) members: Vec<String>,
    pub(crate) mutually_exclusive: bool,
    pub(crate) mutually_dependent: bool,
}

pub(crate) struct BranchSpec {
    pub(crate) condition: ParameterDef,
    pub(crate) commands: Vec<(String, CommandSpec)>,
    pub(crate) default: Option<String>,
}

#[derive(Debug)]
pub(crate) struct CommandDef {
    pub(crate) name: String,
    pub(crate) program: String,
    pub(crate) about: Option<String>,
    pub(crate) config: CommandConfig,
    pub(crate) parameters: Vec<ParameterDef>,
    pub(crate) positionals: Vec<usize>,
    pub(crate) long_options: HashMap<String, usize>,
    pub(crate) short_options: HashMap<char, usize>,
    pub(crate) pass_thru: Option<usize>,
    pub(crate) sub_command: Option<usize>,
    pub(crate) children: BTreeMap<String, CommandId>,
    pub(crate) default_child: Option<String>,
    pub(crate) groups: Vec<GroupDef>,
    pub(crate) parent: Option<CommandId>,
}

impl CommandDef {
    fn new(
        name: String,
        program: String,
        about: Option<String>,
        config: CommandConfig,
        parameters: Vec<ParameterDef>,
        parent: Option<CommandId>,
    ) -> Result<Self, ConfigError> {
        let mut names = HashSet::new();
        let mut positionals = Vec::default();
        let mut long_options = HashMap::default();
        let mut short_options = HashMap::default();
        let mut pass_thru = None;
        let mut sub_command = None;

        for (index, parameter) in parameters.iter().enumerate() {
            parameter.validate()?;

            if !names.insert(parameter.name.as_str()) {
                return Err(ConfigError::CommandDefinition(format!(
                    "Cannot duplicate the parameter '{}'.",
                    parameter.name
                )));
            }

            for long in parameter.long.iter().chain(parameter.alt_long.iter()) {
                if long_options.insert(long.clone(), index).is_some() {
                    return Err(ConfigError::CommandDefinition(format!(
                        "Cannot duplicate the option '--{long}'."
                    )));
                }
            }

            for short in parameter.short.iter().chain(parameter.alt_short.iter()) {
                if short_options.insert(*short, index).is_some() {
                    return Err(ConfigError::CommandDefinition(format!(
                        "Cannot duplicate the short option '-{short}'."
                    )));
                }
            }

            match &parameter.kind {
                ParamKind::Positional => positionals.push(index),
                ParamKind::PassThru => {
                    if pass_thru.replace(index).is_some() {
                        return Err(ConfigError::CommandDefinition(format!(
                            "Cannot declare the pass-through '{}' since '{program}' already has one.",
                            parameter.name
                        )));
                    }
                }
                ParamKind::SubCommand => {
                    sub_command.replace(index);
                }
                _ => {}
            }
        }

        let mut bounded_prefix = true;

        for (i, index) in positionals.iter().enumerate() {
            let parameter = &parameters[*index];

            if parameter.nargs.is_remainder() {
                if i + 1 != positionals.len() {
                    return Err(ConfigError::parameter(
                        &parameter.name,
                        "must be the final positional since it takes the remainder",
                    ));
                }

                if !bounded_prefix {
                    return Err(ConfigError::parameter(
                        &parameter.name,
                        "cannot take the remainder after an unbounded positional",
                    ));
                }
            }

            if parameter.nargs.max().is_none() {
                bounded_prefix = false;
            }

            if sub_command.is_some() && !parameter.nargs.is_fixed() {
                return Err(ConfigError::parameter(
                    &parameter.name,
                    format!(
                        "must use a fixed nargs (not {}) since it precedes a sub-command",
                        parameter.nargs
                    ),
                ));
            }
        }

        Ok(Self {
            name,
            program,
            about,
            config,
            parameters,
            positionals,
            long_options,
            short_options,
            pass_thru,
            sub_command,
            children: BTreeMap::default(),
            default_child: None,
            groups: Vec::default(),
            parent,
        })
    }

    pub(crate) fn positional_nargs(&self) -> Vec<&Nargs> {
        self.positionals
            .iter()
            .map(|index| &self.parameters[*index].nargs)
            .collect()
    }

    /// The number of positional tokens which precede the sub-command name.
    pub(crate) fn sub_command_position(&self) -> Option<usize> {
        self.sub_command.map(|_| {
            self.positionals
                .iter()
                .map(|index| self.parameters[*index].nargs.min())
                .sum()
        })
    }

    /// When the final positional takes the remainder: the most tokens the positionals before it may take.
    pub(crate) fn remainder_start(&self) -> Option<usize> {
        match self.positionals.split_last() {
            Some((last, prefix)) if self.parameters[*last].nargs.is_remainder() => Some(
                prefix
                    .iter()
                    .map(|index| {
                        self.parameters[*index]
                            .nargs
                            .max()
                            .expect("internal error - positionals before a remainder must be bounded")
                    })
                    .sum(),
            ),
            _ => None,
        }
    }

    fn add_groups(&mut self, groups: Vec<GroupSpec>) -> Result<(), ConfigError> {
        for group in groups {
            let GroupSpec {
                name,
                description,
                members,
                mutually_exclusive,
                mutually_dependent,
            } = group;

            if mutually_exclusive && mutually_dependent {
                return Err(ConfigError::CommandDefinition(format!(
                    "Group '{name}' cannot be both mutually exclusive and mutually dependent."
                )));
            }

            let members = members
                .iter()
                .map(|member| {
                    self.parameters
                        .iter()
                        .position(|p| &p.name == member)
                        .ok_or_else(|| {
                            ConfigError::CommandDefinition(format!(
                                "Group '{name}' refers to the unknown parameter '{member}'."
                            ))
                        })
                })
                .collect::<Result<Vec<usize>, ConfigError>>()?;

            self.groups.push(GroupDef {
                name,
                description,
                members,
                mutually_exclusive,
                mutually_dependent,
            });
        }

        Ok(())
    }
}

/// The immutable definition graph: every command of the parser, root first.
#[derive(Debug)]
pub(crate) struct CommandTree {
    commands: Vec<CommandDef>,
}

pub(crate) const ROOT: CommandId = 0;

impl CommandTree {
    pub(crate) fn build(spec: CommandSpec) -> Result<Self, ConfigError> {
        let mut tree = CommandTree {
            commands: Vec::default(),
        };
        let program = spec.name.clone();
        let config = spec.config.clone().unwrap_or_default();
        tree.insert(spec, None, program, config)?;
        tree.validate_chains()?;
        Ok(tree)
    }

    fn insert(
        &mut self,
        spec: CommandSpec,
        parent: Option<CommandId>,
        program: String,
        inherited: CommandConfig,
    ) -> Result<CommandId, ConfigError> {
        let CommandSpec {
            name,
            about,
            config,
            mut parameters,
            groups,
            branch,
        } = spec;
        let config = config.unwrap_or(inherited);

        if config.add_help {
            parameters.insert(0, ParameterDef::help_flag());
        }

        let mut sub_commands = Vec::default();
        let mut default_child = None;

        if let Some(BranchSpec {
            mut condition,
            commands,
            default,
        }) = branch
        {
            if commands.is_empty() {
                return Err(ConfigError::CommandDefinition(format!(
                    "Sub-command parameter '{}' has no registered sub-commands.",
                    condition.name
                )));
            }

            if let Some(default) = &default {
                if !commands.iter().any(|(variant, _)| variant == default) {
                    return Err(ConfigError::CommandDefinition(format!(
                        "Sub-command parameter '{}' defaults to the unregistered sub-command '{default}'.",
                        condition.name
                    )));
                }
            }

            condition.required = default.is_none();
            condition.default = default.clone().map(Value::Str);
            condition.choices = Some(commands.iter().map(|(v, _)| v.clone()).collect());
            parameters.push(condition);
            sub_commands = commands;
            default_child = default;
        }

        let mut command =
            CommandDef::new(name, program.clone(), about, config.clone(), parameters, parent)?;
        command.add_groups(groups)?;
        command.default_child = default_child;
        let id = self.commands.len();
        self.commands.push(command);

        for (variant, sub_spec) in sub_commands {
            let sub_program = format!("{program} {variant}");
            let child = self.insert(sub_spec, Some(id), sub_program, config.clone())?;
            self.commands[id].children.insert(variant, child);
        }

        Ok(id)
    }

    // Parameters of a sub-command share one namespace (and one set of option strings) with its ancestors.
    fn validate_chains(&self) -> Result<(), ConfigError> {
        for id in 0..self.commands.len() {
            let command = &self.commands[id];
            let mut ancestor = command.parent;

            while let Some(parent_id) = ancestor {
                let parent = &self.commands[parent_id];

                for parameter in command.parameters.iter().filter(|p| !p.is_help()) {
                    let strings = parameter.option_strings();

                    for other in parent.parameters.iter().filter(|p| !p.is_help()) {
                        let conflict = parameter.name == other.name
                            || other
                                .option_strings()
                                .iter()
                                .any(|string| strings.contains(string));

                        if conflict {
                            return Err(ConfigError::CommandDefinition(format!(
                                "Parameter '{}' of '{}' conflicts with '{}' of '{}'.",
                                parameter.name, command.program, other.name, parent.program
                            )));
                        }
                    }
                }

                if command.pass_thru.is_some() && parent.pass_thru.is_some() {
                    return Err(ConfigError::CommandDefinition(format!(
                        "Cannot declare a pass-through on '{}' since '{}' already has one.",
                        command.program, parent.program
                    )));
                }

                ancestor = parent.parent;
            }
        }

        Ok(())
    }

    pub(crate) fn command(&self, id: CommandId) -> &CommandDef {
        &self.commands[id]
    }

    pub(crate) fn param(&self, id: ParamId) -> &ParameterDef {
        &self.commands[id.command].parameters[id.index]
    }

    pub(crate) fn child(&self, id: CommandId, variant: &str) -> Option<CommandId> {
        self.commands[id].children.get(variant).copied()
    }

    pub(crate) fn params(&self, id: CommandId) -> impl Iterator<Item = ParamId> + '_ {
        (0..self.commands[id].parameters.len()).map(move |index| ParamId::new(id, index))
    }

    /// Resolve a long option against the command chain, closest command first.
    pub(crate) fn find_long(&self, path: &[CommandId], name: &str) -> Option<ParamId> {
        path.iter().rev().find_map(|id| {
            self.commands[*id]
                .long_options
                .get(name)
                .map(|index| ParamId::new(*id, *index))
        })
    }

    /// Resolve a short option against the command chain, closest command first.
    pub(crate) fn find_short(&self, path: &[CommandId], short: char) -> Option<ParamId> {
        path.iter().rev().find_map(|id| {
            self.commands[*id]
                .short_options
                .get(&short)
                .map(|index| ParamId::new(*id, *index))
        })
    }

    pub(crate) fn find_pass_thru(&self, path: &[CommandId]) -> Option<ParamId> {
        path.iter().rev().find_map(|id| {
            self.commands[*id]
                .pass_thru
                .map(|index| ParamId::new(*id, index))
        })
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    pub(crate) fn spec(name: &str, parameters: Vec<ParameterDef>) -> CommandSpec {
        CommandSpec {
            name: name.to_string(),
            about: None,
            config: None,
            parameters,
            groups: Vec::default(),
            branch: None,
        }
    }

    pub(crate) fn positional(name: &str, nargs: Nargs) -> ParameterDef {
        let mut parameter = ParameterDef::new(name, ParamKind::Positional);
        parameter.required = nargs.min() > 0;
        parameter.nargs = nargs;
        parameter
    }

    pub(crate) fn option(name: &str, short: Option<char>) -> ParameterDef {
        let mut parameter = ParameterDef::new(name, ParamKind::Option { append: false });
        parameter.short = short;
        parameter
    }

    pub(crate) fn flag(name: &str, short: Option<char>) -> ParameterDef {
        let mut parameter = ParameterDef::new(
            name,
            ParamKind::Flag {
                constant: Value::Bool(true),
                append: false,
            },
        );
        parameter.short = short;
        parameter
    }
}
