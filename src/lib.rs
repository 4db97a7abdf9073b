//! `bindarg` is a declarative command line parser for Rust.
//!
//! Describe the parameters of a command (and its sub-commands) up front, and `bindarg` binds the command line tokens to them.
//! Parsing yields a [`Parsed`]: the resolved command path and a [`Value`] for every parameter along that path, whether it was provided or defaulted.
//! `bindarg` attempts to prioritize the following design concerns:
//! * *Deterministic binding*:
//! Ambiguous command lines (how many tokens a variable arity positional takes, whether `-abc` is a flag cluster or an option with an attached value) resolve by fixed rules, independent of the values themselves.
//! * *Precise errors*:
//! Every usage error carries its [`ErrorKind`], the parameter and token at fault, and an exit status.
//! Missing parameters are reported together, rather than one at a time.
//! * *Declarative constraints*:
//! Mutually exclusive and mutually dependent parameters are declared as [`ParameterGroup`]s, rather than checked by hand after parsing.
//! * *Sub-command paradigm*:
//! Any command may branch into named sub-commands, to any depth.
//! * *Detailed yet basic UX*:
//! The help and error output is detailed, but we do not aim to support rich display configurations, such as colour output, shell completions, etc.
//!
//! # Usage
//! This page includes a few demos on using `bindarg`.
//! More examples are outlined in [the source](https://github.com/sawatzkylindsey/bindarg/tree/main/demos).
//!
//! ```no_run
#![doc = include_str!("../demos/demo_summer.rs")]
//! ```
//!
//! ```console
//! $ summer -h
//! usage: summer [-h] ITEM [ITEM ...]
//!
//! positional arguments:
//!  ITEM [ITEM ...]   The items to sum.
//!
//! options:
//!  -h, --help        Show this help message and exit.
//!
//! $ summer 1 2 3
//! Sum: 6
//!
//! $ summer
//! Missing required parameter(s): item.
//!
//! $ summer 1 blah
//! Argument 'item' cannot convert 'blah' to i64.
//! 1 blah
//!   ^
//! ```
//!
//! # Builder Api
//! Configure `bindarg` by starting with a [`CommandLineParser`] and `add`ing parameters.
//! Each [`Parameter`] is one of:
//! * [`Parameter::positional`]: a value matched by position (ex: `program VALUE`).
//! * [`Parameter::option`]: a value introduced by name (ex: `--name VALUE`, `--name=VALUE`, `-n VALUE`, `-nVALUE`).
//! * [`Parameter::flag`]: a named switch which stores a constant (`true`, by default).
//! * [`Parameter::tri_flag`]: a named switch pair, `--name` or `--no-name`, which stores `true`, `false`, or neither.
//! * [`Parameter::counter`]: a named switch which counts its occurrences (ex: `-vvv`).
//! * [`Parameter::action_flag`]: a named switch which runs an action once parsing succeeds (ex: `--version`).
//! * [`Parameter::pass_thru`]: everything after `--`, verbatim.
//!
//! Parameters are refined with modifiers, such as `short`, `nargs`, `convert`, `choices`, `default` and `required`.
//! With `env_var`, an option, flag or counter which isn't given on the command line falls back to an environment variable before its default.
//! Using a modifier on a parameter kind which doesn't support it (ex: `nargs` on a flag) is reported when the parser is built.
//!
//! Values are captured as strings, unless a [`Convert`] is given.
//! Extract them with [`Parsed::get`], which converts the [`Value`] into any type implementing [`prelude::FromValue`].
//!
//! ### Sub-commands
//! To setup a sub-command based Cli, start with a root `CommandLineParser`.
//! The sub-command section of the parser begins by `branch`ing this parser with a [`Condition`].
//! Once `branch`ed, the result is a [`SubCommandParser`] that allows you to setup individual sub-commands via [`SubCommandParser::command`].
//! Sub-commands may themselves `branch`, and see the options of their ancestors.
//!
//! You may describe the sub-commands on the condition via [Choices::choice](./prelude/trait.Choices.html).
//! The sub-command structure is dictated solely by the usage of `command`; usage of `choice` affects the display documentation only.
//!
//! ```no_run
#![doc = include_str!("../demos/demo_sub_command.rs")]
//! ```
//!
//! ```console
//! $ sub-command -h
//! usage: sub-command [-h] [-v] {zero, one} ...
//!
//! positional arguments:
//!  {zero, one}
//!    one           the one sub-command
//!    zero
//!
//! options:
//!  -h, --help      Show this help message and exit.
//!  -v, --verbose
//!
//! $ sub-command zero abc --opt
//! Used sub-command 'zero'.
//! arg: abc
//! opt: true
//! ```
//!
//! ### Action Flags & Groups
//! Action flags run in ascending priority (ties broken by declaration order) via [`GeneralParser::run`].
//! An action may end the program early by returning `UsageError::ParserExit`.
//!
//! ```no_run
#![doc = include_str!("../demos/demo_action_flags.rs")]
//! ```
//!
//! ### Organization
//! We recommend organizing your parser into a `parse` and `parse_tokens` pair, so that the configuration may be unit tested.
//!
//! ```no_run
#![doc = include_str!("../demos/demo_organization.rs")]
//! ```
//!
//! # Cli Semantics
//! `bindarg` matches the tokens in a single left to right pass.
//! * Options, flags and counters may appear anywhere, and in any order.
//! * Positional tokens are collected, and only divided amongst the positionals once the command's tokens are exhausted.
//! Each positional takes as many tokens as its `Nargs` allows, while leaving enough for the positionals after it.
//! * A token that names a sub-command ends the current command's positionals; the remaining tokens belong to the sub-command.
//! * Everything after `--` belongs to the pass-through parameter.
//! * A token which looks like a negative number (ex: `-5`) is always a value, never an option.
//!
//! Short flags may be combined, and the final short option in a cluster may take a value attached with `=`.
//! For example, `-abc=123` is equivalent to `-a -b -c 123`, when `a` and `b` are flags and `c` is an option.
//!
//! ### Nargs
//! ```console
//! Nargs            | Cardinality | Syntax
//! ---------------------------------------------------
//! precisely(1)     | [1]         | VALUE
//! precisely(n)     | [n]         | VALUE .. VALUE
//! optional()       | [0, 1]      | [VALUE]
//! any()            | [0, ∞)      | [VALUE ...]
//! at_least_one()   | [1, ∞)      | VALUE [VALUE ...]
//! between(1, 2)    | [1, 2]      | VALUE [VALUE]
//! remainder()      | [0, ∞)      | ...
//! ```
//!
//! # Features
//! * `unit_test`: For features that help with unit testing.
//! * `tracing_debug`: Emit `tracing` debug events while matching and resolving.
pub use bindarg_builder::*;
