use std::collections::BTreeMap;
use std::env;

use crate::api::Parsed;
use crate::matcher::{Matched, TokenMatcher};
use crate::parser::{
    check_groups, ActionFn, CommandId, CommandTree, ErrorContext, ParamKind, Printer, UsageError,
    UserInterface,
};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// A built command line parser.
///
/// The parser is immutable; every parse works on its own fresh state, so one parser may be used for any number of parses.
pub struct GeneralParser {
    tree: CommandTree,
    printer: Printer,
    user_interface: Box<dyn UserInterface>,
}

enum Resolution {
    Help(CommandId),
    Parsed(Parsed, CommandId),
}

impl std::fmt::Debug for GeneralParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneralParser")
            .field("tree", &self.tree)
            .finish_non_exhaustive()
    }
}

impl GeneralParser {
    pub(crate) fn new(tree: CommandTree, user_interface: Box<dyn UserInterface>) -> Self {
        Self {
            tree,
            printer: Printer::terminal(),
            user_interface,
        }
    }

    fn resolve_inner(&self, tokens: &[&str]) -> Result<Resolution, UsageError> {
        let tree = &self.tree;
        let (binding, path) = match TokenMatcher::new(tree, tokens).run()? {
            Matched::Help(id) => return Ok(Resolution::Help(id)),
            Matched::Complete { binding, path } => (binding, path),
        };
        let deepest = *path
            .last()
            .expect("internal error - the path always contains the root");
        let config = &tree.command(deepest).config;

        if !config.multiple_action_flags && binding.fired().len() > 1 {
            return Err(UsageError::ActionFlagConflict {
                provided: binding
                    .fired()
                    .iter()
                    .map(|id| tree.param(*id).usage_name())
                    .collect(),
            });
        }

        check_groups(&binding, &path)?;

        let mut values = BTreeMap::default();
        let mut missing = Vec::default();

        for command in &path {
            for id in tree.params(*command) {
                let parameter = tree.param(id);

                if parameter.is_help() {
                    continue;
                }

                match binding.result(id) {
                    Ok(value) => {
                        values.insert(parameter.name.clone(), value);
                    }
                    Err(UsageError::MissingArgument { parameters }) => missing.extend(parameters),
                    Err(error) => return Err(error),
                }
            }
        }

        if !missing.is_empty() {
            return Err(UsageError::MissingArgument {
                parameters: missing,
            });
        }

        let names: Vec<String> = path
            .iter()
            .map(|id| tree.command(*id).name.clone())
            .collect();
        let (args, mut fired, unknown) = binding.into_parts();
        fired.sort_by_key(|id| match &tree.param(*id).kind {
            ParamKind::ActionFlag { priority, .. } => (*priority, *id),
            _ => unreachable!("internal error - only action flags fire"),
        });

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Resolved {} value(s) along {names:?}.", values.len());
        }

        Ok(Resolution::Parsed(
            Parsed {
                path: names,
                values,
                action_flags: fired
                    .into_iter()
                    .map(|id| (id, tree.param(id).name.clone()))
                    .collect(),
                unknown,
                args,
            },
            deepest,
        ))
    }

    /// Resolve the `tokens` without printing anything.
    ///
    /// A help request is reported as `UsageError::ParserExit { code: 0 }`.
    ///
    /// ### Example
    /// ```
    /// # use bindarg_builder as bindarg;
    /// use bindarg::{CommandLineParser, ErrorKind, Parameter};
    ///
    /// let parser = CommandLineParser::new("program")
    ///     .add(Parameter::positional("source"))
    ///     .add(Parameter::option("target").required(true))
    ///     .build();
    ///
    /// let error = parser.resolve(&[]).unwrap_err();
    /// assert_eq!(error.kind(), ErrorKind::MissingArgument);
    /// assert_eq!(error.to_string(), "Missing required parameter(s): source, --target.");
    ///
    /// assert_eq!(parser.resolve(&["-h"]).unwrap_err().code(), 0);
    /// ```
    pub fn resolve(&self, tokens: &[&str]) -> Result<Parsed, UsageError> {
        match self.resolve_inner(tokens)? {
            Resolution::Help(_) => Err(UsageError::help()),
            Resolution::Parsed(parsed, _) => Ok(parsed),
        }
    }

    fn report(&self, tokens: &[&str]) -> Result<(Parsed, CommandId), i32> {
        match self.resolve_inner(tokens) {
            Ok(Resolution::Parsed(parsed, id)) => Ok((parsed, id)),
            Ok(Resolution::Help(id)) => {
                self.printer
                    .print_help(&self.tree, id, self.user_interface.as_ref());
                Err(UsageError::help().code())
            }
            Err(error) => {
                let code = error.code();
                let index = error.index();
                self.user_interface.print_error(error);

                if let Some(index) = index {
                    self.user_interface
                        .print_error_context(ErrorContext::new(index, tokens));
                }

                Err(code)
            }
        }
    }

    /// Parse the `tokens`, printing help or the error (if any) through the user interface.
    ///
    /// Returns the exit status on failure, or `0` when help was printed.
    pub fn parse_tokens(&self, tokens: &[&str]) -> Result<Parsed, i32> {
        self.report(tokens).map(|(parsed, _)| parsed)
    }

    /// Parse the command line arguments of this process.
    /// If help is requested or an error is encountered, exits via [`std::process::exit`].
    pub fn parse(&self) -> Parsed {
        let command_input: Vec<String> = env::args().skip(1).collect();

        match self.parse_tokens(
            command_input
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<&str>>()
                .as_slice(),
        ) {
            Ok(parsed) => parsed,
            Err(exit_code) => {
                std::process::exit(exit_code);
            }
        }
    }

    /// Parse the `tokens`, then run the fired action flags and `main`.
    ///
    /// Action flags run in ascending priority, ties broken by declaration order.
    /// `main` runs after the action flags when the deepest command's `action_after_action_flags` is set, and before them otherwise.
    /// A `UsageError::ParserExit` from any of these stops the run quietly; other errors are printed.
    ///
    /// ### Example
    /// ```
    /// # use bindarg_builder as bindarg;
    /// use bindarg::{CommandLineParser, Parameter, UsageError};
    ///
    /// let parser = CommandLineParser::new("program")
    ///     .add(Parameter::action_flag("version", |_| {
    ///         println!("program 1.0");
    ///         Err(UsageError::ParserExit { code: 0 })
    ///     }))
    ///     .build();
    ///
    /// let result = parser.run(vec!["--version"].as_slice(), |_| {
    ///     unreachable!("the version flag exits first");
    /// });
    /// assert_eq!(result, Err(0));
    /// ```
    pub fn run(
        &self,
        tokens: &[&str],
        main: impl FnOnce(&Parsed) -> Result<(), UsageError>,
    ) -> Result<(), i32> {
        let (parsed, id) = self.report(tokens)?;

        if self.tree.command(id).config.action_after_action_flags {
            self.run_action_flags(&parsed)?;
            self.dispatch(main(&parsed))
        } else {
            self.dispatch(main(&parsed))?;
            self.run_action_flags(&parsed)
        }
    }

    fn run_action_flags(&self, parsed: &Parsed) -> Result<(), i32> {
        for (action_id, _name) in &parsed.action_flags {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Running action flag '{_name}'.");
            }

            match &self.tree.param(*action_id).kind {
                ParamKind::ActionFlag {
                    action: ActionFn::Call(action),
                    ..
                } => self.dispatch(action(parsed))?,
                _ => unreachable!("internal error - only callable action flags reach dispatch"),
            }
        }

        Ok(())
    }

    fn dispatch(&self, result: Result<(), UsageError>) -> Result<(), i32> {
        match result {
            Ok(()) => Ok(()),
            Err(UsageError::ParserExit { code }) => Err(code),
            Err(error) => {
                let code = error.code();
                self.user_interface.print_error(error);
                Err(code)
            }
        }
    }
}
