use std::collections::HashSet;
use terminal_size::{terminal_size, Width};

use crate::constant::*;
use crate::model::Nargs;
use crate::parser::interface::{chunk, UserInterface};
use crate::parser::{
    ColumnRenderer, CommandId, CommandTree, LeftWidth, MiddleWidth, PaddingWidth, ParamKind,
    ParameterDef, TotalWidth,
};

const PADDING_WIDTH: usize = 3;
const MAIN_INDENT: usize = 1;
const CHOICE_INDENT: usize = 2;
// The width assumed when not attached to a terminal.
const DEFAULT_TOTAL_WIDTH: usize = 80;

struct Row {
    indent: usize,
    left: String,
    middle: String,
}

impl Row {
    fn new(indent: usize, left: impl Into<String>, middle: impl Into<String>) -> Self {
        Self {
            indent,
            left: left.into(),
            middle: middle.into(),
        }
    }
}

struct Section {
    title: String,
    description: Option<String>,
    rows: Vec<Row>,
}

/// Renders the help message of a command from its definition.
pub(crate) struct Printer {
    terminal_width: Option<usize>,
}

impl Printer {
    pub(crate) fn terminal() -> Self {
        let terminal_width = if let Some((Width(terminal_width), _)) = terminal_size() {
            Some(terminal_width as usize)
        } else {
            None
        };

        Self::new(terminal_width)
    }

    pub(crate) fn new(terminal_width: Option<usize>) -> Self {
        Self { terminal_width }
    }

    pub(crate) fn print_help(
        &self,
        tree: &CommandTree,
        id: CommandId,
        user_interface: &(impl UserInterface + ?Sized),
    ) {
        let command = tree.command(id);
        let total_width = self.terminal_width.unwrap_or(DEFAULT_TOTAL_WIDTH);
        let visible = |index: &usize| !command.parameters[*index].hidden;
        let grouped: HashSet<usize> = command
            .groups
            .iter()
            .flat_map(|group| group.members.iter().copied())
            .collect();
        let exclusive: Vec<Vec<usize>> = command
            .groups
            .iter()
            .filter(|group| group.mutually_exclusive)
            .map(|group| group.members.iter().copied().filter(visible).collect())
            .collect();

        // Options first, then positionals in their matching order.
        let (positionals, options): (Vec<usize>, Vec<usize>) = (0..command.parameters.len())
            .filter(visible)
            .partition(|index| command.parameters[*index].is_positional());

        let mut summary = Vec::default();
        let mut summarized: HashSet<usize> = HashSet::default();

        for index in options.iter().chain(positionals.iter()) {
            if summarized.contains(index) {
                continue;
            }

            match exclusive.iter().find(|members| members.contains(index)) {
                Some(members) => {
                    let alternatives: Vec<String> = members
                        .iter()
                        .map(|member| usage(&command.parameters[*member]))
                        .collect();
                    summary.push(format!("[{}]", alternatives.join(" | ")));
                    summarized.extend(members.iter().copied());
                }
                None => {
                    let parameter = &command.parameters[*index];

                    if parameter.required || parameter.is_positional() {
                        summary.push(usage(parameter));
                    } else {
                        summary.push(format!("[{}]", usage(parameter)));
                    }

                    summarized.insert(*index);
                }
            }
        }

        let mut sections = vec![
            Section {
                title: "positional arguments:".to_string(),
                description: None,
                rows: positionals
                    .iter()
                    .filter(|index| !grouped.contains(*index))
                    .flat_map(|index| rows(tree, id, &command.parameters[*index]))
                    .collect(),
            },
            Section {
                title: "options:".to_string(),
                description: None,
                rows: options
                    .iter()
                    .filter(|index| !grouped.contains(*index))
                    .flat_map(|index| rows(tree, id, &command.parameters[*index]))
                    .collect(),
            },
        ];

        for group in &command.groups {
            let title = if group.mutually_exclusive {
                format!("{} (mutually exclusive):", group.name)
            } else if group.mutually_dependent {
                format!("{} (mutually dependent):", group.name)
            } else {
                format!("{}:", group.name)
            };
            sections.push(Section {
                title,
                description: group.description.clone(),
                rows: group
                    .members
                    .iter()
                    .copied()
                    .filter(visible)
                    .flat_map(|index| rows(tree, id, &command.parameters[index]))
                    .collect(),
            });
        }

        sections.retain(|section| !section.rows.is_empty());

        let left_column_width = sections
            .iter()
            .flat_map(|section| section.rows.iter())
            .map(|row| row.indent + row.left.len())
            .max()
            .unwrap_or(1);
        let middle_column_width = sections
            .iter()
            .flat_map(|section| section.rows.iter())
            .map(|row| row.middle.len())
            .max()
            .unwrap_or(2);
        let column_renderer = ColumnRenderer::guided(
            PaddingWidth::new(PADDING_WIDTH).expect("internal error - padding must be valid"),
            LeftWidth::new(std::cmp::max(1, left_column_width))
                .expect("internal error - left must be valid"),
            MiddleWidth::new(std::cmp::max(2, middle_column_width))
                .expect("internal error - middle must be valid"),
            TotalWidth(total_width),
        );

        if summary.is_empty() {
            user_interface.print(format!("usage: {}", command.program));
        } else {
            user_interface.print(format!(
                "usage: {p} {s}",
                p = command.program,
                s = summary.join(" ")
            ));
        }

        if let Some(about) = &command.about {
            user_interface.print("".to_string());

            for line in chunk(about, std::cmp::max(2, total_width.saturating_sub(1))) {
                user_interface.print(line);
            }
        }

        for Section {
            title,
            description,
            rows,
        } in sections
        {
            user_interface.print("".to_string());
            user_interface.print(title);

            if let Some(description) = description {
                user_interface.print(format!("{:MAIN_INDENT$}{description}", ""));
            }

            for Row {
                indent,
                left,
                middle,
            } in rows
            {
                for line in column_renderer.render(indent, &left, &middle) {
                    user_interface.print(line);
                }
            }
        }
    }
}

fn name_example(parameter: &ParameterDef) -> String {
    parameter.name.to_ascii_uppercase().replace('-', "_")
}

// How the values of a parameter are written, ex: `ITEM [ITEM ...]`.
fn grammar(example: &str, nargs: &Nargs) -> String {
    if nargs.is_remainder() {
        return "...".to_string();
    }

    let mut parts: Vec<String> = (0..nargs.min()).map(|_| example.to_string()).collect();

    match nargs.max() {
        Some(max) if max == nargs.min() => {}
        Some(max) if max == nargs.min() + 1 => parts.push(format!("[{example}]")),
        _ => parts.push(format!("[{example} ...]")),
    }

    parts.join(" ")
}

fn value_grammar(parameter: &ParameterDef) -> String {
    match &parameter.kind {
        ParamKind::Flag { .. }
        | ParamKind::ActionFlag { .. }
        | ParamKind::Counter { .. }
        | ParamKind::TriFlag { .. } => "".to_string(),
        ParamKind::SubCommand => format!("{{{}}}", sub_command_variants(parameter).join(", ")),
        _ => grammar(&name_example(parameter), &parameter.nargs),
    }
}

fn sub_command_variants(parameter: &ParameterDef) -> Vec<String> {
    parameter.choices.clone().unwrap_or_default()
}

fn with_grammar(flag: String, grammar: &str) -> String {
    if grammar.is_empty() {
        flag
    } else {
        format!("{flag} {grammar}")
    }
}

// The parameter as it appears in the usage summary.
fn usage(parameter: &ParameterDef) -> String {
    let grammar = value_grammar(parameter);

    match &parameter.kind {
        ParamKind::Positional => grammar,
        ParamKind::SubCommand => format!("{grammar} ..."),
        ParamKind::PassThru => format!("{PASS_THRU_MARKER} {} ...", name_example(parameter)),
        _ => match (&parameter.short, &parameter.long) {
            (Some(short), _) => with_grammar(format!("-{short}"), &grammar),
            (None, Some(long)) => with_grammar(format!("--{long}"), &grammar),
            (None, None) => unreachable!("internal error - options always have a long name"),
        },
    }
}

// The rows of the parameter in its section listing.
fn rows(tree: &CommandTree, id: CommandId, parameter: &ParameterDef) -> Vec<Row> {
    let grammar = value_grammar(parameter);
    let left = match &parameter.kind {
        ParamKind::Positional | ParamKind::SubCommand => grammar.clone(),
        ParamKind::PassThru => usage(parameter),
        _ => {
            let long = parameter
                .long
                .as_ref()
                .map(|long| with_grammar(format!("--{long}"), &grammar));

            match (&parameter.short, long) {
                (Some(short), Some(long)) => {
                    format!("{}, {long}", with_grammar(format!("-{short}"), &grammar))
                }
                (Some(short), None) => with_grammar(format!("-{short}"), &grammar),
                (None, Some(long)) => long,
                (None, None) => unreachable!("internal error - options always have a long name"),
            }
        }
    };
    let alternates: Vec<String> = parameter
        .alt_short
        .iter()
        .map(|short| format!("-{short}"))
        .chain(parameter.alt_long.iter().map(|long| format!("--{long}")))
        .collect();
    let left = if alternates.is_empty() {
        left
    } else {
        format!("{left}, {}", alternates.join(", "))
    };

    let mut help = parameter.help.clone().unwrap_or_default();

    if !parameter.env_vars.is_empty() {
        help = format!("{help} (env: {})", parameter.env_vars.join(", "))
            .trim_start()
            .to_string();
    }

    let middle = match (&parameter.kind, &parameter.choices) {
        (ParamKind::SubCommand, _) | (_, None) => help,
        (_, Some(choices)) => format!("{{{}}} {help}", choices.join(", "))
            .trim_end()
            .to_string(),
    };
    let mut out = vec![Row::new(MAIN_INDENT, left, middle)];

    match &parameter.kind {
        ParamKind::SubCommand => {
            for (variant, child) in &tree.command(id).children {
                let description = parameter
                    .choice_help
                    .iter()
                    .find(|(v, _)| v == variant)
                    .map(|(_, description)| description.clone())
                    .or_else(|| tree.command(*child).about.clone())
                    .unwrap_or_default();
                out.push(Row::new(MAIN_INDENT + CHOICE_INDENT, variant, description));
            }
        }
        _ => {
            for (variant, description) in &parameter.choice_help {
                out.push(Row::new(MAIN_INDENT + CHOICE_INDENT, variant, description));
            }
        }
    }

    out
}

/// The tokens of a failed parse, pointing at the offending one.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ErrorContext {
    index: usize,
    tokens: Vec<String>,
}

impl ErrorContext {
    pub(crate) fn new(index: usize, tokens: &[&str]) -> Self {
        Self {
            index,
            tokens: tokens.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let projection = self.tokens.join(" ");
        // One space between each preceding token; an index past the end points just beyond the projection.
        let offset = self
            .tokens
            .iter()
            .take(self.index)
            .map(|token| token.chars().count() + 1)
            .sum::<usize>();
        let offset = std::cmp::min(offset, projection.chars().count() + 1);

        write!(f, "{projection}\n{:offset$}^", "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CommandConfig, Condition, CommandLineParser, Parameter, ParameterGroup};
    use crate::parser::util::InMemoryInterface;
    use crate::parser::ROOT;
    use crate::prelude::Choices;
    use crate::test::assert_contains;
    use rstest::rstest;

    fn help(parser: CommandLineParser, path: &[&str], terminal_width: Option<usize>) -> String {
        let tree = parser.into_tree();
        let mut id = ROOT;

        for variant in path {
            id = tree.child(id, variant).unwrap();
        }

        let interface = InMemoryInterface::default();
        Printer::new(terminal_width).print_help(&tree, id, &interface);
        interface.consume_message()
    }

    #[test]
    fn print_help_empty() {
        // Setup
        let parser = CommandLineParser::new("program");

        // Execute
        let message = help(parser, &[], None);

        // Verify
        assert_eq!(
            message,
            r#"usage: program [-h]

options:
 -h, --help   Show this help message and exit."#
        );
    }

    #[test]
    fn print_help_no_help() {
        let parser =
            CommandLineParser::new("program").config(CommandConfig::default().add_help(false));
        assert_eq!(help(parser, &[], None), "usage: program");
    }

    #[test]
    fn print_help_option() {
        // Setup
        let parser = CommandLineParser::new("program")
            .add(Parameter::option("flag").short('f').help("message"));

        // Execute
        let message = help(parser, &[], Some(120));

        // Verify
        assert_eq!(
            message,
            r#"usage: program [-h] [-f FLAG]

options:
 -h, --help             Show this help message and exit.
 -f FLAG, --flag FLAG   message"#
        );
    }

    #[test]
    fn print_help_positionals() {
        // Setup
        let parser = CommandLineParser::new("program")
            .about("Sums the items.")
            .add(Parameter::positional("item").nargs(Nargs::at_least_one()).help("Items."))
            .add(Parameter::counter("verbose").short('v'))
            .add(Parameter::pass_thru("rest"));

        // Execute
        let message = help(parser, &[], None);

        // Verify
        assert_eq!(
            message,
            r#"usage: program [-h] [-v] [-- REST ...] ITEM [ITEM ...]

Sums the items.

positional arguments:
 ITEM [ITEM ...]   Items.

options:
 -h, --help        Show this help message and exit.
 -v, --verbose
 -- REST ..."#
        );
    }

    #[test]
    fn print_help_choices() {
        // Setup
        let parser = CommandLineParser::new("program")
            .add(
                Parameter::option("mode")
                    .choice("fast", "Skip the checks.")
                    .choice("safe", "Run every check.")
                    .help("How to run."),
            )
            .add(Parameter::positional("colour").choices(["red", "blue"]));

        // Execute
        let message = help(parser, &[], None);

        // Verify
        assert_eq!(
            message,
            r#"usage: program [-h] [--mode MODE] COLOUR

positional arguments:
 COLOUR        {red, blue}

options:
 -h, --help    Show this help message and exit.
 --mode MODE   {fast, safe} How to run.
   fast        Skip the checks.
   safe        Run every check."#
        );
    }

    #[test]
    fn print_help_hidden() {
        let parser = CommandLineParser::new("program")
            .add(Parameter::flag("secret").hide())
            .add(Parameter::positional("shown"));
        let message = help(parser, &[], None);
        assert!(!message.contains("secret"), "{message}");
        assert!(message.contains("SHOWN"), "{message}");
    }

    #[test]
    fn print_help_groups() {
        // Setup
        let parser = CommandLineParser::new("program").group(
            ParameterGroup::new("format")
                .mutually_exclusive()
                .description("Pick one.")
                .add(Parameter::flag("json"))
                .add(Parameter::flag("yaml")),
        );

        // Execute
        let message = help(parser, &[], None);

        // Verify
        assert_eq!(
            message,
            r#"usage: program [-h] [--json | --yaml]

options:
 -h, --help   Show this help message and exit.

format (mutually exclusive):
 Pick one.
 --json
 --yaml"#
        );
    }

    #[test]
    fn print_help_sub_commands() {
        // Setup
        let parser = CommandLineParser::new("program")
            .add(Parameter::flag("verbose"))
            .branch(Condition::new("command").help("The action.").choice("a", "Does a."))
            .command("a", |sub| sub.about("Ignored in favour of the choice."))
            .command("b", |sub| sub.about("Does b.").add(Parameter::positional("value")))
            .into_root();

        // Execute
        let root = help(parser, &[], None);

        // Verify
        assert_eq!(
            root,
            r#"usage: program [-h] [--verbose] {a, b} ...

positional arguments:
 {a, b}       The action.
   a          Does a.
   b          Does b.

options:
 -h, --help   Show this help message and exit.
 --verbose"#
        );
    }

    #[test]
    fn print_help_sub_command() {
        let parser = CommandLineParser::new("program")
            .branch(Condition::new("command"))
            .command("b", |sub| sub.about("Does b.").add(Parameter::positional("value")))
            .into_root();

        let message = help(parser, &["b"], None);
        assert_eq!(
            message,
            r#"usage: program b [-h] VALUE

Does b.

positional arguments:
 VALUE

options:
 -h, --help   Show this help message and exit."#
        );
    }

    #[test]
    fn print_help_wraps() {
        let parser = CommandLineParser::new("program").add(
            Parameter::flag("x").help("one two three four five six seven eight nine ten"),
        );
        let message = help(parser, &[], Some(40));
        assert_eq!(
            message,
            r#"usage: program [-h] [--x]

options:
 -h, --help   Show this help message
              and exit.
 --x          one two three four five
              six seven eight nine ten"#
        );
    }

    #[test]
    fn print_help_tri_flag() {
        // Setup
        let parser = CommandLineParser::new("program").add(
            Parameter::tri_flag("color")
                .alt_short('C')
                .env_var("COLOR")
                .help("Colorize."),
        );

        // Execute
        let message = help(parser, &[], Some(120));

        // Verify
        assert_contains!(message, "usage: program [-h] [--color]");
        assert_contains!(message, " --color, -C, --no-color   Colorize. (env: COLOR)");
    }

    #[rstest]
    #[case(Nargs::precisely(1), "X")]
    #[case(Nargs::precisely(2), "X X")]
    #[case(Nargs::optional(), "[X]")]
    #[case(Nargs::any(), "[X ...]")]
    #[case(Nargs::at_least_one(), "X [X ...]")]
    #[case(Nargs::between(1, 3).unwrap(), "X [X ...]")]
    #[case(Nargs::between(2, 3).unwrap(), "X X [X]")]
    #[case(Nargs::remainder(), "...")]
    fn grammar_nargs(#[case] nargs: Nargs, #[case] expected: &str) {
        assert_eq!(grammar("X", &nargs), expected);
    }

    #[rstest]
    #[case(0, "abc 12 x\n^")]
    #[case(1, "abc 12 x\n    ^")]
    #[case(2, "abc 12 x\n       ^")]
    #[case(3, "abc 12 x\n         ^")]
    fn error_context(#[case] index: usize, #[case] expected: &str) {
        let context = ErrorContext::new(index, &["abc", "12", "x"]);
        assert_eq!(context.to_string(), expected);
    }
}
