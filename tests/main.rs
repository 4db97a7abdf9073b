use assert_matches::assert_matches;
use bindarg::prelude::*;
use bindarg::{
    CommandConfig, CommandLineParser, Condition, ConfigError, Convert, ErrorKind, GeneralParser,
    Nargs, Parameter, ParameterGroup, UsageError, Value,
};
use rstest::rstest;

fn strings(values: &[&str]) -> Value {
    Value::List(values.iter().map(|v| Value::from(*v)).collect())
}

#[test]
fn builder_compiles() {
    CommandLineParser::new("organization");
}

#[rstest]
#[case(Nargs::precisely(2), vec![(1, false), (2, true), (3, false)])]
#[case(Nargs::between(1, 3).unwrap(), vec![(0, false), (1, true), (3, true), (4, false)])]
#[case(Nargs::one_of([1, 3]).unwrap(), vec![(1, true), (2, false), (3, true)])]
#[case(Nargs::at_least_one(), vec![(0, false), (1, true), (100, true)])]
fn nargs_satisfied(#[case] nargs: Nargs, #[case] checks: Vec<(usize, bool)>) {
    for (count, expected) in checks {
        assert_eq!(nargs.satisfied(count), expected, "{nargs} with {count}");
    }
}

#[test]
fn positionals_greedy_last() {
    let parser = CommandLineParser::new("program")
        .add(Parameter::positional("a"))
        .add(Parameter::positional("b").nargs(Nargs::between(1, 3).unwrap()))
        .build_parser()
        .unwrap();

    let parsed = parser.resolve(&["1", "2", "3", "4"]).unwrap();

    assert_eq!(parsed.value("a"), Some(&Value::from("1")));
    assert_eq!(parsed.value("b"), Some(&strings(&["2", "3", "4"])));
}

#[test]
fn positionals_reserve() {
    let parser = CommandLineParser::new("program")
        .add(Parameter::positional("a").nargs(Nargs::between(0, 2).unwrap()))
        .add(Parameter::positional("b").nargs(Nargs::precisely(2)))
        .build_parser()
        .unwrap();

    let parsed = parser.resolve(&["1", "2", "3"]).unwrap();

    assert_eq!(parsed.value("a"), Some(&strings(&["1"])));
    assert_eq!(parsed.value("b"), Some(&strings(&["2", "3"])));
}

#[test]
fn short_cluster() {
    let parser = CommandLineParser::new("program")
        .add(Parameter::flag("apple").short('a'))
        .add(Parameter::flag("banana").short('b'))
        .add(Parameter::option("carrot").short('c'))
        .build_parser()
        .unwrap();

    let parsed = parser.resolve(&["-ac", "val"]).unwrap();

    let order: Vec<&str> = parsed.args().records().iter().map(|r| r.name()).collect();
    assert_eq!(order, vec!["apple", "carrot"]);
    assert_eq!(parsed.get::<bool>("apple").unwrap(), true);
    assert_eq!(parsed.get::<bool>("banana").unwrap(), false);
    assert_eq!(parsed.get::<String>("carrot").unwrap(), "val");
}

#[rstest]
#[case(vec![], None)]
#[case(vec!["--x"], None)]
#[case(vec!["--y"], None)]
#[case(vec!["--x", "--y"], Some(ErrorKind::ParamConflict))]
fn mutually_exclusive(#[case] tokens: Vec<&str>, #[case] expected: Option<ErrorKind>) {
    let parser = CommandLineParser::new("program")
        .group(
            ParameterGroup::new("either")
                .mutually_exclusive()
                .add(Parameter::flag("x"))
                .add(Parameter::flag("y")),
        )
        .build_parser()
        .unwrap();

    let result = parser.resolve(tokens.as_slice());
    assert_eq!(result.err().map(|e| e.kind()), expected);
}

#[rstest]
#[case(vec![], None)]
#[case(vec!["--x"], Some(ErrorKind::ParamConflict))]
#[case(vec!["--y"], Some(ErrorKind::ParamConflict))]
#[case(vec!["--x", "--y"], None)]
fn mutually_dependent(#[case] tokens: Vec<&str>, #[case] expected: Option<ErrorKind>) {
    let parser = CommandLineParser::new("program")
        .group(
            ParameterGroup::new("both")
                .mutually_dependent()
                .add(Parameter::flag("x"))
                .add(Parameter::flag("y")),
        )
        .build_parser()
        .unwrap();

    let result = parser.resolve(tokens.as_slice());
    assert_eq!(result.err().map(|e| e.kind()), expected);
}

#[test]
fn option_repeated() {
    let parser = CommandLineParser::new("program")
        .add(Parameter::option("name"))
        .build_parser()
        .unwrap();

    let parsed = parser.resolve(&["--name", "a", "--name", "b"]).unwrap();

    assert_eq!(parsed.get::<String>("name").unwrap(), "b");
    assert_eq!(parsed.args().num_provided("name"), 2);
}

#[test]
fn option_append() {
    let parser = CommandLineParser::new("program")
        .add(Parameter::option("tag").short('t').append())
        .build_parser()
        .unwrap();

    let parsed = parser.resolve(&["-t", "a", "--tag=b", "-tc"]).unwrap();

    assert_eq!(
        parsed.get::<Vec<String>>("tag").unwrap(),
        vec!["a".to_string(), "b".to_string(), "c".to_string()]
    );
}

#[test]
fn pass_thru_literal() {
    let parser = CommandLineParser::new("program")
        .add(Parameter::flag("verbose"))
        .add(Parameter::pass_thru("rest"))
        .build_parser()
        .unwrap();

    let parsed = parser.resolve(&["--verbose", "--", "--help", "-x", "--"]).unwrap();

    assert_eq!(parsed.value("rest"), Some(&strings(&["--help", "-x", "--"])));
    assert!(parsed.action_flags().is_empty());
}

fn build_deploy() -> GeneralParser {
    CommandLineParser::new("program")
        .add(Parameter::flag("verbose"))
        .branch(Condition::new("command").choice("build", "Build the target."))
        .command("build", |sub| sub.add(Parameter::option("target").required(true)))
        .command("clean", |sub| sub)
        .build_parser()
        .unwrap()
}

#[test]
fn sub_command() {
    let parser = build_deploy();

    let parsed = parser.resolve(&["build", "--target", "x"]).unwrap();

    assert_eq!(parsed.path(), &["program".to_string(), "build".to_string()]);
    assert_eq!(parsed.command(), "build");
    assert_eq!(parsed.get::<String>("command").unwrap(), "build");
    assert_eq!(parsed.get::<String>("target").unwrap(), "x");
    assert_eq!(parsed.get::<bool>("verbose").unwrap(), false);
}

#[test]
fn sub_command_unknown() {
    let parser = build_deploy();

    let error = parser.resolve(&["deploy"]).unwrap_err();

    assert_eq!(error.kind(), ErrorKind::NoSuchOption);
    assert_eq!(error.token(), Some("deploy"));
    assert_eq!(error.index(), Some(0));
}

#[test]
fn sub_command_scope() {
    let parser = build_deploy();

    parser.resolve(&["build", "--verbose", "--target", "x"]).unwrap();
    assert_matches!(
        parser.resolve(&["clean", "--target", "x"]),
        Err(UsageError::NoSuchOption { token, index: 1 }) if token == "--target"
    );
}

#[test]
fn idempotent() {
    let parser = CommandLineParser::new("program")
        .add(Parameter::counter("verbose").short('v'))
        .add(Parameter::positional("items").nargs(Nargs::any()).convert(Convert::integer()))
        .build_parser()
        .unwrap();
    let tokens = ["-vv", "1", "2", "-v"];

    let first = parser.resolve(&tokens).unwrap();
    let second = parser.resolve(&tokens).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.get::<i64>("verbose").unwrap(), 3);
    assert_eq!(first.get::<Vec<u8>>("items").unwrap(), vec![1, 2]);
}

#[rstest]
#[case(vec!["--mode", "slow"], ErrorKind::InvalidChoice)]
#[case(vec!["--mode"], ErrorKind::BadOptionUsage)]
#[case(vec!["--count", "x"], ErrorKind::BadOptionUsage)]
#[case(vec!["--verbose=1"], ErrorKind::BadOptionUsage)]
#[case(vec!["--unknown"], ErrorKind::NoSuchOption)]
#[case(vec!["surplus"], ErrorKind::NoSuchOption)]
fn usage_errors(#[case] tokens: Vec<&str>, #[case] expected: ErrorKind) {
    let parser = CommandLineParser::new("program")
        .add(Parameter::option("mode").choices(["fast", "safe"]))
        .add(Parameter::option("count").convert(Convert::integer()))
        .add(Parameter::flag("verbose"))
        .build_parser()
        .unwrap();

    let error = parser.resolve(tokens.as_slice()).unwrap_err();

    assert_eq!(error.kind(), expected);
    assert_eq!(error.code(), 1);
}

#[test]
fn allow_unknown() {
    let parser = CommandLineParser::new("program")
        .config(CommandConfig::default().allow_unknown(true))
        .add(Parameter::positional("a"))
        .build_parser()
        .unwrap();

    let parsed = parser.resolve(&["--zeta", "1", "2"]).unwrap();

    assert_eq!(parsed.get::<String>("a").unwrap(), "1");
    assert_eq!(parsed.unknown(), &["--zeta".to_string(), "2".to_string()]);
}

#[test]
fn help_exit() {
    let parser = CommandLineParser::new("program")
        .add(Parameter::positional("a"))
        .build_parser()
        .unwrap();

    let error = parser.resolve(&["-h"]).unwrap_err();

    assert_eq!(error, UsageError::ParserExit { code: 0 });
    assert_eq!(error.kind(), ErrorKind::ParserExit);
}

#[test]
fn definition_errors() {
    assert_matches!(
        CommandLineParser::new("program")
            .add(Parameter::option("name"))
            .add(Parameter::flag("name"))
            .build_parser(),
        Err(ConfigError::CommandDefinition(message)) if message.contains("'name'")
    );
    assert_matches!(
        CommandLineParser::new("program")
            .add(Parameter::flag("verbose").nargs(Nargs::precisely(2)))
            .build_parser(),
        Err(ConfigError::ParameterDefinition { parameter, .. }) if parameter == "verbose"
    );
    assert_matches!(Nargs::between(3, 1), Err(ConfigError::Nargs(_)));
}

#[test]
fn run_action_flags() {
    let parser = CommandLineParser::new("program")
        .add(Parameter::action_flag("version", |_| Err(UsageError::ParserExit { code: 0 })))
        .build_parser()
        .unwrap();

    assert_eq!(parser.run(&["--version"], |_| panic!("main must not run")), Err(0));
    let result = parser.run(&[], |parsed| {
        assert!(parsed.action_flags().is_empty());
        Ok(())
    });
    assert_eq!(result, Ok(()));
}

#[rstest]
#[case(vec![], Value::None)]
#[case(vec!["--color"], Value::from("always"))]
#[case(vec!["--plain"], Value::from("never"))]
#[case(vec!["-vC"], Value::from("never"))]
fn tri_flag(#[case] tokens: Vec<&str>, #[case] expected: Value) {
    let parser = CommandLineParser::new("program")
        .add(Parameter::flag("verbose").short('v'))
        .add(
            Parameter::tri_flag("color")
                .consts("always", "never")
                .alt_long("plain")
                .alt_short('C'),
        )
        .build_parser()
        .unwrap();

    let parsed = parser.resolve(tokens.as_slice()).unwrap();

    assert_eq!(parsed.value("color"), Some(&expected));
}

#[test]
fn tri_flag_conflict() {
    let parser = CommandLineParser::new("program")
        .add(Parameter::tri_flag("color"))
        .build_parser()
        .unwrap();

    assert_matches!(
        parser.resolve(&["--color", "--no-color"]),
        Err(UsageError::MutuallyExclusive { provided, .. })
            if provided == vec!["--color".to_string(), "--no-color".to_string()]
    );
}

#[test]
fn env_var_fallback() {
    let parser = CommandLineParser::new("program")
        .add(Parameter::option("token").env_var("BINDARG_MAIN_TOKEN").required(true))
        .add(Parameter::counter("verbose").short('v').env_var("BINDARG_MAIN_VERBOSE"))
        .build_parser()
        .unwrap();

    assert_eq!(parser.resolve(&[]).unwrap_err().kind(), ErrorKind::MissingArgument);

    std::env::set_var("BINDARG_MAIN_TOKEN", "secret");
    std::env::set_var("BINDARG_MAIN_VERBOSE", "2");
    let parsed = parser.resolve(&[]).unwrap();
    assert_eq!(parsed.get::<String>("token").unwrap(), "secret");
    assert_eq!(parsed.get::<i64>("verbose").unwrap(), 2);
    assert_eq!(parsed.args().num_provided("token"), 0);

    let parsed = parser.resolve(&["--token", "given", "-v"]).unwrap();
    assert_eq!(parsed.get::<String>("token").unwrap(), "given");
    assert_eq!(parsed.get::<i64>("verbose").unwrap(), 1);

    std::env::set_var("BINDARG_MAIN_VERBOSE", "lots");
    assert_eq!(parser.resolve(&[]).unwrap_err().kind(), ErrorKind::BadOptionUsage);
}
