use bindarg::{CommandConfig, CommandLineParser, Parameter, ParameterGroup, UsageError};

fn main() {
    let parser = CommandLineParser::new("action-flags")
        .about("Prints a greeting, in the requested format.")
        .config(CommandConfig::default().multiple_action_flags(false))
        .add(
            Parameter::action_flag("version", |_| {
                println!("action-flags 0.3.0");
                Err(UsageError::ParserExit { code: 0 })
            })
            .help("Print the version and exit."),
        )
        .add(
            Parameter::action_flag("banner", |parsed| {
                println!("=== {} ===", parsed.command());
                Ok(())
            })
            .priority(-1)
            .help("Print a banner before greeting."),
        )
        .add(Parameter::option("name").default("world"))
        .group(
            ParameterGroup::new("format")
                .mutually_exclusive()
                .description("How to print the greeting.")
                .add(Parameter::flag("shout"))
                .add(Parameter::flag("whisper")),
        )
        .build();

    let result = parser.run(
        std::env::args()
            .skip(1)
            .collect::<Vec<String>>()
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .as_slice(),
        |parsed| {
            let name: String = parsed.get("name").expect("the name defaults to a string");
            let greeting = format!("Hello, {name}!");

            if parsed.get::<bool>("shout").expect("flags resolve to booleans") {
                println!("{}", greeting.to_uppercase());
            } else if parsed.get::<bool>("whisper").expect("flags resolve to booleans") {
                println!("{}", greeting.to_lowercase());
            } else {
                println!("{greeting}");
            }

            Ok(())
        },
    );

    if let Err(exit_code) = result {
        std::process::exit(exit_code);
    }
}
