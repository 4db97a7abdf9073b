use bindarg::prelude::*;
use bindarg::{CommandLineParser, Condition, Convert, Parameter};

fn main() {
    let parser = CommandLineParser::new("sub-command")
        .add(Parameter::flag("verbose").short('v'))
        .branch(
            Condition::new("sub")
                // "zero" is an undocumented sub-command.
                .choice("one", "the one sub-command")
                // "two" isn't a sub-command - only those specified via `command(..)` affect the program structure.
                .choice("two", "the two sub-command"),
        )
        .command("zero", |sub| {
            sub.add(Parameter::positional("arg"))
                .add(Parameter::flag("opt"))
        })
        .command("one", |sub| {
            sub.about("Counts to one.")
                .add(Parameter::positional("arg").convert(Convert::integer()))
        })
        .build();

    let parsed = parser.parse();
    let verbose: bool = parsed.get("verbose").expect("flags resolve to booleans");

    println!("Used sub-command '{}'.", parsed.command());
    if verbose {
        println!("path: {:?}", parsed.path());
    }

    match parsed.command() {
        "zero" => {
            let arg: String = parsed.get("arg").expect("'zero' takes a string");
            let opt: bool = parsed.get("opt").expect("flags resolve to booleans");
            println!("arg: {arg}");
            println!("opt: {opt}");
        }
        "one" => {
            let arg: i64 = parsed.get("arg").expect("'one' takes an integer");
            println!("arg: {arg}");
        }
        _ => {
            panic!("impossible - the parser will reject any variants not specified via `command(..)`.")
        }
    }
}
