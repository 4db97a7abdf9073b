use bindarg::{CommandLineParser, Convert, GeneralParser, Nargs, Parameter, Parsed};

#[derive(Debug, PartialEq, Eq)]
pub struct Params {
    verbose: bool,
    items: Vec<u32>,
}

impl Params {
    fn from_parsed(parsed: &Parsed) -> Self {
        Self {
            verbose: parsed.get("verbose").expect("flags resolve to booleans"),
            items: parsed.get("item").expect("items are converted to integers"),
        }
    }
}

fn main() {
    let params = parse();
    if params.verbose {
        println!("Summing {} item(s).", params.items.len());
    }
    let sum: u32 = params.items.iter().sum();
    println!("Sum: {sum}");
}

// Configure and execute the parser against `env::args`.
fn parse() -> Params {
    parse_tokens(|parser: GeneralParser| Ok(parser.parse()))
}

// Unit-testable function to configure the parser and execute it against the specified tokens.
fn parse_tokens(parse_fn: impl FnOnce(GeneralParser) -> Result<Parsed, i32>) -> Params {
    let parser = CommandLineParser::new("organization")
        .add(Parameter::flag("verbose").short('v'))
        .add(
            Parameter::positional("item")
                .nargs(Nargs::at_least_one())
                .convert(Convert::integer()),
        )
        .build();

    // The parse_fn signature is a `Result`.
    // However, since `GeneralParser::parse` does not return an error (it uses `std::process::exit` under the hood), the `Err` case is only reached via test.
    let parsed = parse_fn(parser).expect("test-reachable-only");
    Params::from_parsed(&parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic]
    fn parse_empty() {
        // Setup
        let tokens = vec![];

        // Execute & verify
        parse_tokens(|parser| parser.parse_tokens(tokens.as_slice()));
    }

    #[test]
    fn parse() {
        // Setup
        let tokens = vec!["5"];

        // Execute
        let result = parse_tokens(|parser| parser.parse_tokens(tokens.as_slice()));

        // Verify
        assert_eq!(
            result,
            Params {
                verbose: false,
                items: vec![5],
            }
        );
    }

    #[test]
    fn parse_verbose() {
        // Setup
        let tokens = vec!["-v", "1", "2"];

        // Execute
        let result = parse_tokens(|parser| parser.parse_tokens(tokens.as_slice()));

        // Verify
        assert_eq!(
            result,
            Params {
                verbose: true,
                items: vec![1, 2],
            }
        );
    }
}
