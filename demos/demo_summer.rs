use bindarg::{CommandLineParser, Convert, Nargs, Parameter};

fn main() {
    let parser = CommandLineParser::new("summer")
        .add(
            Parameter::positional("item")
                .nargs(Nargs::at_least_one())
                .convert(Convert::integer())
                .help("The items to sum."),
        )
        .build();

    let parsed = parser.parse();
    let items: Vec<u32> = parsed
        .get("item")
        .expect("the 'item' values are converted to integers");
    let sum: u32 = items.iter().sum();
    println!("Sum: {sum}");
}
