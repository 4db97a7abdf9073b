use crate::constant::PASS_THRU_MARKER;
use crate::model::Nargs;

/// The lexical shape of a single command line token.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    /// The lone pass-through marker `--`.
    PassThru,
    /// `--name` or `--name=value`.
    Long { name: &'a str, value: Option<&'a str> },
    /// `-x`, `-xyz`, `-xVALUE`, or `-x=VALUE` (the text after the dash).
    Short(&'a str),
    /// Anything else: a positional, a sub-command name, or an option's value.
    Value(&'a str),
}

impl<'a> Token<'a> {
    pub(crate) fn classify(token: &'a str) -> Self {
        if token == PASS_THRU_MARKER {
            Token::PassThru
        } else if !looks_like_option(token) {
            Token::Value(token)
        } else if let Some(long) = token.strip_prefix("--") {
            let (name, value) = split_equals_delimiter(long);
            Token::Long { name, value }
        } else {
            Token::Short(&token[1..])
        }
    }
}

/// Whether the token reads as an option string.
///
/// A lone `-` is a value (by convention, stdin), as is any negative number.
pub(crate) fn looks_like_option(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-') && !is_negative_number(token)
}

fn is_negative_number(token: &str) -> bool {
    match token.strip_prefix('-') {
        Some(rest) => {
            rest.starts_with(|c: char| c.is_ascii_digit() || c == '.') && token.parse::<f64>().is_ok()
        }
        None => false,
    }
}

pub(crate) fn split_equals_delimiter(token: &str) -> (&str, Option<&str>) {
    match token.split_once('=') {
        Some((n, v)) => (n, Some(v)),
        None => (token, None),
    }
}

/// Why a set of positionals cannot take a number of tokens.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Shortfall {
    /// The positions (into the positionals) whose minimum cannot be met.
    Missing(Vec<usize>),
    /// The number of trailing tokens that no positional can take.
    Overflow(usize),
    /// Enough tokens in total, but no assignment satisfies every arity (ex: `{1, 3}` given 2).
    Unsatisfiable,
}

/// Divide `tokens` consecutive tokens amongst the positionals, in order.
///
/// Each positional takes the largest count its nargs allows such that the positionals after it can still take the rest exactly.
/// So an earlier variable positional reserves what the later ones need, and the last one takes whatever is left.
pub(crate) fn distribute(nargs: &[&Nargs], tokens: usize) -> Result<Vec<usize>, Shortfall> {
    let mut memo = vec![vec![None; tokens + 1]; nargs.len() + 1];

    if !feasible(nargs, 0, tokens, &mut memo) {
        return Err(shortfall(nargs, tokens));
    }

    let mut remaining = tokens;
    let mut counts = Vec::with_capacity(nargs.len());

    for position in 0..nargs.len() {
        let count = nargs[position]
            .counts_within(remaining)
            .find(|count| feasible(nargs, position + 1, remaining - count, &mut memo))
            .expect("internal error - a feasible distribution must have a feasible step");
        counts.push(count);
        remaining -= count;
    }

    Ok(counts)
}

fn feasible(
    nargs: &[&Nargs],
    position: usize,
    remaining: usize,
    memo: &mut Vec<Vec<Option<bool>>>,
) -> bool {
    if position == nargs.len() {
        return remaining == 0;
    }

    if let Some(known) = memo[position][remaining] {
        return known;
    }

    let counts: Vec<usize> = nargs[position].counts_within(remaining).collect();
    let outcome = counts
        .into_iter()
        .any(|count| feasible(nargs, position + 1, remaining - count, memo));
    memo[position][remaining] = Some(outcome);
    outcome
}

fn shortfall(nargs: &[&Nargs], tokens: usize) -> Shortfall {
    let minimum: usize = nargs.iter().map(|n| n.min()).sum();

    if tokens < minimum {
        let mut remaining = tokens;
        let mut missing = Vec::default();

        for (position, n) in nargs.iter().enumerate() {
            if remaining >= n.min() {
                remaining -= n.min();
            } else {
                missing.push(position);
                remaining = 0;
            }
        }

        return Shortfall::Missing(missing);
    }

    let maximum: Option<usize> = nargs.iter().map(|n| n.max()).sum();

    match maximum {
        Some(maximum) if tokens > maximum => Shortfall::Overflow(tokens - maximum),
        _ => Shortfall::Unsatisfiable,
    }
}
