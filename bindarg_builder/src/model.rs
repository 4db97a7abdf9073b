use std::collections::BTreeSet;

use crate::parser::ConfigError;

/// The cardinality of inputs to match for a parameter.
///
/// Inspired by argparse: <https://docs.python.org/3/library/argparse.html#nargs>
///
/// A `Nargs` is validated when constructed, so a malformed arity can never reach the parser.
///
/// ### Example
/// ```
/// # use bindarg_builder as bindarg;
/// use bindarg::Nargs;
///
/// let nargs = Nargs::between(1, 3).unwrap();
/// assert!(!nargs.satisfied(0));
/// assert!(nargs.satisfied(2));
/// assert!(nargs.can_accept_more(2));
/// assert!(!nargs.can_accept_more(3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Nargs(Arity);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Arity {
    // An inclusive range, where `None` means unbounded.
    Between(usize, Option<usize>),
    OneOf(BTreeSet<usize>),
    Remainder,
}

impl Nargs {
    /// `N`: Precisely `N` values.
    pub fn precisely(n: usize) -> Self {
        Nargs(Arity::Between(n, Some(n)))
    }

    /// `?`: Zero or one value.
    pub fn optional() -> Self {
        Nargs(Arity::Between(0, Some(1)))
    }

    /// `*`: May be any number of values, including `0`.
    pub fn any() -> Self {
        Nargs(Arity::Between(0, None))
    }

    /// `+`: At least one value must be specified.
    pub fn at_least_one() -> Self {
        Nargs(Arity::Between(1, None))
    }

    /// `N+`: At least `N` values must be specified.
    pub fn at_least(n: usize) -> Self {
        Nargs(Arity::Between(n, None))
    }

    /// `MIN..=MAX`: Any number of values within the inclusive range.
    pub fn between(min: usize, max: usize) -> Result<Self, ConfigError> {
        if min > max {
            return Err(ConfigError::Nargs(format!(
                "the range {min}..={max} is empty"
            )));
        }

        Ok(Nargs(Arity::Between(min, Some(max))))
    }

    /// `{A, B, ..}`: Precisely one of the listed counts.
    pub fn one_of(counts: impl IntoIterator<Item = usize>) -> Result<Self, ConfigError> {
        let counts: BTreeSet<usize> = counts.into_iter().collect();

        if counts.is_empty() {
            return Err(ConfigError::Nargs(
                "the set of allowed counts is empty".to_string(),
            ));
        }

        Ok(Nargs(Arity::OneOf(counts)))
    }

    /// `...`: Every remaining token, verbatim.
    /// Only meaningful for the final positional parameter.
    pub fn remainder() -> Self {
        Nargs(Arity::Remainder)
    }

    /// The smallest satisfying count.
    pub fn min(&self) -> usize {
        match &self.0 {
            Arity::Between(min, _) => *min,
            Arity::OneOf(counts) => *counts
                .first()
                .expect("internal error - one_of counts must not be empty"),
            Arity::Remainder => 0,
        }
    }

    /// The largest satisfying count, or `None` when unbounded.
    pub fn max(&self) -> Option<usize> {
        match &self.0 {
            Arity::Between(_, max) => *max,
            Arity::OneOf(counts) => counts.last().copied(),
            Arity::Remainder => None,
        }
    }

    /// Whether `count` values satisfy this arity.
    pub fn satisfied(&self, count: usize) -> bool {
        match &self.0 {
            Arity::Between(min, max) => *min <= count && max.map_or(true, |m| count <= m),
            Arity::OneOf(counts) => counts.contains(&count),
            Arity::Remainder => true,
        }
    }

    /// Whether, having consumed `count` values, another value may still be consumed.
    pub fn can_accept_more(&self, count: usize) -> bool {
        match &self.0 {
            Arity::Between(_, max) => max.map_or(true, |m| count < m),
            Arity::OneOf(counts) => counts.range(count + 1..).next().is_some(),
            Arity::Remainder => true,
        }
    }

    pub(crate) fn is_remainder(&self) -> bool {
        matches!(self.0, Arity::Remainder)
    }

    pub(crate) fn is_fixed(&self) -> bool {
        self.max() == Some(self.min())
    }

    /// The satisfying counts no greater than `limit`, largest first.
    pub(crate) fn counts_within(&self, limit: usize) -> impl Iterator<Item = usize> + '_ {
        let upper = self.max().map_or(limit, |m| std::cmp::min(m, limit));
        (self.min()..=upper).rev().filter(|count| self.satisfied(*count))
    }
}

impl std::fmt::Display for Nargs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Arity::Between(0, Some(1)) => write!(f, "?"),
            Arity::Between(0, None) => write!(f, "*"),
            Arity::Between(1, None) => write!(f, "+"),
            Arity::Between(min, None) => write!(f, "{min}+"),
            Arity::Between(min, Some(max)) if min == max => write!(f, "{min}"),
            Arity::Between(min, Some(max)) => write!(f, "{min}..={max}"),
            Arity::OneOf(counts) => write!(
                f,
                "{{{}}}",
                counts
                    .iter()
                    .map(|c| c.to_string())
                    .collect::<Vec<String>>()
                    .join(", ")
            ),
            Arity::Remainder => write!(f, "..."),
        }
    }
}

/// A converted parameter value.
///
/// Every parameter resolves to a `Value`: scalars for single-value parameters, lists for accumulating ones.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No value (ex: an unspecified option without a default).
    None,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// Text.
    Str(String),
    /// An ordered sequence of values.
    List(Vec<Value>),
}

impl Value {
    pub(crate) fn push(&mut self, item: Value) {
        match self {
            Value::List(items) => items.push(item),
            _ => *self = Value::List(vec![item]),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Int(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::Str(value) => write!(f, "{value}"),
            Value::List(items) => write!(
                f,
                "[{}]",
                items
                    .iter()
                    .map(|item| item.to_string())
                    .collect::<Vec<String>>()
                    .join(", ")
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! value_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Value::Int(i64::from(value))
                }
            }
        )*
    };
}

value_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<std::path::PathBuf> for Value {
    fn from(value: std::path::PathBuf) -> Self {
        Value::Str(value.to_string_lossy().into_owned())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => inner.into(),
            None => Value::None,
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{thread_rng, Rng};
    use rstest::rstest;

    #[rstest]
    #[case(Nargs::precisely(0), 0, true)]
    #[case(Nargs::precisely(0), 1, false)]
    #[case(Nargs::precisely(2), 1, false)]
    #[case(Nargs::precisely(2), 2, true)]
    #[case(Nargs::optional(), 0, true)]
    #[case(Nargs::optional(), 1, true)]
    #[case(Nargs::optional(), 2, false)]
    #[case(Nargs::any(), 0, true)]
    #[case(Nargs::any(), 100, true)]
    #[case(Nargs::at_least_one(), 0, false)]
    #[case(Nargs::at_least_one(), 1, true)]
    #[case(Nargs::at_least(3), 2, false)]
    #[case(Nargs::at_least(3), 3, true)]
    #[case(Nargs::remainder(), 0, true)]
    #[case(Nargs::remainder(), 7, true)]
    fn satisfied(#[case] nargs: Nargs, #[case] count: usize, #[case] expected: bool) {
        assert_eq!(nargs.satisfied(count), expected);
    }

    #[test]
    fn satisfied_between_random() {
        let mut rng = thread_rng();

        for _ in 0..100 {
            let min: usize = rng.gen_range(0..10);
            let max: usize = rng.gen_range(min..20);
            let nargs = Nargs::between(min, max).unwrap();

            for count in 0..25 {
                assert_eq!(
                    nargs.satisfied(count),
                    min <= count && count <= max,
                    "{nargs} with {count}"
                );
                assert_eq!(nargs.can_accept_more(count), count < max);
            }
        }
    }

    #[test]
    fn satisfied_one_of_random() {
        let mut rng = thread_rng();

        for _ in 0..100 {
            let counts: BTreeSet<usize> = (0..rng.gen_range(1..5))
                .map(|_| rng.gen_range(0..10))
                .collect();
            let nargs = Nargs::one_of(counts.clone()).unwrap();

            for count in 0..12 {
                assert_eq!(nargs.satisfied(count), counts.contains(&count));
            }
        }
    }

    #[rstest]
    #[case(Nargs::precisely(0), 0, false)]
    #[case(Nargs::precisely(1), 0, true)]
    #[case(Nargs::precisely(1), 1, false)]
    #[case(Nargs::any(), 1000, true)]
    #[case(Nargs::remainder(), 1000, true)]
    #[case(Nargs::one_of([1, 3]).unwrap(), 0, true)]
    #[case(Nargs::one_of([1, 3]).unwrap(), 1, true)]
    #[case(Nargs::one_of([1, 3]).unwrap(), 2, true)]
    #[case(Nargs::one_of([1, 3]).unwrap(), 3, false)]
    fn can_accept_more(#[case] nargs: Nargs, #[case] count: usize, #[case] expected: bool) {
        assert_eq!(nargs.can_accept_more(count), expected);
    }

    #[test]
    fn between_empty() {
        assert_matches!(Nargs::between(3, 2), Err(ConfigError::Nargs(_)));
        assert_eq!(Nargs::between(2, 2).unwrap(), Nargs::precisely(2));
    }

    #[test]
    fn one_of_empty() {
        assert_matches!(Nargs::one_of(Vec::default()), Err(ConfigError::Nargs(_)));
    }

    #[rstest]
    #[case(Nargs::precisely(2), vec![2])]
    #[case(Nargs::between(0, 2).unwrap(), vec![2, 1, 0])]
    #[case(Nargs::at_least_one(), vec![4, 3, 2, 1])]
    #[case(Nargs::one_of([0, 3, 9]).unwrap(), vec![3, 0])]
    fn counts_within(#[case] nargs: Nargs, #[case] expected: Vec<usize>) {
        assert_eq!(nargs.counts_within(4).collect::<Vec<usize>>(), expected);
    }

    #[rstest]
    #[case(Nargs::precisely(1), "1")]
    #[case(Nargs::optional(), "?")]
    #[case(Nargs::any(), "*")]
    #[case(Nargs::at_least_one(), "+")]
    #[case(Nargs::at_least(2), "2+")]
    #[case(Nargs::between(1, 3).unwrap(), "1..=3")]
    #[case(Nargs::one_of([3, 1]).unwrap(), "{1, 3}")]
    #[case(Nargs::remainder(), "...")]
    fn display(#[case] nargs: Nargs, #[case] expected: &str) {
        assert_eq!(nargs.to_string(), expected);
    }

    #[test]
    fn value_push() {
        let mut value = Value::None;
        value.push(Value::from(1));
        value.push(Value::from(2));
        assert_eq!(value, Value::List(vec![Value::Int(1), Value::Int(2)]));
        assert_eq!(value.to_string(), "[1, 2]");
    }

    #[test]
    fn value_from() {
        assert_eq!(Value::from(Some("a")), Value::Str("a".to_string()));
        assert_eq!(Value::from(None::<u32>), Value::None);
        assert_eq!(
            Value::from(vec![true, false]),
            Value::List(vec![Value::Bool(true), Value::Bool(false)])
        );
    }
}
