use std::collections::HashSet;

use crate::parser::ParamId;

/// A single fired action: one parameter triggered by one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRecord {
    pub(crate) parameter: ParamId,
    name: String,
    trigger: usize,
    value: Option<String>,
}

impl ActionRecord {
    /// The name of the triggered parameter.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The index of the token which triggered the action.
    pub fn trigger(&self) -> usize {
        self.trigger
    }

    /// The raw value consumed by the action, if any.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

/// The per-parse token ledger.
///
/// Records the raw tokens and every action they triggered, in firing order.
/// A fresh ledger is created for each parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    tokens: Vec<String>,
    records: Vec<ActionRecord>,
}

impl Args {
    pub(crate) fn new(tokens: &[&str]) -> Self {
        Self {
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
            records: Vec::default(),
        }
    }

    pub(crate) fn record_action(
        &mut self,
        parameter: ParamId,
        name: &str,
        trigger: usize,
        value: Option<&str>,
    ) {
        self.records.push(ActionRecord {
            parameter,
            name: name.to_string(),
            trigger,
            value: value.map(|v| v.to_string()),
        });
    }

    /// The raw tokens of this parse.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Every fired action, in firing order.
    pub fn records(&self) -> &[ActionRecord] {
        &self.records
    }

    /// The number of distinct tokens which triggered the named parameter.
    ///
    /// This counts occurrences, not values: `--pair a b` is provided once, `-vvv` is provided once, and `--name a --name b` is provided twice.
    pub fn num_provided(&self, name: &str) -> usize {
        self.records
            .iter()
            .filter(|r| r.name == name)
            .map(|r| r.trigger)
            .collect::<HashSet<usize>>()
            .len()
    }

    /// Lazily find the distinct parameters whose actions match the predicate, in the order they first fired.
    ///
    /// Each parameter is yielded once, represented by its first matching record.
    pub fn find_all<'a, P>(&'a self, mut predicate: P) -> impl Iterator<Item = &'a ActionRecord> + 'a
    where
        P: FnMut(&ActionRecord) -> bool + 'a,
    {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(move |record| predicate(record) && seen.insert(record.parameter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> Args {
        let mut args = Args::new(&["--name", "a", "-vv", "--name", "b", "c", "d"]);
        let name = ParamId::new(0, 1);
        let verbose = ParamId::new(0, 2);
        let item = ParamId::new(0, 3);
        args.record_action(name, "name", 0, Some("a"));
        args.record_action(verbose, "verbose", 2, None);
        args.record_action(verbose, "verbose", 2, None);
        args.record_action(name, "name", 3, Some("b"));
        args.record_action(item, "item", 5, Some("c"));
        args.record_action(item, "item", 5, Some("d"));
        args
    }

    #[test]
    fn num_provided() {
        let args = ledger();
        assert_eq!(args.num_provided("name"), 2);
        assert_eq!(args.num_provided("verbose"), 1);
        assert_eq!(args.num_provided("item"), 1);
        assert_eq!(args.num_provided("other"), 0);
    }

    #[test]
    fn find_all() {
        let args = ledger();
        let names: Vec<&str> = args.find_all(|_| true).map(|r| r.name()).collect();
        assert_eq!(names, vec!["name", "verbose", "item"]);

        let names: Vec<&str> = args
            .find_all(|r| r.value().is_some())
            .map(|r| r.name())
            .collect();
        assert_eq!(names, vec!["name", "item"]);
    }

    #[test]
    fn find_all_lazy() {
        let args = ledger();
        let mut calls = 0;
        let first = args
            .find_all(|_| {
                calls += 1;
                true
            })
            .next()
            .map(|r| r.trigger());
        assert_eq!(first, Some(0));
        assert_eq!(calls, 1);
    }

    #[test]
    fn empty() {
        let args = Args::new(&[]);
        assert!(args.tokens().is_empty());
        assert_eq!(args.find_all(|_| true).count(), 0);
    }
}
