use std::collections::BTreeMap;

use crate::model::Value;
use crate::parser::{Args, CommandTree, ParamId, ParamKind, UsageError};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

#[derive(Debug, Default)]
struct ParamState {
    stored: Option<Value>,
    last_trigger: Option<usize>,
    occurrence: usize,
}

/// The mutable side of a parse.
///
/// The definition tree is only ever read; every accumulated value lives here.
/// A `Binding` is created per parse and consumed when the parse completes.
#[derive(Debug)]
pub(crate) struct Binding<'t> {
    tree: &'t CommandTree,
    states: BTreeMap<ParamId, ParamState>,
    args: Args,
    fired: Vec<ParamId>,
    unknown: Vec<String>,
}

impl<'t> Binding<'t> {
    pub(crate) fn new(tree: &'t CommandTree, tokens: &[&str]) -> Self {
        Self {
            tree,
            states: BTreeMap::default(),
            args: Args::new(tokens),
            fired: Vec::default(),
            unknown: Vec::default(),
        }
    }

    pub(crate) fn tree(&self) -> &'t CommandTree {
        self.tree
    }

    pub(crate) fn args(&self) -> &Args {
        &self.args
    }

    pub(crate) fn fired(&self) -> &[ParamId] {
        &self.fired
    }

    pub(crate) fn push_unknown(&mut self, token: &str) {
        self.unknown.push(token.to_string());
    }

    /// Apply one action of the parameter.
    ///
    /// Consecutive actions sharing a `trigger` form a single occurrence (ex: the values of `--pair a b`, or the characters of `-vvv`).
    pub(crate) fn take_action(
        &mut self,
        id: ParamId,
        trigger: usize,
        value: Option<(usize, &str)>,
    ) -> Result<(), UsageError> {
        let tree = self.tree;
        let parameter = tree.param(id);
        let state = self.states.entry(id).or_default();

        if state.last_trigger != Some(trigger) {
            state.last_trigger.replace(trigger);
            state.occurrence = 0;
        }

        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "Take action {id:?} '{}' (trigger={trigger}, occurrence={}): {value:?}.",
                parameter.name, state.occurrence
            );
        }

        match (&parameter.kind, value) {
            (ParamKind::Positional | ParamKind::Option { .. }, Some((index, text))) => {
                if !parameter.nargs.can_accept_more(state.occurrence) {
                    return Err(parameter.usage_error(
                        Some(text),
                        Some(index),
                        format!("cannot accept more than {} value(s)", parameter.nargs),
                    ));
                }

                let value = parameter.prepare_value(text, index)?;

                if parameter.stores_scalar() {
                    state.stored.replace(value);
                } else {
                    state
                        .stored
                        .get_or_insert_with(|| Value::List(Vec::default()))
                        .push(value);
                }
            }
            (ParamKind::Flag { constant, append }, None) => {
                if *append {
                    state
                        .stored
                        .get_or_insert_with(|| Value::List(Vec::default()))
                        .push(constant.clone());
                } else {
                    state.stored.replace(constant.clone());
                }
            }
            (ParamKind::Counter { step }, value) => {
                let increment = match value {
                    None => *step,
                    Some((index, text)) => text.parse::<i64>().map_err(|_| {
                        parameter.usage_error(Some(text), Some(index), "expected an integer count")
                    })?,
                };
                let current = match state.stored.take() {
                    Some(Value::Int(current)) => current,
                    None => match parameter.default_value() {
                        Value::Int(current) => current,
                        _ => unreachable!("internal error - counter defaults are validated as integers"),
                    },
                    Some(_) => unreachable!("internal error - counters only store integers"),
                };
                let total = current.checked_add(increment).ok_or_else(|| {
                    parameter.usage_error(
                        value.map(|(_, text)| text),
                        Some(value.map_or(trigger, |(index, _)| index)),
                        "count overflows",
                    )
                })?;
                state.stored.replace(Value::Int(total));
            }
            (ParamKind::ActionFlag { .. }, None) => {
                if state.stored.replace(Value::Bool(true)).is_none() {
                    self.fired.push(id);
                }
            }
            (
                ParamKind::Flag { .. } | ParamKind::ActionFlag { .. } | ParamKind::TriFlag { .. },
                Some((index, text)),
            ) => {
                return Err(parameter.usage_error(Some(text), Some(index), "does not accept values"));
            }
            (ParamKind::TriFlag { .. }, None) => {
                unreachable!("internal error - tri-flags are taken through take_switch");
            }
            (ParamKind::PassThru, value) => {
                let stored = state
                    .stored
                    .get_or_insert_with(|| Value::List(Vec::default()));

                if let Some((_, text)) = value {
                    stored.push(Value::Str(text.to_string()));
                }
            }
            (ParamKind::SubCommand, Some((_, text))) => {
                state.stored.replace(Value::Str(text.to_string()));
            }
            (ParamKind::Positional | ParamKind::Option { .. } | ParamKind::SubCommand, None) => {
                unreachable!("internal error - '{}' must be given a value", parameter.name);
            }
        };

        state.occurrence += 1;
        self.args
            .record_action(id, &parameter.name, trigger, value.map(|(_, text)| text));
        Ok(())
    }

    /// Apply a tri-flag, through either its primary or its alternate option string.
    ///
    /// Repeating the same form is allowed, but mixing the two is a conflict.
    pub(crate) fn take_switch(
        &mut self,
        id: ParamId,
        trigger: usize,
        alternate: bool,
    ) -> Result<(), UsageError> {
        let tree = self.tree;
        let parameter = tree.param(id);
        let (constant, other) = match &parameter.kind {
            ParamKind::TriFlag {
                primary,
                alternate: secondary,
            } => {
                if alternate {
                    (secondary, primary)
                } else {
                    (primary, secondary)
                }
            }
            _ => unreachable!("internal error - only tri-flags switch"),
        };
        let state = self.states.entry(id).or_default();

        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "Take switch {id:?} '{}' (trigger={trigger}, alternate={alternate}).",
                parameter.name
            );
        }

        if state.stored.as_ref() == Some(other) {
            return Err(UsageError::MutuallyExclusive {
                group: parameter.name.clone(),
                provided: vec![
                    parameter.switch_name(!alternate),
                    parameter.switch_name(alternate),
                ],
            });
        }

        state.stored.replace(constant.clone());
        state.last_trigger.replace(trigger);
        state.occurrence = 1;
        self.args.record_action(id, &parameter.name, trigger, None);
        Ok(())
    }

    /// Store every token verbatim into the pass-through parameter.
    pub(crate) fn take_all(
        &mut self,
        id: ParamId,
        trigger: usize,
        tokens: &[(usize, &str)],
    ) -> Result<(), UsageError> {
        self.take_action(id, trigger, None)?;

        for (index, token) in tokens {
            self.take_action(id, trigger, Some((*index, *token)))?;
        }

        Ok(())
    }

    /// The resolved value of the parameter: what it bound, its environment variable, or its default.
    pub(crate) fn result(&self, id: ParamId) -> Result<Value, UsageError> {
        let parameter = self.tree.param(id);

        match self.states.get(&id) {
            Some(ParamState {
                stored: Some(value),
                occurrence,
                ..
            }) => {
                if matches!(
                    parameter.kind,
                    ParamKind::Positional | ParamKind::Option { .. }
                ) && !parameter.nargs.satisfied(*occurrence)
                {
                    return Err(parameter.usage_error(
                        None,
                        None,
                        format!("expected {} value(s), but received {occurrence}", parameter.nargs),
                    ));
                }

                Ok(value.clone())
            }
            _ => match parameter.env_value()? {
                Some(value) => Ok(value),
                None if parameter.required => Err(UsageError::MissingArgument {
                    parameters: vec![parameter.usage_name()],
                }),
                None => Ok(parameter.default_value()),
            },
        }
    }

    pub(crate) fn into_parts(self) -> (Args, Vec<ParamId>, Vec<String>) {
        (self.args, self.fired, self.unknown)
    }
}
