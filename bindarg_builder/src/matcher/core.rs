use crate::matcher::model::*;
use crate::model::Nargs;
use crate::parser::{Binding, CommandId, CommandTree, ParamId, ParamKind, UsageError, ROOT};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchState {
    Matching,
    InPassThru,
}

/// The outcome of matching every token.
#[derive(Debug)]
pub(crate) enum Matched<'t> {
    /// The help flag fired at the given command; nothing past token matching was resolved.
    Help(CommandId),
    /// All tokens were bound, along the command path (root first).
    Complete {
        binding: Binding<'t>,
        path: Vec<CommandId>,
    },
}

/// A single left to right pass over the tokens, binding each to a parameter of the current command chain.
///
/// Positional tokens are collected per command level and only distributed once the level is closed (by a sub-command name or the end of the tokens).
#[derive(Debug)]
pub(crate) struct TokenMatcher<'a, 't> {
    tree: &'t CommandTree,
    tokens: &'a [&'a str],
    cursor: usize,
    path: Vec<CommandId>,
    pending: Vec<(usize, &'a str)>,
    state: MatchState,
    binding: Binding<'t>,
}

impl<'a, 't> TokenMatcher<'a, 't> {
    pub(crate) fn new(tree: &'t CommandTree, tokens: &'a [&'a str]) -> Self {
        Self {
            tree,
            tokens,
            cursor: 0,
            path: vec![ROOT],
            pending: Vec::default(),
            state: MatchState::Matching,
            binding: Binding::new(tree, tokens),
        }
    }

    pub(crate) fn run(mut self) -> Result<Matched<'t>, UsageError> {
        while self.cursor < self.tokens.len() {
            let index = self.cursor;
            self.cursor += 1;
            self.feed(index, self.tokens[index])?;
        }

        self.close()
    }

    fn current(&self) -> CommandId {
        *self
            .path
            .last()
            .expect("internal error - the command path always holds the root")
    }

    fn feed(&mut self, index: usize, token: &'a str) -> Result<(), UsageError> {
        debug_assert_eq!(self.state, MatchState::Matching);
        let tree = self.tree;
        let command = tree.command(self.current());

        // Once the remainder positional has begun, every token is taken verbatim.
        if let Some(start) = command.remainder_start() {
            if self.pending.len() > start {
                self.pending.push((index, token));
                return Ok(());
            }
        }

        // 1. The pass-through marker:
        //  --
        // 2. A 'long' option, such as:
        //  --name
        //  --name ..
        //  --name=..
        // 3. 'Short' option(s), such as (where -i and -v are short options):
        //  -i
        //  -i..
        //  -i=..
        //  -iv
        //  -iv ..
        // 4. A positional or sub-command name.
        match Token::classify(token) {
            Token::PassThru => self.match_pass_thru(index),
            Token::Long { name, value } => self.match_long(index, token, name, value),
            Token::Short(cluster) => self.match_short(index, token, cluster),
            Token::Value(value) => self.match_value(index, value),
        }
    }

    fn match_pass_thru(&mut self, index: usize) -> Result<(), UsageError> {
        let tree = self.tree;

        match tree.find_pass_thru(&self.path) {
            Some(id) => {
                let remaining: Vec<(usize, &str)> = (self.cursor..self.tokens.len())
                    .map(|i| (i, self.tokens[i]))
                    .collect();
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Pass-through {id:?} takes {} token(s).", remaining.len());
                }
                self.binding.take_all(id, index, &remaining)?;
                self.cursor = self.tokens.len();
                self.state = MatchState::InPassThru;
                Ok(())
            }
            None => {
                if self.descend_default(|path| tree.find_pass_thru(path).is_some())? {
                    return self.match_pass_thru(index);
                }

                self.unknown_option(index, self.tokens[index])
            }
        }
    }

    fn match_long(
        &mut self,
        index: usize,
        token: &'a str,
        name: &str,
        attached: Option<&'a str>,
    ) -> Result<(), UsageError> {
        let tree = self.tree;

        match tree.find_long(&self.path, name) {
            Some(id) => {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Long option '{name}' matched {id:?}.");
                }
                let alternate = tree.param(id).is_alternate_long(name);
                self.take_option(id, index, attached, alternate)
            }
            None => {
                if self.descend_default(|path| tree.find_long(path, name).is_some())? {
                    return self.match_long(index, token, name, attached);
                }

                self.unknown_option(index, token)
            }
        }
    }

    fn match_short(
        &mut self,
        index: usize,
        token: &'a str,
        cluster: &'a str,
    ) -> Result<(), UsageError> {
        let tree = self.tree;
        let first = cluster
            .chars()
            .next()
            .expect("internal error - a short token has at least one character");
        let first_id = match tree.find_short(&self.path, first) {
            Some(id) => id,
            None => {
                if self.descend_default(|path| tree.find_short(path, first).is_some())? {
                    return self.match_short(index, token, cluster);
                }

                return self.unknown_option(index, token);
            }
        };
        let parameter = tree.param(first_id);
        let rest = &cluster[first.len_utf8()..];

        if rest.is_empty() {
            return self.take_option(first_id, index, None, parameter.is_alternate_short(first));
        }

        match &parameter.kind {
            ParamKind::Option { .. } => {
                // The rest of the token is the value: `-xVALUE` or `-x=VALUE`.
                let attached = rest.strip_prefix('=').unwrap_or(rest);
                return self.take_option(first_id, index, Some(attached), false);
            }
            ParamKind::Counter { .. } => {
                let attached = rest.strip_prefix('=').unwrap_or(rest);

                if attached.parse::<i64>().is_ok() {
                    return self.take_option(first_id, index, Some(attached), false);
                }
            }
            ParamKind::Flag { .. } | ParamKind::ActionFlag { .. } | ParamKind::TriFlag { .. }
                if rest.starts_with('=') =>
            {
                return Err(parameter.usage_error(
                    Some(&rest[1..]),
                    Some(index),
                    "does not accept values",
                ));
            }
            _ => {}
        }

        self.match_cluster(index, token, cluster)
    }

    // Expand a cluster of short options, ex: `-abc`.
    // Every character is resolved before any is bound, so a rejected cluster binds nothing.
    fn match_cluster(
        &mut self,
        index: usize,
        token: &'a str,
        cluster: &'a str,
    ) -> Result<(), UsageError> {
        let tree = self.tree;
        let mut switches: Vec<(ParamId, bool)> = Vec::default();
        let mut value_option: Option<(ParamId, Option<&'a str>)> = None;

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Expanding short option cluster '{cluster}'.");
        }

        for (offset, character) in cluster.char_indices() {
            if character == '=' {
                let (previous, _) = switches
                    .last()
                    .expect("internal error - the first character of a cluster cannot be '='");
                return Err(tree.param(*previous).usage_error(
                    Some(&cluster[offset + 1..]),
                    Some(index),
                    "does not accept values",
                ));
            }

            let id = match tree.find_short(&self.path, character) {
                Some(id) => id,
                None => {
                    if self.descend_default(|path| tree.find_short(path, character).is_some())? {
                        return self.match_cluster(index, token, cluster);
                    }

                    if tree.command(self.current()).config.allow_unknown {
                        return self.unknown_option(index, token);
                    }

                    return Err(UsageError::NoSuchOption {
                        token: format!("-{character}"),
                        index,
                    });
                }
            };
            let parameter = tree.param(id);

            if !parameter.short_combinable {
                return Err(parameter.usage_error(
                    Some(token),
                    Some(index),
                    "cannot be combined with other short options",
                ));
            }

            match &parameter.kind {
                ParamKind::Flag { .. }
                | ParamKind::ActionFlag { .. }
                | ParamKind::Counter { .. }
                | ParamKind::TriFlag { .. } => {
                    switches.push((id, parameter.is_alternate_short(character)));
                }
                ParamKind::Option { .. } => {
                    // A value option ends the cluster; only `=VALUE` may follow it.
                    let rest = &cluster[offset + character.len_utf8()..];
                    let attached = if rest.is_empty() {
                        None
                    } else {
                        match rest.strip_prefix('=') {
                            Some(value) => Some(value),
                            None => {
                                return Err(parameter.usage_error(
                                    Some(token),
                                    Some(index),
                                    "takes a value, so must be the final option in a cluster",
                                ));
                            }
                        }
                    };
                    value_option.replace((id, attached));
                    break;
                }
                ParamKind::Positional | ParamKind::PassThru | ParamKind::SubCommand => {
                    unreachable!("internal error - only options have short option strings")
                }
            }
        }

        for (id, alternate) in switches {
            match &tree.param(id).kind {
                ParamKind::TriFlag { .. } => self.binding.take_switch(id, index, alternate)?,
                _ => self.binding.take_action(id, index, None)?,
            }
        }

        match value_option {
            Some((id, attached)) => self.take_option(id, index, attached, false),
            None => Ok(()),
        }
    }

    // An option which the current chain does not declare may belong to the default sub-command (or to its default, in turn).
    // When it does, the current level is closed and the parse descends before the option is bound.
    fn descend_default(
        &mut self,
        declares: impl Fn(&[CommandId]) -> bool,
    ) -> Result<bool, UsageError> {
        let tree = self.tree;
        let mut path = self.path.clone();
        let mut collected = self.pending.len();

        loop {
            let current = *path
                .last()
                .expect("internal error - the command path always holds the root");
            let command = tree.command(current);
            let child = match (&command.default_child, command.sub_command_position()) {
                (Some(default), Some(position)) if position == collected => tree
                    .child(current, default)
                    .expect("internal error - the default sub-command must be registered"),
                _ => return Ok(false),
            };
            path.push(child);
            collected = 0;

            if declares(path.as_slice()) {
                break;
            }
        }

        for child in path.split_off(self.path.len()) {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Option belongs to the default sub-command {child}, descending.");
            }
            self.distribute()?;
            self.path.push(child);
        }

        Ok(true)
    }

    fn take_option(
        &mut self,
        id: ParamId,
        trigger: usize,
        attached: Option<&'a str>,
        alternate: bool,
    ) -> Result<(), UsageError> {
        let tree = self.tree;
        let parameter = tree.param(id);

        match (&parameter.kind, attached) {
            (ParamKind::Option { .. }, Some(value)) => {
                if !parameter.nargs.satisfied(1) {
                    return Err(parameter.usage_error(
                        Some(value),
                        Some(trigger),
                        format!(
                            "expects {} values, so cannot take a single attached value",
                            parameter.nargs
                        ),
                    ));
                }

                self.binding.take_action(id, trigger, Some((trigger, value)))
            }
            (ParamKind::Option { .. }, None) => self.take_values(id, trigger),
            (ParamKind::Counter { .. }, Some(value)) => {
                self.binding.take_action(id, trigger, Some((trigger, value)))
            }
            (ParamKind::Counter { .. }, None) => {
                // The count may be given as the following token, but only if it is an integer.
                match self.tokens.get(self.cursor) {
                    Some(next) if parameter.is_valid_arg(next) => {
                        let index = self.cursor;
                        self.cursor += 1;
                        self.binding.take_action(id, trigger, Some((index, next)))
                    }
                    _ => self.binding.take_action(id, trigger, None),
                }
            }
            (
                ParamKind::Flag { .. } | ParamKind::ActionFlag { .. } | ParamKind::TriFlag { .. },
                Some(value),
            ) => Err(parameter.usage_error(Some(value), Some(trigger), "does not accept values")),
            (ParamKind::TriFlag { .. }, None) => self.binding.take_switch(id, trigger, alternate),
            (ParamKind::Flag { .. } | ParamKind::ActionFlag { .. }, None) => {
                self.binding.take_action(id, trigger, None)
            }
            (ParamKind::Positional | ParamKind::PassThru | ParamKind::SubCommand, _) => {
                unreachable!("internal error - only options have option strings")
            }
        }
    }

    // Take the largest number of following tokens that the option's nargs allows.
    fn take_values(&mut self, id: ParamId, trigger: usize) -> Result<(), UsageError> {
        let tree = self.tree;
        let parameter = tree.param(id);
        let mut candidates = 0;

        while let Some(token) = self.tokens.get(self.cursor + candidates) {
            if !parameter.would_accept(candidates, token) {
                break;
            }

            candidates += 1;
        }

        match parameter.nargs.counts_within(candidates).next() {
            Some(count) if count > 0 => {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!(
                        "Option '{}' takes {count} of {candidates} candidate value(s).",
                        parameter.name
                    );
                }

                for _ in 0..count {
                    let index = self.cursor;
                    self.cursor += 1;
                    self.binding
                        .take_action(id, trigger, Some((index, self.tokens[index])))?;
                }

                Ok(())
            }
            _ => Err(parameter.usage_error(
                None,
                Some(trigger),
                format!(
                    "expects {} value(s), but {candidates} were available",
                    parameter.nargs
                ),
            )),
        }
    }

    fn unknown_option(&mut self, index: usize, token: &'a str) -> Result<(), UsageError> {
        let tree = self.tree;
        let config = &tree.command(self.current()).config;

        if !config.allow_unknown {
            return Err(UsageError::NoSuchOption {
                token: token.to_string(),
                index,
            });
        }

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Keeping unknown option '{token}'.");
        }

        self.binding.push_unknown(token);

        if config.unknown_takes_value && !token.contains('=') {
            if let Some(next) = self.tokens.get(self.cursor) {
                if !looks_like_option(next) {
                    self.binding.push_unknown(next);
                    self.cursor += 1;
                }
            }
        }

        Ok(())
    }

    fn match_value(&mut self, index: usize, token: &'a str) -> Result<(), UsageError> {
        let tree = self.tree;

        match tree.command(self.current()).sub_command_position() {
            Some(position) if self.pending.len() == position => self.descend(index, token),
            _ => {
                self.pending.push((index, token));
                Ok(())
            }
        }
    }

    fn descend(&mut self, index: usize, token: &'a str) -> Result<(), UsageError> {
        let tree = self.tree;
        let current = self.current();
        let command = tree.command(current);
        let slot = command
            .sub_command
            .expect("internal error - descend requires a sub-command slot");
        self.distribute()?;

        match tree.child(current, token) {
            Some(child) => {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Sub-command '{token}' selects {child}.");
                }
                self.binding
                    .take_action(ParamId::new(current, slot), index, Some((index, token)))?;
                self.path.push(child);
                Ok(())
            }
            None => match &command.default_child {
                Some(default) => {
                    let child = tree
                        .child(current, default)
                        .expect("internal error - the default sub-command must be registered");
                    #[cfg(feature = "tracing_debug")]
                    {
                        debug!("Token '{token}' selects no sub-command, descending into default '{default}'.");
                    }
                    self.path.push(child);
                    self.feed(index, token)
                }
                None => Err(UsageError::NoSuchSubCommand {
                    parameter: command.parameters[slot].name.clone(),
                    token: token.to_string(),
                    index,
                }),
            },
        }
    }

    // Bind the collected positional tokens of the current level.
    fn distribute(&mut self) -> Result<(), UsageError> {
        let tree = self.tree;
        let current = self.current();
        let command = tree.command(current);
        let pending = std::mem::take(&mut self.pending);
        let nargs = command.positional_nargs();
        let mut available = pending.len();
        // Positions which take nothing: positionals marked not required that cannot be satisfied.
        let mut skipped: Vec<usize> = Vec::default();

        let counts = loop {
            let active: Vec<usize> = (0..nargs.len()).filter(|p| !skipped.contains(p)).collect();
            let active_nargs: Vec<&Nargs> = active.iter().map(|p| nargs[*p]).collect();

            match distribute(&active_nargs, available) {
                Ok(active_counts) => {
                    let mut counts = vec![0; nargs.len()];

                    for (position, count) in active.iter().zip(active_counts) {
                        counts[*position] = count;
                    }

                    break counts;
                }
                Err(Shortfall::Overflow(surplus)) => {
                    let extra = &pending[available - surplus..available];

                    if command.config.allow_unknown {
                        for (_, token) in extra {
                            self.binding.push_unknown(token);
                        }

                        available -= surplus;
                    } else {
                        return Err(UsageError::UnrecognizedArguments {
                            tokens: extra.iter().map(|(_, t)| t.to_string()).collect(),
                            index: extra[0].0,
                        });
                    }
                }
                Err(Shortfall::Missing(missing)) => {
                    let missing: Vec<usize> = missing.into_iter().map(|m| active[m]).collect();
                    let is_required =
                        |p: &usize| command.parameters[command.positionals[*p]].required;

                    if missing.iter().any(is_required) {
                        // Bind the minimums which can be met; the unbound required positionals are reported with any other missing parameters.
                        let mut remaining = available;
                        let counts: Vec<usize> = (0..nargs.len())
                            .map(|p| {
                                if skipped.contains(&p) || missing.contains(&p) {
                                    0
                                } else {
                                    let count = std::cmp::min(nargs[p].min(), remaining);
                                    remaining -= count;
                                    count
                                }
                            })
                            .collect();
                        break counts;
                    }

                    skipped.extend(missing);
                }
                Err(Shortfall::Unsatisfiable) => {
                    let index = command
                        .positionals
                        .iter()
                        .find(|i| !command.parameters[**i].nargs.is_fixed())
                        .expect("internal error - fixed positionals are always satisfiable");
                    return Err(command.parameters[*index].usage_error(
                        None,
                        pending.first().map(|(i, _)| *i),
                        format!(
                            "cannot take its share of the {available} positional value(s)"
                        ),
                    ));
                }
            }
        };

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Distributed {available} positional token(s) at {current}: {counts:?}.");
        }

        let mut offset = 0;

        for (position, count) in counts.into_iter().enumerate() {
            if count > 0 {
                let id = ParamId::new(current, command.positionals[position]);
                let trigger = pending[offset].0;

                for (index, token) in &pending[offset..offset + count] {
                    self.binding.take_action(id, trigger, Some((*index, token)))?;
                }
            }

            offset += count;
        }

        Ok(())
    }

    fn close(mut self) -> Result<Matched<'t>, UsageError> {
        let tree = self.tree;

        if self
            .binding
            .fired()
            .iter()
            .any(|id| tree.param(*id).is_help())
        {
            return Ok(Matched::Help(self.current()));
        }

        // The deepest command's sub-command slot (if any) was never given a name.
        loop {
            self.distribute()?;
            let current = self.current();

            match &tree.command(current).default_child {
                Some(default) => {
                    let child = tree
                        .child(current, default)
                        .expect("internal error - the default sub-command must be registered");
                    #[cfg(feature = "tracing_debug")]
                    {
                        debug!("No sub-command given, descending into default '{default}'.");
                    }
                    self.path.push(child);
                }
                None => break,
            }
        }

        Ok(Matched::Complete {
            binding: self.binding,
            path: self.path,
        })
    }
}
