use std::collections::HashSet;

use crate::parser::{Binding, CommandId, GroupDef, ParamId, UsageError};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Validate the group constraints of every command along the path, root first.
///
/// Runs once all tokens are bound, since "at most one" cannot be judged from a single token.
pub(crate) fn check_groups(binding: &Binding, path: &[CommandId]) -> Result<(), UsageError> {
    for command in path {
        for group in &binding.tree().command(*command).groups {
            check_group(binding, *command, group)?;
        }
    }

    Ok(())
}

fn check_group(binding: &Binding, command: CommandId, group: &GroupDef) -> Result<(), UsageError> {
    if !group.mutually_exclusive && !group.mutually_dependent {
        return Ok(());
    }

    let tree = binding.tree();
    let members: HashSet<ParamId> = group
        .members
        .iter()
        .map(|index| ParamId::new(command, *index))
        .collect();
    // Members in the order they were first provided.
    let provided: Vec<ParamId> = binding
        .args()
        .find_all(|record| members.contains(&record.parameter))
        .map(|record| record.parameter)
        .collect();

    #[cfg(feature = "tracing_debug")]
    {
        debug!(
            "Group '{}' has {} of {} member(s) provided.",
            group.name,
            provided.len(),
            members.len()
        );
    }

    let name = |id: &ParamId| tree.param(*id).usage_name();

    if group.mutually_exclusive && provided.len() > 1 {
        return Err(UsageError::MutuallyExclusive {
            group: group.name.clone(),
            provided: provided.iter().map(name).collect(),
        });
    }

    if group.mutually_dependent && !provided.is_empty() && provided.len() < members.len() {
        let missing = group
            .members
            .iter()
            .map(|index| ParamId::new(command, *index))
            .filter(|id| !provided.contains(id))
            .map(|id| name(&id))
            .collect();

        return Err(UsageError::MutuallyDependent {
            group: group.name.clone(),
            provided: provided.iter().map(name).collect(),
            missing,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{Matched, TokenMatcher};
    use crate::parser::definition::test::*;
    use crate::parser::{CommandTree, GroupSpec, ErrorKind};
    use rstest::rstest;

    fn tree(exclusive: bool, dependent: bool) -> CommandTree {
        let mut command = spec(
            "program",
            vec![flag("x", Some('x')), option("y", Some('y')), flag("z", None)],
        );
        command.groups.push(GroupSpec {
            name: "pair".to_string(),
            description: None,
            members: vec!["x".to_string(), "y".to_string()],
            mutually_exclusive: exclusive,
            mutually_dependent: dependent,
        });
        CommandTree::build(command).unwrap()
    }

    fn check(tree: &CommandTree, tokens: &[&str]) -> Result<(), UsageError> {
        match TokenMatcher::new(tree, tokens).run().unwrap() {
            Matched::Complete { binding, path } => check_groups(&binding, &path),
            Matched::Help(_) => panic!("unexpected help"),
        }
    }

    #[rstest]
    #[case(vec![], true)]
    #[case(vec!["-x"], true)]
    #[case(vec!["-y", "1"], true)]
    #[case(vec!["-x", "--z"], true)]
    #[case(vec!["-x", "-x"], true)]
    #[case(vec!["-y", "1", "-x"], false)]
    fn mutually_exclusive(#[case] tokens: Vec<&str>, #[case] ok: bool) {
        let tree = tree(true, false);
        let result = check(&tree, &tokens);

        if ok {
            assert_eq!(result, Ok(()));
        } else {
            let error = result.unwrap_err();
            assert_eq!(error.kind(), ErrorKind::ParamConflict);
            assert_eq!(
                error,
                UsageError::MutuallyExclusive {
                    group: "pair".to_string(),
                    provided: vec!["--y".to_string(), "--x".to_string()],
                }
            );
        }
    }

    #[rstest]
    #[case(vec![], None)]
    #[case(vec!["-x", "-y", "1"], None)]
    #[case(vec!["--z"], None)]
    #[case(vec!["-x"], Some("--y"))]
    #[case(vec!["-y", "1"], Some("--x"))]
    fn mutually_dependent(#[case] tokens: Vec<&str>, #[case] missing: Option<&str>) {
        let tree = tree(false, true);

        match missing {
            None => assert_eq!(check(&tree, &tokens), Ok(())),
            Some(missing) => {
                assert_matches!(
                    check(&tree, &tokens),
                    Err(UsageError::MutuallyDependent { group, missing: m, .. }) if group == "pair" && m == vec![missing.to_string()]
                );
            }
        }
    }

    #[test]
    fn unconstrained() {
        let tree = tree(false, false);
        assert_eq!(check(&tree, &["-x", "-y", "1"]), Ok(()));
    }
}
