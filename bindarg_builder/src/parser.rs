mod args;
mod base;
mod binding;
pub(crate) mod definition;
mod group;
mod interface;
mod middleware;
mod printer;

pub use args::{ActionRecord, Args};
pub use base::*;
pub(crate) use binding::Binding;
pub use definition::ParamId;
pub(crate) use definition::{
    ActionFn, BranchSpec, CommandId, CommandSpec, CommandTree, GroupDef, GroupSpec, ParamKind,
    ParameterDef, ROOT,
};
pub(crate) use group::check_groups;
pub(crate) use interface::*;
pub use middleware::GeneralParser;
pub(crate) use printer::*;
