mod core;
mod model;

pub(crate) use self::core::{Matched, TokenMatcher};
pub(crate) use model::looks_like_option;
