pub(crate) const HELP_NAME: &str = "help";
pub(crate) const HELP_SHORT: char = 'h';
pub(crate) const HELP_MESSAGE: &str = "Show this help message and exit.";

// The lone separator which hands every remaining token to a pass-through parameter.
pub(crate) const PASS_THRU_MARKER: &str = "--";

pub(crate) const EXIT_SUCCESS: i32 = 0;
pub(crate) const EXIT_USAGE: i32 = 1;
