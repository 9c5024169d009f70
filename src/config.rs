// ABOUTME: Version info and REPL banner/prompt constants

pub const VERSION: &str = "0.1.0";
pub const WELCOME_MESSAGE: &str = "lispkit 0.1.0";
pub const WELCOME_SUBTITLE: &str = "A tree-walking Lisp with TCO, macros, and quasiquote";

pub const PROMPT: &str = "user> ";
pub const HISTORY_FILE: &str = ".lispkit_history";
