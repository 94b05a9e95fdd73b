//! anemone - the argument-expansion core of an interactive command shell
//!
//! This library turns one raw argument token into the list of concrete
//! strings used for execution, completion, or assignment. It owns the
//! five-stage pipeline (command substitution, variables, braces, home
//! directory and `%self`, wildcards) and the sentinel alphabet flowing
//! between the stages; everything else - the variable store, history,
//! subshell evaluation, the user database, and the wildcard matcher - is
//! reached through collaborator traits, with table- and
//! filesystem-backed implementations included.

pub mod completion;
pub mod errors;
pub mod escape;
pub mod expand;
pub mod history;
pub mod lexer;
pub mod matcher;
pub mod natural;
pub mod path;
pub mod sentinels;
pub mod subshell;
pub mod users;
pub mod vars;

pub use completion::{Completion, CompletionFlags};
pub use errors::{ParseError, ParseErrorCode, ParseErrorList, SOURCE_LOCATION_UNKNOWN};
pub use expand::{
    expand_is_clean, expand_one, expand_string, expand_to_command_and_args, ExpandContext,
    ExpandFlags, ExpandResult,
};
pub use history::{HistoryStore, MemoryHistory};
pub use matcher::{
    FileSystem, FsMatcher, InMemoryFs, OsFs, WildcardMatcher, WildcardParams, WildcardResult,
};
pub use subshell::{ScriptedSubshell, SubshellExecutor, STATUS_READ_TOO_MUCH};
pub use users::{UserDatabase, UserTable};
pub use vars::{EnvVar, VarTable, VariableStore};
