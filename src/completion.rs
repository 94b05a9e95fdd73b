//! Completions
//!
//! The value passed between pipeline stages: an expanded argument candidate
//! plus the flags the UI layer needs to present it.

/// Flags attached to a single completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompletionFlags {
    /// The completion replaces the whole token rather than extending it.
    pub replaces_token: bool,
    /// The completion contains a tilde that must not be backslash-escaped
    /// when displayed.
    pub dont_escape_tildes: bool,
}

/// One expanded argument candidate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Completion {
    /// The expanded string.
    pub text: String,
    /// Optional description shown next to the candidate. Empty unless the
    /// wildcard matcher supplies one.
    pub description: String,
    pub flags: CompletionFlags,
}

impl Completion {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            description: String::new(),
            flags: CompletionFlags::default(),
        }
    }

    pub fn with_flags(text: impl Into<String>, flags: CompletionFlags) -> Self {
        Self {
            text: text.into(),
            description: String::new(),
            flags,
        }
    }

    pub fn replaces_token(&self) -> bool {
        self.flags.replaces_token
    }
}
