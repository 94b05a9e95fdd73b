//! User Database
//!
//! Resolves `~username` to a home directory. The real shell asks the
//! system user database; embedders and tests use the table.

use std::collections::HashMap;

pub trait UserDatabase {
    fn home_dir(&self, username: &str) -> Option<String>;
}

/// A fixed username-to-home mapping.
#[derive(Debug, Clone, Default)]
pub struct UserTable {
    homes: HashMap<String, String>,
}

impl UserTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, username: impl Into<String>, home: impl Into<String>) {
        self.homes.insert(username.into(), home.into());
    }
}

impl UserDatabase for UserTable {
    fn home_dir(&self, username: &str) -> Option<String> {
        self.homes.get(username).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let mut users = UserTable::new();
        users.insert("alice", "/home/alice");
        assert_eq!(users.home_dir("alice").as_deref(), Some("/home/alice"));
        assert_eq!(users.home_dir("bob"), None);
    }
}
