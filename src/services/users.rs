//! User lookups.
//!
//! Mock data: any numeric id up to 100 resolves to a synthetic user.

use serde::{Deserialize, Serialize};

/// Ids above this are treated as unknown.
pub const MAX_KNOWN_USER_ID: i64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
}

pub fn all_users() -> Vec<User> {
    vec![
        User {
            id: 1,
            name: "Alice".to_string(),
        },
        User {
            id: 2,
            name: "Bob".to_string(),
        },
    ]
}

/// Look up a user by the id as it appears in the URL.
///
/// Non-numeric ids are not found.
pub fn user_by_id(id: &str) -> Option<User> {
    let id: i64 = id.trim().parse().ok()?;
    if id > MAX_KNOWN_USER_ID {
        return None;
    }
    Some(User {
        id,
        name: format!("User {id}"),
    })
}
