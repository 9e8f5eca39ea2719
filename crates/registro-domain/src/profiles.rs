use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    pub full_name: String,
}

/// Find a profile by its display name.
pub fn find_profile<'a>(profiles: &'a [Profile], full_name: &str) -> Option<&'a Profile> {
    profiles.iter().find(|p| p.full_name == full_name)
}
