use serde::{Deserialize, Serialize};

/// The signed-in user as known to the client.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionUser {
    pub uid: String,
    pub email: String,
    pub full_name: String,
}

impl SessionUser {
    /// Builds the session identity from a provider profile, falling back to
    /// the local part of the email when the profile carries no display name.
    pub fn from_profile(uid: &str, email: &str, display_name: Option<&str>) -> Self {
        let full_name = match display_name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => email.split('@').next().unwrap_or(email).to_string(),
        };

        SessionUser {
            uid: uid.to_string(),
            email: email.to_string(),
            full_name,
        }
    }

    pub fn initials(&self) -> String {
        self.full_name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .collect::<String>()
            .to_uppercase()
    }
}

#[cfg(test)]
impl SessionUser {
    pub fn test_user(uid: &str) -> Self {
        SessionUser {
            uid: uid.to_string(),
            email: format!("{}@example.com", uid),
            full_name: "Test User".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_profile_prefers_display_name() {
        let user = SessionUser::from_profile("u1", "jane@example.com", Some("Jane Doe"));
        assert_eq!(user.full_name, "Jane Doe");
    }

    #[test]
    fn from_profile_falls_back_to_email_local_part() {
        let user = SessionUser::from_profile("u1", "jane.doe@example.com", None);
        assert_eq!(user.full_name, "jane.doe");

        let blank = SessionUser::from_profile("u1", "jane@example.com", Some("   "));
        assert_eq!(blank.full_name, "jane");
    }

    #[test]
    fn initials_takes_first_two_words() {
        let user = SessionUser::from_profile("u1", "x@example.com", Some("Jane Alice Doe"));
        assert_eq!(user.initials(), "JA");

        let single = SessionUser::from_profile("u1", "x@example.com", Some("jane"));
        assert_eq!(single.initials(), "J");
    }
}
