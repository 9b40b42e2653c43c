use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Off-chain profile record returned by the metadata service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(rename = "name", default)]
    pub display_name: Option<String>,
    #[serde(rename = "avatar", default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub balance: Option<String>,
}

/// The connected wallet account, its profile and its balance.
///
/// Lives only as long as the client process; it is never written to disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSession {
    pub address: Option<String>,
    pub user: Option<UserProfile>,
    /// Native balance, already formatted for display (e.g. `"0.4210"`).
    pub balance: Option<String>,
    pub connected_at: Option<DateTime<Utc>>,
}

impl UserSession {
    /// A freshly connected session with no profile loaded yet.
    pub fn connected(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            user: None,
            balance: None,
            connected_at: Some(Utc::now()),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }

    /// Profile id used as `userId` on backend writes.
    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }

    /// Display name if the profile has one, the wallet address otherwise.
    pub fn display_label(&self) -> Option<&str> {
        self.user
            .as_ref()
            .and_then(|u| u.display_name.as_deref())
            .filter(|name| !name.is_empty())
            .or(self.address.as_deref())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_disconnected() {
        let session = UserSession::default();
        assert!(!session.is_connected());
        assert_eq!(session.user_id(), None);
        assert_eq!(session.display_label(), None);
    }

    #[test]
    fn connected_sets_address_and_timestamp() {
        let session = UserSession::connected("0xabc");
        assert!(session.is_connected());
        assert!(session.connected_at.is_some());
    }

    #[test]
    fn display_label_prefers_name() {
        let mut session = UserSession::connected("0xabc");
        assert_eq!(session.display_label(), Some("0xabc"));

        session.user = Some(UserProfile {
            id: "u1".into(),
            display_name: Some("Ada".into()),
            avatar_url: None,
            balance: None,
        });
        assert_eq!(session.display_label(), Some("Ada"));
    }

    #[test]
    fn empty_name_falls_back_to_address() {
        let mut session = UserSession::connected("0xabc");
        session.user = Some(UserProfile {
            id: "u1".into(),
            display_name: Some(String::new()),
            avatar_url: None,
            balance: None,
        });
        assert_eq!(session.display_label(), Some("0xabc"));
    }

    #[test]
    fn clear_drops_everything() {
        let mut session = UserSession::connected("0xabc");
        session.balance = Some("1.0000".into());
        session.clear();
        assert_eq!(session, UserSession::default());
    }

    #[test]
    fn profile_parses_backend_shape() {
        let json = r#"{ "_id": "64f0c", "name": "Ada", "avatar": "https://cdn/x.png" }"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.id, "64f0c");
        assert_eq!(profile.display_name.as_deref(), Some("Ada"));
        assert_eq!(profile.avatar_url.as_deref(), Some("https://cdn/x.png"));
        assert_eq!(profile.balance, None);
    }
}
