//! Session and theme data types
//!
//! Persisted values and the keys they live under.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Storage key for the theme preference
pub const THEME_KEY: &str = "theme";
/// Storage key for the JSON-encoded user identity
pub const USER_KEY: &str = "user";
/// Storage key for the opaque credential
pub const TOKEN_KEY: &str = "token";

/// Keys the session store owns; changes to anything else are not its concern
pub const SESSION_KEYS: [&str; 3] = [THEME_KEY, USER_KEY, TOKEN_KEY];

/// Two-valued visual mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Dark,
    Light,
}

impl ThemePreference {
    /// Persisted representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreference::Dark => "dark",
            ThemePreference::Light => "light",
        }
    }

    /// The other value
    pub fn toggled(self) -> Self {
        match self {
            ThemePreference::Dark => ThemePreference::Light,
            ThemePreference::Light => ThemePreference::Dark,
        }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, ThemePreference::Dark)
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ThemePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dark" => Ok(ThemePreference::Dark),
            "light" => Ok(ThemePreference::Light),
            other => Err(format!("Unknown theme: {}", other)),
        }
    }
}

/// Identity of the logged-in visitor, as written by the login flow.
///
/// The login flow owns the shape; only the fields shown in the chrome are
/// picked out, and any of them may be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserIdentity {
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserIdentity {
    pub fn new(id: impl Into<Value>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: Some(username.into()),
            nickname: None,
            avatar: None,
            email: None,
        }
    }

    /// Read a persisted identity. Any JSON object is accepted; fields of an
    /// unexpected type are dropped.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let object: Map<String, Value> = serde_json::from_str(raw)?;
        let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);

        Ok(Self {
            id: object.get("id").cloned().unwrap_or(Value::Null),
            username: text("username"),
            nickname: text("nickname"),
            avatar: text("avatar"),
            email: text("email"),
        })
    }

    /// Builder: set the nickname
    pub fn nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    /// Name shown in the page chrome
    pub fn display_name(&self) -> &str {
        self.nickname
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or("user")
    }
}

/// Opaque credential. Trusted client-side until the API rejects it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(****)")
    }
}

/// Client-held evidence of a login
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub identity: UserIdentity,
    pub credential: Option<Credential>,
}

impl Session {
    pub fn new(identity: UserIdentity, credential: Credential) -> Self {
        Self {
            identity,
            credential: Some(credential),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_parse() {
        assert_eq!("dark".parse::<ThemePreference>(), Ok(ThemePreference::Dark));
        assert_eq!("light".parse::<ThemePreference>(), Ok(ThemePreference::Light));
        assert!("Dark".parse::<ThemePreference>().is_err());
        assert!("".parse::<ThemePreference>().is_err());
    }

    #[test]
    fn test_theme_toggled() {
        assert_eq!(ThemePreference::Dark.toggled(), ThemePreference::Light);
        assert_eq!(ThemePreference::Light.toggled().toggled(), ThemePreference::Light);
    }

    #[test]
    fn test_theme_display_respects_width() {
        assert_eq!(format!("[{:<7}]", ThemePreference::Dark), "[dark   ]");
        assert_eq!(ThemePreference::Light.to_string(), "light");
    }

    #[test]
    fn test_identity_optional_fields() {
        let identity = UserIdentity::from_json(r#"{"id": 3, "username": "ada", "role": "admin"}"#).unwrap();
        assert_eq!(identity.id, serde_json::json!(3));
        assert_eq!(identity.display_name(), "ada");
        assert!(identity.avatar.is_none());

        let json = serde_json::to_string(&UserIdentity::new(1, "grace").nickname("G")).unwrap();
        assert_eq!(json, r#"{"id":1,"username":"grace","nickname":"G"}"#);
    }

    #[test]
    fn test_identity_tolerates_other_shapes() {
        let identity = UserIdentity::from_json(r#"{"id": "7", "username": "ada"}"#).unwrap();
        assert_eq!(identity.id, serde_json::json!("7"));
        assert_eq!(identity.display_name(), "ada");

        let identity = UserIdentity::from_json(r#"{"id": 7, "nickname": "ada"}"#).unwrap();
        assert_eq!(identity.username, None);
        assert_eq!(identity.display_name(), "ada");

        let identity = UserIdentity::from_json(r#"{"username": 42}"#).unwrap();
        assert_eq!(identity.username, None);
        assert_eq!(identity.display_name(), "user");

        assert!(UserIdentity::from_json("not json").is_err());
        assert!(UserIdentity::from_json(r#""ada""#).is_err());
        assert!(UserIdentity::from_json("[1, 2]").is_err());
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::new("secret-token");
        assert_eq!(format!("{:?}", credential), "Credential(****)");
        assert_eq!(credential.expose(), "secret-token");
    }
}
