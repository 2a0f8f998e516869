use anyhow::Context;
use gonawin_api::User;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Google,
    Twitter,
    Facebook,
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(Provider::Google),
            "twitter" => Ok(Provider::Twitter),
            "facebook" => Ok(Provider::Facebook),
            other => Err(format!("unknown provider: {other}")),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Provider::Google => "google",
            Provider::Twitter => "twitter",
            Provider::Facebook => "facebook",
        })
    }
}

/// What survives between runs once a provider sign-in completes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub access_token: Option<String>,
    pub auth: Option<String>,
    pub user_id: Option<i64>,
    pub logged_in: bool,
    pub provider: Option<Provider>,
}

impl StoredSession {
    fn is_complete(&self) -> bool {
        self.logged_in
            && self.access_token.as_deref().is_some_and(|t| !t.is_empty())
            && self.auth.as_deref().is_some_and(|a| !a.is_empty())
            && self.user_id.is_some()
    }
}

/// JSON file backing the session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> anyhow::Result<Option<StoredSession>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("read session file {}", self.path.display()))?;
        let session = serde_json::from_str(&content)
            .with_context(|| format!("parse session file {}", self.path.display()))?;
        Ok(Some(session))
    }

    pub fn save(&self, session: &StoredSession) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir {}", parent.display()))?;
        }
        let payload = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, payload)
            .with_context(|| format!("write session file {}", self.path.display()))?;
        Ok(())
    }

    pub fn clear(&self) -> anyhow::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove session file {}", self.path.display())),
        }
    }
}

/// Authentication state shared by every view.
#[derive(Debug)]
pub struct SessionContext {
    store: SessionStore,
    stored: StoredSession,
    current_user: Option<User>,
}

impl SessionContext {
    /// Load whatever the last run left behind. A broken file counts as logged out.
    pub fn init(store: SessionStore) -> Self {
        let stored = match store.load() {
            Ok(stored) => stored.unwrap_or_default(),
            Err(e) => {
                warn!("ignoring session file: {e:#}");
                StoredSession::default()
            }
        };
        Self { store, stored, current_user: None }
    }

    pub fn is_logged_in(&self) -> bool {
        self.stored.is_complete()
    }

    pub fn auth(&self) -> Option<&str> {
        self.stored.auth.as_deref()
    }

    pub fn user_id(&self) -> Option<i64> {
        self.stored.user_id
    }

    pub fn provider(&self) -> Option<Provider> {
        self.stored.provider
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn sign_in(
        &mut self,
        provider: Provider,
        access_token: String,
        user: User,
    ) -> anyhow::Result<()> {
        let auth = user
            .auth
            .clone()
            .context("backend did not return an auth token for the user")?;
        self.stored = StoredSession {
            access_token: Some(access_token),
            auth: Some(auth),
            user_id: Some(user.id),
            logged_in: true,
            provider: Some(provider),
        };
        self.store.save(&self.stored)?;
        debug!("signed in as user {} via {provider}", user.id);
        self.current_user = Some(user);
        Ok(())
    }

    /// Check the backend's idea of the current user against the stored one.
    /// The auth token is compared whenever the backend sends it back.
    /// Returns false, after tearing the session down, when they disagree.
    pub fn confirm_identity(&mut self, user: &User) -> bool {
        if self.stored.user_id != Some(user.id) {
            warn!(
                "session user {:?} does not match backend user {}; logging out",
                self.stored.user_id, user.id
            );
            self.teardown();
            return false;
        }
        if let Some(auth) = user.auth.as_deref()
            && self.stored.auth.as_deref() != Some(auth)
        {
            warn!("backend auth for user {} differs from the session's; logging out", user.id);
            self.teardown();
            return false;
        }
        self.current_user = Some(user.clone());
        true
    }

    pub fn teardown(&mut self) {
        self.stored = StoredSession::default();
        self.current_user = None;
        if let Err(e) = self.store.clear() {
            warn!("failed to clear session: {e:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64) -> User {
        User { id, username: "remy".into(), auth: Some("backend-auth".into()), ..Default::default() }
    }

    #[test]
    fn sign_in_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let mut session = SessionContext::init(SessionStore::new(&path));
        assert!(!session.is_logged_in());
        session.sign_in(Provider::Google, "access".into(), user(5)).unwrap();
        assert!(session.is_logged_in());

        let reloaded = SessionContext::init(SessionStore::new(&path));
        assert!(reloaded.is_logged_in());
        assert_eq!(reloaded.user_id(), Some(5));
        assert_eq!(reloaded.auth(), Some("backend-auth"));
        assert_eq!(reloaded.provider(), Some(Provider::Google));
    }

    #[test]
    fn incomplete_session_is_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = SessionStore::new(&path);
        store
            .save(&StoredSession {
                access_token: Some("a".into()),
                auth: None,
                user_id: Some(1),
                logged_in: true,
                provider: None,
            })
            .unwrap();
        assert!(!SessionContext::init(store).is_logged_in());
    }

    #[test]
    fn corrupt_file_counts_as_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(!SessionContext::init(SessionStore::new(&path)).is_logged_in());
    }

    #[test]
    fn identity_mismatch_tears_down() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let mut session = SessionContext::init(SessionStore::new(&path));
        session.sign_in(Provider::Twitter, "tok".into(), user(5)).unwrap();

        assert!(session.confirm_identity(&user(5)));
        assert!(session.current_user().is_some());

        assert!(!session.confirm_identity(&user(6)));
        assert!(!session.is_logged_in());
        assert!(session.current_user().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn auth_mismatch_tears_down() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = SessionContext::init(SessionStore::new(dir.path().join("s.json")));
        session.sign_in(Provider::Google, "tok".into(), user(5)).unwrap();

        let without_auth = User { auth: None, ..user(5) };
        assert!(session.confirm_identity(&without_auth));

        let rotated = User { auth: Some("someone-else".into()), ..user(5) };
        assert!(!session.confirm_identity(&rotated));
        assert!(!session.is_logged_in());
    }

    #[test]
    fn sign_in_needs_backend_auth() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = SessionContext::init(SessionStore::new(dir.path().join("s.json")));
        let no_auth = User { id: 1, ..Default::default() };
        assert!(session.sign_in(Provider::Facebook, "tok".into(), no_auth).is_err());
        assert!(!session.is_logged_in());
    }

    #[test]
    fn provider_parses_case_insensitively() {
        assert_eq!("Google".parse::<Provider>(), Ok(Provider::Google));
        assert!("myspace".parse::<Provider>().is_err());
    }
}
