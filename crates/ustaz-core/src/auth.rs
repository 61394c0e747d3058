//! Sign-in and registration, with the offline demo fallback.
//!
//! The backend is hosted on a free tier and regularly unreachable, so by
//! default any sign-in failure flips the session into a local demo mode
//! instead of surfacing an error. The toggle lives in
//! [`UstazConfig::demo_fallback`].

use std::sync::Arc;

use tracing::warn;

use crate::api::{ApiClient, RegisterRequest};
use crate::config::UstazConfig;
use crate::error::{AuthError, AuthResult};
use crate::session::UserProfile;

/// Display name used when the sign-in email has no local part.
pub const OFFLINE_TEACHER_NAME: &str = "Мұғалім";

pub struct Auth {
    api: Arc<ApiClient>,
    demo_fallback: bool,
}

impl Auth {
    pub fn new(api: Arc<ApiClient>, config: &UstazConfig) -> Self {
        Self {
            api,
            demo_fallback: config.demo_fallback,
        }
    }

    /// Signs in against the backend. With the fallback on, any failure
    /// becomes a demo session carrying a profile derived from the email.
    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<UserProfile> {
        let mut profile = UserProfile::from_email(email);
        if profile.full_name.is_empty() {
            profile.full_name = OFFLINE_TEACHER_NAME.to_string();
        }
        match self.api.login(email, password).await {
            Ok(_tokens) => {
                self.api.session().save_profile(&profile)?;
                Ok(profile)
            }
            Err(err) => {
                if !self.demo_fallback {
                    return Err(AuthError::SignIn(err.to_string()));
                }
                warn!(
                    target: "ustaz::session",
                    "sign-in failed, switching to the demo session: {err}"
                );
                self.enter_demo(&profile)?;
                Ok(profile)
            }
        }
    }

    /// Registers a new account. The submitted form data becomes the local
    /// profile whether or not the backend accepted it.
    pub async fn register(&self, form: &RegisterRequest) -> AuthResult<UserProfile> {
        let profile = UserProfile {
            email: form.email.clone(),
            full_name: form.full_name.clone(),
            phone: form.phone.clone(),
            school_id: form.school_id.clone(),
            class_id: form.class_id.clone(),
            role: None,
        };
        match self.api.register(form).await {
            Ok(_tokens) => {
                self.api.session().save_profile(&profile)?;
                Ok(profile)
            }
            Err(err) => {
                if !self.demo_fallback {
                    return Err(AuthError::SignIn(err.to_string()));
                }
                warn!(
                    target: "ustaz::session",
                    "registration failed, switching to the demo session: {err}"
                );
                self.enter_demo(&profile)?;
                Ok(profile)
            }
        }
    }

    /// Server logout is best-effort; the local session is cleared always.
    pub async fn sign_out(&self) -> AuthResult<()> {
        if let Err(err) = self.api.logout().await {
            warn!(target: "ustaz::session", "logout failed: {err}");
        }
        self.api.session().clear()?;
        Ok(())
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.api.session().current_user()
    }

    pub fn is_demo(&self) -> bool {
        self.api.session().is_demo()
    }

    fn enter_demo(&self, profile: &UserProfile) -> AuthResult<()> {
        let session = self.api.session();
        session.save_profile(profile)?;
        session.start_demo()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Session, DEMO_TOKEN};
    use crate::store::MemoryStore;

    /// Client wired to a dead local endpoint: every call fails fast with a
    /// refused connection.
    fn unreachable_auth(demo_fallback: bool) -> Auth {
        let config = UstazConfig {
            api_base_url: "http://127.0.0.1:1/api/v1".to_string(),
            demo_fallback,
            request_timeout_secs: 2,
            ..UstazConfig::default()
        };
        let session = Session::new(Arc::new(MemoryStore::new()));
        let api = Arc::new(ApiClient::new(&config, session));
        Auth::new(api, &config)
    }

    #[tokio::test]
    async fn unreachable_backend_becomes_a_demo_session() {
        let auth = unreachable_auth(true);
        let profile = auth
            .sign_in("aigerim@mektep.kz", "secret")
            .await
            .expect("fallback must swallow the failure");

        assert_eq!(profile.full_name, "aigerim");
        assert!(auth.is_demo(), "session should carry the demo sentinel");
        assert_eq!(
            auth.api.session().access_token().as_deref(),
            Some(DEMO_TOKEN)
        );
        let user = auth.current_user().expect("profile stored");
        assert_eq!(user.email, "aigerim@mektep.kz");
    }

    #[tokio::test]
    async fn fallback_off_surfaces_the_failure() {
        let auth = unreachable_auth(false);
        let err = auth
            .sign_in("aigerim@mektep.kz", "secret")
            .await
            .expect_err("no fallback, the error must surface");
        assert!(matches!(err, AuthError::SignIn(_)));
        assert!(auth.current_user().is_none(), "no session on failure");
    }

    #[tokio::test]
    async fn failed_registration_keeps_the_submitted_profile() {
        let auth = unreachable_auth(true);
        let form = RegisterRequest {
            email: "bolat@mektep.kz".to_string(),
            password: "secret".to_string(),
            full_name: "Болат Н.".to_string(),
            phone: Some("+7 701 000 00 00".to_string()),
            school_id: Some("15".to_string()),
            class_id: None,
            role: None,
        };

        let profile = auth.register(&form).await.expect("fallback path");
        assert_eq!(profile.full_name, "Болат Н.");
        assert_eq!(profile.phone.as_deref(), Some("+7 701 000 00 00"));
        assert!(auth.is_demo());
    }

    #[tokio::test]
    async fn empty_local_part_gets_the_placeholder_name() {
        let auth = unreachable_auth(true);
        let profile = auth.sign_in("@mektep.kz", "secret").await.unwrap();
        assert_eq!(profile.full_name, OFFLINE_TEACHER_NAME);
    }

    #[tokio::test]
    async fn sign_out_clears_the_demo_session() {
        let auth = unreachable_auth(true);
        auth.sign_in("aigerim@mektep.kz", "secret").await.unwrap();
        assert!(auth.is_demo());

        auth.sign_out().await.expect("sign-out is local-first");
        assert!(auth.current_user().is_none());
        assert!(!auth.is_demo());
    }
}
