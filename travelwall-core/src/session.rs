use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    pub signed_in: bool,
    pub user_name: Option<String>,
}

impl SessionState {
    pub fn signed_in(user_name: Option<String>) -> Self {
        SessionState {
            signed_in: true,
            user_name,
        }
    }
}

pub type SessionListener = Rc<dyn Fn(&SessionState)>;

/// Hosted identity service as seen by the page. Commands are fire-and-forget;
/// their outcome arrives through `subscribe`.
pub trait SessionProvider {
    fn current(&self) -> SessionState;
    fn subscribe(&self, listener: SessionListener);
    fn begin_sign_in(&self);
    fn sign_out(&self);
}

/// Latest session state plus subscribers.
#[derive(Default)]
pub struct SessionStore {
    state: SessionState,
    listeners: Vec<SessionListener>,
}

impl SessionStore {
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn subscribe(&mut self, listener: SessionListener) {
        self.listeners.push(listener);
    }

    /// Store `state`; returns whether it differs from the previous one.
    pub fn publish(&mut self, state: SessionState) -> bool {
        if self.state == state {
            return false;
        }
        self.state = state;
        true
    }

    /// Cloned so callers can notify after releasing any borrow on the store.
    pub fn listeners(&self) -> Vec<SessionListener> {
        self.listeners.clone()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionAction {
    SignIn,
    SignOut,
}

impl SessionAction {
    pub fn run(self, provider: &dyn SessionProvider) {
        match self {
            SessionAction::SignIn => provider.begin_sign_in(),
            SessionAction::SignOut => provider.sign_out(),
        }
    }
}

/// Header contents derived from the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderView {
    pub user_label: String,
    pub button_label: &'static str,
    pub action: SessionAction,
}

impl HeaderView {
    pub fn compose(state: &SessionState) -> Self {
        if state.signed_in {
            HeaderView {
                user_label: state.user_name.clone().unwrap_or_default(),
                button_label: "Sign out",
                action: SessionAction::SignOut,
            }
        } else {
            HeaderView {
                user_label: String::new(),
                button_label: "Sign in with Google",
                action: SessionAction::SignIn,
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct GetSessionResponse {
    session: Option<Value>,
    user: Option<SessionUser>,
}

#[derive(Debug, Deserialize)]
struct SessionUser {
    name: Option<String>,
}

/// Parse the body of `GET {auth}/get-session`; `null` means signed out.
pub fn parse_session(body: &str) -> Result<SessionState, serde_json::Error> {
    let parsed: Option<GetSessionResponse> = serde_json::from_str(body)?;
    Ok(match parsed {
        Some(GetSessionResponse {
            session: Some(_),
            user,
        }) => SessionState::signed_in(user.and_then(|u| u.name)),
        _ => SessionState::default(),
    })
}

#[derive(Debug, Serialize)]
pub struct SocialSignInRequest<'a> {
    pub provider: &'a str,
    #[serde(rename = "callbackURL")]
    pub callback_url: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct SocialSignInResponse {
    pub url: Option<String>,
}

/// Redirect target from the body of `POST {auth}/sign-in/social`.
pub fn parse_sign_in_redirect(body: &str) -> Result<Option<String>, serde_json::Error> {
    let resp: SocialSignInResponse = serde_json::from_str(body)?;
    Ok(resp.url.filter(|u| !u.is_empty()))
}
