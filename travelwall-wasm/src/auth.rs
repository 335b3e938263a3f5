use std::cell::RefCell;
use std::rc::Rc;

use travelwall_core::session::{
    SessionListener, SocialSignInRequest, parse_session, parse_sign_in_redirect,
};
use travelwall_core::{AppConfig, SessionProvider, SessionState, SessionStore};
use wasm_bindgen::prelude::*;
use web_sys::Window;

use crate::utils::send_text;

/// Session client for the hosted better-auth service.
#[derive(Clone)]
pub struct AuthClient {
    window: Window,
    config: AppConfig,
    store: Rc<RefCell<SessionStore>>,
}

impl AuthClient {
    pub fn new(window: Window, config: AppConfig) -> Self {
        AuthClient {
            window,
            config,
            store: Rc::new(RefCell::new(SessionStore::default())),
        }
    }

    /// Fetch the current session and publish it.
    pub fn refresh(&self) {
        let this = self.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let url = this.config.auth_url("get-session");
            let state = match send_text(&this.window, "GET", &url, None).await {
                Ok(body) => parse_session(&body).unwrap_or_else(|e| {
                    log::warn!("unreadable session response: {e}");
                    SessionState::default()
                }),
                Err(e) => {
                    log::warn!("session lookup failed: {:?}", e);
                    SessionState::default()
                }
            };
            this.publish(state);
        });
    }

    fn publish(&self, state: SessionState) {
        if !self.store.borrow_mut().publish(state.clone()) {
            return;
        }
        log::debug!("session changed: signed_in={}", state.signed_in);
        let listeners = self.store.borrow().listeners();
        for listener in listeners {
            listener(&state);
        }
    }

    async fn start_social_sign_in(&self) -> Result<(), JsValue> {
        let href = self.window.location().href()?;
        let body = serde_json::to_string(&SocialSignInRequest {
            provider: &self.config.provider,
            callback_url: &href,
        })
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let url = self.config.auth_url("sign-in/social");
        let resp = send_text(&self.window, "POST", &url, Some(&body)).await?;
        let target = parse_sign_in_redirect(&resp).map_err(|e| JsValue::from_str(&e.to_string()))?;
        match target {
            Some(target) => self.window.location().set_href(&target),
            None => Err(JsValue::from_str("sign-in response carried no redirect")),
        }
    }
}

impl SessionProvider for AuthClient {
    fn current(&self) -> SessionState {
        self.store.borrow().state().clone()
    }

    fn subscribe(&self, listener: SessionListener) {
        self.store.borrow_mut().subscribe(listener);
    }

    fn begin_sign_in(&self) {
        let this = self.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = this.start_social_sign_in().await {
                log::warn!("sign-in failed: {:?}", e);
            }
        });
    }

    fn sign_out(&self) {
        let this = self.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let url = this.config.auth_url("sign-out");
            match send_text(&this.window, "POST", &url, Some("{}")).await {
                Ok(_) => this.publish(SessionState::default()),
                Err(e) => log::warn!("sign-out failed: {:?}", e),
            }
        });
    }
}
