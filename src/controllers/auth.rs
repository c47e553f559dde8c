use chrono::{DateTime, Utc};

use crate::api::{LoginRequest, SignupRequest};
use crate::error::ApiError;
use crate::session::AdminSession;
use crate::types::{Outcome, Request};

use super::{error_text, Outbox};

pub const PASSWORD_MISMATCH: &str = "Passwords do not match. Please try again.";
const LOGIN_FAILED: &str = "Login failed. Please try again.";
const SIGNUP_FAILED: &str = "Unable to create account. Please try again.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// What a finished auth request means for the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    SignedIn(AdminSession),
    /// Account created; show login with this email filled in.
    SignedUp { email: String },
}

#[derive(Debug, Default)]
pub struct AuthController {
    pub login: LoginForm,
    pub signup: SignupForm,
    pending: Option<u64>,
    error: Option<String>,
}

impl AuthController {
    pub fn is_submitting(&self) -> bool {
        self.pending.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn submit_login(&mut self, out: &mut Outbox) {
        if self.pending.is_some() {
            return;
        }
        self.error = None;
        let request = LoginRequest {
            email: self.login.email.trim().to_string(),
            password: self.login.password.clone(),
        };
        self.pending = Some(out.send(Request::Login(request)));
    }

    /// Mismatched passwords never reach the backend.
    pub fn submit_signup(&mut self, out: &mut Outbox) {
        if self.pending.is_some() {
            return;
        }
        self.error = None;
        if self.signup.password != self.signup.confirm_password {
            self.error = Some(PASSWORD_MISMATCH.to_string());
            return;
        }
        let request = SignupRequest {
            name: self.signup.name.trim().to_string(),
            email: self.signup.email.trim().to_string(),
            password: self.signup.password.clone(),
            confirm_password: self.signup.confirm_password.clone(),
        };
        self.pending = Some(out.send(Request::Signup(request)));
    }

    pub fn on_login_response(
        &mut self,
        seq: u64,
        result: Result<Outcome, ApiError>,
        now: DateTime<Utc>,
    ) -> Option<AuthOutcome> {
        if self.pending != Some(seq) {
            return None;
        }
        self.pending = None;
        let body = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                self.error = Some(error_text(&e, LOGIN_FAILED));
                return None;
            }
        };
        match AdminSession::from_login_response(body.json(), self.login.email.trim(), now) {
            Ok(session) => {
                self.login.password.clear();
                Some(AuthOutcome::SignedIn(session))
            }
            Err(message) => {
                self.error = Some(message);
                None
            }
        }
    }

    pub fn on_signup_response(&mut self, seq: u64, result: Result<Outcome, ApiError>) -> Option<AuthOutcome> {
        if self.pending != Some(seq) {
            return None;
        }
        self.pending = None;
        match result {
            Ok(_) => {
                let email = self.signup.email.trim().to_string();
                self.signup = SignupForm::default();
                self.login = LoginForm { email: email.clone(), password: String::new() };
                Some(AuthOutcome::SignedUp { email })
            }
            Err(e) => {
                self.error = Some(error_text(&e, SIGNUP_FAILED));
                None
            }
        }
    }
}
