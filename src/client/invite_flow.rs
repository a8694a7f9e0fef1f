use uuid::Uuid;

use crate::client::redirect::landing_route;
use crate::database::models::{AcceptOutcome, ChurchRole};

/// Where the acceptance flow currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptanceState {
    /// The landing token failed the UUID gate; terminal.
    InvalidToken,
    /// Waiting for the user to sign in; the token is parked in the store.
    AwaitingAuth,
    /// Signed in and ready to submit.
    Ready,
    /// Acceptance request in flight.
    Processing,
    /// Terminal success, with the dashboard the new roles land on.
    Accepted {
        roles: Vec<ChurchRole>,
        redirect: &'static str,
    },
    /// Refused or errored; the user can try again or switch accounts.
    Failed { message: String },
}

/// What the caller must do next after a gate transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDirective {
    /// Nothing beyond rendering the current state.
    None,
    /// Authenticate, then come back through `on_session(true)`.
    RedirectToLogin { return_to: String },
    /// Sign the current account out, then authenticate again.
    SignOut { return_to: String },
}

/// Parking space for a token that has to survive a login round-trip.
pub trait PendingInviteStore {
    fn save(&mut self, token: &str);
    fn take(&mut self) -> Option<String>;
    fn clear(&mut self);
}

/// In-memory store, also the stand-in used by tests.
#[derive(Debug, Default)]
pub struct MemoryInviteStore {
    pending: Option<String>,
}

impl MemoryInviteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PendingInviteStore for MemoryInviteStore {
    fn save(&mut self, token: &str) {
        self.pending = Some(token.to_string());
    }

    fn take(&mut self) -> Option<String> {
        self.pending.take()
    }

    fn clear(&mut self) {
        self.pending = None;
    }
}

// Lets a gate borrow a store the caller keeps, e.g. one backing a whole tab.
impl<T: PendingInviteStore + ?Sized> PendingInviteStore for &mut T {
    fn save(&mut self, token: &str) {
        (**self).save(token);
    }

    fn take(&mut self) -> Option<String> {
        (**self).take()
    }

    fn clear(&mut self) {
        (**self).clear();
    }
}

/// Client-side acceptance flow: UUID gate, login round-trip with the token
/// parked, one in-flight attempt at a time, and a role-based landing route
/// on success. The caller drives the actual HTTP call between
/// `begin_accept` and `resolve`.
pub struct InviteGate<S> {
    token: Option<String>,
    store: S,
    state: AcceptanceState,
}

impl<S: PendingInviteStore> InviteGate<S> {
    /// Build from the token in the landing URL. Anything that is not a UUID
    /// is rejected before any lookup happens.
    pub fn new(token: Option<&str>, store: S) -> Self {
        match token {
            Some(raw) if Uuid::parse_str(raw).is_ok() => InviteGate {
                token: Some(raw.to_string()),
                store,
                state: AcceptanceState::AwaitingAuth,
            },
            _ => InviteGate {
                token: None,
                store,
                state: AcceptanceState::InvalidToken,
            },
        }
    }

    /// Rebuild the gate after the login round-trip, from the parked token.
    pub fn from_store(mut store: S) -> Self {
        let token = store.take();
        Self::new(token.as_deref(), store)
    }

    pub fn state(&self) -> &AcceptanceState {
        &self.state
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Tell the gate whether a session exists. Unauthenticated visitors get
    /// the token parked and are sent to login with a way back here.
    pub fn on_session(&mut self, authenticated: bool) -> GateDirective {
        let token = match &self.token {
            Some(token) => token.clone(),
            None => return GateDirective::None,
        };

        match self.state {
            AcceptanceState::AwaitingAuth | AcceptanceState::Ready => {
                if authenticated {
                    self.state = AcceptanceState::Ready;
                    GateDirective::None
                } else {
                    self.store.save(&token);
                    self.state = AcceptanceState::AwaitingAuth;
                    GateDirective::RedirectToLogin {
                        return_to: return_path(&token),
                    }
                }
            }
            _ => GateDirective::None,
        }
    }

    /// Arm one acceptance attempt and yield the token to submit. Returns
    /// None while an attempt is in flight, before login, or after a
    /// terminal state; a failed attempt can be re-armed.
    pub fn begin_accept(&mut self) -> Option<String> {
        match self.state {
            AcceptanceState::Ready | AcceptanceState::Failed { .. } => {
                self.state = AcceptanceState::Processing;
                self.token.clone()
            }
            _ => None,
        }
    }

    /// Feed the server's outcome back in.
    pub fn resolve(&mut self, outcome: &AcceptOutcome) {
        if self.state != AcceptanceState::Processing {
            return;
        }

        if outcome.success {
            self.store.clear();
            self.state = AcceptanceState::Accepted {
                redirect: landing_route(&outcome.roles),
                roles: outcome.roles.clone(),
            };
        } else {
            let code = outcome.error.as_deref().unwrap_or("unknown");
            self.state = AcceptanceState::Failed {
                message: describe_failure(code).to_string(),
            };
        }
    }

    /// A transport or server failure outside the outcome contract.
    pub fn resolve_error(&mut self, message: &str) {
        if self.state == AcceptanceState::Processing {
            self.state = AcceptanceState::Failed {
                message: message.to_string(),
            };
        }
    }

    /// Park the token again and sign out, so another account can accept the
    /// same invitation.
    pub fn switch_account(&mut self) -> GateDirective {
        let token = match &self.token {
            Some(token) => token.clone(),
            None => return GateDirective::None,
        };

        match self.state {
            AcceptanceState::Ready | AcceptanceState::Failed { .. } => {
                self.store.save(&token);
                self.state = AcceptanceState::AwaitingAuth;
                GateDirective::SignOut {
                    return_to: return_path(&token),
                }
            }
            _ => GateDirective::None,
        }
    }
}

fn return_path(token: &str) -> String {
    format!("/accept-invite?token={}", token)
}

fn describe_failure(code: &str) -> &'static str {
    match code {
        "not_found" => "Invitation not found or expired",
        "expired" => "This invitation has expired",
        "already_used" => "This invitation was already used",
        "email_mismatch" => "This invitation was issued for a different email address",
        _ => "Could not accept the invitation",
    }
}
