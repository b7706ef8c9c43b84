//! Application state shared by every command: the analysis session, the
//! signed-in user, backend reachability and the current toast.
//!
//! State changes go through [`Action`]s applied by [`reduce`]; observers
//! subscribe to a `watch` channel instead of reading shared globals. The
//! `watch` channel only keeps the latest state, so every toast is also sent
//! on a `broadcast` channel for observers that must see each one.

use crate::error::ClientError;
use crate::model::User;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Online,
    #[default]
    Offline,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Online => f.write_str("online"),
            ConnectionStatus::Offline => f.write_str("offline"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub kind: ToastKind,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub session_id: Option<String>,
    pub user: Option<User>,
    pub connection: ConnectionStatus,
    /// Only the latest toast is shown; a new one replaces it
    pub toast: Option<Toast>,
    next_toast_id: u64,
}

impl AppState {
    pub fn is_online(&self) -> bool {
        self.connection == ConnectionStatus::Online
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetConnection(ConnectionStatus),
    SetSession(String),
    SignIn(User),
    /// Replace the signed-in user's record after a profile update
    UpdateUser(User),
    SignOut,
    ShowToast { message: String, kind: ToastKind },
    DismissToast(u64),
}

/// Apply `action` to `state`
pub fn reduce(state: &mut AppState, action: Action) {
    match action {
        Action::SetConnection(status) => state.connection = status,
        Action::SetSession(id) => state.session_id = Some(id),
        Action::SignIn(user) | Action::UpdateUser(user) => state.user = Some(user),
        Action::SignOut => {
            state.user = None;
            state.session_id = None;
        }
        Action::ShowToast { message, kind } => {
            state.next_toast_id += 1;
            state.toast = Some(Toast {
                id: state.next_toast_id,
                message,
                kind,
            });
        }
        Action::DismissToast(id) => {
            if state.toast.as_ref().map_or(false, |t| t.id == id) {
                state.toast = None;
            }
        }
    }
}

/// The two keys that survive between runs
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(rename = "sessionId", default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// JSON file holding [`StoredSession`]
#[derive(Debug, Clone)]
pub struct SessionStorage {
    path: PathBuf,
}

impl SessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty session
    pub fn load(&self) -> Result<StoredSession, ClientError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoredSession::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, session: &StoredSession) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(session)?)?;
        Ok(())
    }

    pub fn update(&self, f: impl FnOnce(&mut StoredSession)) -> Result<(), ClientError> {
        let mut session = self.load().unwrap_or_default();
        f(&mut session);
        self.save(&session)
    }
}

/// Shared handle to the application state
#[derive(Debug, Clone)]
pub struct AppStore {
    state: Arc<watch::Sender<AppState>>,
    toasts: broadcast::Sender<Toast>,
    storage: Option<SessionStorage>,
}

const TOAST_BUFFER: usize = 64;

impl Default for AppStore {
    fn default() -> Self {
        Self::new(None)
    }
}

impl AppStore {
    pub fn new(storage: Option<SessionStorage>) -> Self {
        let (sender, _) = watch::channel(AppState::default());
        let (toasts, _) = broadcast::channel(TOAST_BUFFER);
        Self {
            state: Arc::new(sender),
            toasts,
            storage,
        }
    }

    pub fn storage(&self) -> Option<&SessionStorage> {
        self.storage.as_ref()
    }

    /// Apply an action and persist the session keys it touches
    pub fn dispatch(&self, action: Action) {
        debug!("Dispatching {:?}", action);
        self.persist(&action);
        let shows_toast = matches!(action, Action::ShowToast { .. });
        self.state.send_modify(|state| reduce(state, action));

        if shows_toast {
            if let Some(toast) = self.state.borrow().toast.clone() {
                // No receivers is fine
                let _ = self.toasts.send(toast);
            }
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    /// Every toast shown after this call, in order
    pub fn toasts(&self) -> broadcast::Receiver<Toast> {
        self.toasts.subscribe()
    }

    pub fn snapshot(&self) -> AppState {
        self.state.borrow().clone()
    }

    pub fn is_online(&self) -> bool {
        self.state.borrow().is_online()
    }

    pub fn session_id(&self) -> Option<String> {
        self.state.borrow().session_id.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn notify(&self, message: impl Into<String>, kind: ToastKind) {
        self.dispatch(Action::ShowToast {
            message: message.into(),
            kind,
        });
    }

    fn persist(&self, action: &Action) {
        let Some(storage) = &self.storage else {
            return;
        };
        let result = match action {
            Action::SetSession(id) => storage.update(|s| s.session_id = Some(id.clone())),
            Action::SignIn(user) => storage.update(|s| s.user_id = Some(user.id.clone())),
            Action::SignOut => storage.update(|s| {
                s.session_id = None;
                s.user_id = None;
            }),
            _ => Ok(()),
        };
        if let Err(e) = result {
            warn!("Could not persist session to {}: {}", storage.path().display(), e);
        }
    }
}
