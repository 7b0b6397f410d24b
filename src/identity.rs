//! Viewer identity
//!
//! The feed never looks up the session itself; whoever mounts it passes an
//! [`Identity`] that answers "who is looking, if anyone".

use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// The signed-in viewer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Viewer {
    pub id: String,
}

impl Viewer {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Source of the current viewer. `None` means anonymous.
pub trait Identity: Send + Sync {
    fn current_viewer(&self) -> Option<Viewer>;
}

/// Identity backed by a value that can be swapped at runtime (sign-in/sign-out).
#[derive(Debug, Default)]
pub struct SessionIdentity {
    viewer: RwLock<Option<Viewer>>,
}

impl SessionIdentity {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(viewer_id: impl Into<String>) -> Self {
        Self {
            viewer: RwLock::new(Some(Viewer::new(viewer_id))),
        }
    }

    /// Build from an optional configured id; an empty id is anonymous.
    pub fn from_config(viewer_id: Option<&str>) -> Self {
        match viewer_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => Self::signed_in(id),
            None => Self::anonymous(),
        }
    }

    pub fn sign_in(&self, viewer_id: impl Into<String>) {
        if let Ok(mut viewer) = self.viewer.write() {
            *viewer = Some(Viewer::new(viewer_id));
        }
    }

    pub fn sign_out(&self) {
        if let Ok(mut viewer) = self.viewer.write() {
            *viewer = None;
        }
    }
}

impl Identity for SessionIdentity {
    fn current_viewer(&self) -> Option<Viewer> {
        self.viewer.read().ok().and_then(|v| v.clone())
    }
}
