use cfd_core::DashboardError;
use serde::Serialize;

/// Which half of a refresh produced a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RefreshTarget {
    Chart,
    Map,
}

/// A non-fatal failure shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub target: RefreshTarget,
    pub error: DashboardError,
}

impl Notification {
    pub fn new(target: RefreshTarget, error: DashboardError) -> Self {
        Self { target, error }
    }

    pub fn message(&self) -> String {
        match self.target {
            RefreshTarget::Chart => format!("Damage chart not updated: {}", self.error),
            RefreshTarget::Map => format!("Map overlay not updated: {}", self.error),
        }
    }
}
