use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

use serde::{Deserialize, Serialize};

use crate::{EvaluationService, Error, Result};

pub(crate) const UNKNOWN_ERROR: &str = "unknown error";

/// Readiness of a [`FliptProvider`](crate::FliptProvider).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderState {
    /// Not initialized yet, or shut down.
    NotReady,
    /// Ready to evaluate flags.
    Ready,
    /// An error was signaled. Evaluations fail until the provider is ready again.
    Error,
    /// Initialization failed.
    Fatal,
}

pub(crate) type SharedService = Arc<dyn EvaluationService + Send + Sync>;

struct Slot {
    state: ProviderState,
    service: Option<SharedService>,
    fatal_reason: Option<String>,
}

/// Readiness state and the service handle, updated together so evaluations always observe a
/// consistent pair.
pub(crate) struct Lifecycle {
    /// Set by the first `initialize()` call and never cleared.
    initialized: AtomicBool,
    slot: RwLock<Slot>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Lifecycle {
            initialized: AtomicBool::new(false),
            slot: RwLock::new(Slot {
                state: ProviderState::NotReady,
                service: None,
                fatal_reason: None,
            }),
        }
    }

    /// Claim the single initialization attempt.
    pub fn begin_initialization(&self) -> Result<()> {
        if self.initialized.swap(true, Ordering::AcqRel) {
            return Err(Error::DoubleInitialization);
        }
        Ok(())
    }

    pub fn install(&self, service: SharedService) {
        let mut slot = self.write();
        slot.service = Some(service);
        slot.fatal_reason = None;
        slot.state = ProviderState::Ready;
    }

    pub fn fail(&self, reason: String) {
        let mut slot = self.write();
        slot.service = None;
        slot.fatal_reason = Some(reason);
        slot.state = ProviderState::Fatal;
    }

    pub fn set_state(&self, state: ProviderState) {
        self.write().state = state;
    }

    /// Drop the service handle and go back to `NotReady`.
    pub fn release(&self) {
        let mut slot = self.write();
        slot.service = None;
        slot.state = ProviderState::NotReady;
    }

    pub fn state(&self) -> ProviderState {
        self.read().state
    }

    /// The service handle, if the provider may evaluate flags right now.
    pub fn ready_service(&self) -> Result<SharedService> {
        let slot = self.read();
        match slot.state {
            // A ready signal may arrive before initialization built the service.
            ProviderState::Ready => slot.service.clone().ok_or(Error::ProviderNotReady),
            ProviderState::NotReady => Err(Error::ProviderNotReady),
            ProviderState::Error => Err(Error::General(UNKNOWN_ERROR.to_owned())),
            ProviderState::Fatal => Err(Error::ProviderFatal(
                slot.fatal_reason
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_ERROR.to_owned()),
            )),
        }
    }

    // Slot holds plain data that is always left consistent, so a poisoned lock is still usable.
    fn read(&self) -> RwLockReadGuard<'_, Slot> {
        self.slot.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Slot> {
        self.slot.write().unwrap_or_else(PoisonError::into_inner)
    }
}
