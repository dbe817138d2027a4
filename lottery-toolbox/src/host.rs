use crate::storage::{Storage, StorageError, HOST_PIN_KEY, HOST_UNLOCKED_KEY};

pub const DEFAULT_HOST_PIN: &str = "pony2026";
pub const MIN_PIN_CHARS: usize = 4;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HostError {
    #[error("please enter the host PIN")]
    EmptyPin,

    #[error("the host PIN is not correct")]
    WrongPin,

    #[error("the new PIN must be at least {} characters long", MIN_PIN_CHARS)]
    PinTooShort,

    #[error("host mode is locked")]
    Locked,
}

/// PIN based access to the host-only operations (pool editing, records
/// management).
///
/// The PIN lives in persistent storage, the unlocked flag in session storage,
/// so a new session always starts locked.
#[derive(Debug, Clone)]
pub struct HostGate {
    pin: String,
    unlocked: bool,
}

impl HostGate {
    pub fn new<P: Into<String>>(pin: P, unlocked: bool) -> Self {
        Self {
            pin: pin.into(),
            unlocked,
        }
    }

    /// A stored PIN is used unless it is blank, in which case `default_pin`
    /// applies.
    pub fn load<S, T>(storage: &S, session: &T, default_pin: &str) -> Result<Self, StorageError>
    where
        S: Storage + ?Sized,
        T: Storage + ?Sized,
    {
        let pin = storage
            .get(HOST_PIN_KEY)?
            .filter(|pin| !pin.trim().is_empty())
            .unwrap_or_else(|| default_pin.to_string());
        let unlocked = session.get(HOST_UNLOCKED_KEY)?.as_deref() == Some("1");
        Ok(Self::new(pin, unlocked))
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn unlock(&mut self, input: &str) -> Result<(), HostError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(HostError::EmptyPin);
        }
        if input != self.pin {
            return Err(HostError::WrongPin);
        }
        self.unlocked = true;
        Ok(())
    }

    pub fn lock(&mut self) {
        self.unlocked = false;
    }

    pub fn ensure_unlocked(&self) -> Result<(), HostError> {
        if self.unlocked {
            Ok(())
        } else {
            Err(HostError::Locked)
        }
    }

    /// Replace the PIN, returning the value to persist.
    pub fn change_pin(&mut self, new_pin: &str) -> Result<&str, HostError> {
        self.ensure_unlocked()?;
        let new_pin = new_pin.trim();
        if new_pin.chars().count() < MIN_PIN_CHARS {
            return Err(HostError::PinTooShort);
        }
        self.pin = new_pin.to_string();
        Ok(self.pin.as_str())
    }

    /// Write the session flag matching the current lock state.
    pub fn save_session<T: Storage + ?Sized>(&self, session: &mut T) -> Result<(), StorageError> {
        if self.unlocked {
            session.set(HOST_UNLOCKED_KEY, "1")
        } else {
            session.remove(HOST_UNLOCKED_KEY)
        }
    }
}
