//! The external virtual-gamepad collaborator (ViGEmBus on the original
//! Windows host). [`GamepadInjector`] is the seam: production code talks to
//! the real driver through some platform-specific implementation, tests use
//! [`RecordingInjector`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InjectorError {
    /// The underlying driver isn't installed or couldn't be reached.
    /// Per spec.md §7 this is logged once and never treated as fatal —
    /// the session continues with controller input silently dropped.
    #[error("gamepad driver unavailable: {0}")]
    Unavailable(String),

    #[error("slot {0} is out of range (must be 0-3)")]
    SlotOutOfRange(u8),
}

/// One gamepad report, mirroring [`rdesk_core::controller::ControllerState`]
/// minus the wire-only `slot`/`seq` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GamepadReport {
    pub buttons: u16,
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub left_thumb_x: i16,
    pub left_thumb_y: i16,
    pub right_thumb_x: i16,
    pub right_thumb_y: i16,
}

impl From<rdesk_core::controller::ControllerState> for GamepadReport {
    fn from(state: rdesk_core::controller::ControllerState) -> Self {
        Self {
            buttons: state.buttons,
            left_trigger: state.left_trigger,
            right_trigger: state.right_trigger,
            left_thumb_x: state.left_thumb_x,
            left_thumb_y: state.left_thumb_y,
            right_thumb_x: state.right_thumb_x,
            right_thumb_y: state.right_thumb_y,
        }
    }
}

/// A virtual-gamepad backend. Slots are numbered 0-3, created lazily on
/// first use.
pub trait GamepadInjector: Send {
    /// Connect to the driver. Called once before any slot is used.
    fn initialize(&mut self) -> Result<(), InjectorError>;

    /// Create the virtual controller for `slot` if it doesn't exist yet.
    /// Idempotent: calling this again for an already-created slot is a
    /// no-op success.
    fn create_target(&mut self, slot: u8) -> Result<(), InjectorError>;

    /// Push one report to the named slot's virtual controller.
    fn update(&mut self, slot: u8, report: GamepadReport) -> Result<(), InjectorError>;

    /// Tear down every created target and disconnect from the driver.
    fn release(&mut self);
}

/// A no-op injector for platforms or test environments without a real
/// gamepad driver. Every call reports the driver as unavailable, matching
/// the original's behavior when ViGEmBus isn't installed.
#[derive(Debug, Default)]
pub struct NullInjector;

impl GamepadInjector for NullInjector {
    fn initialize(&mut self) -> Result<(), InjectorError> {
        Err(InjectorError::Unavailable("no gamepad backend configured".into()))
    }

    fn create_target(&mut self, _slot: u8) -> Result<(), InjectorError> {
        Err(InjectorError::Unavailable("no gamepad backend configured".into()))
    }

    fn update(&mut self, _slot: u8, _report: GamepadReport) -> Result<(), InjectorError> {
        Err(InjectorError::Unavailable("no gamepad backend configured".into()))
    }

    fn release(&mut self) {}
}

/// A test double that records every call instead of touching a real
/// driver.
#[derive(Debug, Default)]
pub struct RecordingInjector {
    pub initialized: bool,
    pub created_slots: Vec<u8>,
    pub updates: Vec<(u8, GamepadReport)>,
    pub released: bool,
}

impl GamepadInjector for RecordingInjector {
    fn initialize(&mut self) -> Result<(), InjectorError> {
        self.initialized = true;
        Ok(())
    }

    fn create_target(&mut self, slot: u8) -> Result<(), InjectorError> {
        if slot > rdesk_core::controller::MAX_SLOT {
            return Err(InjectorError::SlotOutOfRange(slot));
        }
        if !self.created_slots.contains(&slot) {
            self.created_slots.push(slot);
        }
        Ok(())
    }

    fn update(&mut self, slot: u8, report: GamepadReport) -> Result<(), InjectorError> {
        if slot > rdesk_core::controller::MAX_SLOT {
            return Err(InjectorError::SlotOutOfRange(slot));
        }
        self.updates.push((slot, report));
        Ok(())
    }

    fn release(&mut self) {
        self.released = true;
        self.created_slots.clear();
    }
}
