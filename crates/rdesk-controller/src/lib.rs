//! Controller ingest (C5): decodes controller datagrams into gamepad
//! updates, rejecting out-of-order input and forwarding to a pluggable
//! virtual-gamepad backend.

pub mod ingest;
pub mod injector;

pub use ingest::ControllerIngest;
pub use injector::{GamepadInjector, GamepadReport, InjectorError, NullInjector, RecordingInjector};
