//! Port traits for the external collaborators.
//!
//! The supervisor core owns no capture, generation, or keystroke mechanics;
//! it only talks to these boundaries. Implementations live in
//! `infrastructure::collaborators`.

pub mod action_executor;
pub mod instruction_generator;
pub mod screen_source;

pub use action_executor::{ActionExecutor, DispatchError};
pub use instruction_generator::{GenerateError, InstructionGenerator};
pub use screen_source::{CaptureError, ScreenSource};
