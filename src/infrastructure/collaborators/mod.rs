//! Collaborator adapters behind the domain ports.
//!
//! The supervisor core never touches capture, generation, or keystroke
//! mechanics directly; these adapters are the reference implementations of
//! the three ports, plus mocks for tests.

pub mod api_generator;
pub mod capture_command;
pub mod command_executor;
pub mod mock;

pub use api_generator::ApiInstructionGenerator;
pub use capture_command::CommandScreenSource;
pub use command_executor::CommandActionExecutor;
pub use mock::{MockExecutor, MockGenerator, ScriptedScreenSource};
