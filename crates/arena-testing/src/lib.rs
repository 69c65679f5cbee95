//! Testing infrastructure for prompt-arena integration tests.
//!
//! - `TestWorld`: fluent interface for declarative end-to-end test setup
//! - `assertions`: custom assertions for RunResult/Summary validation
//! - `fixtures`: sample scenario and mock-config generation

pub mod assertions;
pub mod fixtures;
pub mod world;

pub use world::TestWorld;
