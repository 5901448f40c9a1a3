// Library surface for headless/integration tests and reuse.
// The binary only adds terminal setup and the CLI on top of this.
pub mod app;
pub mod config;
pub mod corpus;
pub mod error;
pub mod history;
pub mod keys;
pub mod paragraph;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod ui;

pub use paragraph::Paragraph;
pub use session::{RoundState, TypingSession};
