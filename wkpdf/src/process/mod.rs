//! The wkhtmltopdf subprocess boundary.
//!
//! - [`Executable`]: a verified path to the binary
//! - [`RenderPipeline`]: spawns the binary for a [`RenderRequest`](crate::command::RenderRequest)
//!   and collects its output
//! - [`RenderState`]: the phases a single invocation goes through

pub mod executable;
pub mod pipeline;
pub mod state;

pub use executable::{DEFAULT_PROGRAM, Executable};
pub use pipeline::{OutputLimits, RenderPipeline, RenderResult, StreamKind};
pub use state::RenderState;
