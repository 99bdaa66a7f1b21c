//! Bridge between the egui thread and the tokio worker that owns the console binding.

pub mod commands;
pub mod runtime;
