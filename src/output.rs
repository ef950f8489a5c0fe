//! Dispatch summaries and diagnostics for humans and machines

pub mod human;
pub mod jsonl;

pub use human::HumanFormatter;
pub use jsonl::JsonlFormatter;
