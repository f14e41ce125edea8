//! Transport-facing adapters.

pub mod jsonl;
