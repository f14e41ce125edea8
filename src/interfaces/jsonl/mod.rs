pub mod notifier;
pub mod update_reader;
