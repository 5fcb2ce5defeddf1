pub mod complete_linking;
pub mod emit_bundle;
pub mod scan_entry;
pub mod traverse_modules;
pub mod utils;

/// Represents a phase in the linking process.
pub trait LinkingPhase: Sized {}

pub use {
    complete_linking::CompleteLinking,
    emit_bundle::EmitBundle,
    scan_entry::ScanEntry,
    traverse_modules::TraverseModules,
};
