//! Shared type definitions for the Lightclock simulation.
//!
//! Every crate in the workspace speaks in these types. They also flow to
//! `TypeScript` via `ts-rs` so the plotting front end can type the history
//! file it loads.
//!
//! # Modules
//!
//! - [`ids`] -- Named agent identifiers
//! - [`state`] -- Per-agent state and the merged [`Snapshot`]

pub mod ids;
pub mod state;

pub use ids::AgentId;
pub use state::{AgentState, Snapshot};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // Files are written to `bindings/` relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::AgentId::export_all();
        let _ = crate::state::AgentState::export_all();
    }
}
