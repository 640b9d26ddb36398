pub mod degree;
pub mod filter;
pub mod forces;
pub mod graph;
pub mod interaction;
mod links;
mod normalize;
pub mod records;
pub mod search;
pub mod source;

pub use filter::{FilterSelection, GraphView};
pub use forces::ForceModel;
pub use graph::{
    AssemblyReport, CategoryKind, CitizenGraph, Node, NodeKind, RelationType,
    assemble_with_report,
};
pub use interaction::{InteractionEffect, InteractionMachine};
pub use search::{SearchHit, SearchIndex};
pub use source::{LoadMessage, LoadTracker, LoadedSources, spawn_source_loads};
