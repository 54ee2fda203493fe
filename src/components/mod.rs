//! UI components.

pub mod topology_graph;
