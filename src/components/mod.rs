pub mod force_graph;
pub mod submission_panel;
