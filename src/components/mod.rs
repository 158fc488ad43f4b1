pub mod force_graph;
pub mod users_form;
