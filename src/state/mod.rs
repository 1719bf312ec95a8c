pub mod history;
pub mod node_state;
