pub mod agent;
pub mod block;
pub mod stage;
