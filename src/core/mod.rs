pub mod classify;
pub mod flagging;
pub mod graph;
pub mod mapping;
pub mod propagate;
pub mod relation;
pub mod repository;
pub mod resource;
pub mod stats;
pub mod symbols;
pub mod types;
