pub mod analysis;
pub mod builder;
pub mod call_tree;
pub mod cycles;
pub mod dispatch;
pub mod error;
pub mod facts;
pub mod graph;
pub mod node;
pub mod ports;
pub mod resolver;
pub mod snapshot;
pub mod symbol_table;
pub mod type_registry;
