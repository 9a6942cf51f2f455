pub mod ai;
pub mod benchmark;
pub mod document;
pub mod factory;
