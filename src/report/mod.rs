pub mod assembler;
pub mod chart;
pub mod directive;
