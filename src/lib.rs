pub mod clash;
pub mod cli;
pub mod generator;
pub mod parser;
