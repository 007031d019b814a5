pub mod app;
pub mod cli;
pub mod config;
pub mod dom;
pub mod form;
pub mod output;
pub mod records;
pub mod runner;
pub mod utils;

#[cfg(test)]
mod tests;
