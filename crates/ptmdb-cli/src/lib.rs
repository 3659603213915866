pub mod input;
pub mod output;
pub mod runner;
pub mod storage;
pub mod table;
