//! Simple to use cli for tracking daily work hours. Every day gets one record with the time you
//! punched in and out, months can be browsed, summed up, turned into a salary estimate and
//! exported as csv.
//!

pub mod cli;
pub mod report;
pub mod storage;
pub mod utils;
