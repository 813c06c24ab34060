//! votcp: command-line front end for stop-tier preparation and AutoVOT.

pub mod batch;
pub mod cli;
pub mod config;
pub mod run;
