//! Input formats the command-line front end reads.

pub mod csv;
