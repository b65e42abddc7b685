pub mod bpk1;
pub mod compression;
