pub mod astrokit_errors;
pub mod binary_table;
pub mod catalog;
pub mod constants;
pub mod data_paths;
pub mod grid;
pub mod xref;

#[cfg(test)]
#[path = "../tests/common/bintable.rs"]
pub(crate) mod unit_test_global;
