//! Backend services

pub mod test_builder;
