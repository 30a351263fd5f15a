//! Business logic services

pub mod column_mapper;
pub mod duplicates;
pub mod history;
pub mod ingestion;
pub mod job_number;
pub mod ledger;
pub mod mapping_client;
pub mod normalizer;
pub mod pricing;
pub mod resolver;
pub mod snapshot_store;
pub mod tabular_reader;

#[cfg(test)]
pub(crate) mod test_support;
