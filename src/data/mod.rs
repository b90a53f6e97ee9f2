mod csv;
mod load;
mod records;

pub use load::{LoadOptions, load_dataset};
pub use records::{DataError, Dataset, EdgeRecord, EdgeSet, OrganizationBuckets, PersonRecord};

#[cfg(test)]
pub use load::build_dataset;
