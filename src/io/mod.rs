pub mod tabular;

pub use tabular::read_dataset;
