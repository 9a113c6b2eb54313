//! Record loading, train/test splitting, and JSON reports for canopy.

mod domain;
mod error;
mod reader;
mod split;
mod writer;

pub use domain::ExperimentName;
pub use error::IoError;
pub use reader::RecordReader;
pub use split::split_train_test;
pub use writer::ReportWriter;
