pub mod batch;

pub use batch::{
    BatchFormat,
    SpectrumBatch,
    SpectrumEntry,
    read_database_file,
};
