pub mod descriptors;
pub mod optimize;
pub mod polarity;
