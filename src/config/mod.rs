//! Configuration module

mod convert;

pub use convert::ConvertConfig;
pub use convert::FrontMatterFormat;
pub use convert::CONFIG_FILE;
