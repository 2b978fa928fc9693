pub mod convert;
pub mod record;

pub use convert::*;
pub use record::*;
