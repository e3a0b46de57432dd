pub mod id;
pub mod keywords;
pub mod record;

pub use id::*;
pub use keywords::*;
pub use record::*;
