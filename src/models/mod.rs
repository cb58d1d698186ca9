pub mod mention;
pub mod price;
pub mod report;

pub use mention::*;
pub use price::*;
pub use report::*;
