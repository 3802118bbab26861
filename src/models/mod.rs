pub mod dashboard;
pub mod indicator;
pub mod quote;
pub mod response;

pub use dashboard::*;
pub use indicator::*;
pub use quote::*;
pub use response::*;
