pub mod conversion;
pub mod definition;
pub mod ui_api;

pub use conversion::*;
pub use definition::*;
