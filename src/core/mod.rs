pub mod converter;
pub mod fetch;
pub mod pretty;
pub mod toolbox;

pub use crate::domain::model::{Document, Record, Task};
pub use crate::domain::ports::Storage;
pub use crate::utils::error::Result;
