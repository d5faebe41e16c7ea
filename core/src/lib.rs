pub mod error;

pub use error::{MiniVsfsError, Result};
