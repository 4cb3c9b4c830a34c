pub mod error;

pub use error::{DocumateError, Result, ResultExt};
