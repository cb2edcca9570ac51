pub mod evaluation;
pub mod result;
pub mod submission;

pub use evaluation::*;
pub use result::*;
pub use submission::*;
