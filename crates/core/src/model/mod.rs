#![forbid(unsafe_code)]

mod fields;
mod status;
mod values;

pub use fields::*;
pub use status::*;
pub use values::*;
