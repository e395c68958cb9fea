mod date_utils;
mod path_utils;

pub use date_utils::*;
pub use path_utils::*;
