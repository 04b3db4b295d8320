pub mod error;
pub mod format;
pub mod html;
pub mod interactive;
pub mod output;
pub mod pagination;

pub use interactive::*;
pub use output::OutputStyle;
