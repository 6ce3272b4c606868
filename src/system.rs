pub mod paste;
pub mod selection;
pub mod window;
