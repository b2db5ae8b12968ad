pub mod extract;
pub mod select;
