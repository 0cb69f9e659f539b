pub mod cards;
pub mod header;
