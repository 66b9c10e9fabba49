pub mod bits;
pub mod interface;
