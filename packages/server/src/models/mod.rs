pub mod comment;
pub mod product;
pub mod shared;
