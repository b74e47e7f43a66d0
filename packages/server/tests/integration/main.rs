mod comment;
mod common;
