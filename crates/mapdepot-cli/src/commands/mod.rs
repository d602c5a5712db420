pub mod rebuild;
pub mod update;
pub mod validate;
