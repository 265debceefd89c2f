pub mod entities;
pub mod transaction;
pub mod value_objects;
