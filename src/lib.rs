pub mod fields;
pub mod form;
pub mod posts;
pub mod table;

pub use fields::FieldMap;
