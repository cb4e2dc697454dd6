pub mod field_key;
