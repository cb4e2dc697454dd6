pub mod element_key;
