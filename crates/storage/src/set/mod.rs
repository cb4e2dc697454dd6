pub mod member_key;
