pub mod lex_bound;
pub mod member_key;
pub mod score_key;
