//! cURL import/export
//!
//! A command line goes through [`tokenizer`] (quoting and escaping) and then
//! [`interpreter`] (the option table) to become a `RequestRecord`.

pub mod export;
pub mod flags;
pub mod interpreter;
pub mod tokenizer;

pub use export::to_curl;
pub use flags::CurlFlag;
pub use interpreter::parse_curl;
pub use tokenizer::{tokenize, Token, Tokenized};
