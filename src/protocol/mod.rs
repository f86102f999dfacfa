mod binary;
pub mod primitive;
mod row;
mod text;

pub use binary::BinaryField;
pub use row::{BinaryRowPayload, Protocol, TextRowPayload, decode_binary_row, decode_text_row};
pub use text::TextField;
