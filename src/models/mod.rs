mod skip;
mod transaction;

pub use skip::{classify_row, SkipReason, HEADER_TOKEN, MARKER_CELLS};
pub use transaction::{
    columns, compose_content, is_truthy_flag, parse_yen, Direction, TransactionRecord,
    CONTENT_MAX_CHARS, UNCATEGORIZED,
};
