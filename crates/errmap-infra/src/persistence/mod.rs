//! Persistence implementations
//!
//! File-based implementations of the domain repository traits.

mod text_ledger;

pub use text_ledger::{
    format_header, format_record, parse_ledger, parse_record_line, read_ledger, TextLedger,
    LEDGER_SEPARATOR,
};
