//! Markup parsing and output.

mod parser;
mod printer;

pub use parser::{parse_file, parse_markup, parse_str, MarkupParser};
pub use printer::{
    print_to_string, print_to_string_pretty, print_with, to_entities, XmlPrinter,
    XmlPrinterOptions,
};
