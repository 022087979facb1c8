mod locator;
mod parser;
mod reader;

pub use locator::{LogFileRef, LogLocator};
pub use parser::{LineParseError, LineParser, ParsedRecord};
pub use reader::{LogLines, LogReader};
