// pricecalc Infrastructure - File & Console Adapters
// Implements: PriceSource, PriceSink, JobFactory

pub mod console_source;
pub mod factory;
pub mod file_source;
pub mod json_sink;

pub use console_source::ConsolePriceSource;
pub use factory::{ConsoleJobFactory, ConsoleOutput, FileJobFactory, OutputLayout};
pub use file_source::FilePriceSource;
pub use json_sink::{encode_records, JsonFileSink, JsonWriterSink};
