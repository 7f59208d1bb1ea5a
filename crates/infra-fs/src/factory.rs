// Job factories wiring file/console sources to JSON sinks
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{BufReader, Stdin};
use tokio::sync::Mutex;

use pricecalc_core::application::runner::constants::DEFAULT_OUTPUT_PREFIX;
use pricecalc_core::domain::TaxRate;
use pricecalc_core::error::Result;
use pricecalc_core::port::{JobBinding, JobFactory};

use crate::console_source::ConsolePriceSource;
use crate::file_source::FilePriceSource;
use crate::json_sink::{JsonFileSink, JsonWriterSink};

/// Output naming: `<dir>/<prefix>_<percent>.json`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub dir: PathBuf,
    pub prefix: String,
}

impl OutputLayout {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    /// Artifact path for a rate (`result_7.json` for 0.07)
    pub fn path_for(&self, tax_rate: &TaxRate) -> PathBuf {
        self.dir
            .join(format!("{}_{}.json", self.prefix, tax_rate.percent_label()))
    }
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self::new(".", DEFAULT_OUTPUT_PREFIX)
    }
}

/// Every rate reads the same price file and writes its own JSON artifact
pub struct FileJobFactory {
    input_path: PathBuf,
    delimiter: u8,
    layout: OutputLayout,
}

impl FileJobFactory {
    pub fn new(input_path: impl Into<PathBuf>, delimiter: u8, layout: OutputLayout) -> Self {
        Self {
            input_path: input_path.into(),
            delimiter,
            layout,
        }
    }
}

impl JobFactory for FileJobFactory {
    fn build(&self, tax_rate: &TaxRate) -> Result<JobBinding> {
        let source = FilePriceSource::new(&self.input_path).with_delimiter(self.delimiter);
        let sink = JsonFileSink::new(self.layout.path_for(tax_rate));
        Ok(JobBinding::new(Box::new(source), Box::new(sink)))
    }
}

/// Destination for interactively entered prices
#[derive(Debug, Clone)]
pub enum ConsoleOutput {
    Stdout,
    Files(OutputLayout),
}

/// Every rate prompts for its items on stdin again
pub struct ConsoleJobFactory {
    stdin: Arc<Mutex<BufReader<Stdin>>>,
    output: ConsoleOutput,
}

impl ConsoleJobFactory {
    pub fn new(output: ConsoleOutput) -> Self {
        Self {
            stdin: Arc::new(Mutex::new(BufReader::new(tokio::io::stdin()))),
            output,
        }
    }
}

impl JobFactory for ConsoleJobFactory {
    fn build(&self, tax_rate: &TaxRate) -> Result<JobBinding> {
        let source = Box::new(ConsolePriceSource::stdio(Arc::clone(&self.stdin)));
        let binding = match &self.output {
            ConsoleOutput::Stdout => JobBinding::new(source, Box::new(JsonWriterSink::stdout())),
            ConsoleOutput::Files(layout) => {
                JobBinding::new(source, Box::new(JsonFileSink::new(layout.path_for(tax_rate))))
            }
        };
        Ok(binding)
    }
}
