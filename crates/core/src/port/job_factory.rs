// Job Factory Port
// Produces the source/sink pair a price job is bound to, one per tax rate

use crate::domain::TaxRate;
use crate::error::Result;
use crate::port::{PriceSink, PriceSource};

/// Source and sink bound to a single job
///
/// Both halves are owned exclusively by the job they are handed to.
pub struct JobBinding {
    pub source: Box<dyn PriceSource>,
    pub sink: Box<dyn PriceSink>,
    /// Description of the sink destination (e.g. output path)
    pub target: String,
}

impl JobBinding {
    pub fn new(source: Box<dyn PriceSource>, sink: Box<dyn PriceSink>) -> Self {
        let target = sink.describe();
        Self {
            source,
            sink,
            target,
        }
    }
}

/// Factory interface consulted by the job runner for every tax rate
///
/// Each call must return a fresh binding; the sink target is expected to
/// be distinct per rate.
pub trait JobFactory: Send + Sync {
    fn build(&self, tax_rate: &TaxRate) -> Result<JobBinding>;
}

impl<F> JobFactory for F
where
    F: Fn(&TaxRate) -> Result<JobBinding> + Send + Sync,
{
    fn build(&self, tax_rate: &TaxRate) -> Result<JobBinding> {
        self(tax_rate)
    }
}
