// Runner constants (no magic values)

/// Tax rates used when nothing is configured (0%, 7%, 10%, 15%)
pub const DEFAULT_TAX_RATES: [f64; 4] = [0.0, 0.07, 0.1, 0.15];

/// Default source file
pub const DEFAULT_INPUT_PATH: &str = "prices.txt";

/// Default output file prefix (`result_<percent>.json`)
pub const DEFAULT_OUTPUT_PREFIX: &str = "result";

/// Default source field delimiter
pub const DEFAULT_DELIMITER: char = ',';

/// Jobs run one at a time unless configured otherwise
pub const DEFAULT_MAX_WORKERS: usize = 1;
