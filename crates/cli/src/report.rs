// Run summary rendering
use colored::Colorize;
use tabled::{Table, Tabled};

use pricecalc_core::application::RunSummary;
use pricecalc_core::domain::JobRun;

#[derive(Tabled)]
struct JobRow {
    #[tabled(rename = "Tax rate")]
    rate: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Records")]
    records: usize,
    #[tabled(rename = "Duration")]
    duration: String,
    #[tabled(rename = "Error")]
    error: String,
}

impl From<&JobRun> for JobRow {
    fn from(job: &JobRun) -> Self {
        Self {
            rate: format!("{}%", job.tax_rate.percent()),
            target: job.target.clone().unwrap_or_else(|| "-".to_string()),
            status: job.state.to_string(),
            records: job.records_written,
            duration: job
                .duration_ms()
                .map(|ms| format!("{}ms", ms))
                .unwrap_or_else(|| "-".to_string()),
            error: job.error.clone().unwrap_or_default(),
        }
    }
}

/// Plain table, one row per job in rate order
pub fn render_table(summary: &RunSummary) -> String {
    let rows: Vec<JobRow> = summary.jobs.iter().map(JobRow::from).collect();
    Table::new(rows).to_string()
}

/// Colored one-line verdict
pub fn render_headline(summary: &RunSummary) -> String {
    if summary.is_success() {
        format!("✓ {} job(s) succeeded", summary.len())
            .green()
            .bold()
            .to_string()
    } else {
        format!("✗ {} of {} job(s) failed", summary.failure_count(), summary.len())
            .red()
            .bold()
            .to_string()
    }
}

/// Print the summary; `to_stderr` keeps stdout clean for JSON output
pub fn print_summary(summary: &RunSummary, to_stderr: bool) {
    let text = format!(
        "\n{}\n{}\n{}",
        "Price jobs".cyan().bold(),
        render_table(summary),
        render_headline(summary)
    );
    if to_stderr {
        eprintln!("{}", text);
    } else {
        println!("{}", text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> RunSummary {
        let mut ok = JobRun::new("0.07".parse().unwrap());
        ok.start("out/result_7.json", 1_000).unwrap();
        ok.succeed(2, 1_250).unwrap();

        let mut failed = JobRun::new("0.1".parse().unwrap());
        failed.start("out/result_10.json", 2_000).unwrap();
        failed.fail("disk full", 2_010).unwrap();

        RunSummary::new(vec![ok, failed])
    }

    #[test]
    fn test_table_lists_every_job() {
        let table = render_table(&summary());

        assert!(table.contains("Tax rate"));
        assert!(table.contains("7%"));
        assert!(table.contains("out/result_10.json"));
        assert!(table.contains("SUCCEEDED"));
        assert!(table.contains("FAILED"));
        assert!(table.contains("250ms"));
        assert!(table.contains("disk full"));
    }

    #[test]
    fn test_headline_counts_failures() {
        colored::control::set_override(false);
        assert_eq!(render_headline(&summary()), "✗ 1 of 2 job(s) failed");
        assert_eq!(
            render_headline(&RunSummary::new(Vec::new())),
            "✓ 0 job(s) succeeded"
        );
    }

    #[test]
    fn test_largest_rate_renders() {
        let mut job = JobRun::new("792281625142643375935439503".parse().unwrap());
        job.start("out/result_huge.json", 0).unwrap();
        job.succeed(0, 1).unwrap();

        let table = render_table(&RunSummary::new(vec![job]));

        assert!(table.contains("79228162514264337593543950300%"));
    }
}
