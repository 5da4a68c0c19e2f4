use crate::engine::RunOutcome;
use crate::model::CheckStatus;

pub fn print_summary(outcome: &RunOutcome) {
    let mut pass = 0;
    let mut fail = 0;
    let mut error = 0;

    eprintln!(
        "\nRun #{} '{}' ({} checks)",
        outcome.run.id,
        outcome.run.suite_name,
        outcome.results.len()
    );

    for r in &outcome.results {
        let value = r
            .value
            .map(|v| format!("{:.4}", v))
            .unwrap_or_else(|| "-".into());
        let cached = if r.served_from_cache { " (cached)" } else { "" };

        match r.status {
            CheckStatus::Pass => {
                pass += 1;
                eprintln!("✅ {:<28} {}{}", r.check_name, value, cached);
            }
            CheckStatus::Fail => {
                fail += 1;
                eprintln!("❌ {:<28} {}{}", r.check_name, value, cached);
                eprintln!("    {}", r.message);
            }
            CheckStatus::Error => {
                error += 1;
                eprintln!("💥 {:<28} [{}]", r.check_name, r.severity.as_str());
                eprintln!("    {}", r.message);
            }
        }
    }

    eprintln!(
        "\n{}: {} passed, {} failed, {} errored ({} ms, {} bytes)",
        outcome.run.status.as_str(),
        pass,
        fail,
        error,
        outcome.run.duration_ms.unwrap_or(0),
        outcome.run.bytes_processed
    );
}
