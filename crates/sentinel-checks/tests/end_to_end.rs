use std::sync::Arc;
use std::time::Duration;

use sentinel_checks::{default_evaluators, MemoryTable};
use sentinel_core::cache::MemoryCache;
use sentinel_core::config::suite_from_yaml;
use sentinel_core::engine::Runner;
use sentinel_core::evaluator::EvaluatorRegistry;
use sentinel_core::export::sqlite::SqliteExporter;
use sentinel_core::model::{CheckStatus, RunOptions, RunStatus, Severity};
use sentinel_core::report::console::print_summary;
use serde_json::json;

const SUITE_YAML: &str = r#"
name: orders_quality
description: nightly checks on the orders table
checks:
  - name: orders_present
    kind: row_count
    threshold:
      lower: 1
  - name: no_null_ids
    kind: not_null
    severity: critical
    params:
      column: id
    threshold:
      upper: 0
  - name: unique_ids
    kind: unique
    params:
      column: id
    threshold:
      upper: 0
  - name: no_duplicate_rows
    kind: duplicate_rows
    params:
      columns: [id, status]
    threshold:
      upper: 0
  - name: amount_non_negative
    kind: negative_values
    params:
      column: amount
    threshold:
      upper: 0
  - name: amount_sane
    kind: value_range
    params:
      column: amount
      min: 0
      max: 10000
    threshold:
      upper: 0
  - name: known_statuses
    kind: accepted_values
    params:
      column: status
      values: [new, shipped, done]
    threshold:
      upper: 0
  - name: sku_format
    kind: regex_match
    params:
      column: sku
      pattern: "^[A-Z]{2}-\\d{4}$"
    threshold:
      upper: 0
  - name: fresh_data
    kind: freshness
    params:
      column: loaded_at
      as_of: "2026-08-23T00:00:00Z"
    threshold:
      upper: 86400
"#;

fn orders_table() -> MemoryTable {
    MemoryTable::new("orders")
        .with_column("id", vec![json!(1), json!(2), json!(3), json!(4)])
        .with_column(
            "amount",
            vec![json!(19.99), json!(250.0), json!(0.0), json!(42.5)],
        )
        .with_column(
            "status",
            vec![json!("new"), json!("shipped"), json!("done"), json!("new")],
        )
        .with_column(
            "sku",
            vec![
                json!("AB-1234"),
                json!("CD-5678"),
                json!("EF-9012"),
                json!("GH-3456"),
            ],
        )
        .with_column(
            "loaded_at",
            vec![
                json!("2026-08-22T06:00:00Z"),
                json!("2026-08-22T18:00:00Z"),
                json!("2026-08-22T18:00:00Z"),
                json!("2026-08-22T12:00:00Z"),
            ],
        )
}

fn runner_with(cache_ttl: Duration) -> Runner {
    let registry = EvaluatorRegistry::new(default_evaluators());
    Runner::new(registry, Arc::new(MemoryCache::new(cache_ttl)))
}

#[tokio::test]
async fn clean_table_passes_the_whole_suite() -> anyhow::Result<()> {
    let suite = suite_from_yaml(SUITE_YAML)?;
    let sink = SqliteExporter::memory()?;
    let runner = Runner::new(
        EvaluatorRegistry::new(default_evaluators()),
        Arc::new(MemoryCache::new(Duration::from_secs(300))),
    )
    .with_exporter(Arc::new(sink.clone()));

    let handle = runner.start_run(
        &suite,
        Arc::new(orders_table()),
        "nightly-orders",
        RunOptions::default(),
    )?;
    let outcome = runner.execute(handle).await?;

    assert_eq!(outcome.run.status, RunStatus::Passed);
    assert_eq!(outcome.run.error_count, 0);
    assert_eq!(outcome.results.len(), 9);
    assert!(outcome.results.iter().all(|r| r.status == CheckStatus::Pass));
    assert!(outcome.run.bytes_processed > 0);
    print_summary(&outcome);

    // exporting through the runner is idempotent
    runner.export(&outcome)?;
    runner.export(&outcome)?;
    assert_eq!(sink.count_rows("runs")?, 1);
    assert_eq!(sink.count_rows("results")?, 9);
    Ok(())
}

#[tokio::test]
async fn dirty_table_fails_the_offending_checks() -> anyhow::Result<()> {
    let suite = suite_from_yaml(SUITE_YAML)?;
    let runner = runner_with(Duration::from_secs(300));

    // duplicate id, a NULL id, a negative amount, a bogus status and a
    // stale load date
    let table = MemoryTable::new("orders")
        .with_column("id", vec![json!(1), json!(1), json!(null)])
        .with_column("amount", vec![json!(19.99), json!(-5.0), json!(7.5)])
        .with_column(
            "status",
            vec![json!("new"), json!("zombie"), json!("done")],
        )
        .with_column(
            "sku",
            vec![json!("AB-1234"), json!("CD-5678"), json!("EF-9012")],
        )
        .with_column(
            "loaded_at",
            vec![
                json!("2026-08-10T00:00:00Z"),
                json!("2026-08-11T00:00:00Z"),
                json!("2026-08-12T00:00:00Z"),
            ],
        );

    let handle = runner.start_run(&suite, Arc::new(table), "nightly-orders", RunOptions::default())?;
    let outcome = runner.execute(handle).await?;

    assert_eq!(outcome.run.status, RunStatus::Failed);
    assert_eq!(outcome.run.error_count, 0);

    let by_name = |name: &str| {
        outcome
            .results
            .iter()
            .find(|r| r.check_name == name)
            .unwrap()
    };
    assert_eq!(by_name("no_null_ids").status, CheckStatus::Fail);
    assert_eq!(by_name("no_null_ids").severity, Severity::Critical);
    assert_eq!(by_name("no_null_ids").value, Some(1.0));
    assert_eq!(by_name("unique_ids").status, CheckStatus::Fail);
    assert_eq!(by_name("known_statuses").status, CheckStatus::Fail);
    assert_eq!(by_name("fresh_data").status, CheckStatus::Fail);
    assert_eq!(by_name("amount_non_negative").status, CheckStatus::Fail);
    assert_eq!(by_name("amount_non_negative").value, Some(1.0));
    assert_eq!(by_name("amount_sane").status, CheckStatus::Fail);
    assert_eq!(by_name("orders_present").status, CheckStatus::Pass);
    // (id, status) pairs stay distinct even with the duplicate id
    assert_eq!(by_name("no_duplicate_rows").status, CheckStatus::Pass);
    Ok(())
}

#[tokio::test]
async fn validate_only_replays_a_fresh_run_from_cache() -> anyhow::Result<()> {
    let suite = suite_from_yaml(SUITE_YAML)?;
    let runner = runner_with(Duration::from_secs(300));
    let table = Arc::new(orders_table());

    let handle = runner.start_run(&suite, table.clone(), "warm", RunOptions::default())?;
    let fresh = runner.execute(handle).await?;
    assert!(!fresh.run.cache_hit);

    let options = RunOptions {
        validate_only: true,
        ..RunOptions::default()
    };
    let handle = runner.start_run(&suite, table, "replay", options)?;
    let replay = runner.execute(handle).await?;

    assert!(replay.run.cache_hit);
    assert_eq!(replay.run.status, RunStatus::Passed);
    assert!(replay.results.iter().all(|r| r.served_from_cache));
    for (a, b) in fresh.results.iter().zip(replay.results.iter()) {
        assert_eq!(a.check_name, b.check_name);
        assert_eq!(a.value, b.value);
        assert_eq!(a.message, b.message);
    }
    Ok(())
}

#[tokio::test]
async fn edited_table_invalidates_cached_results() -> anyhow::Result<()> {
    let suite = suite_from_yaml(SUITE_YAML)?;
    let runner = runner_with(Duration::from_secs(300));

    let handle = runner.start_run(
        &suite,
        Arc::new(orders_table()),
        "warm",
        RunOptions::default(),
    )?;
    runner.execute(handle).await?;

    // a changed column changes the content fingerprint
    let edited = orders_table().with_column("id", vec![json!(1), json!(2), json!(3)]);
    let options = RunOptions {
        validate_only: true,
        ..RunOptions::default()
    };
    let handle = runner.start_run(&suite, Arc::new(edited), "replay", options)?;
    let outcome = runner.execute(handle).await?;

    assert!(!outcome.run.cache_hit);
    assert!(outcome.results.iter().all(|r| !r.served_from_cache));
    Ok(())
}

#[tokio::test]
async fn validate_first_gates_on_the_first_check() -> anyhow::Result<()> {
    let suite = suite_from_yaml(SUITE_YAML)?;
    let runner = runner_with(Duration::from_secs(300));

    // empty table: row_count evaluates to 0 and fails its threshold; a
    // plain failure is not an error, so the rest of the suite still runs
    let empty = MemoryTable::new("orders")
        .with_column("id", vec![])
        .with_column("amount", vec![])
        .with_column("status", vec![])
        .with_column("sku", vec![])
        .with_column("loaded_at", vec![]);
    let options = RunOptions {
        validate_first: true,
        ..RunOptions::default()
    };
    let handle = runner.start_run(&suite, Arc::new(empty), "gated", options)?;
    let outcome = runner.execute(handle).await?;

    assert_eq!(outcome.results[0].check_name, "orders_present");
    assert_eq!(outcome.results[0].status, CheckStatus::Fail);
    assert_eq!(outcome.results.len(), 9);

    // freshness cannot find a timestamp in the empty column and errors out,
    // which dominates the plain threshold failures
    let fresh = outcome
        .results
        .iter()
        .find(|r| r.check_name == "fresh_data")
        .unwrap();
    assert_eq!(fresh.status, CheckStatus::Error);
    assert_eq!(fresh.severity, Severity::Critical);
    assert_eq!(outcome.run.status, RunStatus::Error);
    assert_eq!(outcome.run.error_count, 1);
    Ok(())
}
