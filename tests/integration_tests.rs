use hashtag_trends::keycount::{map_mentions, reduce_lines};
use hashtag_trends::output::write_report;
use hashtag_trends::parser::{ParseOptions, read_aggregates, read_posts_file};
use hashtag_trends::trends::pipeline::{rescore, run};
use hashtag_trends::trends::window::Granularity;
use std::env;
use std::fs;

const SAMPLE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/sample_posts.csv");

fn summary(report_top: &[&hashtag_trends::trends::types::TrendScore]) -> Vec<(String, String)> {
    report_top
        .iter()
        .map(|s| (s.window.label().to_string(), s.hashtag.clone()))
        .collect()
}

#[test]
fn test_full_pipeline() {
    let (posts, stats) = read_posts_file(SAMPLE, ParseOptions::default()).expect("Failed to read posts");
    assert_eq!(stats.rows_read, 8);
    assert_eq!(stats.rows_kept, 7);
    assert_eq!(stats.skipped_empty_hashtag, 1);
    assert_eq!(stats.coerced_mentions, 1);
    assert_eq!(stats.coerced_sentiment, 1);

    let report = run(&posts, Granularity::Day, 2);
    assert_eq!(report.aggregates.len(), 6);

    let z_day2 = report
        .aggregates
        .iter()
        .find(|a| a.hashtag == "#z" && a.window.label() == "2025-05-02")
        .unwrap();
    assert_eq!(z_day2.mentions_sum, 5);
    assert_eq!(z_day2.reach_sum, 100);
    assert_eq!(z_day2.rows_count, 2);
    assert!((z_day2.sentiment_avg - 0.2).abs() < 1e-12);

    let x_day2 = report
        .scores
        .iter()
        .find(|s| s.hashtag == "#x" && s.window.label() == "2025-05-02")
        .unwrap();
    let expected = (10.0 / 11.0) * 301f64.ln() * 1.2;
    assert!((x_day2.score - expected).abs() < 1e-9);

    let order: Vec<_> = report.scores.iter().map(|s| s.hashtag.as_str()).collect();
    assert_eq!(order, vec!["#x", "#y", "#z", "#z", "#x", "#y"]);

    assert_eq!(
        summary(&report.top()),
        vec![
            ("2025-05-01".to_string(), "#x".to_string()),
            ("2025-05-01".to_string(), "#y".to_string()),
            ("2025-05-02".to_string(), "#z".to_string()),
            ("2025-05-02".to_string(), "#x".to_string()),
        ]
    );
}

#[test]
fn test_week_and_month_windows_collapse_sample() {
    let (posts, _) = read_posts_file(SAMPLE, ParseOptions::default()).unwrap();

    let weekly = run(&posts, Granularity::Week, 10);
    assert!(weekly.scores.iter().all(|s| s.window.label() == "2025-W18"));
    assert!(weekly.scores.iter().all(|s| s.score == 0.0));

    let monthly = run(&posts, Granularity::Month, 10);
    assert_eq!(monthly.aggregates.len(), 3);
    assert_eq!(monthly.window_count(), 1);
}

#[test]
fn test_written_aggregates_rescore_identically() {
    let (posts, _) = read_posts_file(SAMPLE, ParseOptions::default()).unwrap();
    let report = run(&posts, Granularity::Day, 10);

    let prefix = format!("{}/hashtag_trends_it_rescore", env::temp_dir().display());
    let paths = write_report(&report, &prefix, false).unwrap();

    let aggregates = read_aggregates(fs::File::open(&paths.aggregates).unwrap()).unwrap();
    let again = rescore(aggregates, 10);

    assert_eq!(again.scores.len(), report.scores.len());
    for (a, b) in again.scores.iter().zip(&report.scores) {
        assert_eq!(a.hashtag, b.hashtag);
        assert_eq!(a.window, b.window);
        assert!((a.score - b.score).abs() < 1e-9);
    }

    let _ = fs::remove_file(&paths.aggregates);
    let _ = fs::remove_file(&paths.scores);
    let _ = fs::remove_file(&paths.top_k);
}

#[test]
fn test_map_reduce_key_counts() {
    let pairs = map_mentions(fs::File::open(SAMPLE).unwrap()).unwrap();
    assert_eq!(pairs.len(), 7);

    let lines: Vec<String> = pairs.iter().map(|(k, v)| format!("{k}\t{v}")).collect();
    assert_eq!(
        reduce_lines(&lines),
        vec![
            ("#x".to_string(), 30),
            ("#y".to_string(), 75),
            ("#z".to_string(), 6),
        ]
    );
}
