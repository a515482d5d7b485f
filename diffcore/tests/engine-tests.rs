use diffcore::{classify, compare, DiffOptions};
use proptest::{prop_assert, prop_assert_eq, test_runner::TestRunner};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const WORDS: [&str; 4] = ["alpha", "beta", "gamma", ""];

fn text_from(values: &[u8]) -> String {
    let mut text = String::new();
    for value in values {
        text.push_str(WORDS[usize::from(*value)]);
        text.push('\n');
    }
    text
}

fn get_test_runner(cases: u32) -> TestRunner {
    TestRunner::new(proptest::test_runner::Config {
        cases,
        failure_persistence: None,

        ..proptest::test_runner::Config::default()
    })
}

/// Replays the script over the compared regions and splices the trimmed
/// common ends back on, rebuilding the whole second file.
fn rebuild(text0: &str, text1: &str, options: &DiffOptions) -> (Vec<String>, Vec<String>) {
    let (seq0, seq1) = classify(text0, text1, options);
    let script = compare(&seq0, &seq1, options);

    let mut rebuilt: Vec<String> = seq0.lines()[..seq0.prefix()].to_vec();
    rebuilt.extend(script.apply(seq0.compared_lines(), seq1.compared_lines()));
    rebuilt.extend_from_slice(&seq0.lines()[seq0.prefix() + seq0.compared()..]);
    (rebuilt, seq1.lines().to_vec())
}

#[test]
fn test_engine_self_comparison_is_empty() {
    get_test_runner(256)
        .run(
            &proptest::collection::vec(0_u8..4_u8, 0_usize..40_usize),
            |values| {
                let text = text_from(&values);
                let options = DiffOptions::default();
                let (seq0, seq1) = classify(&text, &text, &options);
                let script = compare(&seq0, &seq1, &options);
                prop_assert!(script.is_empty());
                Ok(())
            },
        )
        .unwrap();
}

#[test]
fn test_engine_scripts_replay_edits() {
    get_test_runner(512)
        .run(
            &(
                proptest::collection::vec(0_u8..4_u8, 0_usize..40_usize),
                proptest::collection::vec(0_u8..4_u8, 0_usize..40_usize),
                proptest::bool::ANY,
            ),
            |(values0, values1, minimal)| {
                let options = DiffOptions {
                    minimal,
                    ..Default::default()
                };
                let (rebuilt, expected) =
                    rebuild(&text_from(&values0), &text_from(&values1), &options);
                prop_assert_eq!(rebuilt, expected);
                Ok(())
            },
        )
        .unwrap();
}

#[test]
fn test_engine_large_sparse_edits_stay_exact() {
    const LINES: usize = 100_000;
    const EDITS: usize = 100;
    const DISTINCT: u32 = 64;

    let mut rng = StdRng::seed_from_u64(0xd1ff);
    let values0: Vec<u32> = (0..LINES).map(|_| rng.gen_range(0..DISTINCT)).collect();

    let mut values1 = values0.clone();
    for position in rand::seq::index::sample(&mut rng, LINES, EDITS).iter() {
        values1[position] = (values1[position] + 1) % DISTINCT;
    }

    let text0: String = values0.iter().map(|v| format!("line {v:02}\n")).collect();
    let text1: String = values1.iter().map(|v| format!("line {v:02}\n")).collect();

    let options = DiffOptions::default();
    let (seq0, seq1) = classify(&text0, &text1, &options);
    let script = compare(&seq0, &seq1, &options);

    let rebuilt = script.apply(seq0.compared_lines(), seq1.compared_lines());
    assert_eq!(rebuilt, seq1.compared_lines());

    // Replacing a line is one delete plus one insert, so a hundred sparse
    // replacements must never cost more than two hundred.
    let cost: usize = script
        .changes()
        .iter()
        .map(|change| change.deleted + change.inserted)
        .sum();
    assert!(cost <= 2 * EDITS, "cost {cost} for {EDITS} replacements");
}
