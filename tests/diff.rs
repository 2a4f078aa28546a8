use fuzzpatch::{Diff, Differ, Op};

#[test]
fn test_char_mode_scenario() {
    let mut differ = Differ::new();
    differ.set_checklines(false);

    assert_eq!(
        vec![
            Diff::delete("Apple"),
            Diff::insert("Banana"),
            Diff::equal("s are a"),
            Diff::insert("lso"),
            Diff::equal(" fruit."),
        ],
        differ.main("Apples are a fruit.", "Bananas are also fruit.")
    );
}

#[test]
fn test_fidelity_round_trip() {
    let differ = Differ::new();
    let cases = [
        ("The quick brown fox jumps over the lazy dog.", "Quick brown foxes jump."),
        ("", "added from nothing"),
        ("erased to nothing", ""),
        ("line one\nline two\nline three\n", "line one\nline 2\nline three\nline four\n"),
        ("🙈🙉🙊", "🙉🙊🙈"),
    ];
    for (text1, text2) in cases {
        let diffs = differ.main(text1, text2);
        assert_eq!(text1, Differ::text1(&diffs), "text1 of {text1:?} -> {text2:?}");
        assert_eq!(text2, Differ::text2(&diffs), "text2 of {text1:?} -> {text2:?}");
    }
}

#[test]
fn test_delta_scenario() {
    let diffs = vec![
        Diff::equal("jump"),
        Diff::delete("s"),
        Diff::insert("ed"),
        Diff::equal(" over "),
        Diff::delete("the"),
        Diff::insert("a"),
        Diff::equal(" lazy"),
        Diff::insert("old dog"),
    ];
    assert_eq!(
        "=4\t-1\t+ed\t=6\t-3\t+a\t=5\t+old dog",
        Differ::to_delta(&diffs)
    );
}

#[test]
fn test_delta_round_trip() {
    let differ = Differ::new();
    let diffs = differ.main(
        "The quick brown fox jumps over the lazy dog.",
        "That quick brown fox jumped over a lazy dog 🐶.",
    );
    let delta = Differ::to_delta(&diffs);
    let rebuilt = Differ::from_delta(&Differ::text1(&diffs), &delta).unwrap();
    assert_eq!(diffs, rebuilt);
}

#[test]
fn test_expired_deadline_still_valid() {
    let mut differ = Differ::new();
    // A zero timeout expires immediately; the script degrades to a coarse
    // one but stays well formed.
    differ.set_timeout(Some(0));
    let text1 = "The 🦊 jumps over the dog.\n".repeat(8);
    let text2 = "A 🐈 sits under a tree.\n".repeat(9);
    let diffs = differ.main(&text1, &text2);
    assert_eq!(text1, Differ::text1(&diffs));
    assert_eq!(text2, Differ::text2(&diffs));
}

#[test]
fn test_script_serde() {
    let differ = Differ::new();
    let diffs = differ.main("Good dog", "Bad dog");
    let json = serde_json::to_string(&diffs).unwrap();
    let parsed: Vec<Diff> = serde_json::from_str(&json).unwrap();
    assert_eq!(diffs, parsed);

    // Ops serialize as the conventional integers.
    assert_eq!("-1", serde_json::to_string(&Op::Delete).unwrap());
    assert_eq!("0", serde_json::to_string(&Op::Equal).unwrap());
    assert_eq!("1", serde_json::to_string(&Op::Insert).unwrap());
}

#[test]
fn test_boundary_checks() {
    assert_eq!(4, Differ::common_prefix("1234abcdef", "1234xyz"));
    assert_eq!(3, Differ::common_overlap("123456xxx", "xxxabcd"));
    // No ligature folding.
    assert_eq!(0, Differ::common_overlap("fi", "\u{fb01}i"));
}

#[test]
fn test_lines_to_chars_never_zero() {
    // The line dictionary reserves slot zero, so even a dictionary grown
    // past the second cap emits no zero code unit.
    let text: String = (0..66_000).map(|i| format!("{i}\n")).collect();
    let (chars1, _, lines) = Differ::lines_to_chars(&text, "");
    assert!(chars1.chars().all(|c| c != '\0'));
    assert_eq!("", lines[0]);

    // The remainder past the cap was swallowed as one oversize line.
    let decoded = Differ::chars_to_lines(&[Diff::new(Op::Equal, &chars1)], &lines);
    assert_eq!(text, decoded[0].text());
}
