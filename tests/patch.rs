use fuzzpatch::{Differ, Patcher};

const TEXT1: &str = "The quick brown fox jumps over the lazy dog.";
const TEXT2: &str = "That quick brown fox jumped over a lazy dog.";

#[test]
fn test_make_scenario() {
    let patcher = Patcher::new();
    let patches = patcher.make_from_texts(TEXT1, TEXT2).unwrap();
    assert_eq!(
        "@@ -1,11 +1,12 @@\n Th\n-e\n+at\n  quick b\n@@ -22,18 +22,17 @@\n jump\n-s\n+ed\n  over \n-the\n+a\n  laz\n",
        Patcher::to_text(&patches).unwrap()
    );
}

#[test]
fn test_apply_to_drifted_text() {
    let patcher = Patcher::new();
    let patches = patcher.make_from_texts(TEXT1, TEXT2).unwrap();
    let (patched, results) = patcher
        .apply(&patches, "The quick red rabbit jumps over the tired tiger.")
        .unwrap();
    assert_eq!("That quick red rabbit jumped over a tired tiger.", patched);
    assert_eq!(vec![true, true], results);
}

#[test]
fn test_delete_threshold_scenario() {
    let mut patcher = Patcher::new();
    let digits70 = "1234567890".repeat(7);
    let patches = patcher
        .make_from_texts(&format!("x{digits70}y"), "xabcy")
        .unwrap();
    let drifted = "x12345678901234567890-------------++++++++++-------------12345678901234567890y";

    // The monster delete's content has drifted too far for 0.5.
    let (patched, results) = patcher.apply(&patches, drifted).unwrap();
    assert_eq!(
        "xabc12345678901234567890-------------++++++++++-------------12345678901234567890y",
        patched
    );
    assert_eq!(vec![false, true], results);

    // A looser threshold lets it through.
    patcher.set_delete_threshold(0.6);
    let (patched, results) = patcher.apply(&patches, drifted).unwrap();
    assert_eq!("xabcy", patched);
    assert_eq!(vec![true, true], results);
}

#[test]
fn test_apply_empty_list_is_identity() {
    let patcher = Patcher::new();
    let (patched, results) = patcher.apply(&[], "Hello world.").unwrap();
    assert_eq!("Hello world.", patched);
    assert!(results.is_empty());
}

#[test]
fn test_apply_does_not_mutate_input() {
    let patcher = Patcher::new();
    let patches = patcher.make_from_texts(TEXT1, "Woof").unwrap();
    let before = patches.clone();
    patcher.apply(&patches, TEXT1).unwrap();
    assert_eq!(before, patches);
}

#[test]
fn test_text_round_trip() {
    let patcher = Patcher::new();
    let patches = patcher.make_from_texts(TEXT1, TEXT2).unwrap();
    let parsed = patcher
        .from_text(&Patcher::to_text(&patches).unwrap())
        .unwrap();
    assert_eq!(patches, parsed);

    // An empty list serializes to an empty string.
    assert_eq!("", Patcher::to_text(&[]).unwrap());
}

#[test]
fn test_delta_transport_workflow() {
    // The full pipeline: diff at the source, ship a delta, rebuild the
    // script at the destination, patch the destination's copy.
    let patcher = Patcher::new();
    let diffs = patcher.differ().main(TEXT1, TEXT2);
    let delta = Differ::to_delta(&diffs);

    let rebuilt = Differ::from_delta(TEXT1, &delta).unwrap();
    let patches = patcher.make_from_text_diffs(TEXT1, &rebuilt).unwrap();
    let (patched, _) = patcher.apply(&patches, TEXT1).unwrap();
    assert_eq!(TEXT2, patched);
}

#[test]
fn test_unicode_patch() {
    let patcher = Patcher::new();
    let patches = patcher
        .make_from_texts("☺️ emoji and text ☹️", "☺️ emoji and more text 🎉")
        .unwrap();
    let (patched, results) = patcher.apply(&patches, "☺️ emoji and text ☹️").unwrap();
    assert_eq!("☺️ emoji and more text 🎉", patched);
    assert!(results.iter().all(|&ok| ok));
}
