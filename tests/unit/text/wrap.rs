use super::*;

#[test]
fn empty_text_emits_nothing_and_keeps_y() {
    let mut m = FixedAdvance::new(10.0, 5.0);
    let out = wrap_text("", 0.0, 100.0, 50.0, &mut m);
    assert!(out.lines.is_empty());
    assert_eq!(out.end_y, 100.0);
}

#[test]
fn blank_text_still_takes_one_line() {
    let mut m = FixedAdvance::new(10.0, 5.0);
    for text in ["   ", "\n", " \n  "] {
        let out = wrap_text(text, 0.0, 100.0, 50.0, &mut m);
        assert_eq!(out.lines.len(), 1, "{text:?}");
        assert_eq!(out.lines[0].text, "");
        assert!((out.end_y - 112.0).abs() < 1e-9, "{text:?}");
    }
}

#[test]
fn short_text_is_one_line_and_advances_one_line_height() {
    let mut m = FixedAdvance::new(10.0, 5.0);
    let out = wrap_text("hello world", 20.0, 100.0, 500.0, &mut m);
    assert_eq!(out.lines.len(), 1);
    assert_eq!(out.lines[0].text, "hello world");
    assert_eq!(out.lines[0].x, 20.0);
    assert_eq!(out.lines[0].baseline, 100.0);
    assert!((out.end_y - 112.0).abs() < 1e-9);
}

#[test]
fn greedy_word_wrap_breaks_between_words() {
    let mut m = FixedAdvance::new(10.0, 10.0);
    let out = wrap_text("aa bb cc dd", 0.0, 0.0, 55.0, &mut m);
    let texts: Vec<_> = out.lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["aa bb", "cc dd"]);
    assert!((out.lines[1].baseline - 12.0).abs() < 1e-9);
    assert!((out.end_y - 24.0).abs() < 1e-9);
}

#[test]
fn long_word_falls_back_to_characters() {
    let mut m = FixedAdvance::new(10.0, 10.0);
    let out = wrap_text("ab abcdefgh cd", 0.0, 0.0, 30.0, &mut m);
    let texts: Vec<_> = out.lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["ab", "abc", "def", "gh", "cd"]);
}

#[test]
fn first_word_too_long_is_also_broken() {
    let mut m = FixedAdvance::new(10.0, 10.0);
    let out = wrap_text("abcdef", 0.0, 0.0, 20.0, &mut m);
    let texts: Vec<_> = out.lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["ab", "cd", "ef"]);
}

#[test]
fn pathological_width_emits_one_character_per_line() {
    let mut m = FixedAdvance::new(10.0, 10.0);
    let text = "AAAAAAAAAAAAAAAAAAAA";
    let out = wrap_text(text, 0.0, 0.0, 5.0, &mut m);
    assert_eq!(out.lines.len(), 20);
    assert!(out.lines.iter().all(|l| l.text == "A"));
    assert!((out.end_y - 20.0 * 12.0).abs() < 1e-9);
}

#[test]
fn no_line_exceeds_max_width_for_mixed_input() {
    let text = "The quick brown fox jumps over supercalifragilisticexpialidocious dogs at dawn";
    for max_width in [15.0, 42.0, 77.0, 130.0, 400.0] {
        let mut m = FixedAdvance::new(12.0, 7.0);
        let out = wrap_text(text, 0.0, 0.0, max_width, &mut m);
        assert!(!out.lines.is_empty());
        for line in &out.lines {
            assert!(
                line.width <= max_width,
                "line {:?} is {} wide (max {max_width})",
                line.text,
                line.width
            );
        }
        let rejoined: String = out.lines.iter().map(|l| l.text.replace(' ', "")).collect();
        assert_eq!(rejoined, text.replace(' ', ""));
        assert!(out.end_y >= m.line_height());
    }
}

#[test]
fn paragraphs_wrap_independently() {
    let mut m = FixedAdvance::new(10.0, 10.0);
    let out = wrap_text("aa\n\nbb", 0.0, 0.0, 100.0, &mut m);
    let texts: Vec<_> = out.lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["aa", "", "bb"]);
    assert!((out.lines[2].baseline - 24.0).abs() < 1e-9);
}

#[test]
fn alignment_reanchors_lines() {
    let mut m = FixedAdvance::new(10.0, 10.0);
    let out = wrap_text("abcd ab", 0.0, 0.0, 40.0, &mut m).aligned(100.0, TextAlign::Center);
    assert_eq!(out.lines[0].x, 80.0);
    assert_eq!(out.lines[1].x, 90.0);

    let out = wrap_text("abcd", 0.0, 0.0, 40.0, &mut m).aligned(100.0, TextAlign::Right);
    assert_eq!(out.lines[0].x, 60.0);
    assert_eq!(out.max_width(), 40.0);
}

#[test]
fn align_parses_css_keywords() {
    let a: TextAlign = serde_json::from_str("\"center\"").unwrap();
    assert_eq!(a, TextAlign::Center);
    let a: TextAlign = serde_json::from_str("\"start\"").unwrap();
    assert_eq!(a, TextAlign::Left);
    let a: TextAlign = serde_json::from_str("\"end\"").unwrap();
    assert_eq!(a, TextAlign::Right);
}
