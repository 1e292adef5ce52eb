use super::*;

#[test]
fn approx_wrap_respects_width_and_line_height() {
    let block = TextSpec::new("aaaa bbbb cccc", 10.0, Color::WHITE).line_height(2.0);
    let wrapped = approx_wrap(&block, 0.0, 100.0, 40.0);
    assert_eq!(wrapped.lines.len(), 3);
    assert_eq!(wrapped.lines[1].baseline, 120.0);
    assert_eq!(wrapped.end_y, 160.0);
    assert!(wrapped.lines.iter().all(|l| l.width <= 40.0));
}

#[test]
fn line_height_ignores_nonsense() {
    let block = TextSpec::new("x", 10.0, Color::WHITE).line_height(-1.0);
    assert_eq!(block.line_height, LINE_HEIGHT_FACTOR);
    let block = block.bold(true).letter_spacing(2.0);
    assert!(block.bold);
    assert_eq!(block.letter_spacing, 2.0);
}

#[test]
fn approx_measure_counts_letter_spacing() {
    let mut m = ApproxMeasure {
        size: 20.0,
        line_height: 1.2,
        letter_spacing: 1.0,
    };
    assert_eq!(m.measure("abc"), 3.0 * 12.0);
    assert_eq!(m.line_height(), 24.0);
}
