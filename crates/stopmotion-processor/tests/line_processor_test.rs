use proptest::prelude::*;
use stopmotion_core::{GcodeError, Point};
use stopmotion_processor::{LineProcessor, ProcessorConfig};

fn processor() -> LineProcessor {
    let config = ProcessorConfig::new()
        .with_numbering(1, 5)
        .with_step_length(1.0)
        .with_heights(1.0, -1.0)
        .with_home(Point::new(-1.0, -1.0, 1.0));
    LineProcessor::new(config)
        .unwrap()
        .with_position(Point::new(0.0, 0.0, 0.0))
}

fn assert_near(actual: Option<Point>, expected: Point) {
    let actual = actual.expect("position should be known");
    assert!(
        actual.distance_to(&expected) < 1e-5,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn test_renumbers_lines() {
    let mut p = processor();
    assert_eq!(p.process_line("N0001 G90").unwrap(), vec!["N0001 G90"]);
    assert_eq!(p.process_line("N0003 M08").unwrap(), vec!["N0006 M08"]);
}

#[test]
fn test_does_not_touch_comments() {
    let mut p = processor();
    assert_eq!(p.process_line("(Comment)").unwrap(), vec!["(Comment)"]);
    assert_eq!(p.process_line("N0001 G90").unwrap(), vec!["N0001 G90"]);
    assert_eq!(p.process_line("(Comment)").unwrap(), vec!["(Comment)"]);
    assert_eq!(p.process_line("N0003 M08").unwrap(), vec!["N0006 M08"]);
    assert_near(p.position(), Point::new(0.0, 0.0, 0.0));
}

#[test]
fn test_blank_line_passes_through() {
    let mut p = processor();
    assert_eq!(p.process_line("").unwrap(), vec![""]);
    assert_eq!(p.next_line_number(), Some(1));
}

#[test]
fn test_maintains_position_on_rapid() {
    let mut p = processor();
    let out = p
        .process_line("N0001 G00 X1.0000 Y2.0000 Z3.0000 F500")
        .unwrap();
    assert_eq!(out, vec!["N0001 G00 X1.0000 Y2.0000 Z3.0000 F500"]);
    assert_near(p.position(), Point::new(1.0, 2.0, 3.0));
}

#[test]
fn test_rapid_below_surface_is_not_split() {
    let mut p = processor().with_position(Point::new(0.0, 0.0, -1.0));
    let out = p.process_line("N0001 G00 X5 Y0 Z-1").unwrap();
    assert_eq!(out.len(), 1);
}

#[test]
fn test_does_not_split_plunge_from_above_surface() {
    let mut p = processor().with_position(Point::new(1.0, 2.0, 1.0));
    let out = p
        .process_line("N0003 G01 X1.0000 Y2.0000 Z-1.0000 F500")
        .unwrap();
    assert_eq!(out.len(), 1);
    assert!(out[0].contains("G01 X1.0000 Y2.0000 Z-1.0000 F500"));
    assert_near(p.position(), Point::new(1.0, 2.0, -1.0));
}

#[test]
fn test_does_not_split_move_ending_at_surface() {
    let mut p = processor().with_position(Point::new(0.0, 0.0, -1.0));
    let out = p.process_line("N0003 G01 X5 Y0 Z0 F500").unwrap();
    assert_eq!(out.len(), 1);
}

#[test]
fn test_splits_below_surface_linear_move() {
    let mut p = processor().with_position(Point::new(1.0, 2.0, -1.0));
    let out = p
        .process_line("N0003 G01 X10.0000 Y2.0000 Z-1.0000 F500")
        .unwrap();

    // 9 loops of 6 lines, then the renumbered original.
    assert_eq!(out.len(), 9 * 6 + 1);

    let dwells = out.iter().filter(|l| l.contains(" G04 P1000")).count();
    assert_eq!(dwells, 9);

    let linear: Vec<&String> = out.iter().filter(|l| l.contains(" G01 ")).collect();
    assert_eq!(linear.len(), 10);
    assert!(linear[0].ends_with("G01 X2.0000 Y2.0000 Z-1.0000 F500"));
    for line in &linear[1..9] {
        assert!(!line.contains("F500"), "feed repeated in {line}");
    }
    assert!(linear[8].contains("G01 X10.0000 Y2.0000 Z-1.0000"));

    assert_eq!(out.last().unwrap(), "N0271 G01 X10.0000 Y2.0000 Z-1.0000 F500");
    assert_near(p.position(), Point::new(10.0, 2.0, -1.0));
}

#[test]
fn test_passes_feed_rate_on_first_step() {
    let mut p = processor().with_position(Point::new(1.0, 2.0, -1.0));
    let out = p
        .process_line("N0003 G01 X10.0000 Y2.0000 Z-1.0000 F1500")
        .unwrap();
    let first_linear = out.iter().find(|l| l.contains("G01")).unwrap();
    assert!(first_linear.contains("F1500"));
}

#[test]
fn test_first_loop_is_exact() {
    let mut p = processor().with_position(Point::new(1.0, 0.0, -1.0));
    let out = p.process_line("N0050 G01 X2 Y0 Z-1 F500").unwrap();
    assert_eq!(
        out,
        vec![
            "N0001 G00 X1.0000 Y0.0000 Z1.0000",
            "N0006 G00 X-1.0000 Y-1.0000 Z1.0000",
            "N0011 G04 P1000",
            "N0016 G00 X1.0000 Y0.0000 Z1.0000",
            "N0021 G00 X1.0000 Y0.0000 Z-1.0000",
            "N0026 G01 X2.0000 Y0.0000 Z-1.0000 F500",
            "N0031 G01 X2 Y0 Z-1 F500",
        ]
    );
}

#[test]
fn test_return_point_follows_each_step() {
    let mut p = processor().with_position(Point::new(0.0, 0.0, -1.0));
    let out = p.process_line("N0001 G01 X2 Y0 Z-1").unwrap();

    // Second loop retracts above the end of the first step.
    assert_eq!(out[6], "N0031 G00 X1.0000 Y0.0000 Z1.0000");
    assert_eq!(out[9], "N0046 G00 X1.0000 Y0.0000 Z1.0000");
    assert_eq!(out[11], "N0056 G01 X2.0000 Y0.0000 Z-1.0000 ");
}

#[test]
fn test_parse_failure_aborts_line() {
    let mut p = processor().with_position(Point::new(0.0, 0.0, -1.0));
    let err = p.process_line("N0003 G01 Y2 Z3 X4").unwrap_err();
    assert!(matches!(err, GcodeError::AxisMismatch { expected: 'X', .. }));

    let err = p.process_line("N0003 G00 Xfoo Ybar Zbaz").unwrap_err();
    assert!(matches!(err, GcodeError::NumberFormat { .. }));

    // The stream continues with unchanged state.
    assert_eq!(p.process_line("N0004 M05").unwrap(), vec!["N0001 M05"]);
    assert_near(p.position(), Point::new(0.0, 0.0, -1.0));
}

#[test]
fn test_process_emits_through_callback() {
    let mut p = processor().with_position(Point::new(0.0, 0.0, -1.0));
    let mut lines = Vec::new();
    p.process("N0001 G01 X1 Y0 Z-1 F200", |l| lines.push(l))
        .unwrap();
    assert_eq!(lines.len(), 7);
    assert!(lines[5].ends_with("F200"));
}

#[test]
fn test_default_configuration_output() {
    let mut p = LineProcessor::new(ProcessorConfig::default()).unwrap();
    let out = p.process_line("N10 G00 X0 Y0 Z-0.5").unwrap();
    assert_eq!(out, vec!["N0001 G00 X0 Y0 Z-0.5"]);

    let out = p.process_line("N20 G01 X0.5 Y0 Z-0.5 F300").unwrap();
    assert_eq!(
        out,
        vec![
            "N0003 G00 X0.0000 Y0.0000 Z0.8000",
            "N0005 G00 X0.0000 Y0.0000 Z0.8000",
            "N0007 G04 P1000",
            "N0009 G00 X0.0000 Y0.0000 Z0.8000",
            "N0011 G00 X0.0000 Y0.0000 Z-0.5000",
            "N0013 G01 X0.5000 Y0.0000 Z-0.5000 F300",
            "N0015 G01 X0.5 Y0 Z-0.5 F300",
        ]
    );
}

proptest! {
    #[test]
    fn numbered_output_is_strictly_sequential(
        moves in prop::collection::vec((-5.0f64..5.0, -5.0f64..5.0, -2.0f64..1.0, any::<bool>()), 1..12),
        start in 0u64..50,
        stride in 1u64..10,
    ) {
        let config = ProcessorConfig::new()
            .with_numbering(start, stride)
            .with_step_length(1.5);
        let mut p = LineProcessor::new(config).unwrap();

        let mut numbers = Vec::new();
        for (i, (x, y, z, linear)) in moves.into_iter().enumerate() {
            let kind = if linear { "G01" } else { "G00" };
            let line = format!("N{} {} X{:.3} Y{:.3} Z{:.3}", i, kind, x, y, z);
            for out in p.process_line(&line).unwrap() {
                let word = out.split_whitespace().next().unwrap();
                numbers.push(word[1..].parse::<u64>().unwrap());
            }
        }

        for (k, n) in numbers.iter().enumerate() {
            prop_assert_eq!(*n, start + k as u64 * stride);
        }
    }
}
