//! Integration tests for the animation module.

use std::time::Duration;

use ember_core::animation::*;
use proptest::prelude::*;

const MS_16: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    In,
    Pause,
    Out,
}

#[test]
fn tween_driven_by_frames_lands_on_target() {
    let target = NodeStyle::REST;
    let from = NodeStyle {
        dx: -240.0,
        dy: 120.0,
        rotation: 180.0,
        scale: 1.0,
        opacity: 0.0,
    };
    let mut tween = ActiveTween::new(
        Tween::to(target, Duration::from_millis(500))
            .from(from)
            .delay(Duration::from_millis(100))
            .easing(Easing::EaseOutExpo),
    );
    let mut pose = from;
    let mut finished = false;
    for _ in 0..60 {
        match tween.advance(MS_16, pose) {
            TweenStep::Waiting => {}
            TweenStep::Running(p) => pose = p,
            TweenStep::Finished(p) => {
                pose = p;
                finished = true;
                break;
            }
        }
    }
    assert!(finished, "600ms+ of frames should finish a 100+500ms tween");
    assert_eq!(pose, target);
}

#[test]
fn opacity_fades_monotonically() {
    let mut tween = ActiveTween::new(
        Tween::to(NodeStyle::HIDDEN, Duration::from_millis(300)).easing(Easing::EaseOut),
    );
    let mut pose = NodeStyle::REST;
    let mut prev = pose.opacity;
    for _ in 0..30 {
        if let TweenStep::Running(p) | TweenStep::Finished(p) = tween.advance(MS_16, pose) {
            pose = p;
        }
        assert!(pose.opacity <= prev + 1e-12);
        prev = pose.opacity;
    }
    assert!(pose.is_invisible());
}

#[test]
fn cinematic_shaped_timeline() {
    let tl = SequenceTimeline::new()
        .then(Step::In, Duration::from_millis(1650))
        .then(Step::Pause, Duration::from_millis(600))
        .then(Step::Out, Duration::from_millis(1400));
    assert_eq!(tl.start_of(Step::Out), Some(Duration::from_millis(2250)));
    assert_eq!(tl.phase_at(Duration::from_millis(2000)), Some(Step::Pause));
    assert_eq!(tl.total(), Duration::from_millis(3650));
}

proptest! {
    #[test]
    fn phases_never_overlap(
        spans in proptest::collection::vec((0u64..2_000, 0u64..2_000), 1..12)
    ) {
        let mut tl = SequenceTimeline::new();
        for (i, (gap, dur)) in spans.iter().enumerate() {
            tl = tl.then_after(Duration::from_millis(*gap), i, Duration::from_millis(*dur));
        }
        for pair in tl.phases().windows(2) {
            prop_assert!(pair[1].start >= pair[0].end());
        }
        let expected: u64 = spans.iter().map(|(g, d)| g + d).sum();
        prop_assert_eq!(tl.total(), Duration::from_millis(expected));
    }

    #[test]
    fn every_easing_is_bounded_at_endpoints(t in 0.0f64..=1.0) {
        for easing in [Easing::Linear, Easing::EaseIn, Easing::EaseOut, Easing::EaseInOut,
                       Easing::EaseOutQuad, Easing::EaseOutExpo] {
            let v = easing.apply(t);
            prop_assert!((-1e-9..=1.0 + 1e-9).contains(&v));
        }
    }
}
