use super::*;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[test]
fn linear_fade_interpolates_and_settles() {
    let f = OpacityFade::new(0.0, 1.0, ms(100), ms(700), Ease::Linear);
    assert_eq!(f.sample(ms(0)), 0.0);
    assert_eq!(f.sample(ms(100)), 0.0);
    assert!((f.sample(ms(450)) - 0.5).abs() < 1e-6);
    assert!(!f.is_finished(ms(799)));
    assert!(f.is_finished(ms(800)));
    assert_eq!(f.sample(ms(800)), 1.0);
    assert_eq!(f.sample(ms(5_000)), 1.0);
}

#[test]
fn fade_out_reaches_exact_zero() {
    let f = OpacityFade::new(1.0, 0.0, ms(0), ms(700), Ease::InOutSine);
    assert_eq!(f.sample(ms(0)), 1.0);
    assert!(f.sample(ms(350)) > 0.0 && f.sample(ms(350)) < 1.0);
    assert_eq!(f.sample(ms(700)), 0.0);
}

#[test]
fn zero_duration_is_immediately_finished() {
    let f = OpacityFade::new(0.3, 1.0, ms(10), Duration::ZERO, Ease::Linear);
    assert!(f.is_finished(ms(10)));
    assert_eq!(f.progress(ms(0)), 1.0);
    assert_eq!(f.sample(ms(10)), 1.0);
}

#[test]
fn endpoints_are_clamped() {
    let f = OpacityFade::new(-2.0, 4.0, ms(0), ms(10), Ease::Linear);
    assert_eq!(f.from(), 0.0);
    assert_eq!(f.target(), 1.0);
}
