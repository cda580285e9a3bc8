use super::*;
use std::{sync::Arc, time::Instant};

struct Upper;

impl Minifier for Upper {
    fn minify(&mut self, svg: &str) -> TraitforgeResult<String> {
        Ok(svg.to_uppercase())
    }
}

struct Failing;

impl Minifier for Failing {
    fn minify(&mut self, _svg: &str) -> TraitforgeResult<String> {
        Err(TraitforgeError::validation("nope"))
    }
}

struct Slow(Duration);

impl Minifier for Slow {
    fn minify(&mut self, svg: &str) -> TraitforgeResult<String> {
        std::thread::sleep(self.0);
        Ok(svg.to_owned())
    }
}

struct Panicking;

impl Minifier for Panicking {
    fn minify(&mut self, _svg: &str) -> TraitforgeResult<String> {
        panic!("boom");
    }
}

const SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10" viewBox="0 0 10 10"><!-- note --><rect width="10" height="10" fill="#ff0000"/></svg>"##;

#[test]
fn optimizes_and_assigns_fresh_ids() {
    let handle = OptimizerHandle::spawn(Upper, Duration::from_secs(5)).unwrap();
    let a = handle.optimize("abc");
    let b = handle.optimize("def");
    assert_eq!(a.status, OptimizeStatus::Optimized);
    assert_eq!(a.text, "ABC");
    assert_eq!(b.text, "DEF");
    assert_ne!(a.id, b.id);
}

#[test]
fn errors_fall_back_to_input() {
    let handle = OptimizerHandle::spawn(Failing, Duration::from_secs(5)).unwrap();
    let out = handle.optimize("keep me");
    assert_eq!(out.text, "keep me");
    assert!(matches!(out.status, OptimizeStatus::Failed(_)));
}

#[test]
fn panics_fall_back_and_worker_survives() {
    let handle = OptimizerHandle::spawn(Panicking, Duration::from_secs(5)).unwrap();
    for _ in 0..2 {
        let out = handle.optimize("x");
        assert_eq!(out.text, "x");
        assert!(matches!(out.status, OptimizeStatus::Failed(_)));
    }
}

#[test]
fn slow_worker_times_out() {
    let handle =
        OptimizerHandle::spawn(Slow(Duration::from_millis(300)), Duration::from_millis(20)).unwrap();
    let out = handle.optimize("late");
    assert_eq!(out.status, OptimizeStatus::TimedOut);
    assert_eq!(out.text, "late");
}

#[test]
fn dropping_handle_does_not_wait_for_stuck_minify() {
    let handle =
        OptimizerHandle::spawn(Slow(Duration::from_secs(4)), Duration::from_millis(20)).unwrap();
    assert_eq!(handle.optimize("stuck").status, OptimizeStatus::TimedOut);

    let started = Instant::now();
    drop(handle);
    assert!(started.elapsed() < Duration::from_secs(1), "{:?}", started.elapsed());
}

#[test]
fn concurrent_callers_get_their_own_responses() {
    let handle = Arc::new(OptimizerHandle::spawn(Upper, Duration::from_secs(5)).unwrap());
    let threads: Vec<_> = (0..8)
        .map(|i| {
            let h = Arc::clone(&handle);
            std::thread::spawn(move || {
                let input = format!("caller-{i}");
                let out = h.optimize(&input);
                assert_eq!(out.status, OptimizeStatus::Optimized);
                assert_eq!(out.text, input.to_uppercase());
                out.id
            })
        })
        .collect();
    let mut ids: Vec<u64> = threads.into_iter().map(|t| t.join().unwrap()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 8);
}

#[test]
fn mismatched_and_missing_responses_are_rejected() {
    let other = Response {
        id: 9,
        result: Ok("x".to_owned()),
    };
    assert_eq!(settle(3, Ok(other)), Err(OptimizeStatus::Mismatched));
    assert_eq!(
        settle(3, Err(RecvTimeoutError::Disconnected)),
        Err(OptimizeStatus::Unavailable)
    );
    let ok = Response {
        id: 3,
        result: Ok("y".to_owned()),
    };
    assert_eq!(settle(3, Ok(ok)), Ok("y".to_owned()));
}

#[test]
fn usvg_minifier_drops_comments() {
    let mut m = UsvgMinifier;
    let out = m.minify(SVG).unwrap();
    assert!(!out.contains("note"));
    assert!(out.contains("<svg"));
    assert!(m.minify("not svg").is_err());

    let handle = OptimizerHandle::spawn_default(Duration::from_secs(5)).unwrap();
    let result = handle.optimize(SVG);
    assert_eq!(result.status, OptimizeStatus::Optimized);
}
