use std::{
    collections::VecDeque,
    io,
    time::{Duration, Instant},
};

use approx::assert_abs_diff_eq;
use neuropulse_core::{Command, Event, ReclaimResult, ReclaimStatus};
use neuropulse_system_reclaim::{
    MemoryPlatform, ReclaimController, ReclaimError, ReclaimWorker, TrimOutcome,
};

#[derive(Clone, Copy, Debug)]
enum TrimScript {
    Succeed,
    Fail,
    Unsupported,
}

#[derive(Debug)]
struct FakePlatform {
    resident: VecDeque<Option<f64>>,
    trim: TrimScript,
    collections: usize,
    trims: usize,
}

impl FakePlatform {
    fn new(resident: Vec<Option<f64>>, trim: TrimScript) -> Self {
        Self {
            resident: resident.into(),
            trim,
            collections: 0,
            trims: 0,
        }
    }
}

impl MemoryPlatform for FakePlatform {
    fn resident_mb(&mut self) -> Result<f64, ReclaimError> {
        self.resident
            .pop_front()
            .flatten()
            .ok_or(ReclaimError::ResidentMemoryUnavailable)
    }

    fn request_collection(&mut self) {
        self.collections += 1;
    }

    fn trim_working_set(&mut self) -> TrimOutcome {
        self.trims += 1;
        match self.trim {
            TrimScript::Succeed => TrimOutcome::Trimmed,
            TrimScript::Fail => TrimOutcome::Failed(ReclaimError::Trim(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "access denied",
            ))),
            TrimScript::Unsupported => TrimOutcome::Unsupported,
        }
    }
}

#[test]
fn supported_trim_reports_savings() {
    let mut controller = ReclaimController::new(FakePlatform::new(
        vec![Some(250.0), Some(210.0)],
        TrimScript::Succeed,
    ));
    let result = controller.optimize();
    assert_eq!(result.status(), ReclaimStatus::Optimized);
    assert_eq!(result.before_mb(), 250.0);
    assert_eq!(result.after_mb(), Some(210.0));
    assert_eq!(result.saved_mb(), Some(40.0));
}

#[test]
fn growth_during_trim_is_reported_as_negative_savings() {
    let mut controller = ReclaimController::new(FakePlatform::new(
        vec![Some(100.0), Some(104.0)],
        TrimScript::Succeed,
    ));
    assert_eq!(controller.optimize().saved_mb(), Some(-4.0));
}

#[test]
fn unsupported_platform_runs_collection_only() {
    let mut platform = FakePlatform::new(vec![Some(250.0), Some(210.0)], TrimScript::Unsupported);
    let result = ReclaimController::new(&mut platform).optimize();
    assert_eq!(result.status(), ReclaimStatus::Unsupported);
    assert_eq!(result.saved_mb(), None);
    assert_eq!(platform.collections, 1);
    assert_eq!(platform.resident.len(), 1, "no after-measurement taken");
}

#[test]
fn failing_trim_reports_failure_without_after_measurement() {
    let mut platform = FakePlatform::new(vec![Some(250.0), Some(210.0)], TrimScript::Fail);
    let result = ReclaimController::new(&mut platform).optimize();
    assert_eq!(result.status(), ReclaimStatus::Failed);
    assert_eq!(result.after_mb(), None);
    assert_eq!(result.before_mb(), 250.0);
    assert_eq!(platform.collections, 1, "collection is always attempted");
}

#[test]
fn unreadable_resident_memory_fails_before_trimming() {
    let mut platform = FakePlatform::new(vec![None], TrimScript::Succeed);
    let result = ReclaimController::new(&mut platform).optimize();
    assert_eq!(result.status(), ReclaimStatus::Failed);
    assert_eq!(platform.trims, 0);
    assert_eq!(platform.collections, 1);
}

#[test]
fn repeated_pass_without_allocation_saves_nothing() {
    let mut controller = ReclaimController::new(FakePlatform::new(
        vec![Some(250.0), Some(210.0), Some(210.0), Some(209.99)],
        TrimScript::Succeed,
    ));
    let _ = controller.optimize();
    let second = controller.optimize();
    let saved = second.saved_mb().expect("second pass measured");
    assert_abs_diff_eq!(saved, 0.0, epsilon = 0.1);
}

#[test]
fn handle_answers_each_request() {
    let mut controller = ReclaimController::new(FakePlatform::new(
        vec![Some(80.0)],
        TrimScript::Unsupported,
    ));
    let mut commands = Vec::new();
    controller.handle(&[Event::SampleDue], &mut commands);
    assert!(commands.is_empty());

    controller.handle(&[Event::OptimizeRequested], &mut commands);
    assert_eq!(
        commands,
        vec![Command::PublishReclaim {
            result: ReclaimResult::unsupported(80.0)
        }]
    );
}

fn wait_for_result(worker: &mut ReclaimWorker) -> Vec<Command> {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut commands = Vec::new();
    while commands.is_empty() {
        assert!(Instant::now() < deadline, "worker did not report in time");
        worker.handle(&[], &mut commands);
        std::thread::sleep(Duration::from_millis(5));
    }
    commands
}

#[derive(Debug)]
struct PanickingPlatform;

impl MemoryPlatform for PanickingPlatform {
    fn resident_mb(&mut self) -> Result<f64, ReclaimError> {
        panic!("resident memory read crashed");
    }

    fn request_collection(&mut self) {}

    fn trim_working_set(&mut self) -> TrimOutcome {
        TrimOutcome::Unsupported
    }
}

#[test]
fn stopped_worker_answers_every_request_with_failure() {
    let mut worker =
        ReclaimWorker::spawn(ReclaimController::new(PanickingPlatform)).expect("spawn worker");

    for request in 0..4 {
        let mut commands = Vec::new();
        worker.handle(&[Event::OptimizeRequested], &mut commands);
        if commands.is_empty() {
            commands = wait_for_result(&mut worker);
        }
        assert_eq!(
            commands,
            vec![Command::PublishReclaim {
                result: ReclaimResult::failed(0.0)
            }],
            "request {request} was not answered"
        );
        assert!(!worker.is_in_flight());
    }
}

#[test]
fn worker_runs_one_pass_at_a_time() {
    let controller = ReclaimController::new(FakePlatform::new(
        vec![Some(250.0), Some(210.0), Some(200.0), Some(190.0)],
        TrimScript::Succeed,
    ));
    let mut worker = ReclaimWorker::spawn(controller).expect("spawn worker");

    let mut commands = Vec::new();
    worker.handle(
        &[Event::OptimizeRequested, Event::OptimizeRequested],
        &mut commands,
    );
    assert!(worker.is_in_flight() || !commands.is_empty());

    if commands.is_empty() {
        commands = wait_for_result(&mut worker);
    }
    assert_eq!(
        commands,
        vec![Command::PublishReclaim {
            result: ReclaimResult::optimized(250.0, 210.0)
        }]
    );
    assert!(!worker.is_in_flight());

    worker.handle(&[], &mut commands);
    assert_eq!(commands.len(), 1, "duplicate request was dropped");
}
