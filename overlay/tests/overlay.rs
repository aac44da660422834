use std::time::Duration;

use neuropulse_core::{Command, Event, MetricSample, ReclaimResult, ReclaimStatus, FRAME_INTERVAL};
use neuropulse_overlay::{self as overlay, query, Overlay, StatusLine};

fn apply_all(overlay: &mut Overlay, commands: Vec<Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        overlay::apply(overlay, command, &mut events);
    }
    events
}

fn tick(overlay: &mut Overlay, millis: u64) -> Vec<Event> {
    apply_all(
        overlay,
        vec![Command::Tick {
            dt: Duration::from_millis(millis),
        }],
    )
}

fn count(events: &[Event], predicate: impl Fn(&Event) -> bool) -> usize {
    events.iter().filter(|event| predicate(event)).count()
}

#[test]
fn first_tick_requests_an_initial_sample() {
    let mut overlay = Overlay::default();
    let events = tick(&mut overlay, 0);
    assert_eq!(
        events,
        vec![
            Event::TimeAdvanced { dt: Duration::ZERO },
            Event::SampleDue
        ]
    );
}

#[test]
fn cadences_fire_at_their_own_periods() {
    let mut overlay = Overlay::default();
    let _ = tick(&mut overlay, 0);

    let mut frames = 0;
    let mut samples = 0;
    let mut waves = 0;
    for _ in 0..625 {
        let events = tick(&mut overlay, 16);
        frames += count(&events, |event| matches!(event, Event::FrameTick { .. }));
        samples += count(&events, |event| matches!(event, Event::SampleDue));
        waves += count(&events, |event| matches!(event, Event::WaveDue));
    }

    // 625 frames of 16ms cover exactly ten seconds.
    assert_eq!(frames, 333);
    assert_eq!(samples, 6);
    assert_eq!(waves, 2);
}

#[test]
fn frame_ticks_carry_the_fixed_period() {
    let mut overlay = Overlay::default();
    let events = tick(&mut overlay, 95);
    let frame_ticks: Vec<_> = events
        .iter()
        .filter(|event| matches!(event, Event::FrameTick { .. }))
        .collect();
    assert_eq!(frame_ticks.len(), 3);
    assert!(frame_ticks
        .iter()
        .all(|event| **event == Event::FrameTick { dt: FRAME_INTERVAL }));
}

#[test]
fn stalled_loop_replays_a_bounded_burst() {
    let mut overlay = Overlay::default();
    let events = tick(&mut overlay, 60_000);
    assert_eq!(
        count(&events, |event| matches!(event, Event::FrameTick { .. })),
        8
    );
    assert_eq!(count(&events, |event| matches!(event, Event::SampleDue)), 1);
    assert_eq!(count(&events, |event| matches!(event, Event::WaveDue)), 1);
}

#[test]
fn focus_changes_are_edge_triggered() {
    let mut overlay = Overlay::default();
    let events = apply_all(
        &mut overlay,
        vec![
            Command::SetFocus { focused: true },
            Command::SetFocus { focused: true },
            Command::SetFocus { focused: false },
        ],
    );
    assert_eq!(
        events,
        vec![
            Event::FocusChanged { focused: true },
            Event::FocusChanged { focused: false }
        ]
    );
    assert!(!query::is_focused(&overlay));
}

#[test]
fn optimize_requests_are_serialised_until_reported() {
    let mut overlay = Overlay::default();
    let events = apply_all(
        &mut overlay,
        vec![Command::RequestOptimize, Command::RequestOptimize],
    );
    assert_eq!(events, vec![Event::OptimizeRequested]);
    assert!(query::reclaim_in_flight(&overlay));

    let result = ReclaimResult::optimized(250.0, 210.0);
    let events = apply_all(
        &mut overlay,
        vec![Command::PublishReclaim { result }, Command::RequestOptimize],
    );
    assert_eq!(
        events,
        vec![Event::ReclaimReported { result }, Event::OptimizeRequested]
    );
}

#[test]
fn reclaim_message_persists_until_next_sample() {
    let mut overlay = Overlay::default();
    let sample = MetricSample::new(37.2, 61.8, Duration::ZERO);
    let _ = apply_all(&mut overlay, vec![Command::PublishSample { sample }]);
    assert_eq!(
        query::status(&overlay).lines(),
        vec!["CPU: 37.2%".to_owned(), "MEM: 61.8%".to_owned()]
    );

    let result = ReclaimResult::optimized(250.0, 210.0);
    let _ = apply_all(&mut overlay, vec![Command::PublishReclaim { result }]);
    assert_eq!(
        query::status(&overlay).lines(),
        vec!["✔ Optimized".to_owned(), "↓ 40.0 MB".to_owned()]
    );

    let _ = tick(&mut overlay, 100);
    assert_eq!(*query::status(&overlay), StatusLine::Reclaim(result));

    let _ = apply_all(&mut overlay, vec![Command::PublishSample { sample }]);
    assert_eq!(*query::status(&overlay), StatusLine::Metrics(sample));
}

#[test]
fn acknowledgement_reverts_after_its_window_for_every_status() {
    for result in [
        ReclaimResult::optimized(10.0, 9.0),
        ReclaimResult::unsupported(10.0),
        ReclaimResult::failed(10.0),
    ] {
        let mut overlay = Overlay::default();
        let _ = tick(&mut overlay, 0);
        let _ = apply_all(&mut overlay, vec![Command::PublishReclaim { result }]);
        assert_eq!(query::acknowledgement(&overlay), Some(result.status()));

        let events = tick(&mut overlay, 1_499);
        assert!(!events.contains(&Event::AcknowledgementExpired));
        let events = tick(&mut overlay, 1);
        assert!(events.contains(&Event::AcknowledgementExpired));
        assert_eq!(query::acknowledgement(&overlay), None);
    }
}

#[test]
fn repeated_reclaim_restarts_the_acknowledgement() {
    let mut overlay = Overlay::default();
    let _ = apply_all(
        &mut overlay,
        vec![Command::PublishReclaim {
            result: ReclaimResult::failed(1.0),
        }],
    );
    let _ = tick(&mut overlay, 1_000);
    let _ = apply_all(
        &mut overlay,
        vec![Command::PublishReclaim {
            result: ReclaimResult::unsupported(1.0),
        }],
    );
    let _ = tick(&mut overlay, 1_000);
    assert_eq!(
        query::acknowledgement(&overlay),
        Some(ReclaimStatus::Unsupported)
    );
}

#[test]
fn close_control_hides_after_three_seconds() {
    let mut overlay = Overlay::default();
    let _ = apply_all(&mut overlay, vec![Command::RevealCloseControl]);
    assert!(query::close_control_visible(&overlay));

    let _ = tick(&mut overlay, 2_000);
    let _ = apply_all(&mut overlay, vec![Command::RevealCloseControl]);
    let events = tick(&mut overlay, 2_000);
    assert!(!events.contains(&Event::CloseControlHidden), "reveal re-arms");

    let events = tick(&mut overlay, 1_000);
    assert!(events.contains(&Event::CloseControlHidden));
    assert!(!query::close_control_visible(&overlay));
}

#[test]
fn visibility_changes_are_reported_once() {
    let mut overlay = Overlay::default();
    let events = apply_all(
        &mut overlay,
        vec![
            Command::SetVisibility { visible: true },
            Command::SetVisibility { visible: false },
            Command::SetVisibility { visible: false },
        ],
    );
    assert_eq!(events, vec![Event::VisibilityChanged { visible: false }]);
    assert!(!query::is_visible(&overlay));
}
