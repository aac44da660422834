use std::collections::VecDeque;

use neuropulse_core::{Command, Event};
use neuropulse_system_sampler::{MetricsSource, Readings, Sampler, SamplingError};

#[derive(Debug, Default)]
struct ScriptedSource {
    script: VecDeque<Result<Readings, SamplingError>>,
}

impl ScriptedSource {
    fn new(script: Vec<Result<Readings, SamplingError>>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

impl MetricsSource for ScriptedSource {
    fn read(&mut self) -> Result<Readings, SamplingError> {
        self.script
            .pop_front()
            .unwrap_or_else(|| Err(SamplingError::Unavailable("script exhausted".to_owned())))
    }
}

fn readings(cpu_percent: f32, mem_percent: f32) -> Result<Readings, SamplingError> {
    Ok(Readings {
        cpu_percent,
        mem_percent,
    })
}

#[test]
fn sample_renders_with_one_decimal_place() {
    let mut sampler = Sampler::new(ScriptedSource::new(vec![readings(37.2, 61.8)]));
    let sample = sampler.sample();
    assert_eq!(sample.cpu_label(), "CPU: 37.2%");
    assert_eq!(sample.mem_label(), "MEM: 61.8%");
    assert_eq!(sampler.last(), Some(sample));
}

#[test]
fn failed_read_republishes_previous_sample() {
    let mut sampler = Sampler::new(ScriptedSource::new(vec![
        readings(12.5, 40.0),
        Err(SamplingError::Unavailable("counter missing".to_owned())),
    ]));
    let first = sampler.sample();
    let second = sampler.sample();
    assert_eq!(second, first);
}

#[test]
fn failure_before_any_sample_yields_zeroed_reading() {
    let mut sampler = Sampler::new(ScriptedSource::new(Vec::new()));
    let sample = sampler.sample();
    assert_eq!(sample.cpu_percent(), 0.0);
    assert_eq!(sample.mem_percent(), 0.0);
}

#[test]
fn out_of_range_readings_are_clamped() {
    let mut sampler = Sampler::new(ScriptedSource::new(vec![readings(104.0, -1.0)]));
    let sample = sampler.sample();
    assert_eq!(sample.cpu_percent(), 100.0);
    assert_eq!(sample.mem_percent(), 0.0);
}

#[test]
fn handle_publishes_once_per_batch_with_due_ticks() {
    let mut sampler = Sampler::new(ScriptedSource::new(vec![
        readings(1.0, 2.0),
        readings(3.0, 4.0),
    ]));
    let mut commands = Vec::new();

    sampler.handle(&[Event::WaveDue, Event::AcknowledgementExpired], &mut commands);
    assert!(commands.is_empty(), "no sampling without a due tick");

    sampler.handle(&[Event::SampleDue, Event::SampleDue], &mut commands);
    assert_eq!(commands.len(), 1, "overdue ticks collapse into one read");
    match &commands[0] {
        Command::PublishSample { sample } => assert_eq!(sample.cpu_label(), "CPU: 1.0%"),
        other => panic!("unexpected command emitted: {other:?}"),
    }
}
