use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use cuelane_core::{
    DiscreteChannelSpec, DispatchTable, Easing, Engine, Keyframe, ShakeConfig,
    fixtures::{demo_discrete_spec, demo_timeline},
};

type Dispatched = Rc<RefCell<BTreeMap<(usize, usize), f64>>>;

fn recording_engine(shape: &[usize], discrete: DiscreteChannelSpec) -> (Engine, Dispatched) {
    let dispatched: Dispatched = Rc::default();
    let mut table = DispatchTable::new();
    for (track, &channels) in shape.iter().enumerate() {
        for channel in 0..channels {
            let dispatched = Rc::clone(&dispatched);
            table.register(track, channel, move |value| {
                dispatched.borrow_mut().insert((track, channel), value);
            });
        }
    }
    let engine = Engine::new(table, discrete, ShakeConfig::default())
        .expect("engine construction should succeed");
    (engine, dispatched)
}

fn linear_track() -> Vec<Vec<Keyframe>> {
    vec![vec![
        Keyframe::new(0.0, vec![0.0]),
        Keyframe::new(10.0, vec![100.0]),
    ]]
}

#[test]
fn two_absolute_keyframes_interpolate_linearly() {
    let tracks = linear_track();
    let (engine, _) = recording_engine(&[1], DiscreteChannelSpec::default());

    assert_eq!(engine.sample(&tracks, 0, 0, 5.0), Some(50.0));
    assert_eq!(engine.sample(&tracks, 0, 0, 0.0), Some(0.0));
    assert_eq!(engine.sample(&tracks, 0, 0, 10.0), Some(100.0));
    assert_eq!(engine.sample(&tracks, 0, 0, 15.0), Some(100.0));
    assert_eq!(engine.sample(&tracks, 0, 0, -4.0), Some(0.0));
}

#[test]
fn relative_keyframes_carry_forward() {
    let tracks = vec![vec![
        Keyframe::new(0.0, vec![10.0]),
        Keyframe::new(5.0, vec![5.0]).relative(),
        Keyframe::new(10.0, vec![5.0]).relative(),
    ]];
    let (engine, _) = recording_engine(&[1], DiscreteChannelSpec::default());

    assert_eq!(engine.sample(&tracks, 0, 0, 10.0), Some(20.0));
    assert_eq!(engine.sample(&tracks, 0, 0, 5.0), Some(15.0));
    assert_eq!(engine.sample(&tracks, 0, 0, 7.5), Some(17.5));
    assert_eq!(engine.sample(&tracks, 0, 0, 2.5), Some(12.5));
}

#[test]
fn easing_shapes_the_blend() {
    let tracks = vec![vec![
        Keyframe::new(0.0, vec![0.0]),
        Keyframe::new(10.0, vec![100.0]).with_curve(Easing::Instant),
    ]];
    let (engine, _) = recording_engine(&[1], DiscreteChannelSpec::default());

    assert_eq!(engine.sample(&tracks, 0, 0, 9.9), Some(0.0));
    assert_eq!(engine.sample(&tracks, 0, 0, 10.0), Some(100.0));
}

#[test]
fn unsorted_tracks_evaluate_like_sorted_ones() {
    let sorted = vec![vec![
        Keyframe::new(0.0, vec![1.0, 10.0]),
        Keyframe::new(2.0, vec![3.0, 30.0]).relative(),
        Keyframe::new(4.0, vec![-2.0, 0.0]).with_curve(Easing::OutQuad),
    ]];
    let shuffled = vec![vec![
        sorted[0][2].clone(),
        sorted[0][0].clone(),
        sorted[0][1].clone(),
    ]];
    let (mut engine, dispatched) = recording_engine(&[2], DiscreteChannelSpec::default());

    for step in 0..50 {
        let time = f64::from(step) * 0.1;
        for channel in 0..2 {
            assert_eq!(
                engine.sample(&sorted, 0, channel, time),
                engine.sample(&shuffled, 0, channel, time),
                "channel {channel} at {time}"
            );
        }
        engine.advance(&shuffled, time);
        let from_shuffled = dispatched.borrow().clone();
        engine.advance(&sorted, time);
        assert_eq!(*dispatched.borrow(), from_shuffled);
    }
}

#[test]
fn advance_dispatches_exactly_what_sample_returns() {
    let timeline = demo_timeline();
    let shape = timeline.channel_shape();
    let (mut engine, dispatched) = recording_engine(&shape, demo_discrete_spec());

    for frame in 0..600_u32 {
        let time = f64::from(frame) / 60.0;
        engine.advance(&timeline, time);
        for (&(track, channel), &value) in dispatched.borrow().iter() {
            let sampled = engine
                .sample(&timeline, track, channel, time)
                .expect("dispatched channel should be sampleable");
            assert_eq!(sampled.to_bits(), value.to_bits(), "({track}, {channel}) at {time}");
        }
    }
}

#[test]
fn sample_is_idempotent_and_side_effect_free() {
    let timeline = demo_timeline();
    let (mut engine, dispatched) =
        recording_engine(&timeline.channel_shape(), demo_discrete_spec());

    engine.advance(&timeline, 3.0);
    let before = dispatched.borrow().clone();
    let selection_before = engine.selection(4, 0);

    let first = engine.sample(&timeline, 1, 0, 4.2);
    let second = engine.sample(&timeline, 1, 0, 4.2);
    let _ = engine.sample(&timeline, 4, 0, 6.5);
    assert_eq!(first, second);
    assert_eq!(*dispatched.borrow(), before, "sample must not call sinks");
    assert_eq!(engine.selection(4, 0), selection_before);
    assert_eq!(engine.last_time(), Some(3.0));
}

#[test]
fn short_and_absent_tracks_are_skipped() {
    let tracks = vec![vec![Keyframe::new(0.0, vec![7.0])]];
    let (mut engine, dispatched) = recording_engine(&[3, 1], DiscreteChannelSpec::default());

    engine.advance(&tracks, 1.0);

    let dispatched = dispatched.borrow();
    assert_eq!(dispatched.get(&(0, 0)), Some(&7.0));
    assert_eq!(dispatched.get(&(0, 1)), None);
    assert_eq!(dispatched.get(&(1, 0)), None);
    assert_eq!(engine.sample(&tracks, 5, 0, 1.0), None);
}
