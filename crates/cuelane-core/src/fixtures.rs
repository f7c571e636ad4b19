use crate::{
    easing::Easing,
    model::{ChannelRef, DiscreteChannelSpec, Keyframe, Timeline},
};

pub const CAMERA_MOVE: usize = 0;
pub const CAMERA_ZOOM: usize = 1;
pub const CAMERA_ROTATE: usize = 2;
pub const CAMERA_SHAKE: usize = 3;
pub const THEME: usize = 4;
pub const BLOOM: usize = 5;

#[must_use]
pub fn demo_timeline() -> Timeline {
    let mut timeline = Timeline::new("Cuelane Demo");
    timeline.tracks = vec![
        vec![
            Keyframe::new(0.0, vec![0.0, 0.0]),
            Keyframe::new(2.0, vec![4.0, -2.0])
                .with_curve(Easing::OutSine)
                .relative(),
            Keyframe::new(4.0, vec![4.0, 2.0])
                .with_curve(Easing::InOutQuad)
                .relative(),
            Keyframe::new(8.0, vec![0.0, 0.0]).with_curve(Easing::OutBack),
        ],
        vec![
            Keyframe::new(0.0, vec![20.0]),
            Keyframe::new(3.0, vec![12.0]).with_curve(Easing::OutExpo),
            Keyframe::new(6.0, vec![30.0]).with_curve(Easing::InOutElastic),
        ],
        vec![
            Keyframe::new(0.0, vec![0.0]),
            Keyframe::new(1.0, vec![15.0]).with_curve(Easing::Instant).relative(),
            Keyframe::new(5.0, vec![-30.0]).with_curve(Easing::OutBounce).relative(),
        ],
        vec![
            Keyframe::new(0.0, vec![0.0]),
            Keyframe::new(4.0, vec![1.5]).with_curve(Easing::InCirc),
            Keyframe::new(4.5, vec![0.0]).with_curve(Easing::OutCirc),
        ],
        vec![
            Keyframe::new(0.0, vec![0.0]),
            Keyframe::new(4.0, vec![3.0]).with_curve(Easing::InOutSine),
            Keyframe::new(7.0, vec![1.0]),
        ],
        vec![
            Keyframe::new(0.0, vec![0.2, 0.0]),
            Keyframe::new(5.0, vec![0.8, 2.0]).with_curve(Easing::InQuad),
        ],
    ];
    timeline
}

/// Theme palette slot and bloom colour slot are selector channels.
#[must_use]
pub fn demo_discrete_spec() -> DiscreteChannelSpec {
    DiscreteChannelSpec::new([ChannelRef::new(THEME, 0), ChannelRef::new(BLOOM, 1)])
}
