use cuelane_core::{
    fixtures::demo_timeline,
    persistence::{load_timeline, save_timeline},
};
use proptest::prelude::*;

fn no_panic_load(path: &std::path::Path) -> bool {
    std::panic::catch_unwind(|| {
        let _ = load_timeline(path);
    })
    .is_ok()
}

#[test]
fn saved_timeline_loads_back_unchanged() {
    let temp = tempfile::tempdir().expect("tempdir should be creatable");
    let path = temp.path().join("nested").join("demo.cuelane.json");
    let timeline = demo_timeline();

    save_timeline(&path, &timeline).expect("saving fixture timeline should work");
    let loaded = load_timeline(&path).expect("loading saved timeline should work");
    assert_eq!(loaded, timeline);
}

#[test]
fn keyframe_defaults_fill_missing_fields() {
    let temp = tempfile::tempdir().expect("tempdir should be creatable");
    let path = temp.path().join("minimal.cuelane.json");
    std::fs::write(
        &path,
        r#"{ "title": "minimal", "tracks": [[{ "time": 1.5, "values": [2.0] }]] }"#,
    )
    .expect("writing minimal timeline should work");

    let timeline = load_timeline(&path).expect("minimal timeline should parse");
    let keyframe = &timeline.tracks[0][0];
    assert_eq!(keyframe.curve, cuelane_core::Easing::Linear);
    assert!(!keyframe.relative);
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn random_timeline_bytes_do_not_panic(raw in prop::collection::vec(any::<u8>(), 0..4096)) {
        let temp = tempfile::tempdir().expect("tempdir should be creatable");
        let path = temp.path().join("corrupt_random.cuelane.json");
        std::fs::write(&path, raw).expect("writing random payload should work");
        prop_assert!(no_panic_load(&path));
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn mutated_timeline_payloads_do_not_panic(index in 0usize..8192usize, delta in any::<u8>()) {
        let temp = tempfile::tempdir().expect("tempdir should be creatable");
        let path = temp.path().join("corrupt_mutated.cuelane.json");
        save_timeline(&path, &demo_timeline()).expect("saving fixture timeline should work");

        let mut payload = std::fs::read(&path).expect("reading saved timeline should work");
        if !payload.is_empty() {
            let target = index % payload.len();
            payload[target] ^= delta.max(1);
        }
        std::fs::write(&path, payload).expect("writing mutated payload should work");

        prop_assert!(no_panic_load(&path));
    }
}
