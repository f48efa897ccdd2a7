//! Catalog loading scenarios

use crate::*;
use std::path::Path;
use std::rc::Rc;

fn sol() -> Universe {
    let mut universe = Universe::new();
    universe.add_star("Sol");
    universe
}

fn load_with(universe: &mut Universe, config: CatalogConfig, json: &str) -> LoadReport {
    CatalogLoader::new(universe, config)
        .load_str(json, Path::new("."))
        .unwrap()
}

fn load(universe: &mut Universe, json: &str) -> LoadReport {
    load_with(universe, CatalogConfig::default(), json)
}

fn id(universe: &Universe, path: &str) -> BodyId {
    match universe.find_path(path) {
        Some(Selection::Body(id)) => id,
        other => panic!("{} resolved to {:?}", path, other),
    }
}

fn timeline<'a>(universe: &'a Universe, path: &str) -> &'a Timeline {
    universe.body(id(universe, path)).unwrap().timeline()
}

/// Build a timeline for a new planet of Sol without installing it
fn build(universe: &mut Universe, data: &str) -> CatalogResult<Timeline> {
    let data: Hash = serde_json::from_str(data).unwrap();
    let sol = universe.find_star("Sol").unwrap();
    let planets = universe.get_or_create_solar_system(sol).planets();
    let owner = universe.next_body_id();
    match create_timeline(universe, owner, planets, &data, Path::new("."), Disposition::Add)? {
        TimelineChange::Replace { timeline, .. } => Ok(timeline),
        TimelineChange::Unchanged => panic!("Add always produces a timeline"),
    }
}

const THREE_PHASES: &str = r#"{ "Timeline": [
    { "Ending": 2451000, "FixedPosition": [1, 0, 0] },
    { "Ending": 2452000, "FixedPosition": [2, 0, 0] },
    { "FixedPosition": [3, 0, 0] }
] }"#;

#[test]
fn test_phase_list_is_contiguous() {
    let mut universe = sol();
    let timeline = build(&mut universe, THREE_PHASES).unwrap();

    assert_eq!(timeline.phase_count(), 3);
    for pair in timeline.phases().windows(2) {
        assert_eq!(pair[0].end_time(), pair[1].start_time());
    }
    assert_eq!(timeline.start_time(), f64::NEG_INFINITY);
    assert_eq!(timeline.end_time(), f64::INFINITY);
}

#[test]
fn test_explicit_bounds_are_kept() {
    let mut universe = sol();
    let timeline = build(
        &mut universe,
        r#"{ "Timeline": [
            { "Beginning": 2450000, "Ending": 2451000, "FixedPosition": [1, 0, 0] },
            { "Ending": 2453000, "FixedPosition": [2, 0, 0] }
        ] }"#,
    )
    .unwrap();

    assert_eq!(timeline.start_time(), 2450000.0);
    assert_eq!(timeline.end_time(), 2453000.0);
}

#[test]
fn test_two_phase_scenario() {
    let mut universe = sol();
    let timeline = build(
        &mut universe,
        r#"{ "Timeline": [ { "Ending": 1000, "FixedPosition": [1, 0, 0] }, { "FixedPosition": [2, 0, 0] } ] }"#,
    )
    .unwrap();

    let first = timeline.phase(0).unwrap();
    let second = timeline.phase(1).unwrap();
    assert_eq!((first.start_time(), first.end_time()), (f64::NEG_INFINITY, 1000.0));
    assert_eq!((second.start_time(), second.end_time()), (1000.0, f64::INFINITY));
    // No rotation given: fixed orientation
    assert!(!first.rotation_model().is_periodic());

    let err = build(
        &mut universe,
        r#"{ "Timeline": [
            { "Ending": 1000, "FixedPosition": [1, 0, 0] },
            { "Beginning": 1000, "FixedPosition": [2, 0, 0] }
        ] }"#,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Phase { index: 2, ref source } if matches!(**source, CatalogError::BeginningNotAllowed)
    ));
}

#[test]
fn test_beginning_rejected_on_every_later_phase() {
    for index in 1..4 {
        let phases: Vec<String> = (0..4)
            .map(|i| {
                let beginning = if i == index { r#""Beginning": 0, "# } else { "" };
                let ending = if i < 3 { format!(r#""Ending": {}, "#, 100 * (i + 1)) } else { String::new() };
                format!(r#"{{ {}{}"FixedPosition": [1, 0, 0] }}"#, beginning, ending)
            })
            .collect();
        let data = format!(r#"{{ "Timeline": [ {} ] }}"#, phases.join(", "));

        let mut universe = sol();
        match build(&mut universe, &data) {
            Err(CatalogError::Phase { index: i, source }) => {
                assert_eq!(i, index + 1);
                assert!(matches!(*source, CatalogError::BeginningNotAllowed));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }
}

#[test]
fn test_ending_required_before_last_phase() {
    let mut universe = sol();
    let err = build(
        &mut universe,
        r#"{ "Timeline": [ { "FixedPosition": [1, 0, 0] }, { "FixedPosition": [2, 0, 0] } ] }"#,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Phase { index: 1, ref source } if matches!(**source, CatalogError::EndingRequired)
    ));
}

#[test]
fn test_malformed_phase_lists() {
    let mut universe = sol();
    assert!(matches!(build(&mut universe, r#"{ "Timeline": 5 }"#), Err(CatalogError::TimelineNotArray)));
    assert!(matches!(build(&mut universe, r#"{ "Timeline": [] }"#), Err(CatalogError::EmptyTimeline)));
    assert!(matches!(
        build(&mut universe, r#"{ "Timeline": [ { "Ending": 10, "FixedPosition": [1, 0, 0] }, 7 ] }"#),
        Err(CatalogError::PhaseNotGroup(2))
    ));
    assert!(matches!(
        build(&mut universe, r#"{ "Timeline": [ { "Ending": 10 } ] }"#),
        Err(CatalogError::Phase { index: 1, .. })
    ));
    assert!(matches!(
        build(&mut universe, r#"{ "Timeline": [ { "Beginning": 10, "Ending": 5, "FixedPosition": [1, 0, 0] } ] }"#),
        Err(CatalogError::Phase { index: 1, .. })
    ));
}

#[test]
fn test_add_with_star_centered_frame() {
    let mut universe = sol();
    let default_frame = universe.default_frame(Selection::Star(StarId(0))).unwrap();
    let timeline = build(
        &mut universe,
        r#"{
            "OrbitFrame": { "EquatorJ2000": { "Center": "Sol" } },
            "EllipticalOrbit": { "Period": 1.0, "SemiMajorAxis": 1.0 }
        }"#,
    )
    .unwrap();

    assert_eq!(timeline.phase_count(), 1);
    let phase = timeline.phase(0).unwrap();
    assert_eq!(phase.start_time(), f64::NEG_INFINITY);
    assert_eq!(phase.end_time(), f64::INFINITY);
    assert_eq!(phase.orbit_frame().kind_name(), "EquatorJ2000");
    assert_eq!(phase.orbit_frame().center(), Selection::Star(StarId(0)));
    assert!(!Rc::ptr_eq(phase.orbit_frame(), &default_frame));
    assert!(Rc::ptr_eq(phase.body_frame(), &default_frame));

    // One year around a star is 365.25 days, and rotation is synchronous
    assert!((phase.orbit().period() - 365.25).abs() < 1e-9);
    assert!(phase.rotation_model().is_periodic());
    assert!((phase.rotation_model().period() - 365.25).abs() < 1e-9);
}

#[test]
fn test_default_frame_is_shared_between_bodies() {
    let mut universe = sol();
    load(
        &mut universe,
        r#"[
            { "name": "Mercury", "parent": "Sol", "data": { "FixedPosition": [0.4, 0, 0] } },
            { "name": "Venus", "parent": "Sol", "data": { "FixedPosition": [0.7, 0, 0] } }
        ]"#,
    );

    let mercury = timeline(&universe, "Sol/Mercury").phase(0).unwrap();
    let venus = timeline(&universe, "Sol/Venus").phase(0).unwrap();
    assert!(Rc::ptr_eq(mercury.orbit_frame(), venus.orbit_frame()));
    assert!(Rc::ptr_eq(mercury.orbit_frame(), mercury.body_frame()));

    let children = universe.frame_tree(Selection::Star(StarId(0))).unwrap().children();
    assert_eq!(children.len(), 2);
}

#[test]
fn test_modify_rotation_only_keeps_the_rest() {
    let mut universe = sol();
    load(
        &mut universe,
        r#"[ { "name": "Earth", "parent": "Sol", "data": {
            "EllipticalOrbit": { "Period": 1.0, "SemiMajorAxis": 1.0 },
            "Beginning": 2440000, "Ending": 2460000 } } ]"#,
    );
    let before = timeline(&universe, "Sol/Earth").phase(0).unwrap().clone();

    let report = load(
        &mut universe,
        r#"[ { "disposition": "Modify", "name": "Earth", "parent": "Sol",
              "data": { "UniformRotation": { "Period": 23.93 } } } ]"#,
    );
    assert_eq!(report.loaded, 1);

    let after = timeline(&universe, "Sol/Earth");
    assert_eq!(after.phase_count(), 1);
    let phase = after.phase(0).unwrap();
    assert!(Rc::ptr_eq(phase.orbit(), before.orbit()));
    assert!(Rc::ptr_eq(phase.orbit_frame(), before.orbit_frame()));
    assert!(Rc::ptr_eq(phase.body_frame(), before.body_frame()));
    assert_eq!(phase.start_time(), before.start_time());
    assert_eq!(phase.end_time(), before.end_time());
    assert!(!Rc::ptr_eq(phase.rotation_model(), before.rotation_model()));
    assert!((phase.rotation_model().period() - 23.93 / 24.0).abs() < 1e-12);
}

#[test]
fn test_modify_without_timeline_fields_keeps_multi_phase_timeline() {
    let mut universe = sol();
    load(
        &mut universe,
        &format!(r#"[ {{ "name": "Pioneer", "parent": "Sol", "data": {} }} ]"#, THREE_PHASES),
    );
    let before: Vec<_> = timeline(&universe, "Sol/Pioneer").phases().to_vec();

    let report = load(
        &mut universe,
        r#"[ { "disposition": "Modify", "name": "Pioneer", "parent": "Sol", "data": { "Radius": 0.005 } } ]"#,
    );
    assert_eq!(report, LoadReport { loaded: 1, failed: 0, skipped: 0 });

    let after = timeline(&universe, "Sol/Pioneer");
    assert_eq!(after.phase_count(), 3);
    for (old, new) in before.iter().zip(after.phases()) {
        assert_eq!(old.start_time(), new.start_time());
        assert_eq!(old.end_time(), new.end_time());
        assert!(Rc::ptr_eq(old.orbit(), new.orbit()));
    }
    // Properties still apply
    assert_eq!(universe.body(id(&universe, "Sol/Pioneer")).unwrap().radius(), 0.005);
}

#[test]
fn test_modify_multi_phase_with_rotation_only_fails() {
    let mut universe = sol();
    load(
        &mut universe,
        &format!(r#"[ {{ "name": "Pioneer", "parent": "Sol", "data": {} }} ]"#, THREE_PHASES),
    );

    let report = load(
        &mut universe,
        r#"[ { "disposition": "Modify", "name": "Pioneer", "parent": "Sol", "data": { "RotationPeriod": 10 } } ]"#,
    );
    assert_eq!(report.failed, 1);
    assert_eq!(timeline(&universe, "Sol/Pioneer").phase_count(), 3);
}

#[test]
fn test_modify_or_replace_missing_object_adds() {
    let mut universe = sol();
    let report = load(
        &mut universe,
        r#"[
            { "disposition": "Modify", "name": "Ceres", "parent": "Sol", "data": { "FixedPosition": [2.8, 0, 0] } },
            { "disposition": "Replace", "name": "Vesta", "parent": "Sol", "data": { "FixedPosition": [2.4, 0, 0] } }
        ]"#,
    );
    assert_eq!(report.loaded, 2);
    assert_eq!(universe.body_count(), 2);
    assert_eq!(timeline(&universe, "Sol/Ceres").phase_count(), 1);
}

#[test]
fn test_replace_keeps_body_id() {
    let mut universe = sol();
    load(
        &mut universe,
        r#"[
            { "name": "Earth", "parent": "Sol", "data": { "FixedPosition": [1, 0, 0], "Radius": 6378 } },
            { "name": "Moon", "parent": "Sol/Earth", "data": { "FixedPosition": [384400, 0, 0] } }
        ]"#,
    );
    let earth = id(&universe, "Sol/Earth");
    let moon = id(&universe, "Sol/Earth/Moon");

    load(
        &mut universe,
        r#"[ { "disposition": "Replace", "name": "Earth", "parent": "Sol", "data": { "FixedPosition": [1.5, 0, 0] } } ]"#,
    );

    assert_eq!(id(&universe, "Sol/Earth"), earth);
    assert_eq!(id(&universe, "Sol/Earth/Moon"), moon);
    let body = universe.body(earth).unwrap();
    // Replace starts from scratch
    assert_eq!(body.radius(), 1.0);
    let tree = universe.frame_tree(Selection::Body(earth)).unwrap();
    assert_eq!(tree.children(), &[moon]);
}

#[test]
fn test_duplicate_add_appends() {
    let mut universe = sol();
    let report = load(
        &mut universe,
        r#"[
            { "name": "Io", "parent": "Sol", "data": { "FixedPosition": [5, 0, 0] } },
            { "name": "Io", "parent": "Sol", "data": { "FixedPosition": [6, 0, 0] } }
        ]"#,
    );
    assert_eq!(report.loaded, 2);
    assert_eq!(universe.body_count(), 2);
}

#[test]
fn test_failed_entry_does_not_stop_load() {
    let mut universe = sol();
    let report = load(
        &mut universe,
        r#"[
            { "name": "Nothing", "parent": "Sol", "data": { "Radius": 10 } },
            { "name": "Bad", "parent": "Sol", "data": { "OrbitFrame": { "BodyFixed": { "Center": "Sol/Vulcan" } },
                "FixedPosition": [1, 0, 0] } },
            { "name": "Mars", "parent": "Sol", "data": { "FixedPosition": [1.5, 0, 0] } }
        ]"#,
    );
    assert_eq!(report, LoadReport { loaded: 1, failed: 2, skipped: 0 });
    assert!(universe.find_path("Sol/Nothing").is_none());
    assert!(universe.find_path("Sol/Mars").is_some());
}

#[test]
fn test_frame_center_in_other_star_system() {
    let mut universe = sol();
    universe.add_star("Alpha Centauri");
    let err = build(
        &mut universe,
        r#"{ "BodyFrame": { "EclipticJ2000": { "Center": "Alpha Centauri" } }, "FixedPosition": [1, 0, 0] }"#,
    )
    .unwrap_err();
    assert!(matches!(err, CatalogError::FrameOutsideSystem { role: FrameRole::Body }));
}

#[test]
fn test_every_frame_object_must_be_in_system() {
    let mut universe = sol();
    universe.add_star("Alpha Centauri");
    load(&mut universe, r#"[ { "name": "Earth", "parent": "Sol", "data": { "FixedPosition": [1, 0, 0] } } ]"#);

    for frame in [
        r#"{ "MeanEquator": { "Center": "Sol/Earth", "Object": "Alpha Centauri" } }"#,
        r#"{ "OrbitSynchronized": { "Center": "Sol", "Target": "Alpha Centauri" } }"#,
        r#"{ "TwoVector": { "Center": "Sol",
            "Primary": { "Axis": "x", "RelativePosition": { "Target": "Alpha Centauri" } },
            "Secondary": { "Axis": "z", "ConstantVector": { "Vector": [0, 0, 1] } } } }"#,
        r#"{ "TwoVector": { "Center": "Sol",
            "Primary": { "Axis": "x", "RelativePosition": { "Target": "Sol/Earth" } },
            "Secondary": { "Axis": "z", "ConstantVector": { "Vector": [0, 0, 1],
                "Frame": { "EclipticJ2000": { "Center": "Alpha Centauri" } } } } } }"#,
    ] {
        let data = format!(r#"{{ "OrbitFrame": {}, "FixedPosition": [1, 0, 0] }}"#, frame);
        let err = build(&mut universe, &data).unwrap_err();
        assert!(matches!(err, CatalogError::FrameOutsideSystem { role: FrameRole::Orbit }), "{}", frame);
    }

    let inside = r#"{ "OrbitFrame": { "MeanEquator": { "Center": "Sol", "Object": "Sol/Earth" } },
        "FixedPosition": [1, 0, 0] }"#;
    assert!(build(&mut universe, inside).is_ok());
}

#[test]
fn test_orbit_units_follow_each_phase_frame() {
    let mut universe = sol();
    load(&mut universe, r#"[ { "name": "Earth", "parent": "Sol", "data": { "FixedPosition": [1, 0, 0] } } ]"#);

    let timeline = build(
        &mut universe,
        r#"{ "Timeline": [
            { "Ending": 2451000, "EllipticalOrbit": { "Period": 1, "SemiMajorAxis": 1 } },
            { "OrbitFrame": { "EclipticJ2000": { "Center": "Sol/Earth" } },
              "EllipticalOrbit": { "Period": 27.32, "SemiMajorAxis": 384400 } }
        ] }"#,
    )
    .unwrap();

    let cruise = timeline.phase(0).unwrap();
    assert!(cruise.orbit_frame().center().is_star());
    assert!((cruise.orbit().period() - 365.25).abs() < 1e-9);
    assert!((cruise.orbit().bounding_radius() - 149_597_870.7).abs() < 1e-3);

    let captured = timeline.phase(1).unwrap();
    assert_eq!(captured.orbit_frame().center(), Selection::Body(id(&universe, "Sol/Earth")));
    assert!((captured.orbit().period() - 27.32).abs() < 1e-12);
    assert!((captured.orbit().bounding_radius() - 384400.0).abs() < 1e-6);
}

#[test]
fn test_malformed_frame_in_later_phase() {
    let mut universe = sol();
    let err = build(
        &mut universe,
        r#"{ "Timeline": [
            { "Ending": 2451000, "FixedPosition": [1, 0, 0] },
            { "OrbitFrame": { "Galactic": { "Center": "Sol" } }, "FixedPosition": [2, 0, 0] }
        ] }"#,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Phase { index: 2, ref source } if matches!(**source, CatalogError::InvalidFrame(_))
    ));
}

const CHAIN: &str = r#"[
    { "name": "A", "parent": "Sol", "data": { "FixedPosition": [1, 0, 0] } },
    { "name": "B", "parent": "Sol", "data": {
        "OrbitFrame": { "EclipticJ2000": { "Center": "Sol/A" } }, "FixedPosition": [1000, 0, 0] } },
    { "name": "C", "parent": "Sol", "data": {
        "OrbitFrame": { "EclipticJ2000": { "Center": "Sol/B" } }, "FixedPosition": [1000, 0, 0] } }
]"#;

const CLOSE_LOOP: &str = r#"[
    { "disposition": "Modify", "name": "A", "parent": "Sol",
      "data": { "OrbitFrame": { "EclipticJ2000": { "Center": "Sol/C" } } } }
]"#;

#[test]
fn test_circular_frames_rejected_before_install() {
    let mut universe = sol();
    assert_eq!(load(&mut universe, CHAIN).loaded, 3);

    let a = id(&universe, "Sol/A");
    let report = load(&mut universe, CLOSE_LOOP);
    assert_eq!(report.failed, 1);

    let phase = universe.body(a).unwrap().timeline().phase(0).unwrap();
    assert_eq!(phase.orbit_frame().center(), Selection::Star(StarId(0)));
    assert!(!phase.orbit_frame().is_circular(&universe, 50, FrameType::Position));
}

#[test]
fn test_circular_frames_installed_then_reported() {
    let mut universe = sol();
    let config = CatalogConfig { frame_check: FrameCheckOrder::InstallThenCheck, ..Default::default() };
    load_with(&mut universe, config.clone(), CHAIN);

    let a = id(&universe, "Sol/A");
    let c = id(&universe, "Sol/C");
    let report = load_with(&mut universe, config, CLOSE_LOOP);
    assert_eq!(report.failed, 1);

    let frame = universe.body(a).unwrap().timeline().phase(0).unwrap().orbit_frame().clone();
    assert_eq!(frame.center(), Selection::Body(c));
    assert!(frame.is_circular(&universe, 50, FrameType::Position));
}

#[test]
fn test_oversized_depth_limit_is_clamped() {
    let mut universe = sol();
    let config = CatalogConfig { max_frame_depth: 20_000, ..Default::default() };
    assert_eq!(CatalogLoader::new(&mut universe, config.clone()).config().max_frame_depth, MAX_FRAME_DEPTH_LIMIT);

    assert_eq!(load_with(&mut universe, config.clone(), CHAIN).loaded, 3);
    let report = load_with(&mut universe, config, CLOSE_LOOP);
    assert_eq!(report.failed, 1);

    let a = id(&universe, "Sol/A");
    let phase = universe.body(a).unwrap().timeline().phase(0).unwrap();
    assert!(phase.orbit_frame().center().is_star());
}

#[test]
fn test_circular_body_frame_reported_with_role() {
    let mut universe = sol();
    load(&mut universe, r#"[ { "name": "A", "parent": "Sol", "data": { "FixedPosition": [1, 0, 0] } } ]"#);
    let a = id(&universe, "Sol/A");

    let data: Hash = serde_json::from_str(
        r#"{ "BodyFrame": { "BodyFixed": { "Center": "Sol/A" } }, "FixedPosition": [1, 0, 0] }"#,
    )
    .unwrap();
    let system = universe.body(a).unwrap().system();
    let TimelineChange::Replace { timeline, new_frames } =
        create_timeline(&mut universe, a, system, &data, Path::new("."), Disposition::Modify).unwrap()
    else {
        panic!("expected a new timeline");
    };

    let pending = PendingTimeline { universe: &universe, body: a, timeline: &timeline };
    let err = check_frames(&pending, &new_frames, 50).unwrap_err();
    assert!(matches!(err, CatalogError::CircularFrame { role: FrameRole::Body }));
    assert_eq!(err.to_string(), "Body frame is nested too deep (probably circular)");
}

#[test]
fn test_satellite_orbits_in_km() {
    let mut universe = sol();
    load(
        &mut universe,
        r#"[
            { "name": "Earth", "parent": "Sol", "data": { "FixedPosition": [1, 0, 0] } },
            { "name": "Moon", "parent": "Sol/Earth", "data": {
                "EllipticalOrbit": { "Period": 27.32, "SemiMajorAxis": 384400 } } }
        ]"#,
    );

    let earth = universe.body(id(&universe, "Sol/Earth")).unwrap();
    assert!((earth.position_at(0.0).unwrap().x - 149_597_870.7).abs() < 1e-3);

    let moon = universe.body(id(&universe, "Sol/Earth/Moon")).unwrap();
    let phase = moon.timeline().phase(0).unwrap();
    assert_eq!(phase.orbit_frame().center(), Selection::Body(id(&universe, "Sol/Earth")));
    assert!((phase.orbit().period() - 27.32).abs() < 1e-12);
    assert!((moon.position_at(2451545.0).unwrap().norm() - 384400.0).abs() < 1e-3);
    assert_eq!(moon.classification, Classification::Moon);
}

#[test]
fn test_load_file_resolves_relative_paths() {
    let dir = std::env::temp_dir().join(format!("universe-catalog-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("pioneer.json"),
        r#"[ { "start": 0, "end": 10, "coeffs_x": [5], "coeffs_y": [0], "coeffs_z": [0] } ]"#,
    )
    .unwrap();
    let catalog = dir.join("catalog.json");
    std::fs::write(
        &catalog,
        r#"[ { "name": "Pioneer", "parent": "Sol", "data": {
            "ChebyshevTrajectory": { "Source": "pioneer.json" }, "InfoURL": "pioneer.html" } } ]"#,
    )
    .unwrap();

    let mut universe = sol();
    let report = CatalogLoader::new(&mut universe, CatalogConfig::default())
        .load_file(&catalog)
        .unwrap();
    assert_eq!(report.loaded, 1);

    let pioneer = universe.body(id(&universe, "Sol/Pioneer")).unwrap();
    assert_eq!(pioneer.position_at(5.0).unwrap().x, 5.0);
    assert_eq!(pioneer.info_url.as_deref(), dir.join("pioneer.html").to_str());

    std::fs::remove_dir_all(&dir).unwrap();
}
