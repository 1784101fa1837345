//! AR viewer behaviour driven through a scripted XR frame host

use devices::{InputEvent, Viewport};
use glam::{Mat4, Quat, Vec2, Vec3};
use viewer::{
    Aabb, ArViewer, Camera, FrameReport, LoadedModel, MeshId, Scene, ViewerConfig, ViewerPose,
    XrFrameHost,
};

const VIEWPORT: Viewport = Viewport {
    width: 400.0,
    height: 800.0,
};

/// Records the calls a frame makes, in order
#[derive(Default)]
struct ScriptedHost {
    pose: Option<ViewerPose>,
    hits: Vec<Mat4>,
    calls: Vec<&'static str>,
    rendered_nodes: usize,
}

impl ScriptedHost {
    fn with_pose() -> Self {
        Self {
            pose: Some(ViewerPose {
                transform: Mat4::from_translation(Vec3::new(0.0, 1.5, 0.0)),
                projection: Mat4::perspective_rh_gl(1.0, 0.5, 0.1, 100.0),
            }),
            ..Default::default()
        }
    }

    fn hit_at(mut self, position: Vec3) -> Self {
        self.hits = vec![Mat4::from_translation(position)];
        self
    }
}

impl XrFrameHost for ScriptedHost {
    fn request_next_frame(&mut self) {
        self.calls.push("request_next_frame");
    }

    fn bind_target_surface(&mut self) {
        self.calls.push("bind_target_surface");
    }

    fn viewer_pose(&mut self) -> Option<ViewerPose> {
        self.calls.push("viewer_pose");
        self.pose
    }

    fn hit_test_results(&mut self) -> Vec<Mat4> {
        self.calls.push("hit_test_results");
        self.hits.clone()
    }

    fn render(&mut self, scene: &Scene, _camera: &Camera) {
        self.calls.push("render");
        self.rendered_nodes = scene.renderable().count();
    }
}

fn viewer_with_model() -> ArViewer {
    let mut viewer = ArViewer::new(ViewerConfig::ar(), VIEWPORT);
    viewer.begin_load("chair.glb");
    viewer.on_model_loaded(Ok(LoadedModel {
        mesh: MeshId(3),
        bounds: Aabb::new(Vec3::new(0.0, 1.0, -1.0), Vec3::new(2.0, 3.0, 1.0)),
    }));
    viewer
}

#[test]
fn test_loaded_object_is_held_out_of_scene() {
    let mut viewer = viewer_with_model();
    viewer.start_session();

    let object = viewer.object().expect("object handle");
    assert!(!viewer.scene().contains(object));
    assert!(viewer.scene().contains(viewer.reticle()));
}

#[test]
fn test_frame_steps_run_in_order() {
    let mut viewer = viewer_with_model();
    viewer.start_session();

    let mut host = ScriptedHost::with_pose().hit_at(Vec3::new(0.0, 0.0, -1.0));
    let report = viewer.on_xr_frame(&mut host);

    assert_eq!(report, FrameReport::Rendered { stabilized_now: true });
    assert_eq!(
        host.calls,
        vec![
            "request_next_frame",
            "bind_target_surface",
            "viewer_pose",
            "hit_test_results",
            "render",
        ]
    );
}

#[test]
fn test_missing_pose_only_rearms() {
    let mut viewer = viewer_with_model();
    viewer.start_session();

    let mut host = ScriptedHost::default();
    let report = viewer.on_xr_frame(&mut host);

    assert_eq!(report, FrameReport::NoPose);
    assert_eq!(
        host.calls,
        vec!["request_next_frame", "bind_target_surface", "viewer_pose"]
    );
    assert!(!viewer.session().unwrap().stabilized);
}

#[test]
fn test_no_session_halts_loop() {
    let mut viewer = viewer_with_model();
    let mut host = ScriptedHost::with_pose();

    assert_eq!(viewer.on_xr_frame(&mut host), FrameReport::Halted);
    assert!(host.calls.is_empty());

    viewer.start_session();
    viewer.end_session();
    assert_eq!(viewer.on_xr_frame(&mut host), FrameReport::Halted);
    assert!(host.calls.is_empty());
}

#[test]
fn test_pose_is_copied_into_camera_verbatim() {
    let mut viewer = viewer_with_model();
    viewer.start_session();

    let transform = Mat4::from_rotation_translation(
        Quat::from_rotation_y(0.7),
        Vec3::new(0.2, 1.4, 0.3),
    );
    let projection = Mat4::perspective_rh_gl(0.9, 0.6, 0.05, 50.0);
    let mut host = ScriptedHost {
        pose: Some(ViewerPose {
            transform,
            projection,
        }),
        ..Default::default()
    };
    viewer.on_xr_frame(&mut host);

    assert!(viewer.camera().world_matrix().abs_diff_eq(transform, 1e-5));
    assert_eq!(viewer.camera().projection_matrix(), projection);
}

#[test]
fn test_stabilization_latches_once() {
    let mut viewer = viewer_with_model();
    viewer.start_session();

    let mut first = ScriptedHost::with_pose().hit_at(Vec3::new(0.0, 0.0, -1.0));
    assert_eq!(
        viewer.on_xr_frame(&mut first),
        FrameReport::Rendered { stabilized_now: true }
    );

    // Losing the surface does not un-latch
    let mut empty = ScriptedHost::with_pose();
    assert_eq!(
        viewer.on_xr_frame(&mut empty),
        FrameReport::Rendered {
            stabilized_now: false
        }
    );
    assert!(viewer.session().unwrap().stabilized);

    let mut again = ScriptedHost::with_pose().hit_at(Vec3::new(1.0, 0.0, -1.0));
    assert_eq!(
        viewer.on_xr_frame(&mut again),
        FrameReport::Rendered {
            stabilized_now: false
        }
    );
}

#[test]
fn test_reticle_follows_top_hit() {
    let mut viewer = viewer_with_model();
    viewer.start_session();

    let mut host = ScriptedHost::with_pose();
    host.hits = vec![
        Mat4::from_translation(Vec3::new(0.5, 0.0, -2.0)),
        Mat4::from_translation(Vec3::new(9.0, 9.0, 9.0)),
    ];
    viewer.on_xr_frame(&mut host);

    let session = viewer.session().unwrap();
    assert!(session.reticle_visible);
    let pose = session.reticle_pose.unwrap();
    assert_eq!(pose.w_axis.truncate(), Vec3::new(0.5, 0.0, -2.0));

    let reticle = viewer.scene().node(viewer.reticle()).unwrap();
    assert!(reticle.visible);
    assert_eq!(reticle.world_matrix(), pose);
    assert_eq!(host.rendered_nodes, 1);
}

#[test]
fn test_tap_before_reticle_pose_does_nothing() {
    let mut viewer = viewer_with_model();
    viewer.start_session();
    viewer.handle_input(&InputEvent::Tap);

    assert!(!viewer.session().unwrap().object_spawned);
    assert!(!viewer.scene().contains(viewer.object().unwrap()));
}

#[test]
fn test_tap_without_model_does_nothing() {
    let mut viewer = ArViewer::new(ViewerConfig::ar(), VIEWPORT);
    viewer.start_session();
    let mut host = ScriptedHost::with_pose().hit_at(Vec3::new(0.0, 0.0, -1.0));
    viewer.on_xr_frame(&mut host);

    viewer.handle_input(&InputEvent::Tap);
    assert!(!viewer.session().unwrap().object_spawned);
    assert!(viewer.scene().contains(viewer.reticle()));
}

#[test]
fn test_spawn_is_idempotent() {
    let mut viewer = viewer_with_model();
    viewer.start_session();

    let first = Vec3::new(0.3, -0.8, -1.2);
    let mut host = ScriptedHost::with_pose().hit_at(first);
    viewer.on_xr_frame(&mut host);
    viewer.handle_input(&InputEvent::Tap);

    // Reticle keeps tracking, but the second tap must not move the object
    let mut host = ScriptedHost::with_pose().hit_at(Vec3::new(5.0, 0.0, 5.0));
    viewer.on_xr_frame(&mut host);
    viewer.handle_input(&InputEvent::Tap);

    let session = viewer.session().unwrap();
    assert!(session.object_spawned);
    let object = viewer.object().unwrap();
    assert!(viewer.scene().contains(object));
    assert!(!viewer.scene().contains(viewer.reticle()));
    assert_eq!(viewer.object_transform().unwrap().position, first);
    assert_eq!(
        viewer
            .scene()
            .renderable()
            .filter(|n| n.id == object)
            .count(),
        1
    );
}

#[test]
fn test_gestures_apply_only_to_spawned_object() {
    let mut viewer = viewer_with_model();
    viewer.start_session();

    // Before placement: pinch is ignored
    viewer.handle_input(&InputEvent::TouchStart(vec![
        Vec2::new(100.0, 400.0),
        Vec2::new(200.0, 400.0),
    ]));
    viewer.handle_input(&InputEvent::TouchMove(vec![
        Vec2::new(0.0, 400.0),
        Vec2::new(400.0, 400.0),
    ]));
    viewer.handle_input(&InputEvent::TouchEnd(vec![]));
    assert_eq!(viewer.object_transform().unwrap().scale, Vec3::ONE);

    let mut host = ScriptedHost::with_pose().hit_at(Vec3::new(0.0, 0.0, -1.0));
    viewer.on_xr_frame(&mut host);
    viewer.handle_input(&InputEvent::Tap);

    // One finger: dx = 0.5 normalized -> rotation.y += 1.0
    viewer.handle_input(&InputEvent::TouchStart(vec![Vec2::new(100.0, 400.0)]));
    viewer.handle_input(&InputEvent::TouchMove(vec![Vec2::new(200.0, 100.0)]));
    viewer.handle_input(&InputEvent::TouchEnd(vec![]));
    let t = viewer.object_transform().unwrap();
    assert!((t.rotation.y - 1.0).abs() < 1e-6);
    assert_eq!(t.rotation.x, 0.0);

    // Two fingers: distance 0.5 -> 2.0 normalized, scale += 1.5
    viewer.handle_input(&InputEvent::TouchStart(vec![
        Vec2::new(100.0, 400.0),
        Vec2::new(200.0, 400.0),
    ]));
    viewer.handle_input(&InputEvent::TouchMove(vec![
        Vec2::new(0.0, 400.0),
        Vec2::new(400.0, 400.0),
    ]));
    let t = viewer.object_transform().unwrap();
    assert!(t.scale.abs_diff_eq(Vec3::splat(2.5), 1e-5));

    // The reticle is never manipulated
    let reticle = viewer.scene().node(viewer.reticle()).unwrap();
    assert_eq!(reticle.transform.scale, Vec3::ONE);
}

#[test]
fn test_restarting_session_resets_latches() {
    let mut viewer = viewer_with_model();
    viewer.start_session();
    let mut host = ScriptedHost::with_pose().hit_at(Vec3::ZERO);
    viewer.on_xr_frame(&mut host);
    viewer.handle_input(&InputEvent::Tap);
    assert!(viewer.session().unwrap().object_spawned);

    viewer.end_session();
    assert!(viewer.session().is_none());
    assert!(!viewer.scene().contains(viewer.object().unwrap()));

    viewer.start_session();
    let session = viewer.session().unwrap();
    assert!(!session.stabilized);
    assert!(!session.object_spawned);
    assert!(session.reticle_pose.is_none());
    assert!(viewer.scene().contains(viewer.reticle()));
}
