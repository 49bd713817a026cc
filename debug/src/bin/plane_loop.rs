//! Headless tracking loop: feeds discovered/updated/removed surfaces through the wgpu backend
//! and renders one frame after each event. Run with RUST_LOG=debug to see skipped anchors.

use occlusion_core::{vecmath, OcclusionConfig, OcclusionManager, OrientationStyle, SceneChange, SurfaceScene};
use occlusion_wgpu::{OcclusionPassConfig, OcclusionRenderer, WgpuRenderContext};
use surface_api::{Anchor, PlaneBoundary, SurfaceEvent, SurfaceId, TrackedSurface, IDENTITY_TRANSFORM};

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;

fn perspective_projection(fov_y_rad: f32, aspect: f32, near: f32, far: f32) -> [f32; 16] {
    let t = (fov_y_rad / 2.0).tan();
    let sy = 1.0 / t;
    let sx = sy / aspect;
    let a = far / (near - far);
    let b = (near * far) / (near - far);
    [
        sx, 0.0, 0.0, 0.0,
        0.0, sy, 0.0, 0.0,
        0.0, 0.0, a, -1.0,
        0.0, 0.0, b, 0.0,
    ]
}

fn look_at(eye: [f32; 3], center: [f32; 3], up: [f32; 3]) -> [f32; 16] {
    let f = [center[0] - eye[0], center[1] - eye[1], center[2] - eye[2]];
    let len_f = (f[0] * f[0] + f[1] * f[1] + f[2] * f[2]).sqrt();
    let f = [f[0] / len_f, f[1] / len_f, f[2] / len_f];
    let s = [
        f[1] * up[2] - f[2] * up[1],
        f[2] * up[0] - f[0] * up[2],
        f[0] * up[1] - f[1] * up[0],
    ];
    let len_s = (s[0] * s[0] + s[1] * s[1] + s[2] * s[2]).sqrt();
    let s = [s[0] / len_s, s[1] / len_s, s[2] / len_s];
    let u = [
        s[1] * f[2] - s[2] * f[1],
        s[2] * f[0] - s[0] * f[2],
        s[0] * f[1] - s[1] * f[0],
    ];
    let tx = -(s[0] * eye[0] + s[1] * eye[1] + s[2] * eye[2]);
    let ty = -(u[0] * eye[0] + u[1] * eye[1] + u[2] * eye[2]);
    let tz = f[0] * eye[0] + f[1] * eye[1] + f[2] * eye[2];
    [
        s[0], u[0], -f[0], 0.0, s[1], u[1], -f[1], 0.0, s[2], u[2], -f[2], 0.0, tx, ty, tz, 1.0,
    ]
}

/// Floor 1 m below the camera origin.
fn floor(extent: [f32; 2]) -> Anchor {
    let transform = vecmath::translating(&IDENTITY_TRANSFORM, [0.0, -1.0, -2.0]);
    Anchor::Plane(TrackedSurface::rectangle(SurfaceId(1), transform, extent))
}

/// Wall facing the camera, with an irregular boundary as tracking refines it.
fn wall(points: &[[f32; 2]]) -> Anchor {
    let transform = [
        1.0, 0.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, -1.0, 0.0, 0.0, //
        0.0, 0.0, -3.0, 1.0,
    ];
    let boundary = PlaneBoundary::from_polygon([0.0; 3], points);
    let (mut w, mut d) = (0.0f32, 0.0f32);
    for p in points {
        w = w.max(p[0].abs() * 2.0);
        d = d.max(p[1].abs() * 2.0);
    }
    Anchor::Plane(TrackedSurface {
        id: SurfaceId(2),
        transform,
        center: [0.0; 3],
        extent: [w, d],
        boundary,
    })
}

fn main() -> Result<(), String> {
    env_logger::init();

    let context = WgpuRenderContext::headless()?;
    let mesh_device = context.mesh_device().ok_or("headless context has no device")?;
    let mut renderer = OcclusionRenderer::new_with_config(
        mesh_device,
        OcclusionPassConfig { clear_color: Some(wgpu::Color::BLACK), ..OcclusionPassConfig::default() },
    )?;
    let mut scene = SurfaceScene::new(OcclusionManager::new(OcclusionConfig::default(), OrientationStyle::default()));

    let view = look_at([0.0, 0.0, 0.0], [0.0, -0.5, -2.0], [0.0, 1.0, 0.0]);
    let proj = perspective_projection(60f32.to_radians(), WIDTH as f32 / HEIGHT as f32, 0.05, 50.0);
    let view_proj = vecmath::mul(&proj, &view);

    let events = [
        SurfaceEvent::Discovered(floor([1.0, 1.0])),
        SurfaceEvent::Discovered(Anchor::Point { id: SurfaceId(99), transform: IDENTITY_TRANSFORM }),
        SurfaceEvent::Discovered(wall(&[[-0.5, -0.4], [-0.6, 0.4], [0.5, 0.5], [0.6, -0.3]])),
        SurfaceEvent::Updated(floor([2.0, 1.0])),
        SurfaceEvent::Updated(wall(&[[-1.0, -0.8], [-1.1, 0.7], [0.0, 0.9], [1.0, 0.6], [1.1, -0.7]])),
        SurfaceEvent::Removed(SurfaceId(2)),
    ];

    // Surfaces discovered before the GPU is ready are skipped, then picked up on their next update.
    let no_device = WgpuRenderContext::without_device();
    let early = scene.apply(&no_device, &SurfaceEvent::Discovered(floor([0.5, 0.5])));
    println!("discovered without device: {:?}", early);

    for event in &events {
        let change = scene.apply(&context, event);
        if change != SceneChange::Skipped {
            let items = scene.draw_list(&view_proj);
            println!(
                "{:?} {:?}: {} surface(s), {} draw item(s)",
                change,
                event.surface_id(),
                scene.len(),
                items.len()
            );
        }
        renderer.render_frame(WIDTH, HEIGHT, &scene, &view_proj)?;
    }

    if let Some(node) = scene.node(SurfaceId(1)) {
        println!("floor bounds {:?}", node.mesh.bounding_box);
        if let Some(outline) = node.outline.as_ref() {
            println!("floor outline scale {:?}", outline.scale);
        }
    }

    scene.reset();
    renderer.render_frame(WIDTH, HEIGHT, &scene, &view_proj)?;
    println!("plane_loop: OK");
    Ok(())
}
