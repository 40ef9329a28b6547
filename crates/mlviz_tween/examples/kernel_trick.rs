//! Kernel Trick (headless)
//!
//! Drives the same animation script as the kernel-trick visualization without a
//! window: points fly in with staggered delays, get lifted into 3D, a separating
//! plane bounces into place and the points flash to their class colors.
//! Frame state is logged instead of drawn.
//!
//! Run with: RUST_LOG=debug cargo run -p mlviz_tween --example kernel_trick

use anyhow::Result;
use mlviz_core::{Color, Vec3};
use mlviz_tween::{Easing, EngineConfig, Payload, TaskOptions, TweenEngine, Tweened};
use std::any::Any;
use std::cell::Cell;
use std::rc::Rc;

const FRAME_DT: f32 = 1.0 / 60.0;
const POINT_RADIUS: f32 = 0.15;
const SEP_PLANE_HEIGHT: f32 = 1.5;
const PLANE_COLOR: Color = Color::from_hex(0x87CEEB);

const CONFIG: &str = r#"
capacity = 256
default_easing = "ease_out_quad"
max_frame_dt = 0.1
"#;

#[derive(Clone, Copy, PartialEq)]
enum Class {
    Inner,
    Outer,
}

impl Class {
    fn color(self) -> Color {
        match self {
            Class::Inner => Color::BLUE,
            Class::Outer => Color::RED,
        }
    }
}

struct Sample {
    x: f32,
    z: f32,
    class: Class,
    pos: Tweened<Vec3>,
    radius: Tweened<f32>,
    color: Tweened<Color>,
}

impl Sample {
    /// Height after the `x² + z²` feature map
    fn lifted(&self) -> f32 {
        self.x * self.x + self.z * self.z
    }
}

/// Two concentric rings, spawned at scattered positions
fn ring_dataset(count: usize) -> Vec<Sample> {
    (0..count)
        .map(|i| {
            let class = if i % 2 == 0 { Class::Inner } else { Class::Outer };
            let r = match class {
                Class::Inner => 0.6 + (i % 5) as f32 * 0.05,
                Class::Outer => 1.6 + (i % 7) as f32 * 0.05,
            };
            let angle = i as f32 * 2.399_963;
            let scatter = Vec3::new(
                (i as f32 * 1.3).sin() * 6.0,
                3.0 + (i as f32 * 0.7).cos() * 2.0,
                (i as f32 * 0.9).cos() * 6.0,
            );
            Sample {
                x: r * angle.cos(),
                z: r * angle.sin(),
                class,
                pos: Tweened::new(scatter),
                radius: Tweened::new(0.0),
                color: Tweened::new(Color::WHITE),
            }
        })
        .collect()
}

struct Scene {
    samples: Vec<Sample>,
    camera_position: Tweened<Vec3>,
    fovy: Tweened<f32>,
    axes_len: Tweened<f32>,
    axes_labels: Tweened<Color>,
    plane_y: Tweened<f32>,
    plane_color: Tweened<Color>,
}

fn run_frames(engine: &mut TweenEngine, seconds: f32) -> usize {
    let frames = (seconds / FRAME_DT).ceil() as usize;
    for _ in 0..frames {
        engine.update(FRAME_DT);
    }
    frames
}

fn entrance(engine: &mut TweenEngine, scene: &Scene) -> Result<()> {
    engine
        .add_scalar(&scene.axes_len, 6.0, 2.0)?
        .easing(Easing::EaseOutBounce)
        .delay(0.5);
    engine.add_alpha(&scene.axes_labels, 0, 255, 2.0)?.delay(1.5);

    for (i, sample) in scene.samples.iter().enumerate() {
        let delay = 0.5 + (i % 9) as f32 * 0.2;
        let to = Vec3::new(sample.x, 0.0, sample.z);
        engine.add_vec3(&sample.pos, to, 1.0)?.delay(delay);
        engine
            .add_scalar(&sample.radius, POINT_RADIUS, 1.0)?
            .easing(Easing::EaseOutBounce)
            .delay(delay);
        engine
            .add_color(&sample.color, sample.class.color(), 1.0)?
            .delay(delay);
    }
    Ok(())
}

fn lift_to_3d(engine: &mut TweenEngine, scene: &Scene) -> Result<()> {
    engine.add_vec3(&scene.camera_position, Vec3::new(8.0, 6.0, 8.0), 1.0)?;
    engine.add_scalar(&scene.fovy, 60.0, 2.0)?;
    for sample in &scene.samples {
        let to = Vec3::new(sample.x, sample.lifted(), sample.z);
        engine.add_vec3(&sample.pos, to, 1.5)?;
    }
    Ok(())
}

/// Drop the separating plane in and flash every point white, then to its class
fn show_plane(engine: &mut TweenEngine, scene: &Scene, flashes: &Rc<Cell<u32>>) -> Result<()> {
    scene.plane_y.set(30.0);
    engine.add_alpha(&scene.plane_color, 0, 50, 0.5)?;
    engine
        .add_scalar(&scene.plane_y, SEP_PLANE_HEIGHT, 2.0)?
        .easing(Easing::EaseOutBounce);

    for sample in &scene.samples {
        let class = if sample.lifted() > SEP_PLANE_HEIGHT {
            Class::Outer
        } else {
            Class::Inner
        };
        engine.add_color(&sample.color, Color::WHITE, 0.2)?;
        let counter = flashes.clone();
        engine
            .add_color_with(
                &sample.color,
                class.color(),
                0.6,
                TaskOptions::new().on_complete(move |_| counter.set(counter.get() + 1)),
            )?
            .delay(0.3);
    }
    Ok(())
}

/// Animated connecting line from the camera target to the first sample
fn trace_line(engine: &mut TweenEngine, scene: &Scene) -> Result<()> {
    let from = Vec3::ZERO;
    let to = scene.samples[0].pos.get();
    engine
        .add_draw_with(
            move |t, payload| {
                let label = payload
                    .and_then(|p: &dyn Any| p.downcast_ref::<String>())
                    .map(String::as_str)
                    .unwrap_or("?");
                let tip = from + (to - from) * t;
                tracing::trace!(label, t, ?tip, "line");
            },
            0.8,
            TaskOptions::new()
                .easing(Easing::EaseInOutQuad)
                .payload(Payload::owned(String::from("nearest")))
                .on_complete(|payload| {
                    let label = payload.and_then(|p| p.downcast_ref::<String>());
                    tracing::info!(?label, "line finished");
                }),
        )?
        .hold(0.4);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = EngineConfig::from_toml_str(CONFIG)?;
    let mut engine = TweenEngine::with_config(&config);

    let scene = Scene {
        samples: ring_dataset(60),
        camera_position: Tweened::new(Vec3::new(0.0, 15.0, 0.01)),
        fovy: Tweened::new(45.0),
        axes_len: Tweened::new(0.0),
        axes_labels: Tweened::new(Color::GRAY.with_alpha(0)),
        plane_y: Tweened::new(30.0),
        plane_color: Tweened::new(PLANE_COLOR.with_alpha(0)),
    };

    entrance(&mut engine, &scene)?;
    tracing::info!(active = engine.len(), "entrance scheduled");
    let frames = run_frames(&mut engine, 4.0);
    tracing::info!(
        frames,
        active = engine.len(),
        axes_len = scene.axes_len.get(),
        label_alpha = scene.axes_labels.get().a,
        "entrance done"
    );

    lift_to_3d(&mut engine, &scene)?;
    run_frames(&mut engine, 2.0);
    tracing::info!(
        camera = ?scene.camera_position.get(),
        camera_distance = scene.camera_position.get().distance(Vec3::ZERO),
        fovy = scene.fovy.get(),
        "kernel applied"
    );

    let flashes = Rc::new(Cell::new(0));
    show_plane(&mut engine, &scene, &flashes)?;
    trace_line(&mut engine, &scene)?;
    while engine.update(FRAME_DT) {}

    let misplaced = scene
        .samples
        .iter()
        .filter(|s| s.color.get() != s.class.color())
        .count();
    tracing::info!(
        plane_y = scene.plane_y.get(),
        plane_alpha = scene.plane_color.get().a,
        flashes = flashes.get(),
        misplaced,
        "separating plane shown"
    );

    // A pool sized to the config refuses work instead of growing
    let filler = Tweened::new(0.0_f32);
    let mut accepted = 0;
    while engine.add_scalar(&filler, 1.0, 1.0).is_ok() {
        accepted += 1;
    }
    if let Err(err) = engine.add_scalar(&filler, 1.0, 1.0) {
        tracing::info!(accepted, %err, "pool limit reached");
    }

    Ok(())
}
