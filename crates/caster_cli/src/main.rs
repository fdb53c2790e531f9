//! Command line front end: loads a scene description, renders it to a
//! PNG, and reports progress on stderr.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};

use caster_core::format::{parse_render, parse_scene};
use caster_core::projection::ViewFrame;
use caster_core::{Color, Render, RenderQuality, Scene};
use caster_math::Vec3;
use caster_renderer::{
    Executor, GlobalIllumination, ImageBuffer, LocalIllumination, OcTree, PrimitivesList,
    RenderControl, ScreenCamera, Tracer, TracingStructure, DEFAULT_TREE_DEPTH,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StructureKind {
    /// Brute-force scan over every primitive.
    List,
    /// Octree spatial index.
    Octree,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TracerKind {
    /// Single-bounce Phong shading.
    Local,
    /// Recursive mirror reflections.
    Global,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum QualityArg {
    Normal,
    Fine,
    Rough,
}

impl From<QualityArg> for RenderQuality {
    fn from(value: QualityArg) -> Self {
        match value {
            QualityArg::Normal => RenderQuality::Normal,
            QualityArg::Fine => RenderQuality::Fine,
            QualityArg::Rough => RenderQuality::Rough,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "caster", about = "Ray casting scene renderer")]
struct Args {
    /// Scene description file.
    scene: PathBuf,

    /// Render description file. When omitted, the camera is fitted to
    /// the scene bounds.
    #[arg(long)]
    render: Option<PathBuf>,

    /// Output image path.
    #[arg(short, long, default_value = "out.png")]
    output: PathBuf,

    /// Output image width in pixels.
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Output image height in pixels.
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Worker thread count. Defaults to the available parallelism.
    #[arg(long)]
    threads: Option<usize>,

    #[arg(long, value_enum, default_value_t = StructureKind::Octree)]
    structure: StructureKind,

    #[arg(long, value_enum, default_value_t = TracerKind::Global)]
    tracer: TracerKind,

    /// Override the render quality.
    #[arg(long, value_enum)]
    quality: Option<QualityArg>,

    /// Override the reflection depth.
    #[arg(long)]
    depth: Option<u32>,

    /// Override the gamma correction exponent.
    #[arg(long)]
    gamma: Option<f32>,

    /// Draw the scene wireframe instead of ray tracing it.
    #[arg(long)]
    wireframe: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let scene_text = fs::read_to_string(&args.scene)
        .with_context(|| format!("reading scene file {}", args.scene.display()))?;
    let scene = parse_scene(&scene_text)
        .with_context(|| format!("parsing scene file {}", args.scene.display()))?;

    let mut render = match &args.render {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading render file {}", path.display()))?;
            parse_render(&text).with_context(|| format!("parsing render file {}", path.display()))?
        }
        None => Render::fitted_to(&scene).context("cannot fit a camera to an empty scene")?,
    };
    if let Some(quality) = args.quality {
        render.quality = quality.into();
    }
    if let Some(depth) = args.depth {
        render.render_depth = depth;
    }
    if let Some(gamma) = args.gamma {
        render.gamma = gamma;
    }

    let image = if args.wireframe {
        draw_wireframe(&scene, &render, args.width, args.height)
    } else {
        trace(&args, &scene, &render)?
    };
    image
        .to_rgb_image()
        .save(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;
    log::info!("wrote {}", args.output.display());
    Ok(())
}

fn trace(args: &Args, scene: &Scene, render: &Render) -> anyhow::Result<ImageBuffer> {
    let n_threads = args
        .threads
        .or_else(|| std::thread::available_parallelism().ok().map(|n| n.get()))
        .unwrap_or(1);

    let structure: Box<dyn TracingStructure> = match args.structure {
        StructureKind::List => Box::new(PrimitivesList::new(&scene.primitives)),
        StructureKind::Octree => Box::new(OcTree::build(&scene.primitives, DEFAULT_TREE_DEPTH)),
    };
    let tracer: Box<dyn Tracer> = match args.tracer {
        TracerKind::Local => Box::new(LocalIllumination::new(structure.as_ref(), scene, render)),
        TracerKind::Global => Box::new(GlobalIllumination::new(structure.as_ref(), scene, render)),
    };

    let camera = ScreenCamera::new(render, args.width, args.height);
    let executor = Executor::new(
        tracer.as_ref(),
        camera,
        args.width,
        args.height,
        render.quality,
        render.gamma,
        n_threads,
    );
    let control = RenderControl::with_progress(Box::new(|percent| {
        if percent > 0 {
            log::info!("rendered {percent}%");
        }
    }));

    let started = Instant::now();
    let Some(image) = executor.render(&control)? else {
        bail!("render was cancelled");
    };
    log::info!(
        "traced {}x{} in {:.2}s on {} threads",
        args.width,
        args.height,
        started.elapsed().as_secs_f32(),
        n_threads
    );
    Ok(image)
}

/// Projects every primitive's wireframe onto the screen plane and
/// rasterizes the segments over the background color.
fn draw_wireframe(scene: &Scene, render: &Render, width: u32, height: u32) -> ImageBuffer {
    let frame = ViewFrame {
        camera_position: render.camera_position,
        view_direction: render.view_direction(),
        up: render.up,
        screen_distance: render.z_near,
    };
    let lines: Vec<Vec<Vec3>> = scene
        .primitives
        .iter()
        .flat_map(|p| p.wireframe())
        .collect();

    let mut image = ImageBuffer::new(width, height);
    let background = render.background_color;
    for y in 0..height {
        for x in 0..width {
            image.set(x, y, background);
        }
    }

    let stroke = Color {
        r: 255 - background.r,
        g: 255 - background.g,
        b: 255 - background.b,
    };
    let to_pixel = |p: Vec3| {
        let px = (p.y + render.screen_width / 2.0) / render.screen_width * width as f32;
        let py = (render.screen_height / 2.0 - p.z) / render.screen_height * height as f32;
        (px, py)
    };
    for line in frame.project_lines(&lines) {
        for segment in line.windows(2) {
            let (x0, y0) = to_pixel(segment[0]);
            let (x1, y1) = to_pixel(segment[1]);
            draw_segment(&mut image, x0, y0, x1, y1, stroke);
        }
    }
    image
}

/// Plots a segment by uniform stepping, one sample per covered pixel.
fn draw_segment(image: &mut ImageBuffer, x0: f32, y0: f32, x1: f32, y1: f32, color: Color) {
    let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0);
    for i in 0..=steps as u32 {
        let t = i as f32 / steps;
        let x = x0 + (x1 - x0) * t;
        let y = y0 + (y1 - y0) * t;
        if x >= 0.0 && y >= 0.0 && (x as u32) < image.width() && (y as u32) < image.height() {
            image.set(x as u32, y as u32, color);
        }
    }
}
