//! Parallel batch scheduler. Splits the raster into rectangular
//! batches, renders them on a rayon pool, and merges the results
//! while reporting progress and honoring cancellation.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;

use caster_core::{Color, RenderQuality};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use thiserror::Error;

use crate::camera::ScreenCamera;
use crate::image_buffer::ImageBuffer;
use crate::intensity::Intensity;
use crate::Tracer;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to build render thread pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// A rectangular slice of the raster. Bounds are half-open:
/// `x_from..x_to`, `y_from..y_to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch {
    pub x_from: u32,
    pub y_from: u32,
    pub x_to: u32,
    pub y_to: u32,
}

impl Batch {
    fn width(&self) -> u32 {
        self.x_to - self.x_from
    }

    fn height(&self) -> u32 {
        self.y_to - self.y_from
    }
}

/// Partition the raster into a grid of batches, two rows high and
/// `n_threads / 2` columns wide. The last row and column absorb the
/// division remainders. Degenerate inputs fall back to one batch.
pub fn find_batches(n_threads: usize, width: u32, height: u32) -> Vec<Batch> {
    let cols = (n_threads / 2) as u32;
    if n_threads <= 1 || cols == 0 || width < cols || height < 2 {
        return vec![Batch {
            x_from: 0,
            y_from: 0,
            x_to: width,
            y_to: height,
        }];
    }

    let batch_width = width / cols;
    let batch_height = height / 2;
    let mut batches = Vec::with_capacity(cols as usize * 2);
    for row in 0..2u32 {
        let y_from = row * batch_height;
        let y_to = if row == 1 { height } else { y_from + batch_height };
        for col in 0..cols {
            let x_from = col * batch_width;
            let x_to = if col == cols - 1 { width } else { x_from + batch_width };
            batches.push(Batch {
                x_from,
                y_from,
                x_to,
                y_to,
            });
        }
    }
    batches
}

type ProgressCallback = Box<dyn FnMut(u32) + Send>;

/// Shared handle for steering a running render: request cancellation
/// and receive percentage progress reports.
#[derive(Default)]
pub struct RenderControl {
    cancelled: AtomicBool,
    progress: Mutex<Option<ProgressCallback>>,
}

impl RenderControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_progress(callback: ProgressCallback) -> Self {
        Self {
            cancelled: AtomicBool::new(false),
            progress: Mutex::new(Some(callback)),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    fn report(&self, percent: u32) {
        if let Ok(mut guard) = self.progress.lock() {
            if let Some(callback) = guard.as_mut() {
                callback(percent);
            }
        }
    }

    /// Report `percent` only if it exceeds every value reported so
    /// far. The max update happens under the callback lock, so
    /// reports from concurrent workers stay in increasing order.
    fn report_increase(&self, previous: &AtomicU32, percent: u32) {
        if let Ok(mut guard) = self.progress.lock() {
            if previous.fetch_max(percent, Ordering::Relaxed) < percent {
                if let Some(callback) = guard.as_mut() {
                    callback(percent);
                }
            }
        }
    }
}

/// Pixel counter shared across batch workers. Reports a percentage
/// only when it increases, so callbacks stay sparse.
struct Progress {
    total: usize,
    rendered: AtomicUsize,
    previous: AtomicU32,
}

impl Progress {
    fn new(total: usize) -> Self {
        Self {
            total,
            rendered: AtomicUsize::new(0),
            previous: AtomicU32::new(0),
        }
    }

    fn add(&self, pixels: usize, control: &RenderControl) {
        if self.total == 0 {
            return;
        }
        let rendered = self.rendered.fetch_add(pixels, Ordering::Relaxed) + pixels;
        let percent = ((rendered * 100 / self.total) as u32).min(100);
        if percent > self.previous.load(Ordering::Relaxed) {
            control.report_increase(&self.previous, percent);
        }
    }
}

struct BatchResult {
    batch: Batch,
    pixels: Vec<Color>,
}

/// Renders a full frame through a [`Tracer`] on a dedicated thread
/// pool, one batch per task.
pub struct Executor<'a> {
    tracer: &'a dyn Tracer,
    camera: ScreenCamera,
    width: u32,
    height: u32,
    quality: RenderQuality,
    gamma: f32,
    n_threads: usize,
}

impl<'a> Executor<'a> {
    pub fn new(
        tracer: &'a dyn Tracer,
        camera: ScreenCamera,
        width: u32,
        height: u32,
        quality: RenderQuality,
        gamma: f32,
        n_threads: usize,
    ) -> Self {
        Self {
            tracer,
            camera,
            width,
            height,
            quality,
            gamma,
            n_threads,
        }
    }

    /// Render the frame. Returns `Ok(None)` when the control was
    /// cancelled before the frame completed. A final report of 0
    /// resets any progress consumer.
    pub fn render(&self, control: &RenderControl) -> Result<Option<ImageBuffer>, RenderError> {
        let batches = find_batches(self.n_threads, self.width, self.height);
        let progress = Progress::new((self.width * self.height) as usize);
        log::debug!(
            "rendering {}x{} in {} batches at {} quality",
            self.width,
            self.height,
            batches.len(),
            self.quality.name()
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.n_threads.max(1))
            .build()?;
        let results: Vec<BatchResult> = pool.install(|| {
            batches
                .par_iter()
                .map(|&batch| self.render_batch(batch, control, &progress))
                .collect()
        });
        control.report(0);

        if control.is_cancelled() {
            return Ok(None);
        }

        let mut image = ImageBuffer::new(self.width, self.height);
        for result in results {
            let batch = result.batch;
            for y in batch.y_from..batch.y_to {
                for x in batch.x_from..batch.x_to {
                    let index = ((y - batch.y_from) * batch.width() + (x - batch.x_from)) as usize;
                    image.set(x, y, result.pixels[index]);
                }
            }
        }
        Ok(Some(image))
    }

    fn render_batch(&self, batch: Batch, control: &RenderControl, progress: &Progress) -> BatchResult {
        let mut pixels = vec![Color::BLACK; (batch.width() * batch.height()) as usize];
        match self.quality {
            RenderQuality::Normal => self.render_normal(batch, control, progress, &mut pixels),
            RenderQuality::Fine => self.render_fine(batch, control, progress, &mut pixels),
            RenderQuality::Rough => self.render_rough(batch, control, progress, &mut pixels),
        }
        BatchResult { batch, pixels }
    }

    fn render_normal(
        &self,
        batch: Batch,
        control: &RenderControl,
        progress: &Progress,
        pixels: &mut [Color],
    ) {
        for y in batch.y_from..batch.y_to {
            for x in batch.x_from..batch.x_to {
                if control.is_cancelled() {
                    return;
                }
                let shade = self.tracer.trace(&self.camera.ray_at(x, y));
                pixels[pixel_index(batch, x, y)] = shade.gamma_corrected(self.gamma);
                progress.add(1, control);
            }
        }
    }

    fn render_fine(
        &self,
        batch: Batch,
        control: &RenderControl,
        progress: &Progress,
        pixels: &mut [Color],
    ) {
        let seed = (batch.y_from as u64) << 32 | batch.x_from as u64;
        let mut rng = SmallRng::seed_from_u64(seed);
        for y in batch.y_from..batch.y_to {
            for x in batch.x_from..batch.x_to {
                if control.is_cancelled() {
                    return;
                }
                let mut acc = Intensity::default();
                for (half_x, half_y) in [(0.0, 0.0), (0.5, 0.0), (0.0, 0.5), (0.5, 0.5)] {
                    let ox = half_x + rng.gen_range(0.0..0.5);
                    let oy = half_y + rng.gen_range(0.0..0.5);
                    acc += self.tracer.trace(&self.camera.ray_at_offset(x, y, ox, oy));
                }
                pixels[pixel_index(batch, x, y)] = (acc / 4.0).gamma_corrected(self.gamma);
                progress.add(1, control);
            }
        }
    }

    fn render_rough(
        &self,
        batch: Batch,
        control: &RenderControl,
        progress: &Progress,
        pixels: &mut [Color],
    ) {
        for y in (batch.y_from..batch.y_to).step_by(2) {
            for x in (batch.x_from..batch.x_to).step_by(2) {
                if control.is_cancelled() {
                    return;
                }
                let shade = self.tracer.trace(&self.camera.ray_at(x, y));
                let color = shade.gamma_corrected(self.gamma);
                // Replicate over the 2x2 block, clamped to the batch.
                let mut covered = 0;
                for fill_y in y..(y + 2).min(batch.y_to) {
                    for fill_x in x..(x + 2).min(batch.x_to) {
                        pixels[pixel_index(batch, fill_x, fill_y)] = color;
                        covered += 1;
                    }
                }
                progress.add(covered, control);
            }
        }
    }
}

fn pixel_index(batch: Batch, x: u32, y: u32) -> usize {
    ((y - batch.y_from) * batch.width() + (x - batch.x_from)) as usize
}
