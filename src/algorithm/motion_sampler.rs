//! Frame-difference analysis over a small fixed RGB grid.

use crate::algorithm::{require_at_least, ConfigError};
use crate::models::geometry::TargetPoint;
use crate::models::sample::{GridBounds, MotionSample};

const CHANNELS: usize = 3;

#[derive(Debug, Clone)]
pub struct MotionSamplerConfig {
    /// Analysis grid resolution in cells. Never the capture resolution;
    /// the grid exists only for motion detection.
    pub grid_width: u32,
    pub grid_height: u32,
    /// A cell counts as changed when the summed absolute per-channel
    /// difference against the previous snapshot exceeds this.
    pub cell_diff_threshold: u32,
    /// Weight centroid accumulation by difference magnitude instead of
    /// counting every changed cell equally.
    pub weighted_centroid: bool,
}

impl Default for MotionSamplerConfig {
    fn default() -> Self {
        Self {
            grid_width: 64,
            grid_height: 36,
            cell_diff_threshold: 48,
            weighted_centroid: true,
        }
    }
}

impl MotionSamplerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_at_least("grid_width", 1, u64::from(self.grid_width))?;
        require_at_least("grid_height", 1, u64::from(self.grid_height))?;
        Ok(())
    }

    pub fn buffer_len(&self) -> usize {
        self.grid_width as usize * self.grid_height as usize * CHANNELS
    }
}

/// Double-buffered analysis grid plus the difference pass over it.
///
/// Owns the previous snapshot exclusively; the snapshot is replaced on every
/// well-formed ingest, including ones that yield no sample.
#[derive(Debug)]
pub struct MotionSampler {
    config: MotionSamplerConfig,
    frame_width: f64,
    frame_height: f64,
    previous: Option<Vec<u8>>,
}

impl MotionSampler {
    pub fn new(
        config: MotionSamplerConfig,
        frame_width: u32,
        frame_height: u32,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        require_at_least("frame_width", 1, u64::from(frame_width))?;
        require_at_least("frame_height", 1, u64::from(frame_height))?;

        Ok(Self {
            config,
            frame_width: f64::from(frame_width),
            frame_height: f64::from(frame_height),
            previous: None,
        })
    }

    /// Diffs `grid` against the stored snapshot and stores `grid` as the new
    /// snapshot. Returns `None` on the baseline tick, on a malformed buffer,
    /// or when no cell crossed the change threshold.
    pub fn ingest(&mut self, grid: &[u8]) -> Option<MotionSample> {
        if grid.len() != self.config.buffer_len() {
            log::warn!(
                "motion sampler: grid buffer length {} does not match {}x{} RGB grid",
                grid.len(),
                self.config.grid_width,
                self.config.grid_height
            );
            return None;
        }

        let Some(previous) = self.previous.as_mut() else {
            self.previous = Some(grid.to_vec());
            return None;
        };

        let width = self.config.grid_width;
        let height = self.config.grid_height;
        let threshold = self.config.cell_diff_threshold;

        let mut mass = 0u32;
        let mut weight_sum = 0.0f64;
        let mut sum_x = 0.0f64;
        let mut sum_y = 0.0f64;
        let mut bounds: Option<GridBounds> = None;

        for cell_y in 0..height {
            for cell_x in 0..width {
                let idx = (cell_y * width + cell_x) as usize * CHANNELS;
                let diff: u32 = (0..CHANNELS)
                    .map(|ch| {
                        u32::from(grid[idx + ch].abs_diff(previous[idx + ch]))
                    })
                    .sum();
                if diff <= threshold {
                    continue;
                }

                mass += 1;
                let weight = if self.config.weighted_centroid {
                    f64::from(diff)
                } else {
                    1.0
                };
                weight_sum += weight;
                sum_x += f64::from(cell_x) * weight;
                sum_y += f64::from(cell_y) * weight;
                match bounds.as_mut() {
                    Some(bounds) => bounds.extend(cell_x, cell_y),
                    None => bounds = Some(GridBounds::point(cell_x, cell_y)),
                }
            }
        }

        previous.copy_from_slice(grid);

        let bounds = bounds?;
        let centroid_x = sum_x / weight_sum;
        let centroid_y = sum_y / weight_sum;

        Some(MotionSample {
            centroid_x,
            centroid_y,
            mass,
            bounds,
            // Cell centers, not cell origins, map to frame space.
            focus: TargetPoint {
                x: (centroid_x + 0.5) * self.frame_width / f64::from(width),
                y: (centroid_y + 0.5) * self.frame_height / f64::from(height),
            },
        })
    }
}
