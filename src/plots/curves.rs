use image::{Rgb, RgbImage};

use super::{draw_line, BACKGROUND, FRAME};
use crate::error::PlotError;

const MARGIN: i64 = 24;
const PALETTE: [Rgb<u8>; 4] = [
    Rgb([31, 119, 180]),
    Rgb([255, 127, 14]),
    Rgb([44, 160, 44]),
    Rgb([214, 39, 40]),
];

/// One per-epoch series, e.g. loss or epoch wall time.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Line chart of every series against epoch index, sharing one y range.
pub fn curves_image(series: &[Series], width: u32, height: u32) -> Result<RgbImage, PlotError> {
    let epochs = series.iter().map(|s| s.values.len()).max().unwrap_or(0);
    let finite = || {
        series
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .filter(|v| v.is_finite())
    };
    if epochs == 0 || finite().next().is_none() {
        return Err(PlotError::Empty("no finite values in any series".into()));
    }
    let low = finite().fold(f64::INFINITY, f64::min);
    let high = finite().fold(f64::NEG_INFINITY, f64::max);
    let span = if high - low > f64::EPSILON { high - low } else { 1.0 };

    let min_side = (2 * MARGIN + 2) as u32;
    let (width, height) = (width.max(min_side), height.max(min_side));
    let mut image = RgbImage::from_pixel(width, height, BACKGROUND);
    let (left, right) = (MARGIN, width as i64 - MARGIN);
    let (top, bottom) = (MARGIN, height as i64 - MARGIN);
    draw_line(&mut image, (left, top), (left, bottom), FRAME);
    draw_line(&mut image, (left, bottom), (right, bottom), FRAME);

    let x_step = if epochs > 1 {
        (right - left) as f64 / (epochs - 1) as f64
    } else {
        0.0
    };
    let to_point = |epoch: usize, value: f64| {
        let x = left + (epoch as f64 * x_step).round() as i64;
        let y = bottom - (((value - low) / span) * (bottom - top) as f64).round() as i64;
        (x, y)
    };

    for (index, s) in series.iter().enumerate() {
        let color = PALETTE[index % PALETTE.len()];
        let mut previous = None;
        for (epoch, &value) in s.values.iter().enumerate() {
            if !value.is_finite() {
                previous = None;
                continue;
            }
            let point = to_point(epoch, value);
            match previous {
                Some(from) => draw_line(&mut image, from, point, color),
                None => draw_line(&mut image, point, point, color),
            }
            previous = Some(point);
        }
    }
    Ok(image)
}
