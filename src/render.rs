use std::time::Duration;

use crate::Pixel;
use crate::cell::CellState;
use crate::grid::Grid;

/// Hex values of braille dots
///
/// ```text
///  1   8
///  2  10
///  4  20
/// 40  80
/// ```
///
/// Where the base blank pattern is codepoint `0x2800` (or U+2800)
///
/// To get other configurations, just add the numbers above.
const BRAILLE_EMPTY: u32 = 0x2800;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// Black is alive, white is dead
    pub const fn of(state: CellState) -> Self {
        match state {
            CellState::Alive => Color::Black,
            CellState::Dead => Color::White,
        }
    }
}

/// Something that can be drawn on
pub trait Surface {
    /// Paint the `w` by `h` rectangle whose top-left pixel is `(px, py)`
    fn fill_rect(&mut self, px: Pixel, py: Pixel, w: Pixel, h: Pixel, color: Color);
}

/// Paint every cell of the grid as a `cell_size` square. This issues exactly one
/// [`Surface::fill_rect`] per cell.
pub fn draw_grid<S: Surface + ?Sized>(grid: &Grid, surface: &mut S, cell_size: Pixel) {
    for cell in grid.cells() {
        surface.fill_rect(
            cell.x * cell_size,
            cell.y * cell_size,
            cell_size,
            cell_size,
            Color::of(cell.state),
        );
    }
}

/// The overlay shown next to the grid
pub fn status_line(iteration: u64, population: usize, interval: Duration, running: bool) -> String {
    let state = if running { "running" } else { "paused" };

    format!(
        "Iteration: {iteration}  Population: {population}  Interval: {}ms  [{state}]",
        interval.as_millis()
    )
}

/// A terminal surface. Every pixel is one braille dot, so a character holds a 2x4 block of
/// pixels. Black pixels are raised dots.
pub struct BrailleCanvas {
    /// The pixel buffer
    pb: Vec<bool>,

    /// The frame buffer.
    fb: String,

    /// Codepoints. This allows us to construct the framebuffer more easily
    cp: Vec<u32>,

    /// Width of the pixel buffer
    w: usize,

    /// Height of the pixel buffer
    h: usize,
}

impl BrailleCanvas {
    pub fn new(w: usize, h: usize) -> Self {
        // For each braille character, we need 3 bytes:
        //  - The leader byte:     0b11100010
        //  - Continuation byte 1: 0b101000xx
        //  - Continuation byte 2: 0b10xxxxxx
        // For each newline, we need one byte: 0b00001010
        //
        // Let `w` and `h` refer to width and height of the pixel buffer. Then `bw = ceil(w / 2)`
        // and `bh = ceil(h / 4)` are the width and height of braille characters of our framebuffer
        // (that is, not accounting for the trailing newlines expected at the end of each line).

        let (bw, bh) = (w.div_ceil(2), h.div_ceil(4));

        Self {
            pb: vec![false; w * h],
            fb: String::with_capacity(3 * (bw * bh) + bh),
            cp: vec![BRAILLE_EMPTY; bw * bh],
            w,
            h,
        }
    }

    /// Size in pixels needed to show a whole grid
    pub fn for_grid(grid: &Grid, cell_size: Pixel) -> Self {
        Self::new(grid.width() * cell_size, grid.height() * cell_size)
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    /// Width and height of the rendered frame, in characters
    pub fn text_size(&self) -> (usize, usize) {
        (self.w.div_ceil(2), self.h.div_ceil(4))
    }

    pub fn is_set(&self, x: usize, y: usize) -> bool {
        x < self.w && y < self.h && self.pb[self.xy_from(x, y)]
    }

    /// Turn the pixel buffer into lines of braille characters, one line per 4 rows of pixels
    pub fn render(&mut self) -> &str {
        let bw = self.w.div_ceil(2);

        // compute new codepoints
        self.cp.fill(BRAILLE_EMPTY);

        for (n, &px) in self.pb.iter().enumerate() {
            if px {
                let (x, y) = self.xy_to(n);
                self.cp[(y / 4) * bw + (x / 2)] += Self::get_hex_value(x, y);
            }
        }

        // update framebuffer
        self.fb.clear();

        for (i, &c) in self.cp.iter().enumerate() {
            if i > 0 && i % bw == 0 {
                self.fb.push('\n');
            }

            // Every sum of dots stays within U+2800..=U+28FF
            self.fb.push(char::from_u32(c).unwrap_or(' '));
        }
        self.fb.push('\n');

        &self.fb
    }

    fn xy_to(&self, n: usize) -> (usize, usize) {
        (n % self.w, n / self.w)
    }

    fn xy_from(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }

    fn get_hex_value(x: usize, y: usize) -> u32 {
        match (x % 2, y % 4) {
            (0, 0) => 0x1,
            (1, 0) => 0x8,
            (0, 1) => 0x2,
            (1, 1) => 0x10,
            (0, 2) => 0x4,
            (1, 2) => 0x20,
            (0, 3) => 0x40,
            (1, 3) => 0x80,
            _ => unreachable!(),
        }
    }
}

impl Surface for BrailleCanvas {
    /// Anything past the edge of the canvas is clipped
    fn fill_rect(&mut self, px: Pixel, py: Pixel, w: Pixel, h: Pixel, color: Color) {
        let on = color == Color::Black;

        let x_end = px.saturating_add(w).min(self.w);
        let y_end = py.saturating_add(h).min(self.h);

        for y in py..y_end {
            for x in px..x_end {
                let i = self.xy_from(x, y);
                self.pb[i] = on;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::pattern::PatternName;

    /// Records every call it receives
    #[derive(Default)]
    struct Recorder {
        calls: Vec<(Pixel, Pixel, Pixel, Pixel, Color)>,
    }

    impl Surface for Recorder {
        fn fill_rect(&mut self, px: Pixel, py: Pixel, w: Pixel, h: Pixel, color: Color) {
            self.calls.push((px, py, w, h, color));
        }
    }

    fn blinker() -> Grid {
        let mut grid = Grid::new(6, 4).unwrap();
        grid.apply_pattern(1, 1, &PatternName::Blinker.pattern().unwrap())
            .unwrap();

        grid
    }

    #[test]
    fn one_call_per_cell() {
        let grid = blinker();
        let mut recorder = Recorder::default();

        draw_grid(&grid, &mut recorder, 5);

        assert_eq!(recorder.calls.len(), grid.len());
        assert_eq!(recorder.calls[0], (0, 0, 5, 5, Color::White));
        assert_eq!(recorder.calls[7], (5, 5, 5, 5, Color::Black));
        assert_eq!(
            recorder
                .calls
                .iter()
                .filter(|c| c.4 == Color::Black)
                .count(),
            3
        );
    }

    #[test]
    fn braille_frames() {
        let mut grid = blinker();
        let mut canvas = BrailleCanvas::for_grid(&grid, 1);
        assert_eq!(canvas.text_size(), (3, 1));

        draw_grid(&grid, &mut canvas, 1);
        insta::assert_snapshot!(canvas.render().trim_end_matches('\n'), @"⠐⠒⠀");

        grid.step();
        draw_grid(&grid, &mut canvas, 1);
        insta::assert_snapshot!(canvas.render().trim_end_matches('\n'), @"⠀⠇⠀");
    }

    #[test]
    fn scaled_cells_fill_squares() {
        let grid = blinker();
        let mut canvas = BrailleCanvas::for_grid(&grid, 2);

        draw_grid(&grid, &mut canvas, 2);

        assert_eq!((canvas.width(), canvas.height()), (12, 8));
        assert!(canvas.is_set(2, 2));
        assert!(canvas.is_set(7, 3));
        assert!(!canvas.is_set(8, 2));
        assert!(!canvas.is_set(2, 4));
    }

    #[test]
    fn clips_out_of_range() {
        let mut canvas = BrailleCanvas::new(3, 3);

        canvas.fill_rect(2, 2, 5, 5, Color::Black);

        assert!(canvas.is_set(2, 2));
        assert!(!canvas.is_set(3, 3));
    }

    #[test]
    fn huge_rects_clip_without_overflow() {
        let mut canvas = BrailleCanvas::new(4, 4);

        canvas.fill_rect(1, 1, usize::MAX, usize::MAX, Color::Black);
        canvas.fill_rect(usize::MAX, 0, usize::MAX, 1, Color::Black);

        assert!(canvas.is_set(3, 3));
        assert!(!canvas.is_set(0, 0));
        assert!(!canvas.is_set(3, 0));
    }

    #[test]
    fn status() {
        assert_eq!(
            status_line(12, 5, Duration::from_millis(25), false),
            "Iteration: 12  Population: 5  Interval: 25ms  [paused]"
        );
    }
}
