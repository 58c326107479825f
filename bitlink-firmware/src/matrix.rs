//! 5x5 LED matrix driver
//!
//! Shared frame buffer plus a row-multiplexing scan task. Scrolling is a
//! column-offset animation stepped from the scan loop, so a scroll call
//! returns immediately and the animation proceeds on its own until it
//! finishes or the next display command supersedes it.

use core::cell::RefCell;

use embassy_nrf::gpio::Output;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{Duration, Instant, Timer};
use heapless::Vec;

use bitlink_core::config::IDLE_SCROLL_PAUSE_MS;
use bitlink_core::traits::{DisplayError, DisplaySink};

use crate::font;

/// Matrix width/height in pixels
pub const MATRIX_SIZE: usize = 5;

/// Longest text a scroll animation can hold (a command payload is at
/// most 19 bytes; the advertising name is shorter)
pub const MAX_SCROLL_TEXT: usize = 32;

/// Columns per glyph including the inter-character gap
const GLYPH_STRIDE: usize = font::GLYPH_SIZE as usize + 1;

/// Time each row stays lit during a scan pass
const ROW_SCAN_US: u64 = 2000;

/// Scroll animation state
#[derive(Debug, Clone)]
struct Scroll {
    text: Vec<u8, MAX_SCROLL_TEXT>,
    speed_ms: u16,
    /// Window position in the virtual column strip
    position: usize,
    /// When the next column step is due
    next_step_ms: u64,
    /// Restart after a pause instead of finishing (idle name scroll)
    repeat: bool,
}

impl Scroll {
    /// Length of the virtual strip: lead-in blank plus glyph columns
    fn strip_len(&self) -> usize {
        MATRIX_SIZE + self.text.len() * GLYPH_STRIDE
    }

    /// Vertical pixel slice at strip index `i`
    fn column_at(&self, i: usize) -> u8 {
        if i < MATRIX_SIZE {
            return 0; // lead-in
        }
        let j = i - MATRIX_SIZE;
        let offset = j % GLYPH_STRIDE;
        if offset == font::GLYPH_SIZE as usize {
            return 0; // inter-character gap
        }
        match self.text.get(j / GLYPH_STRIDE) {
            Some(&byte) => font::column(font::glyph(byte), offset as u8),
            None => 0,
        }
    }
}

/// Frame buffer and animation state shared with the scan task
pub struct MatrixState {
    frame: [[u8; MATRIX_SIZE]; MATRIX_SIZE],
    anim: Option<Scroll>,
}

impl MatrixState {
    const fn new() -> Self {
        Self {
            frame: [[0; MATRIX_SIZE]; MATRIX_SIZE],
            anim: None,
        }
    }

    /// Render the scroll window into the frame buffer
    fn render_window(&mut self) {
        let Some(anim) = &self.anim else { return };
        let mut frame = [[0u8; MATRIX_SIZE]; MATRIX_SIZE];
        for x in 0..MATRIX_SIZE {
            let bits = anim.column_at(anim.position + x);
            for (y, row) in frame.iter_mut().enumerate() {
                if bits >> y & 1 != 0 {
                    row[x] = 255;
                }
            }
        }
        self.frame = frame;
    }

    /// Advance the animation if a column step is due
    fn step(&mut self, now_ms: u64) {
        let Some(anim) = &mut self.anim else { return };
        if now_ms < anim.next_step_ms {
            return;
        }

        if anim.position + MATRIX_SIZE >= anim.strip_len() {
            if anim.repeat {
                anim.position = 0;
                anim.next_step_ms = now_ms + IDLE_SCROLL_PAUSE_MS;
            } else {
                self.anim = None;
                self.frame = [[0; MATRIX_SIZE]; MATRIX_SIZE];
                return;
            }
        } else {
            anim.position += 1;
            anim.next_step_ms = now_ms + u64::from(anim.speed_ms);
        }
        self.render_window();
    }
}

/// The matrix state, shared between the scan task and display handles
pub static MATRIX: Mutex<CriticalSectionRawMutex, RefCell<MatrixState>> =
    Mutex::new(RefCell::new(MatrixState::new()));

/// Cheap accessor implementing the core's display sink over [`MATRIX`]
pub struct MatrixHandle;

impl MatrixHandle {
    fn start_scroll(
        &mut self,
        text: &[u8],
        speed_ms: u16,
        repeat: bool,
    ) -> Result<(), DisplayError> {
        let mut buffer = Vec::new();
        buffer
            .extend_from_slice(text)
            .map_err(|_| DisplayError::TextTooLong)?;

        MATRIX.lock(|state| {
            let mut state = state.borrow_mut();
            state.anim = Some(Scroll {
                text: buffer,
                speed_ms,
                position: 0,
                next_step_ms: 0,
                repeat,
            });
            state.render_window();
        });
        Ok(())
    }

    /// Scroll that restarts after each pass, for the idle name display
    pub fn scroll_repeating(&mut self, text: &[u8], speed_ms: u16) -> Result<(), DisplayError> {
        self.start_scroll(text, speed_ms, true)
    }

    /// Blank the frame and stop any animation
    pub fn clear(&mut self) {
        MATRIX.lock(|state| {
            let mut state = state.borrow_mut();
            state.anim = None;
            state.frame = [[0; MATRIX_SIZE]; MATRIX_SIZE];
        });
    }
}

impl DisplaySink for MatrixHandle {
    fn stop_animation(&mut self) {
        MATRIX.lock(|state| state.borrow_mut().anim = None);
    }

    fn scroll(&mut self, text: &[u8], speed_ms: u16) -> Result<(), DisplayError> {
        self.start_scroll(text, speed_ms, false)
    }

    fn print(&mut self, text: &[u8]) -> Result<(), DisplayError> {
        let glyph = font::glyph(text.first().copied().unwrap_or(b' '));
        MATRIX.lock(|state| {
            let mut state = state.borrow_mut();
            for (y, row) in glyph.iter().enumerate() {
                for x in 0..MATRIX_SIZE {
                    let lit = row >> (MATRIX_SIZE - 1 - x) & 1 != 0;
                    state.frame[y][x] = if lit { 255 } else { 0 };
                }
            }
        });
        Ok(())
    }

    fn set_pixel(&mut self, x: u8, y: u8, brightness: u8) -> Result<(), DisplayError> {
        if usize::from(x) >= MATRIX_SIZE || usize::from(y) >= MATRIX_SIZE {
            return Err(DisplayError::OutOfBounds);
        }
        MATRIX.lock(|state| {
            state.borrow_mut().frame[usize::from(y)][usize::from(x)] = brightness;
        });
        Ok(())
    }
}

/// Matrix scan task: steps the animation and multiplexes one row at a
/// time. Row high + column low lights a pixel.
#[embassy_executor::task]
pub async fn matrix_task(
    mut rows: [Output<'static>; MATRIX_SIZE],
    mut cols: [Output<'static>; MATRIX_SIZE],
) {
    defmt::info!("Matrix scan task started");

    let mut active_row = 0usize;

    loop {
        let frame = MATRIX.lock(|state| {
            let mut state = state.borrow_mut();
            state.step(Instant::now().as_millis());
            state.frame
        });

        rows[active_row].set_low();
        active_row = (active_row + 1) % MATRIX_SIZE;

        for (x, col) in cols.iter_mut().enumerate() {
            if frame[active_row][x] > 0 {
                col.set_low();
            } else {
                col.set_high();
            }
        }
        rows[active_row].set_high();

        Timer::after(Duration::from_micros(ROW_SCAN_US)).await;
    }
}
