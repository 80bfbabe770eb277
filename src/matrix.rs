//! GPIO side of the 4×14 key matrix.
//!
//! Rows are driven low one at a time; columns are pulled up and read low
//! when the key at the crossing is down. The result feeds
//! [`cardkey::keys::layout::MatrixScanner`].

use cardkey::config::MATRIX_SETTLE_US;
use cardkey::keys::layout::{Position, COLS, MAX_PRESSED, ROWS};
use embassy_nrf::gpio::{Input, Output};
use embassy_time::Timer;
use heapless::Vec;

pub type Pressed = Vec<Position, MAX_PRESSED>;

pub struct Matrix<'d> {
    rows: [Output<'d>; ROWS],
    cols: [Input<'d>; COLS],
}

impl<'d> Matrix<'d> {
    /// `rows` must start high; `cols` must be pulled up.
    pub fn new(rows: [Output<'d>; ROWS], cols: [Input<'d>; COLS]) -> Self {
        Self { rows, cols }
    }

    /// Sample every position once, in row-major order.
    pub async fn scan(&mut self) -> Pressed {
        let mut pressed = Pressed::new();
        for (r, row) in self.rows.iter_mut().enumerate() {
            row.set_low();
            Timer::after_micros(MATRIX_SETTLE_US).await;
            for (c, col) in self.cols.iter().enumerate() {
                if col.is_low() && pressed.push(Position::new(r as u8, c as u8)).is_err() {
                    break;
                }
            }
            row.set_high();
        }
        pressed
    }
}
