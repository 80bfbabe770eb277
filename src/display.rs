//! SSD1306 OLED status panel.
//!
//! Six text rows of `FONT_6X10`. The panel is monochrome, so highlight
//! colors render as inverted rows and brightness maps to contrast.

use cardkey::ui::{Color, Line};
use cardkey::{Error, StatusDisplay};
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::{MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::I2CDisplayInterface;
use ssd1306::Ssd1306;

/// Type alias for the concrete display driver.
///
/// Generic over the I²C implementation so callers pass in their HAL's
/// I²C peripheral.
pub type Display<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

const ROW_HEIGHT: u32 = 10;
const PANEL_WIDTH: u32 = 128;

pub struct OledStatus<I2C> {
    display: Display<I2C>,
}

impl<I2C> OledStatus<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    /// Initialise the SSD1306 display and clear the screen.
    pub fn new(i2c: I2C) -> Self {
        let interface = I2CDisplayInterface::new(i2c);
        let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        if display.init().is_err() {
            defmt::warn!("Display: init failed");
        }
        display.clear_buffer();
        if display.flush().is_err() {
            defmt::warn!("Display: initial flush failed");
        }
        Self { display }
    }
}

fn text_style(color: BinaryColor) -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_6X10)
        .text_color(color)
        .build()
}

impl<I2C> StatusDisplay for OledStatus<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    fn draw_line(&mut self, line: Line, text: &str, color: Color) -> Result<(), Error> {
        let top = (line.index() as u32 * ROW_HEIGHT) as i32;
        let (background, foreground) = if color.is_highlight() && !text.is_empty() {
            (BinaryColor::On, BinaryColor::Off)
        } else {
            (BinaryColor::Off, BinaryColor::On)
        };

        let _ = Rectangle::new(Point::new(0, top), Size::new(PANEL_WIDTH, ROW_HEIGHT))
            .into_styled(PrimitiveStyle::with_fill(background))
            .draw(&mut self.display);
        let _ = Text::with_baseline(
            text,
            Point::new(0, top),
            text_style(foreground),
            Baseline::Top,
        )
        .draw(&mut self.display);

        self.display.flush().map_err(|_| Error::Display)
    }

    fn set_brightness(&mut self, level: u8) -> Result<(), Error> {
        self.display
            .set_brightness(Brightness::custom(1, level))
            .map_err(|_| Error::Display)
    }
}
