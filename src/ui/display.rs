//! SSD1306 OLED renderer.
//!
//! Lays a [`Frame`] out on the 128x64 panel: a header row with the screen
//! title and a link indicator, a rule, then the screen body. All text was
//! already produced by [`View::build`]; this module only places it.

use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X10};
use embedded_graphics::mono_font::{MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, Line as Rule, PrimitiveStyle, Rectangle};
use embedded_graphics::text::Text;
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::{I2CDisplayInterface, Ssd1306};

use crate::config::{OLED_I2C_ADDR, SCREEN_WIDTH};
use crate::dashboard::Renderer;
use crate::data::WeatherIcon;
use crate::error::Error;
use crate::ui::view::{Frame, View};

/// Concrete display driver, generic over the HAL's I²C peripheral.
pub type Display<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

/// Baseline of the header row and the first body row.
const HEADER_Y: i32 = 8;
const BODY_Y: i32 = 24;
const ROW_PITCH: i32 = 12;

pub struct Oled<I2C> {
    display: Display<I2C>,
}

impl<I2C> Oled<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    /// Initialise the controller and blank the panel.
    pub fn new(i2c: I2C) -> Result<Self, Error> {
        let interface = I2CDisplayInterface::new_custom_address(i2c, OLED_I2C_ADDR);
        let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        display.init().map_err(|_| Error::Display)?;
        display.clear_buffer();
        display.flush().map_err(|_| Error::Display)?;
        Ok(Self { display })
    }
}

impl<I2C> Renderer for Oled<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    fn render(&mut self, frame: &Frame) {
        let d = &mut self.display;
        d.clear_buffer();

        draw_header(d, frame.title(), frame.online);
        draw_body(d, &frame.view);

        if d.flush().is_err() {
            warn!("display: flush failed");
        }
    }
}

fn small() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_6X10)
        .text_color(BinaryColor::On)
        .build()
}

fn large() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyle::new(&FONT_10X20, BinaryColor::On)
}

fn text<D>(d: &mut D, s: &str, x: i32, y: i32, style: MonoTextStyle<'static, BinaryColor>)
where
    D: DrawTarget<Color = BinaryColor>,
{
    let _ = Text::new(s, Point::new(x, y), style).draw(d);
}

fn row(n: i32) -> i32 {
    BODY_Y + n * ROW_PITCH
}

fn draw_header<D>(d: &mut D, title: &str, online: bool)
where
    D: DrawTarget<Color = BinaryColor>,
{
    text(d, title, 0, HEADER_Y, small());

    // Filled dot while the link is up, hollow otherwise.
    let dot = Circle::new(Point::new(SCREEN_WIDTH as i32 - 7, 1), 6);
    let style = if online {
        PrimitiveStyle::with_fill(BinaryColor::On)
    } else {
        PrimitiveStyle::with_stroke(BinaryColor::On, 1)
    };
    let _ = dot.into_styled(style).draw(d);

    let _ = Rule::new(Point::new(0, 11), Point::new(SCREEN_WIDTH as i32 - 1, 11))
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
        .draw(d);
}

fn draw_body<D>(d: &mut D, view: &View)
where
    D: DrawTarget<Color = BinaryColor>,
{
    match view {
        View::Clock { time, date } => {
            text(d, time, 24, 36, large());
            text(d, date, 19, 56, small());
        }
        View::Weather {
            icon,
            temperature,
            description,
            humidity,
        } => {
            draw_icon(d, *icon, Point::new(2, 16));
            text(d, temperature, 34, 32, large());
            text(d, description, 0, 50, small());
            text(d, humidity, 0, 62, small());
        }
        View::Events { lines } => {
            for (n, line) in lines.iter().enumerate() {
                text(d, line, 0, row(n as i32), small());
            }
        }
        View::Social { subscribers } => {
            text(d, subscribers, 0, 40, large());
        }
        View::Crypto { btc, eth, ratio } => {
            text(d, btc, 0, row(0), small());
            text(d, eth, 0, row(1), small());
            text(d, ratio, 0, row(2), small());
        }
        View::News { headlines } => {
            for (n, line) in headlines.iter().enumerate() {
                text(d, line, 0, row(n as i32), small());
            }
        }
    }
}

/// 24x24 glyph with its top-left corner at `at`.
fn draw_icon<D>(d: &mut D, icon: WeatherIcon, at: Point)
where
    D: DrawTarget<Color = BinaryColor>,
{
    let stroke = PrimitiveStyle::with_stroke(BinaryColor::On, 1);
    let fill = PrimitiveStyle::with_fill(BinaryColor::On);

    let cloud = |d: &mut D| {
        let _ = Circle::new(at + Point::new(2, 6), 10).into_styled(fill).draw(d);
        let _ = Circle::new(at + Point::new(9, 2), 13).into_styled(fill).draw(d);
        let _ = Rectangle::new(at + Point::new(6, 10), Size::new(14, 6))
            .into_styled(fill)
            .draw(d);
    };

    match icon {
        WeatherIcon::Clear => {
            let _ = Circle::new(at + Point::new(6, 6), 12).into_styled(fill).draw(d);
            let rays = [
                ((12, 0), (12, 3)),
                ((12, 21), (12, 24)),
                ((0, 12), (3, 12)),
                ((21, 12), (24, 12)),
            ];
            for (a, b) in rays {
                let _ = Rule::new(at + Point::new(a.0, a.1), at + Point::new(b.0, b.1))
                    .into_styled(stroke)
                    .draw(d);
            }
        }
        WeatherIcon::FewClouds => {
            let _ = Circle::new(at + Point::new(12, 0), 10).into_styled(stroke).draw(d);
            cloud(d);
        }
        WeatherIcon::Cloudy => cloud(d),
        WeatherIcon::Rain => {
            cloud(d);
            for x in [6, 12, 18] {
                let _ = Rule::new(at + Point::new(x, 18), at + Point::new(x - 2, 23))
                    .into_styled(stroke)
                    .draw(d);
            }
        }
        WeatherIcon::Storm => {
            cloud(d);
            let bolt = [(13, 16), (9, 20), (14, 20), (10, 24)];
            for pair in bolt.windows(2) {
                let _ = Rule::new(
                    at + Point::new(pair[0].0, pair[0].1),
                    at + Point::new(pair[1].0, pair[1].1),
                )
                .into_styled(stroke)
                .draw(d);
            }
        }
        WeatherIcon::Snow => text(d, "*", at.x + 7, at.y + 18, large()),
        WeatherIcon::Mist => {
            for y in [8, 13, 18] {
                let _ = Rule::new(at + Point::new(2, y), at + Point::new(22, y))
                    .into_styled(stroke)
                    .draw(d);
            }
        }
        WeatherIcon::Unknown => text(d, "?", at.x + 7, at.y + 18, large()),
    }
}
