#![deny(warnings)]

use embedded_graphics::{
    mono_font::MonoTextStyleBuilder,
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle},
    text::{Baseline, Text, TextStyleBuilder},
};
use embedded_hal::delay::DelayNs;
use epd_driver::{prelude::*, ssd1619::Ssd1619};
use linux_embedded_hal::{
    spidev::{self, SpidevOptions},
    sysfs_gpio::Direction,
    Delay, SpidevDevice, SysfsPin,
};

// The pins in this example are for a 2.9" SSD1619 panel on the Universal e-Paper Raw Panel Driver HAT
// activate spi, gpio in raspi-config
// needs to be run with sudo because of some sysfs_gpio permission problems and follow-up timing problems
// see https://github.com/rust-embedded/rust-sysfs-gpio/issues/5 and follow-up issues

const WIDTH: u32 = 296;
const HEIGHT: u32 = 128;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Configure SPI, chip select is driven by spidev (CE0)
    let mut spi = SpidevDevice::open("/dev/spidev0.0").expect("spidev directory");
    let options = SpidevOptions::new()
        .bits_per_word(8)
        .max_speed_hz(4_000_000)
        .mode(spidev::SpiModeFlags::SPI_MODE_0)
        .build();
    spi.configure(&options).expect("spi configuration");

    let busy = SysfsPin::new(24); // GPIO 24, board J-18
    busy.export().expect("busy export");
    while !busy.is_exported() {}
    busy.set_direction(Direction::In).expect("busy Direction");

    let dc = SysfsPin::new(25); // GPIO 25, board J-22
    dc.export().expect("dc export");
    while !dc.is_exported() {}
    dc.set_direction(Direction::Out).expect("dc Direction");
    dc.set_value(1).expect("dc Value set to 1");

    let rst = SysfsPin::new(17); // GPIO 17, board J-11
    rst.export().expect("rst export");
    while !rst.is_exported() {}
    rst.set_direction(Direction::Out).expect("rst Direction");
    rst.set_value(1).expect("rst Value set to 1");

    let panel = Panel::new(WIDTH, HEIGHT, ColorMode::Monochrome)?;
    let mut epd = Ssd1619::new(
        spi,
        PinConfig::new(busy, dc, rst),
        Delay {},
        panel,
        Config::default(),
    )?;
    let mut pause = Delay {};

    epd.initialize()?;
    let info = epd.query_info();
    println!(
        "{} {}x{} version {:#06x}",
        info.chip_name, info.width, info.height, info.version
    );

    epd.clear(Color::White)?;

    let mut frame = PixelBuffer::filled(WIDTH, HEIGHT, Color::White)?;

    // draw a analog clock
    let _ = Circle::with_center(Point::new(64, 64), 80)
        .into_styled(PrimitiveStyle::with_stroke(Color::Black, 1))
        .draw(&mut frame);
    let _ = Line::new(Point::new(64, 64), Point::new(30, 40))
        .into_styled(PrimitiveStyle::with_stroke(Color::Black, 4))
        .draw(&mut frame);
    let _ = Line::new(Point::new(64, 64), Point::new(80, 40))
        .into_styled(PrimitiveStyle::with_stroke(Color::Black, 1))
        .draw(&mut frame);
    draw_text(&mut frame, "It's working-WoB!", 120, 10);

    epd.display_full(frame.as_bytes(), UpdateMode::Full)?;
    pause.delay_ms(5000);

    // a counter refreshed through a small window
    for i in 0..10 {
        let mut window = PixelBuffer::filled(64, 16, Color::White)?;
        draw_text(&mut window, &format!("  {i}  "), 0, 0);
        epd.display_region(window.as_bytes(), 160, 64, 64, 16)?;
        pause.delay_ms(1_000);
    }

    println!("Finished tests - going to sleep");
    let (_spi, _pins, _delay) = epd.deinitialize()?;
    Ok(())
}

fn draw_text(target: &mut PixelBuffer, text: &str, x: i32, y: i32) {
    let style = MonoTextStyleBuilder::new()
        .font(&embedded_graphics::mono_font::ascii::FONT_6X10)
        .text_color(Color::White)
        .background_color(Color::Black)
        .build();

    let text_style = TextStyleBuilder::new().baseline(Baseline::Top).build();

    let _ = Text::with_text_style(text, Point::new(x, y), style, text_style).draw(target);
}
