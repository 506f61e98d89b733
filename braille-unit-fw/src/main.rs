//! Braille display unit firmware
//!
//! Runs the unit's cooperative poll loop on an RP2040: host link on UART0,
//! three push buttons, a buzzer and an SH1106 OLED that shows the braille
//! grid, the clock and the translation mode.
//!
//! Pin assignments:
//! - GPIO0/1: UART0 TX/RX to the host
//! - GPIO2: `next` button, GPIO3: `mode` button, GPIO4: `send` button
//! - GPIO5: buzzer
//! - GPIO14/15: I2C1 SDA/SCL to the OLED

#![no_std]
#![no_main]

mod sh1106;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{I2C1, UART0};
use embassy_rp::uart::{BufferedInterruptHandler, Uart};
use embassy_time::{Instant, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use braille_core::{ButtonPanel, DisplayUnit, PollReport, UnitConfig, DEFAULT_FIFO_CAPACITY};
use braille_hal::UartConfig as LinkConfig;
use braille_hal_rp2040::uart::to_rp_config;
use braille_hal_rp2040::{RpInput, RpOutput, RpUart};
use braille_screen::BrailleScreen;

use crate::sh1106::Sh1106;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    I2C1_IRQ => i2c::InterruptHandler<I2C1>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Pause between poll passes
const POLL_INTERVAL_MS: u64 = 5;

type Unit = DisplayUnit<
    RpUart,
    RpInput<'static>,
    RpOutput<'static>,
    BrailleScreen,
    DEFAULT_FIFO_CAPACITY,
>;

fn now_ms() -> u64 {
    Instant::now().as_millis()
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Braille display unit starting...");

    let p = embassy_rp::init(Default::default());

    // Host link
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);
    let link_config = to_rp_config(&LinkConfig::default());
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, link_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    info!("UART initialized for host link");

    // OLED
    let i2c = I2c::new_async(p.I2C1, p.PIN_15, p.PIN_14, Irqs, i2c::Config::default());
    let mut oled = Sh1106::new(i2c);
    match oled.init().await {
        Ok(()) => info!("OLED initialized"),
        Err(e) => error!("Failed to initialize display: {:?}", e),
    }

    // Buttons are pulled up and read low while pressed
    let config = UnitConfig::default();
    let panel = ButtonPanel::new(
        RpInput::new(Input::new(p.PIN_2, Pull::Up)),
        RpInput::new(Input::new(p.PIN_3, Pull::Up)),
        RpInput::new(Input::new(p.PIN_4, Pull::Up)),
        config.settle_ms,
    );
    let buzzer = RpOutput::new(Output::new(p.PIN_5, Level::Low));

    let (mut unit, fault): (Unit, _) = DisplayUnit::new(
        config,
        RpUart::new(uart),
        panel,
        buzzer,
        BrailleScreen::new(),
        now_ms(),
    );
    if let Some(e) = fault {
        warn!("Initial render failed: {:?}", e);
    }

    info!("Entering poll loop ({})", config);

    loop {
        let report = unit.poll(now_ms());
        log_report(&report);

        if unit.display_mut().take_dirty() {
            if let Err(e) = oled.flush(unit.display().framebuffer()).await {
                warn!("Display flush failed: {:?}", e);
                unit.display_mut().mark_dirty();
            }
        }

        Timer::after_millis(POLL_INTERVAL_MS).await;
    }
}

fn log_report(report: &PollReport) {
    match report.received {
        Some(Ok(priority)) => debug!("Frame queued: {:?}", priority),
        Some(Err(e)) => warn!("Malformed frame dropped: {:?}", e),
        None => {}
    }

    if let Some(overflow) = report.overflow {
        warn!("FIFO full: {:?}", overflow);
    }
    if let Some(fault) = report.rx_fault {
        warn!("Link receive fault: {:?}", fault);
    }
    if let Some(fault) = report.tx_failed {
        warn!("Control line not sent: {:?}", fault);
    }

    let buttons = report.buttons;
    if buttons.next {
        debug!("Button: next");
    }
    if buttons.mode_toggled {
        debug!("Button: mode");
    }
    if buttons.send {
        debug!("Button: send");
    }

    if let Some(e) = report.display_fault {
        warn!("Render failed: {:?}", e);
    }
}
