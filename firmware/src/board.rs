//! Reference EC test board on a Teensy 2.0 (ATmega32U4).
//!
//! 4 rows x 8 columns, row-major: the rows sit behind a 4-channel analog
//! multiplexer and each column has its own strobe line.
//!
//! Pin mapping:
//!   Mux address lines: PB4 (A0), PB5 (A1)
//!   Column strobes:    PB0, PB1, PB2, PB3, PB6, PC6, PC7, PD7
//!   Drain:             PF1
//!   Sense input:       PF0 (ADC0)
//!   Status LED:        PD6
//!
//! Every value here is checked at compile time.

use esc_matrix::config::assert_wiring;
use esc_matrix::{AnalogMatrix, MatrixHooks, RowMajor, ScanOrder, Thresholds};

use crate::adc::SenseAdc;
use crate::gpio::{DrainPin, Gpio, Port};

/// Number of rows in the matrix.
pub const ROWS: usize = 4;
/// Number of columns in the matrix.
pub const COLS: usize = 8;
/// Address lines for 4 multiplexed rows.
pub const MUX_LINES: usize = 2;

/// Latch/unlatch points on the 6-bit sample scale.
pub const THRESHOLDS: Thresholds = Thresholds::new(58, 48);

pub type Order = RowMajor;

const MUX_PINS: [Gpio; MUX_LINES] = [Gpio::new(Port::B, 4), Gpio::new(Port::B, 5)];

const COL_PINS: [Gpio; COLS] = [
    Gpio::new(Port::B, 0),
    Gpio::new(Port::B, 1),
    Gpio::new(Port::B, 2),
    Gpio::new(Port::B, 3),
    Gpio::new(Port::B, 6),
    Gpio::new(Port::C, 6),
    Gpio::new(Port::C, 7),
    Gpio::new(Port::D, 7),
];

const DRAIN_PIN: Gpio = Gpio::new(Port::F, 1);
const ADC_CHANNEL: u8 = 0;
const LED_PIN: Gpio = Gpio::new(Port::D, 6);

const _: () = assert_wiring(Order::TOPOLOGY, ROWS, COLS, MUX_LINES, COL_PINS.len());

/// Whether `pin` is one of the pins the firmware drives as an output.
const fn is_driven(pin: Gpio) -> bool {
    let mut i = 0;
    while i < MUX_LINES {
        if MUX_PINS[i].same_pin(&pin) {
            return true;
        }
        i += 1;
    }
    let mut i = 0;
    while i < COLS {
        if COL_PINS[i].same_pin(&pin) {
            return true;
        }
        i += 1;
    }
    DRAIN_PIN.same_pin(&pin) || LED_PIN.same_pin(&pin)
}

const _: () = assert!(
    !is_driven(SenseAdc::new(ADC_CHANNEL).pin()),
    "the ADC input must not share a pin with an output"
);

pub type BoardMatrix =
    AnalogMatrix<Order, Gpio, DrainPin, SenseAdc, StatusLed, ROWS, COLS, MUX_LINES, COLS>;

/// Board hook: LED on once the matrix is up, toggled on every change.
pub struct StatusLed {
    pin: Gpio,
    lit: bool,
}

impl MatrixHooks for StatusLed {
    fn after_init(&mut self) {
        self.lit = true;
        self.pin.write(true);
    }

    fn after_scan(&mut self, changed: bool) {
        if changed {
            self.lit = !self.lit;
            self.pin.write(self.lit);
        }
    }
}

/// Set output directions and build the matrix. Call `init()` on the result
/// before the first scan; it sinks the drain and puts the ADC pin in input
/// mode.
pub fn matrix() -> BoardMatrix {
    for pin in MUX_PINS.iter().chain(COL_PINS.iter()) {
        pin.make_output();
    }
    LED_PIN.make_output();

    let adc = SenseAdc::new(ADC_CHANNEL);
    adc.enable();

    AnalogMatrix::with_hooks(
        MUX_PINS,
        COL_PINS,
        DrainPin::new(DRAIN_PIN),
        adc,
        THRESHOLDS,
        StatusLed {
            pin: LED_PIN,
            lit: false,
        },
    )
}
