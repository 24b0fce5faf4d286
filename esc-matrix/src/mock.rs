//! Mock implementations for testing
//!
//! A [`Bench`] stands in for a whole EC board: address lines, sense lines,
//! the drain and the ADC all share one recorded state. The ADC returns the
//! analog level configured for the unit currently on the multiplexer and
//! the sense line currently driven high, or zero when no line is charging.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, OutputPin};

use crate::hal::{AnalogSense, DrainLine};

/// Which output a [`MockPin`] is wired to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinRole {
    Mux(usize),
    Sense(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainState {
    Unconfigured,
    Floating,
    Sinking,
}

/// Everything the bench saw, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Line { role: PinRole, high: bool },
    Drain(DrainState),
    AdcSelect,
    Sample {
        address: u8,
        line: Option<usize>,
        value: u16,
    },
}

#[derive(Debug)]
struct Board {
    address: u8,
    sense_high: BTreeSet<usize>,
    drain: DrainState,
    adc_selected: bool,
    levels: HashMap<(u8, usize), u16>,
    log: Vec<Event>,
}

/// Shared handle to a simulated board.
#[derive(Debug, Clone)]
pub struct Bench {
    board: Rc<RefCell<Board>>,
}

impl Default for Bench {
    fn default() -> Self {
        Self::new()
    }
}

impl Bench {
    pub fn new() -> Self {
        Self {
            board: Rc::new(RefCell::new(Board {
                address: 0,
                sense_high: BTreeSet::new(),
                drain: DrainState::Unconfigured,
                adc_selected: false,
                levels: HashMap::new(),
                log: Vec::new(),
            })),
        }
    }

    pub fn mux_line(&self, index: usize) -> MockPin {
        MockPin {
            board: Rc::clone(&self.board),
            role: PinRole::Mux(index),
        }
    }

    pub fn sense_line(&self, index: usize) -> MockPin {
        MockPin {
            board: Rc::clone(&self.board),
            role: PinRole::Sense(index),
        }
    }

    pub fn drain(&self) -> MockDrain {
        MockDrain {
            board: Rc::clone(&self.board),
        }
    }

    pub fn adc(&self) -> MockAdc {
        MockAdc {
            board: Rc::clone(&self.board),
        }
    }

    /// Set the level sampled when `address` is on the mux and `sense` is
    /// charging.
    pub fn set_level(&self, address: u8, sense: usize, value: u16) {
        self.board.borrow_mut().levels.insert((address, sense), value);
    }

    /// The address currently encoded on the mux lines.
    pub fn address(&self) -> u8 {
        self.board.borrow().address
    }

    pub fn drain_state(&self) -> DrainState {
        self.board.borrow().drain
    }

    pub fn adc_selected(&self) -> bool {
        self.board.borrow().adc_selected
    }

    pub fn sense_high(&self, index: usize) -> bool {
        self.board.borrow().sense_high.contains(&index)
    }

    pub fn events(&self) -> Vec<Event> {
        self.board.borrow().log.clone()
    }

    pub fn clear_events(&self) {
        self.board.borrow_mut().log.clear();
    }

    /// Every sample taken so far, oldest first.
    pub fn samples(&self) -> Vec<(u8, Option<usize>, u16)> {
        self.board
            .borrow()
            .log
            .iter()
            .filter_map(|event| match *event {
                Event::Sample {
                    address,
                    line,
                    value,
                } => Some((address, line, value)),
                _ => None,
            })
            .collect()
    }
}

/// A mux address line or a sense line.
#[derive(Debug)]
pub struct MockPin {
    board: Rc<RefCell<Board>>,
    role: PinRole,
}

impl MockPin {
    fn drive(&mut self, high: bool) {
        let mut board = self.board.borrow_mut();
        match self.role {
            PinRole::Mux(bit) => {
                if high {
                    board.address |= 1 << bit;
                } else {
                    board.address &= !(1 << bit);
                }
            }
            PinRole::Sense(line) => {
                if high {
                    board.sense_high.insert(line);
                } else {
                    board.sense_high.remove(&line);
                }
            }
        }
        board.log.push(Event::Line {
            role: self.role,
            high,
        });
    }
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true);
        Ok(())
    }
}

#[derive(Debug)]
pub struct MockDrain {
    board: Rc<RefCell<Board>>,
}

impl MockDrain {
    fn set(&mut self, state: DrainState) {
        let mut board = self.board.borrow_mut();
        board.drain = state;
        board.log.push(Event::Drain(state));
    }
}

impl DrainLine for MockDrain {
    fn float(&mut self) {
        self.set(DrainState::Floating);
    }

    fn sink(&mut self) {
        self.set(DrainState::Sinking);
    }
}

#[derive(Debug)]
pub struct MockAdc {
    board: Rc<RefCell<Board>>,
}

impl AnalogSense for MockAdc {
    fn select(&mut self) {
        let mut board = self.board.borrow_mut();
        board.adc_selected = true;
        board.log.push(Event::AdcSelect);
    }

    fn sample(&mut self) -> u16 {
        let mut board = self.board.borrow_mut();
        let address = board.address;
        // Only one sense line charges at a time; anything else reads as no line.
        let line = match board.sense_high.len() {
            1 => board.sense_high.first().copied(),
            _ => None,
        };
        let value = line
            .and_then(|line| board.levels.get(&(address, line)).copied())
            .unwrap_or(0);
        board.log.push(Event::Sample {
            address,
            line,
            value,
        });
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adc_reads_level_of_charging_line_at_current_address() {
        let bench = Bench::new();
        bench.set_level(1, 2, 40);
        let mut mux = bench.mux_line(0);
        let mut sense = bench.sense_line(2);
        let mut adc = bench.adc();

        mux.set_high().unwrap();
        assert_eq!(adc.sample(), 0, "nothing charging");

        sense.set_high().unwrap();
        assert_eq!(adc.sample(), 40);

        mux.set_low().unwrap();
        assert_eq!(adc.sample(), 0, "address 0 has no level");
    }

    #[test]
    fn sense_lines_past_the_packed_row_width_are_tracked() {
        let bench = Bench::new();
        bench.set_level(0, 40, 61);
        let mut sense = bench.sense_line(40);
        let mut other = bench.sense_line(3);
        let mut adc = bench.adc();

        sense.set_high().unwrap();
        assert!(bench.sense_high(40));
        assert_eq!(adc.sample(), 61);

        other.set_high().unwrap();
        assert_eq!(adc.sample(), 0, "two lines charging");

        sense.set_low().unwrap();
        other.set_low().unwrap();
        assert!(!bench.sense_high(40));
        assert_eq!(bench.samples().last(), Some(&(0, None, 0)));
    }
}
