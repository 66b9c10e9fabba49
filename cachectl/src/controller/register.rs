/// Interface to a clocked component.
pub trait Clocked {
    /// Simulate a clock edge.
    fn update(&mut self);
}

/// A register.
///
/// Values driven during a cycle become visible after the next [Clocked::update].
#[derive(Clone, Copy, Debug)]
pub struct Reg<T: Copy> {
    data: T,
    next: Option<T>,
}

impl<T: Copy> Reg<T> {
    pub fn new(init: T) -> Self {
        Self { data: init, next: None }
    }

    /// Drive input to this register.
    pub fn drive(&mut self, val: T) {
        self.next = Some(val);
    }

    /// Sample the current value of this register.
    pub fn sample(&self) -> T {
        self.data
    }
}

impl<T: Copy> Clocked for Reg<T> {
    fn update(&mut self) {
        if let Some(next) = self.next.take() {
            self.data = next;
        }
    }
}

/// Free-running counter with synchronous reset.
///
/// Counts up on every clock edge unless reset was requested during the cycle,
/// in which case it reads 0 after the edge.
#[derive(Clone, Copy, Debug)]
pub struct Counter {
    value: Reg<u8>,
    reset: bool,
}

impl Counter {
    pub fn new() -> Self {
        Self {
            value: Reg::new(0),
            reset: false,
        }
    }

    pub fn sample(&self) -> u8 {
        self.value.sample()
    }

    /// Value after the next edge, given the reset input for this cycle.
    pub fn next_value(&self, reset: bool) -> u8 {
        if reset {
            0
        } else {
            self.sample().wrapping_add(1)
        }
    }

    /// Request a synchronous reset at the next edge.
    pub fn reset(&mut self) {
        self.reset = true;
    }
}

impl Clocked for Counter {
    fn update(&mut self) {
        let reset = std::mem::replace(&mut self.reset, false);
        let next = self.next_value(reset);
        self.value.drive(next);
        self.value.update();
    }
}
