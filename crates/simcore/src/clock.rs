use crate::SimContext;

/// Global simulation clock owned by the time-stepping driver.
///
/// Time is derived from the step counter (`t = step * dt`) rather than
/// accumulated, so runs with the same step size land on identical time stamps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimClock {
    dt: f64,
    step: u64,
}

impl SimClock {
    pub fn new(dt: f64) -> Self {
        SimClock { dt, step: 0 }
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn t(&self) -> f64 {
        self.step as f64 * self.dt
    }

    /// Context for the step about to be taken.
    pub fn context(&self) -> SimContext {
        SimContext {
            dt: self.dt,
            t: self.t(),
        }
    }

    /// Moves the clock forward by one fixed step.
    pub fn advance(&mut self) {
        self.step += 1;
    }

    /// Number of steps needed from zero until `t >= end_time`.
    pub fn steps_until(&self, end_time: f64) -> u64 {
        if end_time <= 0.0 {
            return 0;
        }
        // Tolerance keeps 5.0 / 0.001 from becoming 5001 steps
        (end_time / self.dt - 1e-9).ceil().max(0.0) as u64
    }

    pub fn reached(&self, end_time: f64) -> bool {
        self.step >= self.steps_until(end_time)
    }
}
