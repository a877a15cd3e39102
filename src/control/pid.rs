//! Shared PID core and settling detection.

/// PID on a scalar error signal.
///
/// Integral and derivative terms scale with the true elapsed time, so the
/// loop stays correct under variable, non-uniform tick periods; a zero delta
/// skips both terms. The integral accumulator is clamped so its contribution
/// can never exceed the normalized output range.
#[derive(Clone, Debug)]
pub(crate) struct Pid {
    kp: f64,
    ki: f64,
    kd: f64,
    output_limit: f64,
    integral: f64,
    prev_error: Option<f64>,
}

impl Pid {
    pub fn new(kp: f64, ki: f64, kd: f64, output_limit: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            output_limit,
            integral: 0.0,
            prev_error: None,
        }
    }

    /// Clear accumulated state.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = None;
    }

    /// One control step. `elapsed_sec` is the true delta since the previous
    /// step.
    pub fn update(&mut self, error: f64, elapsed_sec: f64) -> f64 {
        let mut derivative = 0.0;
        if elapsed_sec > 0.0 {
            if let Some(prev) = self.prev_error {
                derivative = (error - prev) / elapsed_sec;
            }
            self.integral += error * elapsed_sec;
            if self.ki != 0.0 {
                let i_max = self.output_limit / self.ki.abs();
                self.integral = self.integral.clamp(-i_max, i_max);
            }
        }
        self.prev_error = Some(error);

        self.kp * error + self.ki * self.integral + self.kd * derivative
    }
}

/// Convergence test: the error must stay inside the tolerance band for a
/// settling period, not merely touch it once.
#[derive(Clone, Debug)]
pub(crate) struct SettlingDetector {
    tolerance: f64,
    settling_sec: f64,
    time_in_band_sec: f64,
}

impl SettlingDetector {
    pub fn new(tolerance: f64, settling_sec: f64) -> Self {
        Self {
            tolerance,
            settling_sec,
            time_in_band_sec: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.time_in_band_sec = 0.0;
    }

    /// Track one error sample. Leaving the band restarts the settling period.
    pub fn observe(&mut self, error: f64, elapsed_sec: f64) {
        if error.abs() <= self.tolerance {
            self.time_in_band_sec += elapsed_sec.max(0.0);
        } else {
            self.time_in_band_sec = 0.0;
        }
    }

    pub fn is_settled(&self) -> bool {
        self.time_in_band_sec >= self.settling_sec
    }
}
