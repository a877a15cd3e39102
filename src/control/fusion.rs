//! Differential fusion of drive and turn control outputs.

/// Normalized tank-drive command. Both components are clamped to [-1, 1]
/// before being forwarded to the drivetrain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotorCommand {
    pub left: f64,
    pub right: f64,
}

impl MotorCommand {
    pub const STOP: MotorCommand = MotorCommand {
        left: 0.0,
        right: 0.0,
    };

    /// Pure rotation in place: positive `control` spins clockwise.
    pub fn rotation(control: f64) -> Self {
        let c = control.clamp(-1.0, 1.0);
        Self { left: c, right: -c }
    }
}

/// Combine forward-drive and turn outputs into wheel commands:
/// `left = distance + bearing`, `right = distance - bearing`, each clamped to
/// [-1, 1] after the combination. The two axes are treated as decoupled,
/// which holds for small bearing errors; no cross-coupling compensation is
/// applied.
pub fn fuse(distance_control: f64, bearing_control: f64) -> MotorCommand {
    MotorCommand {
        left: (distance_control + bearing_control).clamp(-1.0, 1.0),
        right: (distance_control - bearing_control).clamp(-1.0, 1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_straight_drive() {
        assert_eq!(fuse(0.5, 0.0), MotorCommand { left: 0.5, right: 0.5 });
    }

    #[test]
    fn test_turn_bias() {
        let cmd = fuse(0.4, 0.2);
        assert!((cmd.left - 0.6).abs() < 1e-12);
        assert!((cmd.right - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_clamped_after_combination() {
        // Summation first, then the clamp: an unclamped distance term of 1.5
        // still saturates BOTH wheels. Clamping the inputs first would leave
        // the right wheel at 0.5.
        let cmd = fuse(1.5, 0.5);
        assert_eq!(cmd, MotorCommand { left: 1.0, right: 1.0 });
    }

    #[test]
    fn test_output_always_in_range() {
        let extremes = [-1e9, -3.7, -1.0, 0.0, 1.0, 42.0, 1e9, f64::MAX];
        for &d in &extremes {
            for &b in &extremes {
                let cmd = fuse(d, b);
                assert!((-1.0..=1.0).contains(&cmd.left));
                assert!((-1.0..=1.0).contains(&cmd.right));
            }
        }
    }

    #[test]
    fn test_clamp_is_idempotent() {
        let cmd = fuse(2.0, -0.5);
        let reclamped = MotorCommand {
            left: cmd.left.clamp(-1.0, 1.0),
            right: cmd.right.clamp(-1.0, 1.0),
        };
        assert_eq!(cmd, reclamped);
    }

    #[test]
    fn test_rotation_command() {
        assert_eq!(
            MotorCommand::rotation(0.3),
            MotorCommand { left: 0.3, right: -0.3 }
        );
        assert_eq!(
            MotorCommand::rotation(-2.0),
            MotorCommand { left: -1.0, right: 1.0 }
        );
    }
}
