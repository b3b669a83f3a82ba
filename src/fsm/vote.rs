//! Cleaning-evidence vote.
//!
//! Not every robot firmware exposes an "is cleaning" flag, so the engine
//! counts independent hints instead.  Each hint contributes one vote:
//!
//! | # | Signal                                           |
//! |---|--------------------------------------------------|
//! | 1 | charging state is NotCharging or Waiting         |
//! | 2 | battery current below the discharge threshold    |
//! | 3 | left wheel motor above the noise margin          |
//! | 4 | right wheel motor above the noise margin         |
//! | 5 | main brush motor above the noise margin          |
//! | 6 | side brush motor above the noise margin          |
//! | 7 | stasis sensor reports forward motion             |

use crate::config::SystemConfig;
use crate::protocol::SensorFrame;

/// Which of the seven cleaning signals a frame asserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CleaningEvidence {
    pub off_charger: bool,
    pub discharging: bool,
    /// Left wheel, right wheel, main brush, side brush.
    pub motors: [bool; 4],
    pub moving_forward: bool,
}

impl CleaningEvidence {
    pub fn from_frame(frame: &SensorFrame, config: &SystemConfig) -> Self {
        Self {
            off_charger: frame.charging_state.is_off_charger(),
            discharging: frame.current_ma < config.discharge_current_ma,
            motors: frame.motor_currents().map(|ma| ma > config.motor_noise_ma),
            moving_forward: frame.moving_forward(),
        }
    }

    /// Number of asserted signals (0–7).
    pub fn votes(&self) -> u8 {
        let motors = self.motors.iter().filter(|&&on| on).count() as u8;
        u8::from(self.off_charger) + u8::from(self.discharging) + motors + u8::from(self.moving_forward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::frame::tests::FrameBytes;

    fn votes(bytes: FrameBytes) -> u8 {
        CleaningEvidence::from_frame(&bytes.decode(), &SystemConfig::default()).votes()
    }

    #[test]
    fn docked_and_quiet_scores_zero() {
        // Full charge on the dock, charging current, motors off.
        let f = FrameBytes::new().charging(2).battery(16_500, 200, 2600, 2700);
        assert_eq!(votes(f), 0);
    }

    #[test]
    fn full_cleaning_scores_seven() {
        let f = FrameBytes::new()
            .charging(0)
            .battery(15_000, -1400, 2000, 2700)
            .motors([180, 175, 420, 60])
            .stasis(1);
        assert_eq!(votes(f), 7);
    }

    #[test]
    fn noise_margin_is_exclusive() {
        let margin = SystemConfig::default().motor_noise_ma;
        let f = FrameBytes::new().charging(2).motors([margin, margin + 1, 0, -300]);
        assert_eq!(votes(f), 1);
    }

    #[test]
    fn discharge_threshold_is_exclusive() {
        let threshold = SystemConfig::default().discharge_current_ma;
        let at = FrameBytes::new().charging(2).battery(0, threshold, 0, 0);
        let below = FrameBytes::new().charging(2).battery(0, threshold - 1, 0, 0);
        assert_eq!(votes(at), 0);
        assert_eq!(votes(below), 1);
    }

    #[test]
    fn waiting_counts_as_off_charger() {
        assert_eq!(votes(FrameBytes::new().charging(4)), 1);
        assert_eq!(votes(FrameBytes::new().charging(1)), 0);
        assert_eq!(votes(FrameBytes::new().charging(77)), 0);
    }
}
