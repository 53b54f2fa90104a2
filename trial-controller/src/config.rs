use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{Error, Motion, Result};

/// Index into the [`SpeedTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpeedState {
    Slow = 0,
    Fast = 1,
}

impl SpeedState {
    pub fn index(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for SpeedState {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Slow),
            1 => Ok(Self::Fast),
            _ => Err(Error::InvalidSpeedState(value)),
        }
    }
}

impl fmt::Display for SpeedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Which motion a trial performs, and how far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrialType {
    /// 1 m straight.
    StraightOneMeter = 1,
    /// 5 m straight.
    StraightFiveMeters = 2,
    /// 10 degrees in place.
    RotateTenDegrees = 3,
    /// 180 degrees in place.
    RotateHalfTurn = 4,
    /// 360 degrees in place.
    RotateFullTurn = 5,
}

impl TrialType {
    pub const ALL: [Self; 5] = [
        Self::StraightOneMeter,
        Self::StraightFiveMeters,
        Self::RotateTenDegrees,
        Self::RotateHalfTurn,
        Self::RotateFullTurn,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn motion(self) -> Motion {
        match self {
            Self::StraightOneMeter => Motion::Straight { distance: 1.0 },
            Self::StraightFiveMeters => Motion::Straight { distance: 5.0 },
            Self::RotateTenDegrees => Motion::Rotate {
                angle: 10_f64.to_radians(),
            },
            Self::RotateHalfTurn => Motion::Rotate {
                angle: 180_f64.to_radians(),
            },
            Self::RotateFullTurn => Motion::Rotate {
                angle: 360_f64.to_radians(),
            },
        }
    }
}

impl TryFrom<u8> for TrialType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.number() == value)
            .ok_or(Error::InvalidTrialType(value))
    }
}

impl fmt::Display for TrialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SpeedLevel {
    /// Forward speed for straight trials [m/s].
    pub linear_speed: f64,
    /// Yaw rate for rotation trials [rad/s].
    pub angular_speed: f64,
}

impl SpeedLevel {
    fn is_valid(&self) -> bool {
        [self.linear_speed, self.angular_speed]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SpeedTable {
    #[serde(default = "default_slow")]
    pub slow: SpeedLevel,
    #[serde(default = "default_fast")]
    pub fast: SpeedLevel,
}

fn default_slow() -> SpeedLevel {
    SpeedLevel {
        linear_speed: 0.075,
        angular_speed: 30_f64.to_radians(),
    }
}

fn default_fast() -> SpeedLevel {
    SpeedLevel {
        linear_speed: 0.15,
        angular_speed: 120_f64.to_radians(),
    }
}

impl Default for SpeedTable {
    fn default() -> Self {
        Self {
            slow: default_slow(),
            fast: default_fast(),
        }
    }
}

impl SpeedTable {
    pub fn level(&self, state: SpeedState) -> SpeedLevel {
        match state {
            SpeedState::Slow => self.slow,
            SpeedState::Fast => self.fast,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for state in [SpeedState::Slow, SpeedState::Fast] {
            let level = self.level(state);
            if !level.is_valid() {
                return Err(Error::InvalidSpeed {
                    state,
                    linear_speed: level.linear_speed,
                    angular_speed: level.angular_speed,
                });
            }
        }
        Ok(())
    }
}

/// Validated, immutable configuration of a single trial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialConfig {
    speed_state: SpeedState,
    trial_type: TrialType,
    speed_table: SpeedTable,
}

impl TrialConfig {
    /// Validates raw startup values. Any failure here is a configuration
    /// error and no trial should begin.
    pub fn new(speed_state: u8, trial_type: u8, speed_table: SpeedTable) -> Result<Self> {
        let speed_state = SpeedState::try_from(speed_state)?;
        let trial_type = TrialType::try_from(trial_type)?;
        speed_table.validate()?;
        Ok(Self {
            speed_state,
            trial_type,
            speed_table,
        })
    }

    pub fn speed_state(&self) -> SpeedState {
        self.speed_state
    }

    pub fn trial_type(&self) -> TrialType {
        self.trial_type
    }

    pub fn speed_table(&self) -> &SpeedTable {
        &self.speed_table
    }

    pub fn linear_speed(&self) -> f64 {
        self.speed_table.level(self.speed_state).linear_speed
    }

    pub fn angular_speed(&self) -> f64 {
        self.speed_table.level(self.speed_state).angular_speed
    }
}
