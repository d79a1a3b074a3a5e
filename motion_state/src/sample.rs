//! Motion sample data model.
//!
//! A [`MotionSample`] is one reading delivered by the headphone motion
//! sensor.  Samples are produced externally at the device's cadence; this
//! crate only ever reads them.
//!
//! Every type here is `serde`-serialisable so samples can be replayed from
//! JSON-lines files or received from a network bridge.  Fields missing from
//! the JSON form default to zero.

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// Vector3
// ════════════════════════════════════════════════════════════════════════════

/// A plain three-component vector.  Units depend on the field it sits in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Vector3 { x, y, z }
    }

    /// Multiply every component by `k`.
    pub fn scaled(self, k: f64) -> Self {
        Vector3 { x: self.x * k, y: self.y * k, z: self.z * k }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Attitude
// ════════════════════════════════════════════════════════════════════════════

/// Sensor orientation as Euler angles, all in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attitude {
    /// Rotation about the lateral axis; positive when the head tilts up.
    pub pitch: f64,
    pub roll:  f64,
    pub yaw:   f64,
}

impl Attitude {
    pub fn new(pitch: f64, roll: f64, yaw: f64) -> Self {
        Attitude { pitch, roll, yaw }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Magnetic field
// ════════════════════════════════════════════════════════════════════════════

/// Calibration quality reported alongside the magnetic field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationAccuracy {
    #[default]
    Uncalibrated,
    Low,
    Medium,
    High,
}

impl CalibrationAccuracy {
    /// Raw value as reported by the sensor API.
    pub fn raw_value(self) -> i32 {
        match self {
            CalibrationAccuracy::Uncalibrated => -1,
            CalibrationAccuracy::Low          =>  0,
            CalibrationAccuracy::Medium       =>  1,
            CalibrationAccuracy::High         =>  2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CalibrationAccuracy::Uncalibrated => "uncalibrated",
            CalibrationAccuracy::Low          => "low",
            CalibrationAccuracy::Medium       => "medium",
            CalibrationAccuracy::High         => "high",
        }
    }
}

/// Magnetic field vector in microteslas plus its calibration accuracy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibratedMagneticField {
    pub field:    Vector3,
    pub accuracy: CalibrationAccuracy,
}

// ════════════════════════════════════════════════════════════════════════════
// SensorLocation
// ════════════════════════════════════════════════════════════════════════════

/// Physical placement of the sensor that produced a sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorLocation {
    #[default]
    Default,
    HeadphoneLeft,
    HeadphoneRight,
}

impl SensorLocation {
    /// Raw value as reported by the sensor API (0, 1, 2).
    pub fn raw_value(self) -> u8 {
        match self {
            SensorLocation::Default        => 0,
            SensorLocation::HeadphoneLeft  => 1,
            SensorLocation::HeadphoneRight => 2,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MotionSample
// ════════════════════════════════════════════════════════════════════════════

/// One immutable motion reading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionSample {
    /// Seconds since device boot, as stamped by the sensor.  Informational.
    pub timestamp:         f64,
    pub attitude:          Attitude,
    /// Angular velocity, radians/sec.
    pub rotation_rate:     Vector3,
    /// Gravity component of total acceleration, in g.
    pub gravity:           Vector3,
    /// User-generated component of total acceleration, in g.
    pub user_acceleration: Vector3,
    pub magnetic_field:    CalibratedMagneticField,
    /// Heading in degrees, when the sensor reports one.
    pub heading:           Option<f64>,
    pub sensor_location:   SensorLocation,
}

impl MotionSample {
    /// A sample carrying only an attitude; every other field is zero.
    pub fn from_attitude(attitude: Attitude) -> Self {
        MotionSample { attitude, ..MotionSample::default() }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
