//! Named access to the 21 streamed landmarks.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    errors::UnknownNameError,
    model::{HandLandmarks, Point3},
};

/// Streamed joints, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum JointName {
    Wrist,
    ThumbMetacarpal,
    ThumbProximal,
    ThumbDistal,
    ThumbTip,
    IndexProximal,
    IndexIntermediate,
    IndexDistal,
    IndexTip,
    MiddleProximal,
    MiddleIntermediate,
    MiddleDistal,
    MiddleTip,
    RingProximal,
    RingIntermediate,
    RingDistal,
    RingTip,
    LittleProximal,
    LittleIntermediate,
    LittleDistal,
    LittleTip,
}

impl JointName {
    /// Every joint, indexed by landmark position.
    pub const ALL: [Self; 21] = [
        Self::Wrist,
        Self::ThumbMetacarpal,
        Self::ThumbProximal,
        Self::ThumbDistal,
        Self::ThumbTip,
        Self::IndexProximal,
        Self::IndexIntermediate,
        Self::IndexDistal,
        Self::IndexTip,
        Self::MiddleProximal,
        Self::MiddleIntermediate,
        Self::MiddleDistal,
        Self::MiddleTip,
        Self::RingProximal,
        Self::RingIntermediate,
        Self::RingDistal,
        Self::RingTip,
        Self::LittleProximal,
        Self::LittleIntermediate,
        Self::LittleDistal,
        Self::LittleTip,
    ];

    /// Landmark index of this joint.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Joint name as streamed.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wrist => "Wrist",
            Self::ThumbMetacarpal => "ThumbMetacarpal",
            Self::ThumbProximal => "ThumbProximal",
            Self::ThumbDistal => "ThumbDistal",
            Self::ThumbTip => "ThumbTip",
            Self::IndexProximal => "IndexProximal",
            Self::IndexIntermediate => "IndexIntermediate",
            Self::IndexDistal => "IndexDistal",
            Self::IndexTip => "IndexTip",
            Self::MiddleProximal => "MiddleProximal",
            Self::MiddleIntermediate => "MiddleIntermediate",
            Self::MiddleDistal => "MiddleDistal",
            Self::MiddleTip => "MiddleTip",
            Self::RingProximal => "RingProximal",
            Self::RingIntermediate => "RingIntermediate",
            Self::RingDistal => "RingDistal",
            Self::RingTip => "RingTip",
            Self::LittleProximal => "LittleProximal",
            Self::LittleIntermediate => "LittleIntermediate",
            Self::LittleDistal => "LittleDistal",
            Self::LittleTip => "LittleTip",
        }
    }

    /// Finger group this joint belongs to.
    pub const fn finger(self) -> FingerName {
        match self.index() {
            0 => FingerName::Wrist,
            1..=4 => FingerName::Thumb,
            5..=8 => FingerName::Index,
            9..=12 => FingerName::Middle,
            13..=16 => FingerName::Ring,
            _ => FingerName::Little,
        }
    }
}

impl fmt::Display for JointName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JointName {
    type Err = UnknownNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|joint| joint.as_str() == s)
            .ok_or_else(|| UnknownNameError::Joint(s.to_string()))
    }
}

/// Finger groups. `Wrist` is its own single-joint group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum FingerName {
    Wrist,
    Thumb,
    Index,
    Middle,
    Ring,
    Little,
}

impl FingerName {
    /// Joints of this group, base to tip.
    pub fn joints(self) -> &'static [JointName] {
        let range = match self {
            Self::Wrist => 0..1,
            Self::Thumb => 1..5,
            Self::Index => 5..9,
            Self::Middle => 9..13,
            Self::Ring => 13..17,
            Self::Little => 17..21,
        };
        &JointName::ALL[range]
    }
}

impl FromStr for FingerName {
    type Err = UnknownNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wrist" => Ok(Self::Wrist),
            "thumb" => Ok(Self::Thumb),
            "index" => Ok(Self::Index),
            "middle" => Ok(Self::Middle),
            "ring" => Ok(Self::Ring),
            "little" => Ok(Self::Little),
            _ => Err(UnknownNameError::Finger(s.to_string())),
        }
    }
}

impl HandLandmarks {
    /// Coordinates of one joint.
    pub fn joint(&self, joint: JointName) -> Point3 {
        self.points()[joint.index()]
    }

    /// Joints of one finger group with their coordinates, base to tip.
    pub fn finger(&self, finger: FingerName) -> Vec<(JointName, Point3)> {
        finger.joints().iter().map(|&joint| (joint, self.joint(joint))).collect()
    }
}
