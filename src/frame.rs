//! Skeletal frame data model and the raw→wire normalizer.
//!
//! Raw frames come from the sensor collaborator with optional, possibly
//! partial joint data. [`normalize_frame`] turns one raw frame into the
//! stable wire format: absent bodies are filtered out (never null-padded),
//! absent joints are dropped from the joint map, and every surviving joint
//! gets `colorX`/`colorY` computed by a fixed linear rescale of the
//! normalized depth coordinates into the configured output resolution.
//! A zero-body frame still produces `{bodies: []}` so clients can clear
//! stale visuals.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Output resolution used for the depth→pixel mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// Closed set of tracked joints. Wire representation is the numeric id,
/// including as the key of the per-body joint map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum JointType {
    SpineBase = 0,
    SpineMid = 1,
    Neck = 2,
    Head = 3,
    ShoulderLeft = 4,
    ElbowLeft = 5,
    WristLeft = 6,
    HandLeft = 7,
    ShoulderRight = 8,
    ElbowRight = 9,
    WristRight = 10,
    HandRight = 11,
    HipLeft = 12,
    KneeLeft = 13,
    AnkleLeft = 14,
    FootLeft = 15,
    HipRight = 16,
    KneeRight = 17,
    AnkleRight = 18,
    FootRight = 19,
    SpineShoulder = 20,
    HandTipLeft = 21,
    ThumbLeft = 22,
    HandTipRight = 23,
    ThumbRight = 24,
}

impl JointType {
    pub const ALL: [JointType; 25] = [
        JointType::SpineBase,
        JointType::SpineMid,
        JointType::Neck,
        JointType::Head,
        JointType::ShoulderLeft,
        JointType::ElbowLeft,
        JointType::WristLeft,
        JointType::HandLeft,
        JointType::ShoulderRight,
        JointType::ElbowRight,
        JointType::WristRight,
        JointType::HandRight,
        JointType::HipLeft,
        JointType::KneeLeft,
        JointType::AnkleLeft,
        JointType::FootLeft,
        JointType::HipRight,
        JointType::KneeRight,
        JointType::AnkleRight,
        JointType::FootRight,
        JointType::SpineShoulder,
        JointType::HandTipLeft,
        JointType::ThumbLeft,
        JointType::HandTipRight,
        JointType::ThumbRight,
    ];

    /// Wire name, as exposed in the constants message.
    pub fn name(&self) -> &'static str {
        match self {
            JointType::SpineBase => "spineBase",
            JointType::SpineMid => "spineMid",
            JointType::Neck => "neck",
            JointType::Head => "head",
            JointType::ShoulderLeft => "shoulderLeft",
            JointType::ElbowLeft => "elbowLeft",
            JointType::WristLeft => "wristLeft",
            JointType::HandLeft => "handLeft",
            JointType::ShoulderRight => "shoulderRight",
            JointType::ElbowRight => "elbowRight",
            JointType::WristRight => "wristRight",
            JointType::HandRight => "handRight",
            JointType::HipLeft => "hipLeft",
            JointType::KneeLeft => "kneeLeft",
            JointType::AnkleLeft => "ankleLeft",
            JointType::FootLeft => "footLeft",
            JointType::HipRight => "hipRight",
            JointType::KneeRight => "kneeRight",
            JointType::AnkleRight => "ankleRight",
            JointType::FootRight => "footRight",
            JointType::SpineShoulder => "spineShoulder",
            JointType::HandTipLeft => "handTipLeft",
            JointType::ThumbLeft => "thumbLeft",
            JointType::HandTipRight => "handTipRight",
            JointType::ThumbRight => "thumbRight",
        }
    }
}

impl From<JointType> for u8 {
    fn from(jt: JointType) -> u8 {
        jt as u8
    }
}

impl TryFrom<u8> for JointType {
    type Error = String;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        JointType::ALL
            .get(id as usize)
            .copied()
            .ok_or_else(|| format!("unknown joint id {id}"))
    }
}

/// Per-hand open/closed/lasso state reported by the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum HandState {
    Unknown = 0,
    NotTracked = 1,
    Open = 2,
    Closed = 3,
    Lasso = 4,
}

impl HandState {
    pub const ALL: [HandState; 5] = [
        HandState::Unknown,
        HandState::NotTracked,
        HandState::Open,
        HandState::Closed,
        HandState::Lasso,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HandState::Unknown => "unknown",
            HandState::NotTracked => "notTracked",
            HandState::Open => "open",
            HandState::Closed => "closed",
            HandState::Lasso => "lasso",
        }
    }
}

impl Default for HandState {
    fn default() -> Self {
        HandState::Unknown
    }
}

impl From<HandState> for u8 {
    fn from(hs: HandState) -> u8 {
        hs as u8
    }
}

impl TryFrom<u8> for HandState {
    type Error = String;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        HandState::ALL
            .get(id as usize)
            .copied()
            .ok_or_else(|| format!("unknown hand state {id}"))
    }
}

/// Tracking confidence for one joint. Ordered: comparisons gate rendering
/// and gesture logic (`> NotTracked`), never plain equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum TrackingState {
    NotTracked = 0,
    Inferred = 1,
    Tracked = 2,
}

impl TrackingState {
    pub const ALL: [TrackingState; 3] = [
        TrackingState::NotTracked,
        TrackingState::Inferred,
        TrackingState::Tracked,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TrackingState::NotTracked => "notTracked",
            TrackingState::Inferred => "inferred",
            TrackingState::Tracked => "tracked",
        }
    }
}

impl Default for TrackingState {
    fn default() -> Self {
        TrackingState::NotTracked
    }
}

impl From<TrackingState> for u8 {
    fn from(ts: TrackingState) -> u8 {
        ts as u8
    }
}

impl TryFrom<u8> for TrackingState {
    type Error = String;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        TrackingState::ALL
            .get(id as usize)
            .copied()
            .ok_or_else(|| format!("unknown tracking state {id}"))
    }
}

/// One joint on the wire: pass-through depth/camera coordinates plus the
/// derived pixel position.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Joint {
    pub depth_x: Option<f64>,
    pub depth_y: Option<f64>,
    pub camera_x: f64,
    pub camera_y: f64,
    pub camera_z: f64,
    pub tracking_state: TrackingState,
    pub color_x: f64,
    pub color_y: f64,
}

/// One tracked skeletal subject in the wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedBody {
    pub tracking_id: u64,
    pub tracked: bool,
    pub joints: BTreeMap<JointType, Joint>,
    pub left_hand_state: HandState,
    pub right_hand_state: HandState,
}

impl TrackedBody {
    /// Joint lookup gated on tracking confidence: a joint whose state is
    /// `NotTracked` counts as no data.
    pub fn usable_joint(&self, jt: JointType) -> Option<&Joint> {
        self.joints
            .get(&jt)
            .filter(|j| j.tracking_state > TrackingState::NotTracked)
    }
}

/// One normalized frame: the ordered body list, possibly empty. Produced
/// once per sensor tick and consumed immediately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyFrame {
    pub bodies: Vec<TrackedBody>,
}

/// Raw joint as delivered by the sensor; every field may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawJoint {
    #[serde(default)]
    pub depth_x: Option<f64>,
    #[serde(default)]
    pub depth_y: Option<f64>,
    #[serde(default)]
    pub camera_x: f64,
    #[serde(default)]
    pub camera_y: f64,
    #[serde(default)]
    pub camera_z: f64,
    #[serde(default)]
    pub tracking_state: TrackingState,
}

/// Raw body as delivered by the sensor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBody {
    #[serde(default)]
    pub tracking_id: u64,
    #[serde(default)]
    pub tracked: bool,
    #[serde(default)]
    pub joints: BTreeMap<JointType, Option<RawJoint>>,
    #[serde(default)]
    pub left_hand_state: HandState,
    #[serde(default)]
    pub right_hand_state: HandState,
}

/// Raw frame as delivered by the sensor. Body slots may be empty — the
/// sensor reports a fixed-size body array with untracked slots nulled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFrame {
    #[serde(default)]
    pub bodies: Vec<Option<RawBody>>,
}

/// Convert one raw frame into the wire format. Pure function of the raw
/// frame and the output resolution; a malformed joint degrades to zeroed
/// pixel coordinates instead of failing the frame.
pub fn normalize_frame(raw: &RawFrame, resolution: Resolution) -> BodyFrame {
    let bodies = raw
        .bodies
        .iter()
        .flatten()
        .map(|body| normalize_body(body, resolution))
        .collect();
    BodyFrame { bodies }
}

fn normalize_body(raw: &RawBody, resolution: Resolution) -> TrackedBody {
    let joints = raw
        .joints
        .iter()
        .filter_map(|(jt, joint)| {
            joint
                .as_ref()
                .map(|joint| (*jt, project_joint(joint, resolution)))
        })
        .collect();

    TrackedBody {
        tracking_id: raw.tracking_id,
        tracked: raw.tracked,
        joints,
        left_hand_state: raw.left_hand_state,
        right_hand_state: raw.right_hand_state,
    }
}

fn project_joint(raw: &RawJoint, resolution: Resolution) -> Joint {
    Joint {
        depth_x: raw.depth_x,
        depth_y: raw.depth_y,
        camera_x: raw.camera_x,
        camera_y: raw.camera_y,
        camera_z: raw.camera_z,
        tracking_state: raw.tracking_state,
        color_x: raw.depth_x.unwrap_or(0.0) * f64::from(resolution.width),
        color_y: raw.depth_y.unwrap_or(0.0) * f64::from(resolution.height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_joint(depth_x: f64, depth_y: f64) -> RawJoint {
        RawJoint {
            depth_x: Some(depth_x),
            depth_y: Some(depth_y),
            tracking_state: TrackingState::Tracked,
            ..RawJoint::default()
        }
    }

    #[test]
    fn test_empty_frame_keeps_empty_body_list() {
        let raw = RawFrame { bodies: vec![] };
        let frame = normalize_frame(
            &raw,
            Resolution {
                width: 512,
                height: 424,
            },
        );
        assert!(frame.bodies.is_empty());
        // The wire message must still carry the empty array, never omit it.
        let json = serde_json::to_string(&frame).unwrap();
        assert_eq!(json, r#"{"bodies":[]}"#);
    }

    #[test]
    fn test_center_depth_maps_to_center_pixels() {
        let mut joints = BTreeMap::new();
        joints.insert(JointType::Head, Some(raw_joint(0.5, 0.5)));
        let raw = RawFrame {
            bodies: vec![Some(RawBody {
                tracking_id: 7,
                tracked: true,
                joints,
                ..RawBody::default()
            })],
        };
        let frame = normalize_frame(
            &raw,
            Resolution {
                width: 1920,
                height: 1080,
            },
        );
        let head = frame.bodies[0].joints.get(&JointType::Head).unwrap();
        assert_eq!(head.color_x, 960.0);
        assert_eq!(head.color_y, 540.0);
    }

    #[test]
    fn test_missing_depth_degrades_to_zero_pixels() {
        let mut joints = BTreeMap::new();
        joints.insert(
            JointType::HandLeft,
            Some(RawJoint {
                tracking_state: TrackingState::Inferred,
                ..RawJoint::default()
            }),
        );
        let raw = RawFrame {
            bodies: vec![Some(RawBody {
                tracked: true,
                joints,
                ..RawBody::default()
            })],
        };
        let frame = normalize_frame(
            &raw,
            Resolution {
                width: 512,
                height: 424,
            },
        );
        let hand = frame.bodies[0].joints.get(&JointType::HandLeft).unwrap();
        assert_eq!(hand.color_x, 0.0);
        assert_eq!(hand.color_y, 0.0);
        assert!(hand.depth_x.is_none());
    }

    #[test]
    fn test_absent_bodies_are_filtered_not_null_padded() {
        let raw = RawFrame {
            bodies: vec![
                None,
                Some(RawBody {
                    tracking_id: 3,
                    tracked: true,
                    ..RawBody::default()
                }),
                None,
            ],
        };
        let frame = normalize_frame(
            &raw,
            Resolution {
                width: 512,
                height: 424,
            },
        );
        assert_eq!(frame.bodies.len(), 1);
        assert_eq!(frame.bodies[0].tracking_id, 3);
    }

    #[test]
    fn test_absent_joints_are_dropped_from_map() {
        let mut joints = BTreeMap::new();
        joints.insert(JointType::Head, Some(raw_joint(0.1, 0.1)));
        joints.insert(JointType::HandLeft, None);
        let raw = RawFrame {
            bodies: vec![Some(RawBody {
                tracked: true,
                joints,
                ..RawBody::default()
            })],
        };
        let frame = normalize_frame(
            &raw,
            Resolution {
                width: 512,
                height: 424,
            },
        );
        let body = &frame.bodies[0];
        assert!(body.joints.contains_key(&JointType::Head));
        assert!(!body.joints.contains_key(&JointType::HandLeft));
    }

    #[test]
    fn test_tracking_state_is_ordered() {
        assert!(TrackingState::NotTracked < TrackingState::Inferred);
        assert!(TrackingState::Inferred < TrackingState::Tracked);
    }

    #[test]
    fn test_usable_joint_gates_on_tracking_state() {
        let mut joints = BTreeMap::new();
        joints.insert(
            JointType::Head,
            Some(RawJoint {
                depth_x: Some(0.5),
                depth_y: Some(0.5),
                tracking_state: TrackingState::NotTracked,
                ..RawJoint::default()
            }),
        );
        let raw = RawFrame {
            bodies: vec![Some(RawBody {
                tracked: true,
                joints,
                ..RawBody::default()
            })],
        };
        let frame = normalize_frame(
            &raw,
            Resolution {
                width: 512,
                height: 424,
            },
        );
        assert!(frame.bodies[0].usable_joint(JointType::Head).is_none());
    }

    #[test]
    fn test_joint_map_serializes_with_numeric_keys() {
        let mut joints = BTreeMap::new();
        joints.insert(JointType::Head, Some(raw_joint(0.5, 0.5)));
        let raw = RawFrame {
            bodies: vec![Some(RawBody {
                tracking_id: 1,
                tracked: true,
                joints,
                ..RawBody::default()
            })],
        };
        let frame = normalize_frame(
            &raw,
            Resolution {
                width: 512,
                height: 424,
            },
        );
        let value = serde_json::to_value(&frame).unwrap();
        assert!(value["bodies"][0]["joints"]
            .as_object()
            .unwrap()
            .contains_key("3"));
    }
}
