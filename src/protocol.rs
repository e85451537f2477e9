//! Wire protocol message types.
//!
//! JSON text frames over a persistent WebSocket connection. The server
//! sends one `constants` message per connection (enumeration tables plus
//! the configured output resolution), then `bodyFrame` messages for every
//! sensor tick. Clients send flat command messages keyed by `cmd`;
//! anything unparseable or unrecognized is silently ignored.
//!
//! ```json
//! // Server -> Client
//! {"type": "constants", "JointType": {"head": 3, ...}, "depthWidth": 512, ...}
//! {"type": "bodyFrame", "bodyFrame": {"bodies": [...]}}
//!
//! // Client -> Server
//! {"cmd": "MOUSE_MOVE", "dir": 1}
//! {"cmd": "MOUSE_MOVE", "x": 0.5}
//! {"cmd": "W_DOWN"}
//! {"cmd": "W_UP"}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::frame::{BodyFrame, HandState, JointType, Resolution, TrackingState};

/// Server-to-client message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// One-time enumeration tables and output resolution, sent on connect
    /// before any frame message.
    #[serde(rename = "constants")]
    Constants {
        #[serde(rename = "JointType")]
        joint_type: BTreeMap<String, u8>,
        #[serde(rename = "HandState")]
        hand_state: BTreeMap<String, u8>,
        #[serde(rename = "TrackingState")]
        tracking_state: BTreeMap<String, u8>,
        #[serde(rename = "depthWidth")]
        depth_width: u32,
        #[serde(rename = "depthHeight")]
        depth_height: u32,
    },
    /// One normalized frame.
    #[serde(rename = "bodyFrame")]
    BodyFrame {
        #[serde(rename = "bodyFrame")]
        body_frame: BodyFrame,
    },
}

impl ServerMessage {
    /// Build the constants message for the configured output resolution.
    pub fn constants(resolution: Resolution) -> Self {
        ServerMessage::Constants {
            joint_type: JointType::ALL
                .iter()
                .map(|jt| (jt.name().to_string(), u8::from(*jt)))
                .collect(),
            hand_state: HandState::ALL
                .iter()
                .map(|hs| (hs.name().to_string(), u8::from(*hs)))
                .collect(),
            tracking_state: TrackingState::ALL
                .iter()
                .map(|ts| (ts.name().to_string(), u8::from(*ts)))
                .collect(),
            depth_width: resolution.width,
            depth_height: resolution.height,
        }
    }

    pub fn body_frame(body_frame: BodyFrame) -> Self {
        ServerMessage::BodyFrame { body_frame }
    }
}

/// Client-to-server command message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd")]
pub enum ClientMessage {
    /// Pointer move: either a signed direction pulse or a normalized
    /// absolute x position in [0,1].
    #[serde(rename = "MOUSE_MOVE")]
    MouseMove {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dir: Option<i8>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        x: Option<f64>,
    },
    /// Hold-to-move key down.
    #[serde(rename = "W_DOWN")]
    WDown,
    /// Hold-to-move key up.
    #[serde(rename = "W_UP")]
    WUp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_parse() {
        let msg: ClientMessage = serde_json::from_str(r#"{"cmd":"MOUSE_MOVE","dir":-1}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::MouseMove {
                dir: Some(-1),
                x: None
            }
        );

        let msg: ClientMessage = serde_json::from_str(r#"{"cmd":"W_DOWN"}"#).unwrap();
        assert_eq!(msg, ClientMessage::WDown);
    }

    #[test]
    fn test_unknown_command_is_an_error() {
        // The connection handler drops parse errors silently.
        assert!(serde_json::from_str::<ClientMessage>(r#"{"cmd":"JUMP"}"#).is_err());
        assert!(serde_json::from_str::<ClientMessage>("not json").is_err());
    }

    #[test]
    fn test_constants_message_shape() {
        let msg = ServerMessage::constants(Resolution {
            width: 512,
            height: 424,
        });
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "constants");
        assert_eq!(value["depthWidth"], 512);
        assert_eq!(value["depthHeight"], 424);
        assert_eq!(value["JointType"]["head"], 3);
        assert_eq!(value["HandState"]["lasso"], 4);
        assert_eq!(value["TrackingState"]["tracked"], 2);
    }

    #[test]
    fn test_body_frame_message_shape() {
        let msg = ServerMessage::body_frame(BodyFrame { bodies: vec![] });
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"bodyFrame","bodyFrame":{"bodies":[]}}"#);
    }
}
