//! Input lines accepted on stdin.
//!
//! Each line is one JSON object with a single key:
//!
//! ```json
//! {"request": {"action": "connectScanner", "id": 7}}
//! {"simulate": {"kind": "scannerAppeared", "scanner": {"id": 7, "name": "DS2278"}}}
//! ```
//!
//! `request` goes through the bridge's request protocol; `simulate` injects a
//! gateway event into the mock gateway.

use scanlink_gateway::GatewayEvent;
use scanlink_session::Request;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputLine {
    Request(Request),
    Simulate(GatewayEvent),
}

impl InputLine {
    /// Parse one line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<serde_json::Result<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        Some(serde_json::from_str(line))
    }
}
