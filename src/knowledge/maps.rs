//! Map overlays for battles with known coordinates.

use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattleMapData {
    pub name: String,
    pub coordinates: Coordinates,
    pub timeline: Vec<Value>,
    pub terrain_type: String,
    pub forces: Value,
}

const BATTLE_COORDINATES: &[(&str, Coordinates)] = &[
    (
        "野狐岭之战",
        Coordinates {
            lat: 41.7833,
            lng: 114.3667,
        },
    ),
    (
        "斯大林格勒战役",
        Coordinates {
            lat: 48.7080,
            lng: 44.5133,
        },
    ),
    (
        "诺曼底登陆",
        Coordinates {
            lat: 49.4144,
            lng: -0.8850,
        },
    ),
];

/// Map data for an exact battle name, if the battle has known coordinates.
pub fn battle_map_data(name: &str) -> Option<BattleMapData> {
    let name = name.trim();
    let (_, coordinates) = BATTLE_COORDINATES.iter().find(|(known, _)| *known == name)?;

    Some(BattleMapData {
        name: name.to_string(),
        coordinates: *coordinates,
        timeline: vec![
            json!({"time": "1211年", "event": "蒙古军队集结"}),
            json!({"time": "1211年8月", "event": "野狐岭决战"}),
        ],
        terrain_type: "mountainous".to_string(),
        forces: json!({
            "mongol": {"troops": 90000, "commander": "成吉思汗"},
            "jin": {"troops": 450000, "commander": "完颜承裕"}
        }),
    })
}
