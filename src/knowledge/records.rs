//! Knowledge-base records and their flattened analysis views.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A historical battle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Battle {
    pub name: String,
    pub date: String,
    pub location: String,
    pub participants: Vec<String>,
    pub outcome: String,
    pub significance: String,
    pub casualties: BTreeMap<String, Value>,
    pub tactics: Vec<String>,
    pub sources: Vec<String>,
}

/// A weapon system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weapon {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub era: String,
    pub country: String,
    pub specifications: BTreeMap<String, Value>,
    pub historical_use: Vec<String>,
    pub impact: String,
    pub sources: Vec<String>,
}

/// A historical figure. Fields beyond the known ones are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Figure {
    pub name: String,
    pub title: String,
    pub period: String,
    pub achievements: Vec<String>,
    pub description: String,
    pub id: Value,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Records that can be found by name.
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for Battle {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Weapon {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Figure {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Render a JSON scalar without quotes.
fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn render_map(map: &BTreeMap<String, Value>) -> String {
    map.iter()
        .map(|(key, value)| format!("{}: {}", key, plain(value)))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattleAnalysis {
    pub name: String,
    pub date: String,
    pub location: String,
    pub participants: String,
    pub outcome: String,
    pub significance: String,
    pub casualties: String,
    pub tactics: String,
    pub sources: String,
}

impl BattleAnalysis {
    /// One paragraph of prose for chat-style answers.
    pub fn summary(&self) -> String {
        let mut text = self.name.clone();
        let when_where: Vec<&str> = [self.date.as_str(), self.location.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();
        if !when_where.is_empty() {
            text.push_str(&format!("（{}）", when_where.join("，")));
        }
        for (label, value) in [
            ("参战方", &self.participants),
            ("结果", &self.outcome),
            ("意义", &self.significance),
            ("战术", &self.tactics),
        ] {
            if !value.is_empty() {
                text.push_str(&format!("\n{}：{}", label, value));
            }
        }
        text
    }
}

impl From<&Battle> for BattleAnalysis {
    fn from(battle: &Battle) -> Self {
        Self {
            name: battle.name.clone(),
            date: battle.date.clone(),
            location: battle.location.clone(),
            participants: battle.participants.join(", "),
            outcome: battle.outcome.clone(),
            significance: battle.significance.clone(),
            casualties: render_map(&battle.casualties),
            tactics: battle.tactics.join(", "),
            sources: battle.sources.join(", "),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeaponProfile {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub era: String,
    pub country: String,
    pub specifications: String,
    pub historical_use: String,
    pub impact: String,
    pub sources: String,
}

impl From<&Weapon> for WeaponProfile {
    fn from(weapon: &Weapon) -> Self {
        Self {
            name: weapon.name.clone(),
            kind: weapon.kind.clone(),
            era: weapon.era.clone(),
            country: weapon.country.clone(),
            specifications: render_map(&weapon.specifications),
            historical_use: weapon.historical_use.join(", "),
            impact: weapon.impact.clone(),
            sources: weapon.sources.join(", "),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FigureProfile {
    pub name: String,
    pub title: String,
    pub period: String,
    pub achievements: String,
    pub description: String,
    pub id: String,
}

impl From<&Figure> for FigureProfile {
    fn from(figure: &Figure) -> Self {
        Self {
            name: figure.name.clone(),
            title: figure.title.clone(),
            period: figure.period.clone(),
            achievements: figure.achievements.join(", "),
            description: figure.description.clone(),
            id: plain(&figure.id),
        }
    }
}
