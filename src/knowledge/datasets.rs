//! Static dynasty, city and battle datasets read from disk on demand.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Dynasty dataset, relative to the knowledge directory.
pub const DYNASTIES_FILE: &str = "dynasties.json";
/// City-name mapping dataset, relative to the knowledge directory.
pub const CITY_MAPPINGS_FILE: &str = "city_mappings.json";

/// Errors raised while reading a dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Dataset file not found: {}", .path.display())]
    Missing { path: PathBuf },

    #[error("Failed to read dataset {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid dataset {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    NotFound(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dynasty {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub major_cities: Vec<City>,
    #[serde(default)]
    pub historical_events: Vec<HistoricalEvent>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub name: String,
    #[serde(default)]
    pub modern_name: String,
    #[serde(default)]
    pub position: Value,
    #[serde(rename = "type", default)]
    pub kind: Value,
    #[serde(default)]
    pub importance: Value,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalEvent {
    #[serde(default)]
    pub year: i64,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct DynastyFile {
    #[serde(default)]
    dynasties: Vec<Dynasty>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DynastyCities {
    pub dynasty_id: String,
    pub dynasty_name: String,
    pub period: String,
    pub cities: Vec<City>,
    pub city_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DynastyEvents {
    pub dynasty_id: String,
    pub dynasty_name: String,
    pub period: String,
    pub events: Vec<HistoricalEvent>,
    pub event_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityMatch {
    pub city_name: String,
    pub modern_name: String,
    pub dynasty: String,
    pub dynasty_id: String,
    pub position: Value,
    #[serde(rename = "type")]
    pub kind: Value,
    pub importance: Value,
    pub period: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DynastyHit {
    pub id: String,
    pub name: String,
    pub period: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickSearch {
    pub query: String,
    pub dynasties: Vec<DynastyHit>,
    pub cities: Vec<CityMatch>,
    pub total: usize,
}

/// Case-insensitive match in either direction, so "长安城" finds "长安"
/// and "长" finds "长安". An empty side never matches.
fn loosely_matches(term: &str, name: &str) -> bool {
    if term.is_empty() || name.is_empty() {
        return false;
    }
    let term = term.to_lowercase();
    let name = name.to_lowercase();
    name.contains(&term) || term.contains(&name)
}

/// Lowercase, spaces to underscores, without the "之战" suffix.
pub fn normalize_battle_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_").replace("之战", "")
}

/// Built-in Battle of Red Cliffs sample served when nothing is cached.
pub fn red_cliffs_sample() -> Value {
    json!({
        "battle_metadata": {
            "id": "chibi_208",
            "name": "赤壁之战",
            "period": "东汉末年",
            "year": 208,
            "location": {"lat": 29.7, "lon": 113.9},
            "duration_days": 30
        },
        "military_forces": [
            {
                "force_id": "cao_cao",
                "name": "曹军",
                "commander": "曹操",
                "troop_strength": 200000,
                "composition": {"infantry": 150000, "cavalry": 30000, "navy": 20000},
                "initial_deployment": [[113.88, 29.71]]
            },
            {
                "force_id": "sun_liu",
                "name": "孙刘联军",
                "commander": "周瑜、刘备",
                "troop_strength": 50000,
                "composition": {"infantry": 30000, "cavalry": 5000, "navy": 15000},
                "initial_deployment": [[113.92, 29.75]]
            }
        ],
        "battle_timeline": [
            {
                "event_id": "fire_attack",
                "timestamp": "208-12-07T20:00:00",
                "type": "stratagem",
                "participants": ["sun_liu"],
                "location": {"lat": 29.75, "lon": 113.90},
                "description": "黄盖诈降，火攻曹营",
                "animation_script": "fire_effect"
            }
        ],
        "terrain_data": {
            "elevation": "",
            "rivers": [{"name": "长江", "path": [[113.8, 29.7], [114.0, 29.8]]}],
            "vegetation": "sparse",
            "historical_features": [{"type": "camp", "location": [113.88, 29.71]}]
        }
    })
}

/// Read-only access to the dataset files.
///
/// Files are read on every call, so edits on disk are picked up without a
/// restart and a missing file fails only the endpoints that need it.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    knowledge_dir: PathBuf,
    battle_cache_dir: PathBuf,
}

impl DatasetStore {
    pub fn new(knowledge_dir: impl Into<PathBuf>, battle_cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            knowledge_dir: knowledge_dir.into(),
            battle_cache_dir: battle_cache_dir.into(),
        }
    }

    async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, DatasetError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DatasetError::Missing {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => {
                return Err(DatasetError::Io {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };
        serde_json::from_str(&content).map_err(|e| DatasetError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub async fn dynasties(&self) -> Result<Vec<Dynasty>, DatasetError> {
        let file: DynastyFile = Self::read_json(&self.knowledge_dir.join(DYNASTIES_FILE)).await?;
        Ok(file.dynasties)
    }

    pub async fn dynasty(&self, id: &str) -> Result<Dynasty, DatasetError> {
        self.dynasties()
            .await?
            .into_iter()
            .find(|d| d.id == id)
            .ok_or_else(|| DatasetError::NotFound(format!("朝代 '{}' 未找到", id)))
    }

    pub async fn dynasty_cities(&self, id: &str) -> Result<DynastyCities, DatasetError> {
        let dynasty = self.dynasty(id).await?;
        Ok(DynastyCities {
            dynasty_id: id.to_string(),
            dynasty_name: dynasty.name,
            period: dynasty.period,
            city_count: dynasty.major_cities.len(),
            cities: dynasty.major_cities,
        })
    }

    /// Events of a dynasty, oldest first.
    pub async fn historical_events(&self, id: &str) -> Result<DynastyEvents, DatasetError> {
        let dynasty = self.dynasty(id).await?;
        let mut events = dynasty.historical_events;
        events.sort_by_key(|event| event.year);
        Ok(DynastyEvents {
            dynasty_id: id.to_string(),
            dynasty_name: dynasty.name,
            period: dynasty.period,
            event_count: events.len(),
            events,
        })
    }

    pub async fn city_mappings(&self) -> Result<Value, DatasetError> {
        Self::read_json(&self.knowledge_dir.join(CITY_MAPPINGS_FILE)).await
    }

    /// The `dynastyCategories` object of the mappings file, or an empty object.
    pub async fn categories(&self) -> Result<Value, DatasetError> {
        let mut mappings = self.city_mappings().await?;
        Ok(mappings
            .get_mut("dynastyCategories")
            .map(Value::take)
            .unwrap_or_else(|| json!({})))
    }

    /// Cities whose historical or modern name loosely matches `name`,
    /// first occurrence per city name.
    pub async fn search_city(&self, name: &str) -> Result<Vec<CityMatch>, DatasetError> {
        let term = name.trim();
        let mut seen = HashSet::new();
        let mut results = Vec::new();

        for dynasty in self.dynasties().await? {
            for city in &dynasty.major_cities {
                let hit = loosely_matches(term, &city.name)
                    || loosely_matches(term, &city.modern_name);
                if hit && seen.insert(city.name.clone()) {
                    results.push(CityMatch {
                        city_name: city.name.clone(),
                        modern_name: city.modern_name.clone(),
                        dynasty: dynasty.name.clone(),
                        dynasty_id: dynasty.id.clone(),
                        position: city.position.clone(),
                        kind: city.kind.clone(),
                        importance: city.importance.clone(),
                        period: dynasty.period.clone(),
                    });
                }
            }
        }
        Ok(results)
    }

    /// Joint dynasty and city search. Queries shorter than two characters
    /// return nothing; a dataset error degrades to an empty section.
    pub async fn quick_search(&self, query: &str) -> QuickSearch {
        let term = query.trim();
        let mut dynasties = Vec::new();
        let mut cities = Vec::new();

        if term.chars().count() >= 2 {
            match self.dynasties().await {
                Ok(all) => {
                    let lower = term.to_lowercase();
                    dynasties = all
                        .into_iter()
                        .filter(|d| {
                            loosely_matches(term, &d.name)
                                || d.period.to_lowercase().contains(&lower)
                        })
                        .map(|d| DynastyHit {
                            id: d.id,
                            name: d.name,
                            period: d.period,
                            kind: "dynasty",
                        })
                        .collect();
                }
                Err(e) => log::warn!("Quick search skipped dynasties: {}", e),
            }
            match self.search_city(term).await {
                Ok(found) => cities = found,
                Err(e) => log::warn!("Quick search skipped cities: {}", e),
            }
        }

        QuickSearch {
            query: query.to_string(),
            total: dynasties.len() + cities.len(),
            dynasties,
            cities,
        }
    }

    /// Battle scene data: the cached file if present, else the built-in
    /// Red Cliffs sample for matching names.
    pub async fn battle(&self, name: &str) -> Result<Value, DatasetError> {
        let normalized = normalize_battle_name(name);
        let safe = !normalized.is_empty()
            && !normalized.contains(['/', '\\'])
            && !normalized.contains("..");

        if safe {
            let cache_path = self.battle_cache_dir.join(format!("{}.json", normalized));
            match Self::read_json(&cache_path).await {
                Ok(data) => return Ok(data),
                Err(DatasetError::Missing { .. }) => {}
                Err(e) => return Err(e),
            }
        }

        if normalized.contains("chibi") || name.contains("赤壁") {
            return Ok(red_cliffs_sample());
        }

        Err(DatasetError::NotFound("战役未找到，请尝试'赤壁之战'".to_string()))
    }
}
