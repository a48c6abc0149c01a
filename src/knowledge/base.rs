//! In-memory knowledge base built once from JSON files.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::records::{Battle, BattleAnalysis, Figure, FigureProfile, Named, Weapon, WeaponProfile};
use super::KnowledgeError;

/// Battles file, relative to the knowledge directory.
pub const BATTLES_FILE: &str = "military_data/battles.json";
/// Weapons file, relative to the knowledge directory.
pub const WEAPONS_FILE: &str = "weapon_data/tanks.json";
/// Figures file, relative to the knowledge directory.
pub const FIGURES_FILE: &str = "historical_facts/historical_figures.json";

/// Read-only lookup over battles, weapons and historical figures.
///
/// Searches are case-insensitive substring matches on the record name and
/// return the first record in file order. A blank query matches nothing.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    battles: Vec<Battle>,
    weapons: Vec<Weapon>,
    figures: Vec<Figure>,
}

impl KnowledgeBase {
    pub fn new(battles: Vec<Battle>, weapons: Vec<Weapon>, figures: Vec<Figure>) -> Self {
        Self {
            battles,
            weapons,
            figures,
        }
    }

    /// Load every file under `dir`. Missing or invalid files are logged and
    /// leave the corresponding index empty.
    pub fn load(dir: &Path) -> Self {
        let kb = Self {
            battles: load_or_empty(&dir.join(BATTLES_FILE), &["major_battles", "battles"]),
            weapons: load_or_empty(&dir.join(WEAPONS_FILE), &["tanks", "weapons"]),
            figures: load_or_empty(&dir.join(FIGURES_FILE), &["historical_figures", "figures"]),
        };
        log::info!(
            "Knowledge base loaded from {}: {} battles, {} weapons, {} figures",
            dir.display(),
            kb.battles.len(),
            kb.weapons.len(),
            kb.figures.len()
        );
        kb
    }

    pub fn battles(&self) -> &[Battle] {
        &self.battles
    }

    pub fn weapons(&self) -> &[Weapon] {
        &self.weapons
    }

    pub fn figures(&self) -> &[Figure] {
        &self.figures
    }

    pub fn search_battle(&self, query: &str) -> Option<&Battle> {
        find_by_name(&self.battles, query)
    }

    pub fn search_weapon(&self, query: &str) -> Option<&Weapon> {
        find_by_name(&self.weapons, query)
    }

    pub fn search_figure(&self, query: &str) -> Option<&Figure> {
        find_by_name(&self.figures, query)
    }

    pub fn battle_analysis(&self, query: &str) -> Option<BattleAnalysis> {
        self.search_battle(query).map(BattleAnalysis::from)
    }

    pub fn weapon_profile(&self, query: &str) -> Option<WeaponProfile> {
        self.search_weapon(query).map(WeaponProfile::from)
    }

    pub fn figure_profile(&self, query: &str) -> Option<FigureProfile> {
        self.search_figure(query).map(FigureProfile::from)
    }
}

fn find_by_name<'a, T: Named>(records: &'a [T], query: &str) -> Option<&'a T> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    records
        .iter()
        .find(|record| record.name().to_lowercase().contains(&needle))
}

fn load_or_empty<T: DeserializeOwned>(path: &Path, list_keys: &[&str]) -> Vec<T> {
    match load_records(path, list_keys) {
        Ok(records) => records,
        Err(KnowledgeError::Missing { path }) => {
            log::warn!("Knowledge file not found: {}", path.display());
            Vec::new()
        }
        Err(e) => {
            log::error!("{}", e);
            Vec::new()
        }
    }
}

/// Read a record list from `path`.
///
/// The file may hold a bare array, an object with the list under one of
/// `list_keys`, or a single record object. Entries that do not parse as `T`
/// are skipped with a warning.
pub fn load_records<T: DeserializeOwned>(
    path: &Path,
    list_keys: &[&str],
) -> Result<Vec<T>, KnowledgeError> {
    if !path.exists() {
        return Err(KnowledgeError::Missing {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path).map_err(|e| KnowledgeError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let data: Value = serde_json::from_str(&content).map_err(|e| KnowledgeError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;

    let entries = match data {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            match list_keys.iter().find_map(|key| map.remove(*key)) {
                Some(Value::Array(items)) => items,
                Some(_) => {
                    return Err(KnowledgeError::UnexpectedShape {
                        path: path.to_path_buf(),
                    })
                }
                None => vec![Value::Object(map)],
            }
        }
        _ => {
            return Err(KnowledgeError::UnexpectedShape {
                path: path.to_path_buf(),
            })
        }
    };

    Ok(entries
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|entry| match serde_json::from_value::<T>(entry) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Skipping invalid entry in {}: {}", path.display(), e);
                None
            }
        })
        .collect())
}
