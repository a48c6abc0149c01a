//! Read-only military-history knowledge: battles, weapons, figures, and the
//! dynasty datasets.

mod base;
mod datasets;
mod maps;
mod records;

use std::path::PathBuf;

pub use base::{load_records, KnowledgeBase, BATTLES_FILE, FIGURES_FILE, WEAPONS_FILE};
pub use datasets::{
    normalize_battle_name, red_cliffs_sample, City, CityMatch, DatasetError, DatasetStore,
    Dynasty, DynastyCities, DynastyEvents, DynastyHit, HistoricalEvent, QuickSearch,
    CITY_MAPPINGS_FILE, DYNASTIES_FILE,
};
pub use maps::{battle_map_data, BattleMapData, Coordinates};
pub use records::{
    Battle, BattleAnalysis, Figure, FigureProfile, Named, Weapon, WeaponProfile,
};

/// Errors raised while loading knowledge files.
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("Knowledge file not found: {}", .path.display())]
    Missing { path: PathBuf },

    #[error("Failed to read knowledge file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in knowledge file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Knowledge file {} holds neither a list nor an object", .path.display())]
    UnexpectedShape { path: PathBuf },
}
