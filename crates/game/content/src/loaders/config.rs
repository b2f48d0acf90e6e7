//! Game configuration loader.

use std::path::Path;

use game_core::GameConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for game configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Keys missing from the file keep their [`GameConfig::default`] values,
    /// so a file may override only the tunables it cares about.
    pub fn load(path: &Path) -> LoadResult<GameConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse config data from TOML text.
    pub fn parse(content: &str) -> LoadResult<GameConfig> {
        let config: GameConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        anyhow::ensure!(config.tile_count > 0, "tile_count must be positive");
        anyhow::ensure!(
            config.tick_interval_ms > 0,
            "tick_interval_ms must be positive"
        );
        anyhow::ensure!(
            config.health.starting <= config.health.maximum,
            "starting health {} exceeds maximum {}",
            config.health.starting,
            config.health.maximum
        );

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = ConfigLoader::parse(
            r#"
            round_duration_ms = 20000

            [scoring]
            perfect_round_bonus = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.round_duration_ms, 20_000);
        assert_eq!(config.scoring.perfect_round_bonus, 250);
        assert_eq!(config.scoring.correct_pick, 5);
        assert_eq!(config.health, game_core::HealthConfig::default());
    }

    #[test]
    fn rejects_inconsistent_health() {
        let result = ConfigLoader::parse(
            r#"
            [health]
            starting = 150
            "#,
        );
        assert!(result.is_err());
    }
}
