//! Battle configuration for the command line.

use anyhow::Context;
use arena_core::{Catalog, Fighter, RollSource};
use std::path::PathBuf;

/// How a battle (or a batch of battles) is set up.
#[derive(Debug, Clone)]
pub struct ArenaConfig {
    /// Name of the first fighter.
    pub first: String,
    /// Name of the second fighter.
    pub second: String,
    /// Starting hit points for both fighters.
    pub hit_points: i32,
    /// Seed for the battle RNG; random when unset.
    pub seed: Option<u64>,
    /// JSON attack catalog; the standard catalog when unset.
    pub catalog: Option<PathBuf>,
    /// Emit events as JSON lines instead of text.
    pub json: bool,
}

impl ArenaConfig {
    /// Two 100 HP fighters with the standard attacks.
    pub fn quick_start() -> Self {
        Self {
            first: "Chrulk".to_string(),
            second: "Steve".to_string(),
            hit_points: 100,
            seed: None,
            catalog: None,
            json: false,
        }
    }

    pub fn with_names(mut self, first: impl Into<String>, second: impl Into<String>) -> Self {
        self.first = first.into();
        self.second = second.into();
        self
    }

    pub fn with_hit_points(mut self, hit_points: i32) -> Self {
        self.hit_points = hit_points;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_catalog(mut self, path: Option<PathBuf>) -> Self {
        self.catalog = path;
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Load the configured catalog.
    pub fn load_catalog(&self) -> anyhow::Result<Catalog> {
        match &self.catalog {
            Some(path) => Catalog::load(path)
                .with_context(|| format!("failed to load attack catalog {}", path.display())),
            None => Ok(Catalog::standard()),
        }
    }

    /// Create both fighters, each trained in every catalog attack.
    pub fn build_fighters<R: RollSource + ?Sized>(
        &self,
        catalog: &Catalog,
        rng: &mut R,
    ) -> (Fighter, Fighter) {
        let mut first = Fighter::new(self.first.clone(), self.hit_points, rng);
        let mut second = Fighter::new(self.second.clone(), self.hit_points, rng);
        for attack in catalog.attacks() {
            first.learn_attack(attack.clone());
            second.learn_attack(attack.clone());
        }
        (first, second)
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::quick_start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::GameRng;

    #[test]
    fn test_builder() {
        let config = ArenaConfig::quick_start()
            .with_names("Ada", "Brom")
            .with_hit_points(30)
            .with_seed(Some(4))
            .with_json(true);
        assert_eq!(config.first, "Ada");
        assert_eq!(config.second, "Brom");
        assert_eq!(config.hit_points, 30);
        assert_eq!(config.seed, Some(4));
        assert!(config.json);
    }

    #[test]
    fn test_fighters_learn_whole_catalog() {
        let config = ArenaConfig::quick_start();
        let catalog = config.load_catalog().unwrap();
        let mut rng = GameRng::new(1);
        let (first, second) = config.build_fighters(&catalog, &mut rng);
        assert_eq!(first.attacks().len(), 6);
        assert_eq!(second.attacks().len(), 6);
        assert_eq!(first.hit_points, 100);
    }

    #[test]
    fn test_missing_catalog_file() {
        let config =
            ArenaConfig::quick_start().with_catalog(Some("/nonexistent/attacks.json".into()));
        let err = config.load_catalog().unwrap_err();
        assert!(err.to_string().contains("failed to load attack catalog"));
    }
}
