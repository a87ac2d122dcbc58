//! # Generation Orchestrator
//!
//! Drives synthesize → place → validate with a bounded retry budget. When the
//! budget runs out a plain, always-solvable fallback map is emitted instead,
//! so a generation request never ends without a playable map.

use crate::features::FeaturePlacer;
use crate::generation::{seeded_rng, GenerationConfig, Terrain, TerrainStrategy, TerrainSynthesizer};
use crate::map::{GenerationMetadata, GenerationOutcome, Grid, MapDocument, Position, TileKind};
use crate::validation::{MapValidator, ReachabilityValidator};
use crate::{SlitheriaError, SlitheriaResult};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::Rng;

/// States of one generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    Synthesizing,
    Placing,
    Validating,
    Accepted,
    Retrying,
    FallbackAccepted,
}

/// Result of running the state machine.
#[derive(Debug, Clone)]
pub struct GenerationRun {
    pub grid: Grid,
    pub outcome: GenerationOutcome,
    /// Every state entered, in order
    pub history: Vec<GenerationState>,
}

/// Runs generation attempts against a validator until one is accepted.
pub struct GenerationOrchestrator<V: MapValidator = ReachabilityValidator> {
    config: GenerationConfig,
    validator: V,
}

impl GenerationOrchestrator<ReachabilityValidator> {
    /// Fails if the configuration does not pass [`GenerationConfig::validate`].
    pub fn new(config: GenerationConfig) -> SlitheriaResult<Self> {
        Self::with_validator(config, ReachabilityValidator)
    }
}

impl<V: MapValidator> GenerationOrchestrator<V> {
    /// Uses a custom acceptance check in place of the reachability validator.
    pub fn with_validator(config: GenerationConfig, validator: V) -> SlitheriaResult<Self> {
        config.validate()?;
        Ok(Self { config, validator })
    }

    /// Runs the retry loop for a map of exactly `width` x `height`.
    pub fn run(
        &self,
        width: usize,
        height: usize,
        strategy: TerrainStrategy,
        rng: &mut StdRng,
    ) -> GenerationRun {
        self.run_with(width, height, strategy.synthesizer().as_ref(), rng)
    }

    /// Runs the retry loop with an explicit synthesizer.
    pub fn run_with(
        &self,
        width: usize,
        height: usize,
        synthesizer: &dyn TerrainSynthesizer,
        rng: &mut StdRng,
    ) -> GenerationRun {
        let mut state = GenerationState::Synthesizing;
        let mut history = vec![state];
        let mut attempts = 0u32;
        let mut terrain: Option<Terrain> = None;

        loop {
            let next = match state {
                GenerationState::Synthesizing => {
                    attempts += 1;
                    debug!(
                        "Attempt {}/{}: synthesizing {}x{} terrain with {}",
                        attempts,
                        self.config.max_attempts,
                        width,
                        height,
                        synthesizer.synthesizer_type()
                    );
                    match synthesizer.synthesize(width, height, &self.config, rng) {
                        Ok(synthesized) => {
                            terrain = Some(synthesized);
                            GenerationState::Placing
                        }
                        Err(e) => {
                            warn!("Attempt {} synthesis failed: {}", attempts, e);
                            GenerationState::Retrying
                        }
                    }
                }
                GenerationState::Placing => match terrain.as_mut() {
                    Some(current) => match FeaturePlacer::new(&self.config).place(current, rng) {
                        Ok(_) => GenerationState::Validating,
                        Err(e) => {
                            warn!("Attempt {} feature placement failed: {}", attempts, e);
                            GenerationState::Retrying
                        }
                    },
                    None => GenerationState::Retrying,
                },
                GenerationState::Validating => match terrain.as_ref() {
                    Some(current) => match self.validator.validate(&current.grid) {
                        Ok(()) => GenerationState::Accepted,
                        Err(failure) => {
                            debug!("Attempt {} rejected: {}", attempts, failure);
                            GenerationState::Retrying
                        }
                    },
                    None => GenerationState::Retrying,
                },
                GenerationState::Retrying => {
                    terrain = None;
                    if attempts >= self.config.max_attempts {
                        GenerationState::FallbackAccepted
                    } else {
                        GenerationState::Synthesizing
                    }
                }
                GenerationState::Accepted => {
                    if let Some(accepted) = terrain.take() {
                        info!(
                            "Accepted {} map after {} attempt(s)",
                            synthesizer.synthesizer_type(),
                            attempts
                        );
                        return GenerationRun {
                            grid: accepted.grid,
                            outcome: GenerationOutcome::Accepted { attempts },
                            history,
                        };
                    }
                    GenerationState::FallbackAccepted
                }
                GenerationState::FallbackAccepted => {
                    info!(
                        "Retry budget of {} exhausted, emitting fallback map",
                        self.config.max_attempts
                    );
                    return GenerationRun {
                        grid: fallback_map(width, height),
                        outcome: GenerationOutcome::Fallback { attempts },
                        history,
                    };
                }
            };

            state = next;
            history.push(state);
        }
    }
}

/// Always-solvable map: start and goal in opposite corners and isolated wall
/// pillars that never touch the first or last interior row and column.
pub fn fallback_map(width: usize, height: usize) -> Grid {
    let width = width.max(4);
    let height = height.max(3);
    let mut grid = Grid::new(width, height);
    let last_x = width as i32 - 2;
    let last_y = height as i32 - 2;

    for pos in grid.interior_positions().collect::<Vec<_>>() {
        let pillar = pos.x % 4 == 3 && pos.y % 4 == 3;
        let clear_lane = pos.x == 1 || pos.y == 1 || pos.x == last_x || pos.y == last_y;
        if pillar && !clear_lane {
            grid.set(pos, TileKind::Wall);
        }
    }

    grid.set(Position::new(1, 1), TileKind::Start);
    grid.set(Position::new(last_x, last_y), TileKind::Goal);
    grid
}

/// Random map size in the large-map range, each side rounded down to even.
pub fn random_dimensions<R: Rng>(rng: &mut R) -> (i32, i32) {
    let mut side = || {
        let value = rng.gen_range(crate::config::RANDOM_SIZE_MIN..crate::config::RANDOM_SIZE_MAX);
        value - value % 2
    };
    let width = side();
    let height = side();
    (width, height)
}

fn describe(
    strategy: TerrainStrategy,
    outcome: GenerationOutcome,
    width: usize,
    height: usize,
    seed: u64,
) -> String {
    let name = if outcome.is_fallback() {
        "Fallback"
    } else {
        strategy.display_name()
    };
    format!("{} {}x{} map with obstacles (seed {})", name, height, width, seed)
}

/// Generates a validated map.
///
/// Dimensions below the strategy minimum are clamped upward; non-positive
/// dimensions are rejected. Without a seed one is drawn at random and
/// recorded in the document metadata.
///
/// # Examples
///
/// ```
/// use slitheria::{generate, GenerationConfig, TerrainStrategy};
///
/// let doc = generate(12, 10, Some(42), TerrainStrategy::ChamberLayout, &GenerationConfig::new()).unwrap();
/// let text = doc.to_text();
/// let mut lines = text.lines().skip(1);
/// assert_eq!(lines.next(), Some("10"));
/// assert_eq!(lines.next(), Some("12"));
/// ```
pub fn generate(
    width: i32,
    height: i32,
    seed: Option<u64>,
    strategy: TerrainStrategy,
    config: &GenerationConfig,
) -> SlitheriaResult<MapDocument> {
    if width <= 0 || height <= 0 {
        return Err(SlitheriaError::InvalidDimensions { width, height });
    }
    let orchestrator = GenerationOrchestrator::new(config.clone())?;

    let (min_width, min_height) = strategy.min_dimensions();
    let width = (width as usize).max(min_width);
    let height = (height as usize).max(min_height);
    let seed = seed.unwrap_or_else(rand::random::<u64>);
    let mut rng = seeded_rng(seed);

    let run = orchestrator.run(width, height, strategy, &mut rng);
    let description = describe(strategy, run.outcome, width, height, seed);

    Ok(MapDocument::from_grid(description, run.grid)?.with_metadata(GenerationMetadata {
        seed,
        strategy,
        outcome: run.outcome,
    }))
}
