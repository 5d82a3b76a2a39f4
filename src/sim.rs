use {
    crate::*,
    glam::I64Vec2,
    num::integer::lcm,
    static_assertions::const_assert,
    std::collections::HashMap,
};

// A freshly spawned unit must fit between its horizontal inset and the right wall.
const_assert!(Simulation::SPAWN_INSET + UnitKind::MAX_WIDTH <= Well::WIDTH);

/// The macro-state fingerprint recorded after each settled unit: where the catalog and jet
/// sequence are in their cycles, and the shape of the topmost settled terrain.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
struct CycleKey {
    unit_phase: usize,
    jet_phase: usize,
    profile: SurfaceProfile,
}

/// The simulation progress the first time a `CycleKey` was observed. Inserted once per distinct
/// key, never updated.
#[derive(Clone, Copy, Debug)]
struct CycleRecord {
    units_settled: u64,
    height: i64,
}

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    EmptyCatalog,
    EmptyJetPattern,
}

struct FallingUnit {
    /// Canonical-origin points, shared read-only from the catalog.
    unit: Unit,

    /// The translation from the canonical origin to the unit's current well position.
    pos: I64Vec2,
}

/// One simulation run: a falling unit driven by the cyclic jet sequence, settling into the well,
/// with a per-run history table for cycle detection.
///
/// The history table and all counters are owned by this instance, so concurrent runs (and test
/// runs) can't contaminate each other.
pub struct Simulation {
    catalog: Catalog,
    jets: JetPattern,
    well: Well,
    falling: FallingUnit,
    units_settled: u64,
    jets_applied: u64,
    history: HashMap<CycleKey, CycleRecord>,
    skipped_units: u64,
    skipped_height: i64,
    extrapolated: bool,
}

impl Simulation {
    pub const SPAWN_INSET: i64 = 2_i64;
    pub const SPAWN_GAP: i64 = 3_i64;

    pub fn new(catalog: Catalog, jets: JetPattern) -> Result<Self, ConfigError> {
        if catalog.is_empty() {
            Err(ConfigError::EmptyCatalog)
        } else if jets.is_empty() {
            Err(ConfigError::EmptyJetPattern)
        } else {
            let mut simulation: Self = Self {
                catalog,
                jets,
                well: Well::new(),
                falling: FallingUnit {
                    unit: Unit::new(Vec::new()),
                    pos: I64Vec2::ZERO,
                },
                units_settled: 0_u64,
                jets_applied: 0_u64,
                history: HashMap::new(),
                skipped_units: 0_u64,
                skipped_height: 0_i64,
                extrapolated: false,
            };

            simulation.spawn_next();

            Ok(simulation)
        }
    }

    /// Settled units, both directly simulated and skipped by extrapolation.
    #[inline]
    pub fn total_units_settled(&self) -> u64 {
        self.units_settled + self.skipped_units
    }

    /// Accumulated height: directly simulated plus extrapolated.
    #[inline]
    pub fn height(&self) -> u64 {
        (self.well.max_height() + self.skipped_height) as u64
    }

    #[inline]
    pub fn extrapolation_applied(&self) -> bool {
        self.extrapolated
    }

    /// Applies the next jet to the falling unit, returning whether the push was accepted. The jet
    /// counter advances either way.
    pub fn try_jet_push(&mut self) -> bool {
        let jet: Jet = self.jets.jet(self.jets_applied);

        self.jets_applied += 1_u64;

        let pos: I64Vec2 = self.falling.pos + jet.vec();

        if self.collides(pos) {
            false
        } else {
            self.falling.pos = pos;

            true
        }
    }

    /// Applies one gravity step, returning whether the unit is still falling. On a collision the
    /// unit settles at its pre-step position and the next unit spawns.
    pub fn try_fall(&mut self) -> bool {
        let pos: I64Vec2 = self.falling.pos - I64Vec2::Y;

        if self.collides(pos) {
            self.settle_falling();

            false
        } else {
            self.falling.pos = pos;

            true
        }
    }

    /// Runs the current falling unit from its present position until it settles.
    pub fn settle_next_unit(&mut self) {
        while {
            self.try_jet_push();

            self.try_fall()
        } {}
    }

    /// Settles units until `target_units` have accumulated, extrapolating over a detected cycle.
    pub fn run(&mut self, target_units: u64) -> u64 {
        self.run_with_status(target_units, false)
    }

    pub fn run_with_status(&mut self, target_units: u64, status_updates: bool) -> u64 {
        let status_period: u64 = lcm(self.catalog.len(), self.jets.len()) as u64;

        while self.total_units_settled() < target_units {
            self.settle_next_unit();

            let was_extrapolated: bool = self.extrapolated;

            self.check_cycle(target_units);

            if status_updates {
                if self.extrapolated && !was_extrapolated {
                    println!(
                        "skipped {} units contributing {} height after {} simulated units",
                        self.skipped_units, self.skipped_height, self.units_settled
                    );
                } else if self.units_settled % status_period == 0_u64 {
                    println!(
                        "{} units settled, height {}",
                        self.total_units_settled(),
                        self.height()
                    );
                }
            }
        }

        self.height()
    }

    /// Settles units with cycle detection disabled: correct for any target, but linear in it.
    pub fn run_direct(&mut self, target_units: u64) -> u64 {
        while self.units_settled < target_units {
            self.settle_next_unit();
        }

        self.height()
    }

    fn collides(&self, pos: I64Vec2) -> bool {
        self.falling
            .unit
            .points()
            .iter()
            .any(|point: &I64Vec2| self.well.is_occupied(*point + pos))
    }

    fn spawn_next(&mut self) {
        self.falling = FallingUnit {
            unit: self.catalog.unit(self.units_settled).clone(),
            pos: I64Vec2::new(
                Self::SPAWN_INSET,
                self.well.max_height() + Self::SPAWN_GAP + 1_i64,
            ),
        };
    }

    fn settle_falling(&mut self) {
        let settled_unit: Unit = self.falling.unit.translated(self.falling.pos);

        self.well.settle(&settled_unit);
        self.units_settled += 1_u64;
        self.spawn_next();
    }

    /// Invoked after each settle. Records first sightings of each macro-state; on a repeat,
    /// fast-forwards the unit counter over as many whole cycles as fit before the target. Applied
    /// at most once per run; the physical well is never replayed for skipped cycles.
    fn check_cycle(&mut self, target_units: u64) {
        if !self.extrapolated {
            let cycle_key: CycleKey = CycleKey {
                unit_phase: self.catalog.phase(self.units_settled),
                jet_phase: self.jets.phase(self.jets_applied),
                profile: self.well.surface_profile(),
            };

            if let Some(cycle_record) = self.history.get(&cycle_key).copied() {
                let cycle_len_units: u64 = self.units_settled - cycle_record.units_settled;
                let cycle_len_height: i64 = self.well.max_height() - cycle_record.height;
                let remaining_units: u64 = target_units - self.total_units_settled();
                let full_cycles: u64 = remaining_units / cycle_len_units;

                self.skipped_units += full_cycles * cycle_len_units;
                self.skipped_height += full_cycles as i64 * cycle_len_height;
                self.extrapolated = true;
            } else {
                self.history.insert(
                    cycle_key,
                    CycleRecord {
                        units_settled: self.units_settled,
                        height: self.well.max_height(),
                    },
                );
            }
        }
    }

    #[cfg(test)]
    fn string(&self) -> String {
        let top: i64 = (self.falling.pos.y + self.falling.unit.top()).max(self.well.max_height());
        let mut string: String =
            String::with_capacity((Well::WIDTH as usize + 3_usize) * (top as usize + 1_usize));

        for y in (1_i64..=top).rev() {
            string.push('|');

            for x in 0_i64..Well::WIDTH {
                let pos: I64Vec2 = I64Vec2::new(x, y);

                string.push(
                    if self
                        .falling
                        .unit
                        .points()
                        .iter()
                        .any(|point: &I64Vec2| *point + self.falling.pos == pos)
                    {
                        '@'
                    } else if self.well.is_occupied(pos) {
                        '#'
                    } else {
                        '.'
                    },
                );
            }

            string.push_str("|\n");
        }

        string.push('+');

        for _ in 0_i64..Well::WIDTH {
            string.push('-');
        }

        string.push('+');

        string
    }
}

/// The single external entry point: the accumulated height after exactly `target_units` units of
/// the reference catalog have settled, driven by `jets`.
pub fn simulate(jets: &JetPattern, target_units: u64) -> Result<u64, ConfigError> {
    let mut simulation: Simulation = Simulation::new(Catalog::reference(), jets.clone())?;

    Ok(simulation.run(target_units))
}

#[cfg(test)]
mod tests {
    use {super::*, std::sync::OnceLock};

    const JET_PATTERN_STR: &str = ">>><<><>><<<>><>>><<<>>><<<><<<>><>><<>>";
    const TARGET_UNITS_Q1: u64 = 2022_u64;
    const TARGET_UNITS_Q2: u64 = 1_000_000_000_000_u64;
    const HEIGHT_Q1: u64 = 3068_u64;
    const HEIGHT_Q2: u64 = 1_514_285_714_288_u64;
    const SIMULATION_STRING_0_UNITS: &str = concat!(
        "|..@@@@.|\n",
        "|.......|\n",
        "|.......|\n",
        "|.......|\n",
        "+-------+",
    );
    const SIMULATION_STRING_1_UNIT: &str = concat!(
        "|...@...|\n",
        "|..@@@..|\n",
        "|...@...|\n",
        "|.......|\n",
        "|.......|\n",
        "|.......|\n",
        "|..####.|\n",
        "+-------+",
    );
    const SIMULATION_STRING_2_UNITS: &str = concat!(
        "|....@..|\n",
        "|....@..|\n",
        "|..@@@..|\n",
        "|.......|\n",
        "|.......|\n",
        "|.......|\n",
        "|...#...|\n",
        "|..###..|\n",
        "|...#...|\n",
        "|..####.|\n",
        "+-------+",
    );

    fn jet_pattern() -> &'static JetPattern {
        static ONCE_LOCK: OnceLock<JetPattern> = OnceLock::new();

        ONCE_LOCK.get_or_init(|| JET_PATTERN_STR.try_into().unwrap())
    }

    fn simulation() -> Simulation {
        Simulation::new(Catalog::reference(), jet_pattern().clone()).unwrap()
    }

    #[test]
    fn test_new_rejects_empty_config() {
        assert_eq!(
            Simulation::new(Catalog::new(Vec::new()), jet_pattern().clone()).err(),
            Some(ConfigError::EmptyCatalog)
        );
        assert_eq!(
            Simulation::new(Catalog::reference(), JetPattern::new(Vec::new())).err(),
            Some(ConfigError::EmptyJetPattern)
        );
    }

    #[test]
    fn test_first_unit_tick_by_tick() {
        let mut simulation: Simulation = simulation();

        assert_eq!(simulation.string(), SIMULATION_STRING_0_UNITS);

        // Pushed right, then blocked by the right wall twice, then pushed left onto the floor.
        assert!(simulation.try_jet_push());
        assert!(simulation.try_fall());
        assert!(!simulation.try_jet_push());
        assert!(simulation.try_fall());
        assert!(!simulation.try_jet_push());
        assert!(simulation.try_fall());
        assert!(simulation.try_jet_push());
        assert!(!simulation.try_fall());

        assert_eq!(simulation.units_settled, 1_u64);
        assert_eq!(simulation.height(), 1_u64);
        assert_eq!(simulation.string(), SIMULATION_STRING_1_UNIT);

        simulation.settle_next_unit();

        assert_eq!(simulation.string(), SIMULATION_STRING_2_UNITS);
    }

    #[test]
    fn test_run_direct_reference_fixture() {
        let mut simulation: Simulation = simulation();

        assert_eq!(simulation.run_direct(TARGET_UNITS_Q1), HEIGHT_Q1);
        assert!(!simulation.extrapolation_applied());
    }

    #[test]
    fn test_run_matches_run_direct() {
        for target_units in [0_u64, 1_u64, 15_u64, 155_u64, 500_u64, TARGET_UNITS_Q1] {
            let direct_height: u64 = simulation().run_direct(target_units);
            let extrapolated_height: u64 = simulation().run(target_units);

            assert_eq!(
                extrapolated_height, direct_height,
                "heights disagree at {target_units} units"
            );
        }
    }

    #[test]
    fn test_run_one_trillion_units() {
        let mut simulation: Simulation = simulation();

        assert_eq!(simulation.run(TARGET_UNITS_Q2), HEIGHT_Q2);
        assert!(simulation.extrapolation_applied());
        assert_eq!(simulation.total_units_settled(), TARGET_UNITS_Q2);
    }

    #[test]
    fn test_simulate() {
        assert_eq!(simulate(jet_pattern(), 0_u64), Ok(0_u64));
        assert_eq!(simulate(jet_pattern(), TARGET_UNITS_Q1), Ok(HEIGHT_Q1));
        assert_eq!(simulate(jet_pattern(), TARGET_UNITS_Q2), Ok(HEIGHT_Q2));

        // No hidden global state: identical inputs yield identical results.
        assert_eq!(
            simulate(jet_pattern(), TARGET_UNITS_Q2),
            Ok(HEIGHT_Q2)
        );
    }

    #[test]
    fn test_height_is_monotonic() {
        let mut previous_height: u64 = 0_u64;

        for target_units in 0_u64..=60_u64 {
            let height: u64 = simulate(jet_pattern(), target_units).unwrap();

            assert!(
                height >= previous_height,
                "height decreased from {previous_height} to {height} at {target_units} units"
            );
            previous_height = height;
        }
    }

    #[test]
    fn test_pathological_single_unit_single_jet() {
        let catalog: Catalog = Catalog::new(vec![Unit::from(UnitKind::Square)]);
        let jets: JetPattern = JetPattern::new(vec![Jet::Left]);
        let mut simulation: Simulation = Simulation::new(catalog, jets).unwrap();

        // Each square lands flush in the left corner, two rows per unit. Without a detected cycle
        // this target would be unreachable in test time.
        assert_eq!(simulation.run(1_000_000_000_u64), 2_000_000_000_u64);
        assert!(simulation.extrapolation_applied());
        assert!(simulation.units_settled < 2_u64 * SurfaceProfile::MAX_DEPTH as u64);
    }
}
