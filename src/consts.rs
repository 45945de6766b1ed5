/// Grid step per refinement stage, coarse to fine.
pub const GRID_STEPS: [f64; 6] = [0.4, 0.2, 0.1, 0.05, 0.02, 0.01];

/// Points per axis for each stage of `GRID_STEPS`.
pub const GRID_BREAKS: [usize; 6] = [5, 5, 5, 5, 6, 5];

/// Centre of the first grid stage in every dimension.
pub const DEFAULT_GRID_INITIAL: f64 = 1.2;

/// Starting coefficient of the local search in every dimension.
pub const DEFAULT_CLIMB_INITIAL: f64 = 0.9;

/// Lattice spacing of the local search.
pub const DEFAULT_CLIMB_STEP: f64 = 0.01;

/// Grid points evaluated between two checkpoint writes.
pub const DEFAULT_SNAPSHOT_INTERVAL: usize = 100;

/// Capacity of the grid result table.
pub const DEFAULT_MAX_RESULTS: usize = 65535;

/// Mutation-count cap; large enough to keep every sample by default.
pub const DEFAULT_MAX_SITES: usize = 65535;

/// Pathway masks are stored in a u64.
pub const MAX_PATHWAYS: usize = 64;

/// Lattice coordinates are rounded to `1 / LATTICE_SCALE` so that one point
/// always has one bit pattern.
pub const LATTICE_SCALE: f64 = 1e9;
