//! Terrain grid construction and passability queries.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use river_chase_core::{Capabilities, TileCoord, TileKind};

/// Width of the river band threaded through the grid, in tiles.
pub(crate) const RIVER_WIDTH: u32 = 3;
/// Probability that any given land tile hosts an obstacle.
const OBSTACLE_PROBABILITY: f64 = 0.12;

/// Fixed-size tile grid, immutable after construction.
///
/// Tile kinds are stored densely in row-major order. No method mutates a
/// kind after [`Grid::generate`] returns; every component may therefore
/// share the grid by reference for the lifetime of a round.
#[derive(Clone, Debug)]
pub struct Grid {
    columns: u32,
    rows: u32,
    tiles: Vec<TileKind>,
}

impl Grid {
    /// Generates a fresh grid: a meandering river band of fixed width whose
    /// base column shifts by at most one per row while staying fully
    /// on-grid, then obstacles scattered over the remaining land tiles.
    pub(crate) fn generate(columns: u32, rows: u32, rng: &mut ChaCha8Rng) -> Self {
        let capacity = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        let mut tiles = vec![TileKind::Land; capacity];

        if columns > RIVER_WIDTH + 1 && rows > 0 {
            let max_base = columns - RIVER_WIDTH - 1;
            let low = (columns / 3).min(max_base);
            let high = (low + RIVER_WIDTH).min(max_base + 1).max(low + 1);
            let mut base = rng.gen_range(low..high);

            for row in 0..rows {
                for offset in 0..RIVER_WIDTH {
                    let index = (row * columns + base + offset) as usize;
                    tiles[index] = TileKind::River;
                }
                let shift = rng.gen_range(-1_i64..=1);
                let shifted = i64::from(base) + shift;
                base = shifted.clamp(1, i64::from(max_base)) as u32;
            }
        }

        for tile in tiles.iter_mut() {
            if *tile == TileKind::Land && rng.gen_bool(OBSTACLE_PROBABILITY) {
                *tile = TileKind::Obstacle;
            }
        }

        Self {
            columns,
            rows,
            tiles,
        }
    }

    /// Builds a grid from explicit tile kinds, for fixture construction.
    #[cfg(any(test, feature = "scenario_scaffolding"))]
    #[must_use]
    pub fn from_kinds(columns: u32, rows: u32, tiles: Vec<TileKind>) -> Self {
        assert_eq!(tiles.len(), (columns * rows) as usize, "kind count");
        Self {
            columns,
            rows,
            tiles,
        }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the tile lies within the grid bounds.
    #[must_use]
    pub fn contains(&self, tile: TileCoord) -> bool {
        tile.column() < self.columns && tile.row() < self.rows
    }

    /// Kind of the provided tile, if it lies within the grid.
    #[must_use]
    pub fn kind(&self, tile: TileCoord) -> Option<TileKind> {
        self.index(tile).and_then(|index| self.tiles.get(index).copied())
    }

    /// Reports whether the tile's rule denies the provided capability set.
    /// Tiles outside the grid deny everyone.
    #[must_use]
    pub fn is_blocked_for(&self, capabilities: Capabilities, tile: TileCoord) -> bool {
        match self.kind(tile) {
            Some(kind) => kind.denies(capabilities),
            None => true,
        }
    }

    /// Reports whether the tile is river water.
    #[must_use]
    pub fn is_river(&self, tile: TileCoord) -> bool {
        self.kind(tile) == Some(TileKind::River)
    }

    /// Up to four orthogonally adjacent tiles in fixed east, west, south,
    /// north order. The order is part of the contract: the path stepper
    /// depends on it for determinism.
    #[must_use]
    pub fn neighbors(&self, tile: TileCoord) -> NeighborIter {
        let mut neighbors = NeighborIter::default();

        if tile.column() + 1 < self.columns {
            neighbors.push(TileCoord::new(tile.column() + 1, tile.row()));
        }
        if tile.column() > 0 {
            neighbors.push(TileCoord::new(tile.column() - 1, tile.row()));
        }
        if tile.row() + 1 < self.rows {
            neighbors.push(TileCoord::new(tile.column(), tile.row() + 1));
        }
        if tile.row() > 0 {
            neighbors.push(TileCoord::new(tile.column(), tile.row() - 1));
        }

        neighbors
    }

    /// Enumerates every tile with its kind in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (TileCoord, TileKind)> + '_ {
        self.tiles.iter().enumerate().map(|(index, kind)| {
            let index = index as u32;
            (
                TileCoord::new(index % self.columns, index / self.columns),
                *kind,
            )
        })
    }

    /// First river tile in row-major order, or the grid centre when the
    /// grid carries no river at all.
    pub(crate) fn first_river_tile_or_center(&self) -> TileCoord {
        self.iter()
            .find(|(_, kind)| *kind == TileKind::River)
            .map(|(tile, _)| tile)
            .unwrap_or_else(|| TileCoord::new(self.columns / 2, self.rows / 2))
    }

    /// Uniformly random river tile, if the grid has any.
    pub(crate) fn random_river_tile(&self, rng: &mut ChaCha8Rng) -> Option<TileCoord> {
        let river: Vec<TileCoord> = self
            .iter()
            .filter(|(_, kind)| *kind == TileKind::River)
            .map(|(tile, _)| tile)
            .collect();
        if river.is_empty() {
            return None;
        }
        Some(river[rng.gen_range(0..river.len())])
    }

    /// Uniformly random non-river tile the capability set may enter, if
    /// one exists. Used by the stuck-escape diversion.
    pub(crate) fn random_open_land_tile(
        &self,
        capabilities: Capabilities,
        rng: &mut ChaCha8Rng,
    ) -> Option<TileCoord> {
        let open: Vec<TileCoord> = self
            .iter()
            .filter(|(tile, kind)| {
                *kind != TileKind::River && !kind.denies(capabilities) && self.contains(*tile)
            })
            .map(|(tile, _)| tile)
            .collect();
        if open.is_empty() {
            return None;
        }
        Some(open[rng.gen_range(0..open.len())])
    }

    pub(crate) fn index(&self, tile: TileCoord) -> Option<usize> {
        if !self.contains(tile) {
            return None;
        }
        let row = usize::try_from(tile.row()).ok()?;
        let column = usize::try_from(tile.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }
}

/// Iterator over a tile's orthogonal neighbors in fixed order.
#[derive(Clone, Debug, Default)]
pub struct NeighborIter {
    buffer: [Option<TileCoord>; 4],
    len: usize,
    cursor: usize,
}

impl NeighborIter {
    fn push(&mut self, tile: TileCoord) {
        if self.len < self.buffer.len() {
            self.buffer[self.len] = Some(tile);
            self.len += 1;
        }
    }
}

impl Iterator for NeighborIter {
    type Item = TileCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.len {
            return None;
        }

        let value = self.buffer[self.cursor];
        self.cursor += 1;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn river_band(grid: &Grid, row: u32) -> Option<(u32, u32)> {
        let mut first = None;
        let mut count = 0;
        for column in 0..grid.columns() {
            if grid.is_river(TileCoord::new(column, row)) {
                if first.is_none() {
                    first = Some(column);
                }
                count += 1;
            }
        }
        first.map(|start| (start, count))
    }

    #[test]
    fn river_band_threads_every_row_with_fixed_width() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let grid = Grid::generate(20, 20, &mut rng);

        let mut previous_start = None;
        for row in 0..grid.rows() {
            let (start, count) = river_band(&grid, row).expect("river missing from row");
            assert_eq!(count, RIVER_WIDTH, "row {row} has wrong river width");
            // Contiguity: the band covers start..start+width.
            for offset in 0..RIVER_WIDTH {
                assert!(grid.is_river(TileCoord::new(start + offset, row)));
            }
            assert!(start + RIVER_WIDTH <= grid.columns());
            if let Some(previous) = previous_start {
                let shift = u32::abs_diff(start, previous);
                assert!(shift <= 1, "row {row} shifted by {shift}");
            }
            previous_start = Some(start);
        }
    }

    #[test]
    fn obstacles_never_replace_river_tiles() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let grid = Grid::generate(20, 20, &mut rng);

        for (tile, kind) in grid.iter() {
            if kind == TileKind::Obstacle {
                assert!(!grid.is_river(tile));
            }
        }
    }

    #[test]
    fn generation_is_deterministic_for_same_seed() {
        let mut first_rng = ChaCha8Rng::seed_from_u64(41);
        let mut second_rng = ChaCha8Rng::seed_from_u64(41);
        let first = Grid::generate(20, 20, &mut first_rng);
        let second = Grid::generate(20, 20, &mut second_rng);

        assert!(first.iter().eq(second.iter()));
    }

    #[test]
    fn neighbor_order_is_east_west_south_north() {
        let grid = Grid::from_kinds(3, 3, vec![TileKind::Land; 9]);
        let center = TileCoord::new(1, 1);

        let neighbors: Vec<TileCoord> = grid.neighbors(center).collect();
        assert_eq!(
            neighbors,
            vec![
                TileCoord::new(2, 1),
                TileCoord::new(0, 1),
                TileCoord::new(1, 2),
                TileCoord::new(1, 0),
            ]
        );
    }

    #[test]
    fn corner_tiles_have_two_neighbors() {
        let grid = Grid::from_kinds(3, 3, vec![TileKind::Land; 9]);
        let corner = TileCoord::new(0, 0);

        let neighbors: Vec<TileCoord> = grid.neighbors(corner).collect();
        assert_eq!(
            neighbors,
            vec![TileCoord::new(1, 0), TileCoord::new(0, 1)]
        );
    }

    #[test]
    fn blocked_queries_respect_capabilities_and_bounds() {
        let kinds = vec![
            TileKind::Land,
            TileKind::River,
            TileKind::Obstacle,
            TileKind::Land,
        ];
        let grid = Grid::from_kinds(2, 2, kinds);
        let swimmer = Capabilities::none().with_swim();
        let walker = Capabilities::none();

        assert!(!grid.is_blocked_for(walker, TileCoord::new(0, 0)));
        assert!(grid.is_blocked_for(walker, TileCoord::new(1, 0)));
        assert!(!grid.is_blocked_for(swimmer, TileCoord::new(1, 0)));
        assert!(grid.is_blocked_for(swimmer, TileCoord::new(0, 1)));
        assert!(grid.is_blocked_for(swimmer, TileCoord::new(5, 5)));
    }

    #[test]
    fn first_river_tile_falls_back_to_center() {
        let grid = Grid::from_kinds(3, 3, vec![TileKind::Land; 9]);
        assert_eq!(grid.first_river_tile_or_center(), TileCoord::new(1, 1));

        let mut kinds = vec![TileKind::Land; 9];
        kinds[5] = TileKind::River;
        let river_grid = Grid::from_kinds(3, 3, kinds);
        assert_eq!(
            river_grid.first_river_tile_or_center(),
            TileCoord::new(2, 1)
        );
    }
}
