use alloc::vec;

use super::*;

/// Duplicate draws tolerated on one board before falling back to linear probing.
const MAX_REDRAWS: u32 = 10_000;

/// Generation strategy that picks a cut density from the stake, then scatters that many cuts uniformly.
#[derive(Clone, Debug)]
pub struct StakeTieredGenerator<R> {
    table: DensityTable,
    source: R,
}

impl<R: RandomSource> StakeTieredGenerator<R> {
    pub fn new(table: DensityTable, source: R) -> Self {
        Self { table, source }
    }

    pub fn table(&self) -> &DensityTable {
        &self.table
    }

    fn draw_index(&mut self, tile_count: TileCount) -> usize {
        let index = (self.source.next_float() * f64::from(tile_count)) as usize;
        // a misbehaving source could hand out exactly 1.0
        index.min(usize::from(tile_count) - 1)
    }
}

impl<R: RandomSource> BoardGenerator for StakeTieredGenerator<R> {
    fn generate(&mut self, stake: Amount, tile_count: TileCount) -> Board {
        if tile_count == 0 {
            log::warn!("Requested an empty board, nothing to place");
            return Board::from_mask(vec![]);
        }

        let rate = self.table.draw_rate(stake, &mut self.source);
        let cut_count = cut_count_for(rate, tile_count);

        let len = usize::from(tile_count);
        let mut cuts = vec![false; len];
        let mut placed: TileCount = 0;
        let mut rejected = 0u32;
        while placed < cut_count {
            let mut index = self.draw_index(tile_count);
            if cuts[index] {
                rejected += 1;
                if rejected < MAX_REDRAWS {
                    continue;
                }
                if rejected == MAX_REDRAWS {
                    log::warn!(
                        "Random source keeps repeating itself, placing remaining cuts on the next free tile"
                    );
                }
                let Some(free) = (1..len).map(|step| (index + step) % len).find(|&i| !cuts[i])
                else {
                    break;
                };
                index = free;
            }
            cuts[index] = true;
            placed += 1;
        }

        log::trace!(
            "Board for stake {}: rate {:.4}, {} cuts of {} tiles, {} duplicate draws",
            stake,
            rate,
            cut_count,
            tile_count,
            rejected
        );
        Board::from_mask(cuts)
    }
}
