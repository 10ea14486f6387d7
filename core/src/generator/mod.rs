use crate::*;
pub use density::*;
pub use random::*;
pub use source::*;

mod density;
mod random;
mod source;

pub trait BoardGenerator {
    fn generate(&mut self, stake: Amount, tile_count: TileCount) -> Board;
}

impl<G: BoardGenerator + ?Sized> BoardGenerator for &mut G {
    fn generate(&mut self, stake: Amount, tile_count: TileCount) -> Board {
        (**self).generate(stake, tile_count)
    }
}
