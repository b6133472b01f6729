//! ASCII rendering of a tile grid for terminal previews.

use isoworld_grid::{Grid, TileType};

pub fn glyph(kind: TileType) -> char {
    match kind {
        TileType::Empty => ' ',
        TileType::Floor => '.',
        TileType::Wall => '#',
        TileType::Door => '+',
        TileType::Water => '~',
        TileType::ShallowWater => '-',
        TileType::Grass => '"',
        TileType::Sand => ':',
        TileType::Snow => '*',
        TileType::Ice => '=',
        TileType::Stone => ',',
        TileType::Lava => '&',
        TileType::Mountain => '^',
        TileType::Hill => 'n',
        TileType::RockFormation => '%',
        TileType::Ruins => 'R',
        TileType::Crater => 'O',
        TileType::MineralDeposit => '$',
        TileType::AlienGrowth => '@',
        TileType::Forest => 'T',
        TileType::Mud => ';',
        TileType::Dirt => '`',
        TileType::Crystal => '<',
    }
}

/// One line per grid row, no trailing newline.
pub fn render(grid: &Grid) -> String {
    let mut out = String::with_capacity((grid.width() + 1) * grid.height());
    for (x, y, tile) in grid.iter() {
        if x == 0 && y > 0 {
            out.push('\n');
        }
        out.push(glyph(tile.kind()));
    }
    out
}
