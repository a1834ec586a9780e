//! Extruded block lettering for the melting label.
//!
//! Each glyph is a 5x5 cell pattern; every lit cell becomes a box and the
//! whole label is merged into one mesh, centred on its local origin.

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;

const GLYPH_SIZE: usize = 5;
/// Empty columns between glyphs
const GLYPH_GAP: usize = 1;

type Glyph = [&'static str; GLYPH_SIZE];

fn glyph(c: char) -> Option<Glyph> {
    let rows = match c.to_ascii_uppercase() {
        'A' => [" ### ", "#   #", "#####", "#   #", "#   #"],
        'B' => ["#### ", "#   #", "#### ", "#   #", "#### "],
        'C' => [" ####", "#    ", "#    ", "#    ", " ####"],
        'D' => ["#### ", "#   #", "#   #", "#   #", "#### "],
        'E' => ["#####", "#    ", "#### ", "#    ", "#####"],
        'F' => ["#####", "#    ", "#### ", "#    ", "#    "],
        'G' => [" ####", "#    ", "#  ##", "#   #", " ####"],
        'H' => ["#   #", "#   #", "#####", "#   #", "#   #"],
        'I' => ["#####", "  #  ", "  #  ", "  #  ", "#####"],
        'J' => ["#####", "   # ", "   # ", "#  # ", " ##  "],
        'K' => ["#   #", "#  # ", "###  ", "#  # ", "#   #"],
        'L' => ["#    ", "#    ", "#    ", "#    ", "#####"],
        'M' => ["#   #", "## ##", "# # #", "#   #", "#   #"],
        'N' => ["#   #", "##  #", "# # #", "#  ##", "#   #"],
        'O' => [" ### ", "#   #", "#   #", "#   #", " ### "],
        'P' => ["#### ", "#   #", "#### ", "#    ", "#    "],
        'Q' => [" ### ", "#   #", "# # #", "#  # ", " ## #"],
        'R' => ["#### ", "#   #", "#### ", "#  # ", "#   #"],
        'S' => [" ####", "#    ", " ### ", "    #", "#### "],
        'T' => ["#####", "  #  ", "  #  ", "  #  ", "  #  "],
        'U' => ["#   #", "#   #", "#   #", "#   #", " ### "],
        'V' => ["#   #", "#   #", "#   #", " # # ", "  #  "],
        'W' => ["#   #", "#   #", "# # #", "## ##", "#   #"],
        'X' => ["#   #", " # # ", "  #  ", " # # ", "#   #"],
        'Y' => ["#   #", " # # ", "  #  ", "  #  ", "  #  "],
        'Z' => ["#####", "   # ", "  #  ", " #   ", "#####"],
        ' ' => ["     "; GLYPH_SIZE],
        _ => return None,
    };
    Some(rows)
}

/// Lit cells of `text` as (column, row) with row 0 at the bottom.
///
/// Characters without a glyph are skipped, leaving no gap.
pub fn layout_cells(text: &str) -> Vec<(usize, usize)> {
    let mut cells = Vec::new();
    let mut column = 0;

    for c in text.chars() {
        let Some(rows) = glyph(c) else {
            warn!("No glyph for {:?}, skipping it", c);
            continue;
        };

        for (row_from_top, row) in rows.iter().enumerate() {
            for (x, cell) in row.chars().enumerate() {
                if cell == '#' {
                    cells.push((column + x, GLYPH_SIZE - 1 - row_from_top));
                }
            }
        }
        column += GLYPH_SIZE + GLYPH_GAP;
    }

    cells
}

/// Build the extruded label mesh, or `None` when nothing in `text` is drawable
pub fn label_mesh(text: &str, cell_size: f32, depth: f32) -> Option<Mesh> {
    let cells = layout_cells(text);
    if cells.is_empty() {
        return None;
    }

    let columns = cells.iter().map(|(x, _)| x + 1).max().unwrap_or(0);
    let offset = Vec3::new(
        columns as f32 * cell_size * 0.5,
        GLYPH_SIZE as f32 * cell_size * 0.5,
        0.0,
    );

    let mut builder = BoxBuilder::default();
    let half = Vec3::new(cell_size * 0.5, cell_size * 0.5, depth * 0.5);
    for (x, y) in cells {
        let centre = Vec3::new(
            (x as f32 + 0.5) * cell_size,
            (y as f32 + 0.5) * cell_size,
            0.0,
        ) - offset;
        builder.push(centre, half);
    }

    Some(builder.build())
}

#[derive(Default)]
struct BoxBuilder {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    indices: Vec<u32>,
}

impl BoxBuilder {
    /// Append an axis-aligned box with flat-shaded faces
    fn push(&mut self, centre: Vec3, half: Vec3) {
        const FACES: [(Vec3, Vec3, Vec3); 6] = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];

        for (normal, u, v) in FACES {
            let base = self.positions.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let corner = centre + (normal + u * su + v * sv) * half;
                self.positions.push(corner.to_array());
                self.normals.push(normal.to_array());
                self.uvs.push([(su + 1.0) * 0.5, (1.0 - sv) * 0.5]);
            }
            self.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
    }

    fn build(self) -> Mesh {
        Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
            .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, self.positions)
            .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, self.normals)
            .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, self.uvs)
            .with_inserted_indices(Indices::U32(self.indices))
    }
}
