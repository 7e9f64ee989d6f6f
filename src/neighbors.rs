//! Neighbor algebra on quadkeys.
//!
//! Moving to an adjacent cell never re-projects coordinates: it is pure key
//! arithmetic, so it also works on coarse placeholder keys inside the lookup
//! tree. On the packed representation a move is a masked add/sub on the
//! interleaved word: the x bits of a quad occupy the even bit positions and
//! the y bits the odd ones, so adding the axis unit with the other axis
//! masked off steps one cell while the carry ripples through exactly the
//! digits a recursive borrow on the digit string would rewrite. Each axis
//! wraps modulo `2^zoom`, which is the map-edge wraparound: the leftmost
//! column's left neighbor is the rightmost column. The empty quad (whole
//! map) is a fixpoint of every move.

use crate::quad::Quad;
use crate::tile::{MapPixel, TileQuadrant};

// even bit positions carry x, odd positions carry y
const X_BITS: u64 = 0x5555_5555_5555_5555;

#[inline]
const fn level_mask(zoom: u8) -> u64 {
    (1u64 << (2 * zoom as u32)) - 1
}

impl Quad {
    fn step(self, x_axis: bool, forward: bool) -> Quad {
        if self.is_empty() {
            return Quad::EMPTY;
        }
        let m = level_mask(self.zoom());
        let axis = if x_axis { X_BITS & m } else { !X_BITS & m };
        let unit: u64 = if x_axis { 1 } else { 2 };

        let part = self.bits() & axis;
        let moved = if forward {
            // fill the other axis' positions so the carry passes through them
            (part | !axis).wrapping_add(unit) & axis
        } else {
            part.wrapping_sub(unit) & axis
        };
        Quad::from_raw(moved | (self.bits() & (m & !axis)), self.zoom())
    }

    /// The cell to the left (x - 1), wrapping at the west map edge.
    pub fn left(self) -> Quad {
        self.step(true, false)
    }

    /// The cell to the right (x + 1), wrapping at the east map edge.
    pub fn right(self) -> Quad {
        self.step(true, true)
    }

    /// The cell above (y - 1), wrapping at the north map edge.
    pub fn above(self) -> Quad {
        self.step(false, false)
    }

    /// The cell below (y + 1), wrapping at the south map edge.
    pub fn below(self) -> Quad {
        self.step(false, true)
    }

    /// The 2x2 neighborhood `[self, left, left-above, above]`, treating this
    /// quad as the bottom-right (top-left sample) of the block.
    pub fn around(self) -> [Quad; 4] {
        let left = self.left();
        [self, left, left.above(), self.above()]
    }

    /// The 2x2 neighborhood around a geographic position, picking the three
    /// neighbors on the side of the tile the position actually occupies.
    /// Self is element `[0]`. An out-of-range zoom yields four empty quads.
    pub fn around4(lat: f64, lon: f64, zoom: u8) -> [Quad; 4] {
        let pixel = MapPixel::from_lat_lon(lat, lon, zoom);
        let q = Quad::from_tile(pixel.tile(), zoom);
        if q.is_empty() {
            return [Quad::EMPTY; 4];
        }
        match pixel.quadrant() {
            TileQuadrant::LeftTop => [q, q.left(), q.left().above(), q.above()],
            TileQuadrant::RightTop => [q, q.right(), q.right().above(), q.above()],
            TileQuadrant::RightBottom => [q, q.right(), q.right().below(), q.below()],
            TileQuadrant::LeftBottom => [q, q.left(), q.left().below(), q.below()],
        }
    }

    /// The 3x3 neighborhood: self first, then the eight surrounding cells
    /// clockwise starting from the left.
    pub fn around9(self) -> [Quad; 9] {
        let mut ret = [Quad::EMPTY; 9];
        ret[0] = self;
        ret[1] = ret[0].left();
        ret[2] = ret[1].above();
        ret[3] = ret[2].right();
        ret[4] = ret[3].right();
        ret[5] = ret[4].below();
        ret[6] = ret[5].below();
        ret[7] = ret[6].left();
        ret[8] = ret[7].left();
        ret
    }

    /// A 16-cell cover for 7x7-tile map displays.
    ///
    /// Looking up all 49 fine cells is wasteful; instead this steps one zoom
    /// level out, takes the 3x3 neighborhood there, and extends the two
    /// short sides chosen by which quadrant of its parent this quad occupies
    /// (its last digit). The result overshoots the 7x7 area but costs 16
    /// lookups instead of 49.
    pub fn around49_ex(self) -> [Quad; 16] {
        let h = self.parent();

        let mut ret = [Quad::EMPTY; 16];
        ret[0] = h;
        ret[1] = ret[0].left();
        ret[2] = ret[1].above();
        ret[3] = ret[2].right();
        ret[4] = ret[3].right();
        ret[5] = ret[4].below();
        ret[6] = ret[5].below();
        ret[7] = ret[6].left();
        ret[8] = ret[7].left();

        match self.last_digit() {
            Some(0) => {
                // extend left and above
                ret[9] = ret[8].left();
                ret[10] = ret[9].above();
                ret[11] = ret[10].above();
                ret[12] = ret[11].above();
                ret[13] = ret[12].right();
                ret[14] = ret[13].right();
                ret[15] = ret[14].right();
            }
            Some(1) => {
                // extend right and above
                ret[9] = ret[6].right();
                ret[10] = ret[9].above();
                ret[11] = ret[10].above();
                ret[12] = ret[11].above();
                ret[13] = ret[12].left();
                ret[14] = ret[13].left();
                ret[15] = ret[14].left();
            }
            Some(2) => {
                // extend left and below
                ret[9] = ret[2].left();
                ret[10] = ret[9].below();
                ret[11] = ret[10].below();
                ret[12] = ret[11].below();
                ret[13] = ret[12].right();
                ret[14] = ret[13].right();
                ret[15] = ret[14].right();
            }
            Some(3) => {
                // extend right and below
                ret[9] = ret[4].right();
                ret[10] = ret[9].below();
                ret[11] = ret[10].below();
                ret[12] = ret[11].below();
                ret[13] = ret[12].left();
                ret[14] = ret[13].left();
                ret[15] = ret[14].left();
            }
            // digits are <= 3 by construction; None is the empty quad
            _ => {}
        }
        ret
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TileXy;
    use std::collections::HashSet;

    /// Reference implementation on digit strings, straight from the
    /// borrow/carry transition table, used to validate the bit arithmetic.
    fn shift_str(key: &str, dir: char) -> String {
        if key.is_empty() {
            return String::new();
        }
        let (head, last) = key.split_at(key.len() - 1);
        let (rec, keep): (&[_], &[_]) = match dir {
            // (digits that recurse into the parent, replacement digits 0..=3)
            'l' => (&['0', '2'], &['1', '0', '3', '2']),
            'r' => (&['1', '3'], &['1', '0', '3', '2']),
            'a' => (&['0', '1'], &['2', '3', '0', '1']),
            'b' => (&['2', '3'], &['2', '3', '0', '1']),
            _ => unreachable!(),
        };
        let last_char = last.chars().next().unwrap();
        let digit = last_char.to_digit(4).unwrap() as usize;
        let parent = if rec.contains(&last_char) {
            shift_str(head, dir)
        } else {
            head.to_string()
        };
        format!("{parent}{}", keep[digit])
    }

    #[test]
    fn test_reference_matches_transition_table() {
        // spot-check the reference against the table rows
        assert_eq!(shift_str("1", 'l'), "0");
        assert_eq!(shift_str("0", 'l'), "1"); // wraps through the parent
        assert_eq!(shift_str("2", 'a'), "0");
        assert_eq!(shift_str("3", 'b'), "1"); // wraps
        assert_eq!(shift_str("30", 'l'), "21");
        assert_eq!(shift_str("21", 'r'), "30");
    }

    #[test]
    fn test_bit_steps_match_reference_exhaustively() {
        for zoom in 1..=4u8 {
            let side = 1u32 << zoom;
            for x in 0..side {
                for y in 0..side {
                    let q = Quad::from_tile(TileXy::new(x, y), zoom);
                    let key = q.to_string();
                    assert_eq!(q.left().to_string(), shift_str(&key, 'l'), "left of {key}");
                    assert_eq!(q.right().to_string(), shift_str(&key, 'r'), "right of {key}");
                    assert_eq!(q.above().to_string(), shift_str(&key, 'a'), "above of {key}");
                    assert_eq!(q.below().to_string(), shift_str(&key, 'b'), "below of {key}");
                }
            }
        }
    }

    #[test]
    fn test_steps_move_tile_indices() {
        let q = Quad::from_tile(TileXy::new(5, 9), 5);
        assert_eq!(q.left().to_tile(), TileXy::new(4, 9));
        assert_eq!(q.right().to_tile(), TileXy::new(6, 9));
        assert_eq!(q.above().to_tile(), TileXy::new(5, 8));
        assert_eq!(q.below().to_tile(), TileXy::new(5, 10));
    }

    #[test]
    fn test_neighbor_inverses() {
        for key in ["0", "13", "0123", "31020", "2222222"] {
            let q: Quad = key.parse().unwrap();
            assert_eq!(q.right().left(), q, "left-right at {key}");
            assert_eq!(q.left().right(), q, "right-left at {key}");
            assert_eq!(q.below().above(), q, "above-below at {key}");
            assert_eq!(q.above().below(), q, "below-above at {key}");
        }
    }

    #[test]
    fn test_wrap_at_map_edges() {
        // leftmost column wraps to the rightmost
        let west = Quad::from_tile(TileXy::new(0, 2), 3);
        assert_eq!(west.left().to_tile(), TileXy::new(7, 2));
        // and the inverse holds through the wrap
        assert_eq!(west.left().right(), west);

        // top row wraps to the bottom row
        let north = Quad::from_tile(TileXy::new(3, 0), 3);
        assert_eq!(north.above().to_tile(), TileXy::new(3, 7));

        // zoom 1 corner cases from the digit table
        assert_eq!("0".parse::<Quad>().unwrap().left().to_string(), "1");
        assert_eq!("00".parse::<Quad>().unwrap().above().to_string(), "22");
    }

    #[test]
    fn test_empty_is_fixpoint() {
        assert_eq!(Quad::EMPTY.left(), Quad::EMPTY);
        assert_eq!(Quad::EMPTY.right(), Quad::EMPTY);
        assert_eq!(Quad::EMPTY.above(), Quad::EMPTY);
        assert_eq!(Quad::EMPTY.below(), Quad::EMPTY);
    }

    #[test]
    fn test_around() {
        let q = Quad::from_tile(TileXy::new(4, 4), 4);
        let a = q.around();
        assert_eq!(a[0].to_tile(), TileXy::new(4, 4));
        assert_eq!(a[1].to_tile(), TileXy::new(3, 4));
        assert_eq!(a[2].to_tile(), TileXy::new(3, 3));
        assert_eq!(a[3].to_tile(), TileXy::new(4, 3));
    }

    #[test]
    fn test_around9_is_3x3() {
        let q = Quad::from_tile(TileXy::new(8, 8), 5);
        let ring = q.around9();
        assert_eq!(ring[0], q);

        let tiles: HashSet<(u32, u32)> =
            ring.iter().map(|n| (n.to_tile().x, n.to_tile().y)).collect();
        assert_eq!(tiles.len(), 9);
        for dx in -1i64..=1 {
            for dy in -1i64..=1 {
                assert!(tiles.contains(&((8 + dx) as u32, (8 + dy) as u32)));
            }
        }
    }

    #[test]
    fn test_around4_follows_quadrant() {
        // a point in the left-top corner of its tile picks left/above neighbors
        let zoom = 6;
        let tile = TileXy::new(20, 20);
        let lt = tile.lt_pixel();
        let corner = crate::tile::MapPixel::new(lt.x + 10, lt.y + 10).lat_lon(zoom);
        let a = Quad::around4(corner.y(), corner.x(), zoom);
        assert_eq!(a[0].to_tile(), tile);
        assert_eq!(a[1].to_tile(), TileXy::new(19, 20));
        assert_eq!(a[2].to_tile(), TileXy::new(19, 19));
        assert_eq!(a[3].to_tile(), TileXy::new(20, 19));

        // dead center is still the left-top side (<= comparison)
        let c = tile.center_pixel().lat_lon(zoom);
        let a = Quad::around4(c.y(), c.x(), zoom);
        assert_eq!(a[1].to_tile(), TileXy::new(19, 20));

        // invalid zoom is a sentinel, not an error
        assert!(Quad::around4(10.0, 10.0, 0).iter().all(|q| q.is_empty()));
        assert!(Quad::around4(10.0, 10.0, 42).iter().all(|q| q.is_empty()));
    }

    #[test]
    fn test_around49_ex_covers_4x4_coarse_block() {
        // for each quadrant digit the 16 coarse quads must form a contiguous
        // 4x4 block around the parent, shifted toward the short sides
        for digit in 0..4u32 {
            let parent = TileXy::new(9, 9);
            let child = TileXy::new(parent.x * 2 + (digit & 1), parent.y * 2 + (digit >> 1));
            let q = Quad::from_tile(child, 6);
            assert_eq!(q.last_digit(), Some(digit as u8));

            let cover = q.around49_ex();
            assert_eq!(cover[0].to_tile(), parent);
            assert!(cover.iter().all(|c| c.zoom() == 5));

            let tiles: HashSet<(u32, u32)> =
                cover.iter().map(|n| (n.to_tile().x, n.to_tile().y)).collect();
            assert_eq!(tiles.len(), 16, "digit {digit}");

            // block extent: toward left/above for digit 0, right/above for 1,
            // left/below for 2, right/below for 3
            let (x0, y0) = match digit {
                0 => (7, 7),
                1 => (8, 7),
                2 => (7, 8),
                _ => (8, 8),
            };
            for dx in 0..4u32 {
                for dy in 0..4u32 {
                    assert!(
                        tiles.contains(&(x0 + dx, y0 + dy)),
                        "digit {digit} missing ({},{})",
                        x0 + dx,
                        y0 + dy
                    );
                }
            }
        }
    }

    #[test]
    fn test_around49_ex_of_zoom1_collapses() {
        // the parent of a zoom-1 quad is the whole map; everything degrades
        // to empty quads rather than erroring
        let q: Quad = "2".parse().unwrap();
        assert!(q.around49_ex().iter().all(|c| c.is_empty()));
    }
}
