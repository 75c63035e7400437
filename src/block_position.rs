use std::fmt;
use std::ops::{Add, Sub};
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const ZERO: BlockPos = BlockPos { x: 0, y: 0, z: 0 };

    pub fn new(x: i32, y: i32, z: i32) -> Self {
        BlockPos { x, y, z }
    }

    pub fn to_tuple(&self) -> (i32, i32, i32) {
        (self.x, self.y, self.z)
    }

    pub fn from_tuple(tuple: (i32, i32, i32)) -> Self {
        BlockPos::new(tuple.0, tuple.1, tuple.2)
    }

    /// `None` when any component overflows.
    pub fn checked_offset(&self, other: BlockPos) -> Option<BlockPos> {
        Some(BlockPos {
            x: self.x.checked_add(other.x)?,
            y: self.y.checked_add(other.y)?,
            z: self.z.checked_add(other.z)?,
        })
    }
}

impl Add for BlockPos {
    type Output = BlockPos;

    fn add(self, other: BlockPos) -> BlockPos {
        BlockPos::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for BlockPos {
    type Output = BlockPos;

    fn sub(self, other: BlockPos) -> BlockPos {
        BlockPos::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl From<(i32, i32, i32)> for BlockPos {
    fn from(tuple: (i32, i32, i32)) -> Self {
        BlockPos::from_tuple(tuple)
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
