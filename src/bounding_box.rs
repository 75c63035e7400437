use serde::{Deserialize, Serialize};
use crate::block_position::BlockPos;

/// Inclusive box of block positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: BlockPos,
    pub max: BlockPos,
}

impl BoundingBox {
    pub fn new(min: BlockPos, max: BlockPos) -> Self {
        BoundingBox { min, max }
    }

    /// `None` when the far corner does not fit in `i32`.
    pub fn from_origin_and_size(origin: BlockPos, size: (u32, u32, u32)) -> Option<Self> {
        let max = BlockPos::new(
            far_corner(origin.x, size.0)?,
            far_corner(origin.y, size.1)?,
            far_corner(origin.z, size.2)?,
        );
        Some(BoundingBox { min: origin, max })
    }

    pub fn contains(&self, point: BlockPos) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
            point.y >= self.min.y && point.y <= self.max.y &&
            point.z >= self.min.z && point.z <= self.max.z
    }

    pub fn get_dimensions(&self) -> (i32, i32, i32) {
        (
            (self.max.x - self.min.x + 1),
            (self.max.y - self.min.y + 1),
            (self.max.z - self.min.z + 1),
        )
    }

    pub fn volume(&self) -> u64 {
        let (width, height, length) = self.get_dimensions();
        if width <= 0 || height <= 0 || length <= 0 {
            return 0;
        }
        width as u64 * height as u64 * length as u64
    }
}

fn far_corner(start: i32, size: u32) -> Option<i32> {
    i32::try_from(start as i64 + size as i64 - 1).ok()
}
