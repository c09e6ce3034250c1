//! Block tiling for parallel rendering.
//!
//! Divides the image into rectangular blocks that are rendered
//! independently, one rayon task per block.

/// A rectangular region of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    /// X coordinate of the block's top-left corner
    pub x: u32,
    /// Y coordinate of the block's top-left corner
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Row-major position of this block in the grid
    pub index: usize,
}

impl Block {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Tile a `width` x `height` image into blocks of at most
/// `block_width` x `block_height`, in row-major order.
///
/// Edge blocks are clipped to the image.
pub fn generate_blocks(width: u32, height: u32, block_width: u32, block_height: u32) -> Vec<Block> {
    if block_width == 0 || block_height == 0 {
        return Vec::new();
    }

    let mut blocks = Vec::new();
    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = block_width.min(width - x);
            let bh = block_height.min(height - y);
            blocks.push(Block::new(x, y, bw, bh, blocks.len()));
            x += block_width;
        }
        y += block_height;
    }
    blocks
}
