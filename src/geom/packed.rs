//! Compact 64-bit triangle index encoding.
//!
//! Three 20-bit vertex indices are split over two `u32` words so a triangle's
//! topology fits in 8 bytes of GPU memory:
//!
//! ```text
//! lo: [ i1 low 12 bits | i0 (20 bits) ]
//! hi: [ 0000 | i2 (20 bits) | i1 high 8 bits ]
//! ```

use bytemuck::{Pod, Zeroable};

use crate::util::{Error, Result};

/// Largest vertex index representable in the packed format.
pub const MAX_PACKED_INDEX: u32 = 0x000f_ffff;

/// Three vertex indices packed into two words.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct PackedIndices {
    pub lo: u32,
    pub hi: u32,
}

impl PackedIndices {
    /// Pack three indices, failing if any exceeds [`MAX_PACKED_INDEX`].
    pub fn pack(indices: [u32; 3]) -> Result<Self> {
        if let Some(&bad) = indices.iter().find(|&&i| i > MAX_PACKED_INDEX) {
            return Err(Error::VertexIndexOverflow(bad));
        }
        let [i0, i1, i2] = indices;
        Ok(Self {
            lo: (i0 & 0x000f_ffff) | ((i1 << 20) & 0xfff0_0000),
            hi: ((i1 >> 12) & 0x0000_00ff) | ((i2 << 8) & 0x0fff_ff00),
        })
    }

    /// Recover the three indices.
    pub fn unpack(&self) -> [u32; 3] {
        let i0 = self.lo & 0x000f_ffff;
        let i1 = (self.lo >> 20) | ((self.hi & 0xff) << 12);
        let i2 = (self.hi >> 8) & 0x000f_ffff;
        [i0, i1, i2]
    }
}
