//! Draw commands.

use std::{error, fmt};

/// Primitive mode used to assemble vertices.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Mode {
  /// A single point per vertex.
  Points,
  /// A line between every pair of vertices.
  Lines,
  /// A triangle for every three vertices.
  Triangles,
  /// A triangle for every vertex after the second one, sharing the two previous ones.
  TriangleStrip,
  /// A triangle for every vertex after the second one, sharing the first and previous ones.
  TriangleFan,
}

/// Type of the indices read by an indexed draw.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum IndexType {
  U8,
  U16,
  U32,
}

impl IndexType {
  /// Size of one index, in bytes.
  pub fn bytes(self) -> usize {
    match self {
      IndexType::U8 => 1,
      IndexType::U16 => 2,
      IndexType::U32 => 4,
    }
  }

  /// Decode an index from its native-endian byte representation.
  pub fn read(self, bytes: &[u8]) -> Option<u32> {
    match self {
      IndexType::U8 => bytes.first().map(|&b| b as u32),
      IndexType::U16 => {
        let raw = bytes.get(..2)?;
        Some(u16::from_ne_bytes([raw[0], raw[1]]) as u32)
      }
      IndexType::U32 => {
        let raw = bytes.get(..4)?;
        Some(u32::from_ne_bytes([raw[0], raw[1], raw[2], raw[3]]))
      }
    }
  }
}

/// Errors rejected before a draw call reaches the backend.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RenderError {
  /// An indexed draw was asked on a vertex array without index buffer.
  NoIndexBuffer,
  /// More indices were requested than the index buffer holds.
  IndexOverflow { requested: usize, available: usize },
  /// A non-indexed draw would read past the end of a vertex buffer.
  VertexOverflow { slot: u32, needed: usize, available: usize },
}

impl fmt::Display for RenderError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      RenderError::NoIndexBuffer => f.write_str("indexed draw without index buffer"),

      RenderError::IndexOverflow {
        requested,
        available,
      } => write!(
        f,
        "index buffer overflow (requested = {}, available = {})",
        requested, available
      ),

      RenderError::VertexOverflow {
        slot,
        needed,
        available,
      } => write!(
        f,
        "vertex buffer overflow on attribute {} (needed = {} bytes, available = {} bytes)",
        slot, needed, available
      ),
    }
  }
}

impl error::Error for RenderError {}
