//! Pixel formats.
//!
//! A texture’s storage is described by a [`PixelFormat`] (which channels are stored) and a
//! [`PixelType`] (how many bits per channel). Decoded images may not have the channel count the
//! caller asked for; [`select_format`] picks the format actually uploaded.

/// Channels stored per texel.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PixelFormat {
  /// Red channel only.
  R,
  /// Red, green and blue channels.
  RGB,
  /// Red, green, blue and alpha channels.
  RGBA,
}

impl PixelFormat {
  /// Number of channels of the format.
  pub fn channels(self) -> usize {
    match self {
      PixelFormat::R => 1,
      PixelFormat::RGB => 3,
      PixelFormat::RGBA => 4,
    }
  }
}

/// Encoding of each channel.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PixelType {
  /// 8-bit unsigned channels.
  UnsignedByte,
  /// 16-bit unsigned channels, native endian.
  UnsignedShort,
}

impl PixelType {
  pub fn bytes_per_channel(self) -> usize {
    match self {
      PixelType::UnsignedByte => 1,
      PixelType::UnsignedShort => 2,
    }
  }
}

/// Select the format to upload an image having `channels` channels with.
///
/// The requested format is kept when it matches the channel count. Otherwise 1 channel selects
/// [`PixelFormat::R`], 3 select [`PixelFormat::RGB`], 4 select [`PixelFormat::RGBA`] and any
/// other count falls back to [`PixelFormat::RGB`].
pub fn select_format(requested: PixelFormat, channels: usize) -> PixelFormat {
  if requested.channels() == channels {
    return requested;
  }

  match channels {
    1 => PixelFormat::R,
    3 => PixelFormat::RGB,
    4 => PixelFormat::RGBA,
    _ => PixelFormat::RGB,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn matching_format_is_kept() {
    assert_eq!(select_format(PixelFormat::RGBA, 4), PixelFormat::RGBA);
    assert_eq!(select_format(PixelFormat::R, 1), PixelFormat::R);
  }

  #[test]
  fn mismatching_format_follows_channels() {
    assert_eq!(select_format(PixelFormat::RGB, 1), PixelFormat::R);
    assert_eq!(select_format(PixelFormat::RGB, 4), PixelFormat::RGBA);
    assert_eq!(select_format(PixelFormat::RGBA, 3), PixelFormat::RGB);
  }

  #[test]
  fn unknown_channel_counts_fall_back_to_rgb() {
    for &requested in &[PixelFormat::R, PixelFormat::RGB, PixelFormat::RGBA] {
      assert_eq!(select_format(requested, 2), PixelFormat::RGB);
      assert_eq!(select_format(requested, 0), PixelFormat::RGB);
    }
  }
}
