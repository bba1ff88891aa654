use core::fmt;

/// An opaque 128-bit identifier for logical operations and activities.
///
/// Rendered in the conventional hyphenated GUID form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ActivityId(u128);

impl ActivityId {
    /// The all-zero identifier.
    pub const NIL: ActivityId = ActivityId(0);

    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        ActivityId(rand::random())
    }

    pub const fn from_u128(value: u128) -> Self {
        ActivityId(value)
    }

    pub const fn to_u128(self) -> u128 {
        self.0
    }

    pub fn is_nil(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;

        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
            (v >> 96) as u32,
            (v >> 80) as u16,
            (v >> 64) as u16,
            (v >> 48) as u16,
            v & 0xffff_ffff_ffff
        )
    }
}

impl fmt::Debug for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self)
    }
}
