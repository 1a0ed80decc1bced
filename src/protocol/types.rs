//! Common wire types shared by the setup, request, reply, and event decoders.

use bitflags::bitflags;

/// Byte order declared by the client in the first byte of its initiation
/// message and latched for the rest of the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}

impl ByteOrder {
    /// `'B'` selects MSB-first, `'l'` LSB-first; anything else is malformed.
    pub fn from_initiation_byte(byte: u8) -> Option<Self> {
        match byte {
            b'B' => Some(ByteOrder::BigEndian),
            b'l' => Some(ByteOrder::LittleEndian),
            _ => None,
        }
    }
}

/// Resource ids (WINDOW, PIXMAP, and friends) and ATOMs are 29-bit values;
/// the top three bits are mandated zero by the protocol.
pub const ID_ZERO_BITS: u32 = 0xE000_0000;

/// `SETofKEYMASK` sentinel accepted by the grab requests.
pub const ANY_MODIFIER: u16 = 0x8000;

bitflags! {
    /// SETofEVENT; bits 25..=31 must be zero.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SetOfEvent: u32 {
        const KEY_PRESS             = 1 << 0;
        const KEY_RELEASE           = 1 << 1;
        const BUTTON_PRESS          = 1 << 2;
        const BUTTON_RELEASE        = 1 << 3;
        const ENTER_WINDOW          = 1 << 4;
        const LEAVE_WINDOW          = 1 << 5;
        const POINTER_MOTION        = 1 << 6;
        const POINTER_MOTION_HINT   = 1 << 7;
        const BUTTON1_MOTION        = 1 << 8;
        const BUTTON2_MOTION        = 1 << 9;
        const BUTTON3_MOTION        = 1 << 10;
        const BUTTON4_MOTION        = 1 << 11;
        const BUTTON5_MOTION        = 1 << 12;
        const BUTTON_MOTION         = 1 << 13;
        const KEYMAP_STATE          = 1 << 14;
        const EXPOSURE              = 1 << 15;
        const VISIBILITY_CHANGE     = 1 << 16;
        const STRUCTURE_NOTIFY      = 1 << 17;
        const RESIZE_REDIRECT       = 1 << 18;
        const SUBSTRUCTURE_NOTIFY   = 1 << 19;
        const SUBSTRUCTURE_REDIRECT = 1 << 20;
        const FOCUS_CHANGE          = 1 << 21;
        const PROPERTY_CHANGE       = 1 << 22;
        const COLORMAP_CHANGE       = 1 << 23;
        const OWNER_GRAB_BUTTON     = 1 << 24;
    }
}

bitflags! {
    /// SETofPOINTEREVENT; same encoding as SETofEVENT with 0xFFFF8003 zero.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SetOfPointerEvent: u32 {
        const BUTTON_PRESS        = 1 << 2;
        const BUTTON_RELEASE      = 1 << 3;
        const ENTER_WINDOW        = 1 << 4;
        const LEAVE_WINDOW        = 1 << 5;
        const POINTER_MOTION      = 1 << 6;
        const POINTER_MOTION_HINT = 1 << 7;
        const BUTTON1_MOTION      = 1 << 8;
        const BUTTON2_MOTION      = 1 << 9;
        const BUTTON3_MOTION      = 1 << 10;
        const BUTTON4_MOTION      = 1 << 11;
        const BUTTON5_MOTION      = 1 << 12;
        const BUTTON_MOTION       = 1 << 13;
        const KEYMAP_STATE        = 1 << 14;
    }
}

bitflags! {
    /// SETofDEVICEEVENT; same encoding as SETofEVENT with 0xFFFFC0B0 zero.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SetOfDeviceEvent: u32 {
        const KEY_PRESS           = 1 << 0;
        const KEY_RELEASE         = 1 << 1;
        const BUTTON_PRESS        = 1 << 2;
        const BUTTON_RELEASE      = 1 << 3;
        const POINTER_MOTION      = 1 << 6;
        const BUTTON1_MOTION      = 1 << 8;
        const BUTTON2_MOTION      = 1 << 9;
        const BUTTON3_MOTION      = 1 << 10;
        const BUTTON4_MOTION      = 1 << 11;
        const BUTTON5_MOTION      = 1 << 12;
        const BUTTON_MOTION       = 1 << 13;
    }
}

bitflags! {
    /// SETofKEYBUTMASK; bits 13..=15 must be zero.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SetOfKeyButMask: u16 {
        const SHIFT   = 1 << 0;
        const LOCK    = 1 << 1;
        const CONTROL = 1 << 2;
        const MOD1    = 1 << 3;
        const MOD2    = 1 << 4;
        const MOD3    = 1 << 5;
        const MOD4    = 1 << 6;
        const MOD5    = 1 << 7;
        const BUTTON1 = 1 << 8;
        const BUTTON2 = 1 << 9;
        const BUTTON3 = 1 << 10;
        const BUTTON4 = 1 << 11;
        const BUTTON5 = 1 << 12;
    }
}

bitflags! {
    /// SETofKEYMASK; bits 8..=15 must be zero except the AnyModifier
    /// sentinel, which callers check before validating.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SetOfKeyMask: u16 {
        const SHIFT   = 1 << 0;
        const LOCK    = 1 << 1;
        const CONTROL = 1 << 2;
        const MOD1    = 1 << 3;
        const MOD2    = 1 << 4;
        const MOD3    = 1 << 5;
        const MOD4    = 1 << 6;
        const MOD5    = 1 << 7;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_order_latch() {
        assert_eq!(
            ByteOrder::from_initiation_byte(b'B'),
            Some(ByteOrder::BigEndian)
        );
        assert_eq!(
            ByteOrder::from_initiation_byte(b'l'),
            Some(ByteOrder::LittleEndian)
        );
        assert_eq!(ByteOrder::from_initiation_byte(b'x'), None);
    }

    #[test]
    fn test_reserved_bits_rejected() {
        assert!(SetOfEvent::from_bits(0xFE00_0000).is_none());
        assert!(SetOfEvent::from_bits(0x01FF_FFFF).is_some());
        assert!(SetOfPointerEvent::from_bits(0x0000_8003).is_none());
        assert!(SetOfKeyButMask::from_bits(0xE000).is_none());
        assert!(SetOfKeyMask::from_bits(0xFF00).is_none());
        assert!(SetOfKeyMask::from_bits(0x00FF).is_some());
    }
}
