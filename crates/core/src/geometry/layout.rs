//! Address-mapping schemes and the resulting bit layout.
//!
//! A scheme is written as six two-letter tokens, most-significant field first,
//! e.g. `chrobabgraco`. The layout assigns each field a contiguous bit range
//! above the request offset; the address translator applies it.

use std::fmt;

use serde::Serialize;

use super::{AddressWidths, Geometry};
use crate::common::{ceil_log2, pow2};

/// One of the six address fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressField {
    /// Channel select.
    Channel,
    /// Rank select.
    Rank,
    /// Bankgroup select.
    Bankgroup,
    /// Bank select within a bankgroup.
    Bank,
    /// Row address.
    Row,
    /// Column address.
    Column,
}

impl AddressField {
    /// All fields in canonical order.
    pub const ALL: [Self; 6] = [
        Self::Channel,
        Self::Rank,
        Self::Bankgroup,
        Self::Bank,
        Self::Row,
        Self::Column,
    ];

    /// Two-letter token used in mapping strings.
    pub const fn token(self) -> &'static str {
        match self {
            Self::Channel => "ch",
            Self::Rank => "ra",
            Self::Bankgroup => "bg",
            Self::Bank => "ba",
            Self::Row => "ro",
            Self::Column => "co",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.token() == token)
    }
}

/// Ordering of the six fields, most-significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AddressScheme {
    order: [AddressField; 6],
}

impl AddressScheme {
    /// Default scheme: channel on top, column at the bottom.
    pub const DEFAULT: &'static str = "chrobabgraco";

    /// Row-buffer-locality oriented: consecutive requests stay in one row.
    pub const OPEN_PAGE: &'static str = "rorabgbachco";

    /// Parallelism oriented: consecutive requests spread over channels and banks.
    pub const CLOSE_PAGE: &'static str = "rocorabgbach";

    /// Parses a token string or one of the named presets `open_page`/`close_page`.
    ///
    /// Returns `None` unless every field appears exactly once.
    ///
    /// # Examples
    ///
    /// ```
    /// use dramcfg_core::geometry::{AddressField, AddressScheme};
    ///
    /// let s = AddressScheme::parse("rochrababgco").unwrap();
    /// assert_eq!(s.order()[0], AddressField::Row);
    /// assert!(AddressScheme::parse("chchrobabgco").is_none());
    /// ```
    pub fn parse(text: &str) -> Option<Self> {
        let tokens = match text {
            "open_page" => Self::OPEN_PAGE,
            "close_page" => Self::CLOSE_PAGE,
            other => other,
        };
        if tokens.len() != 12 || !tokens.is_ascii() {
            return None;
        }

        let mut order = [AddressField::Channel; 6];
        for (i, slot) in order.iter_mut().enumerate() {
            *slot = AddressField::from_token(&tokens[2 * i..2 * i + 2])?;
        }
        let all_distinct = AddressField::ALL
            .iter()
            .all(|f| order.iter().filter(|&o| o == f).count() == 1);
        all_distinct.then_some(Self { order })
    }

    /// Fields, most-significant first.
    pub fn order(&self) -> &[AddressField; 6] {
        &self.order
    }
}

impl Default for AddressScheme {
    fn default() -> Self {
        Self {
            order: [
                AddressField::Channel,
                AddressField::Row,
                AddressField::Bank,
                AddressField::Bankgroup,
                AddressField::Rank,
                AddressField::Column,
            ],
        }
    }
}

impl fmt::Display for AddressScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.order.iter().try_for_each(|field| f.write_str(field.token()))
    }
}

/// Bit range of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSlot {
    /// Field occupying the range.
    pub field: AddressField,
    /// Number of bits.
    pub width: u32,
    /// Lowest bit, counted after the request offset has been shifted out.
    pub position: u32,
    /// `width` low ones.
    pub mask: u64,
}

/// Ordered partition of a physical address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressLayout {
    /// Bits addressing bytes within one request.
    pub shift_bits: u32,
    /// Fields, most-significant first.
    pub slots: Vec<FieldSlot>,
}

impl AddressLayout {
    /// Builds the layout for `scheme`.
    ///
    /// The low `log2(BL)` column bits select beats inside one burst and are
    /// folded into the request offset, so the column slot is narrower than the
    /// device column width by that amount.
    pub fn new(scheme: &AddressScheme, geometry: &Geometry, widths: &AddressWidths) -> Self {
        let burst_bits = ceil_log2(geometry.burst_length);
        let shift_bits = ceil_log2(geometry.request_size_bytes());

        let width_of = |field: AddressField| match field {
            AddressField::Column => widths.column.saturating_sub(burst_bits),
            other => widths.get(other),
        };

        let mut position = 0;
        let mut slots: Vec<FieldSlot> = scheme
            .order()
            .iter()
            .rev()
            .map(|&field| {
                let width = width_of(field);
                let slot = FieldSlot {
                    field,
                    width,
                    position,
                    mask: u64::try_from(pow2(width) - 1).unwrap_or(u64::MAX),
                };
                position += width;
                slot
            })
            .collect();
        slots.reverse();

        Self { shift_bits, slots }
    }

    /// Sum of the slot widths.
    pub fn field_bits(&self) -> u32 {
        self.slots.iter().map(|s| s.width).sum()
    }

    /// Slot of one field.
    pub fn slot(&self, field: AddressField) -> Option<&FieldSlot> {
        self.slots.iter().find(|s| s.field == field)
    }

    /// Bytes addressable through the layout, over all channels.
    pub fn addressable_bytes(&self) -> u128 {
        pow2(self.field_bits() + self.shift_bits)
    }
}
