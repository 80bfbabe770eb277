//! Unified error type for cardkey.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.

/// Error returned by the external collaborators (transport, display, store).
///
/// None of these cross the engine boundary: the device driver logs them
/// and carries on with default behaviour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // BLE
    /// No host is connected; the report was dropped.
    Disconnected,

    // Storage
    /// Flash read/write/erase failed.
    Storage,

    // Display
    /// I²C transaction to the display failed.
    Display,

    // Generic
    /// The report queue to the BLE task is full.
    BufferOverflow,
}
