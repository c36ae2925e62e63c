//! Device list to room readings.

use remo_types::{Device, RoomData};

/// Convert raw devices into one [`RoomData`] per device, preserving order.
///
/// Each reading is taken from the matching event if the device reported one
/// and left as `None` otherwise, so "no sensor" stays distinguishable from a
/// reading of zero. `last_updated` is the first present timestamp among the
/// temperature, humidity and illumination events, then the device's own
/// `updated_at`.
pub fn normalize(devices: &[Device]) -> Vec<RoomData> {
    devices.iter().map(RoomData::from).collect()
}
