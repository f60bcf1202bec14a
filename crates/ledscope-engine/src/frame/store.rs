use std::collections::BTreeMap;

use serde::Serialize;

use crate::screen_map::StripId;

use super::{FrameBuffer, StripFrame};

/// Entry of [`StripFrameStore::info_json`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StripInfo {
    pub strip_id: StripId,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// Latest pixel bytes per strip, as last pushed by the device stream.
#[derive(Debug, Default)]
pub struct StripFrameStore {
    strips: BTreeMap<StripId, Vec<u8>>,
}

impl StripFrameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the pixel bytes of `strip_id`, reusing the previous allocation.
    pub fn update(&mut self, strip_id: StripId, pixel_data: &[u8]) {
        let slot = self.strips.entry(strip_id).or_default();
        slot.clear();
        slot.extend_from_slice(pixel_data);
    }

    pub fn pixel_data(&self, strip_id: StripId) -> Option<&[u8]> {
        self.strips.get(&strip_id).map(Vec::as_slice)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strips.is_empty()
    }

    /// Snapshot of every strip in ascending id order.
    pub fn frame(&self) -> FrameBuffer {
        self.strips
            .iter()
            .map(|(id, data)| StripFrame::new(*id, data.clone()))
            .collect()
    }

    pub fn info(&self) -> Vec<StripInfo> {
        self.strips
            .keys()
            .map(|&strip_id| StripInfo { strip_id, kind: "r8g8b8" })
            .collect()
    }

    /// Strip listing as JSON: `[{"strip_id": 0, "type": "r8g8b8"}, ...]`.
    pub fn info_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.info())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_replaces_previous_bytes() {
        let mut store = StripFrameStore::new();
        store.update(1, &[1, 2, 3, 4, 5, 6]);
        store.update(1, &[9, 9, 9]);
        assert_eq!(store.pixel_data(1), Some(&[9u8, 9, 9][..]));
        assert!(store.pixel_data(2).is_none());
    }

    #[test]
    fn frame_is_ordered_by_strip_id() {
        let mut store = StripFrameStore::new();
        store.update(4, &[0, 0, 1]);
        store.update(-1, &[0, 1, 0]);
        let ids: Vec<_> = store.frame().strips().iter().map(|s| s.strip_id).collect();
        assert_eq!(ids, vec![-1, 4]);
    }

    #[test]
    fn info_json_lists_strips() {
        let mut store = StripFrameStore::new();
        store.update(0, &[]);
        store.update(2, &[]);
        assert_eq!(
            store.info_json().unwrap(),
            r#"[{"strip_id":0,"type":"r8g8b8"},{"strip_id":2,"type":"r8g8b8"}]"#
        );
    }
}
