use std::collections::VecDeque;

use bytes::Bytes;
use uuid::Uuid;

use hawkeye_core::upload::VideoHandle;

/// An uploaded video held in memory.
#[derive(Debug, Clone)]
pub struct StoredVideo {
    pub handle: VideoHandle,
    pub bytes: Bytes,
}

/// Bounded in-memory store of uploaded videos. Oldest uploads are evicted
/// first once `max_videos` is reached.
pub struct VideoStore {
    videos: VecDeque<StoredVideo>,
    max_videos: usize,
}

impl VideoStore {
    pub fn new(max_videos: usize) -> Self {
        Self {
            videos: VecDeque::new(),
            max_videos: max_videos.max(1),
        }
    }

    /// Insert a video, returning the handles of any evicted uploads.
    pub fn insert(&mut self, handle: VideoHandle, bytes: Bytes) -> Vec<VideoHandle> {
        self.videos.push_back(StoredVideo { handle, bytes });
        let mut evicted = Vec::new();
        while self.videos.len() > self.max_videos {
            if let Some(old) = self.videos.pop_front() {
                tracing::debug!(video_id = %old.handle.id, "Evicted stored video");
                evicted.push(old.handle);
            }
        }
        evicted
    }

    pub fn get(&self, id: Uuid) -> Option<&StoredVideo> {
        self.videos.iter().find(|v| v.handle.id == id)
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    /// Total bytes currently held.
    pub fn total_bytes(&self) -> usize {
        self.videos.iter().map(|v| v.bytes.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hawkeye_core::test_helpers::make_video;

    #[test]
    fn insert_and_get() {
        let mut store = VideoStore::new(4);
        let handle = make_video("a.mp4");
        let id = handle.id;
        assert!(store.insert(handle, Bytes::from_static(b"frames")).is_empty());

        let stored = store.get(id).unwrap();
        assert_eq!(stored.bytes.as_ref(), b"frames");
        assert_eq!(store.len(), 1);
        assert_eq!(store.total_bytes(), 6);
    }

    #[test]
    fn unknown_id_is_none() {
        let store = VideoStore::new(4);
        assert!(store.is_empty());
        assert!(store.get(Uuid::new_v4()).is_none());
    }

    #[test]
    fn evicts_oldest_at_capacity() {
        let mut store = VideoStore::new(2);
        let first = make_video("1.mp4");
        let first_id = first.id;
        store.insert(first, Bytes::from_static(b"1"));
        store.insert(make_video("2.mp4"), Bytes::from_static(b"2"));

        let evicted = store.insert(make_video("3.mp4"), Bytes::from_static(b"3"));
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].id, first_id);
        assert_eq!(store.len(), 2);
        assert!(store.get(first_id).is_none());
    }

    #[test]
    fn zero_capacity_keeps_latest() {
        let mut store = VideoStore::new(0);
        let handle = make_video("only.mp4");
        let id = handle.id;
        store.insert(handle, Bytes::from_static(b"x"));
        assert!(store.get(id).is_some());
    }
}
