/// How far a download has come when its total size is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    /// `floor(downloaded * 100 / total)`, never above 100.
    pub percent: u8,
    pub downloaded: u64,
    pub total: u64,
}

/// Counts written bytes and turns them into [ProgressEvent]s.
///
/// With an unknown (or zero) total it still counts, but never reports a percentage.
#[derive(Debug)]
pub struct ProgressTracker {
    total: Option<u64>,
    downloaded: u64,
    last_percent: u8,
    estimated: bool,
}

impl ProgressTracker {
    /// `total` is the exact size announced by the server.
    pub fn new(total: Option<u64>) -> Self {
        Self {
            total: total.filter(|total| *total > 0),
            downloaded: 0,
            last_percent: 0,
            estimated: false,
        }
    }

    /// `total` is a guess. Progress stops at 99 until [ProgressTracker::finish].
    pub fn estimated(total: Option<u64>) -> Self {
        Self {
            estimated: true,
            ..Self::new(total)
        }
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn downloaded(&self) -> u64 {
        self.downloaded
    }

    /// Record `bytes` more written bytes.
    pub fn advance(&mut self, bytes: u64) -> Option<ProgressEvent> {
        self.downloaded += bytes;
        let total = self.total?;

        let mut percent = (self.downloaded.min(total) as u128 * 100 / total as u128) as u8;
        if self.estimated {
            percent = percent.min(99);
        }
        // Servers that send more than they announced must not make us go backwards.
        self.last_percent = self.last_percent.max(percent);

        Some(ProgressEvent {
            percent: self.last_percent,
            downloaded: self.downloaded,
            total,
        })
    }

    /// Called once the stream has ended. For an estimated total this reports
    /// 100 against the real size; an exact total already reached 100.
    pub fn finish(&mut self) -> Option<ProgressEvent> {
        if !self.estimated || self.total.is_none() {
            return None;
        }
        self.total = Some(self.downloaded);
        self.last_percent = 100;
        Some(ProgressEvent {
            percent: 100,
            downloaded: self.downloaded,
            total: self.downloaded,
        })
    }
}
