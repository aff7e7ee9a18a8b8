use indicatif::{ProgressBar, ProgressStyle};

const PB_STYLE: &str =
    "{msg}: {percent:>3}% {wide_bar:.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

const PB_CHARS: &str = "█▓▒░  ";

/// 單一檔案的下載進度。總大小未知或為 0 時不顯示。
pub struct DownloadProgress {
    pb: ProgressBar,
    reporting: bool,
}

impl DownloadProgress {
    pub fn new(label: &str, total: Option<u64>) -> Self {
        let reporting = matches!(total, Some(len) if len > 0);
        let pb = match total {
            Some(len) if len > 0 => {
                let pb = ProgressBar::new(len);
                let style = ProgressStyle::with_template(PB_STYLE)
                    .map(|s| s.progress_chars(PB_CHARS))
                    .unwrap_or_else(|_| ProgressStyle::default_bar());
                pb.set_style(style);
                pb.set_message(label.to_string());
                pb
            }
            _ => ProgressBar::hidden(),
        };
        Self { pb, reporting }
    }

    /// 是否有回報進度（總大小已知且非 0）
    pub fn is_reporting(&self) -> bool {
        self.reporting
    }

    pub fn step(&self, bytes: u64) {
        self.pb.inc(bytes);
    }

    pub fn position(&self) -> u64 {
        self.pb.position()
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }

    pub fn abandon(&self) {
        self.pb.abandon();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_or_zero_length_is_hidden() {
        assert!(!DownloadProgress::new("a.tgz", None).is_reporting());
        let zero = DownloadProgress::new("a.tgz", Some(0));
        assert!(!zero.is_reporting());
        zero.step(10);
        zero.finish();
    }

    #[test]
    fn test_progress_counts_bytes() {
        let progress = DownloadProgress::new("a.tgz", Some(100));
        assert!(progress.is_reporting());
        progress.step(40);
        progress.step(60);
        assert_eq!(progress.position(), 100);
        progress.finish();
    }
}
