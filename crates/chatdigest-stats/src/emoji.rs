//! Emoji classification by content kind

use chatdigest_domain::{ContentSegment, EmojiStatistics};

/// Caption marker of an image that is really a sticker
const STICKER_MARKER: &str = "表情";

/// Count one segment into `stats` if it is an emoji of any kind
///
/// Returns whether the segment was counted.
///
/// # Examples
///
/// ```
/// use chatdigest_domain::{ContentSegment, EmojiStatistics};
/// use chatdigest_stats::classify_segment;
///
/// let mut stats = EmojiStatistics::default();
/// assert!(classify_segment(&ContentSegment::Face { id: "178".into() }, &mut stats));
/// assert!(!classify_segment(&ContentSegment::text("hi"), &mut stats));
/// assert_eq!(stats.face_details.get("face_178"), Some(&1));
/// ```
pub fn classify_segment(segment: &ContentSegment, stats: &mut EmojiStatistics) -> bool {
    match segment {
        ContentSegment::Face { id } => {
            stats.face_count += 1;
            stats.record_detail(format!("face_{}", id));
        }
        ContentSegment::MarketFace { emoji_id } => {
            stats.mface_count += 1;
            stats.record_detail(format!("mface_{}", emoji_id));
        }
        ContentSegment::BigFace { id } => {
            stats.bface_count += 1;
            stats.record_detail(format!("bface_{}", id));
        }
        ContentSegment::SmallFace { id } => {
            stats.sface_count += 1;
            stats.record_detail(format!("sface_{}", id));
        }
        ContentSegment::Image { file, summary } if summary.contains(STICKER_MARKER) => {
            stats.mface_count += 1;
            stats.record_detail(format!("animated_{}", file));
        }
        ContentSegment::Media { descriptor, .. } if descriptor.to_lowercase().contains("emoji") => {
            stats.other_emoji_count += 1;
        }
        _ => return false,
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatdigest_domain::MediaKind;

    #[test]
    fn test_each_category() {
        let mut stats = EmojiStatistics::default();
        let segments = vec![
            ContentSegment::Face { id: "1".into() },
            ContentSegment::MarketFace { emoji_id: "m".into() },
            ContentSegment::BigFace { id: "b".into() },
            ContentSegment::SmallFace { id: "s".into() },
            ContentSegment::Image {
                file: "a.gif".into(),
                summary: "[动画表情]".into(),
            },
            ContentSegment::Media {
                kind: MediaKind::Video,
                descriptor: r#"{"file":"EMOJI_clip.mp4"}"#.into(),
            },
        ];
        for segment in &segments {
            assert!(classify_segment(segment, &mut stats));
        }

        assert_eq!(stats.face_count, 1);
        assert_eq!(stats.mface_count, 2);
        assert_eq!(stats.bface_count, 1);
        assert_eq!(stats.sface_count, 1);
        assert_eq!(stats.other_emoji_count, 1);
        assert_eq!(stats.total(), 6);
        assert_eq!(stats.face_details.get("animated_a.gif"), Some(&1));
        assert_eq!(stats.face_details.get("mface_m"), Some(&1));
        assert_eq!(stats.face_details.len(), 5);
    }

    #[test]
    fn test_plain_images_and_media_are_ignored() {
        let mut stats = EmojiStatistics::default();
        assert!(!classify_segment(
            &ContentSegment::Image {
                file: "photo.jpg".into(),
                summary: "".into()
            },
            &mut stats
        ));
        assert!(!classify_segment(
            &ContentSegment::Media {
                kind: MediaKind::Record,
                descriptor: r#"{"file":"voice.amr"}"#.into()
            },
            &mut stats
        ));
        assert_eq!(stats.total(), 0);
    }
}
