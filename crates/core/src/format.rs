use crate::types::Transcript;

/// Format seconds as MM:SS timestamp
pub fn format_timestamp(seconds: f64) -> String {
    let mins = (seconds / 60.0) as u32;
    let secs = (seconds % 60.0) as u32;
    format!("{:02}:{:02}", mins, secs)
}

/// Format transcript segments with timestamps
pub fn format_transcript_with_timestamps(transcript: &Transcript) -> String {
    transcript
        .segments
        .iter()
        .map(|seg| format!("[{}] {}", format_timestamp(seg.start), seg.text.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Plain transcript text with whitespace runs collapsed.
pub fn format_transcript_plain(transcript: &Transcript) -> String {
    transcript.text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn format_duration_minutes(seconds: f64) -> String {
    format!("{:.1} min", seconds / 60.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Segment;

    fn transcript() -> Transcript {
        Transcript {
            text: "  Hello   there.\n General Kenobi. ".into(),
            segments: vec![
                Segment {
                    start: 0.0,
                    end: 2.5,
                    text: " Hello there.".into(),
                },
                Segment {
                    start: 65.2,
                    end: 67.0,
                    text: "General Kenobi. ".into(),
                },
            ],
            language: "en".into(),
        }
    }

    #[test]
    fn timestamps_are_minutes_and_seconds() {
        assert_eq!(format_timestamp(0.0), "00:00");
        assert_eq!(format_timestamp(65.9), "01:05");
        assert_eq!(format_timestamp(3600.0), "60:00");
    }

    #[test]
    fn segments_are_prefixed_with_timestamps() {
        assert_eq!(
            format_transcript_with_timestamps(&transcript()),
            "[00:00] Hello there.\n[01:05] General Kenobi."
        );
    }

    #[test]
    fn plain_text_collapses_whitespace() {
        assert_eq!(
            format_transcript_plain(&transcript()),
            "Hello there. General Kenobi."
        );
        assert_eq!(transcript().duration_seconds(), 67.0);
    }
}
