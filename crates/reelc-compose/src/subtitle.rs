//! Greedy subtitle wrapping and on-canvas placement.

use tracing::debug;

use reelc_media::TextMeasurer;
use reelc_models::aspect::Canvas;
use reelc_models::modes::SubtitlePosition;
use reelc_models::subtitle::{SubtitleBlock, SubtitleCue};

/// Fraction of the canvas width available to a subtitle line.
pub const LINE_WIDTH_RATIO: f64 = 0.9;

/// Margin, in canvas pixels, enforced when clamping custom placement.
pub const POSITION_MARGIN: f64 = 10.0;

/// Wrap a phrase to `max_width`, word-first.
///
/// Words accumulate into a line until the next word would overflow, which
/// closes the line. When a single word alone exceeds the budget there is
/// no space to break on, so the whole phrase falls back to a
/// character-by-character wrap with the same accumulate-and-close rule
/// (the overflowing character stays on the line it closed).
pub fn wrap_text(text: &str, max_width: f64, measurer: &dyn TextMeasurer) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    if measurer.text_width(text) <= max_width {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut overlong_word = false;

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if measurer.text_width(&candidate) <= max_width {
            current = candidate;
        } else if current.is_empty() {
            // a lone word already overflows the budget
            overlong_word = true;
            break;
        } else {
            lines.push(std::mem::take(&mut current));
            if measurer.text_width(word) > max_width {
                overlong_word = true;
                break;
            }
            current = word.to_string();
        }
    }

    if !overlong_word {
        if !current.is_empty() {
            lines.push(current);
        }
        return lines;
    }

    // character fallback over the whole phrase
    let mut lines = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        current.push(ch);
        if measurer.text_width(&current) > max_width {
            lines.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Vertical offset of a block's top edge.
///
/// Custom placement distributes the free space by percentage and then
/// clamps so the block stays on-canvas with [`POSITION_MARGIN`] to spare.
pub fn vertical_offset(
    position: SubtitlePosition,
    custom_percent: f64,
    block_height: f64,
    canvas_height: f64,
) -> f64 {
    match position {
        SubtitlePosition::Bottom => 0.95 * canvas_height - block_height,
        SubtitlePosition::Top => 0.05 * canvas_height,
        SubtitlePosition::Center => (canvas_height - block_height) / 2.0,
        SubtitlePosition::Custom => {
            let min_y = POSITION_MARGIN;
            let max_y = canvas_height - block_height - POSITION_MARGIN;
            let y = (canvas_height - block_height) * (custom_percent / 100.0);
            // min bound wins when the block is taller than the free space
            y.min(max_y).max(min_y)
        }
    }
}

/// Lay out every cue against the canvas.
///
/// Cues starting at or after the video end are dropped and end times are
/// clamped to it, so overlays never outlive the picture.
pub fn layout_cues(
    cues: &[SubtitleCue],
    canvas: Canvas,
    position: SubtitlePosition,
    custom_percent: f64,
    video_duration: f64,
    measurer: &dyn TextMeasurer,
) -> Vec<SubtitleBlock> {
    let max_width = canvas.width as f64 * LINE_WIDTH_RATIO;
    let canvas_height = canvas.height as f64;

    let blocks: Vec<SubtitleBlock> = cues
        .iter()
        .filter_map(|cue| {
            let start = cue.start.max(0.0);
            if start >= video_duration {
                return None;
            }
            let end = cue.end.min(video_duration);
            if end <= start {
                return None;
            }

            let lines = wrap_text(&cue.text, max_width, measurer);
            if lines.is_empty() {
                return None;
            }

            let height = lines.len() as f64 * measurer.line_height();
            let y = vertical_offset(position, custom_percent, height, canvas_height);
            Some(SubtitleBlock {
                lines,
                height,
                y,
                start,
                end,
            })
        })
        .collect();

    debug!(cues = cues.len(), blocks = blocks.len(), "subtitles laid out");
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every character is `char_width` wide; deterministic wrap tests.
    struct FixedWidth {
        char_width: f64,
        line_height: f64,
    }

    impl TextMeasurer for FixedWidth {
        fn text_width(&self, text: &str) -> f64 {
            text.chars().count() as f64 * self.char_width
        }

        fn line_height(&self) -> f64 {
            self.line_height
        }
    }

    fn measurer() -> FixedWidth {
        FixedWidth {
            char_width: 10.0,
            line_height: 70.0,
        }
    }

    #[test]
    fn test_short_phrase_stays_single_line() {
        let lines = wrap_text("hello", 200.0, &measurer());
        assert_eq!(lines, vec!["hello"]);
    }

    #[test]
    fn test_three_words_per_line() {
        // "the quick brown" is 15 chars = 150; adding " fox" overflows 150
        let lines = wrap_text("the quick brown fox jumps", 150.0, &measurer());
        assert_eq!(lines, vec!["the quick brown", "fox jumps"]);
    }

    #[test]
    fn test_wrapped_lines_respect_budget() {
        let text = "pack my box with five dozen liquor jugs and then some more";
        let m = measurer();
        for max_width in [80.0, 120.0, 200.0, 330.0] {
            for line in wrap_text(text, max_width, &m) {
                assert!(
                    m.text_width(&line) <= max_width,
                    "line '{line}' exceeds {max_width}"
                );
            }
        }
    }

    #[test]
    fn test_unbreakable_word_falls_back_to_chars() {
        let lines = wrap_text("abcdefghijklmnop", 50.0, &measurer());
        // closed lines carry the overflowing char: 6 chars each
        assert_eq!(lines, vec!["abcdef", "ghijkl", "mnop"]);
        // bounded by the char-wrap rule: one character past the budget
        let m = measurer();
        for line in &lines {
            assert!(m.text_width(line) <= 50.0 + m.char_width);
        }
    }

    #[test]
    fn test_overlong_word_mid_phrase_rewraps_whole_phrase() {
        // second word alone exceeds the budget
        let lines = wrap_text("ok incomprehensibilities", 100.0, &measurer());
        assert!(lines.len() > 1);
        // character fallback runs over the entire phrase
        assert!(lines[0].starts_with("ok"));
    }

    #[test]
    fn test_empty_text_yields_no_lines() {
        assert!(wrap_text("   ", 100.0, &measurer()).is_empty());
    }

    #[test]
    fn test_vertical_offset_fixed_positions() {
        let h = 140.0;
        let canvas_h = 1920.0;
        assert!((vertical_offset(SubtitlePosition::Bottom, 0.0, h, canvas_h)
            - (0.95 * 1920.0 - 140.0))
            .abs()
            < 1e-9);
        assert!((vertical_offset(SubtitlePosition::Top, 0.0, h, canvas_h) - 96.0).abs() < 1e-9);
        assert!(
            (vertical_offset(SubtitlePosition::Center, 0.0, h, canvas_h) - 890.0).abs() < 1e-9
        );
    }

    #[test]
    fn test_custom_offset_always_clamped_on_canvas() {
        let h = 140.0;
        let canvas_h = 1920.0;
        for percent in 0..=100 {
            let y = vertical_offset(SubtitlePosition::Custom, percent as f64, h, canvas_h);
            assert!(y >= POSITION_MARGIN);
            assert!(y <= canvas_h - h - POSITION_MARGIN);
        }
    }

    #[test]
    fn test_custom_offset_oversized_block_pins_to_margin() {
        // block taller than the canvas: min bound wins, no panic
        let y = vertical_offset(SubtitlePosition::Custom, 50.0, 2000.0, 1920.0);
        assert!((y - POSITION_MARGIN).abs() < 1e-9);
    }

    #[test]
    fn test_layout_windows_cues_to_video() {
        let cues = vec![
            SubtitleCue {
                index: 1,
                start: 0.0,
                end: 2.0,
                text: "first".into(),
            },
            SubtitleCue {
                index: 2,
                start: 9.0,
                end: 14.0,
                text: "clipped".into(),
            },
            SubtitleCue {
                index: 3,
                start: 12.0,
                end: 15.0,
                text: "dropped".into(),
            },
        ];
        let blocks = layout_cues(
            &cues,
            Canvas::new(1080, 1920),
            SubtitlePosition::Bottom,
            70.0,
            12.0,
            &measurer(),
        );
        assert_eq!(blocks.len(), 2);
        assert!((blocks[1].end - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_layout_block_height_scales_with_lines() {
        let cues = vec![SubtitleCue {
            index: 1,
            start: 0.0,
            end: 3.0,
            text: "the quick brown fox jumps".into(),
        }];
        // canvas width 170 -> budget 153 -> two lines of three/two words
        let blocks = layout_cues(
            &cues,
            Canvas::new(170, 1920),
            SubtitlePosition::Bottom,
            70.0,
            3.0,
            &measurer(),
        );
        assert_eq!(blocks[0].lines.len(), 2);
        assert!((blocks[0].height - 140.0).abs() < 1e-9);
        assert!((blocks[0].y - (0.95 * 1920.0 - 140.0)).abs() < 1e-9);
    }
}
