//! Line-oriented hand source.
//!
//! One frame per line, whitespace-separated, one token per hand in
//! detection order:
//!
//! ```text
//! 3            # one hand, three fingers
//! 01110 2      # flags thumb..pinky, then a second hand with two fingers
//! R:3 L:0      # with handedness
//! -            # no hand in view
//! q            # quit
//! ```
//!
//! An empty line is also a frame without hands. Lines starting with `#`
//! are skipped and do not count as frames.

use handservo_common::consts::{MAX_FINGERS, MAX_HANDS};
use handservo_common::hand::{
    CaptureError, FrameObservation, Fingers, HandObservation, HandSource, Handedness,
};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Hand source reading text frames from any buffered reader.
pub struct LineSource<R: BufRead> {
    name: String,
    reader: R,
    line_no: usize,
    buf: String,
    frame_interval: Option<Duration>,
    last_frame: Option<Instant>,
}

impl<R: BufRead> LineSource<R> {
    /// Source over an arbitrary reader.
    pub fn new(name: impl Into<String>, reader: R) -> Self {
        Self {
            name: name.into(),
            reader,
            line_no: 0,
            buf: String::new(),
            frame_interval: None,
            last_frame: None,
        }
    }

    /// Deliver at most one frame per `interval`, like a camera would.
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = (!interval.is_zero()).then_some(interval);
        self
    }

    /// Lines consumed so far, comments included.
    pub fn line_number(&self) -> usize {
        self.line_no
    }

    fn pace(&mut self) {
        if let (Some(interval), Some(last)) = (self.frame_interval, self.last_frame) {
            let elapsed = last.elapsed();
            if elapsed < interval {
                thread::sleep(interval - elapsed);
            }
        }
        self.last_frame = Some(Instant::now());
    }
}

impl LineSource<BufReader<File>> {
    /// Replay a recorded session file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CaptureError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        info!("Replaying hand frames from {}", path.display());
        Ok(Self::new(path.display().to_string(), BufReader::new(file)))
    }
}

impl LineSource<BufReader<io::Stdin>> {
    /// Read frames from standard input.
    pub fn stdin() -> Self {
        Self::new("stdin", BufReader::new(io::stdin()))
    }
}

impl<R: BufRead> HandSource for LineSource<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn next_frame(&mut self) -> Result<Option<FrameObservation>, CaptureError> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                debug!("{}: end of input after {} lines", self.name, self.line_no);
                return Ok(None);
            }
            self.line_no += 1;

            let line = self.buf.trim();
            if line.starts_with('#') {
                continue;
            }
            if line.eq_ignore_ascii_case("q") {
                info!("{}: quit requested at line {}", self.name, self.line_no);
                return Ok(None);
            }

            let frame = parse_frame(line).map_err(|reason| CaptureError::Malformed {
                line: self.line_no,
                reason,
            })?;
            self.pace();
            return Ok(Some(frame));
        }
    }
}

/// Parse one frame line (already trimmed, not a comment or quit).
pub fn parse_frame(line: &str) -> Result<FrameObservation, String> {
    let mut frame = FrameObservation::empty();
    if line.is_empty() || line == "-" {
        return Ok(frame);
    }

    for token in line.split_whitespace() {
        let hand = parse_hand(token)?;
        frame
            .push(hand)
            .map_err(|_| format!("more than {MAX_HANDS} hands"))?;
    }
    Ok(frame)
}

fn parse_hand(token: &str) -> Result<HandObservation, String> {
    let (handedness, body) = match token.split_once(':') {
        Some(("L" | "l", rest)) => (Some(Handedness::Left), rest),
        Some(("R" | "r", rest)) => (Some(Handedness::Right), rest),
        Some((prefix, _)) => return Err(format!("unknown hand prefix '{prefix}'")),
        None => (None, token),
    };

    let fingers = match body.len() {
        1 => {
            let count = body
                .parse::<u8>()
                .map_err(|_| format!("invalid finger count '{body}'"))?;
            if count > MAX_FINGERS {
                return Err(format!("finger count {count} exceeds {MAX_FINGERS}"));
            }
            Fingers::from_count(count)
        }
        5 => {
            let mut flags = [false; 5];
            for (flag, c) in flags.iter_mut().zip(body.chars()) {
                *flag = match c {
                    '1' => true,
                    '0' => false,
                    _ => return Err(format!("invalid finger flags '{body}'")),
                };
            }
            Fingers::from_up_flags(flags)
        }
        _ => return Err(format!("unrecognized hand token '{token}'")),
    };

    Ok(HandObservation {
        fingers,
        handedness,
    })
}
