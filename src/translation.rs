use serde_json::json;
use std::io::{self, Write};

use crate::selection::TranslationConsumer;

pub const TRANSLATE_EVENT: &str = "text-selection-translate";

/// Emits one JSON line per translate request, for whatever front end reads
/// this process's output.
pub struct StdoutTranslationConsumer<W: Write + Send = io::Stdout> {
    out: W,
}

impl StdoutTranslationConsumer {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write + Send> StdoutTranslationConsumer<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> TranslationConsumer for StdoutTranslationConsumer<W> {
    fn deliver(&mut self, text: &str) {
        let line = json!({
            "event": TRANSLATE_EVENT,
            "text": text,
        });

        let written = writeln!(self.out, "{}", line).and_then(|_| self.out.flush());
        if let Err(e) = written {
            log::warn!("Failed to emit translate request: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deliver_writes_one_json_line() {
        let mut consumer = StdoutTranslationConsumer::with_writer(Vec::new());
        consumer.deliver("héllo \"world\"");
        consumer.deliver("second");

        let output = String::from_utf8(consumer.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["event"], TRANSLATE_EVENT);
        assert_eq!(first["text"], "héllo \"world\"");
    }
}
