//! [Server-sent events] decoding.
//!
//! [Server-sent events]: https://html.spec.whatwg.org/multipage/server-sent-events.html

use std::mem;

/// Single dispatched server-sent event.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Event {
    /// Name of this [`Event`] (`message` if not specified).
    pub(crate) name: String,

    /// Data of this [`Event`], with multiple `data:` lines joined by `\n`.
    pub(crate) data: String,
}

/// Incremental decoder of a server-sent events stream.
#[derive(Debug, Default)]
pub(crate) struct Decoder {
    /// Bytes of a line not terminated yet.
    buffer: Vec<u8>,

    /// Name of the [`Event`] being collected.
    name: Option<String>,

    /// `data:` lines of the [`Event`] being collected.
    data: Vec<String>,
}

impl Decoder {
    /// Feeds the provided chunk of bytes into this [`Decoder`], returning all
    /// the [`Event`]s completed by it.
    pub(crate) fn feed(&mut self, chunk: &[u8]) -> Vec<Event> {
        self.buffer.extend_from_slice(chunk);

        let mut events = vec![];
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(|c| c == '\n' || c == '\r');
            if let Some(ev) = self.line(line) {
                events.push(ev);
            }
        }
        events
    }

    /// Processes a single line, returning an [`Event`] if it's dispatched.
    fn line(&mut self, line: &str) -> Option<Event> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = line.split_once(':').map_or((line, ""), |(f, v)| {
            (f, v.strip_prefix(' ').unwrap_or(v))
        });
        match field {
            "event" => self.name = Some(value.to_owned()),
            "data" => self.data.push(value.to_owned()),
            _ => {}
        }
        None
    }

    /// Dispatches the collected [`Event`], if it has any data.
    fn dispatch(&mut self) -> Option<Event> {
        let name = self.name.take();
        if self.data.is_empty() {
            return None;
        }
        Some(Event {
            name: name.unwrap_or_else(|| "message".to_owned()),
            data: mem::take(&mut self.data).join("\n"),
        })
    }
}

#[cfg(test)]
mod spec {
    use super::{Decoder, Event};

    fn event(name: &str, data: &str) -> Event {
        Event {
            name: name.to_owned(),
            data: data.to_owned(),
        }
    }

    #[test]
    fn decodes_events_split_across_chunks() {
        let mut decoder = Decoder::default();

        assert!(decoder.feed(b"event: put\ndata: {\"path\":").is_empty());
        assert_eq!(
            decoder.feed(b"\"/\",\"data\":null}\n\nevent: keep-alive\n"),
            [event("put", r#"{"path":"/","data":null}"#)],
        );
        assert_eq!(
            decoder.feed(b"data: null\n\n"),
            [event("keep-alive", "null")],
        );
    }

    #[test]
    fn joins_multiline_data_and_strips_carriage_returns() {
        let mut decoder = Decoder::default();

        let events = decoder.feed(
            b": comment\r\nevent: patch\r\ndata: {\"path\":\"/a\",\r\n\
              data:\"data\":{\"q\":\"Q\"}}\r\n\r\n",
        );

        assert_eq!(
            events,
            [event("patch", "{\"path\":\"/a\",\n\"data\":{\"q\":\"Q\"}}")],
        );
    }

    #[test]
    fn skips_events_without_data() {
        let mut decoder = Decoder::default();

        let events = decoder.feed(b"event: cancel\n\ndata: x\n\n");

        assert_eq!(events, [event("message", "x")]);
    }
}
