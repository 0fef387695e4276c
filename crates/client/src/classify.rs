//! Tolerant lookups on raw response bytes.
//!
//! These run before any schema decoding, so they never fail: a missing key,
//! a value of the wrong type, or a document that breaks off halfway all
//! produce an empty string. Keys are matched on the top-level object in
//! document order and scanning stops at the first syntax error, so a
//! truncated body still yields a key that appears before the damage.

/// The `resourceType` discriminant of a JSON document, or `""`
pub fn resource_type(body: &[u8]) -> String {
    string_at(body, &["resourceType"])
}

/// The string found by following `path` through nested objects, or `""`
pub fn string_at(body: &[u8], path: &[&str]) -> String {
    Scanner { bytes: body, pos: 0 }
        .find(path)
        .unwrap_or_default()
}

struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Scanner<'_> {
    fn find(&mut self, path: &[&str]) -> Option<String> {
        let (key, rest) = path.split_first()?;

        self.skip_whitespace();
        self.expect(b'{')?;
        loop {
            self.skip_whitespace();
            if self.peek()? == b'}' {
                return None;
            }

            let name = self.string()?;
            self.skip_whitespace();
            self.expect(b':')?;
            self.skip_whitespace();

            if name == *key {
                return if rest.is_empty() {
                    self.string()
                } else {
                    self.find(rest)
                };
            }

            self.skip_value()?;
            self.skip_whitespace();
            if self.next()? != b',' {
                return None;
            }
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    fn expect(&mut self, byte: u8) -> Option<()> {
        (self.next()? == byte).then_some(())
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Decoded JSON string at the cursor
    fn string(&mut self) -> Option<String> {
        let start = self.pos;
        self.skip_string()?;
        serde_json::from_slice(&self.bytes[start..self.pos]).ok()
    }

    fn skip_string(&mut self) -> Option<()> {
        self.expect(b'"')?;
        loop {
            match self.next()? {
                b'\\' => {
                    self.next()?;
                }
                b'"' => return Some(()),
                _ => {}
            }
        }
    }

    fn skip_value(&mut self) -> Option<()> {
        match self.peek()? {
            b'"' => self.skip_string(),
            b'{' | b'[' => {
                let mut depth = 0usize;
                loop {
                    match self.peek()? {
                        b'"' => {
                            self.skip_string()?;
                            continue;
                        }
                        b'{' | b'[' => depth += 1,
                        b'}' | b']' => {
                            depth -= 1;
                            if depth == 0 {
                                self.pos += 1;
                                return Some(());
                            }
                        }
                        _ => {}
                    }
                    self.pos += 1;
                }
            }
            _ => {
                // number, true, false, null
                while self
                    .peek()
                    .is_some_and(|b| !matches!(b, b',' | b'}' | b']') && !b.is_ascii_whitespace())
                {
                    self.pos += 1;
                }
                Some(())
            }
        }
    }
}
