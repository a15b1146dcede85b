/// Builder for fixed-column object program text.
#[derive(Default)]
pub struct ObjectBuilder {
    lines: Vec<String>,
}

impl ObjectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: &str, address: u32, length: u32) -> Self {
        self.lines
            .push(format!("H{name:<6}{address:06X}{length:06X}"));
        self
    }

    pub fn define(mut self, symbols: &[(&str, u32)]) -> Self {
        let body: String = symbols
            .iter()
            .map(|(name, address)| format!("{name:<6}{address:06X}"))
            .collect();
        self.lines.push(format!("D{body}"));
        self
    }

    pub fn refer(mut self, symbols: &[&str]) -> Self {
        let body: String = symbols.iter().map(|name| format!("{name:<6}")).collect();
        self.lines.push(format!("R{body}"));
        self
    }

    pub fn text(mut self, address: u32, bytes: &[u8]) -> Self {
        let hex: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
        self.lines
            .push(format!("T{address:06X}{:02X}{hex}", bytes.len()));
        self
    }

    pub fn modify(mut self, address: u32, half_bytes: u8, op: char, symbol: &str) -> Self {
        self.lines
            .push(format!("M{address:06X}{half_bytes:02X}{op}{symbol}"));
        self
    }

    pub fn end(mut self, entry: Option<u32>) -> Self {
        self.lines.push(match entry {
            Some(address) => format!("E{address:06X}"),
            None => "E".to_owned(),
        });
        self
    }

    /// Appends a raw line.
    pub fn line(mut self, raw: &str) -> Self {
        self.lines.push(raw.to_owned());
        self
    }

    pub fn build(self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}
