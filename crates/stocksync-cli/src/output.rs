//! Output formatting for human and JSON modes

use stocksync_core::domain::{Branch, Entity, Product, Sale, User};

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    pub fn is_json(&self) -> bool {
        matches!(self, OutputFormat::Json)
    }
}

/// Trait for formatting CLI output
pub trait OutputFormatter {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
    fn info(&self, message: &str);
    fn print_json(&self, value: &serde_json::Value);
}

/// Human-readable output formatter with checkmarks and indentation
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn success(&self, message: &str) {
        println!("\u{2713} {}", message);
    }
    fn error(&self, message: &str) {
        eprintln!("\u{2717} Error: {}", message);
    }
    fn warn(&self, message: &str) {
        eprintln!("\u{26a0} Warning: {}", message);
    }
    fn info(&self, message: &str) {
        println!("  {}", message);
    }
    fn print_json(&self, _value: &serde_json::Value) {
        // Human formatter doesn't print JSON
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn success(&self, message: &str) {
        println!(
            "{}",
            serde_json::json!({"success": true, "message": message})
        );
    }
    fn error(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"success": false, "error": message})
        );
    }
    fn warn(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"level": "warning", "message": message})
        );
    }
    fn info(&self, _message: &str) {}
    fn print_json(&self, value: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_default()
        );
    }
}

pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(HumanFormatter)
    }
}

/// `""` or `"s"`
pub fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

// ============================================================================
// Record display
// ============================================================================

/// One-line human description of a record
pub trait RecordLine: Entity {
    fn details(&self) -> String;

    fn line(&self) -> String {
        let marker = if self.is_local() { "local " } else { "" };
        format!(
            "{:<32} {}{}",
            self.id().as_str(),
            marker,
            self.details()
        )
    }
}

impl RecordLine for Branch {
    fn details(&self) -> String {
        match &self.fields().address {
            Some(address) => format!("{} ({address})", self.name()),
            None => self.name().to_string(),
        }
    }
}

impl RecordLine for User {
    fn details(&self) -> String {
        let branch = self
            .branch_id()
            .map(|b| format!(" @ branch {b}"))
            .unwrap_or_default();
        format!("{} <{}> [{}]{branch}", self.name(), self.email(), self.role())
    }
}

impl RecordLine for Product {
    fn details(&self) -> String {
        format!(
            "{}  {:.2}  qty {}",
            self.name(),
            self.price(),
            self.quantity()
        )
    }
}

impl RecordLine for Sale {
    fn details(&self) -> String {
        let seller = self
            .seller_id()
            .map(|s| format!(" by {s}"))
            .unwrap_or_default();
        format!(
            "{} x product {}  total {:.2}{seller}",
            self.quantity(),
            self.product_id(),
            self.total_price()
        )
    }
}

/// Prints a single record, as JSON or as one line
pub fn print_record<E: RecordLine>(
    format: OutputFormat,
    formatter: &dyn OutputFormatter,
    headline: &str,
    record: &E,
) {
    if format.is_json() {
        formatter.print_json(&serde_json::to_value(record).unwrap_or_default());
    } else {
        formatter.success(headline);
        formatter.info(&record.line());
    }
}
