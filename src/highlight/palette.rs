//! Fixed ANSI color palette for rendered traffic

/// ANSI sequence that ends every colored span
pub const RESET: &str = "\x1b[0m";

/// Semantic category of a rendered span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Key,
    String,
    Number,
    Bool,
    Null,
    Punct,
    Tag,
    Attr,
    Method,
    Url,
    Header,
    Status2xx,
    Status3xx,
    Status4xx,
    Status5xx,
}

impl Category {
    /// ANSI prefix for this category
    pub fn code(self) -> &'static str {
        match self {
            Category::Key => "\x1b[36m",
            Category::String => "\x1b[32m",
            Category::Number => "\x1b[33m",
            Category::Bool => "\x1b[35m",
            Category::Null => "\x1b[90m",
            Category::Punct => "\x1b[37m",
            Category::Tag => "\x1b[34m",
            Category::Attr => "\x1b[33m",
            Category::Method => "\x1b[35m",
            Category::Url => "\x1b[36m",
            Category::Header => "\x1b[34m",
            Category::Status2xx => "\x1b[32m",
            Category::Status3xx => "\x1b[36m",
            Category::Status4xx => "\x1b[33m",
            Category::Status5xx => "\x1b[31m",
        }
    }

    /// Status class for a numeric HTTP status.
    ///
    /// Anything outside 200..500 (1xx, 5xx and up, unparsable as 0) lands in
    /// the 5xx class.
    pub fn for_status(code: i64) -> Self {
        match code {
            200..=299 => Category::Status2xx,
            300..=399 => Category::Status3xx,
            400..=499 => Category::Status4xx,
            _ => Category::Status5xx,
        }
    }
}

/// Wrap `text` in the color of `category`
pub fn paint(text: &str, category: Category) -> String {
    let code = category.code();
    let mut out = String::with_capacity(code.len() + text.len() + RESET.len());
    out.push_str(code);
    out.push_str(text);
    out.push_str(RESET);
    out
}
