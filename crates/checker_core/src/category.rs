use std::fmt;

/// The two kinds of portal table this tool watches. This is a closed set;
/// each variant carries its own row template and history file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Messages,
    Charges,
}

impl Category {
    /// Processing order for one run.
    pub const ALL: [Category; 2] = [Category::Messages, Category::Charges];

    /// File name of the persisted history for this category.
    pub fn history_filename(self) -> &'static str {
        match self {
            Category::Messages => "portalchecker.messagehistory",
            Category::Charges => "portalchecker.chargehistory",
        }
    }

    /// Minimum number of cells a valid data row must have.
    pub fn required_cells(self) -> usize {
        match self {
            // Message rows use cells 1, 4 and 5.
            Category::Messages => 6,
            // Charge rows use cells 0 and 1.
            Category::Charges => 2,
        }
    }

    /// Singular noun used in notifications and log output.
    pub fn label(self) -> &'static str {
        match self {
            Category::Messages => "message",
            Category::Charges => "charge",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Messages => write!(f, "messages"),
            Category::Charges => write!(f, "charges"),
        }
    }
}
