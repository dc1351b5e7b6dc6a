//! PostgREST filter and ordering parameters

/// A single `column=eq.value` query parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: &'static str,
    pub value: String,
}

impl Filter {
    /// Equality filter
    pub fn eq<T: ToString>(column: &'static str, value: T) -> Self {
        Self {
            column,
            value: value.to_string(),
        }
    }

    /// The query parameter value, e.g. `eq.42`
    pub fn param(&self) -> String {
        format!("eq.{}", self.value)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Value for the `order` query parameter
pub fn order_param(column: &str, order: SortOrder) -> String {
    let direction = match order {
        SortOrder::Ascending => "asc",
        SortOrder::Descending => "desc",
    };
    format!("{}.{}", column, direction)
}
