use thiserror::Error;

/// Errors raised while assembling a [`Catalog`](crate::Catalog).
///
/// Lookups never fail; only construction is validated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("duplicate product id '{id}'")]
    DuplicateId { id: String },

    #[error("product '{id}' has an empty {field}")]
    EmptyField { id: String, field: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let dup = CatalogError::DuplicateId { id: "001".to_string() };
        assert_eq!(dup.to_string(), "duplicate product id '001'");

        let empty = CatalogError::EmptyField {
            id: "002".to_string(),
            field: "name",
        };
        assert_eq!(empty.to_string(), "product '002' has an empty name");
    }
}
