use serde::{Deserialize, Serialize};

/// Result of a mutating cart operation
///
/// Failures never surface as `Err` from the store; they are folded into one
/// of these variants and the cart is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CartOutcome {
    /// The mutation was persisted and published
    Ok,
    /// The requested quantity is above what the stock service reports
    StockExceeded { requested: u32, available: u32 },
    /// The product or stock lookup failed
    LookupFailed { reason: String },
    /// Anything else, in practice a failed storage write
    Failed { reason: String },
}

impl CartOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, CartOutcome::Ok)
    }

    /// Short label used for metrics and log fields
    pub fn label(&self) -> &'static str {
        match self {
            CartOutcome::Ok => "ok",
            CartOutcome::StockExceeded { .. } => "stock_exceeded",
            CartOutcome::LookupFailed { .. } => "lookup_failed",
            CartOutcome::Failed { .. } => "failed",
        }
    }
}

impl std::fmt::Display for CartOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CartOutcome::Ok => write!(f, "ok"),
            CartOutcome::StockExceeded {
                requested,
                available,
            } => write!(
                f,
                "stock exceeded: requested={}, available={}",
                requested, available
            ),
            CartOutcome::LookupFailed { reason } => write!(f, "lookup failed: {}", reason),
            CartOutcome::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serialization() {
        let outcome = CartOutcome::StockExceeded {
            requested: 6,
            available: 5,
        };
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["outcome"], "stock_exceeded");
        assert_eq!(json["requested"], 6);
        assert_eq!(json["available"], 5);
    }

    #[test]
    fn test_outcome_labels() {
        assert!(CartOutcome::Ok.is_ok());
        assert_eq!(
            CartOutcome::LookupFailed {
                reason: "timeout".to_string()
            }
            .label(),
            "lookup_failed"
        );
        assert!(!CartOutcome::Failed {
            reason: "disk full".to_string()
        }
        .is_ok());
    }
}
