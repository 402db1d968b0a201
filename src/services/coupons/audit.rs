use std::fmt;

/// Append-only audit trail kept in an order's free-text memo.
///
/// Entries are newline-joined; existing memo content is never rewritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditMemo {
    text: String,
}

impl AuditMemo {
    pub fn from_stored(stored: Option<String>) -> Self {
        Self {
            text: stored.unwrap_or_default(),
        }
    }

    pub fn append(&mut self, entry: impl fmt::Display) {
        if !self.text.is_empty() {
            self.text.push('\n');
        }
        self.text.push_str(&entry.to_string());
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }

    pub fn into_stored(self) -> Option<String> {
        if self.text.is_empty() {
            None
        } else {
            Some(self.text)
        }
    }
}

/// What happened to a coupon on a given order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouponMove<'a> {
    /// Detached with no new owner.
    Released { code: &'a str },
    /// Detached because it is going to `destination`.
    MovedTo { code: &'a str, destination: i32 },
    /// Attached after being detached from `sources`.
    TransferredFrom { code: &'a str, sources: &'a [i32] },
    /// Attached with nothing to detach.
    Attached { code: &'a str },
}

impl fmt::Display for CouponMove<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Released { code } => write!(f, "coupon {} released", code),
            Self::MovedTo { code, destination } => {
                write!(f, "coupon {} moved to order {}", code, destination)
            }
            Self::TransferredFrom { code, sources } => {
                let ids: Vec<String> = sources.iter().map(ToString::to_string).collect();
                write!(f, "coupon {} transferred from order(s) {}", code, ids.join(", "))
            }
            Self::Attached { code } => write!(f, "coupon {} attached", code),
        }
    }
}
