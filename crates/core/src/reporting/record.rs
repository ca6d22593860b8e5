//! Records classified by the report tree.

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::NaiveDate;
use costree_shared::types::RecordId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One of the two classification code dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeDimension {
    /// First classification code (cost unit).
    Code1,
    /// Second classification code (cost type).
    Code2,
}

impl fmt::Display for CodeDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code1 => f.write_str("code1"),
            Self::Code2 => f.write_str("code2"),
        }
    }
}

/// A record that can be sorted into report objectives.
///
/// Equality and hashing must follow the record's natural identity: two
/// handles to the same booking compare equal, two different bookings with
/// identical codes do not. Clones should be cheap (wrap large records in an
/// `Arc`), since every node keeps its own subset.
pub trait ClassifiedRecord: Clone + Eq + Hash {
    /// First classification code, `None` if it cannot be resolved.
    fn code1(&self) -> Option<&str>;

    /// Second classification code, `None` if it cannot be resolved.
    fn code2(&self) -> Option<&str>;

    /// Returns the code of the given dimension.
    fn code(&self, dimension: CodeDimension) -> Option<&str> {
        match dimension {
            CodeDimension::Code1 => self.code1(),
            CodeDimension::Code2 => self.code2(),
        }
    }

    /// Human-readable identity used in error messages and logs.
    fn describe(&self) -> String;
}

/// A booking as delivered by the accounting ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRecord {
    /// Record identity.
    pub id: RecordId,
    /// Formatted first cost code (e.g. "5.100.20").
    pub kost1: Option<String>,
    /// Formatted second cost code.
    pub kost2: Option<String>,
    /// Booked amount.
    pub amount: Decimal,
    /// Booking date.
    pub booked_on: NaiveDate,
    /// Booking text.
    #[serde(default)]
    pub text: String,
}

impl BookingRecord {
    /// Creates a record with a fresh id and the given codes.
    #[must_use]
    pub fn new(
        kost1: impl Into<String>,
        kost2: impl Into<String>,
        amount: Decimal,
        booked_on: NaiveDate,
    ) -> Self {
        Self {
            id: RecordId::new(),
            kost1: Some(kost1.into()),
            kost2: Some(kost2.into()),
            amount,
            booked_on,
            text: String::new(),
        }
    }

    /// Sets the booking text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

impl PartialEq for BookingRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for BookingRecord {}

impl Hash for BookingRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl ClassifiedRecord for BookingRecord {
    fn code1(&self) -> Option<&str> {
        self.kost1.as_deref()
    }

    fn code2(&self) -> Option<&str> {
        self.kost2.as_deref()
    }

    fn describe(&self) -> String {
        self.id.to_string()
    }
}

impl<T: ClassifiedRecord> ClassifiedRecord for std::sync::Arc<T> {
    fn code1(&self) -> Option<&str> {
        (**self).code1()
    }

    fn code2(&self) -> Option<&str> {
        (**self).code2()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
