//! Expectation context: values a scenario expects to observe on later steps
//!
//! One context belongs to one scenario run. It is passed `&mut` into each
//! step, so two scenarios on different workers cannot see each other's
//! values. Clear it after the scenario's delete step.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{Booking, BookingDates, BookingId};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum ContextField {
    BookingId,
    Firstname,
    Lastname,
    TotalPrice,
    DepositPaid,
    BookingDates,
    AdditionalNeeds,
}

impl ContextField {
    pub const ALL: [ContextField; 7] = [
        Self::BookingId,
        Self::Firstname,
        Self::Lastname,
        Self::TotalPrice,
        Self::DepositPaid,
        Self::BookingDates,
        Self::AdditionalNeeds,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BookingId => "bookingId",
            Self::Firstname => "firstname",
            Self::Lastname => "lastname",
            Self::TotalPrice => "totalPrice",
            Self::DepositPaid => "depositPaid",
            Self::BookingDates => "bookingDates",
            Self::AdditionalNeeds => "additionalNeeds",
        }
    }
}

impl std::fmt::Display for ContextField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ContextValue {
    Id(BookingId),
    Text(String),
    Integer(i64),
    Flag(bool),
    Dates(BookingDates),
}

impl std::fmt::Display for ContextValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Flag(b) => write!(f, "{b}"),
            Self::Dates(d) => write!(f, "{}..{}", d.checkin, d.checkout),
        }
    }
}

/// The set of expected values at one point in a scenario.
pub type ExpectationSnapshot = BTreeMap<ContextField, ContextValue>;

#[derive(Debug, Clone, Default)]
pub struct ExpectationContext {
    values: ExpectationSnapshot,
}

impl ExpectationContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: ContextField, value: ContextValue) {
        tracing::debug!(%field, %value, "expectation set");
        self.values.insert(field, value);
    }

    /// Last value set for `field`, or `None` if never set since the last clear.
    #[must_use]
    pub fn get(&self, field: ContextField) -> Option<&ContextValue> {
        self.values.get(&field)
    }

    pub fn clear(&mut self) {
        tracing::debug!("expectation context cleared");
        self.values.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn snapshot(&self) -> ExpectationSnapshot {
        self.values.clone()
    }

    pub fn set_booking_id(&mut self, id: BookingId) {
        self.set(ContextField::BookingId, ContextValue::Id(id));
    }

    #[must_use]
    pub fn booking_id(&self) -> Option<BookingId> {
        match self.get(ContextField::BookingId) {
            Some(ContextValue::Id(id)) => Some(*id),
            _ => None,
        }
    }

    /// Record every field of `booking` as the expected state.
    ///
    /// A booking without `additionalneeds` removes any earlier value.
    pub fn remember_booking(&mut self, booking: &Booking) {
        self.set(
            ContextField::Firstname,
            ContextValue::Text(booking.firstname.clone()),
        );
        self.set(
            ContextField::Lastname,
            ContextValue::Text(booking.lastname.clone()),
        );
        self.set(
            ContextField::TotalPrice,
            ContextValue::Integer(booking.totalprice),
        );
        self.set(
            ContextField::DepositPaid,
            ContextValue::Flag(booking.depositpaid),
        );
        self.set(
            ContextField::BookingDates,
            ContextValue::Dates(booking.bookingdates.clone()),
        );
        match &booking.additionalneeds {
            Some(needs) => self.set(
                ContextField::AdditionalNeeds,
                ContextValue::Text(needs.clone()),
            ),
            None => {
                self.values.remove(&ContextField::AdditionalNeeds);
            }
        }
    }

    /// Rebuild the expected booking. `None` unless every required field is set.
    #[must_use]
    pub fn expected_booking(&self) -> Option<Booking> {
        let text = |field| match self.get(field) {
            Some(ContextValue::Text(s)) => Some(s.clone()),
            _ => None,
        };
        let totalprice = match self.get(ContextField::TotalPrice)? {
            ContextValue::Integer(n) => *n,
            _ => return None,
        };
        let depositpaid = match self.get(ContextField::DepositPaid)? {
            ContextValue::Flag(b) => *b,
            _ => return None,
        };
        let bookingdates = match self.get(ContextField::BookingDates)? {
            ContextValue::Dates(d) => d.clone(),
            _ => return None,
        };

        Some(Booking {
            firstname: text(ContextField::Firstname)?,
            lastname: text(ContextField::Lastname)?,
            totalprice,
            depositpaid,
            bookingdates,
            additionalneeds: text(ContextField::AdditionalNeeds),
        })
    }
}
