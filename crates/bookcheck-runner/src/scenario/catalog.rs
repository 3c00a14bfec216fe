//! The scenario catalog, in report order

use bookcheck_core::{Booking, BookingPatch, FixtureSet};

use super::{Negative, Scenario, ScenarioKind, Tag};
use crate::suite::Suite;

/// The booking every update step replaces the original with.
#[must_use]
pub fn updated_booking() -> Booking {
    Booking::new("Jane", "Doe", 150, false, "2021-02-01", "2021-02-10", Some("Lunch"))
}

/// The booking the lifecycle scenario starts from.
#[must_use]
pub fn lifecycle_booking() -> Booking {
    Booking::new("John", "Doe", 123, true, "2021-01-01", "2021-01-10", Some("Breakfast"))
}

/// Partial update applied by the lifecycle scenario. Dates are not submitted.
#[must_use]
pub fn lifecycle_patch() -> BookingPatch {
    BookingPatch {
        firstname: Some("Jim".into()),
        lastname: Some("Beam".into()),
        totalprice: Some(200),
        depositpaid: Some(true),
        bookingdates: None,
        additionalneeds: Some("Dinner".into()),
    }
}

/// Partial update of the inline rows: names only.
#[must_use]
pub fn name_patch() -> BookingPatch {
    BookingPatch {
        firstname: Some("Jim".into()),
        lastname: Some("Beam".into()),
        ..BookingPatch::default()
    }
}

/// Literal rows of the parameterized scenarios.
#[must_use]
pub fn inline_rows() -> FixtureSet {
    let rows = [
        ("John", "Doe", 123, true, "2021-01-01", "2021-01-10", "Breakfast"),
        ("Jane", "Smith", 456, false, "2021-02-01", "2021-02-15", "Dinner"),
        ("Alice", "Johnson", 789, true, "2021-03-01", "2021-03-20", "Lunch"),
        ("Bob", "Brown", 100, false, "2021-04-01", "2021-04-30", "Breakfast"),
        ("Charlie", "White", 200, true, "2021-05-01", "2021-05-31", "Dinner"),
        ("David", "Black", 300, false, "2021-06-01", "2021-06-30", "Lunch"),
        ("Eve", "Green", 400, true, "2021-07-01", "2021-07-31", "Breakfast"),
        ("Frank", "Blue", 500, false, "2021-08-01", "2021-08-31", "Dinner"),
        ("Grace", "Red", 600, true, "2021-09-01", "2021-09-30", "Lunch"),
    ];
    let rows = rows
        .into_iter()
        .map(|(first, last, price, paid, checkin, checkout, needs)| {
            Booking::new(first, last, price, paid, checkin, checkout, Some(needs))
        })
        .collect();
    FixtureSet::from_rows("inline", rows)
}

fn fixture_rows(
    prefix: &str,
    set: &FixtureSet,
    smoke_only: bool,
    out: &mut Vec<Scenario>,
) {
    for (i, booking) in set.iter().enumerate() {
        let row = i + 1;
        out.push(Scenario {
            name: format!("{prefix}-row-{row}"),
            tags: vec![Tag::Regression, Tag::Smoke],
            fixture: Some(format!("{}#{row}", set.source())),
            kind: ScenarioKind::FixtureRow {
                booking: booking.clone(),
                smoke_only,
            },
        });
    }
}

/// Every scenario `suite` selects. Fixture-driven scenarios are omitted
/// when their set is not supplied.
#[must_use]
pub fn build(suite: Suite, csv: Option<&FixtureSet>, json: Option<&FixtureSet>) -> Vec<Scenario> {
    let smoke_only = suite == Suite::Smoke;
    let mut all = vec![
        Scenario::fixed("health-check", &[Tag::Smoke, Tag::Integration], ScenarioKind::HealthCheck),
        Scenario::fixed("list-ids", &[Tag::Smoke, Tag::Integration], ScenarioKind::ListIds),
        Scenario::fixed("booking-lifecycle", &[Tag::Integration], ScenarioKind::Lifecycle),
    ];

    let inline = inline_rows();
    for (i, booking) in inline.iter().enumerate() {
        all.push(Scenario {
            name: format!("inline-row-{}", i + 1),
            tags: vec![Tag::Integration],
            fixture: Some(format!("inline#{}", i + 1)),
            kind: ScenarioKind::InlineRow(booking.clone()),
        });
    }

    if let Some(set) = csv {
        fixture_rows("csv", set, smoke_only, &mut all);
    }
    if let Some(set) = json {
        fixture_rows("json", set, smoke_only, &mut all);
        for (i, booking) in set.iter().enumerate() {
            all.push(Scenario {
                name: format!("schema-row-{}", i + 1),
                tags: vec![Tag::Regression],
                fixture: Some(format!("{}#{}", set.source(), i + 1)),
                kind: ScenarioKind::SchemaRow(booking.clone()),
            });
        }
    }

    for negative in Negative::ALL {
        all.push(Scenario::fixed(
            negative.name(),
            &[Tag::Negative],
            ScenarioKind::Negative(negative),
        ));
    }

    all.retain(|s| suite.selects(&s.tags));
    all
}
