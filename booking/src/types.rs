//! Domain types for the Haven booking client.
//!
//! Value objects and entities shared by every feature. Field names serialise in
//! camelCase so payloads from the venue/booking data service decode directly.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a venue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VenueId(Uuid);

impl VenueId {
    /// Creates a new random `VenueId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `VenueId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for VenueId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VenueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a booking
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(Uuid);

impl BookingId {
    /// Creates a new random `BookingId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `BookingId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for BookingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Date ranges
// ============================================================================

/// Error returned when a range's end is not strictly after its start
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("range end {to} must be after its start {from}")]
pub struct InvalidDateRange {
    /// Requested start
    pub from: NaiveDate,
    /// Requested end
    pub to: NaiveDate,
}

/// Half-open range of days `[from, to)`
///
/// The end day is the check-out day and is not part of the stay. A range is
/// never empty: `from < to` always holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting empty and inverted ones
    ///
    /// # Errors
    ///
    /// Returns [`InvalidDateRange`] when `to <= from`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, InvalidDateRange> {
        if from < to {
            Ok(Self { from, to })
        } else {
            Err(InvalidDateRange { from, to })
        }
    }

    /// First day of the stay (check-in)
    #[must_use]
    pub const fn from(&self) -> NaiveDate {
        self.from
    }

    /// Check-out day, exclusive
    #[must_use]
    pub const fn to(&self) -> NaiveDate {
        self.to
    }

    /// Number of nights, always at least one
    #[must_use]
    pub fn nights(&self) -> u32 {
        u32::try_from((self.to - self.from).num_days()).unwrap_or(u32::MAX)
    }

    /// Whether `day` is one of the booked nights
    #[must_use]
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.from <= day && day < self.to
    }

    /// Whether two stays share at least one night
    ///
    /// Back-to-back stays (one checks out the day the other checks in) do not
    /// overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.from < other.to && other.from < self.to
    }

    /// Iterate over the booked nights
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let to = self.to;
        self.from.iter_days().take_while(move |day| *day < to)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.from, self.to)
    }
}

// ============================================================================
// Venues
// ============================================================================

/// Image attached to a venue
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    /// Image URL
    pub url: String,
    /// Alternative text
    #[serde(default)]
    pub alt: String,
}

impl Media {
    /// Creates a media item
    #[must_use]
    pub fn new(url: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alt: alt.into(),
        }
    }
}

/// Where a venue is
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// City
    #[serde(default)]
    pub city: Option<String>,
    /// Country
    #[serde(default)]
    pub country: Option<String>,
}

/// Short venue description embedded in a booking
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueSummary {
    /// Venue ID
    pub id: VenueId,
    /// Venue name
    pub name: String,
    /// Venue images
    #[serde(default)]
    pub media: Vec<Media>,
    /// Venue location
    #[serde(default)]
    pub location: Option<Location>,
}

/// A rentable venue
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    /// Venue ID
    pub id: VenueId,
    /// Display name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Nightly price, positive when present
    #[serde(default)]
    pub price: Option<f64>,
    /// Maximum guests per booking
    pub max_guests: u32,
    /// Ordered images
    #[serde(default)]
    pub media: Vec<Media>,
    /// Location
    #[serde(default)]
    pub location: Option<Location>,
    /// Known bookings; may be partially loaded
    #[serde(default)]
    pub bookings: Vec<Booking>,
    /// Owner's profile name
    #[serde(default)]
    pub owner: Option<String>,
    /// When the listing was created
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
}

impl Venue {
    /// Creates a venue with a fresh ID and no price, media or bookings
    #[must_use]
    pub fn new(name: impl Into<String>, max_guests: u32) -> Self {
        Self {
            id: VenueId::new(),
            name: name.into(),
            description: String::new(),
            price: None,
            max_guests,
            media: Vec::new(),
            location: None,
            bookings: Vec::new(),
            owner: None,
            created: None,
        }
    }

    /// Set the nightly price
    #[must_use]
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Set the owner
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Replace the known bookings
    #[must_use]
    pub fn with_bookings(mut self, bookings: Vec<Booking>) -> Self {
        self.bookings = bookings;
        self
    }

    /// Set the creation timestamp
    #[must_use]
    pub fn created_at(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    /// The image to show first
    ///
    /// Falls back to `placeholder_url` (alt text = venue name) when the venue
    /// has no media.
    #[must_use]
    pub fn hero_media(&self, placeholder_url: &str) -> Media {
        self.media
            .first()
            .cloned()
            .unwrap_or_else(|| Media::new(placeholder_url, self.name.clone()))
    }

    /// Summary embedded in bookings
    #[must_use]
    pub fn summary(&self) -> VenueSummary {
        VenueSummary {
            id: self.id,
            name: self.name.clone(),
            media: self.media.clone(),
            location: self.location.clone(),
        }
    }
}

// ============================================================================
// Bookings
// ============================================================================

/// A reservation of a venue
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Booking ID
    pub id: BookingId,
    /// Venue being booked
    pub venue_id: VenueId,
    /// Check-in
    pub date_from: DateTime<Utc>,
    /// Check-out, exclusive
    pub date_to: DateTime<Utc>,
    /// Number of guests
    pub guests: u32,
    /// Customer's profile name
    #[serde(default)]
    pub customer: Option<String>,
    /// Embedded venue, present in a customer's booking listing
    #[serde(default)]
    pub venue: Option<VenueSummary>,
}

impl Booking {
    /// Creates a booking from check-in to check-out days (midnight UTC)
    #[must_use]
    pub fn for_days(venue_id: VenueId, from: NaiveDate, to: NaiveDate, guests: u32) -> Self {
        Self {
            id: BookingId::new(),
            venue_id,
            date_from: from.and_time(chrono::NaiveTime::MIN).and_utc(),
            date_to: to.and_time(chrono::NaiveTime::MIN).and_utc(),
            guests,
            customer: None,
            venue: None,
        }
    }

    /// The booked nights at day granularity
    ///
    /// `None` when the range is empty or inverted after truncating to days;
    /// such bookings occupy no day.
    #[must_use]
    pub fn stay(&self) -> Option<DateRange> {
        DateRange::new(self.date_from.date_naive(), self.date_to.date_naive()).ok()
    }
}
