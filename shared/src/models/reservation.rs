//! Reservation Model (取り置き予約)

use serde::{Deserialize, Serialize};

/// Reservation lifecycle status
///
/// `pending → {confirmed, cancelled}`, `confirmed → {completed, cancelled}`;
/// `completed` and `cancelled` are terminal. Transitions are driven only by
/// the admin API; there is no way back out of a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Terminal states admit no further transition
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// Fixed hourly pickup slots (09:00 through 18:00)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum PickupTimeSlot {
    #[serde(rename = "09:00-10:00")]
    #[cfg_attr(feature = "db", sqlx(rename = "09:00-10:00"))]
    S09,
    #[serde(rename = "10:00-11:00")]
    #[cfg_attr(feature = "db", sqlx(rename = "10:00-11:00"))]
    S10,
    #[serde(rename = "11:00-12:00")]
    #[cfg_attr(feature = "db", sqlx(rename = "11:00-12:00"))]
    S11,
    #[serde(rename = "12:00-13:00")]
    #[cfg_attr(feature = "db", sqlx(rename = "12:00-13:00"))]
    S12,
    #[serde(rename = "13:00-14:00")]
    #[cfg_attr(feature = "db", sqlx(rename = "13:00-14:00"))]
    S13,
    #[serde(rename = "14:00-15:00")]
    #[cfg_attr(feature = "db", sqlx(rename = "14:00-15:00"))]
    S14,
    #[serde(rename = "15:00-16:00")]
    #[cfg_attr(feature = "db", sqlx(rename = "15:00-16:00"))]
    S15,
    #[serde(rename = "16:00-17:00")]
    #[cfg_attr(feature = "db", sqlx(rename = "16:00-17:00"))]
    S16,
    #[serde(rename = "17:00-18:00")]
    #[cfg_attr(feature = "db", sqlx(rename = "17:00-18:00"))]
    S17,
}

impl PickupTimeSlot {
    pub const ALL: [PickupTimeSlot; 9] = [
        Self::S09,
        Self::S10,
        Self::S11,
        Self::S12,
        Self::S13,
        Self::S14,
        Self::S15,
        Self::S16,
        Self::S17,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S09 => "09:00-10:00",
            Self::S10 => "10:00-11:00",
            Self::S11 => "11:00-12:00",
            Self::S12 => "12:00-13:00",
            Self::S13 => "13:00-14:00",
            Self::S14 => "14:00-15:00",
            Self::S15 => "15:00-16:00",
            Self::S16 => "16:00-17:00",
            Self::S17 => "17:00-18:00",
        }
    }

    /// Parse a wire slot string; `None` for anything outside the fixed set
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|slot| slot.as_str() == s)
    }
}

/// Reservation header
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Reservation {
    pub id: i64,
    pub user_id: i64,
    /// Pickup date, `YYYY-MM-DD` (must resolve open at creation time)
    pub pickup_date: String,
    pub pickup_time_slot: PickupTimeSlot,
    pub status: ReservationStatus,
    /// Sum of line snapshots at creation time (yen); immutable afterwards
    /// except for coupon application while still pending
    pub total_amount: i64,
    /// Points credited at creation time (1 per 100 yen); reversed on cancel
    pub points_earned: i64,
    pub note: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Reservation line with its creation-time price snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ReservationItem {
    pub id: i64,
    pub reservation_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    /// Unit price captured at creation time, independent of later product
    /// price changes
    pub price: i64,
}

/// Reservation with nested items (list/detail views)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationDetail {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub items: Vec<ReservationItem>,
}

/// One requested line of a reservation create call.
///
/// `price` is accepted for wire compatibility with existing clients but is
/// untrusted: the server snapshots the authoritative product price at commit
/// time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationItemInput {
    pub product_id: i64,
    pub quantity: i64,
    #[serde(default)]
    pub price: Option<i64>,
}

/// Create reservation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationCreate {
    pub user_id: i64,
    pub pickup_date: String,
    /// Wire slot string, validated against the fixed slot set
    pub pickup_time_slot: String,
    pub note: Option<String>,
    pub items: Vec<ReservationItemInput>,
    /// Untrusted client-declared total; ignored (recomputed server-side)
    #[serde(default)]
    pub total_amount: Option<i64>,
}

/// Apply-coupon payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyCouponRequest {
    pub user_coupon_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_parse_roundtrip() {
        for slot in PickupTimeSlot::ALL {
            assert_eq!(PickupTimeSlot::parse(slot.as_str()), Some(slot));
        }
    }

    #[test]
    fn test_slot_parse_rejects_unknown() {
        assert_eq!(PickupTimeSlot::parse("18:00-19:00"), None);
        assert_eq!(PickupTimeSlot::parse("9:00-10:00"), None);
        assert_eq!(PickupTimeSlot::parse(""), None);
    }

    #[test]
    fn test_status_terminal() {
        assert!(!ReservationStatus::Pending.is_terminal());
        assert!(!ReservationStatus::Confirmed.is_terminal());
        assert!(ReservationStatus::Completed.is_terminal());
        assert!(ReservationStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_slot_serde_uses_wire_format() {
        let json = serde_json::to_string(&PickupTimeSlot::S09).unwrap();
        assert_eq!(json, "\"09:00-10:00\"");
        let back: PickupTimeSlot = serde_json::from_str("\"17:00-18:00\"").unwrap();
        assert_eq!(back, PickupTimeSlot::S17);
    }
}
