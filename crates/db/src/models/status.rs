//! Status helper enums mapping to SMALLSERIAL/SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` database table.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Company lifecycle status (soft delete).
    CompanyStatus {
        Active = 1,
        Inactive = 2,
    }
}

define_status_enum! {
    /// Partnership edge status. Only active edges grant visibility.
    PartnershipStatus {
        Active = 1,
        Inactive = 2,
    }
}

define_status_enum! {
    /// Equipment availability status.
    EquipmentStatus {
        Available = 1,
        Busy = 2,
        Maintenance = 3,
    }
}

define_status_enum! {
    /// Rental request lifecycle status.
    RequestStatus {
        Pending = 1,
        AuctionActive = 2,
        AuctionClosed = 3,
        Completed = 4,
        Cancelled = 5,
    }
}

define_status_enum! {
    /// Bid outcome status.
    BidStatus {
        Pending = 1,
        Accepted = 2,
        Rejected = 3,
    }
}

impl EquipmentStatus {
    /// Parse a status name as used by the catalog API.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "available" => Some(Self::Available),
            "busy" => Some(Self::Busy),
            "maintenance" => Some(Self::Maintenance),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_status_ids_match_seed_data() {
        assert_eq!(RequestStatus::Pending.id(), 1);
        assert_eq!(RequestStatus::AuctionActive.id(), 2);
        assert_eq!(RequestStatus::AuctionClosed.id(), 3);
        assert_eq!(RequestStatus::Completed.id(), 4);
        assert_eq!(RequestStatus::Cancelled.id(), 5);
    }

    #[test]
    fn bid_status_ids_match_seed_data() {
        assert_eq!(BidStatus::Pending.id(), 1);
        assert_eq!(BidStatus::Accepted.id(), 2);
        assert_eq!(BidStatus::Rejected.id(), 3);
    }

    #[test]
    fn equipment_status_ids_match_seed_data() {
        assert_eq!(EquipmentStatus::Available.id(), 1);
        assert_eq!(EquipmentStatus::Busy.id(), 2);
        assert_eq!(EquipmentStatus::Maintenance.id(), 3);
    }

    #[test]
    fn equipment_status_from_name() {
        assert_eq!(
            EquipmentStatus::from_name("available"),
            Some(EquipmentStatus::Available)
        );
        assert_eq!(EquipmentStatus::from_name("retired"), None);
    }

    #[test]
    fn status_into_status_id() {
        let id: StatusId = CompanyStatus::Inactive.into();
        assert_eq!(id, 2);
    }
}
